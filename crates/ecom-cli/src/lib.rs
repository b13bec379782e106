//! Library half of the `ecom-pipeline` binary.

pub mod cleanup;
pub mod lock;
pub mod logging;
