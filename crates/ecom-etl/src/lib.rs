//! Staging-to-production ETL.
//!
//! [`EtlDriver::standard`] runs the four entity loaders in dependency order
//! inside one transaction and produces a [`TransformationSummary`].
//!
//! [`TransformationSummary`]: ecom_model::TransformationSummary

pub mod driver;
pub mod error;
pub mod loaders;

pub use driver::{EtlDriver, TRANSFORMATIONS_APPLIED, write_summary};
pub use error::{EtlError, Result};
pub use loaders::{
    CustomerLoader, LoadContext, LoadStrategy, Loader, ProductLoader, TransactionItemLoader,
    TransactionLoader,
};
