//! Row-level transformations for the e-commerce pipeline.
//!
//! - **normalize**: canonical forms for raw text, email and phone values
//! - **enrich**: derived fields (profit margin, price category, line total)
//! - **rules**: business-rule predicates deciding admission into production
//!
//! Everything here is pure; database access lives in the loaders.

pub mod enrich;
pub mod normalize;
pub mod rules;

pub use enrich::{PRICE_TIERS, PriceCategory, PriceTier, line_total, profit_margin};
pub use normalize::{normalize_email, normalize_phone, normalize_text, title_case};
pub use rules::{
    RejectReason, check_item, check_transaction, has_positive_quantity, has_positive_total,
};
