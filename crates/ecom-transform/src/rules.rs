//! Business rules gating admission of fact rows into production.
//!
//! Each rule is a pure predicate. When it fails, the matching
//! [`RejectReason`] name is the counter key reported in the
//! transformation summary.

use std::fmt;

use ecom_model::{TransactionItemRecord, TransactionRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    InvalidTotalAmount,
    InvalidQuantity,
    /// The identifier was already admitted earlier in the same run.
    DuplicateIdentifier,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidTotalAmount => "invalid_total_amount",
            Self::InvalidQuantity => "invalid_quantity",
            Self::DuplicateIdentifier => "duplicate_identifier",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Total amount is present and strictly positive.
pub fn has_positive_total(transaction: &TransactionRecord) -> bool {
    transaction.total_amount.is_some_and(|amount| amount > 0.0)
}

/// Quantity is present and strictly positive.
pub fn has_positive_quantity(item: &TransactionItemRecord) -> bool {
    item.quantity.is_some_and(|quantity| quantity > 0)
}

pub fn check_transaction(transaction: &TransactionRecord) -> Option<RejectReason> {
    (!has_positive_total(transaction)).then_some(RejectReason::InvalidTotalAmount)
}

pub fn check_item(item: &TransactionItemRecord) -> Option<RejectReason> {
    (!has_positive_quantity(item)).then_some(RejectReason::InvalidQuantity)
}
