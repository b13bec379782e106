use std::fmt;

use serde::{Deserialize, Serialize};

/// The four relations moved through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Customers,
    Products,
    Transactions,
    TransactionItems,
}

impl Entity {
    /// Dimension-like entities first, then the facts that reference them.
    pub const LOAD_ORDER: [Entity; 4] = [
        Entity::Customers,
        Entity::Products,
        Entity::Transactions,
        Entity::TransactionItems,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::Products => "products",
            Self::Transactions => "transactions",
            Self::TransactionItems => "transaction_items",
        }
    }

    /// Column holding the natural identifier.
    pub fn id_column(self) -> &'static str {
        match self {
            Self::Customers => "customer_id",
            Self::Products => "product_id",
            Self::Transactions => "transaction_id",
            Self::TransactionItems => "item_id",
        }
    }

    /// Raw CSV file name produced by the data generator.
    pub fn csv_file_name(self) -> &'static str {
        match self {
            Self::Customers => "customers.csv",
            Self::Products => "products.csv",
            Self::Transactions => "transactions.csv",
            Self::TransactionItems => "transaction_items.csv",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage layer an entity relation lives in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Raw landing relations, replaced by every ingestion.
    #[default]
    Staging,
    /// Cleansed relations written by the ETL driver.
    Production,
}

impl Layer {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }

    /// Physical table name of `entity` in this layer.
    pub fn table(self, entity: Entity) -> &'static str {
        match (self, entity) {
            (Self::Staging, Entity::Customers) => "staging_customers",
            (Self::Staging, Entity::Products) => "staging_products",
            (Self::Staging, Entity::Transactions) => "staging_transactions",
            (Self::Staging, Entity::TransactionItems) => "staging_transaction_items",
            (Self::Production, Entity::Customers) => "customers",
            (Self::Production, Entity::Products) => "products",
            (Self::Production, Entity::Transactions) => "transactions",
            (Self::Production, Entity::TransactionItems) => "transaction_items",
        }
    }

    /// Dotted name used in reports, e.g. `staging.customers`.
    pub fn qualified(self, entity: Entity) -> String {
        format!("{}.{}", self.as_str(), entity.as_str())
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
