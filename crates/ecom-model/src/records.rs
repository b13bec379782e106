//! Row shapes shared by the staging and production relations.
//!
//! Every non-identifier field is optional: staging tolerates missing values
//! and the quality checks are what report them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub customer_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub registration_date: Option<NaiveDate>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub age_group: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product_id: String,
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub price: Option<f64>,
    pub cost: Option<f64>,
    pub brand: Option<String>,
    pub stock_quantity: Option<i64>,
    pub supplier_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: String,
    pub customer_id: Option<String>,
    pub transaction_date: Option<NaiveDate>,
    pub transaction_time: Option<String>,
    pub payment_method: Option<String>,
    pub shipping_address: Option<String>,
    pub total_amount: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionItemRecord {
    pub item_id: String,
    pub transaction_id: Option<String>,
    pub product_id: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price: Option<f64>,
    pub discount_percentage: Option<f64>,
    pub line_total: Option<f64>,
}
