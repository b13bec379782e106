//! Table definitions for all three layers.
//!
//! Staging tables carry no key constraints so duplicates and orphans can
//! land there and be reported by the quality checks. Production and
//! warehouse tables key on the natural identifier and hold no foreign keys:
//! customers and products are rebuilt while facts still reference them.

use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::error::{Result, StoreError};

pub const SCHEMA_VERSION: i64 = 1;

const STAGING_DDL: &str = "
CREATE TABLE IF NOT EXISTS staging_customers (
    customer_id TEXT NOT NULL,
    first_name TEXT,
    last_name TEXT,
    email TEXT,
    phone TEXT,
    registration_date TEXT,
    city TEXT,
    state TEXT,
    country TEXT,
    age_group TEXT
);
CREATE TABLE IF NOT EXISTS staging_products (
    product_id TEXT NOT NULL,
    product_name TEXT,
    category TEXT,
    sub_category TEXT,
    price REAL,
    cost REAL,
    brand TEXT,
    stock_quantity INTEGER,
    supplier_id TEXT
);
CREATE TABLE IF NOT EXISTS staging_transactions (
    transaction_id TEXT NOT NULL,
    customer_id TEXT,
    transaction_date TEXT,
    transaction_time TEXT,
    payment_method TEXT,
    shipping_address TEXT,
    total_amount REAL
);
CREATE TABLE IF NOT EXISTS staging_transaction_items (
    item_id TEXT NOT NULL,
    transaction_id TEXT,
    product_id TEXT,
    quantity INTEGER,
    unit_price REAL,
    discount_percentage REAL,
    line_total REAL
);
";

const PRODUCTION_DDL: &str = "
CREATE TABLE IF NOT EXISTS customers (
    customer_id TEXT PRIMARY KEY,
    first_name TEXT,
    last_name TEXT,
    email TEXT,
    phone TEXT,
    registration_date TEXT,
    city TEXT,
    state TEXT,
    country TEXT,
    age_group TEXT
);
CREATE TABLE IF NOT EXISTS products (
    product_id TEXT PRIMARY KEY,
    product_name TEXT,
    category TEXT,
    sub_category TEXT,
    price REAL,
    cost REAL,
    brand TEXT,
    stock_quantity INTEGER,
    supplier_id TEXT,
    profit_margin REAL,
    price_category TEXT
);
CREATE TABLE IF NOT EXISTS transactions (
    transaction_id TEXT PRIMARY KEY,
    customer_id TEXT,
    transaction_date TEXT,
    transaction_time TEXT,
    payment_method TEXT,
    shipping_address TEXT,
    total_amount REAL,
    loaded_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS transaction_items (
    item_id TEXT PRIMARY KEY,
    transaction_id TEXT,
    product_id TEXT,
    quantity INTEGER,
    unit_price REAL,
    discount_percentage REAL,
    line_total REAL,
    loaded_at TEXT NOT NULL
);
";

const WAREHOUSE_DDL: &str = "
CREATE TABLE IF NOT EXISTS dim_date (
    date_key INTEGER PRIMARY KEY,
    full_date TEXT NOT NULL UNIQUE,
    year INTEGER NOT NULL,
    quarter INTEGER NOT NULL,
    month INTEGER NOT NULL,
    day INTEGER NOT NULL,
    month_name TEXT NOT NULL,
    day_name TEXT NOT NULL,
    week_of_year INTEGER NOT NULL,
    is_weekend INTEGER NOT NULL,
    is_holiday INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS dim_payment_method (
    payment_method_key INTEGER PRIMARY KEY AUTOINCREMENT,
    payment_method_name TEXT NOT NULL UNIQUE,
    payment_type TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS dim_customers (
    customer_key INTEGER PRIMARY KEY AUTOINCREMENT,
    customer_id TEXT NOT NULL,
    full_name TEXT,
    email TEXT,
    city TEXT,
    state TEXT,
    country TEXT,
    age_group TEXT,
    customer_segment TEXT NOT NULL,
    registration_date TEXT,
    effective_date TEXT NOT NULL,
    end_date TEXT,
    is_current INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS dim_products (
    product_key INTEGER PRIMARY KEY AUTOINCREMENT,
    product_id TEXT NOT NULL,
    product_name TEXT,
    category TEXT,
    sub_category TEXT,
    brand TEXT,
    price_range TEXT,
    effective_date TEXT NOT NULL,
    end_date TEXT,
    is_current INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS fact_sales (
    sales_key INTEGER PRIMARY KEY AUTOINCREMENT,
    date_key INTEGER NOT NULL,
    customer_key INTEGER,
    product_key INTEGER,
    payment_method_key INTEGER,
    transaction_id TEXT NOT NULL,
    quantity INTEGER,
    unit_price REAL,
    discount_amount REAL,
    line_total REAL,
    profit REAL,
    created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS agg_daily_sales (
    date_key INTEGER PRIMARY KEY,
    total_transactions INTEGER NOT NULL,
    total_revenue REAL,
    total_profit REAL,
    unique_customers INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS agg_product_performance (
    product_key INTEGER PRIMARY KEY,
    total_quantity_sold INTEGER,
    total_revenue REAL,
    total_profit REAL,
    avg_discount_amount REAL
);
CREATE TABLE IF NOT EXISTS agg_customer_metrics (
    customer_key INTEGER PRIMARY KEY,
    total_transactions INTEGER NOT NULL,
    total_spent REAL,
    avg_line_value REAL,
    last_purchase_date TEXT
);
";

/// Create every table if missing and check the recorded schema version.
pub(crate) fn initialize_schema(connection: &mut Connection) -> Result<()> {
    let tx = connection.transaction()?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", [], |row| row.get(0))
        .optional()?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", [SCHEMA_VERSION])?;
            debug!(version = SCHEMA_VERSION, "initialized schema");
        }
        Some(found) if found == SCHEMA_VERSION => {}
        Some(found) => {
            return Err(StoreError::SchemaVersion {
                found,
                expected: SCHEMA_VERSION,
            });
        }
    }
    tx.execute_batch(STAGING_DDL)?;
    tx.execute_batch(PRODUCTION_DDL)?;
    tx.execute_batch(WAREHOUSE_DDL)?;
    tx.commit()?;
    Ok(())
}
