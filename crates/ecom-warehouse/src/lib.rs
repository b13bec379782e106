//! Star-schema load from the production relations.
//!
//! Every run rebuilds the dimensions, the sales fact and the aggregates in
//! one transaction. Fact rows keep a null customer, product or payment key
//! when the matching dimension row is missing so the monitor can see it.

pub mod calendar;

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use ecom_model::{CustomerRecord, Layer, ProductRecord, artifact_timestamp};
use ecom_store::{Store, StoreError, count_rows, select_all};
use ecom_transform::PriceCategory;
use rusqlite::{Connection, params};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, info_span};

use calendar::{DateRow, days_between};

#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, WarehouseError>;

/// Payment methods the storefront accepts, with their channel.
pub const PAYMENT_METHODS: [(&str, &str); 5] = [
    ("Credit Card", "Online"),
    ("Debit Card", "Online"),
    ("UPI", "Online"),
    ("Net Banking", "Online"),
    ("Cash on Delivery", "Offline"),
];

/// Warehouse tables in load order.
pub const WAREHOUSE_TABLES: [&str; 8] = [
    "dim_date",
    "dim_payment_method",
    "dim_customers",
    "dim_products",
    "fact_sales",
    "agg_daily_sales",
    "agg_product_performance",
    "agg_customer_metrics",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WarehouseSummary {
    pub load_timestamp: String,
    /// Rows present in each warehouse table after the load.
    pub rows: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WarehouseLoader;

impl WarehouseLoader {
    pub fn run(&self, store: &mut Store) -> Result<WarehouseSummary> {
        self.run_at(store, Utc::now())
    }

    pub fn run_at(&self, store: &mut Store, now: DateTime<Utc>) -> Result<WarehouseSummary> {
        let _span = info_span!("warehouse").entered();
        let load_timestamp = artifact_timestamp(now);
        let today = now.date_naive();
        let tx = store.connection_mut().transaction()?;

        for table in WAREHOUSE_TABLES.iter().rev() {
            tx.execute(&format!("DELETE FROM {table}"), [])?;
        }
        load_dim_date(&tx)?;
        load_payment_methods(&tx)?;
        load_dim_customers(&tx, today)?;
        load_dim_products(&tx, today)?;
        load_fact_sales(&tx, &load_timestamp)?;
        build_aggregates(&tx)?;

        let mut rows = BTreeMap::new();
        for table in WAREHOUSE_TABLES {
            rows.insert(table.to_string(), count_rows(&tx, table)?);
        }
        tx.commit()?;
        info!(fact_rows = rows["fact_sales"], "warehouse loaded");
        Ok(WarehouseSummary {
            load_timestamp,
            rows,
        })
    }
}

fn load_dim_date(conn: &Connection) -> Result<()> {
    let (first, last): (Option<NaiveDate>, Option<NaiveDate>) = conn.query_row(
        "SELECT MIN(transaction_date), MAX(transaction_date) FROM transactions",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    let (Some(first), Some(last)) = (first, last) else {
        debug!("no dated transactions, dim_date left empty");
        return Ok(());
    };
    let mut stmt = conn.prepare(
        "INSERT INTO dim_date (date_key, full_date, year, quarter, month, day, month_name, \
         day_name, week_of_year, is_weekend, is_holiday) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )?;
    for day in days_between(first, last) {
        let row = DateRow::new(day);
        stmt.execute(params![
            row.date_key,
            row.full_date,
            row.year,
            row.quarter,
            row.month,
            row.day,
            row.month_name,
            row.day_name,
            row.week_of_year,
            row.is_weekend,
            row.is_holiday,
        ])?;
    }
    Ok(())
}

fn load_payment_methods(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO dim_payment_method (payment_method_name, payment_type) VALUES (?1, ?2)",
    )?;
    for (name, kind) in PAYMENT_METHODS {
        stmt.execute(params![name, kind])?;
    }
    Ok(())
}

fn full_name(customer: &CustomerRecord) -> Option<String> {
    let parts: Vec<&str> = [&customer.first_name, &customer.last_name]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect();
    (!parts.is_empty()).then(|| parts.join(" "))
}

fn load_dim_customers(conn: &Connection, effective: NaiveDate) -> Result<()> {
    let customers: Vec<CustomerRecord> = select_all(conn, Layer::Production)?;
    let mut stmt = conn.prepare(
        "INSERT INTO dim_customers (customer_id, full_name, email, city, state, country, \
         age_group, customer_segment, registration_date, effective_date, end_date, is_current) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'New', ?8, ?9, NULL, 1)",
    )?;
    for customer in &customers {
        stmt.execute(params![
            customer.customer_id,
            full_name(customer),
            customer.email,
            customer.city,
            customer.state,
            customer.country,
            customer.age_group,
            customer.registration_date,
            effective,
        ])?;
    }
    Ok(())
}

fn load_dim_products(conn: &Connection, effective: NaiveDate) -> Result<()> {
    let products: Vec<ProductRecord> = select_all(conn, Layer::Production)?;
    let mut stmt = conn.prepare(
        "INSERT INTO dim_products (product_id, product_name, category, sub_category, brand, \
         price_range, effective_date, end_date, is_current) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, 1)",
    )?;
    for product in &products {
        let price_range = PriceCategory::classify(product.price).map(PriceCategory::label);
        stmt.execute(params![
            product.product_id,
            product.product_name,
            product.category,
            product.sub_category,
            product.brand,
            price_range,
            effective,
        ])?;
    }
    Ok(())
}

fn load_fact_sales(conn: &Connection, created_at: &str) -> Result<()> {
    let inserted = conn.execute(
        "INSERT INTO fact_sales (date_key, customer_key, product_key, payment_method_key, \
         transaction_id, quantity, unit_price, discount_amount, line_total, profit, created_at) \
         SELECT d.date_key, dc.customer_key, dp.product_key, pm.payment_method_key, \
                t.transaction_id, ti.quantity, ti.unit_price, \
                ti.unit_price * ti.quantity * COALESCE(ti.discount_percentage, 0) / 100.0, \
                ti.line_total, \
                ti.line_total - p.cost * ti.quantity, \
                ?1 \
         FROM transaction_items ti \
         JOIN transactions t ON t.transaction_id = ti.transaction_id \
         JOIN dim_date d ON d.full_date = t.transaction_date \
         LEFT JOIN dim_customers dc ON dc.customer_id = t.customer_id AND dc.is_current = 1 \
         LEFT JOIN dim_products dp ON dp.product_id = ti.product_id AND dp.is_current = 1 \
         LEFT JOIN products p ON p.product_id = ti.product_id \
         LEFT JOIN dim_payment_method pm ON pm.payment_method_name = t.payment_method \
         ORDER BY ti.rowid",
        [created_at],
    )?;
    debug!(inserted, "fact_sales loaded");
    Ok(())
}

fn build_aggregates(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "INSERT INTO agg_daily_sales \
         (date_key, total_transactions, total_revenue, total_profit, unique_customers) \
         SELECT date_key, COUNT(DISTINCT transaction_id), SUM(line_total), SUM(profit), \
                COUNT(DISTINCT customer_key) \
         FROM fact_sales GROUP BY date_key;

         INSERT INTO agg_product_performance \
         (product_key, total_quantity_sold, total_revenue, total_profit, avg_discount_amount) \
         SELECT product_key, SUM(quantity), SUM(line_total), SUM(profit), AVG(discount_amount) \
         FROM fact_sales WHERE product_key IS NOT NULL GROUP BY product_key;

         INSERT INTO agg_customer_metrics \
         (customer_key, total_transactions, total_spent, avg_line_value, last_purchase_date) \
         SELECT f.customer_key, COUNT(DISTINCT f.transaction_id), SUM(f.line_total), \
                AVG(f.line_total), MAX(d.full_date) \
         FROM fact_sales f JOIN dim_date d ON d.date_key = f.date_key \
         WHERE f.customer_key IS NOT NULL GROUP BY f.customer_key;",
    )?;
    Ok(())
}
