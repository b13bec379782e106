//! The six check categories.
//!
//! Each check runs read-only count queries against the relations of one
//! layer and returns its violation counts keyed by detail name.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use ecom_model::{CheckCategory, Entity, Layer};
use rusqlite::{Connection, ToSql};

/// Inputs shared by every check in one scoring run.
pub struct CheckContext<'a> {
    pub conn: &'a Connection,
    pub layer: Layer,
    /// Dates after this count as future transactions.
    pub as_of: NaiveDate,
    pub line_total_tolerance: f64,
}

impl CheckContext<'_> {
    fn table(&self, entity: Entity) -> &'static str {
        self.layer.table(entity)
    }

    fn count(&self, sql: &str, params: &[&dyn ToSql]) -> rusqlite::Result<u64> {
        let count: i64 = self.conn.query_row(sql, params, |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

pub type Details = BTreeMap<String, u64>;

/// Relations a category reads, as qualified names.
pub fn tables_checked(category: CheckCategory, layer: Layer) -> Vec<String> {
    let entities: &[Entity] = match category {
        CheckCategory::Completeness => &Entity::LOAD_ORDER,
        CheckCategory::Uniqueness => &[Entity::Customers],
        CheckCategory::Referential => &Entity::LOAD_ORDER,
        CheckCategory::Validity => &[Entity::Products, Entity::TransactionItems],
        CheckCategory::Consistency => &[Entity::TransactionItems],
        CheckCategory::Accuracy => &[Entity::Transactions, Entity::Customers],
    };
    entities.iter().map(|e| layer.qualified(*e)).collect()
}

pub fn run_check(category: CheckCategory, ctx: &CheckContext<'_>) -> rusqlite::Result<Details> {
    match category {
        CheckCategory::Completeness => completeness(ctx),
        CheckCategory::Uniqueness => uniqueness(ctx),
        CheckCategory::Referential => referential(ctx),
        CheckCategory::Validity => validity(ctx),
        CheckCategory::Consistency => consistency(ctx),
        CheckCategory::Accuracy => accuracy(ctx),
    }
}

fn completeness(ctx: &CheckContext<'_>) -> rusqlite::Result<Details> {
    let customers = ctx.table(Entity::Customers);
    let products = ctx.table(Entity::Products);
    let transactions = ctx.table(Entity::Transactions);
    let items = ctx.table(Entity::TransactionItems);
    let layer = ctx.layer.as_str();

    let mut details = Details::new();
    details.insert(
        format!("{layer}.customers.email"),
        ctx.count(
            &format!("SELECT COUNT(*) FROM {customers} WHERE email IS NULL OR email = ''"),
            &[],
        )?,
    );
    details.insert(
        format!("{layer}.transactions.total_amount"),
        ctx.count(
            &format!("SELECT COUNT(*) FROM {transactions} WHERE total_amount IS NULL"),
            &[],
        )?,
    );
    details.insert(
        format!("{layer}.products.price"),
        ctx.count(&format!("SELECT COUNT(*) FROM {products} WHERE price IS NULL"), &[])?,
    );
    details.insert(
        format!("{layer}.transaction_items.quantity"),
        ctx.count(&format!("SELECT COUNT(*) FROM {items} WHERE quantity IS NULL"), &[])?,
    );
    Ok(details)
}

fn uniqueness(ctx: &CheckContext<'_>) -> rusqlite::Result<Details> {
    let customers = ctx.table(Entity::Customers);
    let mut details = Details::new();
    details.insert(
        "duplicate_customer_ids".to_string(),
        ctx.count(
            &format!(
                "SELECT COUNT(*) FROM (SELECT customer_id FROM {customers} \
                 GROUP BY customer_id HAVING COUNT(*) > 1)"
            ),
            &[],
        )?,
    );
    details.insert(
        "duplicate_emails".to_string(),
        ctx.count(
            &format!(
                "SELECT COUNT(*) FROM (SELECT email FROM {customers} \
                 WHERE email IS NOT NULL AND email <> '' \
                 GROUP BY email HAVING COUNT(*) > 1)"
            ),
            &[],
        )?,
    );
    Ok(details)
}

fn referential(ctx: &CheckContext<'_>) -> rusqlite::Result<Details> {
    let customers = ctx.table(Entity::Customers);
    let products = ctx.table(Entity::Products);
    let transactions = ctx.table(Entity::Transactions);
    let items = ctx.table(Entity::TransactionItems);

    let mut details = Details::new();
    details.insert(
        "transactions_without_customers".to_string(),
        ctx.count(
            &format!(
                "SELECT COUNT(*) FROM {transactions} t \
                 WHERE NOT EXISTS (SELECT 1 FROM {customers} c WHERE c.customer_id = t.customer_id)"
            ),
            &[],
        )?,
    );
    details.insert(
        "items_without_transactions".to_string(),
        ctx.count(
            &format!(
                "SELECT COUNT(*) FROM {items} i \
                 WHERE NOT EXISTS \
                 (SELECT 1 FROM {transactions} t WHERE t.transaction_id = i.transaction_id)"
            ),
            &[],
        )?,
    );
    details.insert(
        "items_without_products".to_string(),
        ctx.count(
            &format!(
                "SELECT COUNT(*) FROM {items} i \
                 WHERE NOT EXISTS (SELECT 1 FROM {products} p WHERE p.product_id = i.product_id)"
            ),
            &[],
        )?,
    );
    Ok(details)
}

fn validity(ctx: &CheckContext<'_>) -> rusqlite::Result<Details> {
    let products = ctx.table(Entity::Products);
    let items = ctx.table(Entity::TransactionItems);

    let mut details = Details::new();
    details.insert(
        "invalid_prices_or_costs".to_string(),
        ctx.count(
            &format!("SELECT COUNT(*) FROM {products} WHERE price <= 0 OR cost < 0"),
            &[],
        )?,
    );
    details.insert(
        "invalid_discounts".to_string(),
        ctx.count(
            &format!(
                "SELECT COUNT(*) FROM {items} \
                 WHERE discount_percentage < 0 OR discount_percentage > 100"
            ),
            &[],
        )?,
    );
    details.insert(
        "invalid_quantities".to_string(),
        ctx.count(&format!("SELECT COUNT(*) FROM {items} WHERE quantity <= 0"), &[])?,
    );
    Ok(details)
}

fn consistency(ctx: &CheckContext<'_>) -> rusqlite::Result<Details> {
    let items = ctx.table(Entity::TransactionItems);
    let mismatches = ctx.count(
        &format!(
            "SELECT COUNT(*) FROM {items} \
             WHERE ABS(line_total - quantity * unit_price \
             * (1 - COALESCE(discount_percentage, 0) / 100.0)) > ?1"
        ),
        &[&ctx.line_total_tolerance],
    )?;
    Ok(Details::from([(
        "line_total_formula_mismatch".to_string(),
        mismatches,
    )]))
}

fn accuracy(ctx: &CheckContext<'_>) -> rusqlite::Result<Details> {
    let customers = ctx.table(Entity::Customers);
    let transactions = ctx.table(Entity::Transactions);

    let mut details = Details::new();
    details.insert(
        "future_transactions".to_string(),
        ctx.count(
            &format!("SELECT COUNT(*) FROM {transactions} WHERE transaction_date > ?1"),
            &[&ctx.as_of],
        )?,
    );
    details.insert(
        "registration_after_transaction".to_string(),
        ctx.count(
            &format!(
                "SELECT COUNT(*) FROM {transactions} t \
                 JOIN {customers} c ON t.customer_id = c.customer_id \
                 WHERE t.transaction_date < c.registration_date"
            ),
            &[],
        )?,
    );
    Ok(details)
}
