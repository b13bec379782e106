//! Staging-to-production loaders.
//!
//! Two strategies exist and are kept as separate code paths:
//!
//! - **Rebuild** (customers, products): the destination is emptied and every
//!   staging row is normalized and reinserted. No row is ever rejected.
//! - **Append** (transactions, items): only staging rows whose identifier is
//!   absent from production are candidates. Candidates failing a business
//!   rule are counted and skipped; existing production rows are never touched.

use std::collections::HashSet;

use ecom_model::{
    CustomerRecord, Entity, Layer, LoadCounts, ProductRecord, TransactionItemRecord,
    TransactionRecord,
};
use ecom_store::{
    InsertMode, Record, Result, clear_table, insert_record, insert_row, select_all,
    select_unloaded,
};
use ecom_transform::{
    PriceCategory, RejectReason, check_item, check_transaction, line_total, normalize_email,
    normalize_phone, normalize_text, profit_margin, title_case,
};
use rusqlite::Connection;
use rusqlite::types::ToSql;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStrategy {
    Rebuild,
    Append,
}

/// State shared by every loader within one driver run.
pub struct LoadContext<'a> {
    /// Connection inside the driver's open transaction.
    pub conn: &'a Connection,
    /// Stamp written to `loaded_at` on appended rows.
    pub loaded_at: &'a str,
}

/// Moves one entity from staging to production.
pub trait Loader {
    fn entity(&self) -> Entity;

    fn strategy(&self) -> LoadStrategy;

    /// Run the load, returning per-row accounting.
    fn load(&self, ctx: &LoadContext<'_>) -> Result<LoadCounts>;
}

pub struct CustomerLoader;

impl Loader for CustomerLoader {
    fn entity(&self) -> Entity {
        Entity::Customers
    }

    fn strategy(&self) -> LoadStrategy {
        LoadStrategy::Rebuild
    }

    fn load(&self, ctx: &LoadContext<'_>) -> Result<LoadCounts> {
        rebuild(ctx.conn, |conn, staged: CustomerRecord| {
            insert_record(conn, Layer::Production, &clean_customer(staged), InsertMode::Replace)
        })
    }
}

pub struct ProductLoader;

impl Loader for ProductLoader {
    fn entity(&self) -> Entity {
        Entity::Products
    }

    fn strategy(&self) -> LoadStrategy {
        LoadStrategy::Rebuild
    }

    fn load(&self, ctx: &LoadContext<'_>) -> Result<LoadCounts> {
        rebuild(ctx.conn, |conn, staged: ProductRecord| {
            let product = clean_product(staged);
            let margin = profit_margin(product.price, product.cost);
            let category = PriceCategory::classify(product.price).map(PriceCategory::label);

            let mut columns = ProductRecord::COLUMNS.to_vec();
            columns.extend(["profit_margin", "price_category"]);
            let mut values = product.values();
            values.push(&margin);
            values.push(&category);
            insert_row(
                conn,
                Layer::Production.table(Entity::Products),
                &columns,
                &values,
                InsertMode::Replace,
            )
        })
    }
}

pub struct TransactionLoader;

impl Loader for TransactionLoader {
    fn entity(&self) -> Entity {
        Entity::Transactions
    }

    fn strategy(&self) -> LoadStrategy {
        LoadStrategy::Append
    }

    fn load(&self, ctx: &LoadContext<'_>) -> Result<LoadCounts> {
        append(ctx, check_transaction, |txn: TransactionRecord| TransactionRecord {
            customer_id: normalize_text(txn.customer_id.as_deref()),
            transaction_time: normalize_text(txn.transaction_time.as_deref()),
            payment_method: normalize_text(txn.payment_method.as_deref()),
            shipping_address: normalize_text(txn.shipping_address.as_deref()),
            ..txn
        })
    }
}

pub struct TransactionItemLoader;

impl Loader for TransactionItemLoader {
    fn entity(&self) -> Entity {
        Entity::TransactionItems
    }

    fn strategy(&self) -> LoadStrategy {
        LoadStrategy::Append
    }

    fn load(&self, ctx: &LoadContext<'_>) -> Result<LoadCounts> {
        append(ctx, check_item, |item: TransactionItemRecord| {
            let total = line_total(item.quantity, item.unit_price, item.discount_percentage);
            TransactionItemRecord {
                transaction_id: normalize_text(item.transaction_id.as_deref()),
                product_id: normalize_text(item.product_id.as_deref()),
                line_total: total,
                ..item
            }
        })
    }
}

/// Empty the production relation and reinsert every staging row.
///
/// Staging may hold the same identifier twice; the later row wins.
fn rebuild<R, F>(conn: &Connection, mut insert: F) -> Result<LoadCounts>
where
    R: Record,
    F: FnMut(&Connection, R) -> Result<()>,
{
    let staged: Vec<R> = select_all(conn, Layer::Staging)?;
    let removed = clear_table(conn, Layer::Production.table(R::ENTITY))?;
    debug!(entity = %R::ENTITY, removed, "cleared production relation");

    let mut counts = LoadCounts::default();
    for row in staged {
        insert(conn, row)?;
        counts.record_output();
    }
    Ok(counts)
}

/// Insert staging rows not yet in production that pass `check`.
fn append<R, C, T>(ctx: &LoadContext<'_>, check: C, transform: T) -> Result<LoadCounts>
where
    R: Record,
    C: Fn(&R) -> Option<RejectReason>,
    T: Fn(R) -> R,
{
    let candidates: Vec<R> = select_unloaded(ctx.conn)?;
    let table = Layer::Production.table(R::ENTITY);
    let mut columns = R::COLUMNS.to_vec();
    columns.push("loaded_at");

    let mut counts = LoadCounts::default();
    let mut admitted: HashSet<String> = HashSet::new();
    for row in candidates {
        let rejection = check(&row).or_else(|| {
            admitted
                .contains(row.id())
                .then_some(RejectReason::DuplicateIdentifier)
        });
        if let Some(reason) = rejection {
            counts.record_rejection(reason.as_str());
            continue;
        }
        admitted.insert(row.id().to_string());
        let row = transform(row);
        let mut values = row.values();
        values.push(&ctx.loaded_at as &dyn ToSql);
        insert_row(ctx.conn, table, &columns, &values, InsertMode::Insert)?;
        counts.record_output();
    }
    Ok(counts)
}

fn clean_customer(staged: CustomerRecord) -> CustomerRecord {
    CustomerRecord {
        customer_id: staged.customer_id,
        first_name: title_case(staged.first_name.as_deref()),
        last_name: title_case(staged.last_name.as_deref()),
        email: normalize_email(staged.email.as_deref()),
        phone: normalize_phone(staged.phone.as_deref()),
        registration_date: staged.registration_date,
        city: normalize_text(staged.city.as_deref()),
        state: normalize_text(staged.state.as_deref()),
        country: normalize_text(staged.country.as_deref()),
        age_group: normalize_text(staged.age_group.as_deref()),
    }
}

fn clean_product(staged: ProductRecord) -> ProductRecord {
    ProductRecord {
        product_name: normalize_text(staged.product_name.as_deref()),
        category: normalize_text(staged.category.as_deref()),
        sub_category: normalize_text(staged.sub_category.as_deref()),
        brand: normalize_text(staged.brand.as_deref()),
        supplier_id: normalize_text(staged.supplier_id.as_deref()),
        ..staged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_fields_are_normalized() {
        let staged = CustomerRecord {
            customer_id: "C1".to_string(),
            first_name: Some("  aSHA ".to_string()),
            last_name: Some("".to_string()),
            email: Some(" Asha@Example.COM ".to_string()),
            phone: Some("+91 (987) 654-3210".to_string()),
            city: Some(" New Delhi ".to_string()),
            ..CustomerRecord::default()
        };
        let clean = clean_customer(staged);
        assert_eq!(clean.first_name.as_deref(), Some("Asha"));
        assert_eq!(clean.last_name, None);
        assert_eq!(clean.email.as_deref(), Some("asha@example.com"));
        assert_eq!(clean.phone.as_deref(), Some("919876543210"));
        assert_eq!(clean.city.as_deref(), Some("New Delhi"));
    }
}
