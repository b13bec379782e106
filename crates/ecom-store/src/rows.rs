//! Mapping between entity records and their relations.

use ecom_model::{
    CustomerRecord, Entity, Layer, ProductRecord, TransactionItemRecord, TransactionRecord,
};
use rusqlite::types::ToSql;
use rusqlite::{Connection, Row};

use crate::error::Result;

/// A record stored in a staging relation and mirrored in production.
pub trait Record: Sized {
    const ENTITY: Entity;
    /// Columns shared by both layers, identifier first.
    const COLUMNS: &'static [&'static str];

    /// Decode a row selected with [`Self::COLUMNS`] in order.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn id(&self) -> &str;

    /// Values for [`Self::COLUMNS`], in the same order.
    fn values(&self) -> Vec<&dyn ToSql>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMode {
    /// Fail on a key conflict.
    Insert,
    /// Replace the conflicting row.
    Replace,
}

/// Read every row of the entity's relation in `layer`, in insertion order.
pub fn select_all<R: Record>(conn: &Connection, layer: Layer) -> Result<Vec<R>> {
    let sql = format!(
        "SELECT {} FROM {} ORDER BY rowid",
        R::COLUMNS.join(", "),
        layer.table(R::ENTITY)
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| R::from_row(row))?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Staging rows whose identifier is not yet present in production.
pub fn select_unloaded<R: Record>(conn: &Connection) -> Result<Vec<R>> {
    let id = R::ENTITY.id_column();
    let columns: Vec<String> = R::COLUMNS.iter().map(|c| format!("s.{c}")).collect();
    let sql = format!(
        "SELECT {columns} FROM {staging} s \
         WHERE NOT EXISTS (SELECT 1 FROM {production} p WHERE p.{id} = s.{id}) \
         ORDER BY s.rowid",
        columns = columns.join(", "),
        staging = Layer::Staging.table(R::ENTITY),
        production = Layer::Production.table(R::ENTITY),
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| R::from_row(row))?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Insert one row. `columns` and `values` must line up.
pub fn insert_row(
    conn: &Connection,
    table: &str,
    columns: &[&str],
    values: &[&dyn ToSql],
    mode: InsertMode,
) -> Result<()> {
    let verb = match mode {
        InsertMode::Insert => "INSERT",
        InsertMode::Replace => "INSERT OR REPLACE",
    };
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "{verb} INTO {table} ({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    stmt.execute(values)?;
    Ok(())
}

/// Insert a record into the entity's relation in `layer` using only its base columns.
pub fn insert_record<R: Record>(
    conn: &Connection,
    layer: Layer,
    record: &R,
    mode: InsertMode,
) -> Result<()> {
    insert_row(
        conn,
        layer.table(R::ENTITY),
        R::COLUMNS,
        &record.values(),
        mode,
    )
}

/// Delete every row of `table`, returning how many were removed.
pub fn clear_table(conn: &Connection, table: &str) -> Result<usize> {
    Ok(conn.execute(&format!("DELETE FROM {table}"), [])?)
}

pub fn count_rows(conn: &Connection, table: &str) -> Result<u64> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })?;
    Ok(count.max(0) as u64)
}

impl Record for CustomerRecord {
    const ENTITY: Entity = Entity::Customers;
    const COLUMNS: &'static [&'static str] = &[
        "customer_id",
        "first_name",
        "last_name",
        "email",
        "phone",
        "registration_date",
        "city",
        "state",
        "country",
        "age_group",
    ];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            customer_id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            email: row.get(3)?,
            phone: row.get(4)?,
            registration_date: row.get(5)?,
            city: row.get(6)?,
            state: row.get(7)?,
            country: row.get(8)?,
            age_group: row.get(9)?,
        })
    }

    fn id(&self) -> &str {
        &self.customer_id
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.customer_id,
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.phone,
            &self.registration_date,
            &self.city,
            &self.state,
            &self.country,
            &self.age_group,
        ]
    }
}

impl Record for ProductRecord {
    const ENTITY: Entity = Entity::Products;
    const COLUMNS: &'static [&'static str] = &[
        "product_id",
        "product_name",
        "category",
        "sub_category",
        "price",
        "cost",
        "brand",
        "stock_quantity",
        "supplier_id",
    ];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            product_id: row.get(0)?,
            product_name: row.get(1)?,
            category: row.get(2)?,
            sub_category: row.get(3)?,
            price: row.get(4)?,
            cost: row.get(5)?,
            brand: row.get(6)?,
            stock_quantity: row.get(7)?,
            supplier_id: row.get(8)?,
        })
    }

    fn id(&self) -> &str {
        &self.product_id
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.product_id,
            &self.product_name,
            &self.category,
            &self.sub_category,
            &self.price,
            &self.cost,
            &self.brand,
            &self.stock_quantity,
            &self.supplier_id,
        ]
    }
}

impl Record for TransactionRecord {
    const ENTITY: Entity = Entity::Transactions;
    const COLUMNS: &'static [&'static str] = &[
        "transaction_id",
        "customer_id",
        "transaction_date",
        "transaction_time",
        "payment_method",
        "shipping_address",
        "total_amount",
    ];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            transaction_id: row.get(0)?,
            customer_id: row.get(1)?,
            transaction_date: row.get(2)?,
            transaction_time: row.get(3)?,
            payment_method: row.get(4)?,
            shipping_address: row.get(5)?,
            total_amount: row.get(6)?,
        })
    }

    fn id(&self) -> &str {
        &self.transaction_id
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.transaction_id,
            &self.customer_id,
            &self.transaction_date,
            &self.transaction_time,
            &self.payment_method,
            &self.shipping_address,
            &self.total_amount,
        ]
    }
}

impl Record for TransactionItemRecord {
    const ENTITY: Entity = Entity::TransactionItems;
    const COLUMNS: &'static [&'static str] = &[
        "item_id",
        "transaction_id",
        "product_id",
        "quantity",
        "unit_price",
        "discount_percentage",
        "line_total",
    ];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            item_id: row.get(0)?,
            transaction_id: row.get(1)?,
            product_id: row.get(2)?,
            quantity: row.get(3)?,
            unit_price: row.get(4)?,
            discount_percentage: row.get(5)?,
            line_total: row.get(6)?,
        })
    }

    fn id(&self) -> &str {
        &self.item_id
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.item_id,
            &self.transaction_id,
            &self.product_id,
            &self.quantity,
            &self.unit_price,
            &self.discount_percentage,
            &self.line_total,
        ]
    }
}
