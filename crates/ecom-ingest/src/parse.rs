//! Typed access to raw CSV rows.
//!
//! Columns are looked up by header name. Empty cells become NULL; text
//! cells are otherwise kept verbatim so staging mirrors the source file.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use csv::StringRecord;
use ecom_model::{CustomerRecord, ProductRecord, TransactionItemRecord, TransactionRecord};

use crate::error::{IngestError, Result};

/// Header layout of one source file.
pub(crate) struct CsvHeader {
    file: String,
    positions: BTreeMap<String, usize>,
}

impl CsvHeader {
    /// Index the header row, failing if any of `required` is absent.
    pub(crate) fn new(file: &str, headers: &StringRecord, required: &[&str]) -> Result<Self> {
        let positions: BTreeMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.trim_matches('\u{feff}').trim().to_string(), idx))
            .collect();
        if let Some(missing) = required.iter().find(|c| !positions.contains_key(**c)) {
            return Err(IngestError::MissingColumn {
                file: file.to_string(),
                column: (*missing).to_string(),
            });
        }
        Ok(Self {
            file: file.to_string(),
            positions,
        })
    }

    pub(crate) fn row<'a>(&'a self, record: &'a StringRecord) -> CsvRow<'a> {
        CsvRow {
            header: self,
            record,
            line: record.position().map_or(0, csv::Position::line),
        }
    }
}

pub(crate) struct CsvRow<'a> {
    header: &'a CsvHeader,
    record: &'a StringRecord,
    line: u64,
}

impl CsvRow<'_> {
    fn raw(&self, column: &str) -> Option<&str> {
        self.header
            .positions
            .get(column)
            .and_then(|idx| self.record.get(*idx))
            .filter(|value| !value.trim().is_empty())
    }

    fn invalid(&self, column: &str, value: &str) -> IngestError {
        IngestError::InvalidValue {
            file: self.header.file.clone(),
            line: self.line,
            column: column.to_string(),
            value: value.to_string(),
        }
    }

    pub(crate) fn text(&self, column: &str) -> Option<String> {
        self.raw(column).map(str::to_string)
    }

    /// Identifier cells must be non-empty.
    pub(crate) fn id(&self, column: &str) -> Result<String> {
        self.raw(column)
            .map(|value| value.trim().to_string())
            .ok_or_else(|| self.invalid(column, ""))
    }

    fn parsed<T: FromStr>(&self, column: &str) -> Result<Option<T>> {
        match self.raw(column) {
            None => Ok(None),
            Some(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| self.invalid(column, value)),
        }
    }

    /// `inf` and `NaN` parse as `f64` but are not amounts; they are rejected.
    pub(crate) fn float(&self, column: &str) -> Result<Option<f64>> {
        match self.parsed::<f64>(column)? {
            Some(value) if !value.is_finite() => {
                Err(self.invalid(column, self.raw(column).unwrap_or_default()))
            }
            value => Ok(value),
        }
    }

    pub(crate) fn int(&self, column: &str) -> Result<Option<i64>> {
        self.parsed(column)
    }

    pub(crate) fn date(&self, column: &str) -> Result<Option<NaiveDate>> {
        self.parsed(column)
    }
}

/// A staging record that can be decoded from a raw CSV row.
pub(crate) trait FromCsvRow: Sized {
    fn from_csv(row: &CsvRow<'_>) -> Result<Self>;
}

impl FromCsvRow for CustomerRecord {
    fn from_csv(row: &CsvRow<'_>) -> Result<Self> {
        Ok(Self {
            customer_id: row.id("customer_id")?,
            first_name: row.text("first_name"),
            last_name: row.text("last_name"),
            email: row.text("email"),
            phone: row.text("phone"),
            registration_date: row.date("registration_date")?,
            city: row.text("city"),
            state: row.text("state"),
            country: row.text("country"),
            age_group: row.text("age_group"),
        })
    }
}

impl FromCsvRow for ProductRecord {
    fn from_csv(row: &CsvRow<'_>) -> Result<Self> {
        Ok(Self {
            product_id: row.id("product_id")?,
            product_name: row.text("product_name"),
            category: row.text("category"),
            sub_category: row.text("sub_category"),
            price: row.float("price")?,
            cost: row.float("cost")?,
            brand: row.text("brand"),
            stock_quantity: row.int("stock_quantity")?,
            supplier_id: row.text("supplier_id"),
        })
    }
}

impl FromCsvRow for TransactionRecord {
    fn from_csv(row: &CsvRow<'_>) -> Result<Self> {
        Ok(Self {
            transaction_id: row.id("transaction_id")?,
            customer_id: row.text("customer_id"),
            transaction_date: row.date("transaction_date")?,
            transaction_time: row.text("transaction_time"),
            payment_method: row.text("payment_method"),
            shipping_address: row.text("shipping_address"),
            total_amount: row.float("total_amount")?,
        })
    }
}

impl FromCsvRow for TransactionItemRecord {
    fn from_csv(row: &CsvRow<'_>) -> Result<Self> {
        Ok(Self {
            item_id: row.id("item_id")?,
            transaction_id: row.text("transaction_id"),
            product_id: row.text("product_id"),
            quantity: row.int("quantity")?,
            unit_price: row.float("unit_price")?,
            discount_percentage: row.float("discount_percentage")?,
            line_total: row.float("line_total")?,
        })
    }
}
