//! Raw CSV ingestion into the staging relations.
//!
//! The four source files are read, typed and written to staging in a
//! single transaction: either every staging table is replaced or none is.
//! An [`IngestionSummary`] is written whatever the outcome.

pub mod error;
mod parse;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use csv::ReaderBuilder;
use ecom_model::{
    CustomerRecord, Entity, IngestionSummary, Layer, ProductRecord, TableLoad, TableLoadStatus,
    TransactionItemRecord, TransactionRecord, artifact_timestamp, round2, write_json_artifact,
};
use ecom_store::{InsertMode, Record, Store, clear_table, insert_record};
use rusqlite::Connection;
use sha2::Digest;
use tracing::{info, info_span, warn};

pub use error::{IngestError, Result};
use parse::{CsvHeader, FromCsvRow};

/// Rows written and source digest for one staging table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableIngest {
    pub rows_loaded: u64,
    pub source_sha256: String,
}

/// Loads the generator's CSV output from one directory.
#[derive(Debug, Clone)]
pub struct Ingestor {
    raw_dir: PathBuf,
}

impl Ingestor {
    pub fn new(raw_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
        }
    }

    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    /// Replace all four staging tables from the raw files.
    ///
    /// Nothing is committed unless every file parses.
    pub fn ingest(&self, store: &mut Store) -> Result<BTreeMap<Entity, TableIngest>> {
        let tx = store.connection_mut().transaction()?;
        let mut loaded = BTreeMap::new();
        loaded.insert(Entity::Customers, self.load_file::<CustomerRecord>(&tx)?);
        loaded.insert(Entity::Products, self.load_file::<ProductRecord>(&tx)?);
        loaded.insert(Entity::Transactions, self.load_file::<TransactionRecord>(&tx)?);
        loaded.insert(Entity::TransactionItems, self.load_file::<TransactionItemRecord>(&tx)?);
        tx.commit()?;
        Ok(loaded)
    }

    /// Ingest, then write the summary to `summary_path` on success and failure.
    ///
    /// On failure the summary marks every table failed and the ingestion
    /// error is returned after the summary has been written.
    pub fn run(&self, store: &mut Store, summary_path: &Path) -> Result<IngestionSummary> {
        let _span = info_span!("ingest", raw_dir = %self.raw_dir.display()).entered();
        let started = Instant::now();
        let timestamp = artifact_timestamp(Utc::now());
        let outcome = self.ingest(store);

        let tables_loaded = match &outcome {
            Ok(loaded) => loaded
                .iter()
                .map(|(entity, table)| {
                    let load = TableLoad {
                        rows_loaded: table.rows_loaded,
                        status: TableLoadStatus::Success,
                        error_message: None,
                        source_sha256: Some(table.source_sha256.clone()),
                    };
                    (Layer::Staging.qualified(*entity), load)
                })
                .collect(),
            Err(err) => {
                warn!(error = %err, "ingestion rolled back");
                Entity::LOAD_ORDER
                    .iter()
                    .map(|entity| {
                        let load = TableLoad {
                            rows_loaded: 0,
                            status: TableLoadStatus::Failed,
                            error_message: Some(err.to_string()),
                            source_sha256: None,
                        };
                        (Layer::Staging.qualified(*entity), load)
                    })
                    .collect()
            }
        };

        let elapsed = started.elapsed().as_secs_f64();
        let summary = IngestionSummary {
            ingestion_timestamp: timestamp,
            tables_loaded,
            total_execution_time_seconds: round2(elapsed),
        };
        write_json_artifact(&summary, summary_path)?;
        outcome?;
        info!(rows = summary.total_rows(), "ingestion complete");
        Ok(summary)
    }

    fn load_file<R: Record + FromCsvRow>(&self, conn: &Connection) -> Result<TableIngest> {
        let entity = R::ENTITY;
        let file = entity.csv_file_name();
        let path = self.raw_dir.join(file);
        let bytes = fs::read(&path).map_err(|source| IngestError::Read {
            path: path.clone(),
            source,
        })?;
        let source_sha256 = sha256_hex(&bytes);

        let csv_err = |source| IngestError::Csv {
            file: file.to_string(),
            source,
        };
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes.as_slice());
        let header = CsvHeader::new(file, reader.headers().map_err(csv_err)?, R::COLUMNS)?;

        let table = Layer::Staging.table(entity);
        clear_table(conn, table)?;
        let mut rows_loaded = 0u64;
        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            let row = R::from_csv(&header.row(&record))?;
            insert_record(conn, Layer::Staging, &row, InsertMode::Insert)?;
            rows_loaded += 1;
        }
        info!(table, rows_loaded, "staged");
        Ok(TableIngest {
            rows_loaded,
            source_sha256,
        })
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(sha2::Sha256::digest(bytes))
}
