use std::path::PathBuf;

use ecom_model::ModelError;
use ecom_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed csv in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    #[error("{file} is missing column {column}")]
    MissingColumn { file: String, column: String },

    /// A cell could not be parsed into its column type.
    #[error("{file} line {line}: invalid {column} value {value:?}")]
    InvalidValue {
        file: String,
        line: u64,
        column: String,
        value: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to write ingestion summary: {0}")]
    Summary(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, IngestError>;
