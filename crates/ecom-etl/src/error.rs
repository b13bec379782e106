use ecom_model::{Entity, ModelError};
use ecom_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EtlError {
    /// A loader faulted; the whole run was rolled back.
    #[error("{entity} loader failed: {source}")]
    Loader {
        entity: Entity,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to write transformation summary: {0}")]
    Summary(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, EtlError>;
