pub mod artifact;
pub mod config;
pub mod entity;
pub mod error;
pub mod ingest;
pub mod monitor;
pub mod numeric;
pub mod quality;
pub mod records;
pub mod summary;

pub use artifact::{artifact_timestamp, write_json_artifact};
pub use config::{
    DatabaseConfig, MonitorConfig, PathsConfig, PipelineConfig, QualityConfig, RetentionConfig,
};
pub use entity::{Entity, Layer};
pub use error::{ModelError, Result};
pub use ingest::{IngestionSummary, TableLoad, TableLoadStatus};
pub use monitor::{Alert, AlertSeverity, CheckHealth, HealthStatus, MonitoringReport};
pub use numeric::round2;
pub use quality::{CheckCategory, CheckResult, CheckStatus, Grade, QualityReport};
pub use records::{CustomerRecord, ProductRecord, TransactionItemRecord, TransactionRecord};
pub use summary::{LoadCounts, PostTransformQuality, TransformationSummary};
