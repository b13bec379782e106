//! JSON artifact output shared by every pipeline stage.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{ModelError, Result};

/// Write `value` as pretty-printed JSON to `path`, creating parent directories.
///
/// The file is truncated if it already exists; artifacts describe a single run.
pub fn write_json_artifact<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let io_err = |source| ModelError::ArtifactIo {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| {
        ModelError::ArtifactJson {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.write_all(b"\n").map_err(io_err)?;
    writer.flush().map_err(io_err)?;
    Ok(())
}

/// Timestamp format used inside every artifact, e.g. `2024-06-01T08:30:00.000000`.
pub fn artifact_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}
