//! Retention cleanup of pipeline working directories.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use ecom_model::RetentionConfig;
use tracing::{debug, info, info_span};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Files removed, or that would be removed on a dry run.
    pub deleted: Vec<PathBuf>,
    pub bytes_freed: u64,
    /// Files kept because of a keyword, their age, or today's date.
    pub kept: usize,
    pub dry_run: bool,
}

/// Whether a file last modified at `modified` is past retention.
///
/// Names containing a preserve keyword (case-insensitive) are never deleted,
/// nor are files modified on the current UTC day.
pub fn should_delete(
    name: &str,
    modified: DateTime<Utc>,
    now: DateTime<Utc>,
    config: &RetentionConfig,
) -> bool {
    let lower = name.to_lowercase();
    if config
        .preserve_keywords
        .iter()
        .any(|keyword| lower.contains(&keyword.to_lowercase()))
    {
        return false;
    }
    if modified.date_naive() == now.date_naive() {
        return false;
    }
    i64::try_from(config.days)
        .ok()
        .and_then(TimeDelta::try_days)
        .and_then(|retention| now.checked_sub_signed(retention))
        .is_some_and(|cutoff| modified < cutoff)
}

/// Delete expired regular files directly inside each retention directory.
/// Missing directories are skipped.
pub fn cleanup(
    config: &RetentionConfig,
    now: DateTime<Utc>,
    dry_run: bool,
) -> io::Result<CleanupReport> {
    let _span = info_span!("cleanup", days = config.days, dry_run).entered();
    let mut report = CleanupReport {
        dry_run,
        ..CleanupReport::default()
    };
    for dir in &config.directories {
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "retention directory missing, skipped");
            continue;
        }
        sweep(dir, config, now, &mut report)?;
    }
    info!(
        deleted = report.deleted.len(),
        kept = report.kept,
        bytes_freed = report.bytes_freed,
        "cleanup complete"
    );
    Ok(report)
}

fn sweep(
    dir: &Path,
    config: &RetentionConfig,
    now: DateTime<Utc>,
    report: &mut CleanupReport,
) -> io::Result<()> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(fs::DirEntry::path);
    for entry in entries {
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let modified = DateTime::<Utc>::from(metadata.modified()?);
        let name = entry.file_name();
        if !should_delete(&name.to_string_lossy(), modified, now, config) {
            report.kept += 1;
            continue;
        }
        let path = entry.path();
        if !report.dry_run {
            fs::remove_file(&path)?;
        }
        debug!(path = %path.display(), dry_run = report.dry_run, "expired file");
        report.bytes_freed += metadata.len();
        report.deleted.push(path);
    }
    Ok(())
}
