use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};

use chrono::Utc;
use ecom_cli::cleanup::cleanup;
use ecom_model::RetentionConfig;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

fn touch(path: &Path, age: Duration) {
    fs::write(path, b"0123456789").unwrap();
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() - age).unwrap();
}

fn config(dirs: &[&Path]) -> RetentionConfig {
    RetentionConfig {
        days: 7,
        directories: dirs.iter().copied().map(Path::to_path_buf).collect(),
        ..RetentionConfig::default()
    }
}

#[test]
fn expired_files_are_removed_and_the_rest_kept() {
    let root = tempfile::tempdir().unwrap();
    let raw = root.path().join("raw");
    fs::create_dir(&raw).unwrap();
    touch(&raw.join("customers.csv"), DAY * 10);
    touch(&raw.join("ingestion_summary.json"), DAY * 10);
    touch(&raw.join("products.csv"), DAY * 2);
    fs::create_dir(raw.join("archive")).unwrap();

    let missing = root.path().join("logs");
    let report = cleanup(&config(&[&raw, &missing]), Utc::now(), false).unwrap();

    assert_eq!(report.deleted, vec![raw.join("customers.csv")]);
    assert_eq!(report.bytes_freed, 10);
    assert_eq!(report.kept, 2);
    assert!(!raw.join("customers.csv").exists());
    assert!(raw.join("ingestion_summary.json").exists());
    assert!(raw.join("products.csv").exists());
    assert!(raw.join("archive").is_dir());
}

#[test]
fn dry_run_deletes_nothing() {
    let root = tempfile::tempdir().unwrap();
    touch(&root.path().join("old.log"), DAY * 30);

    let report = cleanup(&config(&[root.path()]), Utc::now(), true).unwrap();
    assert!(report.dry_run);
    assert_eq!(report.deleted, vec![root.path().join("old.log")]);
    assert!(root.path().join("old.log").exists());
}
