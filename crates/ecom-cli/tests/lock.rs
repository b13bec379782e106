use std::fs;

use ecom_cli::lock::{LockAttempt, RunLock};

#[test]
fn second_acquire_sees_the_holder_pid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.lock");

    let LockAttempt::Acquired(lock) = RunLock::acquire(&path).unwrap() else {
        panic!("first acquire should succeed");
    };
    assert_eq!(lock.path(), path);
    let written: u32 = fs::read_to_string(&path).unwrap().trim().parse().unwrap();
    assert_eq!(written, std::process::id());

    match RunLock::acquire(&path).unwrap() {
        LockAttempt::Held { pid } => assert_eq!(pid, Some(std::process::id())),
        LockAttempt::Acquired(_) => panic!("lock was acquired twice"),
    }
}

#[test]
fn dropping_the_lock_releases_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run").join("pipeline.lock");
    {
        let attempt = RunLock::acquire(&path).unwrap();
        assert!(matches!(attempt, LockAttempt::Acquired(_)));
        assert!(path.exists());
    }
    assert!(!path.exists());
    assert!(matches!(RunLock::acquire(&path).unwrap(), LockAttempt::Acquired(_)));
}

#[test]
fn stale_marker_blocks_until_broken() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.lock");
    fs::write(&path, "not-a-pid\n").unwrap();

    assert!(matches!(
        RunLock::acquire(&path).unwrap(),
        LockAttempt::Held { pid: None }
    ));
    assert!(RunLock::break_lock(&path).unwrap());
    assert!(!RunLock::break_lock(&path).unwrap());
    assert!(matches!(RunLock::acquire(&path).unwrap(), LockAttempt::Acquired(_)));
}
