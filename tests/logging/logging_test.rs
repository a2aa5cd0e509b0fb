//! Tests for `src/logging.rs`.

use tripvoice::logging::LoggingGuard;

#[test]
fn logging_guard_is_send() {
    fn assert_send<T: Send>() {}
    assert_send::<LoggingGuard>();
}

#[test]
fn init_production_creates_logs_dir() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let logs_dir = tmp.path().join("logs");
    assert!(!logs_dir.exists());

    // Only one global subscriber per process; a second install returns Err
    // but the directory is created first.
    let _result = tripvoice::logging::init_production(&logs_dir, "info");
    assert!(logs_dir.exists(), "logs directory should be created");
}

#[test]
fn init_cli_is_repeatable() {
    tripvoice::logging::init_cli("warn");
    tripvoice::logging::init_cli("warn");
}
