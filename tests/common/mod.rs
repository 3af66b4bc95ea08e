#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::Once;
use tempfile::TempDir;

pub mod cli;
pub mod fixtures;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        issue_metrics::logging::init_test_logging();
    });
}

/// Write `contents` as `issues.json` in a fresh temp dir.
pub fn snapshot_file(contents: &str) -> (TempDir, PathBuf) {
    init_test_logging();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("issues.json");
    fs::write(&path, contents).expect("Failed to write snapshot");
    (dir, path)
}
