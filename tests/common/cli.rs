#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// An isolated working directory with its own snapshot and `HOME`.
pub struct MetricsWorkspace {
    pub temp_dir: TempDir,
    pub snapshot: PathBuf,
}

impl MetricsWorkspace {
    pub fn new(snapshot: &str) -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let path = temp_dir.path().join("issues.json");
        fs::write(&path, snapshot).expect("write snapshot");
        fs::create_dir_all(temp_dir.path().join("home")).expect("create home");
        Self {
            temp_dir,
            snapshot: path,
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn write_config(&self, contents: &str) {
        fs::write(self.root().join("issue-metrics.yaml"), contents).expect("write config");
    }

    /// Command running in the workspace, without the caller's environment
    /// leaking config in.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("issue-metrics"));
        cmd.current_dir(self.root())
            .env("HOME", self.root().join("home"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        for (key, _) in std::env::vars() {
            if key.starts_with("ISSUE_METRICS_") {
                cmd.env_remove(key);
            }
        }
        cmd
    }
}
