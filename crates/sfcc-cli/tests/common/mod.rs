use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

/// Isolated working directory and session file for one test.
pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("state").join("session.json")
    }

    pub fn cwd(&self) -> &Path {
        self.dir.path()
    }

    /// Write a `dw.json` into the working directory.
    pub fn write_project(&self, config: &Value) {
        std::fs::write(
            self.cwd().join("dw.json"),
            serde_json::to_string_pretty(config).unwrap(),
        )
        .unwrap();
    }

    /// Stored entries, or `None` when no session file exists.
    pub fn entries(&self) -> Option<Value> {
        let raw = std::fs::read_to_string(self.store_path()).ok()?;
        Some(serde_json::from_str(&raw).unwrap())
    }

    /// Run the CLI binary with the sandbox's store and working directory.
    ///
    /// Runs on the blocking pool so the mock servers keep responding.
    pub async fn run(&self, args: &[&str], account_manager: &str) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_sfcc-ci"));
        cmd.args(args)
            .current_dir(self.cwd())
            .env("SFCC_CI_STORE", self.store_path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        if account_manager.is_empty() {
            cmd.env_remove("SFCC_ACCOUNT_MANAGER");
        } else {
            cmd.env("SFCC_ACCOUNT_MANAGER", account_manager);
        }

        tokio::task::spawn_blocking(move || cmd.output().expect("Failed to execute CLI"))
            .await
            .unwrap()
    }

    /// Run the CLI and expect success, returning stdout.
    pub async fn run_success(&self, args: &[&str], account_manager: &str) -> String {
        let output = self.run(args, account_manager).await;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// Run the CLI and expect failure, returning stderr.
    pub async fn run_failure(&self, args: &[&str], account_manager: &str) -> String {
        let output = self.run(args, account_manager).await;
        if output.status.success() {
            panic!("CLI command should have failed: {:?}", args);
        }
        String::from_utf8_lossy(&output.stderr).to_string()
    }
}
