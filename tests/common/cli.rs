#![allow(dead_code)]

use assert_cmd::Command;
use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tempfile::TempDir;

#[derive(Debug)]
pub struct BugdeskRun {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
    pub duration: Duration,
    pub log_path: PathBuf,
}

impl BugdeskRun {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|err| panic!("stdout is not JSON ({err}): {}", self.stdout))
    }

    /// The structured error printed last on stderr, after any log lines.
    pub fn error_json(&self) -> serde_json::Value {
        let start = if self.stderr.starts_with('{') {
            0
        } else {
            self.stderr
                .find("\n{")
                .map(|idx| idx + 1)
                .unwrap_or_else(|| panic!("no JSON error on stderr: {}", self.stderr))
        };
        serde_json::from_str(&self.stderr[start..])
            .unwrap_or_else(|err| panic!("stderr is not JSON ({err}): {}", self.stderr))
    }
}

pub struct BugdeskWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub log_dir: PathBuf,
}

impl BugdeskWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        let log_dir = root.join("logs");
        fs::create_dir_all(&log_dir).expect("log dir");
        Self {
            temp_dir,
            root,
            log_dir,
        }
    }

    /// A workspace with `init` already run.
    pub fn initialized() -> Self {
        let workspace = Self::new();
        let run = run_bugdesk(&workspace, ["init"], "init");
        assert!(run.status.success(), "init failed: {}", run.stderr);
        workspace
    }
}

pub fn run_bugdesk<I, S>(workspace: &BugdeskWorkspace, args: I, label: &str) -> BugdeskRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_bugdesk_with_env(
        workspace,
        args,
        std::iter::empty::<(String, String)>(),
        label,
    )
}

pub fn run_bugdesk_with_env<I, S, E, K, V>(
    workspace: &BugdeskWorkspace,
    args: I,
    env_vars: E,
    label: &str,
) -> BugdeskRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    E: IntoIterator<Item = (K, V)>,
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("bugdesk"));
    cmd.current_dir(&workspace.root);
    cmd.args(args);
    cmd.env_remove("BUGDESK_DIR");
    cmd.env_remove("BUGDESK_ACTOR");
    cmd.envs(env_vars);
    cmd.env("NO_COLOR", "1");
    cmd.env("RUST_LOG", "bugdesk=debug");
    cmd.env("RUST_BACKTRACE", "1");
    cmd.env("HOME", &workspace.root);

    let start = Instant::now();
    let output = cmd.output().expect("run bugdesk");
    let duration = start.elapsed();

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let log_path = workspace.log_dir.join(format!("{label}.log"));
    let log_body = format!(
        "label: {label}\nstatus: {}\nduration: {duration:?}\n\nstdout:\n{stdout}\n\nstderr:\n{stderr}\n",
        output.status
    );
    fs::write(&log_path, log_body).expect("write log");

    BugdeskRun {
        stdout,
        stderr,
        status: output.status,
        duration,
        log_path,
    }
}
