//! Integration tests driving a scripted cdsctl executable

#![cfg(unix)]

use cds_explorer::client::{CdsctlFactory, ClientFactory};
use cds_explorer::error::{ClientError, ExplorerError};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write a fake cdsctl that logs its arguments and answers a few commands
fn fake_cdsctl(dir: &TempDir) -> (PathBuf, PathBuf) {
    let log = dir.path().join("calls.log");
    let script = dir.path().join("cdsctl");
    let body = format!(
        r#"#!/bin/sh
echo "$*" >> "{log}"
case "$*" in
  *"admin curl /config/user"*)
    echo '{{"url.api": "https://api.example.com", "url.ui": "https://ui.example.com/"}}' ;;
  *"project list --format json"*)
    echo '[{{"key": "PRJ", "name": "Project"}}]' ;;
  *"workflow list BROKEN --format json"*)
    echo "forbidden" >&2
    exit 3 ;;
esac
"#,
        log = log.display()
    );
    std::fs::write(&script, body).unwrap();
    let mut perms = std::fs::metadata(&script).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&script, perms).unwrap();
    (script, log)
}

fn calls(log: &Path) -> Vec<String> {
    std::fs::read_to_string(log)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_structured_command_appends_format_json() {
    let dir = TempDir::new().unwrap();
    let (script, log) = fake_cdsctl(&dir);
    let cdsrc = dir.path().join("cdsrc");
    let client = CdsctlFactory::new(script).create(&cdsrc, "prod");

    let out = client.run_cds_command("project list").await.unwrap();
    assert!(out.contains("\"PRJ\""));
    assert_eq!(
        calls(&log),
        vec![format!(
            "--file {} --context prod project list --format json",
            cdsrc.display()
        )]
    );
}

#[tokio::test]
async fn test_init_resolves_ui_url_once() {
    let dir = TempDir::new().unwrap();
    let (script, log) = fake_cdsctl(&dir);
    let cdsrc = dir.path().join("cdsrc");
    let client = CdsctlFactory::new(script).create(&cdsrc, "prod");

    client.init().await.unwrap();
    assert_eq!(client.ui_url().await.unwrap(), "https://ui.example.com");
    assert_eq!(client.ui_url().await.unwrap(), "https://ui.example.com");

    let calls = calls(&log);
    assert_eq!(calls.len(), 1);
    assert!(calls[0].ends_with("admin curl /config/user"));
}

#[tokio::test]
async fn test_nonzero_exit_reports_stderr() {
    let dir = TempDir::new().unwrap();
    let (script, _log) = fake_cdsctl(&dir);
    let client = CdsctlFactory::new(script).create(&dir.path().join("cdsrc"), "prod");

    let err = client.run_cds_command("workflow list BROKEN").await.unwrap_err();
    match err {
        ClientError::CommandFailed {
            command, stderr, ..
        } => {
            assert_eq!(command, "workflow list BROKEN");
            assert_eq!(stderr, "forbidden");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_config_user_is_init_error() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("cdsctl");
    std::fs::write(&script, "#!/bin/sh\nexit 0\n").unwrap();
    let mut perms = std::fs::metadata(&script).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&script, perms).unwrap();

    let client = CdsctlFactory::new(script).create(&dir.path().join("cdsrc"), "prod");
    let err = client.init().await.unwrap_err();
    assert!(matches!(err, ExplorerError::Decode(_)));
}
