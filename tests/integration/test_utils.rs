//! Shared test utilities for integration tests
//!
//! Provides an in-memory stand-in for cdsctl and helpers for writing cdsrc
//! files into temporary directories.

use async_trait::async_trait;
use cds_explorer::client::{CdsClient, ClientFactory, CONFIG_USER_QUERY};
use cds_explorer::error::{ClientError, ExplorerError};
use cds_explorer::tree::ExplorerTree;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Canned cdsctl replies shared by every client a [`FakeFactory`] creates.
///
/// Replies are keyed by command text only; the context a command ran under
/// is recorded in the call log.
#[derive(Default)]
pub struct FakeServer {
    replies: Mutex<HashMap<String, Result<String, String>>>,
    calls: Mutex<Vec<(String, String)>>,
    inits: Mutex<Vec<String>>,
    init_delay: Mutex<Option<Duration>>,
    fail_init: Mutex<bool>,
    ui_url: Mutex<Option<String>>,
}

impl FakeServer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Reply to `command` with `output`
    pub fn reply(&self, command: &str, output: &str) {
        self.replies
            .lock()
            .insert(command.to_string(), Ok(output.to_string()));
    }

    /// Fail `command` with `stderr`
    pub fn fail(&self, command: &str, stderr: &str) {
        self.replies
            .lock()
            .insert(command.to_string(), Err(stderr.to_string()));
    }

    pub fn set_init_delay(&self, delay: Duration) {
        *self.init_delay.lock() = Some(delay);
    }

    pub fn set_fail_init(&self, fail: bool) {
        *self.fail_init.lock() = fail;
    }

    pub fn set_ui_url(&self, url: &str) {
        *self.ui_url.lock() = Some(url.to_string());
    }

    /// Context names whose client was initialized, in order
    pub fn inits(&self) -> Vec<String> {
        self.inits.lock().clone()
    }

    /// Commands run, in order
    pub fn commands(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(_, c)| c.clone()).collect()
    }

    /// Number of times `command` ran
    pub fn count(&self, command: &str) -> usize {
        self.calls.lock().iter().filter(|(_, c)| c == command).count()
    }

    fn answer(&self, context: &str, command: &str) -> Result<String, ClientError> {
        self.calls
            .lock()
            .push((context.to_string(), command.to_string()));
        match self.replies.lock().get(command) {
            Some(Ok(output)) => Ok(output.clone()),
            Some(Err(stderr)) => Err(ClientError::CommandFailed {
                command: command.to_string(),
                status: "exit status: 1".to_string(),
                stderr: stderr.clone(),
            }),
            None => Err(ClientError::CommandFailed {
                command: command.to_string(),
                status: "exit status: 1".to_string(),
                stderr: format!("unknown command: {}", command),
            }),
        }
    }
}

pub struct FakeClient {
    server: Arc<FakeServer>,
    config_file: PathBuf,
    context: String,
}

#[async_trait]
impl CdsClient for FakeClient {
    fn context_name(&self) -> &str {
        &self.context
    }

    fn config_file(&self) -> &Path {
        &self.config_file
    }

    async fn init(&self) -> Result<(), ExplorerError> {
        let delay = *self.server.init_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.server.inits.lock().push(self.context.clone());
        if *self.server.fail_init.lock() {
            return Err(ClientError::CommandFailed {
                command: CONFIG_USER_QUERY.to_string(),
                status: "exit status: 1".to_string(),
                stderr: "login required".to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn run_cds_command(&self, command: &str) -> Result<String, ClientError> {
        self.server.answer(&self.context, command)
    }

    async fn run_raw_command(&self, command: &str) -> Result<String, ClientError> {
        self.server.answer(&self.context, command)
    }

    async fn ui_url(&self) -> Result<String, ExplorerError> {
        self.server.ui_url.lock().clone().ok_or_else(|| {
            ClientError::MissingUiUrl {
                context: self.context.clone(),
            }
            .into()
        })
    }
}

pub struct FakeFactory {
    pub server: Arc<FakeServer>,
}

impl FakeFactory {
    pub fn new(server: Arc<FakeServer>) -> Arc<Self> {
        Arc::new(Self { server })
    }
}

impl ClientFactory for FakeFactory {
    fn create(&self, config_file: &Path, context: &str) -> Arc<dyn CdsClient> {
        Arc::new(FakeClient {
            server: Arc::clone(&self.server),
            config_file: config_file.to_path_buf(),
            context: context.to_string(),
        })
    }
}

/// Write a cdsrc file named `name` into `dir`
pub fn write_cdsrc(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// One cdsrc with a single active context named `prod`
pub fn single_context_tree(server: &Arc<FakeServer>) -> (TempDir, ExplorerTree) {
    let dir = TempDir::new().unwrap();
    let path = write_cdsrc(
        &dir,
        "cdsrc",
        "current = \"prod\"\n\n[prod]\nhost = \"https://cds.example.com\"\n",
    );
    let tree = ExplorerTree::new(vec![path], FakeFactory::new(Arc::clone(server)));
    (dir, tree)
}
