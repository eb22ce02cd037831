//! cdsctl client
//!
//! Every query the tree makes goes through [`CdsClient`]. The production
//! implementation, [`Cdsctl`], shells out to the `cdsctl` binary bound to one
//! cdsrc file and context; tests substitute their own implementation.

use crate::error::{ClientError, ExplorerError};
use crate::model::{decode, ConfigUser};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Raw query used to resolve the API and UI base URLs of a context.
pub const CONFIG_USER_QUERY: &str = "admin curl /config/user";

/// Client bound to one CDS context
#[async_trait]
pub trait CdsClient: Send + Sync {
    /// Name of the context (cdsrc section) this client talks to
    fn context_name(&self) -> &str;

    /// cdsrc file the context was read from
    fn config_file(&self) -> &Path;

    /// Eagerly initialize the session (resolves base URLs).
    async fn init(&self) -> Result<(), ExplorerError>;

    /// Run a structured command (`workflow list PRJ`) and return its JSON output.
    async fn run_cds_command(&self, command: &str) -> Result<String, ClientError>;

    /// Run a raw passthrough command (`admin curl /path`) and return stdout as is.
    async fn run_raw_command(&self, command: &str) -> Result<String, ClientError>;

    /// Base URL of the web UI, without trailing slash.
    async fn ui_url(&self) -> Result<String, ExplorerError>;
}

/// Builds one client per discovered context
pub trait ClientFactory: Send + Sync {
    fn create(&self, config_file: &Path, context: &str) -> Arc<dyn CdsClient>;
}

/// Run a structured command and decode its JSON output.
pub async fn query<T: DeserializeOwned>(
    client: &dyn CdsClient,
    command: &str,
) -> Result<T, ExplorerError> {
    let raw = client.run_cds_command(command).await?;
    Ok(decode(command, &raw)?)
}

/// Run a structured list command. An empty or `null` reply is an empty list.
pub async fn query_list<T: DeserializeOwned>(
    client: &dyn CdsClient,
    command: &str,
) -> Result<Vec<T>, ExplorerError> {
    let raw = client.run_cds_command(command).await?;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let items: Option<Vec<T>> = decode(command, &raw)?;
    Ok(items.unwrap_or_default())
}

/// Client invoking the `cdsctl` binary
pub struct Cdsctl {
    binary: PathBuf,
    config_file: PathBuf,
    context: String,
    session: OnceCell<ConfigUser>,
}

impl Cdsctl {
    pub fn new(binary: PathBuf, config_file: PathBuf, context: String) -> Self {
        Self {
            binary,
            config_file,
            context,
            session: OnceCell::new(),
        }
    }

    /// `cdsctl --file <cdsrc> --context <name>`
    fn base_command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--file")
            .arg(&self.config_file)
            .arg("--context")
            .arg(&self.context)
            .stdin(Stdio::null());
        cmd
    }

    async fn execute(&self, mut cmd: Command, command: &str) -> Result<String, ClientError> {
        debug!(context = %self.context, command, "Invoking cdsctl");

        let output = cmd.output().await.map_err(|source| ClientError::Spawn {
            binary: self.binary.clone(),
            source,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(context = %self.context, command, status = %output.status, "cdsctl failed");
            return Err(ClientError::CommandFailed {
                command: command.to_string(),
                status: output.status.to_string(),
                stderr,
            });
        }

        String::from_utf8(output.stdout).map_err(|_| ClientError::InvalidOutput {
            command: command.to_string(),
        })
    }

    async fn session(&self) -> Result<&ConfigUser, ExplorerError> {
        self.session
            .get_or_try_init(|| async {
                let raw = self.run_raw_command(CONFIG_USER_QUERY).await?;
                let user: ConfigUser = decode(CONFIG_USER_QUERY, &raw)?;
                Ok::<_, ExplorerError>(user)
            })
            .await
    }
}

#[async_trait]
impl CdsClient for Cdsctl {
    fn context_name(&self) -> &str {
        &self.context
    }

    fn config_file(&self) -> &Path {
        &self.config_file
    }

    async fn init(&self) -> Result<(), ExplorerError> {
        self.session().await.map(|_| ())
    }

    async fn run_cds_command(&self, command: &str) -> Result<String, ClientError> {
        let mut cmd = self.base_command();
        cmd.args(command.split_whitespace()).args(["--format", "json"]);
        self.execute(cmd, command).await
    }

    async fn run_raw_command(&self, command: &str) -> Result<String, ClientError> {
        let mut cmd = self.base_command();
        cmd.args(command.split_whitespace());
        self.execute(cmd, command).await
    }

    async fn ui_url(&self) -> Result<String, ExplorerError> {
        let user = self.session().await?;
        let url = user.ui_url.trim_end_matches('/');
        if url.is_empty() {
            return Err(ClientError::MissingUiUrl {
                context: self.context.clone(),
            }
            .into());
        }
        Ok(url.to_string())
    }
}

/// Factory producing [`Cdsctl`] clients for a given binary
#[derive(Debug, Clone)]
pub struct CdsctlFactory {
    binary: PathBuf,
}

impl CdsctlFactory {
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }
}

impl ClientFactory for CdsctlFactory {
    fn create(&self, config_file: &Path, context: &str) -> Arc<dyn CdsClient> {
        Arc::new(Cdsctl::new(
            self.binary.clone(),
            config_file.to_path_buf(),
            context.to_string(),
        ))
    }
}
