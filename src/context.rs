//! Context Discovery
//!
//! Reads the configured cdsrc files and builds one [`Context`] per section.
//! The section named by a file's `current` marker becomes the [`Session`]'s
//! active context the first time it is seen; its client is the only one
//! initialized eagerly.

use crate::client::{CdsClient, ClientFactory};
use crate::error::{ConfigError, ExplorerError};
use futures::future::try_join_all;
use parking_lot::Mutex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Top-level key naming the default context of a cdsrc file
pub const CURRENT_KEY: &str = "current";

/// A named CDS server identity with its bound client
#[derive(Clone)]
pub struct Context {
    name: String,
    config_file: PathBuf,
    client: Arc<dyn CdsClient>,
}

impl Context {
    pub fn new(name: String, config_file: PathBuf, client: Arc<dyn CdsClient>) -> Self {
        Self {
            name,
            config_file,
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    pub fn client(&self) -> &dyn CdsClient {
        self.client.as_ref()
    }

    /// Same cdsrc file and section
    pub fn same_identity(&self, other: &Context) -> bool {
        self.name == other.name && self.config_file == other.config_file
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("name", &self.name)
            .field("config_file", &self.config_file)
            .finish()
    }
}

/// Session state shared by discovery passes.
///
/// Holds the single active context. Each successful discovery settles it
/// against what that discovery found: the first `current` section claims the
/// slot, and a context that disappeared is dropped. An unchanged active
/// context keeps its client, so it is initialized once.
#[derive(Default)]
pub struct Session {
    active: Mutex<Option<Context>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_context(&self) -> Option<Context> {
        self.active.lock().clone()
    }

    pub fn is_active(&self, context: &Context) -> bool {
        self.active
            .lock()
            .as_ref()
            .map(|active| active.same_identity(context))
            .unwrap_or(false)
    }

    /// Make `context` active. Returns false when it already is.
    fn claim(&self, context: &Context) -> bool {
        let mut active = self.active.lock();
        if active
            .as_ref()
            .map(|a| a.same_identity(context))
            .unwrap_or(false)
        {
            return false;
        }
        if let Some(previous) = active.replace(context.clone()) {
            debug!(from = %previous.name, to = %context.name, "Active context changed");
        }
        true
    }

    /// Drop the active context unless it is one of `contexts`.
    fn retain_within(&self, contexts: &[Context]) {
        let mut active = self.active.lock();
        let stale = active
            .as_ref()
            .map(|a| !contexts.iter().any(|c| c.same_identity(a)))
            .unwrap_or(false);
        if stale {
            if let Some(previous) = active.take() {
                info!(context = %previous.name, "Active context no longer discovered");
            }
        }
    }

    fn release(&self, context: &Context) {
        let mut active = self.active.lock();
        if active.as_ref().map(|a| a.same_identity(context)).unwrap_or(false) {
            *active = None;
        }
    }

    fn active_client_for(&self, config_file: &Path, name: &str) -> Option<Arc<dyn CdsClient>> {
        self.active
            .lock()
            .as_ref()
            .filter(|active| active.name == name && active.config_file == config_file)
            .map(|active| Arc::clone(&active.client))
    }
}

/// Parsed cdsrc file: the `current` marker plus section names in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cdsrc {
    pub current: Option<String>,
    pub contexts: Vec<String>,
}

/// Parse cdsrc contents. Only table sections are contexts.
pub fn parse_cdsrc(path: &Path, contents: &str) -> Result<Cdsrc, ConfigError> {
    let table: toml::Table = toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut current = None;
    let mut contexts = Vec::new();
    for (key, value) in &table {
        if key == CURRENT_KEY {
            let name = value.as_str().ok_or_else(|| ConfigError::InvalidCurrent {
                path: path.to_path_buf(),
            })?;
            current = Some(name.to_string());
        } else if value.is_table() {
            contexts.push(key.clone());
        } else {
            debug!(path = %path.display(), key = %key, "Ignoring non-section cdsrc key");
        }
    }

    Ok(Cdsrc { current, contexts })
}

async fn load_cdsrc(path: &Path) -> Result<Option<(PathBuf, Cdsrc)>, ConfigError> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "cdsrc file not found, skipping");
            return Ok(None);
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let cdsrc = parse_cdsrc(path, &contents)?;
    Ok(Some((path.to_path_buf(), cdsrc)))
}

/// Discover every context of the given cdsrc files.
///
/// Files are read and parsed concurrently; contexts are returned in
/// file-then-section order. Missing files are skipped, malformed ones fail
/// the whole discovery. On success the session's active context is the
/// first section named by its file's `current`, or the previous active
/// context if no file names one and it is still present.
pub async fn discover_contexts(
    paths: &[PathBuf],
    factory: &dyn ClientFactory,
    session: &Session,
) -> Result<Vec<Context>, ExplorerError> {
    if paths.is_empty() {
        debug!("No cdsrc configured");
        session.retain_within(&[]);
        return Ok(Vec::new());
    }

    let loaded = try_join_all(paths.iter().map(|path| load_cdsrc(path))).await?;

    let mut contexts = Vec::new();
    let mut current = None;
    for (path, cdsrc) in loaded.into_iter().flatten() {
        for name in &cdsrc.contexts {
            let client = session
                .active_client_for(&path, name)
                .unwrap_or_else(|| factory.create(&path, name));
            if current.is_none() && cdsrc.current.as_deref() == Some(name.as_str()) {
                current = Some(contexts.len());
            }
            contexts.push(Context::new(name.clone(), path.clone(), client));
        }
    }

    match current.and_then(|index| contexts.get(index)) {
        Some(context) => {
            if session.claim(context) {
                info!(
                    context = %context.name,
                    path = %context.config_file.display(),
                    "Initializing active context"
                );
                if let Err(e) = context.client().init().await {
                    session.release(context);
                    return Err(e);
                }
            }
        }
        None => session.retain_within(&contexts),
    }

    info!(count = contexts.len(), files = paths.len(), "Discovered contexts");
    Ok(contexts)
}
