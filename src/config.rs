//! Configuration System
//!
//! Settings for the explorer: which cdsrc files to read, which cdsctl binary
//! to run and how to log. Layered with the `config` crate: built-in defaults,
//! then the global settings file, then an explicit `--config` file, then
//! `CDS_EXPLORER__*` environment variables.

use crate::error::ConfigError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod merge_policy;
mod sources;

pub use sources::global_file::global_config_path;

/// Default cdsrc written by `cdsctl login`
pub const DEFAULT_CDSRC: &str = "~/.cdsrc";

/// Root settings structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// cdsrc files to discover contexts from, in order
    #[serde(default)]
    pub cdsrcs: Vec<PathBuf>,

    /// cdsctl invocation settings
    #[serde(default)]
    pub cdsctl: CdsctlConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// cdsctl invocation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CdsctlConfig {
    /// Executable name or path
    #[serde(default = "default_binary")]
    pub binary: PathBuf,
}

fn default_binary() -> PathBuf {
    PathBuf::from("cdsctl")
}

impl Default for CdsctlConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
        }
    }
}

impl ExplorerConfig {
    /// Validate the settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cdsctl.binary.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("cdsctl binary cannot be empty".to_string()));
        }
        if self.cdsrcs.iter().any(|p| p.as_os_str().is_empty()) {
            return Err(ConfigError::Invalid("cdsrc paths cannot be empty".to_string()));
        }
        Ok(())
    }

    /// cdsrc paths with `~` expanded.
    ///
    /// Falls back to `~/.cdsrc` when nothing is configured and that file
    /// exists; otherwise an empty list means "no contexts".
    pub fn resolved_cdsrcs(&self) -> Vec<PathBuf> {
        if !self.cdsrcs.is_empty() {
            return self.cdsrcs.iter().map(|p| expand_home(p)).collect();
        }
        let fallback = expand_home(Path::new(DEFAULT_CDSRC));
        if fallback.exists() {
            vec![fallback]
        } else {
            Vec::new()
        }
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match directories::BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(rest),
        None => path.to_path_buf(),
    }
}

/// Loads [`ExplorerConfig`] from its layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings: defaults, global file, optional explicit file, environment.
    pub fn load(explicit: Option<&Path>) -> Result<ExplorerConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = match explicit {
            Some(path) => sources::explicit_file::add_to_builder(builder, path)?,
            None => builder,
        };
        let builder = sources::environment::add_to_builder(builder);

        let config: ExplorerConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load settings from one file only, on top of the defaults.
    pub fn load_from_file(path: &Path) -> Result<ExplorerConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = sources::explicit_file::add_to_builder(builder, path)?;
        let config: ExplorerConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
