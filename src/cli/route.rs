//! CLI route: single route table and run context. Dispatches to the tree and presentation.

use crate::cli::parse::{Commands, LinkCommands, OutputFormat};
use crate::cli::presentation::{
    format_contexts_json, format_contexts_text, format_link, format_tree_json, format_tree_text,
};
use crate::client::{CdsctlFactory, ClientFactory};
use crate::config::ExplorerConfig;
use crate::context::Context;
use crate::error::ExplorerError;
use crate::tree::{snapshot, ExplorerTree, LinkTarget};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Runtime context for CLI execution: resolved settings and the explorer tree.
pub struct RunContext {
    config: ExplorerConfig,
    tree: ExplorerTree,
    color: bool,
}

impl RunContext {
    /// Build from resolved settings, invoking the configured cdsctl binary.
    pub fn new(config: ExplorerConfig) -> Self {
        let factory = Arc::new(CdsctlFactory::new(config.cdsctl.binary.clone()));
        Self::with_factory(config, factory)
    }

    /// Build with a caller-supplied client factory.
    pub fn with_factory(config: ExplorerConfig, factory: Arc<dyn ClientFactory>) -> Self {
        let tree = ExplorerTree::new(config.resolved_cdsrcs(), factory);
        Self {
            config,
            tree,
            color: false,
        }
    }

    /// Paint status glyphs in text output
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn tree(&self) -> &ExplorerTree {
        &self.tree
    }

    /// Execute a command and return its rendered output.
    pub async fn execute(&self, command: &Commands) -> Result<String, ExplorerError> {
        let started = Instant::now();
        let result = self.dispatch(command).await;
        info!(
            command = command_name(command),
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    async fn dispatch(&self, command: &Commands) -> Result<String, ExplorerError> {
        match command {
            Commands::Contexts { format } => {
                let contexts = self.tree.contexts().await?;
                let session = self.tree.session();
                match format {
                    OutputFormat::Json => format_contexts_json(&contexts, session),
                    OutputFormat::Text => Ok(format_contexts_text(&contexts, session)),
                }
            }
            Commands::Tree {
                context,
                depth,
                format,
            } => {
                let roots = snapshot(&self.tree, context.as_deref(), *depth).await?;
                match format {
                    OutputFormat::Json => format_tree_json(&roots),
                    OutputFormat::Text => Ok(format_tree_text(&roots, self.color)),
                }
            }
            Commands::Link { context, target } => {
                let context = self.link_context(context.as_deref()).await?;
                let base = context.client().ui_url().await?;
                Ok(format_link(Some(link_target(target).url(&base))))
            }
        }
    }

    async fn link_context(&self, name: Option<&str>) -> Result<Context, ExplorerError> {
        match name {
            Some(name) => self.tree.find_context(name).await,
            None => {
                self.tree.contexts().await?;
                self.tree
                    .active_context()
                    .ok_or(ExplorerError::NoActiveContext)
            }
        }
    }
}

fn link_target(command: &LinkCommands) -> LinkTarget {
    match command {
        LinkCommands::Project { key } => LinkTarget::Project { key: key.clone() },
        LinkCommands::Application { key, name } => LinkTarget::Application {
            key: key.clone(),
            name: name.clone(),
        },
        LinkCommands::Pipeline { key, name } => LinkTarget::Pipeline {
            key: key.clone(),
            name: name.clone(),
        },
        LinkCommands::Workflow { key, name } => LinkTarget::Workflow {
            key: key.clone(),
            name: name.clone(),
        },
        LinkCommands::Run { key, name, num } => LinkTarget::Run {
            key: key.clone(),
            name: name.clone(),
            num: *num,
        },
    }
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Contexts { .. } => "contexts",
        Commands::Tree { .. } => "tree",
        Commands::Link { .. } => "link",
    }
}
