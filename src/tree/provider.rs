//! Tree Data Provider
//!
//! Adapts explorer nodes to a host tree widget. The provider only remembers
//! the discovered contexts; everything below them is fetched on expansion.
//! [`ExplorerTree::refresh`] is the single invalidation path.

use super::node::{ExplorerNode, TreeItem};
use crate::client::ClientFactory;
use crate::context::{discover_contexts, Context, Session};
use crate::error::ExplorerError;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Change notification sent to hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeChange {
    /// Everything changed; re-render from the root
    Root,
}

/// Tree data provider over the configured cdsrc files
pub struct ExplorerTree {
    cdsrcs: Vec<PathBuf>,
    factory: Arc<dyn ClientFactory>,
    session: Arc<Session>,
    contexts: RwLock<Option<Vec<Context>>>,
    changes: broadcast::Sender<TreeChange>,
}

impl ExplorerTree {
    pub fn new(cdsrcs: Vec<PathBuf>, factory: Arc<dyn ClientFactory>) -> Self {
        Self::with_session(cdsrcs, factory, Arc::new(Session::new()))
    }

    pub fn with_session(
        cdsrcs: Vec<PathBuf>,
        factory: Arc<dyn ClientFactory>,
        session: Arc<Session>,
    ) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            cdsrcs,
            factory,
            session,
            contexts: RwLock::new(None),
            changes,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn active_context(&self) -> Option<Context> {
        self.session.active_context()
    }

    /// Receive a notification after each refresh
    pub fn subscribe(&self) -> broadcast::Receiver<TreeChange> {
        self.changes.subscribe()
    }

    /// Discovered contexts, discovering on first use.
    pub async fn contexts(&self) -> Result<Vec<Context>, ExplorerError> {
        let cached = self.contexts.read().clone();
        match cached {
            Some(contexts) => Ok(contexts),
            None => self.discover().await,
        }
    }

    async fn discover(&self) -> Result<Vec<Context>, ExplorerError> {
        let contexts =
            discover_contexts(&self.cdsrcs, self.factory.as_ref(), &self.session).await?;
        *self.contexts.write() = Some(contexts.clone());
        Ok(contexts)
    }

    /// Find a discovered context by name
    pub async fn find_context(&self, name: &str) -> Result<Context, ExplorerError> {
        self.contexts()
            .await?
            .into_iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| ExplorerError::ContextNotFound(name.to_string()))
    }

    /// Root nodes without a parent, otherwise the parent's children.
    pub async fn get_children(
        &self,
        parent: Option<&ExplorerNode>,
    ) -> Result<Vec<ExplorerNode>, ExplorerError> {
        match parent {
            Some(node) => node.children().await,
            None => Ok(self
                .contexts()
                .await?
                .into_iter()
                .map(|context| ExplorerNode::context(context, &self.session))
                .collect()),
        }
    }

    pub fn get_tree_item(&self, node: &ExplorerNode) -> TreeItem {
        node.render()
    }

    /// Re-run discovery and tell subscribers to re-render from the root.
    ///
    /// Subscribers are notified even when discovery fails; the next root
    /// expansion then retries discovery and reports the failure.
    pub async fn refresh(&self) -> Result<(), ExplorerError> {
        let result = discover_contexts(&self.cdsrcs, self.factory.as_ref(), &self.session).await;
        match &result {
            Ok(contexts) => {
                debug!(count = contexts.len(), "Explorer refreshed");
                *self.contexts.write() = Some(contexts.clone());
            }
            Err(e) => {
                warn!(error = %e, "Explorer refresh failed");
                *self.contexts.write() = None;
            }
        }
        // No subscribers is fine
        let _ = self.changes.send(TreeChange::Root);
        result.map(|_| ())
    }
}
