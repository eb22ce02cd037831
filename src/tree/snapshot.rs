//! Eager expansion of the lazy tree, for hosts that print it whole.

use super::node::{ExplorerNode, TreeItem};
use super::provider::ExplorerTree;
use crate::error::ExplorerError;
use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;

/// A rendered node and, up to the requested depth, its rendered children
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedNode {
    #[serde(flatten)]
    pub item: TreeItem,
    /// Expansion failure, shown in place of children
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RenderedNode>,
}

/// Render `node` and expand `depth` levels below it.
///
/// A failed expansion is recorded on the node instead of aborting the walk.
pub fn expand_node(node: &ExplorerNode, depth: usize) -> BoxFuture<'_, RenderedNode> {
    async move {
        let item = node.render();
        if depth == 0 || node.is_leaf() {
            return RenderedNode {
                item,
                error: None,
                children: Vec::new(),
            };
        }

        match node.children().await {
            Ok(children) => {
                let mut rendered = Vec::with_capacity(children.len());
                for child in &children {
                    rendered.push(expand_node(child, depth - 1).await);
                }
                RenderedNode {
                    item,
                    error: None,
                    children: rendered,
                }
            }
            Err(e) => RenderedNode {
                item,
                error: Some(e.to_string()),
                children: Vec::new(),
            },
        }
    }
    .boxed()
}

/// Expand every root (optionally only one context) down to `depth`.
pub async fn snapshot(
    tree: &ExplorerTree,
    context: Option<&str>,
    depth: usize,
) -> Result<Vec<RenderedNode>, ExplorerError> {
    let roots = tree.get_children(None).await?;
    let mut rendered = Vec::new();
    for root in roots
        .iter()
        .filter(|root| context.map(|name| root.owner().name() == name).unwrap_or(true))
    {
        rendered.push(expand_node(root, depth).await);
    }
    if let Some(name) = context {
        if rendered.is_empty() {
            return Err(ExplorerError::ContextNotFound(name.to_string()));
        }
    }
    Ok(rendered)
}
