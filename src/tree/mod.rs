//! Explorer Tree
//!
//! Lazily expanded view of a CDS server: contexts, favorite and project
//! folders, workflows, runs and the run graph down to individual steps.

pub mod children;
pub mod link;
pub mod node;
pub mod provider;
pub mod snapshot;

pub use link::LinkTarget;
pub use node::{Collapsible, ExplorerNode, FolderKind, TreeItem, TypeTag};
pub use provider::{ExplorerTree, TreeChange};
pub use snapshot::{expand_node, snapshot, RenderedNode};
