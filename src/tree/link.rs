//! Deep links into the CDS web UI.

use super::node::ExplorerNode;
use crate::error::ExplorerError;

/// Entity a deep link points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    Project {
        key: String,
    },
    Application {
        key: String,
        name: String,
    },
    Pipeline {
        key: String,
        name: String,
    },
    Workflow {
        key: String,
        name: String,
    },
    Run {
        key: String,
        name: String,
        num: i64,
    },
}

impl LinkTarget {
    /// Path below the UI base URL
    pub fn path(&self) -> String {
        match self {
            LinkTarget::Project { key } => format!("/project/{}", key),
            LinkTarget::Application { key, name } => {
                format!("/project/{}/application/{}", key, name)
            }
            LinkTarget::Pipeline { key, name } => format!("/project/{}/pipeline/{}", key, name),
            LinkTarget::Workflow { key, name } => format!("/project/{}/workflow/{}", key, name),
            LinkTarget::Run { key, name, num } => {
                format!("/project/{}/workflow/{}/run/{}", key, name, num)
            }
        }
    }

    /// Full URL under `ui_base`
    pub fn url(&self, ui_base: &str) -> String {
        format!("{}{}", ui_base.trim_end_matches('/'), self.path())
    }
}

impl ExplorerNode {
    /// The entity this node links to, for resource nodes.
    pub fn link_target(&self) -> Option<LinkTarget> {
        match self {
            ExplorerNode::Project { project, .. } => Some(LinkTarget::Project {
                key: project.key.clone(),
            }),
            ExplorerNode::Application { application, .. } => Some(LinkTarget::Application {
                key: application.project_key.clone(),
                name: application.name.clone(),
            }),
            ExplorerNode::Pipeline { pipeline, .. } => Some(LinkTarget::Pipeline {
                key: pipeline.project_key.clone(),
                name: pipeline.name.clone(),
            }),
            ExplorerNode::Workflow { workflow, .. } => Some(LinkTarget::Workflow {
                key: workflow.project_key.clone(),
                name: workflow.name.clone(),
            }),
            ExplorerNode::Run { workflow, run, .. } => Some(LinkTarget::Run {
                key: workflow.project_key.clone(),
                name: workflow.name.clone(),
                num: run.num,
            }),
            _ => None,
        }
    }

    /// Deep link into the web UI of the owning context, if this node has one.
    pub async fn locate(&self) -> Result<Option<String>, ExplorerError> {
        let Some(target) = self.link_target() else {
            return Ok(None);
        };
        let base = self.owner().client().ui_url().await?;
        Ok(Some(target.url(&base)))
    }
}
