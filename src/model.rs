//! CDS entities as returned by cdsctl.
//!
//! Every payload carried by a tree node is one of these types. Raw command
//! output is only turned into them through [`decode`] and
//! [`decode_run_detail`], so shape problems surface as [`DecodeError`] at the
//! boundary instead of deep inside the tree.

use crate::error::DecodeError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Go encodes nil slices and maps as `null`; treat them as empty.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub key: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub name: String,
    #[serde(default, alias = "projectKey", deserialize_with = "null_default")]
    pub project_key: String,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    pub name: String,
    #[serde(default, alias = "projectKey", deserialize_with = "null_default")]
    pub project_key: String,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub name: String,
    #[serde(default, alias = "projectKey", deserialize_with = "null_default")]
    pub project_key: String,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
}

/// One entry of `workflow history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub num: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_default")]
    pub start: String,
    #[serde(default, deserialize_with = "null_default")]
    pub last_execution: String,
    #[serde(default, deserialize_with = "null_default")]
    pub tags: Vec<RunTag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTag {
    pub tag: String,
    #[serde(default, deserialize_with = "null_default")]
    pub value: String,
}

/// Full run detail from `/project/<key>/workflows/<name>/runs/<num>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunDetail {
    #[serde(default)]
    pub num: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub status: String,
    pub workflow: RunWorkflow,
    /// Node executions keyed by workflow node id, latest first.
    #[serde(default, deserialize_with = "null_default")]
    pub nodes: HashMap<i64, Vec<NodeRun>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunWorkflow {
    pub workflow_data: WorkflowData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowData {
    pub node: WorkflowNode,
    #[serde(default, deserialize_with = "null_default")]
    pub joins: Vec<WorkflowNode>,
}

/// A node of the workflow graph. Joins reuse the same shape with `parents` set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNode {
    pub id: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub triggers: Vec<NodeTrigger>,
    #[serde(default, deserialize_with = "null_default")]
    pub parents: Vec<NodeParent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeTrigger {
    #[serde(default)]
    pub child_node_id: i64,
    pub child_node: WorkflowNode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeParent {
    pub parent_id: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub parent_name: String,
}

/// One execution of a workflow node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRun {
    #[serde(default)]
    pub id: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_default")]
    pub stages: Vec<Stage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default)]
    pub build_order: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_default")]
    pub run_jobs: Vec<JobRun>,
}

impl Stage {
    /// Stage name, or `stage <build_order>` when the pipeline left it unset.
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("stage {}", self.build_order)
        } else {
            self.name.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRun {
    #[serde(default, deserialize_with = "null_default")]
    pub status: String,
    pub job: ExecutedJob,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutedJob {
    pub action: Action,
    /// Index aligned with `action.actions`.
    #[serde(default, deserialize_with = "null_default")]
    pub step_status: Vec<StepStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub step_name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub actions: Vec<Action>,
}

impl Action {
    /// Recorded step name, falling back to the action name.
    pub fn display_name(&self) -> &str {
        if self.step_name.is_empty() {
            &self.name
        } else {
            &self.step_name
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepStatus {
    #[serde(default)]
    pub step_order: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub status: String,
}

/// Reply of `/config/user`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigUser {
    #[serde(rename = "url.api", default)]
    pub api_url: String,
    #[serde(rename = "url.ui", default)]
    pub ui_url: String,
}

impl RunDetail {
    /// Entry node of the run's workflow graph.
    pub fn root(&self) -> &WorkflowNode {
        &self.workflow.workflow_data.node
    }

    /// Latest execution of a node, if it ran.
    pub fn latest_run(&self, node_id: i64) -> Option<&NodeRun> {
        self.nodes.get(&node_id).and_then(|runs| runs.first())
    }

    /// Join nodes that list `parent_id` among their parents.
    ///
    /// Each join appears once, in the order of the run's join list, even when
    /// it names the parent several times.
    pub fn joins_following(&self, parent_id: i64) -> Vec<&WorkflowNode> {
        let mut seen = Vec::new();
        let mut joins = Vec::new();
        for join in &self.workflow.workflow_data.joins {
            for parent in &join.parents {
                if parent.parent_id == parent_id && !seen.contains(&join.id) {
                    seen.push(join.id);
                    joins.push(join);
                }
            }
        }
        joins
    }
}

/// Decode structured cdsctl output.
pub fn decode<T: DeserializeOwned>(command: &str, raw: &str) -> Result<T, DecodeError> {
    serde_json::from_str(raw).map_err(|source| DecodeError::Json {
        command: command.to_string(),
        source,
    })
}

/// Decode the raw run detail returned by `admin curl`.
pub fn decode_run_detail(command: &str, raw: &str) -> Result<RunDetail, DecodeError> {
    let detail: RunDetail = decode(command, raw)?;
    if detail.root().id <= 0 {
        return Err(DecodeError::Shape {
            command: command.to_string(),
            reason: format!("invalid root node id {}", detail.root().id),
        });
    }
    Ok(detail)
}
