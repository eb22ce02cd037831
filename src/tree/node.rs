//! Explorer nodes and their display representation.

use crate::context::{Context, Session};
use crate::model::{
    Action, Application, JobRun, NodeRun, Pipeline, Project, RunDetail, Stage, Workflow,
    WorkflowNode, WorkflowRun,
};
use crate::status::decorate;
use serde::Serialize;
use std::sync::Arc;

pub const FAVORITE_WORKFLOWS_LABEL: &str = "⭐ workflows";
pub const FAVORITE_PROJECTS_LABEL: &str = "⭐ projects";
pub const ALL_PROJECTS_LABEL: &str = "all projects";
pub const STAGES_LABEL: &str = "Stages";

/// Folder flavours
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderKind {
    FavoriteWorkflows,
    FavoriteProjects,
    AllProjects,
    Workflows { project_key: String },
    Applications { project_key: String },
    Pipelines { project_key: String },
}

impl FolderKind {
    pub fn label(&self) -> &'static str {
        match self {
            FolderKind::FavoriteWorkflows => FAVORITE_WORKFLOWS_LABEL,
            FolderKind::FavoriteProjects => FAVORITE_PROJECTS_LABEL,
            FolderKind::AllProjects => ALL_PROJECTS_LABEL,
            FolderKind::Workflows { .. } => "Workflows",
            FolderKind::Applications { .. } => "Applications",
            FolderKind::Pipelines { .. } => "Pipelines",
        }
    }
}

/// Expand state of a tree item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collapsible {
    None,
    Collapsed,
}

/// Tag hosts use to pick context-menu actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeTag {
    Context,
    Project,
    WorkflowEdit,
    WorkflowRun,
    WorkflowNodeRun,
    WorkflowStage,
    WorkflowJob,
    WorkflowStep,
    Application,
    Pipeline,
}

impl TypeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Context => "context",
            TypeTag::Project => "project",
            TypeTag::WorkflowEdit => "workflowEdit",
            TypeTag::WorkflowRun => "workflowRun",
            TypeTag::WorkflowNodeRun => "workflowNodeRun",
            TypeTag::WorkflowStage => "workflowStage",
            TypeTag::WorkflowJob => "workflowJob",
            TypeTag::WorkflowStep => "workflowStep",
            TypeTag::Application => "application",
            TypeTag::Pipeline => "pipeline",
        }
    }
}

/// What a host displays for one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeItem {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    pub collapsible: Collapsible,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_value: Option<TypeTag>,
    /// Set on the session's active context
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub active: bool,
}

impl TreeItem {
    fn collapsed(label: impl Into<String>, tag: Option<TypeTag>) -> Self {
        Self {
            label: label.into(),
            tooltip: None,
            collapsible: Collapsible::Collapsed,
            context_value: tag,
            active: false,
        }
    }

    fn leaf(label: impl Into<String>, tag: TypeTag) -> Self {
        Self {
            label: label.into(),
            tooltip: None,
            collapsible: Collapsible::None,
            context_value: Some(tag),
            active: false,
        }
    }

    fn with_tooltip(mut self, tooltip: Option<String>) -> Self {
        self.tooltip = tooltip;
        self
    }
}

/// One node of the explorer tree.
///
/// Nodes own a snapshot of the payload they were built from; their children
/// are fetched again on every expansion.
#[derive(Debug, Clone)]
pub enum ExplorerNode {
    Context {
        context: Context,
        active: bool,
    },
    Folder {
        context: Context,
        kind: FolderKind,
    },
    Project {
        context: Context,
        project: Project,
    },
    Application {
        context: Context,
        application: Application,
    },
    Pipeline {
        context: Context,
        pipeline: Pipeline,
    },
    Workflow {
        context: Context,
        workflow: Workflow,
    },
    Run {
        context: Context,
        workflow: Workflow,
        run: WorkflowRun,
    },
    RunNode {
        context: Context,
        detail: Arc<RunDetail>,
        node: WorkflowNode,
        label: String,
    },
    Stages {
        context: Context,
        node_run: NodeRun,
    },
    Stage {
        context: Context,
        stage: Stage,
        label: String,
    },
    Job {
        context: Context,
        job: JobRun,
        label: String,
    },
    Step {
        context: Context,
        action: Action,
        label: String,
    },
}

impl ExplorerNode {
    /// Root node for a discovered context.
    pub fn context(context: Context, session: &Session) -> Self {
        let active = session.is_active(&context);
        ExplorerNode::Context { context, active }
    }

    pub fn folder(context: &Context, kind: FolderKind) -> Self {
        ExplorerNode::Folder {
            context: context.clone(),
            kind,
        }
    }

    /// Owning context
    pub fn owner(&self) -> &Context {
        match self {
            ExplorerNode::Context { context, .. }
            | ExplorerNode::Folder { context, .. }
            | ExplorerNode::Project { context, .. }
            | ExplorerNode::Application { context, .. }
            | ExplorerNode::Pipeline { context, .. }
            | ExplorerNode::Workflow { context, .. }
            | ExplorerNode::Run { context, .. }
            | ExplorerNode::RunNode { context, .. }
            | ExplorerNode::Stages { context, .. }
            | ExplorerNode::Stage { context, .. }
            | ExplorerNode::Job { context, .. }
            | ExplorerNode::Step { context, .. } => context,
        }
    }

    /// Label the node was created with
    pub fn label(&self) -> String {
        match self {
            ExplorerNode::Context { context, .. } => context.name().to_string(),
            ExplorerNode::Folder { kind, .. } => kind.label().to_string(),
            ExplorerNode::Project { project, .. } => project.name.clone(),
            ExplorerNode::Application { application, .. } => application.name.clone(),
            ExplorerNode::Pipeline { pipeline, .. } => pipeline.name.clone(),
            ExplorerNode::Workflow { workflow, .. } => workflow.name.clone(),
            ExplorerNode::Run { run, .. } => format!("run {} - {}", run.num, run.status),
            ExplorerNode::Stages { .. } => STAGES_LABEL.to_string(),
            ExplorerNode::RunNode { label, .. }
            | ExplorerNode::Stage { label, .. }
            | ExplorerNode::Job { label, .. }
            | ExplorerNode::Step { label, .. } => label.clone(),
        }
    }

    /// Display representation of this node.
    pub fn render(&self) -> TreeItem {
        match self {
            ExplorerNode::Context { context, active } => {
                let mut item = TreeItem::collapsed(context.name(), Some(TypeTag::Context));
                item.active = *active;
                item
            }
            ExplorerNode::Folder { kind, .. } => TreeItem::collapsed(kind.label(), None),
            ExplorerNode::Project { project, .. } => {
                TreeItem::collapsed(project.name.as_str(), Some(TypeTag::Project))
            }
            ExplorerNode::Application { application, .. } => {
                TreeItem::leaf(application.name.as_str(), TypeTag::Application)
                    .with_tooltip(non_empty(&application.name))
            }
            ExplorerNode::Pipeline { pipeline, .. } => {
                TreeItem::leaf(pipeline.name.as_str(), TypeTag::Pipeline)
                    .with_tooltip(non_empty(&pipeline.name))
            }
            ExplorerNode::Workflow { workflow, .. } => {
                TreeItem::collapsed(workflow.name.as_str(), Some(TypeTag::WorkflowEdit))
                    .with_tooltip(non_empty(&workflow.name))
            }
            ExplorerNode::Run { run, .. } => {
                let line = decorate(&run.status, &format!("run {}", run.num));
                TreeItem::collapsed(line.as_str(), Some(TypeTag::WorkflowRun))
                    .with_tooltip(Some(run_tooltip(run, &line)))
            }
            ExplorerNode::RunNode { label, .. } => {
                TreeItem::collapsed(label.as_str(), Some(TypeTag::WorkflowNodeRun))
            }
            ExplorerNode::Stages { .. } => {
                TreeItem::collapsed(STAGES_LABEL, Some(TypeTag::WorkflowStage))
            }
            ExplorerNode::Stage { label, .. } => {
                TreeItem::collapsed(label.as_str(), Some(TypeTag::WorkflowStage))
            }
            ExplorerNode::Job { label, .. } => {
                TreeItem::collapsed(label.as_str(), Some(TypeTag::WorkflowJob))
            }
            ExplorerNode::Step { action, label, .. } => {
                let tooltip = if action.name.is_empty() {
                    None
                } else {
                    Some(label.clone())
                };
                TreeItem::leaf(label.as_str(), TypeTag::WorkflowStep).with_tooltip(tooltip)
            }
        }
    }

    /// True for nodes that never have children
    pub fn is_leaf(&self) -> bool {
        self.render().collapsible == Collapsible::None
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn run_tooltip(run: &WorkflowRun, line: &str) -> String {
    let mut tooltip = format!(
        "{} {}\nstart: {}\nlastExecution: {}",
        run.status, line, run.start, run.last_execution
    );
    for tag in &run.tags {
        tooltip.push_str(&format!("\n{}: {}", tag.tag, tag.value));
    }
    tooltip
}
