//! Child fetching for explorer nodes.
//!
//! Folder, workflow and run expansions issue exactly one cdsctl call. Nodes
//! below a run are expanded from the run detail fetched by the run node.

use super::node::{ExplorerNode, FolderKind};
use crate::client::query_list;
use crate::context::Context;
use crate::error::ExplorerError;
use crate::model::{
    decode_run_detail, Application, JobRun, NodeRun, Pipeline, Project, RunDetail, Stage,
    Workflow, WorkflowNode, WorkflowRun,
};
use crate::status::{decorate, decorate_opt};
use std::sync::Arc;
use tracing::debug;

pub const FAVORITE_WORKFLOWS_COMMAND: &str = "workflow favorites list";
pub const FAVORITE_PROJECTS_COMMAND: &str = "project favorites list";
pub const ALL_PROJECTS_COMMAND: &str = "project list";

pub fn workflow_list_command(project_key: &str) -> String {
    format!("workflow list {}", project_key)
}

pub fn workflow_history_command(project_key: &str, workflow_name: &str) -> String {
    format!("workflow history {} {}", project_key, workflow_name)
}

pub fn application_list_command(project_key: &str) -> String {
    format!("application list {}", project_key)
}

pub fn pipeline_list_command(project_key: &str) -> String {
    format!("pipeline list {}", project_key)
}

pub fn run_detail_command(project_key: &str, workflow_name: &str, num: i64) -> String {
    format!(
        "admin curl /project/{}/workflows/{}/runs/{}",
        project_key, workflow_name, num
    )
}

impl ExplorerNode {
    /// Fetch this node's children.
    ///
    /// Nothing is cached: expanding the same node twice queries twice.
    pub async fn children(&self) -> Result<Vec<ExplorerNode>, ExplorerError> {
        match self {
            ExplorerNode::Context { context, .. } => Ok(vec![
                ExplorerNode::folder(context, FolderKind::FavoriteWorkflows),
                ExplorerNode::folder(context, FolderKind::FavoriteProjects),
                ExplorerNode::folder(context, FolderKind::AllProjects),
            ]),
            ExplorerNode::Folder { context, kind } => folder_children(context, kind).await,
            ExplorerNode::Project { context, project } => Ok(vec![
                ExplorerNode::folder(
                    context,
                    FolderKind::Workflows {
                        project_key: project.key.clone(),
                    },
                ),
                ExplorerNode::folder(
                    context,
                    FolderKind::Applications {
                        project_key: project.key.clone(),
                    },
                ),
                ExplorerNode::folder(
                    context,
                    FolderKind::Pipelines {
                        project_key: project.key.clone(),
                    },
                ),
            ]),
            ExplorerNode::Workflow { context, workflow } => workflow_runs(context, workflow).await,
            ExplorerNode::Run {
                context,
                workflow,
                run,
            } => run_root(context, workflow, run).await,
            ExplorerNode::RunNode {
                context,
                detail,
                node,
                ..
            } => Ok(run_node_children(context, detail, node)),
            ExplorerNode::Stages { context, node_run } => Ok(stage_nodes(context, node_run)),
            ExplorerNode::Stage { context, stage, .. } => Ok(job_nodes(context, stage)),
            ExplorerNode::Job { context, job, .. } => Ok(step_nodes(context, job)),
            ExplorerNode::Application { .. }
            | ExplorerNode::Pipeline { .. }
            | ExplorerNode::Step { .. } => Ok(Vec::new()),
        }
    }
}

async fn folder_children(
    context: &Context,
    kind: &FolderKind,
) -> Result<Vec<ExplorerNode>, ExplorerError> {
    let client = context.client();
    let nodes = match kind {
        FolderKind::FavoriteWorkflows => {
            query_list::<Workflow>(client, FAVORITE_WORKFLOWS_COMMAND)
                .await?
                .into_iter()
                .map(|workflow| workflow_node(context, workflow))
                .collect()
        }
        FolderKind::Workflows { project_key } => {
            query_list::<Workflow>(client, &workflow_list_command(project_key))
                .await?
                .into_iter()
                .map(|mut workflow| {
                    fill_project_key(&mut workflow.project_key, project_key);
                    workflow_node(context, workflow)
                })
                .collect()
        }
        FolderKind::FavoriteProjects => {
            project_nodes(context, query_list(client, FAVORITE_PROJECTS_COMMAND).await?)
        }
        FolderKind::AllProjects => {
            project_nodes(context, query_list(client, ALL_PROJECTS_COMMAND).await?)
        }
        FolderKind::Applications { project_key } => {
            query_list::<Application>(client, &application_list_command(project_key))
                .await?
                .into_iter()
                .map(|mut application| {
                    fill_project_key(&mut application.project_key, project_key);
                    ExplorerNode::Application {
                        context: context.clone(),
                        application,
                    }
                })
                .collect()
        }
        FolderKind::Pipelines { project_key } => {
            query_list::<Pipeline>(client, &pipeline_list_command(project_key))
                .await?
                .into_iter()
                .map(|mut pipeline| {
                    fill_project_key(&mut pipeline.project_key, project_key);
                    ExplorerNode::Pipeline {
                        context: context.clone(),
                        pipeline,
                    }
                })
                .collect()
        }
    };
    Ok(nodes)
}

fn fill_project_key(target: &mut String, project_key: &str) {
    if target.is_empty() {
        *target = project_key.to_string();
    }
}

fn workflow_node(context: &Context, workflow: Workflow) -> ExplorerNode {
    ExplorerNode::Workflow {
        context: context.clone(),
        workflow,
    }
}

fn project_nodes(context: &Context, projects: Vec<Project>) -> Vec<ExplorerNode> {
    projects
        .into_iter()
        .map(|project| ExplorerNode::Project {
            context: context.clone(),
            project,
        })
        .collect()
}

async fn workflow_runs(
    context: &Context,
    workflow: &Workflow,
) -> Result<Vec<ExplorerNode>, ExplorerError> {
    let command = workflow_history_command(&workflow.project_key, &workflow.name);
    let runs: Vec<WorkflowRun> = query_list(context.client(), &command).await?;
    Ok(runs
        .into_iter()
        .map(|run| ExplorerNode::Run {
            context: context.clone(),
            workflow: workflow.clone(),
            run,
        })
        .collect())
}

async fn run_root(
    context: &Context,
    workflow: &Workflow,
    run: &WorkflowRun,
) -> Result<Vec<ExplorerNode>, ExplorerError> {
    let command = run_detail_command(&workflow.project_key, &workflow.name, run.num);
    let raw = context.client().run_raw_command(&command).await?;
    let detail = decode_run_detail(&command, &raw)?;

    let root = detail.root().clone();
    let status = detail.latest_run(root.id).map(|r| r.status.as_str());
    let label = decorate_opt(status, &root.name);
    debug!(workflow = %workflow.name, run = run.num, nodes = detail.nodes.len(), "Decoded run detail");

    Ok(vec![ExplorerNode::RunNode {
        context: context.clone(),
        detail: Arc::new(detail),
        node: root,
        label,
    }])
}

fn run_node_children(
    context: &Context,
    detail: &Arc<RunDetail>,
    node: &WorkflowNode,
) -> Vec<ExplorerNode> {
    let mut children = Vec::new();

    if let Some(node_run) = detail.latest_run(node.id) {
        children.push(ExplorerNode::Stages {
            context: context.clone(),
            node_run: node_run.clone(),
        });
    }

    for trigger in &node.triggers {
        let child = &trigger.child_node;
        let status = detail.latest_run(child.id).map(|r| r.status.as_str());
        children.push(ExplorerNode::RunNode {
            context: context.clone(),
            detail: Arc::clone(detail),
            node: child.clone(),
            label: decorate_opt(status, &child.name),
        });
    }

    for join in detail.joins_following(node.id) {
        children.push(ExplorerNode::RunNode {
            context: context.clone(),
            detail: Arc::clone(detail),
            node: join.clone(),
            label: join.name.clone(),
        });
    }

    children
}

fn stage_nodes(context: &Context, node_run: &NodeRun) -> Vec<ExplorerNode> {
    node_run
        .stages
        .iter()
        .map(|stage| ExplorerNode::Stage {
            context: context.clone(),
            label: decorate(&stage.status, &stage.display_name()),
            stage: stage.clone(),
        })
        .collect()
}

fn job_nodes(context: &Context, stage: &Stage) -> Vec<ExplorerNode> {
    stage
        .run_jobs
        .iter()
        .map(|job| ExplorerNode::Job {
            context: context.clone(),
            label: decorate(&job.status, &job.job.action.name),
            job: job.clone(),
        })
        .collect()
}

fn step_nodes(context: &Context, job: &JobRun) -> Vec<ExplorerNode> {
    job.job
        .action
        .actions
        .iter()
        .enumerate()
        .map(|(index, action)| {
            let status = job.job.step_status.get(index).map(|s| s.status.as_str());
            ExplorerNode::Step {
                context: context.clone(),
                label: decorate_opt(status, action.display_name()),
                action: action.clone(),
            }
        })
        .collect()
}
