//! Stage assemblers.
//!
//! | Stage  | Actions                                   |
//! |--------|-------------------------------------------|
//! | Source | source                                    |
//! | Build  | build, approval?                          |
//! | Deploy | approval?, deploy (S3 or ECS), notify?    |

use serde::Serialize;
use tracing::debug;

use crate::action::{
    codebuild_action, ecs_deploy_action, github_source_action, manual_approval_action,
    notify_action, s3_deploy_action, ActionKind, GitSource, Notification, StageAction,
};

/// A named, ordered group of actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stage {
    pub name: String,
    pub actions: Vec<StageAction>,
}

impl Stage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: Vec::new(),
        }
    }

    pub fn push(&mut self, action: StageAction) {
        self.actions.push(action);
    }

    pub fn kinds(&self) -> Vec<ActionKind> {
        self.actions.iter().filter_map(|a| a.kind).collect()
    }
}

/// Where the deploy stage ships the build artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployTarget {
    StaticSite { bucket: String },
    EcsService { cluster: String, service: String },
}

pub fn source_stage(git: &GitSource) -> Stage {
    let mut stage = Stage::new("Source");
    stage.push(github_source_action(git));
    stage
}

pub fn build_stage(project_name: &str, approval: bool) -> Stage {
    let mut stage = Stage::new("Build");
    stage.push(codebuild_action(project_name));
    if approval {
        stage.push(manual_approval_action());
    }
    stage
}

/// Deploy stage: optional approval first, the deploy, optional notify last.
pub fn deploy_stage(
    target: &DeployTarget,
    git: &GitSource,
    approval: bool,
    notification: Option<&Notification>,
) -> Stage {
    let mut stage = Stage::new("Deploy");
    if approval {
        stage.push(manual_approval_action());
    }
    stage.push(match target {
        DeployTarget::StaticSite { bucket } => s3_deploy_action(bucket),
        DeployTarget::EcsService { cluster, service } => ecs_deploy_action(cluster, service),
    });
    if let Some(notification) = notification {
        stage.push(notify_action(git, notification));
    }
    debug!("Assembled deploy stage with {} actions", stage.actions.len());
    stage
}
