//! # skiff_pipeline
//!
//! Ordered stage and action lists for CodePipeline.
//!
//! Each action kind carries the exact category/owner/provider/version identifier
//! CodePipeline expects. Stages are plain data; the components serialize them
//! into the pipeline resource.

pub mod action;
pub mod stage;

pub use action::{
    ActionKind, ActionType, GitSource, Notification, StageAction, BUILD_ARTIFACT, DEFAULT_NOTIFY_FUNCTION,
    SOURCE_ARTIFACT,
};
pub use stage::{build_stage, deploy_stage, source_stage, DeployTarget, Stage};
