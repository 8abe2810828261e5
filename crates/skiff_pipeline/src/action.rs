//! Pipeline action records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use skiff_templates::IMAGE_DEFINITIONS_FILE;

/// Artifact produced by the source action.
pub const SOURCE_ARTIFACT: &str = "SourceArtifact";
/// Artifact produced by the build action.
pub const BUILD_ARTIFACT: &str = "BuildArtifact";

/// Action type identifier as CodePipeline expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionType {
    pub category: &'static str,
    pub owner: &'static str,
    pub provider: &'static str,
    pub version: &'static str,
}

/// The kinds of actions the assemblers emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    GithubSource,
    CodeBuild,
    ManualApproval,
    S3Deploy,
    EcsDeploy,
    LambdaNotify,
}

impl ActionKind {
    pub const fn action_type(&self) -> ActionType {
        match self {
            ActionKind::GithubSource => ActionType {
                category: "Source",
                owner: "ThirdParty",
                provider: "GitHub",
                version: "1",
            },
            ActionKind::CodeBuild => ActionType {
                category: "Build",
                owner: "AWS",
                provider: "CodeBuild",
                version: "1",
            },
            ActionKind::ManualApproval => ActionType {
                category: "Approval",
                owner: "AWS",
                provider: "Manual",
                version: "1",
            },
            ActionKind::S3Deploy => ActionType {
                category: "Deploy",
                owner: "AWS",
                provider: "S3",
                version: "1",
            },
            ActionKind::EcsDeploy => ActionType {
                category: "Deploy",
                owner: "AWS",
                provider: "ECS",
                version: "1",
            },
            ActionKind::LambdaNotify => ActionType {
                category: "Invoke",
                owner: "AWS",
                provider: "Lambda",
                version: "1",
            },
        }
    }

    /// Action name within its stage.
    pub const fn action_name(&self) -> &'static str {
        match self {
            ActionKind::GithubSource => "Source",
            ActionKind::CodeBuild => "Build",
            ActionKind::ManualApproval => "Approval",
            ActionKind::S3Deploy | ActionKind::EcsDeploy => "Deploy",
            ActionKind::LambdaNotify => "Notify",
        }
    }
}

/// One action inside a pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageAction {
    pub name: String,
    pub category: String,
    pub owner: String,
    pub provider: String,
    pub version: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub configuration: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub input_artifacts: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub output_artifacts: Vec<String>,
    #[serde(skip)]
    pub kind: Option<ActionKind>,
}

impl StageAction {
    pub fn new(kind: ActionKind) -> Self {
        let action_type = kind.action_type();
        Self {
            name: kind.action_name().to_string(),
            category: action_type.category.to_string(),
            owner: action_type.owner.to_string(),
            provider: action_type.provider.to_string(),
            version: action_type.version.to_string(),
            configuration: BTreeMap::new(),
            input_artifacts: Vec::new(),
            output_artifacts: Vec::new(),
            kind: Some(kind),
        }
    }

    pub fn config(mut self, key: &str, value: impl Into<String>) -> Self {
        self.configuration.insert(key.to_string(), value.into());
        self
    }

    pub fn input(mut self, artifact: &str) -> Self {
        self.input_artifacts.push(artifact.to_string());
        self
    }

    pub fn output(mut self, artifact: &str) -> Self {
        self.output_artifacts.push(artifact.to_string());
        self
    }
}

/// GitHub coordinates for the source action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitSource {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    #[serde(default)]
    pub polling: bool,
    /// Placeholder token; the real one is set out of band and never reconciled.
    #[serde(default = "default_oauth_token")]
    pub oauth_token: String,
}

fn default_oauth_token() -> String {
    "invalidTemporaryToken".to_string()
}

impl GitSource {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
            polling: false,
            oauth_token: default_oauth_token(),
        }
    }

    pub fn with_polling(mut self, polling: bool) -> Self {
        self.polling = polling;
        self
    }
}

/// Lambda invoked after a deploy to announce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Notification {
    #[serde(default = "default_notify_function")]
    pub function_name: String,
    pub service_name: String,
}

/// Lambda invoked by the notify action unless configured otherwise.
pub const DEFAULT_NOTIFY_FUNCTION: &str = "code-pipeline-production";

fn default_notify_function() -> String {
    DEFAULT_NOTIFY_FUNCTION.to_string()
}

impl Notification {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            function_name: default_notify_function(),
            service_name: service_name.into(),
        }
    }
}

pub fn github_source_action(git: &GitSource) -> StageAction {
    StageAction::new(ActionKind::GithubSource)
        .output(SOURCE_ARTIFACT)
        .config("OAuthToken", &git.oauth_token)
        .config("Owner", &git.owner)
        .config("Repo", &git.repo)
        .config("Branch", &git.branch)
        .config("PollForSourceChanges", git.polling.to_string())
}

pub fn codebuild_action(project_name: &str) -> StageAction {
    StageAction::new(ActionKind::CodeBuild)
        .config("ProjectName", project_name)
        .input(SOURCE_ARTIFACT)
        .output(BUILD_ARTIFACT)
}

pub fn manual_approval_action() -> StageAction {
    StageAction::new(ActionKind::ManualApproval)
}

pub fn s3_deploy_action(bucket: &str) -> StageAction {
    StageAction::new(ActionKind::S3Deploy)
        .config("BucketName", bucket)
        .config("Extract", "true")
        .input(BUILD_ARTIFACT)
}

pub fn ecs_deploy_action(cluster: &str, service: &str) -> StageAction {
    StageAction::new(ActionKind::EcsDeploy)
        .config("ClusterName", cluster)
        .config("ServiceName", service)
        .config("FileName", IMAGE_DEFINITIONS_FILE)
        .input(BUILD_ARTIFACT)
}

pub fn notify_action(git: &GitSource, notification: &Notification) -> StageAction {
    let user_parameters = json!({
        "owner": git.owner,
        "repo": git.repo,
        "serviceName": notification.service_name,
    });
    StageAction::new(ActionKind::LambdaNotify)
        .input(SOURCE_ARTIFACT)
        .config("FunctionName", &notification.function_name)
        .config("UserParameters", user_parameters.to_string())
}
