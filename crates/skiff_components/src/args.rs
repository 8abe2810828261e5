//! Component argument records.
//!
//! Field names are kebab-case so deployment files can use the same keys as the
//! JSON settings the components have always accepted (`vpc-id`, `app-port`, ...).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use skiff_pipeline::{GitSource, Notification, DEFAULT_NOTIFY_FUNCTION};
use skiff_templates::{AppContainer, BuildSpec, EcrRegistry, LogRouter};

use crate::error::{ComponentError, ComponentResult};

/// Static website served from S3 through CloudFront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StaticWebsiteArgs {
    /// Fully qualified host name, also used as the bucket name.
    pub host: String,
    /// Hosted zone the alias record is created in.
    pub domain: String,
    pub service: String,
    pub env: String,
    /// ACM certificate for the distribution; without it no DNS record is created.
    #[serde(default)]
    pub certificate_arn: Option<String>,
}

impl StaticWebsiteArgs {
    pub fn service_env(&self) -> String {
        format!("{}-{}", self.service, self.env)
    }

    pub fn certificate(&self) -> Option<&str> {
        non_empty(self.certificate_arn.as_deref())
    }

    pub fn validate(&self) -> ComponentResult<()> {
        require("host", &self.host)?;
        require("service", &self.service)?;
        require("env", &self.env)?;
        if self.certificate().is_some() {
            require("domain", &self.domain)?;
        }
        Ok(())
    }
}

/// A CodeBuild environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildEnvironmentVariable {
    pub name: String,
    #[serde(rename = "type", default = "default_variable_type")]
    pub kind: String,
    pub value: String,
}

fn default_variable_type() -> String {
    "PLAINTEXT".to_string()
}

/// CI/CD settings shared by both pipeline kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PipelineArgs {
    pub build_role: String,
    pub pipeline_role: String,
    pub git: GitSource,
    /// Manual approval before the deploy action.
    #[serde(default)]
    pub require_approval: bool,
    /// Manual approval after the build action.
    #[serde(default)]
    pub require_build_approval: bool,
    #[serde(default)]
    pub require_notification: bool,
    #[serde(default = "default_notify_function")]
    pub notify_function: String,
    #[serde(default)]
    pub build_envs: Vec<BuildEnvironmentVariable>,
}

fn default_notify_function() -> String {
    DEFAULT_NOTIFY_FUNCTION.to_string()
}

impl PipelineArgs {
    pub fn new(
        build_role: impl Into<String>,
        pipeline_role: impl Into<String>,
        git: GitSource,
    ) -> Self {
        Self {
            build_role: build_role.into(),
            pipeline_role: pipeline_role.into(),
            git,
            require_approval: false,
            require_build_approval: false,
            require_notification: false,
            notify_function: default_notify_function(),
            build_envs: Vec::new(),
        }
    }

    /// Notification settings for a service, if notification is enabled.
    pub fn notification(&self, service_name: &str) -> Option<Notification> {
        self.require_notification.then(|| Notification {
            function_name: self.notify_function.clone(),
            service_name: service_name.to_string(),
        })
    }

    pub fn validate(&self) -> ComponentResult<()> {
        require("build-role", &self.build_role)?;
        require("pipeline-role", &self.pipeline_role)?;
        require("git.repo", &self.git.repo)?;
        require("git.branch", &self.git.branch)?;
        Ok(())
    }
}

/// Pipeline that publishes a static website bundle to its bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticWebsitePipelineArgs {
    /// `<service>-<env>`; names the project, the pipeline and the artifact bucket.
    pub service_env: String,
    pub service: String,
    /// Caller-provided CodeBuild build specification.
    pub build_spec: String,
    pub pipeline: PipelineArgs,
}

/// Fargate service behind an application load balancer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FargateApiArgs {
    pub product: String,
    pub env: String,
    #[serde(default = "default_team")]
    pub team: String,
    pub vpc_id: String,

    pub lb_subnet_ids: Vec<String>,
    pub lb_security_group_ids: Vec<String>,
    #[serde(default)]
    pub lb_certificate_arn: Option<String>,
    #[serde(default)]
    pub lb_domain: Option<String>,
    #[serde(default)]
    pub lb_subdomain: Option<String>,

    pub ecs_task_subnet_ids: Vec<String>,
    pub ecs_task_security_group_ids: Vec<String>,
    pub ecs_task_role: String,
    pub ecs_execution_role: String,
    #[serde(default = "default_true")]
    pub assign_public_ip: bool,

    pub app_port: u16,
    #[serde(default)]
    pub app_secrets: BTreeMap<String, String>,
    #[serde(default)]
    pub app_envs: BTreeMap<String, String>,
    pub app_health_check_path: String,
    pub app_scale_cpu_percent: f64,
    pub app_scale_min: u32,
    pub app_scale_max: u32,
    pub app_cpu: String,
    pub app_memory: String,
    #[serde(default)]
    pub log_router: Option<LogRouter>,
    #[serde(default = "default_log_retention")]
    pub log_retention_days: u32,

    pub registry: EcrRegistry,
    pub pipeline: PipelineArgs,
}

fn default_team() -> String {
    "dev".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_retention() -> u32 {
    30
}

impl FargateApiArgs {
    pub fn product_env(&self) -> String {
        format!("{}-{}", self.product, self.env)
    }

    pub fn certificate(&self) -> Option<&str> {
        non_empty(self.lb_certificate_arn.as_deref())
    }

    /// `<subdomain>.<domain>` when both are set.
    pub fn host(&self) -> Option<String> {
        match (
            non_empty(self.lb_subdomain.as_deref()),
            non_empty(self.lb_domain.as_deref()),
        ) {
            (Some(sub), Some(domain)) => Some(format!("{}.{}", sub, domain)),
            _ => None,
        }
    }

    /// Container inputs for the task definition. `secret_arn` is empty until the
    /// secret exists.
    pub fn app_container(&self, secret_arn: impl Into<String>) -> AppContainer {
        let product_env = self.product_env();
        AppContainer {
            image: self.registry.image(&product_env, "latest"),
            port: self.app_port,
            log_group: product_env,
            region: self.registry.region.clone(),
            environment: self.app_envs.clone(),
            secret_keys: self.app_secrets.keys().cloned().collect(),
            secret_arn: secret_arn.into(),
            log_router: self.log_router.clone(),
        }
    }

    /// Build specification for the image pipeline.
    pub fn build_spec(&self) -> BuildSpec {
        BuildSpec::new(self.registry.clone(), self.product_env())
    }

    pub fn validate(&self) -> ComponentResult<()> {
        require("product", &self.product)?;
        require("env", &self.env)?;
        require("vpc-id", &self.vpc_id)?;
        if self.lb_subnet_ids.is_empty() {
            return Err(invalid("lb-subnet-ids must not be empty"));
        }
        if self.ecs_task_subnet_ids.is_empty() {
            return Err(invalid("ecs-task-subnet-ids must not be empty"));
        }
        if self.app_port == 0 {
            return Err(invalid("app-port must be non-zero"));
        }
        if !(self.app_scale_cpu_percent > 0.0 && self.app_scale_cpu_percent <= 100.0) {
            return Err(invalid(format!(
                "app-scale-cpu-percent must be in (0, 100], got {}",
                self.app_scale_cpu_percent
            )));
        }
        if self.app_scale_min > self.app_scale_max {
            return Err(invalid(format!(
                "app-scale-min ({}) exceeds app-scale-max ({})",
                self.app_scale_min, self.app_scale_max
            )));
        }
        if self.certificate().is_some() && self.host().is_none() {
            return Err(invalid(
                "lb-domain and lb-subdomain are required with lb-certificate-arn",
            ));
        }
        self.pipeline.validate()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn require(field: &str, value: &str) -> ComponentResult<()> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> ComponentError {
    ComponentError::InvalidArgs(message.into())
}
