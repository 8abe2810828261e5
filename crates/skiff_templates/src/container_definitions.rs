//! ECS container definitions for an API task.
//!
//! The task always has an `app` container. With a log router configured, the app
//! logs through FireLens and a `log-router` sidecar ships to CloudWatch; without
//! one the app logs straight to CloudWatch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TemplateResult;
use crate::schema::DocumentSchema;

/// Name of the application container.
pub const APP_CONTAINER: &str = "app";
/// Name of the FireLens sidecar.
pub const LOG_ROUTER_CONTAINER: &str = "log-router";
/// Port the FireLens forwarder listens on.
pub const LOG_ROUTER_PORT: u16 = 24224;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    pub container_port: u16,
    pub host_port: u16,
    pub protocol: String,
}

impl PortMapping {
    pub fn tcp(port: u16) -> Self {
        Self {
            container_port: port,
            host_port: port,
            protocol: "tcp".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentVariable {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretReference {
    pub value_from: String,
    pub name: String,
}

impl SecretReference {
    /// Reference one JSON key of a Secrets Manager secret.
    pub fn json_key(secret_arn: &str, key: &str) -> Self {
        Self {
            value_from: format!("{}:{}::", secret_arn, key),
            name: key.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ulimit {
    pub name: String,
    pub soft_limit: u32,
    pub hard_limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub retries: u32,
    pub command: Vec<String>,
    pub timeout: u32,
    pub interval: u32,
}

impl Default for HealthCheck {
    fn default() -> Self {
        Self {
            retries: 3,
            command: vec!["CMD-SHELL".to_string(), "echo hello".to_string()],
            timeout: 5,
            interval: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogConfiguration {
    pub log_driver: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

impl LogConfiguration {
    pub fn awslogs(group: &str, region: &str, stream_prefix: &str) -> Self {
        Self {
            log_driver: "awslogs".to_string(),
            options: BTreeMap::from([
                ("awslogs-group".to_string(), group.to_string()),
                ("awslogs-region".to_string(), region.to_string()),
                ("awslogs-stream-prefix".to_string(), stream_prefix.to_string()),
            ]),
        }
    }

    pub fn firelens() -> Self {
        Self {
            log_driver: "awsfirelens".to_string(),
            options: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirelensConfiguration {
    #[serde(rename = "type")]
    pub kind: String,
    pub options: BTreeMap<String, String>,
}

/// One container in a task definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerDefinition {
    pub name: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<u32>,
    pub port_mappings: Vec<PortMapping>,
    pub environment: Vec<EnvironmentVariable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secrets: Option<Vec<SecretReference>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ulimits: Option<Vec<Ulimit>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check: Option<HealthCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub essential: Option<bool>,
    pub log_configuration: LogConfiguration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mount_points: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volumes_from: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firelens_configuration: Option<FirelensConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// FireLens sidecar settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LogRouter {
    pub image: String,
    pub config_file: String,
}

/// Inputs for the task's container definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppContainer {
    pub image: String,
    pub port: u16,
    pub log_group: String,
    pub region: String,
    pub environment: BTreeMap<String, String>,
    /// Keys of the JSON secret exposed as environment variables.
    pub secret_keys: Vec<String>,
    /// ARN of the secret; empty when it is not available yet.
    pub secret_arn: String,
    pub log_router: Option<LogRouter>,
}

/// The full container definition document for a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ContainerDefinitions(pub Vec<ContainerDefinition>);

impl ContainerDefinitions {
    /// Build the app container and, if configured, the log router sidecar.
    pub fn for_app(app: &AppContainer) -> Self {
        let environment = app
            .environment
            .iter()
            .map(|(name, value)| EnvironmentVariable {
                name: name.clone(),
                value: value.clone(),
            })
            .collect();

        let mut secret_keys: Vec<&String> = app.secret_keys.iter().collect();
        secret_keys.sort();
        secret_keys.dedup();
        let secrets = if app.secret_arn.is_empty() {
            Vec::new()
        } else {
            secret_keys
                .into_iter()
                .map(|key| SecretReference::json_key(&app.secret_arn, key))
                .collect()
        };

        let log_configuration = match app.log_router {
            Some(_) => LogConfiguration::firelens(),
            None => LogConfiguration::awslogs(&app.log_group, &app.region, APP_CONTAINER),
        };

        let mut containers = vec![ContainerDefinition {
            name: APP_CONTAINER.to_string(),
            image: app.image.clone(),
            cpu: None,
            port_mappings: vec![PortMapping::tcp(app.port)],
            environment,
            secrets: Some(secrets),
            ulimits: Some(vec![Ulimit {
                name: "nofile".to_string(),
                soft_limit: 65535,
                hard_limit: 65535,
            }]),
            health_check: Some(HealthCheck::default()),
            essential: Some(true),
            log_configuration,
            mount_points: None,
            volumes_from: None,
            firelens_configuration: None,
            user: None,
        }];

        if let Some(router) = &app.log_router {
            containers.push(ContainerDefinition {
                name: LOG_ROUTER_CONTAINER.to_string(),
                image: router.image.clone(),
                cpu: Some(0),
                port_mappings: vec![PortMapping::tcp(LOG_ROUTER_PORT)],
                environment: Vec::new(),
                secrets: None,
                ulimits: None,
                health_check: None,
                essential: None,
                log_configuration: LogConfiguration::awslogs(
                    &app.log_group,
                    &app.region,
                    "fluentbit",
                ),
                mount_points: Some(Vec::new()),
                volumes_from: Some(Vec::new()),
                firelens_configuration: Some(FirelensConfiguration {
                    kind: "fluentbit".to_string(),
                    options: BTreeMap::from([
                        ("config-file-type".to_string(), "file".to_string()),
                        ("config-file-value".to_string(), router.config_file.clone()),
                    ]),
                }),
                user: Some("0".to_string()),
            });
        }

        Self(containers)
    }

    pub fn containers(&self) -> &[ContainerDefinition] {
        &self.0
    }

    /// Serialize and validate the document.
    pub fn to_json(&self) -> TemplateResult<String> {
        let value = serde_json::to_value(self)?;
        DocumentSchema::ContainerDefinitions.validate(&value)?;
        Ok(serde_json::to_string_pretty(&value)?)
    }
}
