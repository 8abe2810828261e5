use serde_json::json;
use tracing::info;

use skiff_core::types::ECS_CLUSTER;
use skiff_core::{ResourceHandle, ResourceOptions, Stack};

use crate::error::ComponentResult;

/// An ECS cluster with Container Insights enabled.
///
/// Fargate APIs look their cluster up by product name, so this is declared in a
/// separate, shared stack.
#[derive(Debug, Clone)]
pub struct EcsCluster {
    pub cluster: ResourceHandle,
}

impl EcsCluster {
    pub fn build(stack: &mut Stack<'_>, name: &str) -> ComponentResult<Self> {
        info!("Building ECS cluster {}", name);
        let cluster = stack.declare(
            ECS_CLUSTER,
            name,
            json!({
                "name": name,
                "settings": [{ "name": "containerInsights", "value": "enabled" }],
            }),
            ResourceOptions::new(),
        )?;
        Ok(Self { cluster })
    }
}
