//! Pre-existing resources visible to lookups during planning.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::{LookupKind, LookupRequest, LookupResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingCluster {
    pub name: String,
    pub arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingZone {
    pub name: String,
    pub zone_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingSecret {
    pub name: String,
    pub arn: String,
}

/// Resources that exist before the deployment run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub clusters: Vec<ExistingCluster>,
    #[serde(default)]
    pub zones: Vec<ExistingZone>,
    #[serde(default)]
    pub secrets: Vec<ExistingSecret>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cluster(mut self, name: impl Into<String>, arn: impl Into<String>) -> Self {
        self.clusters.push(ExistingCluster {
            name: name.into(),
            arn: arn.into(),
        });
        self
    }

    pub fn with_zone(mut self, name: impl Into<String>, zone_id: impl Into<String>) -> Self {
        self.zones.push(ExistingZone {
            name: name.into(),
            zone_id: zone_id.into(),
        });
        self
    }

    pub fn with_secret(mut self, name: impl Into<String>, arn: impl Into<String>) -> Self {
        self.secrets.push(ExistingSecret {
            name: name.into(),
            arn: arn.into(),
        });
        self
    }

    /// Resolve a lookup against the inventory.
    pub fn resolve(&self, request: &LookupRequest) -> Option<LookupResult> {
        let attributes: BTreeMap<String, String> = match request.kind {
            LookupKind::EcsCluster => {
                let cluster = self.clusters.iter().find(|c| c.name == request.name)?;
                BTreeMap::from([
                    ("arn".to_string(), cluster.arn.clone()),
                    ("clusterName".to_string(), cluster.name.clone()),
                ])
            }
            LookupKind::HostedZone => {
                let wanted = normalize_zone(&request.name);
                let zone = self
                    .zones
                    .iter()
                    .find(|z| normalize_zone(&z.name) == wanted)?;
                BTreeMap::from([
                    ("name".to_string(), format!("{}.", wanted)),
                    ("zoneId".to_string(), zone.zone_id.clone()),
                ])
            }
            LookupKind::Secret => {
                let secret = self.secrets.iter().find(|s| s.name == request.name)?;
                BTreeMap::from([
                    ("arn".to_string(), secret.arn.clone()),
                    ("name".to_string(), secret.name.clone()),
                ])
            }
        };

        Some(LookupResult {
            kind: request.kind,
            name: request.name.clone(),
            attributes,
        })
    }
}

/// Hosted zone names match with or without the trailing dot.
fn normalize_zone(name: &str) -> &str {
    name.trim_end_matches('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_zone_trailing_dot() {
        let inventory = Inventory::new().with_zone("example.com.", "Z123");
        let result = inventory.resolve(&LookupRequest::zone("example.com")).unwrap();
        assert_eq!(result.get("zoneId"), Some("Z123"));
        assert_eq!(result.get("name"), Some("example.com."));
    }

    #[test]
    fn test_resolve_missing() {
        let inventory = Inventory::new().with_cluster("orders", "arn:aws:ecs:cluster/orders");
        assert!(inventory.resolve(&LookupRequest::cluster("billing")).is_none());
        assert!(inventory.resolve(&LookupRequest::secret("orders")).is_none());
    }

    #[test]
    fn test_resolve_cluster_attributes() {
        let inventory = Inventory::new().with_cluster("orders", "arn:aws:ecs:cluster/orders");
        let result = inventory.resolve(&LookupRequest::cluster("orders")).unwrap();
        assert_eq!(result.require("clusterName").unwrap(), "orders");
        assert!(result.require("status").is_err());
    }
}
