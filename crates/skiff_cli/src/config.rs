//! Deployment file loading.
//!
//! ```yaml
//! kind: fargate-api
//! environment: dev
//! inventory:
//!   clusters: [{ name: orders, arn: "arn:aws:ecs:..." }]
//! settings:
//!   product: orders
//!   ...
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use skiff_components::{FargateApiArgs, StaticWebsiteDeployment};
use skiff_core::Inventory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentKind {
    FargateApi,
    StaticWebsite,
}

/// A deployment file as written on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentFile {
    pub kind: DeploymentKind,
    /// Stack name the plan is recorded under.
    pub environment: String,
    #[serde(default)]
    pub inventory: Inventory,
    pub settings: serde_yaml::Value,
}

/// Settings parsed for the declared kind.
#[derive(Debug, Clone)]
pub enum Deployment {
    FargateApi(FargateApiArgs),
    StaticWebsite(StaticWebsiteDeployment),
}

impl DeploymentFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read deployment file {}", path.display()))?;
        let file: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse deployment file {}", path.display()))?;
        debug!("Loaded {:?} deployment for {}", file.kind, file.environment);
        Ok(file)
    }

    pub fn deployment(&self) -> Result<Deployment> {
        let deployment = match self.kind {
            DeploymentKind::FargateApi => Deployment::FargateApi(
                serde_yaml::from_value(self.settings.clone())
                    .context("Invalid fargate-api settings")?,
            ),
            DeploymentKind::StaticWebsite => Deployment::StaticWebsite(
                serde_yaml::from_value(self.settings.clone())
                    .context("Invalid static-website settings")?,
            ),
        };
        Ok(deployment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const STATIC_SITE: &str = r#"
kind: static-website
environment: dev
inventory:
  zones:
    - { name: example.com, zone_id: Z123 }
settings:
  host: app.example.com
  domain: example.com
  service: storefront
  env: dev
  certificate-arn: arn:aws:acm:us-east-1:123456789012:certificate/x
  build-spec: "version: 0.2"
  pipeline:
    build-role: arn:aws:iam::123456789012:role/build
    pipeline-role: arn:aws:iam::123456789012:role/pipeline
    git: { owner: acme, repo: storefront-web, branch: main }
"#;

    fn write(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_static_website() {
        let file = write(STATIC_SITE);
        let loaded = DeploymentFile::load(file.path()).unwrap();
        assert_eq!(loaded.kind, DeploymentKind::StaticWebsite);
        assert_eq!(loaded.environment, "dev");
        assert_eq!(loaded.inventory.zones.len(), 1);

        match loaded.deployment().unwrap() {
            Deployment::StaticWebsite(site) => {
                assert_eq!(site.site.host, "app.example.com");
                assert_eq!(site.pipeline.git.repo, "storefront-web");
            }
            other => panic!("unexpected deployment: {:?}", other),
        }
    }

    #[test]
    fn test_settings_mismatch_is_reported() {
        let file = write(&STATIC_SITE.replace("kind: static-website", "kind: fargate-api"));
        let loaded = DeploymentFile::load(file.path()).unwrap();
        let err = loaded.deployment().unwrap_err();
        assert!(err.to_string().contains("fargate-api settings"));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let file = write(&STATIC_SITE.replace("kind: static-website", "kind: lambda"));
        assert!(DeploymentFile::load(file.path()).is_err());
    }
}
