//! CodeBuild build specification for container images.

use serde::{Deserialize, Serialize};

use crate::error::TemplateResult;
use crate::renderer::{TemplateParams, TemplateRenderer};

const BUILDSPEC_TEMPLATE: &str = include_str!("../templates/buildspec.yml");

/// File the build writes for the ECS deploy action.
pub const IMAGE_DEFINITIONS_FILE: &str = "imagedefinitions.json";

/// An ECR registry, addressed by account and region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EcrRegistry {
    pub account_id: String,
    pub region: String,
}

impl EcrRegistry {
    pub fn new(account_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            region: region.into(),
        }
    }

    /// Registry host, e.g. `123456789012.dkr.ecr.ap-northeast-1.amazonaws.com`.
    pub fn host(&self) -> String {
        format!("{}.dkr.ecr.{}.amazonaws.com", self.account_id, self.region)
    }

    /// Full image reference for a repository and tag.
    pub fn image(&self, repository: &str, tag: &str) -> String {
        format!("{}/{}:{}", self.host(), repository, tag)
    }
}

/// Parameters for the image build specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSpec {
    pub registry: EcrRegistry,
    pub image_repo_name: String,
    pub container_name: String,
    pub tag_latest: bool,
}

impl BuildSpec {
    /// Build spec for the `app` container of a repository, also pushing `latest`.
    pub fn new(registry: EcrRegistry, image_repo_name: impl Into<String>) -> Self {
        Self {
            registry,
            image_repo_name: image_repo_name.into(),
            container_name: "app".to_string(),
            tag_latest: true,
        }
    }

    pub fn with_container_name(mut self, name: impl Into<String>) -> Self {
        self.container_name = name.into();
        self
    }

    pub fn with_tag_latest(mut self, tag_latest: bool) -> Self {
        self.tag_latest = tag_latest;
        self
    }

    fn params(&self) -> TemplateParams {
        TemplateParams::new()
            .with_variable("registry", self.registry.host())
            .with_variable("image_repo_name", &self.image_repo_name)
            .with_variable("container_name", &self.container_name)
            .with_variable("image_definitions_file", IMAGE_DEFINITIONS_FILE)
            .with_flag("tag_latest", self.tag_latest)
    }

    /// Render the build specification text.
    pub fn render(&self) -> TemplateResult<String> {
        TemplateRenderer::new().render("buildspec.yml", BUILDSPEC_TEMPLATE, &self.params())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> BuildSpec {
        BuildSpec::new(EcrRegistry::new("123456789012", "ap-northeast-1"), "orders-dev")
    }

    #[test]
    fn test_registry_host() {
        let registry = EcrRegistry::new("123456789012", "ap-northeast-1");
        assert_eq!(
            registry.host(),
            "123456789012.dkr.ecr.ap-northeast-1.amazonaws.com"
        );
        assert_eq!(
            registry.image("orders-dev", "latest"),
            "123456789012.dkr.ecr.ap-northeast-1.amazonaws.com/orders-dev:latest"
        );
    }

    #[test]
    fn test_render_buildspec() {
        let rendered = spec().render().unwrap();
        assert!(rendered.starts_with("version: 0.2\n"));
        assert!(rendered.contains("      - ECR=123456789012.dkr.ecr.ap-northeast-1.amazonaws.com\n"));
        assert!(rendered.contains("      - IMAGE_REPO_NAME=orders-dev\n"));
        assert!(rendered.contains(
            "      - printf '[{\"name\":\"app\",\"imageUri\":\"%s\"}]' $IMAGE_URI > imagedefinitions.json\n"
        ));
        assert!(rendered.contains("      - docker push $IMAGE_LATEST\n"));
        assert!(rendered.contains("\n  build:\n"));
        assert!(rendered.ends_with("    - imagedefinitions.json\n"));
        assert!(!rendered.contains("{{"));
    }

    #[test]
    fn test_render_without_latest() {
        let rendered = spec().with_tag_latest(false).render().unwrap();
        assert!(!rendered.contains("IMAGE_LATEST"));
        assert!(rendered.contains("      - docker push $IMAGE_URI\n      - echo Writing"));
        assert!(rendered.contains("      - printf $IMAGE_URI\n  build:\n"));
    }

    #[test]
    fn test_custom_container_name() {
        let rendered = spec().with_container_name("api").render().unwrap();
        assert!(rendered.contains("[{\"name\":\"api\",\"imageUri\":\"%s\"}]"));
    }

    #[test]
    fn test_render_is_deterministic() {
        assert_eq!(spec().render().unwrap(), spec().render().unwrap());
    }
}
