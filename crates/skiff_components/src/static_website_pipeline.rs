//! Pipeline that builds a static website and copies it into the site bucket.

use tracing::info;

use skiff_core::{ResourceHandle, ResourceOptions, ResourceType, Stack};
use skiff_pipeline::{build_stage, deploy_stage, source_stage, DeployTarget};

use crate::args::StaticWebsitePipelineArgs;
use crate::cicd::{declare_artifact_bucket, declare_build_project, declare_pipeline};
use crate::error::ComponentResult;

pub const STATIC_WEBSITE_PIPELINE: ResourceType =
    ResourceType::component("skiff:web:StaticWebsitePipeline");

#[derive(Debug, Clone)]
pub struct StaticWebsitePipeline {
    pub component: ResourceHandle,
    pub artifact_bucket: ResourceHandle,
    pub build_project: ResourceHandle,
    pub pipeline: ResourceHandle,
}

impl StaticWebsitePipeline {
    /// Declare the pipeline deploying into `website_bucket`.
    pub fn build(
        stack: &mut Stack<'_>,
        args: &StaticWebsitePipelineArgs,
        website_bucket: &ResourceHandle,
    ) -> ComponentResult<Self> {
        args.pipeline.validate()?;
        let name = args.service_env.as_str();
        info!("Building static website pipeline {}", name);

        let component =
            stack.component(STATIC_WEBSITE_PIPELINE, name, ResourceOptions::new())?;
        let artifact_bucket = declare_artifact_bucket(stack, name, &component)?;
        let build_project = declare_build_project(
            stack,
            name,
            &args.pipeline.build_role,
            &args.build_spec,
            &args.pipeline.build_envs,
            &component,
        )?;

        let target = DeployTarget::StaticSite {
            bucket: website_bucket.attr("bucket").render(),
        };
        let notification = args.pipeline.notification(&args.service);
        let stages = vec![
            source_stage(&args.pipeline.git),
            build_stage(name, args.pipeline.require_build_approval),
            deploy_stage(
                &target,
                &args.pipeline.git,
                args.pipeline.require_approval,
                notification.as_ref(),
            ),
        ];

        let pipeline = declare_pipeline(
            stack,
            name,
            &args.pipeline.pipeline_role,
            &artifact_bucket,
            stages,
            &[&build_project, website_bucket],
            &component,
        )?;

        Ok(Self {
            component,
            artifact_bucket,
            build_project,
            pipeline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use skiff_core::types::{CODEPIPELINE_PIPELINE, S3_BUCKET};
    use skiff_core::{DeploymentPolicy, PlanEngine};
    use skiff_pipeline::GitSource;

    use crate::args::PipelineArgs;

    fn args() -> StaticWebsitePipelineArgs {
        let mut pipeline = PipelineArgs::new(
            "arn:aws:iam::123456789012:role/build",
            "arn:aws:iam::123456789012:role/pipeline",
            GitSource::new("acme", "storefront-web", "main"),
        );
        pipeline.require_approval = true;
        pipeline.require_notification = true;
        StaticWebsitePipelineArgs {
            service_env: "storefront-dev".to_string(),
            service: "storefront".to_string(),
            build_spec: "version: 0.2\n".to_string(),
            pipeline,
        }
    }

    #[test]
    fn test_pipeline_deploys_to_site_bucket() {
        let policy = DeploymentPolicy::none();
        let mut engine = PlanEngine::new("dev");
        let (site_bucket, built) = {
            let mut stack = Stack::new(&mut engine, &policy);
            let site_bucket = stack
                .declare(S3_BUCKET, "site", json!({ "bucket": "app.example.com" }), ResourceOptions::new())
                .unwrap();
            let built = StaticWebsitePipeline::build(&mut stack, &args(), &site_bucket).unwrap();
            (site_bucket, built)
        };

        let graph = engine.graph();
        graph.validate().unwrap();
        assert_eq!(graph.count(CODEPIPELINE_PIPELINE), 1);

        let pipeline = graph.get(&built.pipeline.urn).unwrap();
        assert!(pipeline.has_dependency(&site_bucket.urn));
        assert!(pipeline.has_dependency(&built.build_project.urn));
        assert_eq!(pipeline.ignore_changes, vec!["oAuthToken".to_string()]);

        let deploy = pipeline.property("/stages/2/actions").unwrap().as_array().unwrap();
        let names: Vec<&str> = deploy.iter().map(|a| a["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Approval", "Deploy", "Notify"]);
        assert_eq!(
            deploy[1]["configuration"]["BucketName"],
            site_bucket.attr("bucket").render()
        );

        let artifacts = graph.get(&built.artifact_bucket.urn).unwrap();
        assert_eq!(artifacts.property_str("/bucket"), Some("storefront-dev-cicd"));
    }
}
