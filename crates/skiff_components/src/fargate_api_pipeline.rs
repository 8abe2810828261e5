//! Pipeline that builds the API image, pushes it to ECR and rolls the service.

use tracing::info;

use skiff_core::{ResourceHandle, ResourceOptions, ResourceType, Stack};
use skiff_pipeline::{build_stage, deploy_stage, source_stage, DeployTarget};

use crate::args::FargateApiArgs;
use crate::cicd::{declare_artifact_bucket, declare_build_project, declare_pipeline};
use crate::error::ComponentResult;
use crate::fargate_api::FargateApi;

pub const FARGATE_API_PIPELINE: ResourceType =
    ResourceType::component("skiff:server:FargateApiPipeline");

#[derive(Debug, Clone)]
pub struct FargateApiPipeline {
    pub component: ResourceHandle,
    pub artifact_bucket: ResourceHandle,
    pub build_project: ResourceHandle,
    pub pipeline: ResourceHandle,
}

impl FargateApiPipeline {
    pub fn build(
        stack: &mut Stack<'_>,
        args: &FargateApiArgs,
        api: &FargateApi,
    ) -> ComponentResult<Self> {
        args.pipeline.validate()?;
        let name = api.service_name.as_str();
        info!("Building Fargate API pipeline {}", name);

        let build_spec = args.build_spec().render()?;

        let component = stack.component(FARGATE_API_PIPELINE, name, ResourceOptions::new())?;
        let artifact_bucket = declare_artifact_bucket(stack, name, &component)?;
        let build_project = declare_build_project(
            stack,
            name,
            &args.pipeline.build_role,
            &build_spec,
            &args.pipeline.build_envs,
            &component,
        )?;

        let target = DeployTarget::EcsService {
            cluster: api.cluster_name.clone(),
            service: name.to_string(),
        };
        let notification = args.pipeline.notification(&args.product);
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
            &[&build_project, &api.repository, &api.service],
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
