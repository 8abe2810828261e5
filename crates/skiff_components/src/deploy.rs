//! Top-level entry points: one deployment run per call.
//!
//! Each entry point builds the run's [`DeploymentPolicy`], declares the
//! components against the engine and exports the stack outputs.

use serde::{Deserialize, Serialize};
use tracing::info;

use skiff_core::{DeploymentPolicy, Engine, IgnoreRule, Output, Stack};

use crate::args::{FargateApiArgs, PipelineArgs, StaticWebsiteArgs, StaticWebsitePipelineArgs};
use crate::error::ComponentResult;
use crate::fargate_api::FargateApi;
use crate::fargate_api_pipeline::FargateApiPipeline;
use crate::static_website::StaticWebsite;
use crate::static_website_pipeline::StaticWebsitePipeline;

/// Fields the engine must never reconcile once a Fargate API exists. The
/// pipeline owns task definitions and desired counts after the first deploy.
pub const FARGATE_IGNORED_FIELDS: [&str; 4] = [
    "taskDefinition",
    "oAuthToken",
    "containerDefinitions",
    "desiredCount",
];

/// A static website plus the pipeline that publishes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StaticWebsiteDeployment {
    #[serde(flatten)]
    pub site: StaticWebsiteArgs,
    /// CodeBuild build specification for the site bundle.
    pub build_spec: String,
    pub pipeline: PipelineArgs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticWebsiteOutputs {
    pub bucket_name: Output,
    pub distribution_id: Output,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FargateApiOutputs {
    pub dns: Output,
}

pub fn static_website_policy(args: &StaticWebsiteArgs) -> DeploymentPolicy {
    DeploymentPolicy::builder()
        .auto_tags([
            ("Environment", args.env.as_str()),
            ("Name", args.service.as_str()),
        ])
        .build()
}

pub fn fargate_api_policy(args: &FargateApiArgs) -> DeploymentPolicy {
    DeploymentPolicy::builder()
        .auto_tags([
            ("Role", "infra"),
            ("Environment", args.env.as_str()),
            ("Service", args.product.as_str()),
            ("Team", args.team.as_str()),
        ])
        .ignore_changes(IgnoreRule::global(FARGATE_IGNORED_FIELDS))
        .build()
}

/// Declare a static website and its pipeline, exporting `bucketName` and
/// `distributionId`.
pub fn deploy_static_website(
    engine: &mut dyn Engine,
    deployment: &StaticWebsiteDeployment,
) -> ComponentResult<StaticWebsiteOutputs> {
    let policy = static_website_policy(&deployment.site);
    let mut stack = Stack::new(engine, &policy);

    let site = StaticWebsite::build(&mut stack, &deployment.site)?;
    StaticWebsitePipeline::build(
        &mut stack,
        &StaticWebsitePipelineArgs {
            service_env: deployment.site.service_env(),
            service: deployment.site.service.clone(),
            build_spec: deployment.build_spec.clone(),
            pipeline: deployment.pipeline.clone(),
        },
        &site.bucket,
    )?;

    stack.export("bucketName", site.bucket_name.clone())?;
    stack.export("distributionId", site.distribution_id.clone())?;
    info!("Static website {} declared", deployment.site.host);

    Ok(StaticWebsiteOutputs {
        bucket_name: site.bucket_name,
        distribution_id: site.distribution_id,
    })
}

/// Declare a Fargate API and its pipeline, exporting `dns`.
pub fn deploy_fargate_api(
    engine: &mut dyn Engine,
    args: &FargateApiArgs,
) -> ComponentResult<FargateApiOutputs> {
    let policy = fargate_api_policy(args);
    let mut stack = Stack::new(engine, &policy);

    let api = FargateApi::build(&mut stack, args)?;
    FargateApiPipeline::build(&mut stack, args, &api)?;

    stack.export("dns", api.dns.clone())?;
    info!("Fargate API {} declared", api.service_name);

    Ok(FargateApiOutputs { dns: api.dns })
}
