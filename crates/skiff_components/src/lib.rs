//! # skiff_components
//!
//! AWS infrastructure components declared against a [`skiff_core::Engine`].
//!
//! - [`StaticWebsite`]: S3 bucket, CloudFront distribution, optional alias record
//! - [`StaticWebsitePipeline`]: GitHub → CodeBuild → S3 deploy
//! - [`FargateApi`]: load balancer, ECS service, autoscaling, secrets, ECR
//! - [`FargateApiPipeline`]: GitHub → image build → ECS deploy
//! - [`EcsCluster`]: the shared cluster Fargate APIs run in
//!
//! [`deploy_static_website`] and [`deploy_fargate_api`] run a whole deployment:
//! they build the tag and change-suppression policy, declare the components and
//! export the stack outputs.

pub mod args;
pub mod cicd;
pub mod deploy;
pub mod ecs_cluster;
pub mod error;
pub mod fargate_api;
pub mod fargate_api_pipeline;
pub mod static_website;
pub mod static_website_pipeline;

pub use args::{
    BuildEnvironmentVariable, FargateApiArgs, PipelineArgs, StaticWebsiteArgs,
    StaticWebsitePipelineArgs,
};
pub use deploy::{
    deploy_fargate_api, deploy_static_website, fargate_api_policy, static_website_policy,
    FargateApiOutputs, StaticWebsiteDeployment, StaticWebsiteOutputs,
};
pub use ecs_cluster::EcsCluster;
pub use error::{ComponentError, ComponentResult};
pub use fargate_api::FargateApi;
pub use fargate_api_pipeline::FargateApiPipeline;
pub use static_website::StaticWebsite;
pub use static_website_pipeline::StaticWebsitePipeline;
