//! Render command - print one of the generated artifacts.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use skiff_components::{ComponentError, FargateApiArgs};
use skiff_templates::{ContainerDefinitions, LifecyclePolicy, DEFAULT_IMAGE_RETENTION};

use crate::config::{Deployment, DeploymentFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Artifact {
    /// CodeBuild build specification for the API image
    Buildspec,
    /// ECS container definitions for the API task
    ContainerDefinitions,
    /// ECR lifecycle policy
    LifecyclePolicy,
}

#[derive(Args)]
pub struct RenderArgs {
    /// Artifact to render
    #[arg(value_enum)]
    pub artifact: Artifact,

    /// Fargate API deployment file (required for buildspec and container-definitions)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Secret ARN referenced by the container definitions
    #[arg(long)]
    pub secret_arn: Option<String>,

    /// Do not tag and push `latest` in the buildspec
    #[arg(long)]
    pub no_latest: bool,

    /// Images kept by the lifecycle policy
    #[arg(
        long,
        default_value_t = DEFAULT_IMAGE_RETENTION,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub retention: u32,
}

pub fn execute(args: RenderArgs) -> Result<()> {
    print!("{}", render(&args)?);
    Ok(())
}

pub fn render(args: &RenderArgs) -> Result<String> {
    let rendered = match args.artifact {
        Artifact::Buildspec => fargate_settings(args.file.as_deref())?
            .build_spec()
            .with_tag_latest(!args.no_latest)
            .render()
            .context("Failed to render buildspec")?,
        Artifact::ContainerDefinitions => {
            let settings = fargate_settings(args.file.as_deref())?;
            let secret_arn = args.secret_arn.clone().unwrap_or_default();
            let mut json = ContainerDefinitions::for_app(&settings.app_container(secret_arn))
                .to_json()
                .context("Failed to render container definitions")?;
            json.push('\n');
            json
        }
        Artifact::LifecyclePolicy => {
            let mut json = LifecyclePolicy::expire_beyond(args.retention)
                .to_json()
                .context("Failed to render lifecycle policy")?;
            json.push('\n');
            json
        }
    };
    Ok(rendered)
}

fn fargate_settings(file: Option<&Path>) -> Result<FargateApiArgs> {
    let file = file.ok_or_else(|| {
        ComponentError::InvalidArgs("--file is required for this artifact".to_string())
    })?;
    match DeploymentFile::load(file)?.deployment()? {
        Deployment::FargateApi(settings) => Ok(settings),
        Deployment::StaticWebsite(_) => Err(ComponentError::InvalidArgs(format!(
            "{} is not a fargate-api deployment",
            file.display()
        ))
        .into()),
    }
}
