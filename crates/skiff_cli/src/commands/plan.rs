//! Plan command - declare a deployment against the in-memory engine.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use skiff_components::{deploy_fargate_api, deploy_static_website};
use skiff_core::{Plan, PlanEngine};

use super::OutputFormat;
use crate::config::{Deployment, DeploymentFile};

#[derive(Args)]
pub struct PlanArgs {
    /// Deployment file (YAML)
    pub file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "yaml")]
    pub format: OutputFormat,

    /// Write the plan to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn execute(args: PlanArgs) -> Result<()> {
    let plan = build_plan(&args.file)?;
    info!(
        "Planned {} resources for stack {}",
        plan.resources.len(),
        plan.stack
    );

    let rendered = args.format.serialize(&plan)?;
    match &args.output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write plan to {}", path.display()))?;
            println!("✅ Plan written to {}", path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

/// Load a deployment file, declare it and check the resulting graph.
pub fn build_plan(file: &std::path::Path) -> Result<Plan> {
    let deployment_file = DeploymentFile::load(file)?;
    let mut engine = PlanEngine::new(&deployment_file.environment)
        .with_inventory(deployment_file.inventory.clone());

    match deployment_file.deployment()? {
        Deployment::FargateApi(args) => {
            deploy_fargate_api(&mut engine, &args)
                .with_context(|| format!("Failed to plan Fargate API {}", args.product_env()))?;
        }
        Deployment::StaticWebsite(site) => {
            deploy_static_website(&mut engine, &site)
                .with_context(|| format!("Failed to plan static website {}", site.site.host))?;
        }
    }

    engine
        .graph()
        .validate()
        .context("Planned graph failed validation")?;
    Ok(engine.into_plan())
}
