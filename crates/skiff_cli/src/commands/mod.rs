//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};

pub mod plan;
pub mod render;
pub mod validate;

/// skiff - AWS infrastructure components as a desired-state resource graph
#[derive(Parser)]
#[command(name = "skiff")]
#[command(version, about = "skiff - plan AWS static websites and Fargate APIs")]
#[command(long_about = r#"
skiff declares AWS infrastructure (static websites on S3 + CloudFront, Fargate
APIs behind a load balancer, and their CodePipeline pipelines) as an ordered
resource graph.

COMMANDS:
  plan      → Declare a deployment and print the resource graph and outputs
  render    → Print a rendered artifact (buildspec, container definitions, lifecycle policy)
  validate  → Check a deployment file and the dependency order of its graph

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Validation failure
  4 - Template error
  5 - IaC error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "SKIFF_JSON_LOGS")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Plan a deployment file
    Plan(plan::PlanArgs),

    /// Render a build or task artifact
    Render(render::RenderArgs),

    /// Validate a deployment file
    Validate(validate::ValidateArgs),
}

/// Serialization format for command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

impl OutputFormat {
    pub fn serialize<T: serde::Serialize>(&self, value: &T) -> anyhow::Result<String> {
        Ok(match self {
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
            OutputFormat::Json => serde_json::to_string_pretty(value)?,
        })
    }
}
