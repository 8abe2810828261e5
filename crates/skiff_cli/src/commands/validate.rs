//! Validate command - check a deployment file without printing the plan.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::plan::build_plan;

#[derive(Args)]
pub struct ValidateArgs {
    /// Deployment file (YAML)
    pub file: PathBuf,
}

pub fn execute(args: ValidateArgs) -> Result<()> {
    println!("📋 Validating {}...", args.file.display());
    let plan = build_plan(&args.file)?;

    println!(
        "   ✅ {} resources declared in dependency order",
        plan.resources.len()
    );
    for (name, value) in &plan.outputs {
        println!("   📤 {} = {}", name, value);
    }
    println!();
    println!("✅ All validations passed!");
    Ok(())
}
