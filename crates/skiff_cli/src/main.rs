//! skiff CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Validation failure
//! - 4: Template error
//! - 5: IaC error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use skiff_components::ComponentError;
use skiff_core::CoreError;
use skiff_templates::TemplateError;

mod commands;
mod config;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
    pub const TEMPLATE_ERROR: u8 = 4;
    pub const IAC_ERROR: u8 = 5;
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json_logs);

    let result = match cli.command {
        Commands::Plan(args) => commands::plan::execute(args),
        Commands::Render(args) => commands::render::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

fn init_logging(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::new("skiff=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skiff=info,warn"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    if result.is_err() {
        // Logging already initialized, continue
    }
}

/// Map the first typed error in the chain to an exit code.
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(err) = cause.downcast_ref::<ComponentError>() {
            return match err {
                ComponentError::InvalidArgs(_) => ExitCodes::INVALID_ARGS,
                ComponentError::Template(_) => ExitCodes::TEMPLATE_ERROR,
                ComponentError::Core(core) => categorize_core(core),
            };
        }
        if let Some(core) = cause.downcast_ref::<CoreError>() {
            return categorize_core(core);
        }
        if cause.downcast_ref::<TemplateError>().is_some() {
            return ExitCodes::TEMPLATE_ERROR;
        }
        if cause.downcast_ref::<serde_yaml::Error>().is_some() {
            return ExitCodes::INVALID_ARGS;
        }
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::NotFound {
                return ExitCodes::INVALID_ARGS;
            }
        }
    }
    ExitCodes::GENERAL_ERROR
}

fn categorize_core(e: &CoreError) -> u8 {
    match e {
        CoreError::LookupFailed { .. } | CoreError::DeclarationRejected { .. } => {
            ExitCodes::IAC_ERROR
        }
        CoreError::Serialization(_) => ExitCodes::GENERAL_ERROR,
        CoreError::DuplicateResource(_)
        | CoreError::UnknownDependency { .. }
        | CoreError::DependencyOrder { .. }
        | CoreError::UndeclaredReference { .. } => ExitCodes::VALIDATION_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_categorize_through_context() {
        let err: anyhow::Result<()> = Err(ComponentError::InvalidArgs("app-port".to_string()))
            .context("Failed to plan orders.yaml");
        assert_eq!(categorize_error(&err.unwrap_err()), ExitCodes::INVALID_ARGS);
    }

    #[test]
    fn test_categorize_core_errors() {
        let lookup = anyhow::Error::new(ComponentError::Core(CoreError::LookupFailed {
            kind: "ecs-cluster".to_string(),
            name: "orders".to_string(),
            message: "not found".to_string(),
        }));
        assert_eq!(categorize_error(&lookup), ExitCodes::IAC_ERROR);

        let order = anyhow::Error::new(CoreError::DependencyOrder {
            urn: "a".to_string(),
            dependency: "b".to_string(),
        });
        assert_eq!(categorize_error(&order), ExitCodes::VALIDATION_FAILURE);
    }

    #[test]
    fn test_categorize_missing_file() {
        let err: anyhow::Result<()> = Err(std::io::Error::from(std::io::ErrorKind::NotFound))
            .context("Failed to read deployment file orders.yaml");
        assert_eq!(categorize_error(&err.unwrap_err()), ExitCodes::INVALID_ARGS);

        let denied = anyhow::Error::new(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert_eq!(categorize_error(&denied), ExitCodes::GENERAL_ERROR);
    }

    #[test]
    fn test_categorize_template_error() {
        let err = anyhow::Error::new(TemplateError::UnknownPlaceholder {
            template: "buildspec".to_string(),
            placeholder: "registry".to_string(),
        });
        assert_eq!(categorize_error(&err), ExitCodes::TEMPLATE_ERROR);
        assert_eq!(
            categorize_error(&anyhow::anyhow!("boom")),
            ExitCodes::GENERAL_ERROR
        );
    }
}
