//! JSON schemas for generated documents.

use serde_json::Value;
use tracing::debug;

use crate::error::{TemplateError, TemplateResult};

/// Documents with an embedded schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSchema {
    ContainerDefinitions,
    LifecyclePolicy,
}

impl DocumentSchema {
    pub fn name(&self) -> &'static str {
        match self {
            DocumentSchema::ContainerDefinitions => "container definitions",
            DocumentSchema::LifecyclePolicy => "lifecycle policy",
        }
    }

    fn source(&self) -> &'static str {
        match self {
            DocumentSchema::ContainerDefinitions => {
                include_str!("../schemas/container-definitions.schema.json")
            }
            DocumentSchema::LifecyclePolicy => {
                include_str!("../schemas/lifecycle-policy.schema.json")
            }
        }
    }

    /// Validate a document against this schema.
    pub fn validate(&self, instance: &Value) -> TemplateResult<()> {
        let schema: Value = serde_json::from_str(self.source())?;
        let validator =
            jsonschema::validator_for(&schema).map_err(|e| TemplateError::InvalidSchema {
                document: self.name().to_string(),
                message: e.to_string(),
            })?;

        let errors: Vec<String> = validator
            .iter_errors(instance)
            .map(|e| format!("{} at {}", e, e.instance_path))
            .collect();

        if !errors.is_empty() {
            return Err(TemplateError::SchemaViolation {
                document: self.name().to_string(),
                errors,
            });
        }

        debug!("{} passed schema validation", self.name());
        Ok(())
    }
}
