//! ECR lifecycle policy document.

use serde::Serialize;

use crate::error::TemplateResult;
use crate::schema::DocumentSchema;

/// Images kept per repository before older ones expire.
pub const DEFAULT_IMAGE_RETENTION: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub tag_status: String,
    pub count_type: String,
    pub count_number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleAction {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleRule {
    pub rule_priority: u32,
    pub description: String,
    pub selection: Selection,
    pub action: RuleAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecyclePolicy {
    pub rules: Vec<LifecycleRule>,
}

impl LifecyclePolicy {
    /// Expire any image beyond the newest `count`.
    pub fn expire_beyond(count: u32) -> Self {
        Self {
            rules: vec![LifecycleRule {
                rule_priority: 1,
                description: format!("Expire images more than {}", count),
                selection: Selection {
                    tag_status: "any".to_string(),
                    count_type: "imageCountMoreThan".to_string(),
                    count_number: count,
                },
                action: RuleAction {
                    kind: "expire".to_string(),
                },
            }],
        }
    }

    pub fn to_json(&self) -> TemplateResult<String> {
        let value = serde_json::to_value(self)?;
        DocumentSchema::LifecyclePolicy.validate(&value)?;
        Ok(serde_json::to_string_pretty(&value)?)
    }
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self::expire_beyond(DEFAULT_IMAGE_RETENTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_default_policy_document() {
        let doc: Value = serde_json::from_str(&LifecyclePolicy::default().to_json().unwrap()).unwrap();
        assert_eq!(
            doc,
            json!({
                "rules": [{
                    "rulePriority": 1,
                    "description": "Expire images more than 30",
                    "selection": {
                        "tagStatus": "any",
                        "countType": "imageCountMoreThan",
                        "countNumber": 30
                    },
                    "action": { "type": "expire" }
                }]
            })
        );
    }

    #[test]
    fn test_zero_count_rejected_by_schema() {
        assert!(LifecyclePolicy::expire_beyond(0).to_json().is_err());
    }
}
