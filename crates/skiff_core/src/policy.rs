//! Deployment policy applied to every declaration.
//!
//! A [`DeploymentPolicy`] carries the auto-tag set and the change-suppression
//! rules for one deployment run. It is built once, then handed by reference to a
//! [`Stack`](crate::stack::Stack), which applies it to each declaration right before
//! the engine sees it.
//!
//! Tag propagation only touches the `tags` property; change suppression only
//! touches `ignore_changes` on the options. The two therefore commute.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::resource::ResourceDeclaration;

/// Name of the tag-like property on taggable resource types.
pub const TAGS_PROPERTY: &str = "tags";

/// Tags merged into every taggable resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagPolicy {
    tags: BTreeMap<String, String>,
}

impl TagPolicy {
    pub fn new(tags: BTreeMap<String, String>) -> Self {
        Self { tags }
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Merge the auto-tags into the declaration's `tags` property.
    ///
    /// Locally declared tags are kept; auto-tags win on key collision. Declarations
    /// of non-taggable types are left untouched.
    pub fn apply(&self, declaration: &mut ResourceDeclaration) {
        if self.tags.is_empty() || !declaration.resource_type.is_taggable() {
            return;
        }
        let Some(properties) = declaration.properties_mut() else {
            return;
        };

        let entry = properties
            .entry(TAGS_PROPERTY.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(existing) = entry {
            for (key, value) in &self.tags {
                existing.insert(key.clone(), Value::String(value.clone()));
            }
        }
    }
}

/// Which resource types an [`IgnoreRule`] covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreScope {
    Global,
    Types(Vec<String>),
}

impl IgnoreScope {
    pub fn matches(&self, token: &str) -> bool {
        match self {
            IgnoreScope::Global => true,
            IgnoreScope::Types(types) => types.iter().any(|t| t == token),
        }
    }
}

/// Fields whose drift the engine should never try to correct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreRule {
    pub scope: IgnoreScope,
    pub fields: Vec<String>,
}

impl IgnoreRule {
    pub fn global<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scope: IgnoreScope::Global,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn for_types<T, I, S>(types: T, fields: I) -> Self
    where
        T: IntoIterator<Item = S>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scope: IgnoreScope::Types(types.into_iter().map(Into::into).collect()),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn apply(&self, declaration: &mut ResourceDeclaration) {
        if !self.scope.matches(declaration.resource_type.token()) {
            return;
        }
        let ignore = &mut declaration.options.ignore_changes;
        for field in &self.fields {
            if !ignore.contains(field) {
                ignore.push(field.clone());
            }
        }
    }
}

/// The per-run policy: auto-tags plus change-suppression rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentPolicy {
    #[serde(default)]
    pub auto_tags: TagPolicy,
    #[serde(default)]
    pub ignore_rules: Vec<IgnoreRule>,
}

impl DeploymentPolicy {
    /// A policy that leaves every declaration unchanged.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn builder() -> DeploymentPolicyBuilder {
        DeploymentPolicyBuilder::default()
    }

    /// Apply tag propagation, then change suppression.
    pub fn apply(&self, declaration: &mut ResourceDeclaration) {
        self.auto_tags.apply(declaration);
        for rule in &self.ignore_rules {
            rule.apply(declaration);
        }
        debug!(
            "Applied policy to {} '{}' (ignore_changes: {:?})",
            declaration.resource_type, declaration.name, declaration.options.ignore_changes
        );
    }
}

/// Builder for [`DeploymentPolicy`].
#[derive(Debug, Default)]
pub struct DeploymentPolicyBuilder {
    tags: BTreeMap<String, String>,
    ignore_rules: Vec<IgnoreRule>,
}

impl DeploymentPolicyBuilder {
    /// Replace the auto-tag set. Only the last call takes effect.
    pub fn auto_tags<I, K, V>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.tags = tags
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    pub fn ignore_changes(mut self, rule: IgnoreRule) -> Self {
        self.ignore_rules.push(rule);
        self
    }

    pub fn build(self) -> DeploymentPolicy {
        DeploymentPolicy {
            auto_tags: TagPolicy::new(self.tags),
            ignore_rules: self.ignore_rules,
        }
    }
}
