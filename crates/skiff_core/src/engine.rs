//! The provisioning engine interface.
//!
//! The engine owns diffing, dependency scheduling and apply. Components only
//! declare resources, read pre-existing ones and publish outputs through it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::resource::{Output, ResourceDeclaration, ResourceHandle, Urn};

/// Kinds of pre-existing resources a component may look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LookupKind {
    EcsCluster,
    HostedZone,
    Secret,
}

impl LookupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupKind::EcsCluster => "ecs-cluster",
            LookupKind::HostedZone => "hosted-zone",
            LookupKind::Secret => "secret",
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to read a resource that already exists outside this stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub kind: LookupKind,
    pub name: String,
}

impl LookupRequest {
    pub fn cluster(name: impl Into<String>) -> Self {
        Self {
            kind: LookupKind::EcsCluster,
            name: name.into(),
        }
    }

    pub fn zone(name: impl Into<String>) -> Self {
        Self {
            kind: LookupKind::HostedZone,
            name: name.into(),
        }
    }

    pub fn secret(name: impl Into<String>) -> Self {
        Self {
            kind: LookupKind::Secret,
            name: name.into(),
        }
    }

    /// Build the error an engine returns when the resource is absent.
    pub fn not_found(&self) -> CoreError {
        CoreError::LookupFailed {
            kind: self.kind.to_string(),
            name: self.name.clone(),
            message: "not found".to_string(),
        }
    }
}

/// Attributes read back from a pre-existing resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResult {
    pub kind: LookupKind,
    pub name: String,
    pub attributes: BTreeMap<String, String>,
}

impl LookupResult {
    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.attributes.get(attribute).map(String::as_str)
    }

    /// Fetch an attribute, failing the lookup if the engine did not return it.
    pub fn require(&self, attribute: &str) -> CoreResult<&str> {
        self.get(attribute).ok_or_else(|| CoreError::LookupFailed {
            kind: self.kind.to_string(),
            name: self.name.clone(),
            message: format!("missing attribute '{}'", attribute),
        })
    }
}

/// Capabilities the components consume from a provisioning engine.
pub trait Engine {
    /// Declare a resource and return its handle.
    fn declare(&mut self, declaration: ResourceDeclaration) -> CoreResult<ResourceHandle>;

    /// Read a pre-existing resource.
    fn lookup(&mut self, request: &LookupRequest) -> CoreResult<LookupResult>;

    /// Attach outputs to a component resource.
    fn register_outputs(&mut self, component: &Urn, outputs: BTreeMap<String, Output>)
        -> CoreResult<()>;

    /// Publish a named stack output.
    fn export(&mut self, name: &str, value: Output) -> CoreResult<()>;
}
