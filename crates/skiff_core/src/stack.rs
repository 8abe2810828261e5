//! Declaration context shared by all components in a deployment run.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::engine::{Engine, LookupRequest, LookupResult};
use crate::error::{CoreError, CoreResult};
use crate::policy::DeploymentPolicy;
use crate::resource::{Output, ResourceDeclaration, ResourceHandle, ResourceOptions, ResourceType};

/// Wraps an engine with the run's [`DeploymentPolicy`].
///
/// Every declaration goes through three steps: references embedded in the
/// properties must be covered by `depends_on` (or the parent), the policy is
/// applied, then the engine records it.
pub struct Stack<'a> {
    engine: &'a mut dyn Engine,
    policy: &'a DeploymentPolicy,
}

impl<'a> Stack<'a> {
    pub fn new(engine: &'a mut dyn Engine, policy: &'a DeploymentPolicy) -> Self {
        Self { engine, policy }
    }

    pub fn policy(&self) -> &DeploymentPolicy {
        self.policy
    }

    /// Declare a resource.
    pub fn declare(
        &mut self,
        resource_type: ResourceType,
        name: &str,
        properties: Value,
        options: ResourceOptions,
    ) -> CoreResult<ResourceHandle> {
        let mut declaration = ResourceDeclaration::new(resource_type, name, properties, options);

        if let Some(reference) = declaration.undeclared_references().into_iter().next() {
            return Err(CoreError::UndeclaredReference {
                urn: format!("{} '{}'", resource_type, name),
                reference: reference.to_string(),
            });
        }

        self.policy.apply(&mut declaration);
        debug!("Declaring {} '{}'", resource_type, name);
        self.engine.declare(declaration)
    }

    /// Declare a component resource that groups children.
    pub fn component(
        &mut self,
        resource_type: ResourceType,
        name: &str,
        options: ResourceOptions,
    ) -> CoreResult<ResourceHandle> {
        self.declare(resource_type, name, Value::Object(Default::default()), options)
    }

    /// Read a pre-existing resource; failures surface unchanged.
    pub fn lookup(&mut self, request: &LookupRequest) -> CoreResult<LookupResult> {
        self.engine.lookup(request)
    }

    pub fn register_outputs(
        &mut self,
        component: &ResourceHandle,
        outputs: BTreeMap<String, Output>,
    ) -> CoreResult<()> {
        self.engine.register_outputs(&component.urn, outputs)
    }

    pub fn export(&mut self, name: &str, value: Output) -> CoreResult<()> {
        debug!("Exporting {}", name);
        self.engine.export(name, value)
    }
}
