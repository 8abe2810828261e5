//! In-memory engine that records the desired-state graph.
//!
//! [`PlanEngine`] accepts declarations in order, resolves lookups from an
//! [`Inventory`], and keeps everything in a [`ResourceGraph`] that can be printed,
//! inspected in tests, or handed to a real engine.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::engine::{Engine, LookupRequest, LookupResult};
use crate::error::{CoreError, CoreResult};
use crate::inventory::Inventory;
use crate::resource::{
    collect_references, Output, ResourceDeclaration, ResourceHandle, ResourceType, Urn,
};

/// Recorded in place of secret property values.
pub const SECRET_MASK: &str = "[secret]";

/// A resource as recorded in the graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedResource {
    pub urn: Urn,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Urn>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<Urn>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignore_changes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub secret_properties: Vec<String>,
    pub properties: Value,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, Output>,
}

impl PlannedResource {
    /// Read a property by JSON pointer, e.g. `/viewerCertificate/acmCertificateArn`.
    pub fn property(&self, pointer: &str) -> Option<&Value> {
        self.properties.pointer(pointer)
    }

    pub fn property_str(&self, pointer: &str) -> Option<&str> {
        self.property(pointer).and_then(Value::as_str)
    }

    pub fn has_dependency(&self, urn: &Urn) -> bool {
        self.depends_on.contains(urn) || self.parent.as_ref() == Some(urn)
    }
}

/// Ordered desired-state graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceGraph {
    resources: Vec<PlannedResource>,
    index: HashMap<Urn, usize>,
}

impl Serialize for ResourceGraph {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.resources.serialize(serializer)
    }
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlannedResource> {
        self.resources.iter()
    }

    pub fn get(&self, urn: &Urn) -> Option<&PlannedResource> {
        self.index.get(urn).map(|&i| &self.resources[i])
    }

    /// Declaration order of a resource.
    pub fn position(&self, urn: &Urn) -> Option<usize> {
        self.index.get(urn).copied()
    }

    pub fn of_type(&self, resource_type: ResourceType) -> Vec<&PlannedResource> {
        self.resources
            .iter()
            .filter(|r| r.resource_type == resource_type)
            .collect()
    }

    pub fn count(&self, resource_type: ResourceType) -> usize {
        self.of_type(resource_type).len()
    }

    /// Find a resource by type and logical name.
    pub fn find(&self, resource_type: ResourceType, name: &str) -> Option<&PlannedResource> {
        self.resources
            .iter()
            .find(|r| r.resource_type == resource_type && r.name == name)
    }

    fn push(&mut self, resource: PlannedResource) -> CoreResult<()> {
        if self.index.contains_key(&resource.urn) {
            return Err(CoreError::DuplicateResource(resource.urn.to_string()));
        }
        for dependency in resource.parent.iter().chain(resource.depends_on.iter()) {
            if !self.index.contains_key(dependency) {
                return Err(CoreError::UnknownDependency {
                    urn: resource.urn.to_string(),
                    dependency: dependency.to_string(),
                });
            }
        }
        self.index.insert(resource.urn.clone(), self.resources.len());
        self.resources.push(resource);
        Ok(())
    }

    fn get_mut(&mut self, urn: &Urn) -> Option<&mut PlannedResource> {
        match self.index.get(urn) {
            Some(&i) => self.resources.get_mut(i),
            None => None,
        }
    }

    /// Check that every dependency and every embedded reference points at a
    /// resource declared earlier, and that references are covered by edges.
    pub fn validate(&self) -> CoreResult<()> {
        for (position, resource) in self.resources.iter().enumerate() {
            for dependency in resource.parent.iter().chain(resource.depends_on.iter()) {
                match self.position(dependency) {
                    None => {
                        return Err(CoreError::UnknownDependency {
                            urn: resource.urn.to_string(),
                            dependency: dependency.to_string(),
                        })
                    }
                    Some(dep_position) if dep_position >= position => {
                        return Err(CoreError::DependencyOrder {
                            urn: resource.urn.to_string(),
                            dependency: dependency.to_string(),
                        })
                    }
                    Some(_) => {}
                }
            }
            for reference in collect_references(&resource.properties) {
                if !resource.has_dependency(&reference) {
                    return Err(CoreError::UndeclaredReference {
                        urn: resource.urn.to_string(),
                        reference: reference.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Engine that records declarations instead of provisioning them.
#[derive(Debug, Clone)]
pub struct PlanEngine {
    stack: String,
    inventory: Inventory,
    graph: ResourceGraph,
    exports: BTreeMap<String, Output>,
    rejections: HashMap<String, String>,
}

impl PlanEngine {
    pub fn new(stack: impl Into<String>) -> Self {
        Self {
            stack: stack.into(),
            inventory: Inventory::default(),
            graph: ResourceGraph::new(),
            exports: BTreeMap::new(),
            rejections: HashMap::new(),
        }
    }

    pub fn with_inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = inventory;
        self
    }

    /// Reject every declaration of the given type, as a real engine would reject
    /// invalid arguments.
    pub fn reject_type(mut self, resource_type: ResourceType, message: impl Into<String>) -> Self {
        self.rejections
            .insert(resource_type.token().to_string(), message.into());
        self
    }

    pub fn stack(&self) -> &str {
        &self.stack
    }

    pub fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    pub fn exports(&self) -> &BTreeMap<String, Output> {
        &self.exports
    }

    /// Consume the engine, keeping the recorded plan.
    pub fn into_plan(self) -> Plan {
        Plan {
            stack: self.stack,
            resources: self.graph,
            outputs: self.exports,
        }
    }
}

impl Engine for PlanEngine {
    fn declare(&mut self, declaration: ResourceDeclaration) -> CoreResult<ResourceHandle> {
        let ResourceDeclaration {
            resource_type,
            name,
            properties,
            options,
        } = declaration;

        if let Some(message) = self.rejections.get(resource_type.token()) {
            return Err(CoreError::DeclarationRejected {
                resource_type: resource_type.to_string(),
                name,
                message: message.clone(),
            });
        }

        let urn = Urn::new(&self.stack, options.parent_type, resource_type, &name);
        debug!("Planning {}", urn);

        let mut properties = properties;
        if let Some(object) = properties.as_object_mut() {
            for property in &options.secret_properties {
                if let Some(value) = object.get_mut(property) {
                    *value = Value::String(SECRET_MASK.to_string());
                }
            }
        }

        self.graph.push(PlannedResource {
            urn: urn.clone(),
            resource_type,
            name: name.clone(),
            parent: options.parent,
            depends_on: options.depends_on,
            ignore_changes: options.ignore_changes,
            secret_properties: options.secret_properties,
            properties,
            outputs: BTreeMap::new(),
        })?;

        Ok(ResourceHandle {
            urn,
            resource_type,
            name,
        })
    }

    fn lookup(&mut self, request: &LookupRequest) -> CoreResult<LookupResult> {
        debug!("Looking up {} '{}'", request.kind, request.name);
        self.inventory
            .resolve(request)
            .ok_or_else(|| request.not_found())
    }

    fn register_outputs(
        &mut self,
        component: &Urn,
        outputs: BTreeMap<String, Output>,
    ) -> CoreResult<()> {
        let resource = self
            .graph
            .get_mut(component)
            .ok_or_else(|| CoreError::UnknownDependency {
                urn: component.to_string(),
                dependency: component.to_string(),
            })?;
        resource.outputs.extend(outputs);
        Ok(())
    }

    fn export(&mut self, name: &str, value: Output) -> CoreResult<()> {
        self.exports.insert(name.to_string(), value);
        Ok(())
    }
}

/// A finished plan: the graph plus the stack outputs.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub stack: String,
    pub resources: ResourceGraph,
    pub outputs: BTreeMap<String, Output>,
}
