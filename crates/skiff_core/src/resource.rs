//! Resource declarations, handles and output references.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// A resource type known to the engine.
///
/// `taggable` records whether the type exposes a mutable `tags` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceType {
    token: &'static str,
    taggable: bool,
}

impl ResourceType {
    pub const fn new(token: &'static str, taggable: bool) -> Self {
        Self { token, taggable }
    }

    /// A component resource groups child resources and carries no tags.
    pub const fn component(token: &'static str) -> Self {
        Self::new(token, false)
    }

    pub fn token(&self) -> &'static str {
        self.token
    }

    pub fn is_taggable(&self) -> bool {
        self.taggable
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token)
    }
}

impl Serialize for ResourceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token)
    }
}

/// Unique resource name within a stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Urn(String);

impl Urn {
    /// Build a URN from the stack, the parent's type (if any), the resource type and
    /// the logical name.
    pub fn new(
        stack: &str,
        parent_type: Option<ResourceType>,
        resource_type: ResourceType,
        name: &str,
    ) -> Self {
        let qualified = match parent_type {
            Some(parent) => format!("{}${}", parent.token(), resource_type.token()),
            None => resource_type.token().to_string(),
        };
        Self(format!("urn:skiff:{}::{}::{}", stack, qualified, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A value computed by the engine, or one already known at declaration time.
///
/// References serialize as `${<urn>#<attribute>}` placeholders so the engine can
/// substitute them after the referenced resource exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Known(String),
    Ref { urn: Urn, attribute: String },
}

impl Output {
    pub fn known(value: impl Into<String>) -> Self {
        Output::Known(value.into())
    }

    /// The URN this output depends on, if any.
    pub fn dependency(&self) -> Option<&Urn> {
        match self {
            Output::Known(_) => None,
            Output::Ref { urn, .. } => Some(urn),
        }
    }

    /// Render the output as it appears inside declared properties.
    pub fn render(&self) -> String {
        match self {
            Output::Known(value) => value.clone(),
            Output::Ref { urn, attribute } => format!("${{{}#{}}}", urn, attribute),
        }
    }

    /// Interpolate the output into a format string containing a single `{}`.
    ///
    /// The result is still a reference to the same resource, so callers must keep
    /// the dependency edge.
    pub fn interpolate(&self, pattern: &str) -> String {
        pattern.replacen("{}", &self.render(), 1)
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl Serialize for Output {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.render())
    }
}

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{(urn:skiff:[^#}]+)#([A-Za-z0-9_]+)\}").expect("reference pattern is valid")
    })
}

/// Collect every resource reference embedded in a property tree.
pub fn collect_references(value: &Value) -> Vec<Urn> {
    let mut found = Vec::new();
    walk_strings(value, &mut |s| {
        for caps in reference_pattern().captures_iter(s) {
            let urn = Urn(caps[1].to_string());
            if !found.contains(&urn) {
                found.push(urn);
            }
        }
    });
    found
}

fn walk_strings(value: &Value, visit: &mut dyn FnMut(&str)) {
    match value {
        Value::String(s) => visit(s),
        Value::Array(items) => items.iter().for_each(|item| walk_strings(item, visit)),
        Value::Object(map) => map.values().for_each(|item| walk_strings(item, visit)),
        _ => {}
    }
}

/// A declared resource as returned by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHandle {
    pub urn: Urn,
    pub resource_type: ResourceType,
    pub name: String,
}

impl ResourceHandle {
    /// Reference a computed attribute of this resource.
    pub fn attr(&self, attribute: &str) -> Output {
        Output::Ref {
            urn: self.urn.clone(),
            attribute: attribute.to_string(),
        }
    }

    /// The provider-assigned ID.
    pub fn id(&self) -> Output {
        self.attr("id")
    }

    pub fn arn(&self) -> Output {
        self.attr("arn")
    }
}

/// Options that shape how the engine treats a declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Urn>,
    #[serde(skip)]
    pub parent_type: Option<ResourceType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<Urn>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignore_changes: Vec<String>,
    /// Top-level properties holding secret values.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub secret_properties: Vec<String>,
}

impl ResourceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parent(mut self, parent: &ResourceHandle) -> Self {
        self.parent = Some(parent.urn.clone());
        self.parent_type = Some(parent.resource_type);
        self
    }

    pub fn depends_on(mut self, dependency: &ResourceHandle) -> Self {
        if !self.depends_on.contains(&dependency.urn) {
            self.depends_on.push(dependency.urn.clone());
        }
        self
    }

    pub fn ignore_changes<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            let field = field.into();
            if !self.ignore_changes.contains(&field) {
                self.ignore_changes.push(field);
            }
        }
        self
    }

    pub fn secret(mut self, property: &str) -> Self {
        self.secret_properties.push(property.to_string());
        self
    }

    fn depends_on_urn(&self, urn: &Urn) -> bool {
        self.parent.as_ref() == Some(urn) || self.depends_on.contains(urn)
    }
}

/// A resource the caller wants to exist.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDeclaration {
    pub resource_type: ResourceType,
    pub name: String,
    pub properties: Value,
    pub options: ResourceOptions,
}

impl ResourceDeclaration {
    pub fn new(
        resource_type: ResourceType,
        name: impl Into<String>,
        properties: Value,
        options: ResourceOptions,
    ) -> Self {
        Self {
            resource_type,
            name: name.into(),
            properties,
            options,
        }
    }

    /// Mutable access to the property object, if the properties are an object.
    pub fn properties_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.properties.as_object_mut()
    }

    /// References in the properties that are not covered by a dependency edge.
    pub fn undeclared_references(&self) -> Vec<Urn> {
        collect_references(&self.properties)
            .into_iter()
            .filter(|urn| !self.options.depends_on_urn(urn))
            .collect()
    }
}
