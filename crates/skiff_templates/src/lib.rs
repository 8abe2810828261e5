//! # skiff_templates
//!
//! Rendered artifacts consumed by the infrastructure components:
//!
//! - the CodeBuild build specification that builds and pushes a container image,
//! - ECS container definitions (app container plus optional FireLens sidecar),
//! - the ECR lifecycle policy.
//!
//! Text artifacts go through [`TemplateRenderer`]; JSON documents are typed
//! structs serialized with `serde_json` and checked against an embedded schema.
//!
//! ## Example
//!
//! ```rust
//! use skiff_templates::{BuildSpec, EcrRegistry, LifecyclePolicy};
//!
//! let spec = BuildSpec::new(EcrRegistry::new("123456789012", "ap-northeast-1"), "orders-dev")
//!     .render()
//!     .unwrap();
//! assert!(spec.contains("IMAGE_REPO_NAME=orders-dev"));
//!
//! let policy = LifecyclePolicy::default().to_json().unwrap();
//! assert!(policy.contains("Expire images more than 30"));
//! ```

pub mod buildspec;
pub mod container_definitions;
pub mod error;
pub mod lifecycle;
pub mod renderer;
pub mod schema;

pub use buildspec::{BuildSpec, EcrRegistry, IMAGE_DEFINITIONS_FILE};
pub use container_definitions::{AppContainer, ContainerDefinition, ContainerDefinitions, LogRouter};
pub use error::{TemplateError, TemplateResult};
pub use lifecycle::{LifecyclePolicy, DEFAULT_IMAGE_RETENTION};
pub use renderer::{TemplateParams, TemplateRenderer};
pub use schema::DocumentSchema;
