//! # skiff_core
//!
//! Desired-state resource graph primitives for skiff.
//!
//! Components declare resources through a [`Stack`], which applies the run's
//! [`DeploymentPolicy`] (auto-tags and change suppression) and forwards each
//! declaration to an [`Engine`]. The [`PlanEngine`] records declarations into a
//! [`ResourceGraph`] instead of provisioning them.
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use skiff_core::{types, DeploymentPolicy, PlanEngine, ResourceOptions, Stack};
//!
//! let policy = DeploymentPolicy::builder()
//!     .auto_tags([("Environment", "dev")])
//!     .build();
//! let mut engine = PlanEngine::new("dev");
//! let mut stack = Stack::new(&mut engine, &policy);
//!
//! let bucket = stack
//!     .declare(types::S3_BUCKET, "bucket", json!({ "acl": "private" }), ResourceOptions::new())
//!     .unwrap();
//! stack.export("bucketName", bucket.attr("bucket")).unwrap();
//! ```

pub mod engine;
pub mod error;
pub mod inventory;
pub mod plan;
pub mod policy;
pub mod resource;
pub mod stack;
pub mod types;

pub use engine::{Engine, LookupKind, LookupRequest, LookupResult};
pub use error::{CoreError, CoreResult};
pub use inventory::Inventory;
pub use plan::{Plan, PlanEngine, PlannedResource, ResourceGraph, SECRET_MASK};
pub use policy::{DeploymentPolicy, IgnoreRule, IgnoreScope, TagPolicy};
pub use resource::{Output, ResourceDeclaration, ResourceHandle, ResourceOptions, ResourceType, Urn};
pub use stack::Stack;
