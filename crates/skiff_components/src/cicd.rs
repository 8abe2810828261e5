//! Resources shared by both pipeline components: the artifact bucket, the
//! CodeBuild project and the pipeline itself.

use serde_json::{json, Value};
use tracing::debug;

use skiff_core::types::{CODEBUILD_PROJECT, CODEPIPELINE_PIPELINE, S3_BUCKET};
use skiff_core::{CoreResult, ResourceHandle, ResourceOptions, Stack};
use skiff_pipeline::Stage;

use crate::args::BuildEnvironmentVariable;

pub const BUILD_COMPUTE_TYPE: &str = "BUILD_GENERAL1_SMALL";
pub const BUILD_IMAGE: &str = "aws/codebuild/amazonlinux2-x86_64-standard:3.0";

/// Name of the bucket that stores pipeline artifacts.
pub fn artifact_bucket_name(name: &str) -> String {
    format!("{}-cicd", name)
}

pub fn declare_artifact_bucket(
    stack: &mut Stack<'_>,
    name: &str,
    parent: &ResourceHandle,
) -> CoreResult<ResourceHandle> {
    stack.declare(
        S3_BUCKET,
        "bucket",
        json!({
            "bucket": artifact_bucket_name(name),
            "acl": "private",
        }),
        ResourceOptions::new().parent(parent),
    )
}

pub fn declare_build_project(
    stack: &mut Stack<'_>,
    name: &str,
    service_role: &str,
    build_spec: &str,
    envs: &[BuildEnvironmentVariable],
    parent: &ResourceHandle,
) -> CoreResult<ResourceHandle> {
    let variables: Vec<Value> = envs
        .iter()
        .map(|env| json!({ "name": env.name, "type": env.kind, "value": env.value }))
        .collect();

    stack.declare(
        CODEBUILD_PROJECT,
        "codebuild",
        json!({
            "name": name,
            "serviceRole": service_role,
            "artifacts": { "type": "CODEPIPELINE" },
            "environment": {
                "computeType": BUILD_COMPUTE_TYPE,
                "image": BUILD_IMAGE,
                "privilegedMode": true,
                "type": "LINUX_CONTAINER",
                "environmentVariables": variables,
            },
            "source": {
                "type": "CODEPIPELINE",
                "buildspec": build_spec,
            },
        }),
        ResourceOptions::new().parent(parent),
    )
}

/// Declare the pipeline. `depends_on` must cover every resource the stages
/// reference, including ones only named by string.
pub fn declare_pipeline(
    stack: &mut Stack<'_>,
    name: &str,
    role_arn: &str,
    artifact_bucket: &ResourceHandle,
    stages: Vec<Stage>,
    depends_on: &[&ResourceHandle],
    parent: &ResourceHandle,
) -> CoreResult<ResourceHandle> {
    debug!(
        "Pipeline {} stages: {:?}",
        name,
        stages.iter().map(|s| s.name.as_str()).collect::<Vec<_>>()
    );

    let mut options = ResourceOptions::new()
        .parent(parent)
        .depends_on(artifact_bucket)
        .ignore_changes(["oAuthToken"]);
    for dependency in depends_on {
        options = options.depends_on(dependency);
    }

    stack.declare(
        CODEPIPELINE_PIPELINE,
        "codepipeline",
        json!({
            "name": name,
            "roleArn": role_arn,
            "artifactStore": {
                "location": artifact_bucket.attr("bucket"),
                "type": "S3",
            },
            "stages": serde_json::to_value(&stages)?,
        }),
        options,
    )
}
