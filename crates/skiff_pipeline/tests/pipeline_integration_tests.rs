//! Integration tests for stage assembly.

use serde_json::Value;
use skiff_pipeline::{
    build_stage, deploy_stage, source_stage, ActionKind, DeployTarget, GitSource, Notification,
    BUILD_ARTIFACT, SOURCE_ARTIFACT,
};

fn pipeline(approval: bool, notify: bool) -> Vec<skiff_pipeline::Stage> {
    let git = GitSource::new("acme", "orders", "main");
    let notification = Notification::new("orders");
    vec![
        source_stage(&git),
        build_stage("orders-dev", false),
        deploy_stage(
            &DeployTarget::EcsService {
                cluster: "orders".to_string(),
                service: "orders-dev".to_string(),
            },
            &git,
            approval,
            notify.then_some(&notification),
        ),
    ]
}

#[test]
fn test_artifacts_flow_between_stages() {
    let stages = pipeline(false, false);
    let names: Vec<&str> = stages.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Source", "Build", "Deploy"]);

    assert_eq!(stages[0].actions[0].output_artifacts, vec![SOURCE_ARTIFACT]);
    assert_eq!(stages[1].actions[0].input_artifacts, vec![SOURCE_ARTIFACT]);
    assert_eq!(stages[1].actions[0].output_artifacts, vec![BUILD_ARTIFACT]);
    assert_eq!(stages[2].actions[0].input_artifacts, vec![BUILD_ARTIFACT]);
}

#[test]
fn test_full_deploy_stage_order() {
    let stages = pipeline(true, true);
    assert_eq!(
        stages[2].kinds(),
        vec![
            ActionKind::ManualApproval,
            ActionKind::EcsDeploy,
            ActionKind::LambdaNotify
        ]
    );
}

#[test]
fn test_stages_serialize_for_pipeline_resource() {
    let value = serde_json::to_value(pipeline(false, true)).unwrap();
    let notify = &value[2]["actions"][1];
    assert_eq!(notify["category"], "Invoke");
    assert_eq!(notify["provider"], "Lambda");
    assert_eq!(notify["inputArtifacts"][0], SOURCE_ARTIFACT);

    let params: Value =
        serde_json::from_str(notify["configuration"]["UserParameters"].as_str().unwrap()).unwrap();
    assert_eq!(params["repo"], "orders");
    assert!(value[2]["actions"][0].get("kind").is_none());
}
