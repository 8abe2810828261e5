//! Integration tests for rendered artifacts.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use skiff_templates::{
    AppContainer, BuildSpec, ContainerDefinitions, DocumentSchema, EcrRegistry, LifecyclePolicy,
    LogRouter, TemplateError, TemplateParams, TemplateRenderer,
};

fn app(log_router: Option<LogRouter>) -> AppContainer {
    AppContainer {
        image: "123456789012.dkr.ecr.ap-northeast-1.amazonaws.com/orders-dev:latest".to_string(),
        port: 8080,
        log_group: "orders-dev".to_string(),
        region: "ap-northeast-1".to_string(),
        environment: BTreeMap::from([("STAGE".to_string(), "dev".to_string())]),
        secret_keys: vec!["DB_PASSWORD".to_string()],
        secret_arn: String::new(),
        log_router,
    }
}

#[test]
fn test_buildspec_is_deterministic() {
    let spec = BuildSpec::new(EcrRegistry::new("123456789012", "ap-northeast-1"), "orders-dev");
    let first = spec.render().unwrap();
    let second = spec.render().unwrap();
    assert_eq!(first, second);
    assert!(first.starts_with("version: 0.2"));
    assert!(first.contains("ECR=123456789012.dkr.ecr.ap-northeast-1.amazonaws.com"));
    assert!(first.contains(r#"[{"name":"app","imageUri":"%s"}]"#));
    assert!(!first.contains("{{"));
}

#[test]
fn test_buildspec_without_latest_tag() {
    let spec = BuildSpec::new(EcrRegistry::new("123456789012", "ap-northeast-1"), "orders-dev")
        .with_tag_latest(false)
        .with_container_name("api");
    let rendered = spec.render().unwrap();
    assert!(!rendered.contains("IMAGE_LATEST"));
    assert!(rendered.contains(r#""name":"api""#));
    assert!(rendered.contains("  build:\n"));
    assert!(rendered.contains("  post_build:\n"));
}

#[test]
fn test_renderer_errors() {
    let renderer = TemplateRenderer::new();
    let params = TemplateParams::new().with_flag("on", true);

    let err = renderer.render("t", "{{missing}}", &params).unwrap_err();
    assert!(matches!(err, TemplateError::UnknownPlaceholder { .. }));

    let err = renderer.render("t", "{{#if on}}open", &params).unwrap_err();
    assert!(matches!(err, TemplateError::UnbalancedBlock { .. }));

    let err = renderer.render("t", "{{/if}}", &params).unwrap_err();
    assert!(matches!(err, TemplateError::UnbalancedBlock { .. }));

    let err = renderer.render("buildspec.yml", "ECR={{ registry }}", &params).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Template buildspec.yml: malformed token '{{ registry }}'"
    );
}

#[test]
fn test_log_router_sidecar() {
    let router = LogRouter {
        image: "906394416424.dkr.ecr.ap-northeast-1.amazonaws.com/aws-for-fluent-bit:latest"
            .to_string(),
        config_file: "/fluent-bit/configs/parse-json.conf".to_string(),
    };
    let json = ContainerDefinitions::for_app(&app(Some(router))).to_json().unwrap();
    let definitions: Value = serde_json::from_str(&json).unwrap();

    assert_eq!(definitions.as_array().unwrap().len(), 2);
    assert_eq!(definitions[0]["logConfiguration"]["logDriver"], "awsfirelens");
    assert_eq!(definitions[1]["name"], "log-router");
    assert_eq!(definitions[1]["portMappings"][0]["containerPort"], 24224);
    assert_eq!(definitions[1]["firelensConfiguration"]["type"], "fluentbit");
}

#[test]
fn test_schema_rejects_malformed_documents() {
    let err = DocumentSchema::ContainerDefinitions
        .validate(&json!([{ "name": "app" }]))
        .unwrap_err();
    match err {
        TemplateError::SchemaViolation { errors, .. } => assert!(!errors.is_empty()),
        other => panic!("unexpected error: {}", other),
    }

    let policy = serde_json::to_value(LifecyclePolicy::default()).unwrap();
    DocumentSchema::LifecyclePolicy.validate(&policy).unwrap();
}
