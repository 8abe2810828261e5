//! Integration tests for the component builders, planned against `PlanEngine`.

use std::collections::BTreeMap;

use serde_json::Value;
use skiff_components::{
    deploy_fargate_api, deploy_static_website, ComponentError, FargateApi, FargateApiArgs,
    FargateApiPipeline, PipelineArgs, StaticWebsiteArgs, StaticWebsiteDeployment,
};
use skiff_core::types::{
    APPAUTOSCALING_POLICY, APPAUTOSCALING_TARGET, CLOUDFRONT_DISTRIBUTION,
    CLOUDFRONT_ORIGIN_ACCESS_IDENTITY, CODEPIPELINE_PIPELINE, ECR_REPOSITORY, ECS_SERVICE,
    ECS_TASK_DEFINITION, LB_LISTENER, LB_TARGET_GROUP, ROUTE53_RECORD, S3_BUCKET,
    S3_BUCKET_POLICY, SECRETSMANAGER_SECRET_VERSION,
};
use skiff_core::{
    CoreError, DeploymentPolicy, Inventory, PlanEngine, PlannedResource, Stack, SECRET_MASK,
};
use skiff_pipeline::GitSource;
use skiff_templates::EcrRegistry;

const CLUSTER_ARN: &str = "arn:aws:ecs:ap-northeast-1:123456789012:cluster/orders";
const SECRET_ARN: &str = "arn:aws:secretsmanager:ap-northeast-1:123456789012:secret:orders-dev";

fn pipeline_args() -> PipelineArgs {
    PipelineArgs::new(
        "arn:aws:iam::123456789012:role/build",
        "arn:aws:iam::123456789012:role/pipeline",
        GitSource::new("acme", "orders", "main"),
    )
}

fn website(certificate: Option<&str>) -> StaticWebsiteDeployment {
    StaticWebsiteDeployment {
        site: StaticWebsiteArgs {
            host: "app.example.com".to_string(),
            domain: "example.com".to_string(),
            service: "storefront".to_string(),
            env: "dev".to_string(),
            certificate_arn: certificate.map(str::to_string),
        },
        build_spec: "version: 0.2\nphases:\n  build:\n    commands:\n      - npm run build\n"
            .to_string(),
        pipeline: pipeline_args(),
    }
}

fn fargate() -> FargateApiArgs {
    FargateApiArgs {
        product: "orders".to_string(),
        env: "dev".to_string(),
        team: "dev".to_string(),
        vpc_id: "vpc-1".to_string(),
        lb_subnet_ids: vec!["subnet-a".to_string(), "subnet-b".to_string()],
        lb_security_group_ids: vec!["sg-lb".to_string()],
        lb_certificate_arn: None,
        lb_domain: None,
        lb_subdomain: None,
        ecs_task_subnet_ids: vec!["subnet-c".to_string()],
        ecs_task_security_group_ids: vec!["sg-task".to_string()],
        ecs_task_role: "arn:aws:iam::123456789012:role/task".to_string(),
        ecs_execution_role: "arn:aws:iam::123456789012:role/exec".to_string(),
        assign_public_ip: true,
        app_port: 8080,
        app_secrets: BTreeMap::from([("DB_PASSWORD".to_string(), "hunter2".to_string())]),
        app_envs: BTreeMap::from([("STAGE".to_string(), "dev".to_string())]),
        app_health_check_path: "/health".to_string(),
        app_scale_cpu_percent: 60.0,
        app_scale_min: 1,
        app_scale_max: 4,
        app_cpu: "256".to_string(),
        app_memory: "512".to_string(),
        log_router: None,
        log_retention_days: 30,
        registry: EcrRegistry::new("123456789012", "ap-northeast-1"),
        pipeline: pipeline_args(),
    }
}

fn inventory() -> Inventory {
    Inventory::new()
        .with_cluster("orders", CLUSTER_ARN)
        .with_zone("example.com", "Z123")
}

fn position(engine: &PlanEngine, resource: &PlannedResource) -> usize {
    engine.graph().position(&resource.urn).unwrap()
}

#[test]
fn test_static_website_with_certificate() {
    let mut engine = PlanEngine::new("dev").with_inventory(inventory());
    let outputs = deploy_static_website(&mut engine, &website(Some("arn:aws:acm:us-east-1:1:cert/x")))
        .unwrap();

    let graph = engine.graph();
    graph.validate().unwrap();

    let bucket = graph.find(S3_BUCKET, "bucket").unwrap();
    let distribution = graph.of_type(CLOUDFRONT_DISTRIBUTION)[0];
    let record = graph.of_type(ROUTE53_RECORD)[0];
    let policy = graph.of_type(S3_BUCKET_POLICY)[0];

    let order: Vec<usize> = [bucket, distribution, record, policy]
        .iter()
        .map(|r| position(&engine, r))
        .collect();
    assert!(order.windows(2).all(|w| w[0] < w[1]), "order was {:?}", order);

    assert_eq!(bucket.property_str("/bucket"), Some("app.example.com"));
    assert_eq!(distribution.property_str("/defaultRootObject"), Some("index.html"));
    assert_eq!(distribution.property_str("/aliases/0"), Some("app.example.com"));
    assert_eq!(record.property_str("/name"), Some("app.example.com"));
    assert_eq!(record.property_str("/zoneId"), Some("Z123"));

    let oai = graph.of_type(CLOUDFRONT_ORIGIN_ACCESS_IDENTITY)[0];
    let document: Value = serde_json::from_str(policy.property_str("/policy").unwrap()).unwrap();
    let principal = document["Statement"][0]["Principal"]["AWS"][0].as_str().unwrap();
    assert!(principal.starts_with(&format!("${{{}#", oai.urn)));
    assert!(policy.has_dependency(&oai.urn));

    let exports = engine.exports();
    assert_eq!(exports["bucketName"], outputs.bucket_name);
    assert_eq!(exports["distributionId"], outputs.distribution_id);
}

#[test]
fn test_static_website_tags_and_suppression() {
    let mut engine = PlanEngine::new("dev").with_inventory(inventory());
    deploy_static_website(&mut engine, &website(None)).unwrap();

    let graph = engine.graph();
    let bucket = graph.find(S3_BUCKET, "bucket").unwrap();
    assert_eq!(bucket.property_str("/tags/Environment"), Some("dev"));
    assert_eq!(bucket.property_str("/tags/Name"), Some("storefront"));

    let oai = graph.of_type(CLOUDFRONT_ORIGIN_ACCESS_IDENTITY)[0];
    assert!(oai.property("/tags").is_none());

    let distribution = graph.of_type(CLOUDFRONT_DISTRIBUTION)[0];
    assert_eq!(distribution.ignore_changes, vec!["tags".to_string()]);

    let pipeline = graph.of_type(CODEPIPELINE_PIPELINE)[0];
    assert_eq!(pipeline.ignore_changes, vec!["oAuthToken".to_string()]);
}

#[test]
fn test_static_website_without_certificate_has_no_record() {
    for certificate in [None, Some("")] {
        let mut engine = PlanEngine::new("dev");
        deploy_static_website(&mut engine, &website(certificate)).unwrap();
        assert_eq!(engine.graph().count(ROUTE53_RECORD), 0);
        engine.graph().validate().unwrap();
    }
}

#[test]
fn test_fargate_api_plan() {
    let mut engine = PlanEngine::new("dev").with_inventory(inventory());
    let outputs = deploy_fargate_api(&mut engine, &fargate()).unwrap();

    let graph = engine.graph();
    graph.validate().unwrap();
    assert_eq!(graph.count(LB_LISTENER), 2);
    assert_eq!(graph.count(ROUTE53_RECORD), 0);
    assert_eq!(engine.exports()["dns"], outputs.dns);

    let target_group = graph.of_type(LB_TARGET_GROUP)[0];
    assert_eq!(target_group.property_str("/healthCheck/matcher"), Some("200-399"));
    assert_eq!(target_group.property_str("/healthCheck/port"), Some("8080"));

    let service = graph.of_type(ECS_SERVICE)[0];
    assert_eq!(service.property_str("/cluster"), Some(CLUSTER_ARN));
    assert_eq!(service.property("/desiredCount"), Some(&Value::from(1)));
    assert_eq!(
        service.property("/networkConfiguration/assignPublicIp"),
        Some(&Value::Bool(true))
    );
    assert_eq!(service.property_str("/tags/Role"), Some("infra"));
    assert_eq!(service.property_str("/tags/Service"), Some("orders"));
    for field in ["taskDefinition", "oAuthToken", "containerDefinitions", "desiredCount"] {
        assert!(service.ignore_changes.iter().any(|f| f == field));
    }

    let scaling_target = graph.of_type(APPAUTOSCALING_TARGET)[0];
    assert_eq!(
        scaling_target.property_str("/resourceId"),
        Some("service/orders/orders-dev")
    );
    let scaling_policy = graph.of_type(APPAUTOSCALING_POLICY)[0];
    assert_eq!(
        scaling_policy.property("/targetTrackingScalingPolicyConfiguration/targetValue"),
        Some(&Value::from(60.0))
    );

    let version = graph.of_type(SECRETSMANAGER_SECRET_VERSION)[0];
    assert_eq!(version.property_str("/secretString"), Some(SECRET_MASK));

    let repository = graph.of_type(ECR_REPOSITORY)[0];
    let pipeline = graph.of_type(CODEPIPELINE_PIPELINE)[0];
    assert!(pipeline.has_dependency(&repository.urn));
    assert!(position(&engine, repository) < position(&engine, pipeline));
    let deploy = pipeline.property("/stages/2/actions/0").unwrap();
    assert_eq!(deploy["provider"], "ECS");
    assert_eq!(deploy["configuration"]["ClusterName"], "orders");
    assert_eq!(deploy["configuration"]["ServiceName"], "orders-dev");
}

#[test]
fn test_fargate_api_secret_lookup_is_degraded() {
    let task_secrets = |inventory: Inventory| -> Value {
        let mut engine = PlanEngine::new("dev").with_inventory(inventory);
        deploy_fargate_api(&mut engine, &fargate()).unwrap();
        let task = engine.graph().of_type(ECS_TASK_DEFINITION)[0];
        let definitions: Value =
            serde_json::from_str(task.property_str("/containerDefinitions").unwrap()).unwrap();
        definitions[0]["secrets"].clone()
    };

    assert_eq!(task_secrets(inventory()), Value::Array(Vec::new()));

    let secrets = task_secrets(inventory().with_secret("orders-dev", SECRET_ARN));
    assert_eq!(secrets[0]["name"], "DB_PASSWORD");
    assert_eq!(
        secrets[0]["valueFrom"],
        format!("{}:DB_PASSWORD::", SECRET_ARN)
    );
}

#[test]
fn test_fargate_api_record_with_certificate() {
    let mut args = fargate();
    args.lb_certificate_arn = Some("arn:aws:acm:ap-northeast-1:1:cert/x".to_string());
    args.lb_domain = Some("example.com".to_string());
    args.lb_subdomain = Some("api".to_string());

    let mut engine = PlanEngine::new("dev").with_inventory(inventory());
    deploy_fargate_api(&mut engine, &args).unwrap();

    let graph = engine.graph();
    graph.validate().unwrap();
    let record = graph.of_type(ROUTE53_RECORD)[0];
    assert_eq!(record.property_str("/name"), Some("api.example.com"));
    let https = graph.find(LB_LISTENER, "httpsListener").unwrap();
    assert_eq!(
        https.property_str("/certificateArn"),
        Some("arn:aws:acm:ap-northeast-1:1:cert/x")
    );
}

#[test]
fn test_fargate_api_missing_cluster_fails_before_declaring() {
    let mut engine = PlanEngine::new("dev");
    let err = deploy_fargate_api(&mut engine, &fargate()).unwrap_err();
    assert!(matches!(
        err,
        ComponentError::Core(CoreError::LookupFailed { ref kind, .. }) if kind == "ecs-cluster"
    ));
    assert!(engine.graph().is_empty());
}

#[test]
fn test_rejected_declaration_aborts_build() {
    let mut engine = PlanEngine::new("dev")
        .with_inventory(inventory())
        .reject_type(ECS_SERVICE, "quota exceeded");
    let err = deploy_fargate_api(&mut engine, &fargate()).unwrap_err();
    assert!(matches!(
        err,
        ComponentError::Core(CoreError::DeclarationRejected { .. })
    ));
    assert_eq!(engine.graph().count(ECS_TASK_DEFINITION), 1);
    assert_eq!(engine.graph().count(APPAUTOSCALING_TARGET), 0);
    assert_eq!(engine.graph().count(CODEPIPELINE_PIPELINE), 0);
}

#[test]
fn test_invalid_args_rejected() {
    let mut args = fargate();
    args.app_scale_cpu_percent = 0.0;
    let mut engine = PlanEngine::new("dev").with_inventory(inventory());
    let err = deploy_fargate_api(&mut engine, &args).unwrap_err();
    assert!(matches!(err, ComponentError::InvalidArgs(_)));
    assert!(engine.graph().is_empty());
}

#[test]
fn test_fargate_api_pipeline_rejects_invalid_pipeline_args() {
    let mut args = fargate();
    let policy = DeploymentPolicy::none();
    let mut engine = PlanEngine::new("dev").with_inventory(inventory());
    {
        let mut stack = Stack::new(&mut engine, &policy);
        let api = FargateApi::build(&mut stack, &args).unwrap();

        args.pipeline.build_role = String::new();
        let err = FargateApiPipeline::build(&mut stack, &args, &api).unwrap_err();
        assert!(matches!(err, ComponentError::InvalidArgs(ref m) if m.contains("build-role")));
    }
    assert_eq!(engine.graph().count(CODEPIPELINE_PIPELINE), 0);
    assert_eq!(engine.graph().count(S3_BUCKET), 0);
}

#[test]
fn test_static_website_deployment_from_yaml() {
    let yaml = r#"
host: app.example.com
domain: example.com
service: storefront
env: dev
build-spec: "version: 0.2"
pipeline:
  build-role: arn:aws:iam::123456789012:role/build
  pipeline-role: arn:aws:iam::123456789012:role/pipeline
  require-approval: true
  git:
    owner: acme
    repo: storefront-web
    branch: main
    polling: true
"#;
    let deployment: StaticWebsiteDeployment = serde_yaml::from_str(yaml).unwrap();
    assert!(deployment.site.certificate_arn.is_none());
    assert!(deployment.pipeline.require_approval);
    assert!(deployment.pipeline.git.polling);

    let mut engine = PlanEngine::new("dev");
    deploy_static_website(&mut engine, &deployment).unwrap();
    let pipeline = engine.graph().of_type(CODEPIPELINE_PIPELINE)[0];
    assert_eq!(
        pipeline.property_str("/stages/2/actions/0/name"),
        Some("Approval")
    );
}
