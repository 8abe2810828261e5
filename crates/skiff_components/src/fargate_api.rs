//! Fargate API: an ECS service behind an application load balancer, with
//! autoscaling, secrets, logs and an ECR repository for its images.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use tracing::{info, warn};

use skiff_core::types::{
    APPAUTOSCALING_POLICY, APPAUTOSCALING_TARGET, CLOUDWATCH_LOG_GROUP, ECR_LIFECYCLE_POLICY,
    ECR_REPOSITORY, ECS_SERVICE, ECS_TASK_DEFINITION, LB_LISTENER, LB_LOAD_BALANCER,
    LB_TARGET_GROUP, ROUTE53_RECORD, SECRETSMANAGER_SECRET, SECRETSMANAGER_SECRET_VERSION,
};
use skiff_core::{LookupRequest, Output, ResourceHandle, ResourceOptions, ResourceType, Stack};
use skiff_templates::container_definitions::APP_CONTAINER;
use skiff_templates::{ContainerDefinitions, LifecyclePolicy};

use crate::args::FargateApiArgs;
use crate::error::ComponentResult;

pub const FARGATE_API: ResourceType = ResourceType::component("skiff:server:FargateApi");

pub const HEALTH_CHECK_MATCHER: &str = "200-399";
const SCALABLE_DIMENSION: &str = "ecs:service:DesiredCount";

/// Handles and outputs of a declared Fargate API.
#[derive(Debug, Clone)]
pub struct FargateApi {
    pub component: ResourceHandle,
    pub load_balancer: ResourceHandle,
    pub target_group: ResourceHandle,
    pub https_listener: ResourceHandle,
    pub task_definition: ResourceHandle,
    pub service: ResourceHandle,
    pub repository: ResourceHandle,
    /// Alias record, only declared with a certificate.
    pub record: Option<ResourceHandle>,
    /// Name of the pre-existing cluster the service runs in.
    pub cluster_name: String,
    /// `<product>-<env>`; also the service, repository and log group name.
    pub service_name: String,
    pub dns: Output,
}

impl FargateApi {
    pub fn build(stack: &mut Stack<'_>, args: &FargateApiArgs) -> ComponentResult<Self> {
        args.validate()?;
        let product_env = args.product_env();
        info!("Building Fargate API {}", product_env);

        let cluster = stack.lookup(&LookupRequest::cluster(&args.product))?;
        let cluster_arn = cluster.require("arn")?.to_string();
        let cluster_name = cluster.require("clusterName")?.to_string();

        let zone_id = match (args.certificate(), args.lb_domain.as_deref()) {
            (Some(_), Some(domain)) => {
                let zone = stack.lookup(&LookupRequest::zone(domain))?;
                Some(zone.require("zoneId")?.to_string())
            }
            _ => None,
        };

        let component = stack.component(FARGATE_API, &product_env, ResourceOptions::new())?;
        let child = || ResourceOptions::new().parent(&component);

        // Load balancing
        let lb = stack.declare(
            LB_LOAD_BALANCER,
            "alb",
            json!({
                "name": product_env,
                "subnets": args.lb_subnet_ids,
                "securityGroups": args.lb_security_group_ids,
            }),
            child(),
        )?;

        let target_group = stack.declare(
            LB_TARGET_GROUP,
            "targetGroup",
            json!({
                "name": product_env,
                "port": args.app_port,
                "protocol": "HTTP",
                "targetType": "ip",
                "vpcId": args.vpc_id,
                "deregistrationDelay": 1,
                "healthCheck": {
                    "enabled": true,
                    "healthyThreshold": 3,
                    "unhealthyThreshold": 3,
                    "interval": 30,
                    "matcher": HEALTH_CHECK_MATCHER,
                    "path": args.app_health_check_path,
                    "port": args.app_port.to_string(),
                    "protocol": "HTTP",
                    "timeout": 5,
                },
            }),
            child(),
        )?;

        stack.declare(
            LB_LISTENER,
            "httpListener",
            json!({
                "loadBalancerArn": lb.arn(),
                "port": 80,
                "protocol": "HTTP",
                "defaultActions": [{
                    "type": "redirect",
                    "redirect": { "port": "443", "protocol": "HTTPS", "statusCode": "HTTP_301" },
                }],
            }),
            child().depends_on(&lb),
        )?;

        let mut https_props = json!({
            "loadBalancerArn": lb.arn(),
            "port": 443,
            "protocol": "HTTPS",
            "defaultActions": [{ "type": "forward", "targetGroupArn": target_group.arn() }],
        });
        if let Some(certificate) = args.certificate() {
            https_props["certificateArn"] = Value::String(certificate.to_string());
        }
        let https_listener = stack.declare(
            LB_LISTENER,
            "httpsListener",
            https_props,
            child().depends_on(&lb).depends_on(&target_group),
        )?;

        // Logging and secrets
        let log_group = stack.declare(
            CLOUDWATCH_LOG_GROUP,
            "logGroup",
            json!({ "name": product_env, "retentionInDays": args.log_retention_days }),
            child(),
        )?;

        let secret = stack.declare(
            SECRETSMANAGER_SECRET,
            "secretManager",
            json!({ "name": product_env }),
            child(),
        )?;
        stack.declare(
            SECRETSMANAGER_SECRET_VERSION,
            "secrets",
            json!({
                "secretId": secret.id(),
                "secretString": serde_json::to_string(&args.app_secrets)
                    .map_err(skiff_core::CoreError::from)?,
            }),
            child().depends_on(&secret).secret("secretString"),
        )?;

        // The secret only becomes visible once it has been applied, so the first
        // run goes ahead without secret references in the task.
        let secret_arn = match stack.lookup(&LookupRequest::secret(&product_env)) {
            Ok(found) => found.get("arn").unwrap_or_default().to_string(),
            Err(e) => {
                warn!("Secret {} is not ready yet: {}", product_env, e);
                String::new()
            }
        };

        // Compute
        let container_definitions =
            ContainerDefinitions::for_app(&args.app_container(secret_arn)).to_json()?;

        let task_definition = stack.declare(
            ECS_TASK_DEFINITION,
            "ecsTaskDefinition",
            json!({
                "family": product_env,
                "cpu": args.app_cpu,
                "memory": args.app_memory,
                "networkMode": "awsvpc",
                "requiresCompatibilities": ["FARGATE"],
                "taskRoleArn": args.ecs_task_role,
                "executionRoleArn": args.ecs_execution_role,
                "containerDefinitions": container_definitions,
            }),
            child().depends_on(&log_group).depends_on(&secret),
        )?;

        let service = stack.declare(
            ECS_SERVICE,
            "ecsService",
            json!({
                "name": product_env,
                "cluster": cluster_arn,
                "taskDefinition": task_definition.arn(),
                "desiredCount": 1,
                "launchType": "FARGATE",
                "deploymentController": { "type": "ECS" },
                "networkConfiguration": {
                    "assignPublicIp": args.assign_public_ip,
                    "subnets": args.ecs_task_subnet_ids,
                    "securityGroups": args.ecs_task_security_group_ids,
                },
                "loadBalancers": [{
                    "targetGroupArn": target_group.arn(),
                    "containerName": APP_CONTAINER,
                    "containerPort": args.app_port,
                }],
            }),
            child()
                .depends_on(&https_listener)
                .depends_on(&task_definition)
                .depends_on(&target_group),
        )?;

        // Autoscaling
        let resource_id = format!("service/{}/{}", cluster_name, product_env);
        let scaling_target = stack.declare(
            APPAUTOSCALING_TARGET,
            "autoscaleTarget",
            json!({
                "maxCapacity": args.app_scale_max,
                "minCapacity": args.app_scale_min,
                "resourceId": resource_id,
                "scalableDimension": SCALABLE_DIMENSION,
                "serviceNamespace": "ecs",
            }),
            child().depends_on(&service),
        )?;
        stack.declare(
            APPAUTOSCALING_POLICY,
            "autoscalePolicy",
            json!({
                "name": "scale-inout",
                "policyType": "TargetTrackingScaling",
                "resourceId": resource_id,
                "scalableDimension": SCALABLE_DIMENSION,
                "serviceNamespace": "ecs",
                "targetTrackingScalingPolicyConfiguration": {
                    "predefinedMetricSpecification": {
                        "predefinedMetricType": "ECSServiceAverageCPUUtilization",
                    },
                    "scaleInCooldown": 30,
                    "scaleOutCooldown": 1,
                    "targetValue": args.app_scale_cpu_percent,
                },
            }),
            child().depends_on(&service).depends_on(&scaling_target),
        )?;

        // DNS
        let record = match (zone_id, args.host()) {
            (Some(zone_id), Some(host)) => Some(stack.declare(
                ROUTE53_RECORD,
                "record",
                json!({
                    "name": host,
                    "type": "A",
                    "zoneId": zone_id,
                    "aliases": [{
                        "name": lb.attr("dnsName"),
                        "zoneId": lb.attr("zoneId"),
                        "evaluateTargetHealth": true,
                    }],
                }),
                child().depends_on(&lb),
            )?),
            _ => None,
        };

        // Container registry
        let repository = stack.declare(
            ECR_REPOSITORY,
            "ecr",
            json!({ "name": product_env }),
            child(),
        )?;
        stack.declare(
            ECR_LIFECYCLE_POLICY,
            "ecrLifecycle",
            json!({
                "repository": repository.attr("name"),
                "policy": LifecyclePolicy::default().to_json()?,
            }),
            child().depends_on(&repository),
        )?;

        let dns = lb.attr("dnsName");
        stack.register_outputs(
            &component,
            BTreeMap::from([("dns".to_string(), dns.clone())]),
        )?;

        Ok(Self {
            component,
            load_balancer: lb,
            target_group,
            https_listener,
            task_definition,
            service,
            repository,
            record,
            cluster_name,
            service_name: product_env,
            dns,
        })
    }
}
