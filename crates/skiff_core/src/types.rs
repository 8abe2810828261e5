//! Catalog of the AWS resource types the components declare.

use crate::resource::ResourceType;

pub const S3_BUCKET: ResourceType = ResourceType::new("aws:s3/bucket:Bucket", true);
pub const S3_BUCKET_POLICY: ResourceType =
    ResourceType::new("aws:s3/bucketPolicy:BucketPolicy", false);

pub const CLOUDFRONT_ORIGIN_ACCESS_IDENTITY: ResourceType =
    ResourceType::new("aws:cloudfront/originAccessIdentity:OriginAccessIdentity", false);
pub const CLOUDFRONT_DISTRIBUTION: ResourceType =
    ResourceType::new("aws:cloudfront/distribution:Distribution", true);

pub const ROUTE53_RECORD: ResourceType = ResourceType::new("aws:route53/record:Record", false);

pub const LB_LOAD_BALANCER: ResourceType =
    ResourceType::new("aws:lb/loadBalancer:LoadBalancer", true);
pub const LB_TARGET_GROUP: ResourceType = ResourceType::new("aws:lb/targetGroup:TargetGroup", true);
pub const LB_LISTENER: ResourceType = ResourceType::new("aws:lb/listener:Listener", false);

pub const CLOUDWATCH_LOG_GROUP: ResourceType =
    ResourceType::new("aws:cloudwatch/logGroup:LogGroup", true);

pub const SECRETSMANAGER_SECRET: ResourceType =
    ResourceType::new("aws:secretsmanager/secret:Secret", true);
pub const SECRETSMANAGER_SECRET_VERSION: ResourceType =
    ResourceType::new("aws:secretsmanager/secretVersion:SecretVersion", false);

pub const ECS_CLUSTER: ResourceType = ResourceType::new("aws:ecs/cluster:Cluster", true);
pub const ECS_TASK_DEFINITION: ResourceType =
    ResourceType::new("aws:ecs/taskDefinition:TaskDefinition", true);
pub const ECS_SERVICE: ResourceType = ResourceType::new("aws:ecs/service:Service", true);

pub const APPAUTOSCALING_TARGET: ResourceType =
    ResourceType::new("aws:appautoscaling/target:Target", false);
pub const APPAUTOSCALING_POLICY: ResourceType =
    ResourceType::new("aws:appautoscaling/policy:Policy", false);

pub const ECR_REPOSITORY: ResourceType = ResourceType::new("aws:ecr/repository:Repository", true);
pub const ECR_LIFECYCLE_POLICY: ResourceType =
    ResourceType::new("aws:ecr/lifecyclePolicy:LifecyclePolicy", false);

pub const CODEBUILD_PROJECT: ResourceType = ResourceType::new("aws:codebuild/project:Project", true);
pub const CODEPIPELINE_PIPELINE: ResourceType =
    ResourceType::new("aws:codepipeline/pipeline:Pipeline", true);
