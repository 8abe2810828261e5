//! Static website: S3 bucket behind a CloudFront distribution.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use tracing::info;

use skiff_core::types::{
    CLOUDFRONT_DISTRIBUTION, CLOUDFRONT_ORIGIN_ACCESS_IDENTITY, ROUTE53_RECORD, S3_BUCKET,
    S3_BUCKET_POLICY,
};
use skiff_core::{LookupRequest, Output, ResourceHandle, ResourceOptions, ResourceType, Stack};

use crate::args::StaticWebsiteArgs;
use crate::error::ComponentResult;

pub const STATIC_WEBSITE: ResourceType = ResourceType::component("skiff:web:StaticWebsite");

pub const DEFAULT_ROOT_OBJECT: &str = "index.html";
const MIN_TTL: u64 = 0;
const DEFAULT_TTL: u64 = 86_400;
const MAX_TTL: u64 = 31_536_000;

/// Handles and outputs of a declared static website.
#[derive(Debug, Clone)]
pub struct StaticWebsite {
    pub component: ResourceHandle,
    pub bucket: ResourceHandle,
    pub origin_access_identity: ResourceHandle,
    pub distribution: ResourceHandle,
    pub bucket_policy: ResourceHandle,
    /// Alias record, only declared with a certificate.
    pub record: Option<ResourceHandle>,
    pub bucket_name: Output,
    pub distribution_id: Output,
}

impl StaticWebsite {
    pub fn build(stack: &mut Stack<'_>, args: &StaticWebsiteArgs) -> ComponentResult<Self> {
        args.validate()?;
        let service_env = args.service_env();
        let origin_id = format!("S3-{}", service_env);
        info!("Building static website {} for {}", service_env, args.host);

        let zone_id = match args.certificate() {
            Some(_) => {
                let zone = stack.lookup(&LookupRequest::zone(&args.domain))?;
                Some(zone.require("zoneId")?.to_string())
            }
            None => None,
        };

        let component = stack.component(STATIC_WEBSITE, &service_env, ResourceOptions::new())?;

        let bucket = stack.declare(
            S3_BUCKET,
            "bucket",
            json!({
                "bucket": args.host,
                "acl": "private",
                "versioning": { "enabled": true },
                "website": { "redirectAllRequestsTo": format!("https://{}", args.host) },
            }),
            ResourceOptions::new().parent(&component),
        )?;

        let oai = stack.declare(
            CLOUDFRONT_ORIGIN_ACCESS_IDENTITY,
            "originAccessIdentity",
            json!({ "comment": args.host }),
            ResourceOptions::new().parent(&component),
        )?;

        let mut distribution_props = json!({
            "origins": [{
                "domainName": bucket.attr("bucketRegionalDomainName"),
                "originId": origin_id,
                "s3OriginConfig": {
                    "originAccessIdentity": oai.attr("cloudfrontAccessIdentityPath"),
                },
            }],
            "restrictions": { "geoRestriction": { "restrictionType": "none" } },
            "enabled": true,
            "isIpv6Enabled": true,
            "comment": args.host,
            "defaultRootObject": DEFAULT_ROOT_OBJECT,
            "defaultCacheBehavior": {
                "allowedMethods": ["GET", "HEAD"],
                "cachedMethods": ["GET", "HEAD"],
                "minTtl": MIN_TTL,
                "defaultTtl": DEFAULT_TTL,
                "maxTtl": MAX_TTL,
                "targetOriginId": origin_id,
                "viewerProtocolPolicy": "redirect-to-https",
                "forwardedValues": {
                    "queryString": false,
                    "cookies": { "forward": "none" },
                },
            },
            "viewerCertificate": viewer_certificate(args.certificate()),
        });
        if args.certificate().is_some() {
            distribution_props["aliases"] = json!([args.host]);
        }
        let distribution = stack.declare(
            CLOUDFRONT_DISTRIBUTION,
            "distribution",
            distribution_props,
            ResourceOptions::new()
                .parent(&component)
                .depends_on(&bucket)
                .depends_on(&oai)
                .ignore_changes(["tags"]),
        )?;

        let record = match zone_id {
            Some(zone_id) => Some(stack.declare(
                ROUTE53_RECORD,
                "record",
                json!({
                    "name": args.host,
                    "type": "A",
                    "zoneId": zone_id,
                    "aliases": [{
                        "name": distribution.attr("domainName"),
                        "zoneId": distribution.attr("hostedZoneId"),
                        "evaluateTargetHealth": true,
                    }],
                }),
                ResourceOptions::new()
                    .parent(&component)
                    .depends_on(&distribution),
            )?),
            None => None,
        };

        let policy = read_access_policy(&bucket, &oai);
        let bucket_policy = stack.declare(
            S3_BUCKET_POLICY,
            "bucketPolicy",
            json!({
                "bucket": bucket.attr("bucket"),
                "policy": policy.to_string(),
            }),
            ResourceOptions::new()
                .parent(&component)
                .depends_on(&bucket)
                .depends_on(&oai),
        )?;

        let bucket_name = bucket.attr("bucket");
        let distribution_id = distribution.id();
        let outputs = BTreeMap::from([
            ("bucketName".to_string(), bucket_name.clone()),
            ("distributionId".to_string(), distribution_id.clone()),
        ]);
        stack.register_outputs(&component, outputs)?;

        Ok(Self {
            component,
            bucket,
            origin_access_identity: oai,
            distribution,
            bucket_policy,
            record,
            bucket_name,
            distribution_id,
        })
    }
}

fn viewer_certificate(certificate_arn: Option<&str>) -> Value {
    match certificate_arn {
        Some(arn) => json!({
            "acmCertificateArn": arn,
            "sslSupportMethod": "sni-only",
        }),
        None => json!({ "cloudfrontDefaultCertificate": true }),
    }
}

/// Bucket policy letting the origin access identity read every object.
fn read_access_policy(bucket: &ResourceHandle, oai: &ResourceHandle) -> Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Sid": "2",
            "Effect": "Allow",
            "Action": ["s3:GetObject"],
            "Resource": [bucket.arn().interpolate("{}/*")],
            "Principal": { "AWS": [oai.attr("iamArn")] },
        }],
    })
}
