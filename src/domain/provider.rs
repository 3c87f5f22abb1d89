// Copyright (c) 2025 - Cowboy AI, Inc.
//! Provider Classification
//!
//! Resolves a provider-qualified resource type (`aws:s3/bucket:Bucket`,
//! `kubernetes:apps/v1:Deployment`) into a [`ProviderFamily`] and, where a
//! translation entry exists, into the equivalent Terraform type name that the
//! rest of the asset inventory is keyed on.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Provider family of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderFamily {
    /// Cloud platform resources (AWS)
    #[serde(rename = "aws")]
    Aws,
    /// Cluster orchestrator resources (Kubernetes)
    #[serde(rename = "k8s")]
    Kubernetes,
    /// Anything else; never mapped
    Unknown,
}

impl ProviderFamily {
    /// Canonical short name, also used as the stack integration key
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::Kubernetes => "k8s",
            Self::Unknown => "unknown",
        }
    }

    /// Resource type prefix that selects this family
    pub fn type_prefix(&self) -> Option<&'static str> {
        match self {
            Self::Aws => Some("aws:"),
            Self::Kubernetes => Some("kubernetes:"),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for ProviderFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pulumi AWS type → Terraform type
const AWS_TYPE_TABLE: &[(&str, &str)] = &[
    ("aws:apigateway/restApi:RestApi", "aws_api_gateway_rest_api"),
    ("aws:cloudfront/distribution:Distribution", "aws_cloudfront_distribution"),
    ("aws:cloudwatch/logGroup:LogGroup", "aws_cloudwatch_log_group"),
    ("aws:dynamodb/table:Table", "aws_dynamodb_table"),
    ("aws:ebs/volume:Volume", "aws_ebs_volume"),
    ("aws:ec2/eip:Eip", "aws_eip"),
    ("aws:ec2/instance:Instance", "aws_instance"),
    ("aws:ec2/internetGateway:InternetGateway", "aws_internet_gateway"),
    ("aws:ec2/natGateway:NatGateway", "aws_nat_gateway"),
    ("aws:ec2/routeTable:RouteTable", "aws_route_table"),
    ("aws:ec2/securityGroup:SecurityGroup", "aws_security_group"),
    ("aws:ec2/subnet:Subnet", "aws_subnet"),
    ("aws:ec2/vpc:Vpc", "aws_vpc"),
    ("aws:ecr/repository:Repository", "aws_ecr_repository"),
    ("aws:ecs/cluster:Cluster", "aws_ecs_cluster"),
    ("aws:eks/cluster:Cluster", "aws_eks_cluster"),
    ("aws:elasticache/cluster:Cluster", "aws_elasticache_cluster"),
    ("aws:iam/policy:Policy", "aws_iam_policy"),
    ("aws:iam/role:Role", "aws_iam_role"),
    ("aws:iam/user:User", "aws_iam_user"),
    ("aws:kms/key:Key", "aws_kms_key"),
    ("aws:lambda/function:Function", "aws_lambda_function"),
    ("aws:lb/loadBalancer:LoadBalancer", "aws_lb"),
    ("aws:rds/instance:Instance", "aws_db_instance"),
    ("aws:route53/zone:Zone", "aws_route53_zone"),
    ("aws:s3/bucket:Bucket", "aws_s3_bucket"),
    ("aws:s3/bucketV2:BucketV2", "aws_s3_bucket"),
    ("aws:secretsmanager/secret:Secret", "aws_secretsmanager_secret"),
    ("aws:sns/topic:Topic", "aws_sns_topic"),
    ("aws:sqs/queue:Queue", "aws_sqs_queue"),
    ("aws:ssm/parameter:Parameter", "aws_ssm_parameter"),
];

/// Classifies resource types and translates them to Terraform type names
#[derive(Debug, Clone)]
pub struct ProviderClassifier {
    type_table: HashMap<String, String>,
}

impl ProviderClassifier {
    /// Classifier seeded with the built-in AWS translation table
    pub fn new() -> Self {
        Self {
            type_table: AWS_TYPE_TABLE
                .iter()
                .map(|(pulumi, terraform)| (pulumi.to_string(), terraform.to_string()))
                .collect(),
        }
    }

    /// Add or override a translation entry
    pub fn with_type_mapping(
        mut self,
        pulumi_type: impl Into<String>,
        terraform_type: impl Into<String>,
    ) -> Self {
        self.type_table
            .insert(pulumi_type.into(), terraform_type.into());
        self
    }

    /// Resolve the provider family of a resource type
    pub fn family(&self, resource_type: &str) -> ProviderFamily {
        [ProviderFamily::Aws, ProviderFamily::Kubernetes]
            .into_iter()
            .find(|family| {
                family
                    .type_prefix()
                    .is_some_and(|prefix| resource_type.starts_with(prefix))
            })
            .unwrap_or(ProviderFamily::Unknown)
    }

    /// Terraform type for a cloud resource type, if a translation exists
    pub fn cloud_object_type(&self, resource_type: &str) -> Option<&str> {
        self.type_table.get(resource_type).map(String::as_str)
    }

    /// Terraform-style type for a cluster object kind (`ConfigMap` → `kubernetes_config_map`)
    pub fn cluster_object_type(&self, kind: &str) -> String {
        format!("kubernetes_{}", snake_case(kind))
    }
}

impl Default for ProviderClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn snake_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    let chars: Vec<char> = input.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let prev_upper = i > 0 && chars[i - 1].is_uppercase();
            if i > 0 && (prev_lower || (prev_upper && next_lower)) {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(*c);
        }
    }
    out
}
