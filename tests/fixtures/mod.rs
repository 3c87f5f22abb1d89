// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-iac-assets
//!
//! Provides deterministic engine events, run contexts and collaborator stores.
//!
//! # Design Principles
//! - All test data is deterministic (no `Uuid::now_v7()` or `Utc::now()` in contexts)
//! - Events are built here; tests compose them
//! - Collaborators are the in-memory implementations from `store::memory`

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use cim_iac_assets::domain::value::property_map;
use cim_iac_assets::store::{InMemoryIntegrationStore, InMemoryStackStore, StackRecord};
use cim_iac_assets::{ChangeEvent, MappingPipeline, ObservedState, RunContext, StepMetadata, StepOp};

pub const ACCOUNT_ID: &str = "acc-0001";
pub const STACK_ID: &str = "stack-0001";
pub const IAC_INTEGRATION_ID: &str = "pulumi-int-0001";

pub const AWS_ACCOUNT_A: &str = "111111111111";
pub const AWS_ACCOUNT_B: &str = "222222222222";
pub const AWS_INTEGRATION_A: &str = "aws-int-a";
pub const AWS_INTEGRATION_B: &str = "aws-int-b";

pub const CLUSTER_ID: &str = "cluster-prod";
pub const CLUSTER_INTEGRATION: &str = "k8s-int-prod";

pub const CORRELATION_ID_1: &str = "01934f4a-c001-7000-8000-00000000c001";

// Fixed test timestamp (2026-01-19T12:00:00Z)
pub const FIXED_TIMESTAMP: &str = "2026-01-19T12:00:00Z";
pub const FIXED_UNIX_SECONDS: i64 = 1_768_824_000;

/// Parse the fixed timestamp
pub fn fixed_timestamp() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(FIXED_TIMESTAMP)
        .expect("Invalid timestamp in test fixture")
        .with_timezone(&Utc)
}

/// Run context with fixed identifiers and start time
pub fn run_context() -> RunContext {
    RunContext::new(ACCOUNT_ID, STACK_ID)
        .with_iac_integration(IAC_INTEGRATION_ID)
        .with_stack_names("dev", "web", "acme")
        .with_started_at(fixed_timestamp())
        .with_correlation_id(Uuid::parse_str(CORRELATION_ID_1).expect("Invalid UUID in test fixture"))
}

/// Observed state with outputs only
pub fn outputs(value: Value) -> ObservedState {
    ObservedState::from_outputs(property_map(value))
}

/// Observed state with inputs and outputs
pub fn state(inputs: Value, outputs: Value) -> ObservedState {
    ObservedState::from_outputs(property_map(outputs)).with_inputs(property_map(inputs))
}

/// `same` step of an S3 bucket in `account`
pub fn bucket_same(name: &str, account: &str) -> ChangeEvent {
    ChangeEvent::pre_step(
        StepMetadata::new("aws:s3/bucket:Bucket", StepOp::Same)
            .with_urn(format!("urn:pulumi:dev::web::aws:s3/bucket:Bucket::{}", name))
            .with_new(outputs(json!({
                "arn": format!("arn:aws:s3:us-east-1:{}:{}", account, name),
                "bucket": name,
            }))),
    )
}

/// `same` step of a queue in `account`
pub fn queue_same(name: &str, account: &str) -> ChangeEvent {
    ChangeEvent::outputs_recorded(
        StepMetadata::new("aws:sqs/queue:Queue", StepOp::Same)
            .with_urn(format!("urn:pulumi:dev::web::aws:sqs/queue:Queue::{}", name))
            .with_new(outputs(json!({
                "arn": format!("arn:aws:sqs:eu-west-1:{}:{}", account, name),
                "name": name,
            }))),
    )
}

/// `update` step of a volume whose size moved from `old_size` to `new_size`
pub fn volume_update(old_size: i64, new_size: i64) -> ChangeEvent {
    let arn = "arn:aws:ec2:us-east-1:111111111111:volume/vol-1";
    ChangeEvent::pre_step(
        StepMetadata::new("aws:ebs/volume:Volume", StepOp::Update)
            .with_urn("urn:pulumi:dev::web::aws:ebs/volume:Volume::data")
            .with_old(state(
                json!({ "size": old_size }),
                json!({ "arn": arn, "size": old_size, "tagsAll": { "v": "1" } }),
            ))
            .with_new(outputs(json!({ "arn": arn, "size": new_size, "tagsAll": { "v": "2" } }))),
    )
}

/// Cluster object step with the given identity
pub fn cluster_object(kind: &str, name: &str, uid: &str, namespace: Option<&str>) -> ChangeEvent {
    let mut metadata = json!({ "name": name, "uid": uid, "resourceVersion": "42" });
    if let Some(namespace) = namespace {
        metadata["namespace"] = json!(namespace);
    }

    ChangeEvent::outputs_recorded(
        StepMetadata::new(format!("kubernetes:core/v1:{}", kind), StepOp::Same)
            .with_urn(format!("urn:pulumi:dev::web::kubernetes:core/v1:{}::{}", kind, name))
            .with_new(outputs(json!({
                "apiVersion": "v1",
                "kind": kind,
                "metadata": metadata,
                "status": { "phase": "Active" },
            }))),
    )
}

/// Integration store knowing both AWS accounts and the production cluster
pub fn integration_store() -> InMemoryIntegrationStore {
    InMemoryIntegrationStore::new()
        .with_cloud(AWS_INTEGRATION_A, AWS_ACCOUNT_A)
        .with_cloud(AWS_INTEGRATION_B, AWS_ACCOUNT_B)
        .with_cluster(CLUSTER_INTEGRATION, CLUSTER_ID)
}

/// Stack store holding an unbound stack record
pub fn stack_store() -> InMemoryStackStore {
    InMemoryStackStore::new().with_stack(ACCOUNT_ID, StackRecord::new(STACK_ID))
}

/// Pipeline over the given stores
pub fn pipeline(
    integrations: InMemoryIntegrationStore,
    stacks: Arc<InMemoryStackStore>,
) -> MappingPipeline {
    MappingPipeline::new(Arc::new(integrations), stacks)
}
