//! Tests for the NATS transport aligned with user stories

mod fixtures;

use fixtures::*;
use futures::StreamExt;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

use cim_iac_assets::nats::TriggerMessage;
use cim_iac_assets::store::{ArtifactSink, AssetTrigger};
use cim_iac_assets::subjects::{Channel, RefreshSubjects, SubjectBuilder};
use cim_iac_assets::{
    ChangeEvent, MapperConfig, NatsClient, NatsConfig, NatsEventSource, NatsPublisher,
    RefreshReport, RefreshService,
};

/// User Story: Event transport
///
/// As the refresh worker
/// I want a run's engine events delivered on a per-stack subject
/// So that runs of different stacks never mix
///
/// Acceptance Criteria:
/// - Events, artifacts and triggers live under one configurable root
/// - Events and artifacts are addressed per account and stack
/// - Triggers are addressed per account
#[test]
fn test_subject_layout() {
    // Given the default subject root
    let subjects = RefreshSubjects::default();

    // Then every channel is addressed as documented
    assert_eq!(subjects.events(ACCOUNT_ID, STACK_ID), "iac.events.acc-0001.stack-0001");
    assert_eq!(subjects.artifacts(ACCOUNT_ID, STACK_ID), "iac.artifacts.acc-0001.stack-0001");
    assert_eq!(subjects.triggers(ACCOUNT_ID), "iac.triggers.acc-0001");
    assert_eq!(subjects.all_events(ACCOUNT_ID), "iac.events.acc-0001.>");
}

#[test]
fn test_custom_subject_root() {
    let subjects = RefreshSubjects::new("tenant-a.iac");
    assert_eq!(subjects.root(), "tenant-a.iac");
    assert_eq!(subjects.triggers("acc"), "tenant-a.iac.triggers.acc");
    assert_eq!(
        SubjectBuilder::new("tenant-a.iac", Channel::Artifacts)
            .account("acc")
            .stack("s")
            .build(),
        "tenant-a.iac.artifacts.acc.s"
    );
}

#[test]
fn test_nats_config_default() {
    // Given default configuration
    let config = NatsConfig::default();

    // Then defaults are properly set
    assert_eq!(config.servers, vec!["nats://localhost:4222"]);
    assert_eq!(config.name, "iac-asset-mapper");
    assert_eq!(config.connect_timeout, Duration::from_secs(10));
    assert_eq!(config.request_timeout, Duration::from_secs(5));
    assert_eq!(config.subject_root, "iac");
}

#[test]
fn test_mapper_config_carries_nats_settings() {
    let config = MapperConfig::from_lookup(|key: &str| match key {
        "NATS_URL" => Some("nats://a:4222,nats://b:4222".to_string()),
        "NATS_SUBJECT_ROOT" => Some("tenant".to_string()),
        _ => None,
    })
    .unwrap();

    assert_eq!(config.nats.servers, vec!["nats://a:4222", "nats://b:4222"]);
    assert_eq!(config.nats.subject_root, "tenant");
}

#[test]
fn test_trigger_message_roundtrip() {
    let message: TriggerMessage = serde_json::from_str(
        r#"{"accountId":"acc-0001","assetTypes":["aws_s3_bucket","kubernetes_service"]}"#,
    )
    .unwrap();
    assert_eq!(message.account_id, ACCOUNT_ID);
    assert_eq!(message.asset_types.len(), 2);
}

#[tokio::test]
async fn test_connection_failure_is_reported() {
    // Given a server that does not exist
    let config = NatsConfig {
        servers: vec!["nats://127.0.0.1:1".to_string()],
        connect_timeout: Duration::from_millis(200),
        ..NatsConfig::default()
    };

    // Then connecting fails with a connection error
    let result = NatsClient::new(config).await;
    assert!(matches!(result, Err(cim_iac_assets::MapperError::NatsConnection(_))));
}

// ============================================================================
// Live server tests
// ============================================================================

#[tokio::test]
#[ignore = "requires NATS server"]
async fn test_publisher_delivers_artifact_and_trigger() {
    // Given a connected client listening on the output subjects
    let client = NatsClient::new(NatsConfig::default()).await.unwrap();
    let subjects = client.subjects().clone();
    let mut artifacts = client
        .subscribe(&subjects.artifacts(ACCOUNT_ID, STACK_ID))
        .await
        .unwrap();
    let mut triggers = client.subscribe(&subjects.triggers(ACCOUNT_ID)).await.unwrap();
    let publisher = NatsPublisher::new(client);

    // When an artifact and a trigger are published
    publisher
        .write_nodes(ACCOUNT_ID, STACK_ID, b"{\"arn\":\"a\"}\n")
        .await
        .unwrap();
    publisher
        .trigger(ACCOUNT_ID, &["aws_s3_bucket".to_string()])
        .await
        .unwrap();

    // Then both arrive on their subjects
    let artifact = tokio::time::timeout(Duration::from_secs(2), artifacts.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(artifact.payload.as_ref(), b"{\"arn\":\"a\"}\n");

    let trigger = tokio::time::timeout(Duration::from_secs(2), triggers.next())
        .await
        .unwrap()
        .unwrap();
    let message: TriggerMessage = serde_json::from_slice(&trigger.payload).unwrap();
    assert_eq!(message.asset_types, vec!["aws_s3_bucket".to_string()]);
}

#[tokio::test]
#[ignore = "requires NATS server"]
async fn test_refresh_over_nats() {
    // Given a refresh service reading the stack's event subject
    let client = NatsClient::new(NatsConfig::default()).await.unwrap();
    let stacks = Arc::new(stack_store());
    let publisher = Arc::new(NatsPublisher::new(client.clone()));
    let service = RefreshService::new(
        pipeline(integration_store(), stacks.clone()),
        stacks,
        publisher.clone(),
        publisher,
    );
    let source = NatsEventSource::new(client.clone(), ACCOUNT_ID, STACK_ID)
        .with_idle_timeout(Duration::from_secs(5));
    let subject = source.subject().to_string();

    let run = tokio::spawn(async move { service.refresh(source, &run_context()).await });

    // When the engine publishes its events
    tokio::time::sleep(Duration::from_millis(200)).await;
    for event in [
        bucket_same("assets", AWS_ACCOUNT_A),
        queue_same("jobs", AWS_ACCOUNT_A),
        ChangeEvent::summary(),
    ] {
        client.publish(&subject, &event).await.unwrap();
    }

    // Then the run maps both resources
    let report = run.await.unwrap().unwrap();
    let RefreshReport::Mapped(outcome) = report else {
        panic!("expected a mapped report");
    };
    assert_eq!(outcome.nodes.len(), 2);
}
