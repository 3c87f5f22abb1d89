//! NATS transport for refresh runs
//!
//! - [`NatsEventSource`] feeds a run's engine events into the collector
//! - [`NatsPublisher`] delivers node artifacts and downstream triggers

use async_nats::{Client, ConnectOptions, Subscriber};
use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::collector::{EventSink, EventSource};
use crate::errors::{MapperError, MapperResult};
use crate::events::{ChangeEvent, EventKind};
use crate::store::{ArtifactSink, AssetTrigger};
use crate::subjects::{RefreshSubjects, DEFAULT_SUBJECT_ROOT};

/// Configuration for NATS connection
#[derive(Debug, Clone)]
pub struct NatsConfig {
    /// NATS server URLs
    pub servers: Vec<String>,
    /// Client name
    pub name: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub request_timeout: Duration,
    /// Root namespace of every subject
    pub subject_root: String,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            servers: vec!["nats://localhost:4222".to_string()],
            name: "iac-asset-mapper".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(5),
            subject_root: DEFAULT_SUBJECT_ROOT.to_string(),
        }
    }
}

/// NATS client wrapper
#[derive(Clone)]
pub struct NatsClient {
    client: Client,
    subjects: RefreshSubjects,
}

impl NatsClient {
    /// Create a new NATS client with the given configuration
    pub async fn new(config: NatsConfig) -> MapperResult<Self> {
        let connect_options = ConnectOptions::new()
            .name(&config.name)
            .connection_timeout(config.connect_timeout)
            .request_timeout(Some(config.request_timeout));

        let client = async_nats::connect_with_options(config.servers.join(","), connect_options)
            .await
            .map_err(|e| MapperError::NatsConnection(e.to_string()))?;

        info!(servers = ?config.servers, "connected to NATS");

        Ok(Self {
            client,
            subjects: RefreshSubjects::new(config.subject_root),
        })
    }

    pub fn subjects(&self) -> &RefreshSubjects {
        &self.subjects
    }

    /// Publish a JSON message to a subject
    pub async fn publish<T>(&self, subject: &str, message: &T) -> MapperResult<()>
    where
        T: Serialize,
    {
        let payload = serde_json::to_vec(message)?;
        self.publish_bytes(subject, payload).await
    }

    /// Publish a raw payload to a subject
    pub async fn publish_bytes(&self, subject: &str, payload: Vec<u8>) -> MapperResult<()> {
        self.client
            .publish(subject.to_string(), payload.into())
            .await
            .map_err(|e| MapperError::NatsPublish(e.to_string()))?;

        debug!(subject, "published message");
        Ok(())
    }

    /// Subscribe to a subject
    pub async fn subscribe(&self, subject: &str) -> MapperResult<Subscriber> {
        let subscriber = self
            .client
            .subscribe(subject.to_string())
            .await
            .map_err(|e| MapperError::NatsSubscribe(e.to_string()))?;

        info!(subject, "subscribed");
        Ok(subscriber)
    }

    /// Get the underlying NATS client for advanced operations
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

/// Event source reading one run's engine events from NATS.
///
/// Ends after the `summary` event, when the subscription closes, or when no
/// message arrives within the idle timeout.
pub struct NatsEventSource {
    client: NatsClient,
    subject: String,
    idle_timeout: Option<Duration>,
}

impl NatsEventSource {
    /// Source for the events subject of `(account_id, stack_id)`
    pub fn new(client: NatsClient, account_id: &str, stack_id: &str) -> Self {
        let subject = client.subjects().events(account_id, stack_id);
        Self {
            client,
            subject,
            idle_timeout: None,
        }
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    async fn next_message(&self, subscriber: &mut Subscriber) -> MapperResult<Option<async_nats::Message>> {
        match self.idle_timeout {
            Some(timeout) => tokio::time::timeout(timeout, subscriber.next())
                .await
                .map_err(|_| {
                    MapperError::EventSource(format!(
                        "no event on {} within {:?}",
                        self.subject, timeout
                    ))
                }),
            None => Ok(subscriber.next().await),
        }
    }
}

#[async_trait]
impl EventSource for NatsEventSource {
    async fn run(self: Box<Self>, sink: EventSink) -> MapperResult<()> {
        let mut subscriber = self.client.subscribe(&self.subject).await?;

        while let Some(message) = self.next_message(&mut subscriber).await? {
            let event: ChangeEvent = match serde_json::from_slice(&message.payload) {
                Ok(event) => event,
                Err(e) => {
                    warn!(subject = %self.subject, error = %e, "dropping undecodable event");
                    continue;
                }
            };

            let is_summary = event.kind == EventKind::Summary;
            sink.send(event).await?;
            if is_summary {
                debug!(subject = %self.subject, "summary received");
                break;
            }
        }

        if let Err(e) = subscriber.unsubscribe().await {
            warn!(subject = %self.subject, error = %e, "unsubscribe failed");
        }
        Ok(())
    }
}

/// Payload of a downstream trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerMessage {
    pub account_id: String,
    pub asset_types: Vec<String>,
}

/// Publishes artifacts and triggers over NATS
#[derive(Clone)]
pub struct NatsPublisher {
    client: NatsClient,
}

impl NatsPublisher {
    pub fn new(client: NatsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArtifactSink for NatsPublisher {
    async fn write_nodes(&self, account_id: &str, stack_id: &str, payload: &[u8]) -> MapperResult<()> {
        let subject = self.client.subjects().artifacts(account_id, stack_id);
        self.client
            .publish_bytes(&subject, payload.to_vec())
            .await
            .map_err(|e| MapperError::Artifact(e.to_string()))
    }
}

#[async_trait]
impl AssetTrigger for NatsPublisher {
    async fn trigger(&self, account_id: &str, asset_types: &[String]) -> MapperResult<()> {
        let subject = self.client.subjects().triggers(account_id);
        let message = TriggerMessage {
            account_id: account_id.to_string(),
            asset_types: asset_types.to_vec(),
        };
        self.client
            .publish(&subject, &message)
            .await
            .map_err(|e| MapperError::Trigger(e.to_string()))
    }
}
