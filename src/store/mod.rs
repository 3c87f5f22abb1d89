// Copyright (c) 2025 - Cowboy AI, Inc.
//! Collaborator Interfaces
//!
//! The mapping core never talks to databases, object storage or compute
//! triggers directly. It reads and writes through these traits; concrete
//! implementations live with the caller. [`memory`] provides in-process
//! implementations for tests and local runs.
//!
//! ```text
//! MappingPipeline ──> IntegrationStore   (integrations, cluster search)
//!        │       ──> StackStore         (stack record, field updates)
//! RefreshService ──> ArtifactSink       (JSON-lines nodes)
//!                ──> AssetTrigger       (asset types for downstream processing)
//! ```

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::ProviderFamily;
use crate::errors::MapperResult;

pub use memory::{InMemoryArtifactSink, InMemoryIntegrationStore, InMemoryStackStore, RecordingTrigger};

/// Cloud account integration of a tenant account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudIntegration {
    pub id: String,
    /// Provider account number the integration reads
    pub account_number: String,
}

/// Cluster integration of a tenant account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterIntegration {
    pub id: String,
    pub cluster_id: String,
}

/// Integration a stack is currently bound to, per provider family
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationBinding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, rename = "id", skip_serializing_if = "Option::is_none")]
    pub integration_id: Option<String>,
}

/// Stack record as read from the stack store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackRecord {
    pub stack_id: String,
    /// Keyed by provider family short name (`aws`, `k8s`)
    #[serde(default)]
    pub integrations: BTreeMap<String, IntegrationBinding>,
    /// Every other field set through updates
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

impl StackRecord {
    pub fn new(stack_id: impl Into<String>) -> Self {
        Self {
            stack_id: stack_id.into(),
            ..Default::default()
        }
    }

    pub fn with_binding(mut self, family: ProviderFamily, binding: IntegrationBinding) -> Self {
        self.integrations.insert(family.as_str().to_string(), binding);
        self
    }

    pub fn binding(&self, family: ProviderFamily) -> Option<&IntegrationBinding> {
        self.integrations.get(family.as_str())
    }

    /// Apply a field-level update the way the stack store would
    pub fn apply(&mut self, update: &StackUpdate) {
        for (path, value) in update.fields() {
            let mut segments = path.splitn(3, '.');
            match (segments.next(), segments.next(), segments.next()) {
                (Some("integrations"), Some(family), Some(field)) => {
                    let binding = self.integrations.entry(family.to_string()).or_default();
                    let text = value.as_str().map(str::to_string);
                    match field {
                        "externalId" => binding.external_id = text,
                        "id" => binding.integration_id = text,
                        _ => {
                            self.fields.insert(path.clone(), value.clone());
                        }
                    }
                }
                _ => {
                    self.fields.insert(path.clone(), value.clone());
                }
            }
        }
    }
}

/// Field-level update of a stack record (`path → value`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackUpdate {
    fields: BTreeMap<String, Value>,
}

impl StackUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, path: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(path.into(), value.into());
    }

    pub fn with(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(path, value);
        self
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.fields.get(path)
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Merge another update into this one; later values win
    pub fn merge(&mut self, other: StackUpdate) {
        self.fields.extend(other.fields);
    }
}

/// Integration lookups needed by one run
#[async_trait]
pub trait IntegrationStore: Send + Sync {
    /// Cloud integrations of the tenant account
    async fn list_cloud_integrations(&self, account_id: &str) -> MapperResult<Vec<CloudIntegration>>;

    /// Cluster integrations of the tenant account
    async fn list_cluster_integrations(&self, account_id: &str) -> MapperResult<Vec<ClusterIntegration>>;

    /// Cluster integrations whose indexed objects match the given UIDs and kinds
    async fn find_cluster_integration_ids(
        &self,
        account_id: &str,
        uids: &[String],
        kinds: &[String],
    ) -> MapperResult<Vec<String>>;

    /// Cluster id of a cluster integration
    async fn get_cluster_id(&self, integration_id: &str, account_id: &str) -> MapperResult<String>;
}

/// Stack record persistence
#[async_trait]
pub trait StackStore: Send + Sync {
    async fn get_stack(&self, account_id: &str, stack_id: &str) -> MapperResult<StackRecord>;

    async fn update_stack(&self, account_id: &str, stack_id: &str, update: &StackUpdate) -> MapperResult<()>;
}

/// Destination of the normalized node set
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Store the JSON-lines node payload of one stack
    async fn write_nodes(&self, account_id: &str, stack_id: &str, payload: &[u8]) -> MapperResult<()>;
}

/// Downstream processing trigger
#[async_trait]
pub trait AssetTrigger: Send + Sync {
    async fn trigger(&self, account_id: &str, asset_types: &[String]) -> MapperResult<()>;
}
