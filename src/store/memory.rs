// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-memory collaborator implementations
//!
//! Backed by plain collections behind `tokio::sync` locks. Failure switches
//! let tests exercise the fatal and recoverable error paths.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tokio::sync::Mutex;

use super::{
    ArtifactSink, AssetTrigger, CloudIntegration, ClusterIntegration, IntegrationStore, StackRecord,
    StackStore, StackUpdate,
};
use crate::errors::{MapperError, MapperResult};

/// Object indexed under a cluster integration (what the cluster search matches on)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedClusterObject {
    pub integration_id: String,
    pub uid: String,
    pub kind: String,
}

/// Integration store held in memory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InMemoryIntegrationStore {
    #[serde(default)]
    pub cloud: Vec<CloudIntegration>,
    #[serde(default)]
    pub clusters: Vec<ClusterIntegration>,
    #[serde(default)]
    pub cluster_objects: Vec<IndexedClusterObject>,
    #[serde(skip)]
    fail_listing: bool,
    #[serde(skip)]
    fail_cluster_search: bool,
}

impl InMemoryIntegrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cloud(mut self, id: &str, account_number: &str) -> Self {
        self.cloud.push(CloudIntegration {
            id: id.to_string(),
            account_number: account_number.to_string(),
        });
        self
    }

    pub fn with_cluster(mut self, id: &str, cluster_id: &str) -> Self {
        self.clusters.push(ClusterIntegration {
            id: id.to_string(),
            cluster_id: cluster_id.to_string(),
        });
        self
    }

    /// Index a cluster object under an integration
    pub fn with_cluster_object(mut self, integration_id: &str, uid: &str, kind: &str) -> Self {
        self.cluster_objects.push(IndexedClusterObject {
            integration_id: integration_id.to_string(),
            uid: uid.to_string(),
            kind: kind.to_string(),
        });
        self
    }

    /// Make both integration listings fail
    pub fn fail_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Make the cluster object search fail
    pub fn fail_cluster_search(mut self) -> Self {
        self.fail_cluster_search = true;
        self
    }
}

#[async_trait]
impl IntegrationStore for InMemoryIntegrationStore {
    async fn list_cloud_integrations(&self, account_id: &str) -> MapperResult<Vec<CloudIntegration>> {
        if self.fail_listing {
            return Err(MapperError::IntegrationLookup(format!(
                "cloud integrations unavailable for {}",
                account_id
            )));
        }
        Ok(self.cloud.clone())
    }

    async fn list_cluster_integrations(&self, account_id: &str) -> MapperResult<Vec<ClusterIntegration>> {
        if self.fail_listing {
            return Err(MapperError::IntegrationLookup(format!(
                "cluster integrations unavailable for {}",
                account_id
            )));
        }
        Ok(self.clusters.clone())
    }

    async fn find_cluster_integration_ids(
        &self,
        account_id: &str,
        uids: &[String],
        kinds: &[String],
    ) -> MapperResult<Vec<String>> {
        if self.fail_cluster_search {
            return Err(MapperError::IntegrationLookup(format!(
                "cluster search unavailable for {}",
                account_id
            )));
        }

        let ids: BTreeSet<String> = self
            .cluster_objects
            .iter()
            .filter(|object| uids.contains(&object.uid) && kinds.contains(&object.kind))
            .map(|object| object.integration_id.clone())
            .collect();
        Ok(ids.into_iter().collect())
    }

    async fn get_cluster_id(&self, integration_id: &str, account_id: &str) -> MapperResult<String> {
        self.clusters
            .iter()
            .find(|integration| integration.id == integration_id)
            .map(|integration| integration.cluster_id.clone())
            .ok_or_else(|| {
                MapperError::ClusterLookup(format!(
                    "cluster integration {} not found in {}",
                    integration_id, account_id
                ))
            })
    }
}

/// Stack store held in memory; records every applied update
#[derive(Debug, Default)]
pub struct InMemoryStackStore {
    stacks: Mutex<HashMap<(String, String), StackRecord>>,
    updates: Mutex<Vec<(String, String, StackUpdate)>>,
    fail_updates: bool,
}

impl InMemoryStackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stack(mut self, account_id: &str, record: StackRecord) -> Self {
        self.stacks
            .get_mut()
            .insert((account_id.to_string(), record.stack_id.clone()), record);
        self
    }

    /// Make every update fail
    pub fn fail_updates(mut self) -> Self {
        self.fail_updates = true;
        self
    }

    /// Current state of a stack
    pub async fn stack(&self, account_id: &str, stack_id: &str) -> Option<StackRecord> {
        self.stacks
            .lock()
            .await
            .get(&(account_id.to_string(), stack_id.to_string()))
            .cloned()
    }

    /// Every update applied so far, in order
    pub async fn applied_updates(&self) -> Vec<(String, String, StackUpdate)> {
        self.updates.lock().await.clone()
    }
}

#[async_trait]
impl StackStore for InMemoryStackStore {
    async fn get_stack(&self, account_id: &str, stack_id: &str) -> MapperResult<StackRecord> {
        self.stack(account_id, stack_id).await.ok_or_else(|| {
            MapperError::StackLookup(format!("stack {} not found in {}", stack_id, account_id))
        })
    }

    async fn update_stack(&self, account_id: &str, stack_id: &str, update: &StackUpdate) -> MapperResult<()> {
        if self.fail_updates {
            return Err(MapperError::StackUpdate(format!(
                "stack store rejected update of {}",
                stack_id
            )));
        }

        let mut stacks = self.stacks.lock().await;
        stacks
            .entry((account_id.to_string(), stack_id.to_string()))
            .or_insert_with(|| StackRecord::new(stack_id))
            .apply(update);
        self.updates.lock().await.push((
            account_id.to_string(),
            stack_id.to_string(),
            update.clone(),
        ));
        Ok(())
    }
}

/// Artifact sink keeping every payload in memory
#[derive(Debug, Default)]
pub struct InMemoryArtifactSink {
    written: Mutex<Vec<(String, String, Vec<u8>)>>,
}

impl InMemoryArtifactSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn written(&self) -> Vec<(String, String, Vec<u8>)> {
        self.written.lock().await.clone()
    }
}

#[async_trait]
impl ArtifactSink for InMemoryArtifactSink {
    async fn write_nodes(&self, account_id: &str, stack_id: &str, payload: &[u8]) -> MapperResult<()> {
        self.written
            .lock()
            .await
            .push((account_id.to_string(), stack_id.to_string(), payload.to_vec()));
        Ok(())
    }
}

/// Trigger that records its invocations
#[derive(Debug, Default)]
pub struct RecordingTrigger {
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl RecordingTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl AssetTrigger for RecordingTrigger {
    async fn trigger(&self, account_id: &str, asset_types: &[String]) -> MapperResult<()> {
        self.calls
            .lock()
            .await
            .push((account_id.to_string(), asset_types.to_vec()));
        Ok(())
    }
}
