// Copyright (c) 2025 - Cowboy AI, Inc.
//! Mapping Pipeline
//!
//! Top-level coordinator of one run:
//!
//! ```text
//! run context reads (fatal) ──> NodeMapper per event ──> cluster batch ──> reconciliation
//!   integrations, stack          cloud nodes               cluster nodes     stack updates
//! ```
//!
//! Partial failure is tolerated after the run context is read. A failed
//! cluster batch keeps the cloud nodes; a failed stack write keeps the node
//! set. Both surface as warnings.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};

use crate::cluster::ClusterResolver;
use crate::config::MapperConfig;
use crate::context::RunContext;
use crate::domain::{AssetNode, DeferredClusterNode, ProviderClassifier, ProviderFamily};
use crate::errors::{MapperError, MapperResult};
use crate::events::ChangeEvent;
use crate::mapper::{CloudMapping, MapOutcome, NodeMapper, GLOBAL_REGION};
use crate::reconciler::{CommonProviderReconciler, ProviderObservation};
use crate::store::{IntegrationStore, StackStore, StackUpdate};
use crate::warnings::{MappingWarning, WarningKind};

pub use crate::collector::is_empty_state;

/// Everything one run produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingOutcome {
    /// Cloud nodes first, then cluster nodes
    pub nodes: Vec<AssetNode>,
    /// Distinct object types of the emitted nodes
    pub asset_types: BTreeSet<String>,
    pub warnings: Vec<MappingWarning>,
    /// Stack updates proposed by reconciliation, per family
    pub stack_updates: Vec<(ProviderFamily, StackUpdate)>,
    /// The run observed no resources at all
    pub empty_state: bool,
}

impl MappingOutcome {
    /// Asset types in sorted order
    pub fn sorted_asset_types(&self) -> Vec<String> {
        self.asset_types.iter().cloned().collect()
    }
}

/// Serialize nodes one JSON object per line
pub fn to_json_lines(nodes: &[AssetNode]) -> MapperResult<Vec<u8>> {
    let mut buffer = Vec::new();
    for node in nodes {
        serde_json::to_writer(&mut buffer, node)
            .map_err(|e| MapperError::Serialization(e.to_string()))?;
        buffer.push(b'\n');
    }
    Ok(buffer)
}

/// Drives one run from collected events to nodes
#[derive(Clone)]
pub struct MappingPipeline {
    integrations: Arc<dyn IntegrationStore>,
    stacks: Arc<dyn StackStore>,
    classifier: ProviderClassifier,
    resolver: ClusterResolver,
    reconciler: CommonProviderReconciler,
    global_region: String,
}

impl MappingPipeline {
    pub fn new(integrations: Arc<dyn IntegrationStore>, stacks: Arc<dyn StackStore>) -> Self {
        Self {
            integrations,
            stacks,
            classifier: ProviderClassifier::default(),
            resolver: ClusterResolver::default(),
            reconciler: CommonProviderReconciler::new(),
            global_region: GLOBAL_REGION.to_string(),
        }
    }

    /// Pipeline using the configured fallback cluster and global region
    pub fn from_config(
        config: &MapperConfig,
        integrations: Arc<dyn IntegrationStore>,
        stacks: Arc<dyn StackStore>,
    ) -> Self {
        let mut pipeline = Self::new(integrations, stacks);
        pipeline.resolver = ClusterResolver::new(&config.cluster_fallback_id);
        pipeline.global_region = config.global_region.clone();
        pipeline
    }

    /// Map one run's events into nodes
    pub async fn map(&self, events: &[ChangeEvent], ctx: &RunContext) -> MapperResult<MappingOutcome> {
        let span = info_span!(
            "map_stack",
            correlation_id = %ctx.correlation_id,
            account_id = %ctx.account_id,
            stack_id = %ctx.stack_id,
        );
        self.run(events, ctx).instrument(span).await
    }

    async fn run(&self, events: &[ChangeEvent], ctx: &RunContext) -> MapperResult<MappingOutcome> {
        let account_id = ctx.account_id.as_str();
        let cloud_integrations = self.integrations.list_cloud_integrations(account_id).await?;
        let cluster_integrations = self.integrations.list_cluster_integrations(account_id).await?;
        let stack = self.stacks.get_stack(account_id, &ctx.stack_id).await?;

        let mapper = NodeMapper::new(self.classifier.clone())
            .with_global_region(&self.global_region)
            .with_cloud_integrations(&cloud_integrations);

        let mut outcome = MappingOutcome {
            empty_state: is_empty_state(events),
            ..Default::default()
        };
        let mut cloud: Vec<CloudMapping> = Vec::new();
        let mut cloud_index: HashMap<String, usize> = HashMap::new();
        let mut deferred: Vec<DeferredClusterNode> = Vec::new();
        let mut deferred_index: HashMap<String, usize> = HashMap::new();
        let mut skipped = 0usize;

        // Steps reported more than once (pre-step, then outputs-recorded)
        // keep the latest report in the position of the first.
        for event in events {
            let mapped = mapper.map_event(event, ctx);
            outcome.warnings.extend(mapped.warnings);
            match mapped.outcome {
                MapOutcome::Cloud(mapping) => {
                    upsert(&mut cloud, &mut cloud_index, mapping.node.arn.clone(), *mapping)
                }
                MapOutcome::Cluster(node) => {
                    upsert(&mut deferred, &mut deferred_index, node.object.uid.clone(), *node)
                }
                MapOutcome::Skipped(_) => skipped += 1,
            }
        }

        let mut cloud_observation = ProviderObservation::new();
        for mapping in cloud {
            if let Some(account) = &mapping.provider_account {
                cloud_observation.record(account);
            }
            if let Some(asset_type) = mapping.asset_type {
                outcome.asset_types.insert(asset_type);
            }
            outcome.nodes.push(mapping.node);
        }

        let mut cluster_observation = ProviderObservation::new();
        let mut resolved_cluster_integration: Option<String> = None;
        if !deferred.is_empty() {
            match self
                .resolver
                .resolve(self.integrations.as_ref(), account_id, deferred)
                .await
            {
                Ok(batch) => {
                    outcome.warnings.extend(batch.warnings);
                    resolved_cluster_integration = batch.identity.integration_id.clone();
                    for node in batch.nodes {
                        cluster_observation.record(&batch.identity.cluster_id);
                        if let Some(object_type) = &node.object_type {
                            outcome.asset_types.insert(object_type.clone());
                        }
                        outcome.nodes.push(node);
                    }
                }
                Err(e) => {
                    warn!(error = %e, "cluster batch failed, cluster nodes dropped");
                    outcome.warnings.push(MappingWarning::run(
                        WarningKind::ClusterBatchFailed,
                        e.to_string(),
                    ));
                }
            }
        }

        for (family, observation) in [
            (ProviderFamily::Aws, &cloud_observation),
            (ProviderFamily::Kubernetes, &cluster_observation),
        ] {
            let update = self.reconciler.reconcile(
                family,
                observation,
                stack.binding(family),
                |external_id| match family {
                    ProviderFamily::Kubernetes => resolved_cluster_integration.clone().or_else(|| {
                        cluster_integrations
                            .iter()
                            .find(|integration| integration.cluster_id == external_id)
                            .map(|integration| integration.id.clone())
                    }),
                    _ => cloud_integrations
                        .iter()
                        .find(|integration| integration.account_number == external_id)
                        .map(|integration| integration.id.clone()),
                },
            );
            if update.is_empty() {
                continue;
            }

            if let Err(e) = self.stacks.update_stack(account_id, &ctx.stack_id, &update).await {
                warn!(family = %family, error = %e, "common provider update failed");
                outcome.warnings.push(MappingWarning::run(
                    WarningKind::ReconciliationFailed,
                    format!("{} binding update failed: {}", family, e),
                ));
            }
            outcome.stack_updates.push((family, update));
        }

        info!(
            nodes = outcome.nodes.len(),
            skipped,
            asset_types = outcome.asset_types.len(),
            warnings = outcome.warnings.len(),
            empty_state = outcome.empty_state,
            "stack mapped"
        );
        Ok(outcome)
    }
}

/// Insert `item` under `key`, replacing an earlier item with the same key in place
fn upsert<T>(items: &mut Vec<T>, index: &mut HashMap<String, usize>, key: String, item: T) {
    match index.get(&key) {
        Some(&position) => items[position] = item,
        None => {
            index.insert(key, items.len());
            items.push(item);
        }
    }
}
