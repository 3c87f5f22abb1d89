// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cluster Identity Resolution
//!
//! Cluster objects carry no provider-issued identifier. Once every event of a
//! run is mapped, the deferred cluster nodes are resolved as one batch:
//!
//! ```text
//! uids + kinds ──> find_cluster_integration_ids
//!                    0 ids (or lookup failure) ──> fallback cluster id, no integration
//!                    1 id                      ──> get_cluster_id
//!                    n ids                     ──> AmbiguousCluster (batch fails)
//! ```
//!
//! The uid and kind sets are sorted and deduplicated before the lookup, so the
//! resolved cluster id does not depend on the order the events arrived in.

use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::domain::{AssetNode, DeferredClusterNode};
use crate::errors::{MapperError, MapperResult};
use crate::store::IntegrationStore;
use crate::warnings::{MappingWarning, WarningKind};

/// Cluster id used when no cluster integration matches the run
pub const FALLBACK_CLUSTER_ID: &str = "K8sCluster";

/// Cluster the run's objects belong to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterIdentity {
    pub cluster_id: String,
    /// Matched cluster integration; `None` for the fallback cluster
    pub integration_id: Option<String>,
}

impl ClusterIdentity {
    pub fn fallback(cluster_id: impl Into<String>) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            integration_id: None,
        }
    }
}

/// Finalized cluster batch
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedClusterBatch {
    pub identity: ClusterIdentity,
    pub nodes: Vec<AssetNode>,
    pub warnings: Vec<MappingWarning>,
}

/// Resolves the cluster identity of a batch of deferred cluster nodes
#[derive(Debug, Clone)]
pub struct ClusterResolver {
    fallback_cluster_id: String,
}

impl ClusterResolver {
    pub fn new(fallback_cluster_id: impl Into<String>) -> Self {
        Self {
            fallback_cluster_id: fallback_cluster_id.into(),
        }
    }

    /// Resolve the cluster identity for the observed objects
    pub async fn resolve_identity(
        &self,
        store: &dyn IntegrationStore,
        account_id: &str,
        deferred: &[DeferredClusterNode],
        warnings: &mut Vec<MappingWarning>,
    ) -> MapperResult<ClusterIdentity> {
        let uids: Vec<String> = deferred
            .iter()
            .map(|node| node.object.uid.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let kinds: Vec<String> = deferred
            .iter()
            .map(|node| node.object.kind.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let integration_ids = match store
            .find_cluster_integration_ids(account_id, &uids, &kinds)
            .await
        {
            Ok(ids) => ids,
            Err(e) => {
                warn!(account_id, error = %e, "cluster integration search failed, using fallback cluster");
                warnings.push(MappingWarning::run(
                    WarningKind::ClusterLookupFailed,
                    format!("cluster integration search failed: {}", e),
                ));
                Vec::new()
            }
        };

        match integration_ids.as_slice() {
            [] => {
                debug!(account_id, fallback = %self.fallback_cluster_id, "no cluster integration matched");
                Ok(ClusterIdentity::fallback(&self.fallback_cluster_id))
            }
            [integration_id] => {
                let cluster_id = store.get_cluster_id(integration_id, account_id).await?;
                Ok(ClusterIdentity {
                    cluster_id,
                    integration_id: Some(integration_id.clone()),
                })
            }
            ids => Err(MapperError::AmbiguousCluster { count: ids.len() }),
        }
    }

    /// Resolve the identity and finalize every deferred node
    pub async fn resolve(
        &self,
        store: &dyn IntegrationStore,
        account_id: &str,
        deferred: Vec<DeferredClusterNode>,
    ) -> MapperResult<ResolvedClusterBatch> {
        let mut warnings = Vec::new();
        let identity = self
            .resolve_identity(store, account_id, &deferred, &mut warnings)
            .await?;

        let nodes: Vec<AssetNode> = deferred
            .into_iter()
            .filter_map(|node| {
                node.finalize(&identity.cluster_id, identity.integration_id.as_deref())
            })
            .collect();

        info!(
            account_id,
            cluster_id = %identity.cluster_id,
            nodes = nodes.len(),
            "cluster batch resolved"
        );
        Ok(ResolvedClusterBatch {
            identity,
            nodes,
            warnings,
        })
    }
}

impl Default for ClusterResolver {
    fn default() -> Self {
        Self::new(FALLBACK_CLUSTER_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RunContext;
    use crate::domain::{AttributeProjector, ClusterObjectRef, Lifecycle, NodeDraft, ProviderFamily};
    use crate::domain::value::PropertyMap;
    use crate::store::InMemoryIntegrationStore;

    fn deferred(uid: &str, kind: &str, name: &str) -> DeferredClusterNode {
        let ctx = RunContext::new("acc", "stack");
        let attributes = AttributeProjector::for_family(ProviderFamily::Kubernetes).project(&PropertyMap::new());
        DeferredClusterNode {
            draft: NodeDraft::new(
                &ctx,
                ProviderFamily::Kubernetes,
                "kubernetes:apps/v1:Deployment",
                Lifecycle::Managed,
                None,
                attributes,
            ),
            object: ClusterObjectRef {
                uid: uid.to_string(),
                name: name.to_string(),
                kind: kind.to_string(),
                namespace: "prod".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_no_match_uses_fallback() {
        let store = InMemoryIntegrationStore::new();
        let batch = ClusterResolver::default()
            .resolve(&store, "acc", vec![deferred("u-1", "Deployment", "web")])
            .await
            .unwrap();

        assert_eq!(batch.identity, ClusterIdentity::fallback(FALLBACK_CLUSTER_ID));
        assert_eq!(batch.nodes[0].arn, "arn:k8s:K8sCluster:prod:Deployment/web");
        assert!(batch.nodes[0].integration_id.is_none());
        assert!(batch.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_single_match_resolves_cluster() {
        let store = InMemoryIntegrationStore::new()
            .with_cluster("k8s-int", "c-42")
            .with_cluster_object("k8s-int", "u-1", "Deployment");

        let batch = ClusterResolver::default()
            .resolve(&store, "acc", vec![deferred("u-1", "Deployment", "web")])
            .await
            .unwrap();

        assert_eq!(batch.identity.cluster_id, "c-42");
        assert_eq!(batch.nodes[0].arn, "arn:k8s:c-42:prod:Deployment/web");
        assert_eq!(batch.nodes[0].integration_id.as_deref(), Some("k8s-int"));
    }

    #[tokio::test]
    async fn test_multiple_matches_fail_batch() {
        let store = InMemoryIntegrationStore::new()
            .with_cluster_object("k8s-a", "u-1", "Deployment")
            .with_cluster_object("k8s-b", "u-2", "Deployment");

        let result = ClusterResolver::default()
            .resolve(
                &store,
                "acc",
                vec![deferred("u-1", "Deployment", "a"), deferred("u-2", "Deployment", "b")],
            )
            .await;

        assert!(matches!(result, Err(MapperError::AmbiguousCluster { count: 2 })));
    }

    #[tokio::test]
    async fn test_search_failure_falls_back_with_warning() {
        let store = InMemoryIntegrationStore::new().fail_cluster_search();
        let batch = ClusterResolver::default()
            .resolve(&store, "acc", vec![deferred("u-1", "Deployment", "web")])
            .await
            .unwrap();

        assert_eq!(batch.identity.cluster_id, FALLBACK_CLUSTER_ID);
        assert_eq!(batch.warnings[0].kind, WarningKind::ClusterLookupFailed);
    }
}
