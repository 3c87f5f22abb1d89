// Copyright (c) 2025 - Cowboy AI, Inc.
//! Asset Nodes
//!
//! The normalized, storage-ready record produced for each resource.
//!
//! # Two-phase construction
//!
//! Every [`AssetNode`] carries a non-empty stable identifier. Mapping builds a
//! [`NodeDraft`] first; the draft only becomes a node once an identifier is
//! known:
//!
//! ```text
//! cloud:    NodeDraft ──(arn from outputs)──────────────> AssetNode
//! cluster:  NodeDraft ──> DeferredClusterNode ──(cluster id, batch)──> AssetNode
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use super::arn::cluster_arn;
use super::attributes::Attributes;
use super::drift::DriftRecord;
use super::provider::ProviderFamily;
use crate::context::RunContext;

/// Lifecycle state of an asset relative to the IaC stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    /// Observed state matches the stack
    Managed,
    /// Observed state drifted from the stack
    Modified,
    /// Resource is recorded by the stack but gone from the provider
    Ghost,
}

impl Lifecycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Managed => "managed",
            Self::Modified => "modified",
            Self::Ghost => "ghost",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stack provenance and IaC state of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    pub stack_id: String,
    pub stack_name: String,
    pub project_name: String,
    pub organization_name: String,
    /// Provider-qualified resource type as reported by the engine
    pub pulumi_type: String,
    pub pulumi_state: Lifecycle,
    /// Present only for `modified` nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pulumi_drifts: Option<DriftRecord>,
}

/// Normalized asset record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetNode {
    pub stack_id: String,
    pub iac: String,
    pub account_id: String,
    /// IaC integration the stack was read through
    pub iac_integration_id: String,
    /// Resolved provider integration (cloud account or cluster)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration_id: Option<String>,
    #[serde(rename = "type")]
    pub provider: ProviderFamily,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    /// Stable identifier; never empty
    pub arn: String,
    pub asset_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Cluster namespace; empty for cluster-scoped objects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_account_id: Option<String>,
    pub is_orchestrator: bool,
    pub attributes: Attributes,
    pub metadata: NodeMetadata,
    /// Unix seconds
    pub updated_at: i64,
}

impl AssetNode {
    pub fn lifecycle(&self) -> Lifecycle {
        self.metadata.pulumi_state
    }

    pub fn drift(&self) -> Option<&DriftRecord> {
        self.metadata.pulumi_drifts.as_ref()
    }
}

/// A node under construction, missing only its stable identifier
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDraft {
    pub stack_id: String,
    pub iac: String,
    pub account_id: String,
    pub iac_integration_id: String,
    pub integration_id: Option<String>,
    pub provider: ProviderFamily,
    pub object_type: Option<String>,
    pub region: Option<String>,
    pub location: Option<String>,
    pub name: Option<String>,
    pub kind: Option<String>,
    pub resource_id: Option<String>,
    pub provider_account_id: Option<String>,
    pub attributes: Attributes,
    pub metadata: NodeMetadata,
    pub updated_at: i64,
}

impl NodeDraft {
    /// Draft seeded with the run's carried-forward identifiers
    pub fn new(
        ctx: &RunContext,
        provider: ProviderFamily,
        resource_type: &str,
        lifecycle: Lifecycle,
        drift: Option<DriftRecord>,
        attributes: Attributes,
    ) -> Self {
        Self {
            stack_id: ctx.stack_id.clone(),
            iac: ctx.iac.clone(),
            account_id: ctx.account_id.clone(),
            iac_integration_id: ctx.iac_integration_id.clone(),
            integration_id: None,
            provider,
            object_type: None,
            region: None,
            location: None,
            name: None,
            kind: None,
            resource_id: None,
            provider_account_id: None,
            attributes,
            metadata: NodeMetadata {
                stack_id: ctx.stack_id.clone(),
                stack_name: ctx.stack_name.clone(),
                project_name: ctx.project_name.clone(),
                organization_name: ctx.organization_name.clone(),
                pulumi_type: resource_type.to_string(),
                pulumi_state: lifecycle,
                pulumi_drifts: drift,
            },
            updated_at: ctx.started_at.timestamp(),
        }
    }

    /// Attach the stable identifier. Returns `None` for an empty identifier.
    pub fn finish(self, arn: impl Into<String>) -> Option<AssetNode> {
        let arn = arn.into();
        if arn.trim().is_empty() {
            return None;
        }

        Some(AssetNode {
            stack_id: self.stack_id,
            iac: self.iac,
            account_id: self.account_id,
            iac_integration_id: self.iac_integration_id,
            integration_id: self.integration_id,
            provider: self.provider,
            object_type: self.object_type,
            asset_id: arn.clone(),
            arn,
            region: self.region,
            location: self.location,
            name: self.name,
            kind: self.kind,
            resource_id: self.resource_id,
            provider_account_id: self.provider_account_id,
            is_orchestrator: false,
            attributes: self.attributes,
            metadata: self.metadata,
            updated_at: self.updated_at,
        })
    }
}

/// Identity of a cluster object as observed in its outputs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClusterObjectRef {
    pub uid: String,
    pub name: String,
    pub kind: String,
    /// Empty for cluster-scoped objects
    pub namespace: String,
}

/// Cluster node waiting for the run's cluster identity
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredClusterNode {
    pub draft: NodeDraft,
    pub object: ClusterObjectRef,
}

impl DeferredClusterNode {
    /// Synthesize the identifier from `(namespace, cluster, kind, name)` and
    /// attach the resolved integration, if any
    pub fn finalize(self, cluster_id: &str, integration_id: Option<&str>) -> Option<AssetNode> {
        let arn = cluster_arn(
            &self.object.namespace,
            cluster_id,
            &self.object.kind,
            &self.object.name,
        );
        let mut draft = self.draft;
        draft.integration_id = integration_id.map(str::to_string);
        draft.finish(arn)
    }
}
