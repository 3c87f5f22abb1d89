// Copyright (c) 2025 - Cowboy AI, Inc.
//! Node Mapping
//!
//! Turns one change event into zero or one asset node.
//!
//! # Per-event flow
//!
//! ```text
//! ChangeEvent
//!   │ resource type ──> ProviderClassifier ──> family (unknown ⇒ skip)
//!   │ op            ──> same ⇒ new/managed
//!   │                   delete ⇒ old/ghost
//!   │                   update ⇒ new + drift(old, new) ⇒ managed | modified
//!   │                   other ⇒ skip
//!   │ outputs       ──> empty ⇒ skip
//!   │               ──> AttributeProjector
//!   ├── cloud:   arn ──> account + region ──> AssetNode
//!   └── cluster: metadata.name / metadata.uid / kind ──> DeferredClusterNode
//! ```
//!
//! Skips are not errors. Skips caused by a missing identifier also carry a
//! [`MappingWarning`]. Non-terminal operations and empty outputs are logged
//! at `debug`; every other skip at `warn`.

use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

use crate::context::RunContext;
use crate::domain::value::lookup;
use crate::domain::{
    account_and_region, calculate_drift, AssetNode, AttributeProjector, ClusterObjectRef,
    DeferredClusterNode, DriftError, DriftRecord, DriftWhitelist, Lifecycle, NodeDraft,
    PropertyValue, ProviderClassifier, ProviderFamily,
};
use crate::events::{ChangeEvent, ObservedState, StepMetadata, StepOp};
use crate::store::CloudIntegration;
use crate::warnings::{MappingWarning, WarningKind};

/// Region recorded for cloud identifiers without a location segment
pub const GLOBAL_REGION: &str = "global";

/// Why an event produced no node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Event kind carries no step metadata
    NoStepMetadata,
    /// Resource type belongs to no known provider family
    UnknownProvider,
    /// Operation does not describe an end state
    NonTerminalOp(StepOp),
    /// Selected state is absent or has no outputs yet
    EmptyOutputs,
    /// Cloud resource without an `arn` output
    MissingArn,
    /// Cloud resource whose `arn` output does not parse
    InvalidArn,
    /// Cluster resource without `metadata.name` or `metadata.uid`
    MissingClusterIdentity,
    /// Cluster resource without a `kind` output
    MissingKind,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoStepMetadata => write!(f, "no step metadata"),
            Self::UnknownProvider => write!(f, "unknown provider"),
            Self::NonTerminalOp(op) => write!(f, "non-terminal operation '{}'", op),
            Self::EmptyOutputs => write!(f, "no outputs"),
            Self::MissingArn => write!(f, "missing arn"),
            Self::InvalidArn => write!(f, "invalid arn"),
            Self::MissingClusterIdentity => write!(f, "missing cluster object identity"),
            Self::MissingKind => write!(f, "missing kind"),
        }
    }
}

/// A mapped cloud resource
#[derive(Debug, Clone, PartialEq)]
pub struct CloudMapping {
    pub node: AssetNode,
    /// Account id parsed from the ARN, when it carries one
    pub provider_account: Option<String>,
    /// Translated object type, when a translation exists
    pub asset_type: Option<String>,
}

/// Result of mapping one event
#[derive(Debug, Clone, PartialEq)]
pub enum MapOutcome {
    Cloud(Box<CloudMapping>),
    /// Cluster node waiting for batch identity resolution
    Cluster(Box<DeferredClusterNode>),
    Skipped(SkipReason),
}

/// Outcome plus the warnings raised while mapping
#[derive(Debug, Clone, PartialEq)]
pub struct MappedEvent {
    pub outcome: MapOutcome,
    pub warnings: Vec<MappingWarning>,
}

impl MappedEvent {
    fn skipped(reason: SkipReason) -> Self {
        Self {
            outcome: MapOutcome::Skipped(reason),
            warnings: Vec::new(),
        }
    }

    fn skipped_with(reason: SkipReason, warning: MappingWarning) -> Self {
        Self {
            outcome: MapOutcome::Skipped(reason),
            warnings: vec![warning],
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, MapOutcome::Skipped(_))
    }
}

/// State selected for a step, with its lifecycle
struct SelectedState<'a> {
    state: &'a ObservedState,
    lifecycle: Lifecycle,
    drift: Option<DriftRecord>,
}

/// Maps change events to asset nodes
#[derive(Debug, Clone)]
pub struct NodeMapper {
    classifier: ProviderClassifier,
    global_region: String,
    /// Provider account number → integration id
    cloud_integrations: HashMap<String, String>,
}

impl NodeMapper {
    pub fn new(classifier: ProviderClassifier) -> Self {
        Self {
            classifier,
            global_region: GLOBAL_REGION.to_string(),
            cloud_integrations: HashMap::new(),
        }
    }

    pub fn with_global_region(mut self, region: impl Into<String>) -> Self {
        self.global_region = region.into();
        self
    }

    /// Cloud integrations used to attribute nodes. The first integration
    /// registered for an account number wins.
    pub fn with_cloud_integrations(mut self, integrations: &[CloudIntegration]) -> Self {
        for integration in integrations {
            self.cloud_integrations
                .entry(integration.account_number.clone())
                .or_insert_with(|| integration.id.clone());
        }
        self
    }

    pub fn classifier(&self) -> &ProviderClassifier {
        &self.classifier
    }

    /// Map one event
    pub fn map_event(&self, event: &ChangeEvent, ctx: &RunContext) -> MappedEvent {
        let Some(step) = event.step_metadata() else {
            return MappedEvent::skipped(SkipReason::NoStepMetadata);
        };

        let family = self.classifier.family(&step.resource_type);
        if family == ProviderFamily::Unknown {
            warn!(urn = %step.label(), resource_type = %step.resource_type, "skipping resource of unknown provider");
            return MappedEvent::skipped(SkipReason::UnknownProvider);
        }

        let mut warnings = Vec::new();
        let selected = match select_state(step, family, &mut warnings) {
            Ok(selected) => selected,
            Err(reason) => {
                debug!(urn = %step.label(), %reason, "skipping step");
                return MappedEvent {
                    outcome: MapOutcome::Skipped(reason),
                    warnings,
                };
            }
        };

        if selected.state.outputs.is_empty() {
            debug!(urn = %step.label(), "skipping step without outputs");
            return MappedEvent {
                outcome: MapOutcome::Skipped(SkipReason::EmptyOutputs),
                warnings,
            };
        }

        let attributes = AttributeProjector::for_family(family).project(&selected.state.outputs);
        let draft = NodeDraft::new(
            ctx,
            family,
            &step.resource_type,
            selected.lifecycle,
            selected.drift,
            attributes,
        );

        let mapped = match family {
            ProviderFamily::Kubernetes => self.map_cluster(step, selected.state, draft),
            _ => self.map_cloud(step, selected.state, draft),
        };
        warnings.extend(mapped.warnings);

        MappedEvent {
            outcome: mapped.outcome,
            warnings,
        }
    }

    fn map_cloud(&self, step: &StepMetadata, state: &ObservedState, mut draft: NodeDraft) -> MappedEvent {
        let Some(arn) = state
            .outputs
            .get("arn")
            .and_then(PropertyValue::as_str)
            .filter(|arn| !arn.trim().is_empty())
        else {
            warn!(urn = %step.label(), resource_type = %step.resource_type, "cloud resource has no arn");
            return MappedEvent::skipped_with(
                SkipReason::MissingArn,
                MappingWarning::resource(WarningKind::MissingArn, step.label(), "no arn output"),
            );
        };

        let (account, region) = match account_and_region(arn, &self.global_region) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(urn = %step.label(), error = %e, "cloud resource has an invalid arn");
                return MappedEvent::skipped_with(
                    SkipReason::InvalidArn,
                    MappingWarning::resource(WarningKind::InvalidArn, step.label(), e.to_string()),
                );
            }
        };

        let mut warnings = Vec::new();
        let asset_type = self
            .classifier
            .cloud_object_type(&step.resource_type)
            .map(str::to_string);
        if asset_type.is_none() {
            warn!(resource_type = %step.resource_type, "no type translation");
            warnings.push(MappingWarning::resource(
                WarningKind::MissingTypeMapping,
                step.label(),
                format!("no object type for {}", step.resource_type),
            ));
        }

        let provider_account = Some(account).filter(|account| !account.is_empty());
        draft.object_type = asset_type.clone();
        draft.region = Some(region);
        draft.provider_account_id = provider_account.clone();
        draft.integration_id = provider_account
            .as_ref()
            .and_then(|account| self.cloud_integrations.get(account))
            .cloned();

        let outcome = match draft.finish(arn) {
            Some(node) => MapOutcome::Cloud(Box::new(CloudMapping {
                node,
                provider_account,
                asset_type,
            })),
            None => MapOutcome::Skipped(SkipReason::MissingArn),
        };
        MappedEvent { outcome, warnings }
    }

    fn map_cluster(&self, step: &StepMetadata, state: &ObservedState, mut draft: NodeDraft) -> MappedEvent {
        let text = |path: &str| {
            lookup(&state.outputs, path)
                .and_then(PropertyValue::as_str)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let (Some(name), Some(uid)) = (text("metadata.name"), text("metadata.uid")) else {
            warn!(urn = %step.label(), "cluster resource has no name or uid");
            return MappedEvent::skipped_with(
                SkipReason::MissingClusterIdentity,
                MappingWarning::resource(
                    WarningKind::MissingClusterIdentity,
                    step.label(),
                    "metadata.name and metadata.uid are required",
                ),
            );
        };
        let namespace = text("metadata.namespace").unwrap_or_default();

        let Some(kind) = text("kind") else {
            warn!(urn = %step.label(), "cluster resource has no kind");
            return MappedEvent::skipped_with(
                SkipReason::MissingKind,
                MappingWarning::resource(WarningKind::MissingKind, step.label(), "no kind output"),
            );
        };

        draft.object_type = Some(self.classifier.cluster_object_type(&kind));
        draft.name = Some(name.clone());
        draft.kind = Some(kind.clone());
        draft.location = Some(namespace.clone());
        draft.resource_id = Some(uid.clone());

        MappedEvent {
            outcome: MapOutcome::Cluster(Box::new(DeferredClusterNode {
                draft,
                object: ClusterObjectRef {
                    uid,
                    name,
                    kind,
                    namespace,
                },
            })),
            warnings: Vec::new(),
        }
    }
}

impl Default for NodeMapper {
    fn default() -> Self {
        Self::new(ProviderClassifier::default())
    }
}

/// Pick the observed state and lifecycle for a step's operation
fn select_state<'a>(
    step: &'a StepMetadata,
    family: ProviderFamily,
    warnings: &mut Vec<MappingWarning>,
) -> Result<SelectedState<'a>, SkipReason> {
    match step.op {
        StepOp::Same => Ok(SelectedState {
            state: step.new.as_ref().ok_or(SkipReason::EmptyOutputs)?,
            lifecycle: Lifecycle::Managed,
            drift: None,
        }),
        StepOp::Delete => Ok(SelectedState {
            state: step.old.as_ref().ok_or(SkipReason::EmptyOutputs)?,
            lifecycle: Lifecycle::Ghost,
            drift: None,
        }),
        StepOp::Update => {
            let state = step.new.as_ref().ok_or(SkipReason::EmptyOutputs)?;
            match step_drift(step, family) {
                Ok(drift) if !drift.is_empty() => Ok(SelectedState {
                    state,
                    lifecycle: Lifecycle::Modified,
                    drift: Some(drift),
                }),
                Ok(_) => Ok(SelectedState {
                    state,
                    lifecycle: Lifecycle::Managed,
                    drift: None,
                }),
                Err(e) => {
                    warn!(urn = %step.label(), error = %e, "drift unavailable, recording as managed");
                    warnings.push(MappingWarning::resource(
                        WarningKind::DriftUnavailable,
                        step.label(),
                        e.to_string(),
                    ));
                    Ok(SelectedState {
                        state,
                        lifecycle: Lifecycle::Managed,
                        drift: None,
                    })
                }
            }
        }
        op => Err(SkipReason::NonTerminalOp(op)),
    }
}

/// Drift of an update step, whitelisted from its prior state
fn step_drift(step: &StepMetadata, family: ProviderFamily) -> Result<DriftRecord, DriftError> {
    let old = step
        .old
        .as_ref()
        .ok_or_else(|| DriftError::MissingPriorState(step.label().to_string()))?;
    let new = step
        .new
        .as_ref()
        .ok_or_else(|| DriftError::MissingNewState(step.label().to_string()))?;

    let whitelist = DriftWhitelist::for_resource(family, &old.inputs, &old.outputs);
    Ok(calculate_drift(&old.outputs, &new.outputs, &whitelist))
}
