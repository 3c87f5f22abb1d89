// Copyright (c) 2025 - Cowboy AI, Inc.
//! Change Event Types
//!
//! Serialized shape:
//!
//! ```json
//! {
//!   "kind": "pre-step",
//!   "metadata": {
//!     "type": "aws:s3/bucket:Bucket",
//!     "op": "same",
//!     "urn": "urn:pulumi:dev::web::aws:s3/bucket:Bucket::assets",
//!     "old": { "inputs": {}, "outputs": {} },
//!     "new": { "inputs": {}, "outputs": { "arn": "arn:aws:s3:::assets" } }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::value::PropertyMap;

/// Kind of engine event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    /// A resource step is about to be applied
    PreStep,
    /// A resource step recorded its outputs
    OutputsRecorded,
    /// Run summary, last event of a run
    Summary,
    /// Diagnostics, progress, policy and any other engine chatter
    #[serde(other)]
    Other,
}

impl EventKind {
    /// Whether the collector keeps events of this kind
    pub fn is_retained(&self) -> bool {
        matches!(self, Self::PreStep | Self::OutputsRecorded | Self::Summary)
    }

    /// Whether events of this kind carry step metadata
    pub fn is_resource_bearing(&self) -> bool {
        matches!(self, Self::PreStep | Self::OutputsRecorded)
    }
}

/// Operation the engine applied to a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepOp {
    Same,
    Create,
    Update,
    Delete,
    Replace,
    CreateReplacement,
    DeleteReplaced,
    Read,
    ReadReplacement,
    Refresh,
    Import,
    #[serde(other)]
    Other,
}

impl StepOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Same => "same",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Replace => "replace",
            Self::CreateReplacement => "create-replacement",
            Self::DeleteReplaced => "delete-replaced",
            Self::Read => "read",
            Self::ReadReplacement => "read-replacement",
            Self::Refresh => "refresh",
            Self::Import => "import",
            Self::Other => "other",
        }
    }

    /// Whether this operation describes an end state the mapper records
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Same | Self::Update | Self::Delete)
    }
}

impl fmt::Display for StepOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One observed snapshot of a resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservedState {
    /// Desired properties as declared in the program
    #[serde(default)]
    pub inputs: PropertyMap,
    /// Properties reported by the provider
    #[serde(default)]
    pub outputs: PropertyMap,
}

impl ObservedState {
    pub fn from_outputs(outputs: PropertyMap) -> Self {
        Self {
            inputs: PropertyMap::new(),
            outputs,
        }
    }

    pub fn with_inputs(mut self, inputs: PropertyMap) -> Self {
        self.inputs = inputs;
        self
    }
}

/// Resource payload of a step event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepMetadata {
    /// Provider-qualified resource type
    #[serde(rename = "type")]
    pub resource_type: String,
    pub op: StepOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old: Option<ObservedState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new: Option<ObservedState>,
}

impl StepMetadata {
    pub fn new(resource_type: impl Into<String>, op: StepOp) -> Self {
        Self {
            resource_type: resource_type.into(),
            op,
            urn: None,
            old: None,
            new: None,
        }
    }

    pub fn with_urn(mut self, urn: impl Into<String>) -> Self {
        self.urn = Some(urn.into());
        self
    }

    pub fn with_old(mut self, old: ObservedState) -> Self {
        self.old = Some(old);
        self
    }

    pub fn with_new(mut self, new: ObservedState) -> Self {
        self.new = Some(new);
        self
    }

    /// URN when known, resource type otherwise (for log lines)
    pub fn label(&self) -> &str {
        self.urn.as_deref().unwrap_or(&self.resource_type)
    }
}

/// One emission of the engine's event stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<StepMetadata>,
}

impl ChangeEvent {
    pub fn pre_step(metadata: StepMetadata) -> Self {
        Self {
            kind: EventKind::PreStep,
            metadata: Some(metadata),
        }
    }

    pub fn outputs_recorded(metadata: StepMetadata) -> Self {
        Self {
            kind: EventKind::OutputsRecorded,
            metadata: Some(metadata),
        }
    }

    pub fn summary() -> Self {
        Self {
            kind: EventKind::Summary,
            metadata: None,
        }
    }

    pub fn other() -> Self {
        Self {
            kind: EventKind::Other,
            metadata: None,
        }
    }

    /// Step metadata, only for resource-bearing kinds
    pub fn step_metadata(&self) -> Option<&StepMetadata> {
        if self.kind.is_resource_bearing() {
            self.metadata.as_ref()
        } else {
            None
        }
    }
}
