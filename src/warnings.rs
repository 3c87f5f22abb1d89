// Copyright (c) 2025 - Cowboy AI, Inc.
//! Mapping Warnings
//!
//! Non-fatal findings of a run. Skipped resources and recoverable batch
//! failures are reported here instead of aborting the run; the caller decides
//! whether a partial node set is acceptable.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Cloud resource without an `arn` output
    MissingArn,
    /// `arn` output present but unparsable
    InvalidArn,
    /// Cluster resource without `metadata`, `metadata.name` or `metadata.uid`
    MissingClusterIdentity,
    /// Cluster resource without a `kind` output
    MissingKind,
    /// Cloud type without a translation entry
    MissingTypeMapping,
    /// Drift could not be computed for an update step
    DriftUnavailable,
    /// Cluster integration lookup failed; fallback cluster id used
    ClusterLookupFailed,
    /// Cluster batch could not be finalized
    ClusterBatchFailed,
    /// Common provider reconciliation could not be applied
    ReconciliationFailed,
}

/// A non-fatal finding of one mapping run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingWarning {
    pub kind: WarningKind,
    /// Resource URN or type, when the warning concerns one resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    pub message: String,
}

impl MappingWarning {
    /// Warning about a single resource
    pub fn resource(kind: WarningKind, resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            resource: Some(resource.into()),
            message: message.into(),
        }
    }

    /// Warning about the run as a whole
    pub fn run(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            resource: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for MappingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.resource {
            Some(resource) => write!(f, "{:?} [{}]: {}", self.kind, resource, self.message),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}
