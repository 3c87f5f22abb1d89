// Copyright (c) 2025 - Cowboy AI, Inc.
//! Asset Domain Models
//!
//! Pure building blocks of the mapping pipeline. Nothing in this module
//! performs I/O.
//!
//! # Components
//!
//! - [`PropertyValue`] - closed value type for resource inputs and outputs
//! - [`Arn`] - stable identifier parsing and cluster identifier synthesis
//! - [`AttributeProjector`] - output flattening with per-provider suppression
//! - [`calculate_drift`] - whitelisted structural diff between two states
//! - [`ProviderClassifier`] - provider family and type translation
//! - [`AssetNode`] - the normalized record, built through [`NodeDraft`]

pub mod arn;
pub mod attributes;
pub mod drift;
pub mod node;
pub mod provider;
pub mod value;

pub use arn::{account_and_region, cluster_arn, Arn, ArnError};
pub use attributes::{AttributeProjector, Attributes};
pub use drift::{calculate_drift, DriftEntry, DriftError, DriftRecord, DriftWhitelist};
pub use node::{AssetNode, ClusterObjectRef, DeferredClusterNode, Lifecycle, NodeDraft, NodeMetadata};
pub use provider::{ProviderClassifier, ProviderFamily};
pub use value::{PropertyMap, PropertyValue};
