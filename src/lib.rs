// Copyright (c) 2025 - Cowboy AI, Inc.
//! IaC asset mapping for the Composable Information Machine
//!
//! Consumes the change events a provisioning engine emits while refreshing a
//! stack and turns them into normalized, storage-ready asset nodes with
//! drift status, provider attribution and stable identifiers.
//!
//! # Flow
//!
//! ```text
//! EventSource ──> EventStreamCollector ──> MappingPipeline ──> nodes, asset types, warnings
//!                                             │
//!                                             ├── NodeMapper (per event)
//!                                             ├── ClusterResolver (per run)
//!                                             └── CommonProviderReconciler ──> StackStore
//! ```
//!
//! Persistence, artifact storage and downstream triggers are collaborators
//! behind the traits in [`store`].

pub mod cluster;
pub mod collector;
pub mod config;
pub mod context;
pub mod domain;
pub mod errors;
pub mod events;
pub mod mapper;
pub mod nats;
pub mod pipeline;
pub mod reconciler;
pub mod service;
pub mod store;
pub mod subjects;
pub mod warnings;

// Re-export commonly used types
pub use cluster::{ClusterIdentity, ClusterResolver, FALLBACK_CLUSTER_ID};
pub use collector::{EventSink, EventSource, EventStreamCollector, JsonLinesEventSource, VecEventSource};
pub use config::MapperConfig;
pub use context::RunContext;
pub use domain::{AssetNode, DriftRecord, Lifecycle, ProviderClassifier, ProviderFamily};
pub use errors::{MapperError, MapperResult};
pub use events::{ChangeEvent, EventKind, ObservedState, StepMetadata, StepOp};
pub use mapper::{MapOutcome, NodeMapper, SkipReason};
pub use nats::{NatsClient, NatsConfig, NatsEventSource, NatsPublisher};
pub use pipeline::{is_empty_state, to_json_lines, MappingOutcome, MappingPipeline};
pub use reconciler::{CommonProviderReconciler, ProviderObservation};
pub use service::{RefreshReport, RefreshService};
pub use warnings::{MappingWarning, WarningKind};
