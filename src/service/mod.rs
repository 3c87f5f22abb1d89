// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service Layer for Refresh Runs
//!
//! Wraps the mapping pipeline with the run-boundary concerns around it.
//!
//! # Architecture
//!
//! ```text
//! EventSource
//!     ↓
//! EventStreamCollector ──(≤ 1 event)──> StackStore: stateFileEmpty
//!     ↓
//! MappingPipeline
//!     ↓
//! to_json_lines ──> ArtifactSink
//!     ↓
//! AssetTrigger (sorted asset types)
//! ```
//!
//! A stack the provisioning backend no longer knows is flagged through
//! [`RefreshService::mark_state_deleted`].
//!
//! # Example
//!
//! ```rust,ignore
//! use cim_iac_assets::service::RefreshService;
//!
//! let service = RefreshService::new(pipeline, stacks, artifacts, trigger);
//! let report = service.refresh(source, &ctx).await?;
//! ```

pub mod refresh;

pub use refresh::{RefreshReport, RefreshService, STATE_FILE_DELETED_FIELD, STATE_FILE_EMPTY_FIELD};
