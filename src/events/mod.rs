// Copyright (c) 2025 - Cowboy AI, Inc.
//! Provisioning Engine Events
//!
//! Change events emitted by the provisioning engine while it refreshes a
//! stack. Only step events carry a resource payload; the run ends with a
//! single summary event.
//!
//! # Event Flow
//!
//! ```text
//! Engine refresh ──> pre-step ──> outputs-recorded ──> ... ──> summary
//!                      │               │
//!                      └── StepMetadata (type, op, old, new)
//! ```

pub mod change_event;

pub use change_event::{ChangeEvent, EventKind, ObservedState, StepMetadata, StepOp};
