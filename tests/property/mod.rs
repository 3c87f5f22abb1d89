// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! - `drift`: only whitelisted, non-computed paths are ever reported
//! - `step_selection`: non-terminal operations never produce nodes
//! - `majority`: the proposed provider is the most observed one
//! - `cluster_identity`: cluster identifiers ignore event order

mod cluster_identity;
mod drift;
mod majority;
mod step_selection;
