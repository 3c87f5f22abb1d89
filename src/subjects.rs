// Copyright (c) 2025 - Cowboy AI, Inc.

//! NATS subject hierarchy for refresh runs
//!
//! # Subject Pattern
//!
//! ```text
//! {root}.{channel}.{account}[.{stack}]
//! ```
//!
//! - `{root}.events.{account}.{stack}` - engine events of one refresh run
//! - `{root}.artifacts.{account}.{stack}` - JSON-lines node artifact
//! - `{root}.triggers.{account}` - asset types for downstream processing
//!
//! # Examples
//!
//! ```rust
//! use cim_iac_assets::subjects::{Channel, SubjectBuilder};
//!
//! let subject = SubjectBuilder::new("iac", Channel::Events)
//!     .account("acc-1")
//!     .stack("stack-1")
//!     .build();
//! assert_eq!(subject, "iac.events.acc-1.stack-1");
//!
//! let wildcard = SubjectBuilder::new("iac", Channel::Artifacts)
//!     .account("acc-1")
//!     .build_wildcard();
//! assert_eq!(wildcard, "iac.artifacts.acc-1.>");
//! ```

use std::fmt;

/// Default root namespace
pub const DEFAULT_SUBJECT_ROOT: &str = "iac";

/// Message channel under the root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Engine change events
    Events,
    /// Serialized node artifacts
    Artifacts,
    /// Downstream triggers
    Triggers,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Events => write!(f, "events"),
            Channel::Artifacts => write!(f, "artifacts"),
            Channel::Triggers => write!(f, "triggers"),
        }
    }
}

/// Builder for refresh subjects
#[derive(Debug, Clone)]
pub struct SubjectBuilder {
    root: String,
    channel: Channel,
    account: Option<String>,
    stack: Option<String>,
}

impl SubjectBuilder {
    pub fn new(root: impl Into<String>, channel: Channel) -> Self {
        Self {
            root: root.into(),
            channel,
            account: None,
            stack: None,
        }
    }

    pub fn account(mut self, account_id: impl Into<String>) -> Self {
        self.account = Some(account_id.into());
        self
    }

    pub fn stack(mut self, stack_id: impl Into<String>) -> Self {
        self.stack = Some(stack_id.into());
        self
    }

    /// Build the subject from every segment set so far
    pub fn build(self) -> String {
        let mut segments = vec![self.root, self.channel.to_string()];
        segments.extend(self.account);
        segments.extend(self.stack);
        segments.join(".")
    }

    /// Build a subscription for everything below the segments set so far
    pub fn build_wildcard(self) -> String {
        format!("{}.>", self.build())
    }
}

/// Subjects of one root namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSubjects {
    root: String,
}

impl RefreshSubjects {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn events(&self, account_id: &str, stack_id: &str) -> String {
        SubjectBuilder::new(&self.root, Channel::Events)
            .account(account_id)
            .stack(stack_id)
            .build()
    }

    pub fn artifacts(&self, account_id: &str, stack_id: &str) -> String {
        SubjectBuilder::new(&self.root, Channel::Artifacts)
            .account(account_id)
            .stack(stack_id)
            .build()
    }

    pub fn triggers(&self, account_id: &str) -> String {
        SubjectBuilder::new(&self.root, Channel::Triggers)
            .account(account_id)
            .build()
    }

    /// Every event subject of an account
    pub fn all_events(&self, account_id: &str) -> String {
        SubjectBuilder::new(&self.root, Channel::Events)
            .account(account_id)
            .build_wildcard()
    }
}

impl Default for RefreshSubjects {
    fn default() -> Self {
        Self::new(DEFAULT_SUBJECT_ROOT)
    }
}
