// Copyright (c) 2025 - Cowboy AI, Inc.
//! Run Context
//!
//! Identifiers carried forward from the caller into every node of a run, plus
//! the run's correlation id and start time.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Default IaC engine name stamped on every node
pub const DEFAULT_IAC: &str = "pulumi";

/// Caller-supplied context of one mapping run
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    pub account_id: String,
    pub stack_id: String,
    pub iac_integration_id: String,
    pub stack_name: String,
    pub project_name: String,
    pub organization_name: String,
    /// IaC engine name (`iac` field of every node)
    pub iac: String,
    /// Groups every log line and warning of this run
    pub correlation_id: Uuid,
    /// Timestamp stamped as `updatedAt` on every node
    pub started_at: DateTime<Utc>,
}

impl RunContext {
    /// Context for `stack_id` in `account_id`, started now
    pub fn new(account_id: impl Into<String>, stack_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            stack_id: stack_id.into(),
            iac_integration_id: String::new(),
            stack_name: String::new(),
            project_name: String::new(),
            organization_name: String::new(),
            iac: DEFAULT_IAC.to_string(),
            correlation_id: Uuid::now_v7(),
            started_at: Utc::now(),
        }
    }

    /// Set the IaC integration the stack was read through
    pub fn with_iac_integration(mut self, integration_id: impl Into<String>) -> Self {
        self.iac_integration_id = integration_id.into();
        self
    }

    /// Set stack, project and organization names
    pub fn with_stack_names(
        mut self,
        stack_name: impl Into<String>,
        project_name: impl Into<String>,
        organization_name: impl Into<String>,
    ) -> Self {
        self.stack_name = stack_name.into();
        self.project_name = project_name.into();
        self.organization_name = organization_name.into();
        self
    }

    /// Override the IaC engine name
    pub fn with_iac(mut self, iac: impl Into<String>) -> Self {
        self.iac = iac.into();
        self
    }

    /// Pin the run's start time (deterministic `updatedAt`)
    pub fn with_started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = started_at;
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = correlation_id;
        self
    }
}
