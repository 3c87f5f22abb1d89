// Copyright (c) 2025 - Cowboy AI, Inc.
//! Refresh run service

use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;
use tracing::{info, info_span, Instrument};

use crate::collector::{EventSource, EventStreamCollector};
use crate::context::RunContext;
use crate::errors::MapperResult;
use crate::pipeline::{to_json_lines, MappingOutcome, MappingPipeline};
use crate::reconciler::UPDATED_AT_FIELD;
use crate::store::{ArtifactSink, AssetTrigger, StackStore, StackUpdate};

/// Stack field set when a run observed no resources
pub const STATE_FILE_EMPTY_FIELD: &str = "metadata.fetchingStatus.stateFileEmpty";

/// Stack field set when the provisioning backend no longer knows the stack
pub const STATE_FILE_DELETED_FIELD: &str = "metadata.fetchingStatus.stateFileDeleted";

/// How a refresh run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshReport {
    /// The run observed no resources; the stack was flagged as empty
    EmptyState,
    /// The stack is gone from the provisioning backend; the stack was flagged as deleted
    StateDeleted,
    /// Nodes were written and the downstream trigger invoked
    Mapped(MappingOutcome),
}

/// Runs a refresh end to end: collect, map, store, trigger
#[derive(Clone)]
pub struct RefreshService {
    collector: EventStreamCollector,
    pipeline: MappingPipeline,
    stacks: Arc<dyn StackStore>,
    artifacts: Arc<dyn ArtifactSink>,
    trigger: Arc<dyn AssetTrigger>,
}

impl RefreshService {
    pub fn new(
        pipeline: MappingPipeline,
        stacks: Arc<dyn StackStore>,
        artifacts: Arc<dyn ArtifactSink>,
        trigger: Arc<dyn AssetTrigger>,
    ) -> Self {
        Self {
            collector: EventStreamCollector::default(),
            pipeline,
            stacks,
            artifacts,
            trigger,
        }
    }

    pub fn with_collector(mut self, collector: EventStreamCollector) -> Self {
        self.collector = collector;
        self
    }

    /// Collect the run's events from `source` and process them
    pub async fn refresh<S>(&self, source: S, ctx: &RunContext) -> MapperResult<RefreshReport>
    where
        S: EventSource + 'static,
    {
        let span = info_span!(
            "refresh",
            correlation_id = %ctx.correlation_id,
            account_id = %ctx.account_id,
            stack_id = %ctx.stack_id,
        );

        self.run(source, ctx).instrument(span).await
    }

    async fn run<S>(&self, source: S, ctx: &RunContext) -> MapperResult<RefreshReport>
    where
        S: EventSource + 'static,
    {
        let collected = self.collector.collect(source).await?;

        if collected.is_empty_state() {
            info!("found empty state");
            self.flag_stack(ctx, STATE_FILE_EMPTY_FIELD).await?;
            return Ok(RefreshReport::EmptyState);
        }

        let outcome = self.pipeline.map(collected.events(), ctx).await?;
        let payload = to_json_lines(&outcome.nodes)?;
        self.artifacts
            .write_nodes(&ctx.account_id, &ctx.stack_id, &payload)
            .await?;
        info!(nodes = outcome.nodes.len(), bytes = payload.len(), "wrote nodes");

        let asset_types = outcome.sorted_asset_types();
        self.trigger.trigger(&ctx.account_id, &asset_types).await?;
        info!(asset_types = asset_types.len(), "triggered asset processing");

        Ok(RefreshReport::Mapped(outcome))
    }

    /// Flag a stack the provisioning backend no longer knows
    pub async fn mark_state_deleted(&self, ctx: &RunContext) -> MapperResult<RefreshReport> {
        info!(account_id = %ctx.account_id, stack_id = %ctx.stack_id, "stack missing from backend");
        self.flag_stack(ctx, STATE_FILE_DELETED_FIELD).await?;
        Ok(RefreshReport::StateDeleted)
    }

    async fn flag_stack(&self, ctx: &RunContext, field: &str) -> MapperResult<()> {
        let update = status_update(field, Utc::now());
        self.stacks
            .update_stack(&ctx.account_id, &ctx.stack_id, &update)
            .await
    }
}

fn status_update(field: &str, now: DateTime<Utc>) -> StackUpdate {
    StackUpdate::new()
        .with(field, true)
        .with(UPDATED_AT_FIELD, now.to_rfc3339_opts(SecondsFormat::Secs, true))
}
