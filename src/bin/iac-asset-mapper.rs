// Copyright (c) 2025 - Cowboy AI, Inc.
//! IaC Asset Mapper
//!
//! Maps one stack refresh into asset nodes.
//!
//! - `iac-asset-mapper events.jsonl` reads engine events from a JSON-lines
//!   file and prints the nodes as JSON lines on stdout
//! - `iac-asset-mapper` subscribes to `{root}.events.{account}.{stack}` and
//!   publishes the artifact and trigger over NATS
//!
//! Environment:
//! 1. `ACCOUNT_ID`, `STACK_ID` (required)
//! 2. `IAC_INTEGRATION_ID`, `STACK_NAME`, `PROJECT_NAME`, `ORGANIZATION_NAME`
//! 3. `MAPPER_STORE_FILE` - JSON with `integrations` and `stack` to seed the
//!    in-memory stores
//! 4. `MAPPER_IDLE_TIMEOUT_SECS` - give up on a silent NATS subject
//! 5. Everything [`MapperConfig::from_env`] reads

use anyhow::{Context, Result};
use async_trait::async_trait;
use cim_iac_assets::{
    store::{
        ArtifactSink, AssetTrigger, InMemoryIntegrationStore, InMemoryStackStore, StackRecord,
    },
    EventStreamCollector, JsonLinesEventSource, MapperConfig, MapperResult, MappingPipeline,
    NatsClient, NatsEventSource, NatsPublisher, RefreshReport, RefreshService, RunContext,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Seed data of the in-memory stores
#[derive(Debug, Default, Deserialize)]
struct StoreFile {
    #[serde(default)]
    integrations: InMemoryIntegrationStore,
    #[serde(default)]
    stack: Option<StackRecord>,
}

/// Writes the node artifact to stdout
struct StdoutSink;

#[async_trait]
impl ArtifactSink for StdoutSink {
    async fn write_nodes(&self, _account_id: &str, _stack_id: &str, payload: &[u8]) -> MapperResult<()> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(payload).await?;
        stdout.flush().await?;
        Ok(())
    }
}

/// Logs the asset types instead of triggering anything
struct LogTrigger;

#[async_trait]
impl AssetTrigger for LogTrigger {
    async fn trigger(&self, account_id: &str, asset_types: &[String]) -> MapperResult<()> {
        info!(account_id, ?asset_types, "asset types observed");
        Ok(())
    }
}

fn run_context_from_env(iac_name: &str) -> Result<RunContext> {
    let account_id = std::env::var("ACCOUNT_ID").context("ACCOUNT_ID not set")?;
    let stack_id = std::env::var("STACK_ID").context("STACK_ID not set")?;
    let optional = |key: &str| std::env::var(key).unwrap_or_default();

    Ok(RunContext::new(account_id, stack_id)
        .with_iac(iac_name)
        .with_iac_integration(optional("IAC_INTEGRATION_ID"))
        .with_stack_names(
            optional("STACK_NAME"),
            optional("PROJECT_NAME"),
            optional("ORGANIZATION_NAME"),
        ))
}

async fn load_store_file() -> Result<StoreFile> {
    match std::env::var("MAPPER_STORE_FILE") {
        Ok(path) => {
            let raw = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read store file {}", path))?;
            serde_json::from_str(&raw).with_context(|| format!("Invalid store file {}", path))
        }
        Err(_) => Ok(StoreFile::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = MapperConfig::from_env().context("Invalid mapper configuration")?;
    let ctx = run_context_from_env(&config.iac_name)?;
    info!(
        account_id = %ctx.account_id,
        stack_id = %ctx.stack_id,
        correlation_id = %ctx.correlation_id,
        "starting asset mapping"
    );

    let store_file = load_store_file().await?;
    let stack = store_file
        .stack
        .unwrap_or_else(|| StackRecord::new(&ctx.stack_id));
    let integrations = Arc::new(store_file.integrations);
    let stacks = Arc::new(InMemoryStackStore::new().with_stack(&ctx.account_id, stack));

    let pipeline = MappingPipeline::from_config(&config, integrations, stacks.clone());
    let collector = EventStreamCollector::new(config.collector_capacity);

    let report = match std::env::args().nth(1) {
        Some(path) => {
            info!(path = %path, "reading events from file");
            RefreshService::new(pipeline, stacks.clone(), Arc::new(StdoutSink), Arc::new(LogTrigger))
                .with_collector(collector)
                .refresh(JsonLinesEventSource::new(path), &ctx)
                .await
                .context("Refresh from file failed")?
        }
        None => {
            let client = NatsClient::new(config.nats.clone())
                .await
                .context("Failed to connect to NATS")?;
            let publisher = Arc::new(NatsPublisher::new(client.clone()));
            let mut source = NatsEventSource::new(client, &ctx.account_id, &ctx.stack_id);
            if let Some(secs) = std::env::var("MAPPER_IDLE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
            {
                source = source.with_idle_timeout(Duration::from_secs(secs));
            }
            info!(subject = %source.subject(), "reading events from NATS");

            RefreshService::new(pipeline, stacks.clone(), publisher.clone(), publisher)
                .with_collector(collector)
                .refresh(source, &ctx)
                .await
                .context("Refresh from NATS failed")?
        }
    };

    match report {
        RefreshReport::Mapped(outcome) => {
            for warning in &outcome.warnings {
                warn!(%warning, "mapping warning");
            }
            info!(
                nodes = outcome.nodes.len(),
                asset_types = outcome.asset_types.len(),
                warnings = outcome.warnings.len(),
                "asset mapping complete"
            );
        }
        RefreshReport::EmptyState => info!("stack state is empty, no nodes written"),
        RefreshReport::StateDeleted => info!("stack state deleted"),
    }

    for (account_id, stack_id, update) in stacks.applied_updates().await {
        info!(%account_id, %stack_id, fields = ?update.fields(), "stack update");
    }

    Ok(())
}
