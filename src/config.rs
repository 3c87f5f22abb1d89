// Copyright (c) 2025 - Cowboy AI, Inc.
//! Mapper configuration

use crate::cluster::FALLBACK_CLUSTER_ID;
use crate::collector::DEFAULT_CHANNEL_CAPACITY;
use crate::context::DEFAULT_IAC;
use crate::errors::{MapperError, MapperResult};
use crate::mapper::GLOBAL_REGION;
use crate::nats::NatsConfig;

/// Configuration of a mapping run
#[derive(Debug, Clone)]
pub struct MapperConfig {
    /// IaC engine name written to every node
    pub iac_name: String,
    /// Buffer size of the event collector channel
    pub collector_capacity: usize,
    /// Cluster id used when no cluster integration matches
    pub cluster_fallback_id: String,
    /// Region of cloud identifiers without a location segment
    pub global_region: String,
    /// NATS transport
    pub nats: NatsConfig,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            iac_name: DEFAULT_IAC.to_string(),
            collector_capacity: DEFAULT_CHANNEL_CAPACITY,
            cluster_fallback_id: FALLBACK_CLUSTER_ID.to_string(),
            global_region: GLOBAL_REGION.to_string(),
            nats: NatsConfig::default(),
        }
    }
}

impl MapperConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> MapperResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> MapperResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let collector_capacity = match lookup("MAPPER_CHANNEL_CAPACITY") {
            Some(raw) => {
                let capacity: usize = raw.trim().parse().map_err(|_| {
                    MapperError::Configuration(format!(
                        "MAPPER_CHANNEL_CAPACITY must be a positive integer, got '{}'",
                        raw
                    ))
                })?;
                if capacity == 0 {
                    return Err(MapperError::Configuration(
                        "MAPPER_CHANNEL_CAPACITY must be greater than zero".to_string(),
                    ));
                }
                capacity
            }
            None => defaults.collector_capacity,
        };

        let mut nats = defaults.nats;
        if let Some(url) = lookup("NATS_URL") {
            nats.servers = url
                .split(',')
                .map(str::trim)
                .filter(|server| !server.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(name) = lookup("NATS_NAME") {
            nats.name = name;
        }
        if let Some(root) = lookup("NATS_SUBJECT_ROOT") {
            nats.subject_root = root;
        }

        Ok(Self {
            iac_name: lookup("IAC_NAME").unwrap_or(defaults.iac_name),
            collector_capacity,
            cluster_fallback_id: defaults.cluster_fallback_id,
            global_region: defaults.global_region,
            nats,
        })
    }
}
