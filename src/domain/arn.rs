// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stable Resource Identifiers
//!
//! Cloud resources carry a provider-issued ARN. Cluster resources do not, so a
//! deterministic ARN-shaped identifier is synthesized for them once the owning
//! cluster is known.
//!
//! ```text
//! arn:{partition}:{service}:{region}:{account}:{resource}
//! arn:k8s:{cluster}:{namespace}:{kind}/{name}
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix shared by every ARN-shaped identifier
pub const ARN_PREFIX: &str = "arn";

/// Partition used for synthesized cluster identifiers
pub const CLUSTER_PARTITION: &str = "k8s";

/// Errors raised while parsing an ARN
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArnError {
    /// Input does not start with `arn:`
    #[error("Not an ARN: {0}")]
    MissingPrefix(String),

    /// Fewer than six colon separated sections
    #[error("ARN has too few sections: {0}")]
    TooFewSections(String),

    /// A mandatory section is empty
    #[error("ARN section '{section}' is empty in {arn}")]
    EmptySection { section: &'static str, arn: String },
}

/// Parsed cloud resource identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Arn {
    pub partition: String,
    pub service: String,
    /// Region / location; empty for global services such as S3 or IAM
    pub region: String,
    /// Owning account; empty for some global resources
    pub account_id: String,
    pub resource: String,
}

impl Arn {
    /// Parse an ARN string
    pub fn parse(input: &str) -> Result<Self, ArnError> {
        let mut sections = input.splitn(6, ':');

        if sections.next() != Some(ARN_PREFIX) {
            return Err(ArnError::MissingPrefix(input.to_string()));
        }

        let parts: Vec<&str> = sections.collect();
        if parts.len() < 5 {
            return Err(ArnError::TooFewSections(input.to_string()));
        }

        let arn = Self {
            partition: parts[0].to_string(),
            service: parts[1].to_string(),
            region: parts[2].to_string(),
            account_id: parts[3].to_string(),
            resource: parts[4].to_string(),
        };

        for (section, value) in [
            ("partition", &arn.partition),
            ("service", &arn.service),
            ("resource", &arn.resource),
        ] {
            if value.is_empty() {
                return Err(ArnError::EmptySection {
                    section,
                    arn: input.to_string(),
                });
            }
        }

        Ok(arn)
    }

    /// Region, or `default_region` when the ARN carries no location segment
    pub fn region_or<'a>(&'a self, default_region: &'a str) -> &'a str {
        if self.region.is_empty() {
            default_region
        } else {
            &self.region
        }
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}:{}",
            ARN_PREFIX, self.partition, self.service, self.region, self.account_id, self.resource
        )
    }
}

/// Derive `(account_id, region)` from a cloud ARN.
///
/// Region falls back to `default_region` (normally `"global"`).
pub fn account_and_region(arn: &str, default_region: &str) -> Result<(String, String), ArnError> {
    let parsed = Arn::parse(arn)?;
    let region = parsed.region_or(default_region).to_string();
    Ok((parsed.account_id, region))
}

/// Synthesize the stable identifier of a cluster object.
///
/// A cluster-scoped object keeps an empty namespace segment so the identifier
/// stays positional.
pub fn cluster_arn(namespace: &str, cluster_id: &str, kind: &str, name: &str) -> String {
    format!(
        "{}:{}:{}:{}:{}/{}",
        ARN_PREFIX, CLUSTER_PARTITION, cluster_id, namespace, kind, name
    )
}
