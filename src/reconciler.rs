// Copyright (c) 2025 - Cowboy AI, Inc.
//! Common Provider Reconciliation
//!
//! Counts how many nodes of a run belong to each provider account (cloud) or
//! cluster, picks the majority, and diffs it against the integration binding
//! the stack currently records. The result is a field-level [`StackUpdate`];
//! this module never writes it.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use crate::domain::ProviderFamily;
use crate::store::{IntegrationBinding, StackUpdate};

/// Stack field stamped on every non-empty update
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Per-run observation counts, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderObservation {
    counts: Vec<(String, usize)>,
}

impl ProviderObservation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one resource attributed to `provider_id`
    pub fn record(&mut self, provider_id: &str) {
        match self.counts.iter_mut().find(|(id, _)| id == provider_id) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((provider_id.to_string(), 1)),
        }
    }

    pub fn count(&self, provider_id: &str) -> usize {
        self.counts
            .iter()
            .find(|(id, _)| id == provider_id)
            .map_or(0, |(_, count)| *count)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Most observed provider id; the first seen wins a tie
    pub fn majority(&self) -> Option<&str> {
        let mut best: Option<&(String, usize)> = None;
        for entry in &self.counts {
            if best.map_or(true, |(_, count)| entry.1 > *count) {
                best = Some(entry);
            }
        }
        best.map(|(id, _)| id.as_str())
    }
}

impl<S: AsRef<str>> FromIterator<S> for ProviderObservation {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut observation = Self::new();
        for id in iter {
            observation.record(id.as_ref());
        }
        observation
    }
}

/// Proposes stack binding updates from a run's observations
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonProviderReconciler;

impl CommonProviderReconciler {
    pub fn new() -> Self {
        Self
    }

    /// Field updates for one family, stamped with the current time
    pub fn reconcile<F>(
        &self,
        family: ProviderFamily,
        observation: &ProviderObservation,
        binding: Option<&IntegrationBinding>,
        resolve_integration: F,
    ) -> StackUpdate
    where
        F: FnOnce(&str) -> Option<String>,
    {
        self.reconcile_at(family, observation, binding, resolve_integration, Utc::now())
    }

    /// Field updates for one family, stamped with `now`
    pub fn reconcile_at<F>(
        &self,
        family: ProviderFamily,
        observation: &ProviderObservation,
        binding: Option<&IntegrationBinding>,
        resolve_integration: F,
        now: DateTime<Utc>,
    ) -> StackUpdate
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let mut update = StackUpdate::new();
        let Some(majority) = observation.majority() else {
            return update;
        };
        let integration_id = resolve_integration(majority);
        let external_field = format!("integrations.{}.externalId", family.as_str());
        let id_field = format!("integrations.{}.id", family.as_str());

        match binding {
            None => {
                update.set(external_field, majority);
                if let Some(id) = integration_id {
                    update.set(id_field, id);
                }
            }
            Some(binding) => {
                if binding.external_id.as_deref() != Some(majority) {
                    update.set(external_field, majority);
                }
                if let Some(id) = integration_id {
                    if binding.integration_id.as_deref() != Some(id.as_str()) {
                        update.set(id_field, id);
                    }
                }
            }
        }

        if !update.is_empty() {
            update.set(
                UPDATED_AT_FIELD,
                now.to_rfc3339_opts(SecondsFormat::Secs, true),
            );
        }
        debug!(family = %family, majority, fields = update.fields().len(), "reconciled common provider");
        update
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 19, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_majority_and_tie_break() {
        let observation: ProviderObservation = ["A", "B", "A", "B", "B"].into_iter().collect();
        assert_eq!(observation.majority(), Some("B"));
        assert_eq!(observation.count("A"), 2);

        let tied: ProviderObservation = ["A", "B", "B", "A"].into_iter().collect();
        assert_eq!(tied.majority(), Some("A"));

        assert_eq!(ProviderObservation::new().majority(), None);
    }

    #[test]
    fn test_no_binding_proposes_majority() {
        let mut observation = ProviderObservation::new();
        for _ in 0..3 {
            observation.record("A");
        }
        for _ in 0..5 {
            observation.record("B");
        }

        let update = CommonProviderReconciler::new().reconcile_at(
            ProviderFamily::Aws,
            &observation,
            None,
            |account| (account == "B").then(|| "int-b".to_string()),
            now(),
        );

        assert_eq!(update.get("integrations.aws.externalId"), Some(&json!("B")));
        assert_eq!(update.get("integrations.aws.id"), Some(&json!("int-b")));
        assert_eq!(update.get(UPDATED_AT_FIELD), Some(&json!("2026-01-19T12:00:00Z")));
    }

    #[test]
    fn test_matching_binding_proposes_nothing() {
        let observation: ProviderObservation = ["c-1"].into_iter().collect();
        let binding = IntegrationBinding {
            external_id: Some("c-1".to_string()),
            integration_id: Some("k8s-int".to_string()),
        };

        let update = CommonProviderReconciler::new().reconcile_at(
            ProviderFamily::Kubernetes,
            &observation,
            Some(&binding),
            |_| Some("k8s-int".to_string()),
            now(),
        );
        assert!(update.is_empty());
    }

    #[test]
    fn test_differing_binding_is_updated() {
        let observation: ProviderObservation = ["222"].into_iter().collect();
        let binding = IntegrationBinding {
            external_id: Some("111".to_string()),
            integration_id: Some("int-1".to_string()),
        };

        let update = CommonProviderReconciler::new().reconcile_at(
            ProviderFamily::Aws,
            &observation,
            Some(&binding),
            |_| None,
            now(),
        );

        assert_eq!(update.get("integrations.aws.externalId"), Some(&json!("222")));
        assert!(update.get("integrations.aws.id").is_none());
        assert!(update.get(UPDATED_AT_FIELD).is_some());
    }

    #[test]
    fn test_integration_change_only() {
        let observation: ProviderObservation = ["111"].into_iter().collect();
        let binding = IntegrationBinding {
            external_id: Some("111".to_string()),
            integration_id: Some("int-old".to_string()),
        };

        let update = CommonProviderReconciler::new().reconcile_at(
            ProviderFamily::Aws,
            &observation,
            Some(&binding),
            |_| Some("int-new".to_string()),
            now(),
        );

        assert!(update.get("integrations.aws.externalId").is_none());
        assert_eq!(update.get("integrations.aws.id"), Some(&json!("int-new")));
    }

    #[test]
    fn test_empty_observation_proposes_nothing() {
        let update = CommonProviderReconciler::new().reconcile(
            ProviderFamily::Aws,
            &ProviderObservation::new(),
            None,
            |_| None,
        );
        assert!(update.is_empty());
    }
}
