// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Common Provider Majority

use cim_iac_assets::ProviderObservation;
use proptest::prelude::*;

fn observations() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(&["a", "b", "c", "d"][..]), 0..40)
}

proptest! {
    /// Property: no provider is observed more often than the majority
    #[test]
    fn prop_majority_is_maximal(ids in observations()) {
        let observation: ProviderObservation = ids.iter().collect();

        match observation.majority() {
            None => prop_assert!(ids.is_empty()),
            Some(majority) => {
                let best = observation.count(majority);
                for id in &ids {
                    prop_assert!(observation.count(id) <= best);
                }
            }
        }
    }

    /// Property: among tied providers the first observed wins
    #[test]
    fn prop_tie_goes_to_first_seen(ids in observations()) {
        prop_assume!(!ids.is_empty());
        let observation: ProviderObservation = ids.iter().collect();
        let best = ids.iter().map(|id| observation.count(id)).max().unwrap_or(0);
        let first_max = ids.iter().find(|id| observation.count(id) == best).copied();

        prop_assert_eq!(observation.majority(), first_max);
    }

    /// Property: counts add up to the number of observations
    #[test]
    fn prop_counts_sum_to_total(ids in observations()) {
        let observation: ProviderObservation = ids.iter().collect();
        let total: usize = ["a", "b", "c", "d"].iter().map(|id| observation.count(id)).sum();
        prop_assert_eq!(total, ids.len());
    }
}
