// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Cluster Identity
//!
//! Cluster identifiers are decided per run, so the order in which cluster
//! objects arrive must never change the identifiers they end up with.

use cim_iac_assets::domain::value::property_map;
use cim_iac_assets::store::{InMemoryIntegrationStore, InMemoryStackStore, StackRecord};
use cim_iac_assets::{
    ChangeEvent, MappingPipeline, ObservedState, RunContext, StepMetadata, StepOp,
};
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

const KINDS: &[&str] = &["Deployment", "Service", "ConfigMap", "Namespace"];

#[derive(Debug, Clone)]
struct ClusterObject {
    uid: String,
    kind: &'static str,
    name: String,
    namespace: Option<String>,
}

impl ClusterObject {
    fn event(&self) -> ChangeEvent {
        let mut metadata = json!({ "name": self.name, "uid": self.uid });
        if let Some(namespace) = &self.namespace {
            metadata["namespace"] = json!(namespace);
        }

        ChangeEvent::outputs_recorded(
            StepMetadata::new(format!("kubernetes:core/v1:{}", self.kind), StepOp::Same).with_new(
                ObservedState::from_outputs(property_map(json!({
                    "kind": self.kind,
                    "metadata": metadata,
                }))),
            ),
        )
    }
}

fn cluster_objects() -> impl Strategy<Value = Vec<ClusterObject>> {
    prop::collection::vec(
        (
            prop::sample::select(KINDS),
            "[a-z]{1,8}",
            prop::option::of("[a-z]{1,6}"),
        ),
        1..8,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (kind, name, namespace))| ClusterObject {
                uid: format!("uid-{}", i),
                kind,
                name,
                namespace,
            })
            .collect()
    })
}

fn original_and_shuffled() -> impl Strategy<Value = (Vec<ClusterObject>, Vec<ClusterObject>)> {
    cluster_objects().prop_flat_map(|objects| (Just(objects.clone()), Just(objects).prop_shuffle()))
}

fn sorted_arns(integrations: InMemoryIntegrationStore, objects: &[ClusterObject]) -> Vec<String> {
    let pipeline = MappingPipeline::new(
        Arc::new(integrations),
        Arc::new(InMemoryStackStore::new().with_stack("acc", StackRecord::new("stack"))),
    );
    let mut events: Vec<ChangeEvent> = objects.iter().map(ClusterObject::event).collect();
    events.push(ChangeEvent::summary());

    let outcome = tokio_test::block_on(pipeline.map(&events, &RunContext::new("acc", "stack")))
        .expect("mapping succeeds");
    let mut arns: Vec<String> = outcome.nodes.into_iter().map(|node| node.arn).collect();
    arns.sort();
    arns
}

proptest! {
    /// Property: without a matching integration, order never changes the identifiers
    #[test]
    fn prop_fallback_identity_is_order_invariant((original, shuffled) in original_and_shuffled()) {
        let first = sorted_arns(InMemoryIntegrationStore::new(), &original);
        let second = sorted_arns(InMemoryIntegrationStore::new(), &shuffled);

        prop_assert_eq!(first.len(), original.len());
        prop_assert_eq!(first, second);
    }

    /// Property: with a single matching integration every node carries its cluster id
    #[test]
    fn prop_resolved_identity_is_order_invariant((original, shuffled) in original_and_shuffled()) {
        let store = |objects: &[ClusterObject]| {
            objects.iter().fold(
                InMemoryIntegrationStore::new().with_cluster("k8s-int", "prod"),
                |store, object| store.with_cluster_object("k8s-int", &object.uid, object.kind),
            )
        };

        let first = sorted_arns(store(&original), &original);
        let second = sorted_arns(store(&shuffled), &shuffled);

        prop_assert!(first.iter().all(|arn| arn.starts_with("arn:k8s:prod:")));
        prop_assert_eq!(first, second);
    }
}
