// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Step Selection

use cim_iac_assets::domain::value::property_map;
use cim_iac_assets::{
    ChangeEvent, MapOutcome, NodeMapper, ObservedState, RunContext, SkipReason, StepMetadata,
    StepOp,
};
use proptest::prelude::*;
use serde_json::json;

fn non_terminal_op() -> impl Strategy<Value = StepOp> {
    prop::sample::select(vec![
        StepOp::Create,
        StepOp::Replace,
        StepOp::CreateReplacement,
        StepOp::DeleteReplaced,
        StepOp::Read,
        StepOp::ReadReplacement,
        StepOp::Refresh,
        StepOp::Import,
        StepOp::Other,
    ])
}

fn resource_type() -> impl Strategy<Value = &'static str> {
    prop::sample::select(
        &[
            "aws:s3/bucket:Bucket",
            "aws:sqs/queue:Queue",
            "kubernetes:apps/v1:Deployment",
            "kubernetes:core/v1:Service",
        ][..],
    )
}

fn observed(name: &str) -> ObservedState {
    ObservedState::from_outputs(property_map(json!({
        "arn": format!("arn:aws:s3:::{}", name),
        "kind": "Deployment",
        "metadata": { "name": name, "uid": format!("uid-{}", name), "namespace": "default" },
    })))
}

fn event(resource_type: &str, op: StepOp, name: &str, outputs_recorded: bool) -> ChangeEvent {
    let metadata = StepMetadata::new(resource_type, op)
        .with_old(observed(name))
        .with_new(observed(name));
    if outputs_recorded {
        ChangeEvent::outputs_recorded(metadata)
    } else {
        ChangeEvent::pre_step(metadata)
    }
}

proptest! {
    /// Property: non-terminal operations are skipped silently
    #[test]
    fn prop_non_terminal_ops_produce_nothing(
        op in non_terminal_op(),
        resource_type in resource_type(),
        name in "[a-z]{1,12}",
        outputs_recorded in any::<bool>(),
    ) {
        let mapped = NodeMapper::default()
            .map_event(&event(resource_type, op, &name, outputs_recorded), &RunContext::new("acc", "stack"));

        prop_assert!(
            matches!(mapped.outcome, MapOutcome::Skipped(SkipReason::NonTerminalOp(skipped)) if skipped == op)
        );
        prop_assert!(mapped.warnings.is_empty());
    }

    /// Property: unchanged and deleted resources always produce a node
    #[test]
    fn prop_same_and_delete_produce_nodes(
        op in prop::sample::select(vec![StepOp::Same, StepOp::Delete]),
        resource_type in resource_type(),
        name in "[a-z]{1,12}",
    ) {
        let mapped = NodeMapper::default()
            .map_event(&event(resource_type, op, &name, false), &RunContext::new("acc", "stack"));

        prop_assert!(!mapped.is_skipped());
    }
}
