//! End-to-end pipeline vectors against the reference worlds.
//!
//! Each scenario builds a full GateRequest in code, runs the pipeline,
//! and checks the terminal witness: its verdict, its failure classes,
//! and, for the determinism vectors, its exact serialized bytes.

use serde_json::{Value, json};
use sheafgate_kernel::cover::{Cover, CoverPartId, CoverStrategy, PartSpec};
use sheafgate_kernel::descent::{CompatWitness, GlueProposal, LocalState};
use sheafgate_kernel::gate::{GateRequest, run_gate};
use sheafgate_kernel::mode::{ModeBinding, OverlapLevel};
use sheafgate_kernel::refine::{RefinementAxis, next_step};
use sheafgate_kernel::toy::{IncomparableWorld, PairwiseOnlyWorld, SlotMapWorld, get_world};
use sheafgate_kernel::witness::failure_class;

fn two_part_strategy() -> CoverStrategy {
    CoverStrategy {
        strategy_id: "strategy.v1".into(),
        parts: vec![
            PartSpec {
                label: "alpha".into(),
                scope: vec!["x".into(), "shared".into()],
            },
            PartSpec {
                label: "beta".into(),
                scope: vec!["y".into(), "shared".into()],
            },
        ],
    }
}

fn local(part: &str, payload: Value) -> LocalState {
    LocalState {
        part: CoverPartId(part.into()),
        ctx_ref: "snap:1".into(),
        digest: format!("digest-{part}"),
        payload,
    }
}

fn proposal(id: &str, payload: Value) -> GlueProposal {
    GlueProposal {
        proposal_id: id.into(),
        payload,
    }
}

/// A request whose locals agree on the shared slot, with a witness for
/// the single pairwise obligation.
fn base_request() -> GateRequest {
    let strategy = two_part_strategy();
    let cover = Cover::build("ctx.main", &strategy).expect("cover builds");
    let obligations = cover.enumerate_overlaps(OverlapLevel::Pairwise);
    assert_eq!(obligations.len(), 1);

    GateRequest {
        world_id: "world.dev".into(),
        context_id: "ctx.main".into(),
        ctx_ref: "snap:1".into(),
        data_head_ref: "ev:1".into(),
        adapter_id: "taskgraph".into(),
        adapter_version: "0.1.0".into(),
        cover_strategy: strategy,
        locals: vec![
            local("part:alpha", json!({"x": 1, "shared": 7})),
            local("part:beta", json!({"y": 2, "shared": 7})),
        ],
        compat: vec![CompatWitness {
            overlap_id: obligations[0].overlap_id.clone(),
            parts: obligations[0].parts.clone(),
            digest: "wd-1".into(),
            payload: json!({"shared": 7}),
        }],
        glue_proposals: vec![proposal("proposal:1", json!({"x": 1, "y": 2, "shared": 7}))],
        mode: ModeBinding {
            normalizer_id: "normal_form.v1".into(),
            policy_digest: "policy.v1".into(),
        },
        overlap_level_requested: OverlapLevel::Pairwise,
    }
}

#[test]
fn compatible_locals_with_one_proposal_accept() {
    let witness = run_gate(&SlotMapWorld, &base_request()).unwrap();
    assert!(witness.is_accepted());
    assert!(witness.failures.is_empty());
    let glue = witness.glue.expect("accepted witness carries glue");
    assert_eq!(glue.selected, "proposal:1");
    assert_eq!(glue.contractibility_basis.proof_refs, vec!["proposal:1"]);
}

#[test]
fn missing_compat_witness_rejects_with_locality() {
    let mut request = base_request();
    request.compat.clear();
    let witness = run_gate(&SlotMapWorld, &request).unwrap();
    assert!(!witness.is_accepted());
    assert!(witness.glue.is_none());
    assert_eq!(
        witness.failure_classes(),
        vec![failure_class::LOCALITY_FAILURE]
    );
}

#[test]
fn zero_proposals_reject_with_descent() {
    let mut request = base_request();
    request.glue_proposals.clear();
    let witness = run_gate(&SlotMapWorld, &request).unwrap();
    assert!(!witness.is_accepted());
    assert_eq!(
        witness.failure_classes(),
        vec![failure_class::DESCENT_FAILURE]
    );
}

#[test]
fn two_inequivalent_survivors_reject_as_non_contractible() {
    let mut request = base_request();
    // Both candidates restrict to the locals (the cover never sees the
    // "extra" slot), but they differ as globals under byte equality.
    request.glue_proposals = vec![
        proposal("proposal:1", json!({"x": 1, "y": 2, "shared": 7, "extra": 0})),
        proposal("proposal:2", json!({"x": 1, "y": 2, "shared": 7, "extra": 1})),
    ];
    let witness = run_gate(&SlotMapWorld, &request).unwrap();
    assert!(!witness.is_accepted());
    assert_eq!(
        witness.failure_classes(),
        vec![failure_class::GLUE_NON_CONTRACTIBLE]
    );
}

#[test]
fn equivalent_duplicate_proposals_still_accept() {
    let mut request = base_request();
    request.glue_proposals = vec![
        proposal("proposal:z", json!({"x": 1, "y": 2, "shared": 7})),
        proposal("proposal:a", json!({"x": 1, "y": 2, "shared": 7})),
    ];
    let witness = run_gate(&SlotMapWorld, &request).unwrap();
    assert!(witness.is_accepted());
    let glue = witness.glue.unwrap();
    // Same payload digest for both; the id breaks the tie deterministically.
    assert_eq!(glue.selected, "proposal:a");
    assert_eq!(
        glue.contractibility_basis.proof_refs,
        vec!["proposal:a", "proposal:z"]
    );
}

#[test]
fn higher_cech_against_pairwise_world_rejects_with_level_diagnostics() {
    let mut request = base_request();
    request.overlap_level_requested = OverlapLevel::HigherCech;
    let witness = run_gate(&PairwiseOnlyWorld, &request).unwrap();
    assert!(!witness.is_accepted());
    assert_eq!(
        witness.failure_classes(),
        vec![failure_class::DESCENT_FAILURE]
    );
    let context = witness.failures[0].context.as_ref().unwrap();
    assert_eq!(context["overlapLevelRequested"], "higher_cech");
    assert_eq!(context["overlapLevelSupported"], "pairwise");
}

#[test]
fn higher_cech_against_capable_world_accepts() {
    let mut request = base_request();
    request.overlap_level_requested = OverlapLevel::HigherCech;
    // Two parts means no triple obligations; the capability gate is the
    // only difference, and slot_map advertises higher_cech.
    let witness = run_gate(&SlotMapWorld, &request).unwrap();
    assert!(witness.is_accepted());
}

#[test]
fn incomparable_normalizer_rejects_with_descent() {
    let witness = run_gate(&IncomparableWorld, &base_request()).unwrap();
    assert!(!witness.is_accepted());
    assert_eq!(
        witness.failure_classes(),
        vec![failure_class::DESCENT_FAILURE]
    );
}

#[test]
fn context_drift_rejects_with_stability() {
    let mut request = base_request();
    request.locals[1].ctx_ref = "snap:2".into();
    let witness = run_gate(&SlotMapWorld, &request).unwrap();
    assert!(!witness.is_accepted());
    assert_eq!(
        witness.failure_classes(),
        vec![failure_class::STABILITY_FAILURE]
    );
}

#[test]
fn locality_precedes_descent_even_with_zero_proposals() {
    let mut request = base_request();
    request.locals.remove(1);
    request.glue_proposals.clear();
    let witness = run_gate(&SlotMapWorld, &request).unwrap();
    assert_eq!(
        witness.failure_classes(),
        vec![failure_class::LOCALITY_FAILURE]
    );
}

#[test]
fn identical_runs_produce_identical_witness_bytes() {
    let request = base_request();
    let first = run_gate(&SlotMapWorld, &request).unwrap();
    let second = run_gate(&SlotMapWorld, &request).unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );

    let mut rejected = base_request();
    rejected.compat.clear();
    let first = run_gate(&SlotMapWorld, &rejected).unwrap();
    let second = run_gate(&SlotMapWorld, &rejected).unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn input_permutation_does_not_change_the_witness() {
    let mut permuted = base_request();
    permuted.locals.reverse();
    permuted.glue_proposals = vec![
        proposal("proposal:extra", json!({"x": 0, "y": 2, "shared": 7})),
        proposal("proposal:1", json!({"x": 1, "y": 2, "shared": 7})),
    ];
    let mut straight = base_request();
    straight.glue_proposals = vec![
        proposal("proposal:1", json!({"x": 1, "y": 2, "shared": 7})),
        proposal("proposal:extra", json!({"x": 0, "y": 2, "shared": 7})),
    ];

    let a = run_gate(&SlotMapWorld, &straight).unwrap();
    let b = run_gate(&SlotMapWorld, &permuted).unwrap();
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn exactly_one_law_holds_across_verdicts() {
    let accepted = run_gate(&SlotMapWorld, &base_request()).unwrap();
    assert!(accepted.glue.is_some() && accepted.failures.is_empty());

    let mut request = base_request();
    request.compat.clear();
    let rejected = run_gate(&SlotMapWorld, &request).unwrap();
    assert!(rejected.glue.is_none() && !rejected.failures.is_empty());
}

#[test]
fn rejection_feeds_the_refinement_ladder() {
    let mut request = base_request();
    request.compat.clear();
    let witness = run_gate(&SlotMapWorld, &request).unwrap();

    let step = next_step(&witness, &[]).expect("rejected witness proposes a step");
    assert_eq!(step.refinement_axis, RefinementAxis::Cover);
    assert_eq!(step.parent_run_id, witness.run_id);
}

#[test]
fn gate_request_round_trips_through_json() {
    let request = base_request();
    let encoded = serde_json::to_string(&request).unwrap();
    let decoded: GateRequest = serde_json::from_str(&encoded).unwrap();
    assert_eq!(request, decoded);

    // The world registry resolves the reference worlds by name.
    let world = get_world("slot_map").unwrap();
    let witness = run_gate(world.as_ref(), &decoded).unwrap();
    assert!(witness.is_accepted());
}
