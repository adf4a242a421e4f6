//! The refinement ladder: bounded, deterministic retry across runs.
//!
//! Nothing is retried inside one check. When a run rejects, the caller
//! may construct a successor run that changes exactly one identity axis,
//! chosen from a fixed priority order:
//!
//! 1. cover refinement: locality or descent gaps
//! 2. context refinement: instability under context change
//! 3. evidence enrichment: persistent ambiguity (a newer adapter
//!    strengthens the compatibility payloads)
//! 4. policy refinement: an explicit semantic-mode change, which opens
//!    a new comparability boundary
//!
//! Given the same rejection and the same history, the same next step is
//! always proposed; exhausting the ladder yields None, never a loop.

use crate::identity::RunIdentity;
use crate::error::KernelError;
use crate::witness::{GateWitness, failure_class};
use serde::{Deserialize, Serialize};

/// The identity axis a refinement step changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefinementAxis {
    #[serde(rename = "cover_id")]
    Cover,
    #[serde(rename = "ctx_ref")]
    CtxRef,
    #[serde(rename = "adapter_version")]
    AdapterVersion,
    #[serde(rename = "mode")]
    Mode,
}

impl RefinementAxis {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cover => "cover_id",
            Self::CtxRef => "ctx_ref",
            Self::AdapterVersion => "adapter_version",
            Self::Mode => "mode",
        }
    }
}

impl std::fmt::Display for RefinementAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RefinementAxis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cover_id" => Ok(Self::Cover),
            "ctx_ref" => Ok(Self::CtxRef),
            "adapter_version" => Ok(Self::AdapterVersion),
            "mode" => Ok(Self::Mode),
            _ => Err(format!("unknown refinement axis: {s}")),
        }
    }
}

/// One link in a refinement chain. `parent_run_id` is a lookup key into
/// the caller's append-only run store, not an owning pointer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RefinementStep {
    pub parent_run_id: String,
    pub refinement_axis: RefinementAxis,
}

/// Escalation order. Starts at the axis the rejection indicates and
/// walks toward policy refinement.
const LADDER: [RefinementAxis; 4] = [
    RefinementAxis::Cover,
    RefinementAxis::CtxRef,
    RefinementAxis::AdapterVersion,
    RefinementAxis::Mode,
];

/// The first axis the rejection's failure classes point at.
fn indicated_axis(witness: &GateWitness) -> Option<RefinementAxis> {
    let classes = witness.failure_classes();
    if classes
        .iter()
        .any(|c| *c == failure_class::LOCALITY_FAILURE || *c == failure_class::DESCENT_FAILURE)
    {
        return Some(RefinementAxis::Cover);
    }
    if classes
        .iter()
        .any(|c| *c == failure_class::STABILITY_FAILURE)
    {
        return Some(RefinementAxis::CtxRef);
    }
    if classes
        .iter()
        .any(|c| *c == failure_class::GLUE_NON_CONTRACTIBLE)
    {
        return Some(RefinementAxis::AdapterVersion);
    }
    None
}

/// Propose the next refinement step for a rejected witness.
///
/// `tried` is the set of axes already attempted in this chain. Returns
/// None for accepted witnesses and when the ladder is exhausted; the
/// caller then records the terminal reject as final.
pub fn next_step(witness: &GateWitness, tried: &[RefinementAxis]) -> Option<RefinementStep> {
    if witness.is_accepted() {
        return None;
    }
    let start = indicated_axis(witness)?;
    let start_idx = LADDER
        .iter()
        .position(|axis| *axis == start)
        .unwrap_or(0);

    LADDER[start_idx..]
        .iter()
        .find(|axis| !tried.contains(axis))
        .map(|axis| RefinementStep {
            parent_run_id: witness.run_id.clone(),
            refinement_axis: *axis,
        })
}

/// Enforce the one-axis law between two consecutive run identities.
///
/// The mode axis groups `normalizer_id`, `policy_digest`, and the
/// negotiated overlap level (the level is bound into the policy); the
/// context axis groups `ctx_ref` with `data_head_ref` (a new snapshot
/// moves the data head with it). Everything else is pinned across a
/// refinement chain.
pub fn verify_one_axis(
    parent: &RunIdentity,
    child: &RunIdentity,
) -> Result<RefinementAxis, KernelError> {
    if parent.world_id != child.world_id
        || parent.context_id != child.context_id
        || parent.adapter_id != child.adapter_id
    {
        return Err(KernelError::Refinement(
            "refinement must stay within one world, context, and adapter".to_string(),
        ));
    }

    let mut changed = Vec::new();
    if parent.cover_id != child.cover_id {
        changed.push(RefinementAxis::Cover);
    }
    if parent.ctx_ref != child.ctx_ref || parent.data_head_ref != child.data_head_ref {
        changed.push(RefinementAxis::CtxRef);
    }
    if parent.adapter_version != child.adapter_version {
        changed.push(RefinementAxis::AdapterVersion);
    }
    if parent.normalizer_id != child.normalizer_id
        || parent.policy_digest != child.policy_digest
        || parent.overlap_level_requested != child.overlap_level_requested
    {
        changed.push(RefinementAxis::Mode);
    }

    match changed.as_slice() {
        [axis] => Ok(*axis),
        [] => Err(KernelError::Refinement(
            "refinement step changes no identity axis".to_string(),
        )),
        axes => Err(KernelError::Refinement(format!(
            "refinement step changes {} identity axes; exactly one is allowed",
            axes.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::OverlapLevel;
    use crate::witness::{GateFailure, Phase, ResponsibleComponent};

    fn identity() -> RunIdentity {
        RunIdentity {
            world_id: "world.dev".into(),
            context_id: "ctx.main".into(),
            cover_id: "cover1_abc".into(),
            ctx_ref: "snap:abcd".into(),
            data_head_ref: "ev:100".into(),
            adapter_id: "taskgraph".into(),
            adapter_version: "0.1.0".into(),
            normalizer_id: "normal_form.v1".into(),
            policy_digest: "policy.deadbeef".into(),
            overlap_level_requested: OverlapLevel::Pairwise,
        }
    }

    fn rejected_with(class: &str) -> GateWitness {
        let failure = GateFailure::new(
            class,
            Phase::Compat,
            ResponsibleComponent::Adapter,
            "synthetic",
            None,
            None,
        );
        GateWitness::rejected(&identity(), vec![failure])
    }

    #[test]
    fn locality_rejection_indicates_cover_axis() {
        let witness = rejected_with(failure_class::LOCALITY_FAILURE);
        let step = next_step(&witness, &[]).unwrap();
        assert_eq!(step.refinement_axis, RefinementAxis::Cover);
        assert_eq!(step.parent_run_id, witness.run_id);
    }

    #[test]
    fn stability_rejection_indicates_context_axis() {
        let witness = rejected_with(failure_class::STABILITY_FAILURE);
        let step = next_step(&witness, &[]).unwrap();
        assert_eq!(step.refinement_axis, RefinementAxis::CtxRef);
    }

    #[test]
    fn ambiguity_rejection_indicates_evidence_axis() {
        let witness = rejected_with(failure_class::GLUE_NON_CONTRACTIBLE);
        let step = next_step(&witness, &[]).unwrap();
        assert_eq!(step.refinement_axis, RefinementAxis::AdapterVersion);
    }

    #[test]
    fn ladder_escalates_past_tried_axes_and_exhausts() {
        let witness = rejected_with(failure_class::DESCENT_FAILURE);

        let step = next_step(&witness, &[RefinementAxis::Cover]).unwrap();
        assert_eq!(step.refinement_axis, RefinementAxis::CtxRef);

        let step = next_step(
            &witness,
            &[
                RefinementAxis::Cover,
                RefinementAxis::CtxRef,
                RefinementAxis::AdapterVersion,
            ],
        )
        .unwrap();
        assert_eq!(step.refinement_axis, RefinementAxis::Mode);

        assert!(next_step(&witness, &LADDER).is_none());
    }

    #[test]
    fn same_rejection_proposes_same_step() {
        let witness = rejected_with(failure_class::DESCENT_FAILURE);
        let a = next_step(&witness, &[]).unwrap();
        let b = next_step(&witness, &[]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn one_axis_change_verifies() {
        let parent = identity();
        let mut child = identity();
        child.cover_id = "cover1_finer".into();
        assert_eq!(
            verify_one_axis(&parent, &child).unwrap(),
            RefinementAxis::Cover
        );
    }

    #[test]
    fn ctx_and_data_head_move_together_as_one_axis() {
        let parent = identity();
        let mut child = identity();
        child.ctx_ref = "snap:efgh".into();
        child.data_head_ref = "ev:200".into();
        assert_eq!(
            verify_one_axis(&parent, &child).unwrap(),
            RefinementAxis::CtxRef
        );
    }

    #[test]
    fn zero_or_two_axis_changes_are_rejected() {
        let parent = identity();
        assert!(verify_one_axis(&parent, &identity()).is_err());

        let mut child = identity();
        child.cover_id = "cover1_finer".into();
        child.adapter_version = "0.2.0".into();
        assert!(verify_one_axis(&parent, &child).is_err());
    }

    #[test]
    fn identity_drift_outside_axes_is_rejected() {
        let parent = identity();
        let mut child = identity();
        child.world_id = "world.other".into();
        child.cover_id = "cover1_finer".into();
        assert!(verify_one_axis(&parent, &child).is_err());
    }

    #[test]
    fn accepted_witness_needs_no_refinement() {
        use crate::descent::{ContractibilityBasis, GlueMethod, GlueResult};
        let witness = GateWitness::accepted(
            &identity(),
            GlueResult {
                selected: "p1".into(),
                contractibility_basis: ContractibilityBasis {
                    mode: identity().mode(),
                    method: GlueMethod::NormalForm,
                    proof_refs: vec!["p1".into()],
                },
            },
        );
        assert!(next_step(&witness, &[]).is_none());
    }
}
