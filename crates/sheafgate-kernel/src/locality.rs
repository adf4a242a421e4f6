//! Locality checking: presence and shape, never content.
//!
//! Every cover part needs a supplied local state; every required overlap
//! obligation needs a present, structurally valid compatibility witness.
//! Whether the witnessed compatibility actually holds is re-evaluated
//! later by descent-existence; this pass only establishes that the
//! descent core is complete enough to check.
//!
//! Locals are also pinned to the run's context snapshot here: a local
//! produced against a different snapshot is reindexing instability, not
//! a missing input.

use crate::cover::OverlapObligation;
use crate::descent::DescentCore;
use crate::witness::{GateFailure, Phase, ResponsibleComponent, failure_class};
use serde_json::json;
use std::collections::BTreeMap;

/// Check the structural completeness of a descent core.
///
/// Returns every locality/stability failure found; per-part checks are
/// order-independent, so callers may gather inputs in any order without
/// changing the outcome.
pub fn check_locality(
    core: &DescentCore,
    ctx_ref: &str,
    obligations: &[OverlapObligation],
) -> Vec<GateFailure> {
    let mut failures = Vec::new();

    for part in &core.cover.parts {
        match core.locals.get(&part.id) {
            None => failures.push(GateFailure::new(
                failure_class::LOCALITY_FAILURE,
                Phase::Restrict,
                ResponsibleComponent::Adapter,
                "missing local state for a required cover part",
                Some(format!("locals/{}", part.id)),
                Some(json!({"part": part.id.as_str()})),
            )),
            Some(local) => {
                if local.ctx_ref != ctx_ref {
                    failures.push(GateFailure::new(
                        failure_class::STABILITY_FAILURE,
                        Phase::Restrict,
                        ResponsibleComponent::ContextProvider,
                        "local state was produced against a different context snapshot",
                        Some(format!("locals/{}", part.id)),
                        Some(json!({
                            "part": part.id.as_str(),
                            "localCtxRef": local.ctx_ref,
                            "runCtxRef": ctx_ref,
                        })),
                    ));
                }
            }
        }
    }

    for part_id in core.locals.keys() {
        if core.cover.part(part_id).is_none() {
            failures.push(GateFailure::new(
                failure_class::LOCALITY_FAILURE,
                Phase::Restrict,
                ResponsibleComponent::Adapter,
                "local state names a part outside the kernel-owned cover",
                Some(format!("locals/{part_id}")),
                Some(json!({"part": part_id.as_str()})),
            ));
        }
    }

    let required: BTreeMap<&str, &OverlapObligation> = obligations
        .iter()
        .map(|o| (o.overlap_id.as_str(), o))
        .collect();

    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    for witness in &core.compat {
        let overlap_id = witness.overlap_id.as_str();
        if !required.contains_key(overlap_id) {
            failures.push(GateFailure::new(
                failure_class::LOCALITY_FAILURE,
                Phase::Compat,
                ResponsibleComponent::Adapter,
                "compat witness names an overlap the kernel did not define",
                Some(format!("compat/{overlap_id}")),
                Some(json!({"overlapId": overlap_id})),
            ));
            continue;
        }
        *seen.entry(overlap_id).or_insert(0) += 1;
    }
    for (overlap_id, count) in &seen {
        if *count > 1 {
            failures.push(GateFailure::new(
                failure_class::LOCALITY_FAILURE,
                Phase::Compat,
                ResponsibleComponent::Adapter,
                "conflicting compat witnesses supplied for one overlap obligation",
                Some(format!("compat/{overlap_id}")),
                Some(json!({"overlapId": overlap_id, "witnessCount": count})),
            ));
        }
    }

    for obligation in obligations {
        let witness = core
            .compat
            .iter()
            .find(|w| w.overlap_id == obligation.overlap_id);
        match witness {
            None => failures.push(GateFailure::new(
                failure_class::LOCALITY_FAILURE,
                Phase::Compat,
                ResponsibleComponent::Adapter,
                "missing compat witness for a required overlap obligation",
                Some(format!("compat/{}", obligation.overlap_id)),
                Some(json!({
                    "overlapId": obligation.overlap_id,
                    "overlapArity": obligation.arity,
                })),
            )),
            Some(witness) => {
                if witness.parts != obligation.parts {
                    failures.push(GateFailure::new(
                        failure_class::LOCALITY_FAILURE,
                        Phase::Compat,
                        ResponsibleComponent::Adapter,
                        "compat witness part tuple does not match the obligation",
                        Some(format!("compat/{}", obligation.overlap_id)),
                        Some(json!({
                            "overlapId": obligation.overlap_id,
                            "overlapArity": obligation.arity,
                        })),
                    ));
                } else if witness.payload.is_null() {
                    failures.push(GateFailure::new(
                        failure_class::LOCALITY_FAILURE,
                        Phase::Compat,
                        ResponsibleComponent::Adapter,
                        "compat witness carries no evidence payload",
                        Some(format!("compat/{}", obligation.overlap_id)),
                        Some(json!({
                            "overlapId": obligation.overlap_id,
                            "overlapArity": obligation.arity,
                        })),
                    ));
                }
            }
        }
    }

    failures
}
