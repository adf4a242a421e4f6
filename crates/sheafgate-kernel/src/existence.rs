//! Descent-existence: does any structurally valid global assembly exist?
//!
//! Runs only on a core that passed locality. Every discharged compat
//! witness is re-evaluated through the world: the kernel does not trust
//! adapter evidence, it replays the restriction-and-compare the evidence
//! claims to summarize. Under `higher_cech`, arity-3 obligations get the
//! cocycle coherence pass. Surviving glue proposals are the ones whose
//! restriction to every part matches that part's local under Mode.

use crate::cover::OverlapObligation;
use crate::descent::{DescentCore, GlueProposal};
use crate::witness::{GateFailure, Phase, ResponsibleComponent, failure_class};
use crate::world::World;
use serde_json::json;

/// Outcome of the descent-existence pass.
pub struct ExistenceOutcome {
    /// Proposals consistent with every local under Mode. Order follows
    /// the input proposal list; the selector never depends on it.
    pub surviving: Vec<GlueProposal>,

    /// Failures found while re-evaluating witnesses or comparing
    /// candidates. Non-empty means no proposal survives.
    pub failures: Vec<GateFailure>,
}

/// Re-evaluate witness coherence and filter the proposal set.
pub fn check_existence(
    world: &dyn World,
    core: &DescentCore,
    obligations: &[OverlapObligation],
    proposals: &[GlueProposal],
) -> ExistenceOutcome {
    let mut failures = Vec::new();

    for obligation in obligations {
        // Locality guarantees a witness per obligation; a gap here means
        // the caller skipped the locality pass, and the re-evaluation
        // below is what would catch the lie anyway.
        if !core
            .compat
            .iter()
            .any(|w| w.overlap_id == obligation.overlap_id)
        {
            continue;
        }

        let mut restrictions = Vec::with_capacity(obligation.parts.len());
        let mut undefined = false;
        for part_id in &obligation.parts {
            let (Some(part), Some(local)) =
                (core.cover.part(part_id), core.locals.get(part_id))
            else {
                undefined = true;
                break;
            };
            match world.restrict_to_overlap(&local.payload, part, obligation) {
                Some(restricted) => restrictions.push(restricted),
                None => {
                    failures.push(GateFailure::new(
                        failure_class::DESCENT_FAILURE,
                        Phase::Restrict,
                        ResponsibleComponent::World,
                        "local state has no restriction onto the overlap",
                        Some(format!("compat/{}", obligation.overlap_id)),
                        Some(json!({
                            "overlapId": obligation.overlap_id,
                            "overlapArity": obligation.arity,
                            "part": part_id.as_str(),
                        })),
                    ));
                    undefined = true;
                    break;
                }
            }
        }
        if undefined {
            continue;
        }

        for pair in restrictions.windows(2) {
            match world.same(&core.mode, &pair[0], &pair[1]) {
                None => {
                    failures.push(GateFailure::new(
                        failure_class::DESCENT_FAILURE,
                        Phase::Normalize,
                        ResponsibleComponent::World,
                        "mode comparison unavailable while re-evaluating a compat witness",
                        Some(format!("compat/{}", obligation.overlap_id)),
                        Some(json!({"overlapId": obligation.overlap_id})),
                    ));
                    break;
                }
                Some(false) => {
                    let message = if obligation.arity >= 3 {
                        "cocycle coherence failed on a higher-order overlap"
                    } else {
                        "compat witness fails re-evaluated coherence"
                    };
                    failures.push(GateFailure::new(
                        failure_class::DESCENT_FAILURE,
                        Phase::Compat,
                        ResponsibleComponent::World,
                        message,
                        Some(format!("compat/{}", obligation.overlap_id)),
                        Some(json!({
                            "overlapId": obligation.overlap_id,
                            "overlapArity": obligation.arity,
                        })),
                    ));
                    break;
                }
                Some(true) => {}
            }
        }
    }

    if !failures.is_empty() {
        return ExistenceOutcome {
            surviving: Vec::new(),
            failures,
        };
    }

    let mut surviving = Vec::new();
    for proposal in proposals {
        let mut valid = true;
        for part in &core.cover.parts {
            let Some(local) = core.locals.get(&part.id) else {
                valid = false;
                break;
            };
            let Some(restricted) = world.restrict_to_part(&proposal.payload, part) else {
                valid = false;
                break;
            };
            match world.same(&core.mode, &restricted, &local.payload) {
                None => {
                    failures.push(GateFailure::new(
                        failure_class::DESCENT_FAILURE,
                        Phase::Normalize,
                        ResponsibleComponent::World,
                        "mode comparison unavailable while validating a glue proposal",
                        Some(format!("glueProposals/{}", proposal.proposal_id)),
                        Some(json!({
                            "proposalId": proposal.proposal_id,
                            "part": part.id.as_str(),
                        })),
                    ));
                    return ExistenceOutcome {
                        surviving: Vec::new(),
                        failures,
                    };
                }
                Some(false) => {
                    valid = false;
                    break;
                }
                Some(true) => {}
            }
        }
        if valid {
            surviving.push(proposal.clone());
        }
    }

    ExistenceOutcome {
        surviving,
        failures,
    }
}
