//! Contractibility selection: a provably unique glue, or a typed refusal.
//!
//! Among the proposals that survive descent-existence, this pass
//! determines equivalence classes under Mode. Exactly one class means
//! the glue space is contractible and a representative is selected.
//! The selector never breaks ties by candidate order, arrival time, or
//! proposal count: within the unique class, the representative is the
//! member with the smallest canonical payload digest, so any permutation
//! of the input produces the same selection.

use crate::descent::{
    ContractibilityBasis, GlueMethod, GlueProposal, GlueResult, GlueSelectionFailure,
};
use crate::identity::{canonical_json_bytes, hex_lower};
use crate::mode::ModeBinding;
use crate::world::World;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Canonical digest of an opaque payload.
pub fn payload_digest(payload: &Value) -> String {
    let hash = Sha256::digest(canonical_json_bytes(payload));
    hex_lower(&hash)
}

/// Pick the unique glue result, or say precisely why none exists.
pub fn select_glue(
    world: &dyn World,
    mode: &ModeBinding,
    surviving: &[GlueProposal],
) -> Result<GlueResult, GlueSelectionFailure> {
    if surviving.is_empty() {
        return Err(GlueSelectionFailure::NoValidProposal);
    }

    let mut classes: Vec<Vec<&GlueProposal>> = Vec::new();
    for proposal in surviving {
        let mut placed = false;
        for class in classes.iter_mut() {
            match world.same(mode, &class[0].payload, &proposal.payload) {
                None => return Err(GlueSelectionFailure::ModeComparisonUnavailable),
                Some(true) => {
                    class.push(proposal);
                    placed = true;
                    break;
                }
                Some(false) => {}
            }
        }
        if !placed {
            classes.push(vec![proposal]);
        }
    }

    if classes.len() > 1 {
        return Err(GlueSelectionFailure::NonContractibleSelection);
    }

    let class = &classes[0];
    let mut members: Vec<(String, &GlueProposal)> = class
        .iter()
        .map(|p| (payload_digest(&p.payload), *p))
        .collect();
    members.sort_by(|a, b| {
        (a.0.as_str(), a.1.proposal_id.as_str()).cmp(&(b.0.as_str(), b.1.proposal_id.as_str()))
    });
    let selected = members[0].1;

    let mut proof_refs: Vec<String> = class.iter().map(|p| p.proposal_id.clone()).collect();
    proof_refs.sort();
    proof_refs.dedup();

    Ok(GlueResult {
        selected: selected.proposal_id.clone(),
        contractibility_basis: ContractibilityBasis {
            mode: mode.clone(),
            method: GlueMethod::NormalForm,
            proof_refs,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toy::{IncomparableWorld, LooseWorld, SlotMapWorld};
    use serde_json::json;

    fn mode() -> ModeBinding {
        ModeBinding {
            normalizer_id: "normal_form.v1".into(),
            policy_digest: "policy.v1".into(),
        }
    }

    fn proposal(id: &str, payload: Value) -> GlueProposal {
        GlueProposal {
            proposal_id: id.into(),
            payload,
        }
    }

    #[test]
    fn empty_survivors_are_no_valid_proposal() {
        let err = select_glue(&SlotMapWorld, &mode(), &[]).unwrap_err();
        assert_eq!(err, GlueSelectionFailure::NoValidProposal);
    }

    #[test]
    fn single_class_selects_unique_result() {
        let survivors = vec![proposal("p1", json!({"x": 1}))];
        let result = select_glue(&SlotMapWorld, &mode(), &survivors).unwrap();
        assert_eq!(result.selected, "p1");
        assert_eq!(result.contractibility_basis.proof_refs, vec!["p1"]);
        assert_eq!(result.contractibility_basis.mode, mode());
    }

    #[test]
    fn two_inequivalent_classes_are_non_contractible() {
        let survivors = vec![
            proposal("p1", json!({"x": 1})),
            proposal("p2", json!({"x": 2})),
        ];
        let err = select_glue(&SlotMapWorld, &mode(), &survivors).unwrap_err();
        assert_eq!(err, GlueSelectionFailure::NonContractibleSelection);
    }

    #[test]
    fn representative_is_permutation_invariant() {
        let a = proposal("zeta", json!({"x": 1}));
        let b = proposal("alpha", json!({"x": 2}));
        let forward = select_glue(&LooseWorld, &mode(), &[a.clone(), b.clone()]).unwrap();
        let backward = select_glue(&LooseWorld, &mode(), &[b, a]).unwrap();
        assert_eq!(forward.selected, backward.selected);
        assert_eq!(
            forward.contractibility_basis.proof_refs,
            backward.contractibility_basis.proof_refs
        );
    }

    #[test]
    fn unavailable_comparison_surfaces_as_such() {
        let survivors = vec![
            proposal("p1", json!({"x": 1})),
            proposal("p2", json!({"x": 1})),
        ];
        let err = select_glue(&IncomparableWorld, &mode(), &survivors).unwrap_err();
        assert_eq!(err, GlueSelectionFailure::ModeComparisonUnavailable);
    }

    #[test]
    fn payload_digest_is_canonical() {
        let a = json!({"b": 1, "a": 2});
        let b: Value = serde_json::from_str(r#"{"a":2,"b":1}"#).unwrap();
        assert_eq!(payload_digest(&a), payload_digest(&b));
    }
}
