//! Descent-check input artifacts and glue-selection surfaces.
//!
//! The kernel treats every adapter payload as an unstructured value plus
//! a digest. Local states, compatibility witnesses, and glue proposals
//! are opaque here; the world interface (`crate::world`) is the only
//! place their content is consulted, and only through restriction and
//! Mode-bound sameness.

use crate::cover::{Cover, CoverPartId};
use crate::error::KernelError;
use crate::mode::ModeBinding;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// An adapter-owned local result attached to one cover part.
///
/// `ctx_ref` records the context snapshot the local was produced
/// against; a drift from the run's snapshot is a stability failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LocalState {
    pub part: CoverPartId,
    pub ctx_ref: String,
    pub digest: String,
    #[serde(default)]
    pub payload: Value,
}

/// Adapter-owned evidence that the members of one overlap obligation agree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompatWitness {
    pub overlap_id: String,
    pub parts: Vec<CoverPartId>,
    pub digest: String,
    #[serde(default)]
    pub payload: Value,
}

/// An adapter-proposed candidate global assembly. Never self-certifying.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GlueProposal {
    pub proposal_id: String,
    #[serde(default)]
    pub payload: Value,
}

/// Adapter output derived from one descent core. May legally be empty.
pub type GlueProposalSet = Vec<GlueProposal>;

/// The complete admissibility-check input for one run. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DescentCore {
    pub cover: Cover,
    pub locals: BTreeMap<CoverPartId, LocalState>,
    pub compat: Vec<CompatWitness>,
    pub mode: ModeBinding,
}

impl DescentCore {
    /// Assemble a descent core from caller-supplied collections.
    ///
    /// Two locals claiming the same part is a host input error, not a
    /// gate verdict: the map would silently drop one of them otherwise.
    /// Missing locals and malformed witnesses are left in place for the
    /// locality checker to report as failure classes.
    pub fn assemble(
        cover: Cover,
        locals: Vec<LocalState>,
        compat: Vec<CompatWitness>,
        mode: ModeBinding,
    ) -> Result<Self, KernelError> {
        let mut local_map = BTreeMap::new();
        for local in locals {
            let part = local.part.clone();
            if local_map.insert(part.clone(), local).is_some() {
                return Err(KernelError::InvalidInput(format!(
                    "duplicate local state for cover part {part}"
                )));
            }
        }
        Ok(Self {
            cover,
            locals: local_map,
            compat,
            mode,
        })
    }
}

/// How the contractibility basis was established.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GlueMethod {
    NormalForm,
    EquivWitness,
    ExternalChecker,
}

/// The evidence backing a unique glue selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContractibilityBasis {
    pub mode: ModeBinding,
    pub method: GlueMethod,
    pub proof_refs: Vec<String>,
}

/// The kernel's unique chosen outcome for one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GlueResult {
    pub selected: String,
    pub contractibility_basis: ContractibilityBasis,
}

/// Why glue selection could not produce a unique outcome.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GlueSelectionFailure {
    NoValidProposal,
    NonContractibleSelection,
    ModeComparisonUnavailable,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cover::{CoverStrategy, PartSpec};
    use serde_json::json;

    fn two_part_cover() -> Cover {
        Cover::build(
            "ctx",
            &CoverStrategy {
                strategy_id: "s".into(),
                parts: vec![
                    PartSpec {
                        label: "a".into(),
                        scope: vec!["x".into()],
                    },
                    PartSpec {
                        label: "b".into(),
                        scope: vec!["x".into()],
                    },
                ],
            },
        )
        .unwrap()
    }

    fn local(part: &str, payload: Value) -> LocalState {
        LocalState {
            part: CoverPartId(part.into()),
            ctx_ref: "snap:1".into(),
            digest: format!("d-{part}"),
            payload,
        }
    }

    #[test]
    fn assemble_indexes_locals_by_part() {
        let core = DescentCore::assemble(
            two_part_cover(),
            vec![
                local("part:b", json!({"x": 2})),
                local("part:a", json!({"x": 1})),
            ],
            vec![],
            ModeBinding {
                normalizer_id: "n".into(),
                policy_digest: "p".into(),
            },
        )
        .unwrap();

        assert_eq!(core.locals.len(), 2);
        let first = core.locals.keys().next().unwrap();
        assert_eq!(first.as_str(), "part:a");
    }

    #[test]
    fn assemble_rejects_duplicate_locals() {
        let err = DescentCore::assemble(
            two_part_cover(),
            vec![
                local("part:a", json!({"x": 1})),
                local("part:a", json!({"x": 2})),
            ],
            vec![],
            ModeBinding {
                normalizer_id: "n".into(),
                policy_digest: "p".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, KernelError::InvalidInput(_)));
    }
}
