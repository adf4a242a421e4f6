//! Covers and overlap obligations.
//!
//! A cover decomposes one context into parts that can be produced by
//! independent workers. The cover is proposed by a caller-supplied
//! strategy but constructed and owned by the kernel: labels are
//! normalized, parts are sorted, and part identifiers are minted here.
//! A caller cannot silently omit or rename parts after construction.
//!
//! Overlap obligations are likewise kernel-defined. An adapter cannot
//! hide a problematic overlap by never naming it: every pair (and, under
//! `higher_cech`, every triple) of parts with intersecting scope gets an
//! obligation, enumerated in a deterministic order.

use crate::error::KernelError;
use crate::identity::prefixed_digest;
use crate::mode::OverlapLevel;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeSet;

/// Kernel-minted identifier for one cover part.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CoverPartId(pub String);

impl CoverPartId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CoverPartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One proposed part in a caller-supplied partition strategy.
///
/// `scope` is the set of slot names the part claims responsibility for.
/// The kernel never interprets slot names; it only intersects scopes to
/// derive overlap obligations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PartSpec {
    pub label: String,
    pub scope: Vec<String>,
}

/// Caller proposal for how to partition a context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CoverStrategy {
    pub strategy_id: String,
    pub parts: Vec<PartSpec>,
}

/// One part of a kernel-owned cover.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CoverPart {
    pub id: CoverPartId,
    pub label: String,
    pub scope: BTreeSet<String>,
}

/// A kernel-owned decomposition of one context.
///
/// Parts are sorted by normalized label; `cover_id` is a digest over the
/// canonical strategy material, so the same proposal always names the
/// same cover.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Cover {
    pub cover_id: String,
    pub context_id: String,
    pub parts: Vec<CoverPart>,
}

/// A kernel-defined compatibility obligation between cover parts.
///
/// `parts` is the ordered tuple of member part ids; `scope` is the slot
/// intersection the members must agree on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OverlapObligation {
    pub overlap_id: String,
    pub arity: usize,
    pub parts: Vec<CoverPartId>,
    pub scope: BTreeSet<String>,
}

impl Cover {
    /// Construct the kernel-owned cover from a caller proposal.
    pub fn build(
        context_id: impl Into<String>,
        strategy: &CoverStrategy,
    ) -> Result<Self, KernelError> {
        let strategy_id = strategy.strategy_id.trim();
        if strategy_id.is_empty() {
            return Err(KernelError::InvalidCover(
                "cover strategy id is empty".to_string(),
            ));
        }
        if strategy.parts.is_empty() {
            return Err(KernelError::InvalidCover(
                "cover strategy proposes no parts".to_string(),
            ));
        }

        let mut parts = Vec::with_capacity(strategy.parts.len());
        for spec in &strategy.parts {
            let label = spec.label.trim();
            if label.is_empty() {
                return Err(KernelError::InvalidCover(
                    "cover part label is empty".to_string(),
                ));
            }
            let scope: BTreeSet<String> = spec
                .scope
                .iter()
                .map(|slot| slot.trim().to_string())
                .filter(|slot| !slot.is_empty())
                .collect();
            if scope.is_empty() {
                return Err(KernelError::InvalidCover(format!(
                    "cover part {label} has an empty scope"
                )));
            }
            parts.push(CoverPart {
                id: CoverPartId(format!("part:{label}")),
                label: label.to_string(),
                scope,
            });
        }

        parts.sort_by(|a, b| a.label.cmp(&b.label));
        for window in parts.windows(2) {
            if window[0].label == window[1].label {
                return Err(KernelError::InvalidCover(format!(
                    "duplicate cover part label: {}",
                    window[0].label
                )));
            }
        }

        let material = json!({
            "strategyId": strategy_id,
            "parts": parts
                .iter()
                .map(|p| json!({"label": p.label, "scope": p.scope}))
                .collect::<Vec<_>>(),
        });
        let cover_id = prefixed_digest("cover1", &material);

        Ok(Self {
            cover_id,
            context_id: context_id.into(),
            parts,
        })
    }

    /// Look up a part by its kernel-minted id.
    pub fn part(&self, id: &CoverPartId) -> Option<&CoverPart> {
        self.parts.iter().find(|p| &p.id == id)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Deterministically enumerate the overlap obligations for this cover.
    ///
    /// Order key: `(arity, lexicographic part-id tuple, overlap_id)`.
    /// Arity 2 is always enumerated; arity 3 only under `higher_cech`.
    /// Parts with disjoint scope owe each other nothing.
    pub fn enumerate_overlaps(&self, level: OverlapLevel) -> Vec<OverlapObligation> {
        let mut obligations = Vec::new();

        for i in 0..self.parts.len() {
            for j in (i + 1)..self.parts.len() {
                let scope: BTreeSet<String> = self.parts[i]
                    .scope
                    .intersection(&self.parts[j].scope)
                    .cloned()
                    .collect();
                if scope.is_empty() {
                    continue;
                }
                obligations.push(self.obligation(vec![i, j], scope));
            }
        }

        if level == OverlapLevel::HigherCech {
            for i in 0..self.parts.len() {
                for j in (i + 1)..self.parts.len() {
                    for k in (j + 1)..self.parts.len() {
                        let scope: BTreeSet<String> = self.parts[i]
                            .scope
                            .intersection(&self.parts[j].scope)
                            .filter(|slot| self.parts[k].scope.contains(*slot))
                            .cloned()
                            .collect();
                        if scope.is_empty() {
                            continue;
                        }
                        obligations.push(self.obligation(vec![i, j, k], scope));
                    }
                }
            }
        }

        obligations.sort_by(|a, b| {
            (a.arity, &a.parts, &a.overlap_id).cmp(&(b.arity, &b.parts, &b.overlap_id))
        });
        obligations
    }

    fn obligation(&self, indices: Vec<usize>, scope: BTreeSet<String>) -> OverlapObligation {
        let parts: Vec<CoverPartId> = indices.iter().map(|&i| self.parts[i].id.clone()).collect();
        let material = json!({
            "coverId": self.cover_id,
            "arity": parts.len(),
            "parts": parts.iter().map(|p| p.0.clone()).collect::<Vec<_>>(),
        });
        OverlapObligation {
            overlap_id: prefixed_digest("ov1", &material),
            arity: parts.len(),
            parts,
            scope,
        }
    }
}
