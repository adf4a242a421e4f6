//! Mode binding and overlap-level capability.
//!
//! Every comparison the kernel performs is bound to a Mode: the pair
//! `(normalizer_id, policy_digest)`. Two claims are equal iff their
//! canonical digests under the same Mode are equal. The Mode is threaded
//! explicitly through every call; there is no process-wide default.
//!
//! The overlap level is a negotiated capability: `pairwise` checking is
//! always supported, `higher_cech` (triple-overlap cocycle coherence)
//! must be explicitly advertised by the world and, when requested, bound
//! into the policy digest.

use serde::{Deserialize, Serialize};

/// The comparison-semantics binding for one run.
///
/// `policy_digest` covers every parameter capable of changing an
/// accept/reject outcome or an equality result, and excludes parameters
/// that only affect scheduling or retry timing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModeBinding {
    pub normalizer_id: String,
    pub policy_digest: String,
}

/// Overlap-checking level negotiated between caller and world.
///
/// Pairwise < HigherCech in strength. A world advertising `higher_cech`
/// also discharges all pairwise obligations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum OverlapLevel {
    /// Arity-2 overlap obligations only. Always supported.
    #[default]
    Pairwise,

    /// Arity-2 plus arity-3 (cocycle) obligations. Optional capability.
    HigherCech,
}

impl OverlapLevel {
    /// Returns true if `self` can discharge every obligation `other` requires.
    pub fn subsumes(self, other: Self) -> bool {
        self >= other
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pairwise => "pairwise",
            Self::HigherCech => "higher_cech",
        }
    }
}

impl std::fmt::Display for OverlapLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OverlapLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pairwise" => Ok(Self::Pairwise),
            "higher_cech" | "higher-cech" | "cech" => Ok(Self::HigherCech),
            _ => Err(format!("unknown overlap level: {s}")),
        }
    }
}
