//! The world interface: the narrow seam between kernel and adapters.
//!
//! A world provides exactly the operations the pipeline needs
//! (restriction and Mode-bound sameness) and nothing else. The kernel
//! never learns what payloads mean; adapters never originate
//! admissibility decisions. Task-graph and ledger domains plug in here
//! as payload-plus-digest values behind this one trait, not as a type
//! hierarchy the kernel knows about.

use crate::cover::{CoverPart, OverlapObligation};
use crate::mode::{ModeBinding, OverlapLevel};
use serde_json::Value;

/// Restriction + sameness provider for one domain.
///
/// All operations are total over well-formed inputs but may be undefined
/// (`None`) where the domain has no restriction, and sameness may be
/// unavailable (`None`) where the normalizer cannot compare two values.
/// An unavailable comparison is never guessed around; the pipeline folds
/// it into a `descent_failure` attributed to the world.
pub trait World {
    /// Name of this world (for diagnostics).
    fn name(&self) -> &str;

    /// The strongest overlap level this world can discharge.
    fn supported_overlap_level(&self) -> OverlapLevel {
        OverlapLevel::Pairwise
    }

    /// Project a glue candidate onto one cover part.
    ///
    /// Returns None if the candidate has no restriction to the part.
    fn restrict_to_part(&self, candidate: &Value, part: &CoverPart) -> Option<Value>;

    /// Project one part's local state onto an overlap obligation.
    ///
    /// Returns None if the local has no restriction to the overlap.
    fn restrict_to_overlap(
        &self,
        local: &Value,
        part: &CoverPart,
        overlap: &OverlapObligation,
    ) -> Option<Value>;

    /// Mode-bound sameness. None means the normalizer cannot compare.
    fn same(&self, mode: &ModeBinding, a: &Value, b: &Value) -> Option<bool>;
}
