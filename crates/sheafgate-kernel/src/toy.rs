//! Reference worlds for pipeline conformance testing.
//!
//! These give the pipeline concrete restriction/sameness semantics
//! without dragging in a real adapter. Locals and glue candidates are
//! JSON objects keyed by slot name; restriction is projection onto a
//! scope; sameness is canonical-byte equality.
//!
//! ## Worlds
//!
//! - **SlotMapWorld**: the golden model. Advertises `higher_cech`.
//! - **PairwiseOnlyWorld**: identical semantics, advertises only
//!   `pairwise`. Used to exercise capability-negotiation rejections.
//! - **IncomparableWorld**: restriction works, sameness always
//!   unavailable. Every comparison becomes a normalize-phase failure.
//! - **LooseWorld**: everything restricts to itself and everything is
//!   the same. Collapses all proposals into one equivalence class, which
//!   exercises representative selection.

use crate::cover::{CoverPart, OverlapObligation};
use crate::identity::canonical_json_bytes;
use crate::mode::{ModeBinding, OverlapLevel};
use crate::world::World;
use serde_json::Value;
use std::collections::BTreeSet;

/// Look up a reference world by name.
pub fn get_world(name: &str) -> Option<Box<dyn World>> {
    match name {
        "slot_map" => Some(Box::new(SlotMapWorld)),
        "pairwise_only" => Some(Box::new(PairwiseOnlyWorld)),
        "incomparable" => Some(Box::new(IncomparableWorld)),
        "loose" => Some(Box::new(LooseWorld)),
        _ => None,
    }
}

/// Project an object payload onto a slot set.
///
/// Undefined when the payload is not an object or a slot is absent.
fn project(value: &Value, slots: &BTreeSet<String>) -> Option<Value> {
    let map = value.as_object()?;
    let mut out = serde_json::Map::new();
    for slot in slots {
        out.insert(slot.clone(), map.get(slot)?.clone());
    }
    Some(Value::Object(out))
}

fn bytes_equal(a: &Value, b: &Value) -> bool {
    canonical_json_bytes(a) == canonical_json_bytes(b)
}

/// The golden model: slot maps with projection and byte equality.
pub struct SlotMapWorld;

impl World for SlotMapWorld {
    fn name(&self) -> &str {
        "slot_map"
    }

    fn supported_overlap_level(&self) -> OverlapLevel {
        OverlapLevel::HigherCech
    }

    fn restrict_to_part(&self, candidate: &Value, part: &CoverPart) -> Option<Value> {
        project(candidate, &part.scope)
    }

    fn restrict_to_overlap(
        &self,
        local: &Value,
        _part: &CoverPart,
        overlap: &OverlapObligation,
    ) -> Option<Value> {
        project(local, &overlap.scope)
    }

    fn same(&self, _mode: &ModeBinding, a: &Value, b: &Value) -> Option<bool> {
        Some(bytes_equal(a, b))
    }
}

/// Slot-map semantics without the higher-order capability.
pub struct PairwiseOnlyWorld;

impl World for PairwiseOnlyWorld {
    fn name(&self) -> &str {
        "pairwise_only"
    }

    fn restrict_to_part(&self, candidate: &Value, part: &CoverPart) -> Option<Value> {
        project(candidate, &part.scope)
    }

    fn restrict_to_overlap(
        &self,
        local: &Value,
        _part: &CoverPart,
        overlap: &OverlapObligation,
    ) -> Option<Value> {
        project(local, &overlap.scope)
    }

    fn same(&self, _mode: &ModeBinding, a: &Value, b: &Value) -> Option<bool> {
        Some(bytes_equal(a, b))
    }
}

/// A world whose normalizer can never compare anything.
pub struct IncomparableWorld;

impl World for IncomparableWorld {
    fn name(&self) -> &str {
        "incomparable"
    }

    fn restrict_to_part(&self, candidate: &Value, part: &CoverPart) -> Option<Value> {
        project(candidate, &part.scope)
    }

    fn restrict_to_overlap(
        &self,
        local: &Value,
        _part: &CoverPart,
        overlap: &OverlapObligation,
    ) -> Option<Value> {
        project(local, &overlap.scope)
    }

    fn same(&self, _mode: &ModeBinding, _a: &Value, _b: &Value) -> Option<bool> {
        None
    }
}

/// A world where everything restricts trivially and everything agrees.
pub struct LooseWorld;

impl World for LooseWorld {
    fn name(&self) -> &str {
        "loose"
    }

    fn restrict_to_part(&self, candidate: &Value, _part: &CoverPart) -> Option<Value> {
        Some(candidate.clone())
    }

    fn restrict_to_overlap(
        &self,
        local: &Value,
        _part: &CoverPart,
        _overlap: &OverlapObligation,
    ) -> Option<Value> {
        Some(local.clone())
    }

    fn same(&self, _mode: &ModeBinding, _a: &Value, _b: &Value) -> Option<bool> {
        Some(true)
    }
}
