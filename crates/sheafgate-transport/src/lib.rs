//! Transport-boundary witnesses for verdict exchange between kernel
//! instances.
//!
//! Transport compatibility is a lower-stakes layer than admissibility:
//! it can refuse to carry a verdict across a boundary, but it can never
//! upgrade one. Its failure-class vocabulary is disjoint from the gate's
//! so the two record kinds are impossible to conflate.
//!
//! Validation here is structural only: envelope shape, codec identity,
//! capability advertisement, replay digests. Whether the carried verdict
//! was correct is the originating kernel's business.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use sheafgate_kernel::identity::{base32hex_lower_no_pad, canonical_json_bytes};
use sheafgate_kernel::witness::GateWitness;

/// Transport failure classes. Disjoint from the gate vocabulary.
pub mod transport_class {
    pub const TRANSPORT_ENVELOPE_MALFORMED: &str = "transport_envelope_malformed";
    pub const TRANSPORT_CODEC_MISMATCH: &str = "transport_codec_mismatch";
    pub const TRANSPORT_CAPABILITY_UNSUPPORTED: &str = "transport_capability_unsupported";
    pub const TRANSPORT_REPLAY_DIVERGENCE: &str = "transport_replay_divergence";
}

const ENVELOPE_STRING_FIELDS: [&str; 4] =
    ["channelId", "sourceWorldId", "targetWorldId", "codecId"];

/// One structural problem found at the transport boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransportIssue {
    /// Deterministic issue id over `{schema, class, path}`.
    pub issue_id: String,

    pub class: String,
    pub path: String,
    pub message: String,
}

impl TransportIssue {
    pub fn new(
        class: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let class = class.into();
        let path = path.into();
        let mut key = serde_json::Map::new();
        key.insert("schema".to_string(), Value::Number(1.into()));
        key.insert("class".to_string(), Value::String(class.clone()));
        key.insert("path".to_string(), Value::String(path.clone()));
        let hash = Sha256::digest(canonical_json_bytes(&Value::Object(key)));
        Self {
            issue_id: format!("t1_{}", base32hex_lower_no_pad(&hash)),
            class,
            path,
            message: message.into(),
        }
    }

    fn sort_key(&self) -> (&str, &str, &str) {
        (&self.class, &self.path, &self.message)
    }
}

impl PartialOrd for TransportIssue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TransportIssue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// The transport-boundary record for one verdict handoff.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransportWitness {
    /// Schema version (always 1).
    pub witness_schema: u32,

    /// Always "transport". Never "gate".
    pub witness_kind: String,

    pub channel_id: String,
    pub source_world_id: String,
    pub target_world_id: String,
    pub codec_id: String,

    /// "accepted" or "rejected".
    pub result: String,

    /// Issues, deduplicated and deterministically ordered.
    pub issues: Vec<TransportIssue>,
}

impl TransportWitness {
    pub fn accepted(
        channel_id: impl Into<String>,
        source_world_id: impl Into<String>,
        target_world_id: impl Into<String>,
        codec_id: impl Into<String>,
    ) -> Self {
        Self::envelope(channel_id, source_world_id, target_world_id, codec_id, vec![])
    }

    pub fn rejected(
        channel_id: impl Into<String>,
        source_world_id: impl Into<String>,
        target_world_id: impl Into<String>,
        codec_id: impl Into<String>,
        issues: Vec<TransportIssue>,
    ) -> Self {
        debug_assert!(!issues.is_empty(), "rejected transport witness needs issues");
        Self::envelope(channel_id, source_world_id, target_world_id, codec_id, issues)
    }

    fn envelope(
        channel_id: impl Into<String>,
        source_world_id: impl Into<String>,
        target_world_id: impl Into<String>,
        codec_id: impl Into<String>,
        mut issues: Vec<TransportIssue>,
    ) -> Self {
        issues.sort();
        issues.dedup_by(|a, b| a.issue_id == b.issue_id);
        let result = if issues.is_empty() {
            "accepted"
        } else {
            "rejected"
        };
        Self {
            witness_schema: 1,
            witness_kind: "transport".to_string(),
            channel_id: channel_id.into(),
            source_world_id: source_world_id.into(),
            target_world_id: target_world_id.into(),
            codec_id: codec_id.into(),
            result: result.to_string(),
            issues,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.result == "accepted"
    }
}

/// Structurally validate a serialized transport envelope.
pub fn validate_envelope(envelope: &Value) -> Vec<TransportIssue> {
    let mut issues = Vec::new();

    let Some(map) = envelope.as_object() else {
        issues.push(TransportIssue::new(
            transport_class::TRANSPORT_ENVELOPE_MALFORMED,
            "envelope",
            "envelope must be an object",
        ));
        return issues;
    };

    if map.get("witnessSchema").and_then(Value::as_u64) != Some(1) {
        issues.push(TransportIssue::new(
            transport_class::TRANSPORT_ENVELOPE_MALFORMED,
            "envelope/witnessSchema",
            "witnessSchema must be 1",
        ));
    }

    if map.get("witnessKind").and_then(Value::as_str) != Some("transport") {
        issues.push(TransportIssue::new(
            transport_class::TRANSPORT_ENVELOPE_MALFORMED,
            "envelope/witnessKind",
            "witnessKind must be \"transport\"",
        ));
    }

    for field in ENVELOPE_STRING_FIELDS {
        let present = map
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty());
        if !present {
            issues.push(TransportIssue::new(
                transport_class::TRANSPORT_ENVELOPE_MALFORMED,
                format!("envelope/{field}"),
                "required string field is missing or empty",
            ));
        }
    }

    match map.get("result").and_then(Value::as_str) {
        Some("accepted") | Some("rejected") => {}
        _ => issues.push(TransportIssue::new(
            transport_class::TRANSPORT_ENVELOPE_MALFORMED,
            "envelope/result",
            "result must be \"accepted\" or \"rejected\"",
        )),
    }

    issues.sort();
    issues
}

/// Check codec identity for one channel.
pub fn check_codec(expected_codec_id: &str, offered_codec_id: &str) -> Option<TransportIssue> {
    if expected_codec_id == offered_codec_id {
        None
    } else {
        Some(TransportIssue::new(
            transport_class::TRANSPORT_CODEC_MISMATCH,
            "envelope/codecId",
            format!("channel expects codec {expected_codec_id}, got {offered_codec_id}"),
        ))
    }
}

/// Check that a required capability is advertised by the peer.
pub fn check_capability(advertised: &[String], required: &str) -> Option<TransportIssue> {
    if advertised.iter().any(|c| c == required) {
        None
    } else {
        Some(TransportIssue::new(
            transport_class::TRANSPORT_CAPABILITY_UNSUPPORTED,
            format!("capabilities/{required}"),
            "required capability is not advertised by the peer",
        ))
    }
}

/// Compare a replayed verdict digest against the carried one.
pub fn check_replay(carried_digest: &str, replayed_digest: &str) -> Option<TransportIssue> {
    if carried_digest == replayed_digest {
        None
    } else {
        Some(TransportIssue::new(
            transport_class::TRANSPORT_REPLAY_DIVERGENCE,
            "envelope/verdictDigest",
            "replayed verdict digest diverges from the carried digest",
        ))
    }
}

/// The combined outcome of a gate verdict crossing a transport boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinedVerdict {
    Accepted,
    RejectedByGate,
    RejectedByTransport,
}

/// Combine a gate verdict with a transport witness.
///
/// A transport accept can never upgrade a gate reject; a transport
/// reject always withholds an accepted verdict from the far side.
pub fn combine_verdicts(gate: &GateWitness, transport: &TransportWitness) -> CombinedVerdict {
    if !gate.is_accepted() {
        return CombinedVerdict::RejectedByGate;
    }
    if !transport.is_accepted() {
        return CombinedVerdict::RejectedByTransport;
    }
    CombinedVerdict::Accepted
}
