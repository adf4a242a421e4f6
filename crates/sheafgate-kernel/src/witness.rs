//! Deterministic gate witnesses.
//!
//! Two independent kernel instances given the same semantic failure MUST
//! produce identical witness ids. Algorithm:
//! 1. Build the canonical witness key
//!    `{schema, class, phase, responsibleComponent, tokenPath, context}`
//! 2. Serialize to canonical bytes (sorted keys, no whitespace)
//! 3. `witness_id = "w1_" || base32hex_lower(SHA256(keyBytes))`
//!
//! The terminal `GateWitness` obeys the exactly-one law: accepted carries
//! a glue result and no failures; rejected carries failures and no glue.
//! Local gate witnesses are never conflated with transport witnesses,
//! which live in their own crate with a disjoint class vocabulary.

use crate::descent::GlueResult;
use crate::identity::{RunIdentity, base32hex_lower_no_pad, canonical_json_bytes};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Failure class constants. Fixed and exhaustive; no catch-all class.
pub mod failure_class {
    pub const LOCALITY_FAILURE: &str = "locality_failure";
    pub const DESCENT_FAILURE: &str = "descent_failure";
    pub const GLUE_NON_CONTRACTIBLE: &str = "glue_non_contractible";
    pub const STABILITY_FAILURE: &str = "stability_failure";
}

/// Pipeline phase a failure was detected in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Restrict,
    Compat,
    ProposeGlue,
    SelectGlue,
    Normalize,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Restrict => "restrict",
            Self::Compat => "compat",
            Self::ProposeGlue => "propose_glue",
            Self::SelectGlue => "select_glue",
            Self::Normalize => "normalize",
        }
    }
}

/// Which collaborator owes the fix.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ResponsibleComponent {
    World,
    Adapter,
    ContextProvider,
    EventStore,
}

impl ResponsibleComponent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::World => "world",
            Self::Adapter => "adapter",
            Self::ContextProvider => "context_provider",
            Self::EventStore => "event_store",
        }
    }
}

/// Compute a witness id from the canonical witness key fields.
pub fn compute_witness_id(
    class: &str,
    phase: Phase,
    responsible_component: ResponsibleComponent,
    token_path: Option<&str>,
    context: Option<&Value>,
) -> String {
    let mut map = serde_json::Map::new();
    map.insert("schema".to_string(), Value::Number(1.into()));
    map.insert("class".to_string(), Value::String(class.to_string()));
    map.insert(
        "phase".to_string(),
        Value::String(phase.as_str().to_string()),
    );
    map.insert(
        "responsibleComponent".to_string(),
        Value::String(responsible_component.as_str().to_string()),
    );
    map.insert(
        "tokenPath".to_string(),
        token_path
            .map(|s| Value::String(s.to_string()))
            .unwrap_or(Value::Null),
    );
    map.insert(
        "context".to_string(),
        context.cloned().unwrap_or(Value::Null),
    );

    let key_bytes = canonical_json_bytes(&Value::Object(map));
    let hash = Sha256::digest(&key_bytes);
    format!("w1_{}", base32hex_lower_no_pad(&hash))
}

/// One typed failure inside a rejected gate witness.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GateFailure {
    /// Deterministic witness id over the canonical key fields.
    pub witness_id: String,

    /// Failure classification.
    pub class: String,

    /// Pipeline phase the failure was detected in.
    pub phase: Phase,

    /// Collaborator responsible for the condition.
    pub responsible_component: ResponsibleComponent,

    /// Human-readable description. Not identity material.
    pub message: String,

    /// Affected input path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_path: Option<String>,

    /// Structured diagnostics (overlap ids, level negotiation, counts).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl GateFailure {
    pub fn new(
        class: impl Into<String>,
        phase: Phase,
        responsible_component: ResponsibleComponent,
        message: impl Into<String>,
        token_path: Option<String>,
        context: Option<Value>,
    ) -> Self {
        let class = class.into();
        let witness_id = compute_witness_id(
            &class,
            phase,
            responsible_component,
            token_path.as_deref(),
            context.as_ref(),
        );
        Self {
            witness_id,
            class,
            phase,
            responsible_component,
            message: message.into(),
            token_path,
            context,
        }
    }

    /// Ordering key: class, phase, component, tokenPath, context, witness id.
    fn sort_key(&self) -> (&str, &'static str, &'static str, &str, String, &str) {
        (
            &self.class,
            self.phase.as_str(),
            self.responsible_component.as_str(),
            self.token_path.as_deref().unwrap_or(""),
            self.context
                .as_ref()
                .map(|c| {
                    String::from_utf8(canonical_json_bytes(c)).unwrap_or_default()
                })
                .unwrap_or_default(),
            &self.witness_id,
        )
    }
}

impl PartialOrd for GateFailure {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GateFailure {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// The terminal record of one kernel run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GateWitness {
    /// Schema version (always 1).
    pub witness_schema: u32,

    /// Always "gate" for local admissibility witnesses.
    pub witness_kind: String,

    pub run_id: String,
    pub world_id: String,
    pub context_id: String,
    pub adapter_id: String,
    pub adapter_version: String,
    pub ctx_ref: String,
    pub data_head_ref: String,
    pub normalizer_id: String,
    pub policy_digest: String,

    /// "accepted" or "rejected".
    pub result: String,

    /// Failure witnesses, deduplicated and deterministically ordered.
    /// Empty iff accepted.
    pub failures: Vec<GateFailure>,

    /// The unique glue selection. Present iff accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glue: Option<GlueResult>,
}

impl GateWitness {
    /// Create an accepted witness carrying the unique glue result.
    pub fn accepted(identity: &RunIdentity, glue: GlueResult) -> Self {
        Self::envelope(identity, "accepted", vec![], Some(glue))
    }

    /// Create a rejected witness from a non-empty failure set.
    ///
    /// Failures are sorted and deduplicated by witness id; the caller
    /// guarantees non-emptiness (the pipeline only rejects with at least
    /// one recorded failure).
    pub fn rejected(identity: &RunIdentity, mut failures: Vec<GateFailure>) -> Self {
        debug_assert!(!failures.is_empty(), "rejected witness needs failures");
        failures.sort();
        failures.dedup_by(|a, b| a.witness_id == b.witness_id);
        Self::envelope(identity, "rejected", failures, None)
    }

    fn envelope(
        identity: &RunIdentity,
        result: &str,
        failures: Vec<GateFailure>,
        glue: Option<GlueResult>,
    ) -> Self {
        Self {
            witness_schema: 1,
            witness_kind: "gate".to_string(),
            run_id: identity.compute_run_id(),
            world_id: identity.world_id.clone(),
            context_id: identity.context_id.clone(),
            adapter_id: identity.adapter_id.clone(),
            adapter_version: identity.adapter_version.clone(),
            ctx_ref: identity.ctx_ref.clone(),
            data_head_ref: identity.data_head_ref.clone(),
            normalizer_id: identity.normalizer_id.clone(),
            policy_digest: identity.policy_digest.clone(),
            result: result.to_string(),
            failures,
            glue,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.result == "accepted"
    }

    /// Deduplicated failure classes in witness order.
    pub fn failure_classes(&self) -> Vec<&str> {
        let mut classes: Vec<&str> = self.failures.iter().map(|f| f.class.as_str()).collect();
        classes.dedup();
        classes
    }
}
