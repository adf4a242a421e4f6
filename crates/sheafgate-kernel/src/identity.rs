//! Canonical serialization and deterministic run identity.
//!
//! Every identifier the kernel mints (`run_id`, `cover_id`, overlap ids,
//! witness ids) is a hash over canonical bytes: lexicographically sorted
//! object keys, no insignificant whitespace, explicit integer encoding.
//! Identical canonical input bytes under an identical Mode always yield
//! identical digests. No timestamps, no random salts.
//!
//! Only declared identity material is hashed. Derived artifacts (logs,
//! caches, diagnostics) never contribute to an identifier.

use crate::mode::{ModeBinding, OverlapLevel};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Canonical JSON byte serialization: sorted keys, no whitespace.
pub fn canonical_json_bytes(value: &Value) -> Vec<u8> {
    match value {
        Value::Null => b"null".to_vec(),
        Value::Bool(true) => b"true".to_vec(),
        Value::Bool(false) => b"false".to_vec(),
        Value::Number(n) => n.to_string().into_bytes(),
        Value::String(_) => {
            serde_json::to_vec(value).expect("string serialization should not fail")
        }
        Value::Array(items) => {
            let mut out = Vec::new();
            out.push(b'[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(b',');
                }
                out.extend(canonical_json_bytes(item));
            }
            out.push(b']');
            out
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            let mut out = Vec::new();
            out.push(b'{');
            for (idx, key) in keys.iter().enumerate() {
                if idx > 0 {
                    out.push(b',');
                }
                let key_json =
                    serde_json::to_vec(&Value::String((*key).clone())).expect("key serialize");
                out.extend(key_json);
                out.push(b':');
                out.extend(canonical_json_bytes(
                    map.get(*key).expect("sorted key must exist in object"),
                ));
            }
            out.push(b'}');
            out
        }
    }
}

/// Lowercase hex encoding.
pub fn hex_lower(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

/// RFC 4648 base32hex encoding, lowercase, without padding.
///
/// Alphabet: 0-9 a-v.
pub fn base32hex_lower_no_pad(data: &[u8]) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuv";

    let mut result = String::new();
    let mut bits: u64 = 0;
    let mut num_bits: u32 = 0;

    for &byte in data {
        bits = (bits << 8) | (byte as u64);
        num_bits += 8;

        while num_bits >= 5 {
            num_bits -= 5;
            let idx = ((bits >> num_bits) & 0x1f) as usize;
            result.push(ALPHABET[idx] as char);
        }
    }

    if num_bits > 0 {
        let idx = ((bits << (5 - num_bits)) & 0x1f) as usize;
        result.push(ALPHABET[idx] as char);
    }

    result
}

/// Digest a canonical JSON value into a prefixed identifier.
pub fn prefixed_digest(prefix: &str, value: &Value) -> String {
    let bytes = canonical_json_bytes(value);
    let hash = Sha256::digest(bytes);
    format!("{prefix}_{}", hex_lower(&hash))
}

/// Complete identity material for one kernel run.
///
/// Exactly these fields contribute to `run_id`. The refinement ladder
/// changes one axis of this material per step; everything else is pinned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunIdentity {
    pub world_id: String,
    pub context_id: String,
    pub cover_id: String,
    pub ctx_ref: String,
    pub data_head_ref: String,
    pub adapter_id: String,
    pub adapter_version: String,
    pub normalizer_id: String,
    pub policy_digest: String,
    pub overlap_level_requested: OverlapLevel,
}

impl RunIdentity {
    /// Deterministic run identifier derived from canonical identity material.
    pub fn compute_run_id(&self) -> String {
        let value = serde_json::to_value(self).expect("RunIdentity must serialize");
        prefixed_digest("run1", &value)
    }

    /// The Mode binding this identity fixes for comparisons.
    pub fn mode(&self) -> ModeBinding {
        ModeBinding {
            normalizer_id: self.normalizer_id.clone(),
            policy_digest: self.policy_digest.clone(),
        }
    }
}
