//! Error types for Sheafgate kernel operations.
//!
//! These are host-input errors, not gate verdicts: a malformed cover
//! strategy or a duplicate local is a caller bug and surfaces as an
//! error, while adapter-visible problems (missing locals, bad witnesses)
//! flow through the failure-class taxonomy into a `GateWitness`.

/// Errors arising from malformed kernel inputs or refinement misuse.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    /// A cover strategy cannot be turned into a kernel-owned cover.
    #[error("invalid cover: {0}")]
    InvalidCover(String),

    /// Descent input is structurally unusable (duplicate locals, etc.).
    #[error("invalid descent input: {0}")]
    InvalidInput(String),

    /// A refinement step violates the one-axis law.
    #[error("refinement violation: {0}")]
    Refinement(String),
}
