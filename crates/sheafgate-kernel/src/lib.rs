//! # Sheafgate Kernel
//!
//! A semantic admissibility kernel: given local results produced over
//! overlapping partitions of a shared context, decide whether they merge
//! into exactly one globally consistent result, and if not, say
//! precisely why.
//!
//! The kernel is **domain-agnostic**: local states, compatibility
//! witnesses, and glue proposals are opaque payload-plus-digest values.
//! Everything content-dependent goes through one narrow world interface;
//! every higher layer is a client of this kernel's verdict and none may
//! originate admissibility decisions itself.
//!
//! ## Pipeline
//!
//! ```text
//! GateRequest            ← adapter-supplied inputs, host-owned surface
//!     │
//! Cover                  ← kernel-owned partition + overlap obligations
//!     │
//! Locality               ← every part has a local, every overlap a witness
//!     │
//! Descent existence      ← witnesses re-evaluated, proposals filtered
//!     │
//! Contractibility        ← one equivalence class, one representative
//!     │
//! GateWitness            ← canonical, deterministically identified
//! ```
//!
//! On rejection, the refinement ladder proposes the next one-axis retry;
//! the pipeline itself never loops.

pub mod contract;
pub mod cover;
pub mod descent;
pub mod error;
pub mod existence;
pub mod gate;
pub mod identity;
pub mod locality;
pub mod mode;
pub mod refine;
pub mod toy;
pub mod witness;
pub mod world;

pub use contract::{payload_digest, select_glue};
pub use cover::{Cover, CoverPart, CoverPartId, CoverStrategy, OverlapObligation, PartSpec};
pub use descent::{
    CompatWitness, ContractibilityBasis, DescentCore, GlueMethod, GlueProposal, GlueProposalSet,
    GlueResult, GlueSelectionFailure, LocalState,
};
pub use error::KernelError;
pub use existence::{ExistenceOutcome, check_existence};
pub use gate::{GateRequest, run_gate};
pub use identity::RunIdentity;
pub use locality::check_locality;
pub use mode::{ModeBinding, OverlapLevel};
pub use refine::{RefinementAxis, RefinementStep, next_step, verify_one_axis};
pub use witness::{GateFailure, GateWitness, Phase, ResponsibleComponent, failure_class};
pub use world::World;
