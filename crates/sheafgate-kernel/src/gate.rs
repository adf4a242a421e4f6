//! The admissibility pipeline.
//!
//! One run is a pure function of `(request, world, Mode)`: build the
//! kernel-owned cover, negotiate the overlap level, enumerate
//! obligations, then check locality → descent-existence →
//! contractibility and emit exactly one witness. No I/O, no shared
//! state, no retries inside a run. Concurrent callers need no
//! coordination, and duplicate computation of the same core is always
//! safe to discard.

use crate::contract::select_glue;
use crate::cover::{Cover, CoverStrategy};
use crate::descent::{
    CompatWitness, DescentCore, GlueProposal, GlueSelectionFailure, LocalState,
};
use crate::error::KernelError;
use crate::existence::check_existence;
use crate::identity::RunIdentity;
use crate::locality::check_locality;
use crate::mode::{ModeBinding, OverlapLevel};
use crate::witness::{
    GateFailure, GateWitness, Phase, ResponsibleComponent, failure_class,
};
use crate::world::World;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// The inbound check request, as handed over by a host-owned command
/// surface. Locals, witnesses, and proposals are adapter-produced and
/// opaque; the cover strategy is only a proposal until the kernel
/// constructs the cover from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GateRequest {
    pub world_id: String,
    pub context_id: String,
    pub ctx_ref: String,
    pub data_head_ref: String,
    pub adapter_id: String,
    pub adapter_version: String,
    pub cover_strategy: CoverStrategy,
    pub locals: Vec<LocalState>,
    #[serde(default)]
    pub compat: Vec<CompatWitness>,
    #[serde(default)]
    pub glue_proposals: Vec<GlueProposal>,
    pub mode: ModeBinding,
    #[serde(default)]
    pub overlap_level_requested: OverlapLevel,
}

impl GateRequest {
    /// Run identity material for this request over a constructed cover.
    pub fn identity(&self, cover_id: &str) -> RunIdentity {
        RunIdentity {
            world_id: self.world_id.clone(),
            context_id: self.context_id.clone(),
            cover_id: cover_id.to_string(),
            ctx_ref: self.ctx_ref.clone(),
            data_head_ref: self.data_head_ref.clone(),
            adapter_id: self.adapter_id.clone(),
            adapter_version: self.adapter_version.clone(),
            normalizer_id: self.mode.normalizer_id.clone(),
            policy_digest: self.mode.policy_digest.clone(),
            overlap_level_requested: self.overlap_level_requested,
        }
    }
}

/// Run the full admissibility pipeline for one request.
///
/// Errors are host-input problems (malformed strategy, duplicate
/// locals); every adapter-visible condition terminates in a witness.
pub fn run_gate(world: &dyn World, request: &GateRequest) -> Result<GateWitness, KernelError> {
    let cover = Cover::build(&request.context_id, &request.cover_strategy)?;
    let identity = request.identity(&cover.cover_id);

    // Capability negotiation. An unsupported level is a deterministic
    // rejection, never a silent downgrade.
    let supported = world.supported_overlap_level();
    if !supported.subsumes(request.overlap_level_requested) {
        let failure = GateFailure::new(
            failure_class::DESCENT_FAILURE,
            Phase::Compat,
            ResponsibleComponent::World,
            "requested overlap level is not supported by this world",
            None,
            Some(json!({
                "overlapLevelRequested": request.overlap_level_requested.as_str(),
                "overlapLevelSupported": supported.as_str(),
            })),
        );
        return Ok(GateWitness::rejected(&identity, vec![failure]));
    }

    let obligations = cover.enumerate_overlaps(request.overlap_level_requested);
    let core = DescentCore::assemble(
        cover,
        request.locals.clone(),
        request.compat.clone(),
        request.mode.clone(),
    )?;

    let locality_failures = check_locality(&core, &request.ctx_ref, &obligations);
    if !locality_failures.is_empty() {
        return Ok(GateWitness::rejected(&identity, locality_failures));
    }

    let existence = check_existence(world, &core, &obligations, &request.glue_proposals);
    if !existence.failures.is_empty() {
        return Ok(GateWitness::rejected(&identity, existence.failures));
    }

    match select_glue(world, &core.mode, &existence.surviving) {
        Ok(glue) => Ok(GateWitness::accepted(&identity, glue)),
        Err(failure) => Ok(GateWitness::rejected(
            &identity,
            vec![selection_failure_to_gate(failure, existence.surviving.len())],
        )),
    }
}

/// Map a selection refusal onto the gate failure taxonomy.
fn selection_failure_to_gate(failure: GlueSelectionFailure, surviving: usize) -> GateFailure {
    match failure {
        GlueSelectionFailure::NoValidProposal => GateFailure::new(
            failure_class::DESCENT_FAILURE,
            Phase::ProposeGlue,
            ResponsibleComponent::Adapter,
            "no valid glue proposal survives descent existence",
            Some("glueProposals".to_string()),
            Some(json!({"survivingCount": surviving})),
        ),
        GlueSelectionFailure::NonContractibleSelection => GateFailure::new(
            failure_class::GLUE_NON_CONTRACTIBLE,
            Phase::SelectGlue,
            ResponsibleComponent::World,
            "multiple inequivalent glue candidates remain under the declared mode",
            Some("glueProposals".to_string()),
            Some(json!({"survivingCount": surviving})),
        ),
        GlueSelectionFailure::ModeComparisonUnavailable => GateFailure::new(
            failure_class::DESCENT_FAILURE,
            Phase::Normalize,
            ResponsibleComponent::World,
            "mode comparison unavailable during glue selection",
            Some("glueProposals".to_string()),
            Some(json!({"survivingCount": surviving})),
        ),
    }
}
