use crate::cli::MockFailureArg;
use crate::support::{parse_or_exit, print_json};
use serde_json::json;
use sheafgate_kernel::descent::{ContractibilityBasis, GlueMethod, GlueResult};
use sheafgate_kernel::identity::RunIdentity;
use sheafgate_kernel::mode::OverlapLevel;
use sheafgate_kernel::witness::{
    GateFailure, GateWitness, Phase, ResponsibleComponent, failure_class,
};

pub struct Args {
    pub world_id: String,
    pub context_id: String,
    pub cover_id: String,
    pub ctx_ref: String,
    pub data_head_ref: String,
    pub adapter_id: String,
    pub adapter_version: String,
    pub normalizer_id: String,
    pub policy_digest: String,
    pub overlap_level: String,
    pub failures: Vec<MockFailureArg>,
    pub json: bool,
}

pub fn run(args: Args) {
    let overlap_level: OverlapLevel = parse_or_exit(&args.overlap_level, "overlap level");

    let identity = RunIdentity {
        world_id: args.world_id,
        context_id: args.context_id,
        cover_id: args.cover_id,
        ctx_ref: args.ctx_ref,
        data_head_ref: args.data_head_ref,
        adapter_id: args.adapter_id,
        adapter_version: args.adapter_version,
        normalizer_id: args.normalizer_id,
        policy_digest: args.policy_digest,
        overlap_level_requested: overlap_level,
    };

    let witness = if args.failures.is_empty() {
        GateWitness::accepted(
            &identity,
            GlueResult {
                selected: "proposal:mock".to_string(),
                contractibility_basis: ContractibilityBasis {
                    mode: identity.mode(),
                    method: GlueMethod::NormalForm,
                    proof_refs: vec!["proposal:mock".to_string()],
                },
            },
        )
    } else {
        let failures = args
            .failures
            .iter()
            .enumerate()
            .map(|(idx, arg)| {
                let (class, phase, component, message) = mock_failure_metadata(*arg);
                GateFailure::new(
                    class,
                    phase,
                    component,
                    message,
                    Some(format!("mock/{}", idx + 1)),
                    Some(json!({"index": idx})),
                )
            })
            .collect();
        GateWitness::rejected(&identity, failures)
    };

    if args.json {
        print_json(&witness);
    } else {
        println!("sheafgate mock-gate");
        println!("  Run ID: {}", witness.run_id);
        println!("  Result: {}", witness.result);
        println!("  Failures: {}", witness.failures.len());
        for failure in &witness.failures {
            println!(
                "    - [{}] {} (phase={})",
                failure.class,
                failure.message,
                failure.phase.as_str()
            );
        }
    }
}

fn mock_failure_metadata(
    arg: MockFailureArg,
) -> (&'static str, Phase, ResponsibleComponent, &'static str) {
    match arg {
        MockFailureArg::MissingLocal => (
            failure_class::LOCALITY_FAILURE,
            Phase::Restrict,
            ResponsibleComponent::Adapter,
            "missing local state for a required cover part",
        ),
        MockFailureArg::MissingOverlapWitness => (
            failure_class::LOCALITY_FAILURE,
            Phase::Compat,
            ResponsibleComponent::Adapter,
            "missing compat witness for a required overlap obligation",
        ),
        MockFailureArg::ContextInstability => (
            failure_class::STABILITY_FAILURE,
            Phase::Restrict,
            ResponsibleComponent::ContextProvider,
            "local state was produced against a different context snapshot",
        ),
        MockFailureArg::WitnessIncoherent => (
            failure_class::DESCENT_FAILURE,
            Phase::Compat,
            ResponsibleComponent::World,
            "compat witness fails re-evaluated coherence",
        ),
        MockFailureArg::NoValidProposal => (
            failure_class::DESCENT_FAILURE,
            Phase::ProposeGlue,
            ResponsibleComponent::Adapter,
            "no valid glue proposal survives descent existence",
        ),
        MockFailureArg::NonContractibleSelection => (
            failure_class::GLUE_NON_CONTRACTIBLE,
            Phase::SelectGlue,
            ResponsibleComponent::World,
            "multiple inequivalent glue candidates remain under the declared mode",
        ),
        MockFailureArg::ModeComparisonUnavailable => (
            failure_class::DESCENT_FAILURE,
            Phase::Normalize,
            ResponsibleComponent::World,
            "mode comparison unavailable during glue selection",
        ),
    }
}
