use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "sheafgate",
    about = "Sheafgate: deterministic admissibility checks over pluggable worlds",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full admissibility pipeline on a gate request document.
    ///
    /// Exits 0 on acceptance, 2 on a rejected witness.
    GateCheck {
        /// Path to the GateRequest JSON document
        #[arg(long)]
        request: String,

        /// Reference world to check against
        #[arg(long, default_value = "slot_map")]
        world: String,

        /// Output the witness as JSON
        #[arg(long)]
        json: bool,
    },

    /// Emit a synthetic GateWitness from flag-selected failure kinds
    MockGate {
        /// World identifier
        #[arg(long, default_value = "world.dev")]
        world_id: String,

        /// Context object identifier
        #[arg(long, default_value = "ctx.main")]
        context_id: String,

        /// Cover identifier
        #[arg(long, default_value = "cover1_mock")]
        cover_id: String,

        /// Context lineage reference
        #[arg(long, default_value = "snap:head")]
        ctx_ref: String,

        /// Event-store data head reference
        #[arg(long, default_value = "ev:head")]
        data_head_ref: String,

        /// Adapter identifier
        #[arg(long, default_value = "adapter.mock")]
        adapter_id: String,

        /// Adapter version
        #[arg(long, default_value = "0.1.0")]
        adapter_version: String,

        /// Normalizer identifier
        #[arg(long, default_value = "normalizer.mock.v1")]
        normalizer_id: String,

        /// Policy digest value
        #[arg(long, default_value = "policy.mock.v1")]
        policy_digest: String,

        /// Requested overlap level (pairwise or higher_cech)
        #[arg(long, default_value = "pairwise")]
        overlap_level: String,

        /// Failure kind(s) to synthesize (repeatable; none means accept)
        #[arg(long = "failure", value_enum)]
        failures: Vec<MockFailureArg>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Propose the next deterministic refinement step for a witness
    RefineNext {
        /// Path to the GateWitness JSON document
        #[arg(long)]
        witness: String,

        /// Axis already tried in this chain (repeatable)
        #[arg(long = "tried")]
        tried: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Structurally validate a transport witness envelope
    TransportCheck {
        /// Path to the envelope JSON document
        #[arg(long)]
        envelope: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Synthetic failure kinds for mock-gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MockFailureArg {
    MissingLocal,
    MissingOverlapWitness,
    ContextInstability,
    WitnessIncoherent,
    NoValidProposal,
    NonContractibleSelection,
    ModeComparisonUnavailable,
}
