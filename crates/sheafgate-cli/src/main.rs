//! Sheafgate CLI: the `sheafgate` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::GateCheck {
            request,
            world,
            json,
        } => commands::gate_check::run(request, world, json),

        Commands::MockGate {
            world_id,
            context_id,
            cover_id,
            ctx_ref,
            data_head_ref,
            adapter_id,
            adapter_version,
            normalizer_id,
            policy_digest,
            overlap_level,
            failures,
            json,
        } => commands::mock_gate::run(commands::mock_gate::Args {
            world_id,
            context_id,
            cover_id,
            ctx_ref,
            data_head_ref,
            adapter_id,
            adapter_version,
            normalizer_id,
            policy_digest,
            overlap_level,
            failures,
            json,
        }),

        Commands::RefineNext {
            witness,
            tried,
            json,
        } => commands::refine_next::run(witness, tried, json),

        Commands::TransportCheck { envelope, json } => {
            commands::transport_check::run(envelope, json)
        }
    }
}
