use crate::support::{decode_or_exit, parse_or_exit, print_json, read_json_or_exit};
use serde_json::json;
use sheafgate_kernel::refine::{RefinementAxis, next_step};
use sheafgate_kernel::witness::GateWitness;

pub fn run(witness_path: String, tried: Vec<String>, json: bool) {
    let witness: GateWitness =
        decode_or_exit(read_json_or_exit(&witness_path), "gate witness");
    let tried: Vec<RefinementAxis> = tried
        .iter()
        .map(|axis| parse_or_exit(axis, "refinement axis"))
        .collect();

    let step = next_step(&witness, &tried);

    if json {
        let payload = match &step {
            Some(step) => json!({
                "parentRunId": step.parent_run_id,
                "refinementAxis": step.refinement_axis,
            }),
            None if witness.is_accepted() => json!({"accepted": true}),
            None => json!({"exhausted": true}),
        };
        print_json(&payload);
    } else {
        println!("sheafgate refine-next");
        match &step {
            Some(step) => {
                println!("  Parent run: {}", step.parent_run_id);
                println!("  Next axis: {}", step.refinement_axis);
            }
            None if witness.is_accepted() => {
                println!("  Witness accepted; no refinement needed");
            }
            None => {
                println!("  Refinement plan exhausted; reject is final");
            }
        }
    }
}
