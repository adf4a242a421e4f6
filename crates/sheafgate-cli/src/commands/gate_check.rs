use crate::support::{decode_or_exit, print_json, read_json_or_exit, world_or_exit};
use sheafgate_kernel::gate::{GateRequest, run_gate};

pub fn run(request_path: String, world_name: String, json: bool) {
    let request: GateRequest =
        decode_or_exit(read_json_or_exit(&request_path), "gate request");
    let world = world_or_exit(&world_name);

    let witness = run_gate(world.as_ref(), &request).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });

    if json {
        print_json(&witness);
    } else {
        println!("sheafgate gate-check --world {world_name}");
        println!("  Run ID: {}", witness.run_id);
        println!("  Result: {}", witness.result);
        if let Some(glue) = &witness.glue {
            println!("  Selected: {}", glue.selected);
        }
        println!("  Failures: {}", witness.failures.len());
        for failure in &witness.failures {
            println!(
                "    - [{}] {} (phase={}, component={})",
                failure.class,
                failure.message,
                failure.phase.as_str(),
                failure.responsible_component.as_str()
            );
        }
    }

    if !witness.is_accepted() {
        std::process::exit(2);
    }
}
