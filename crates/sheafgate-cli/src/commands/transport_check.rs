use crate::support::{print_json, read_json_or_exit};
use serde_json::json;
use sheafgate_transport::validate_envelope;

pub fn run(envelope_path: String, json: bool) {
    let envelope = read_json_or_exit(&envelope_path);
    let issues = validate_envelope(&envelope);

    if json {
        let payload = json!({
            "valid": issues.is_empty(),
            "issues": issues,
        });
        print_json(&payload);
    } else {
        println!("sheafgate transport-check");
        println!("  Valid: {}", if issues.is_empty() { "yes" } else { "no" });
        for issue in &issues {
            println!("    - [{}] {}: {}", issue.class, issue.path, issue.message);
        }
    }

    if !issues.is_empty() {
        std::process::exit(2);
    }
}
