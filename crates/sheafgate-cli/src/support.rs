use serde::de::DeserializeOwned;
use serde_json::Value;
use sheafgate_kernel::World;
use sheafgate_kernel::toy::get_world;
use std::fs;

pub fn read_json_or_exit(path: &str) -> Value {
    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("error: failed to read {path}: {e}");
        std::process::exit(1);
    });
    serde_json::from_str(&text).unwrap_or_else(|e| {
        eprintln!("error: failed to parse {path}: {e}");
        std::process::exit(1);
    })
}

pub fn decode_or_exit<T: DeserializeOwned>(value: Value, what: &str) -> T {
    serde_json::from_value(value).unwrap_or_else(|e| {
        eprintln!("error: invalid {what}: {e}");
        std::process::exit(1);
    })
}

pub fn world_or_exit(name: &str) -> Box<dyn World> {
    get_world(name).unwrap_or_else(|| {
        eprintln!("error: unknown world: {name}");
        std::process::exit(1);
    })
}

pub fn parse_or_exit<T>(input: &str, what: &str) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    input.parse().unwrap_or_else(|e| {
        eprintln!("error: invalid {what}: {e}");
        std::process::exit(1);
    })
}

pub fn print_json(value: &impl serde::Serialize) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).expect("json serialization")
    );
}
