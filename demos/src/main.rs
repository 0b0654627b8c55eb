// Usage
// cargo run --package example_addon_demos -- worker
// RUST_LOG=example_addon=debug cargo run --package example_addon_demos -- worker

mod arguments;
mod native_exec;
mod object_wrap;
mod promises;
mod values;
mod worker;

use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let example = std::env::args()
    .collect::<Vec<String>>()
    .get(1)
    .cloned()
    .unwrap_or("values".to_string());

  match example.as_str() {
    "values" => values::main(),
    "arguments" => arguments::main(),
    "promises" => promises::main(),
    "worker" => worker::main(),
    "object_wrap" => object_wrap::main(),
    "native_exec" => native_exec::main(),
    _ => Err(anyhow::anyhow!("No example for: \"{}\"", example)),
  }
}
