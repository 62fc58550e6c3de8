//! Quiz Clash, played over a line protocol.
//!
//! Walk the school, answer the teachers' questions, fight the ones you
//! can't, and beat Lars.
//!
//! ```bash
//! cargo run -p clash -- --name "Elliot" --seed 42
//! ```

mod headless;
mod map;
mod roster;

use headless::{parse_config_from_args, run_headless, HeadlessConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Logs go to stderr so they never mix with the protocol on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let config = parse_config_from_args(&args, HeadlessConfig::from_env());
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    tracing::info!(
        target: "clash",
        player = %config.player_name,
        seed = ?config.seed,
        json = config.json,
        "starting headless game"
    );

    // The engine blocks on input while boss regeneration ticks on the runtime.
    tokio::task::block_in_place(|| run_headless(&config, rng))?;
    Ok(())
}

fn print_help() {
    println!("Quiz Clash");
    println!();
    println!("Usage: clash [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --name <NAME>     Player name (env: CLASH_PLAYER_NAME)");
    println!("  --seed <N>        Seed for a reproducible game (env: CLASH_SEED)");
    println!("  --regen-ms <MS>   Boss regeneration interval (env: CLASH_REGEN_INTERVAL_MS)");
    println!("  --json            Also print status and events as JSON lines");
    println!("  -h, --help        Show this help");
    println!();
    println!("Logging is controlled with RUST_LOG (e.g. RUST_LOG=clash=debug).");
}
