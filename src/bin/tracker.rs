//! Live tracking runtime: replays a captured tick stream through the match
//! state machine and lands ball records in the selected backend.
//!
//! ```text
//! tracker --input ticks.jsonl [--backend csv|jsonl|sqlite] [--output PATH]
//! ```

use cricflow::config::{parse_backend_from_args, BackendType, TrackerConfig};
use cricflow::storage::BallSink;
use cricflow::tracker::{MatchTracker, ReplaySource};

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|idx| args.get(idx + 1))
        .cloned()
}

fn default_output(backend: &BackendType) -> &'static str {
    match backend {
        BackendType::Csv => "data/balls.csv",
        BackendType::Jsonl => "data/events.jsonl",
        BackendType::Sqlite => "data/balls.db",
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    let input = match arg_value(&args, "--input") {
        Some(path) => path,
        None => {
            eprintln!("Usage: tracker --input ticks.jsonl [--backend csv|jsonl|sqlite] [--output PATH]");
            std::process::exit(2);
        }
    };
    let backend = parse_backend_from_args(&args);
    let output = arg_value(&args, "--output").unwrap_or_else(|| default_output(&backend).to_string());

    let config = TrackerConfig::from_env()?;
    log::info!("🚀 Starting tracker");
    log::info!("   Input: {}", input);
    log::info!("   Backend: {} -> {}", backend.as_str(), output);
    log::info!(
        "   Poll interval: {}ms | error tolerance: {} | waiting patience: {} ticks",
        config.poll_interval_ms,
        config.max_consecutive_errors,
        config.max_waiting_ticks
    );

    let source = ReplaySource::open(&input)?;
    let sink = BallSink::create(backend, &output)?;

    let mut tracker = MatchTracker::new(config, source, sink);
    let matches = tracker.run().await;

    log::info!("Done: {} matches tracked", matches);
    Ok(())
}
