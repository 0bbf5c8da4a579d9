//! Offline pattern analysis: reads a ball-record corpus, builds the four
//! signature indices and writes every match back out with the eight pattern
//! columns appended.
//!
//! ```text
//! analyzer [--backend csv|sqlite] [--input PATH] [--output PATH]
//! ```
//!
//! The output format follows the output path's extension (`.jsonl` for
//! JSONL, anything else is CSV).

use cricflow::config::{parse_backend_from_args, BackendType};
use cricflow::history::{annotate_corpus, read_corpus_csv, AnnotatedWriter, HistoryIndex};
use cricflow::storage::SqliteBallStore;

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|idx| args.get(idx + 1))
        .cloned()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let backend = parse_backend_from_args(&args);

    let input = arg_value(&args, "--input").unwrap_or_else(|| {
        match backend {
            BackendType::Sqlite => "data/balls.db",
            _ => "data/balls.csv",
        }
        .to_string()
    });
    let output = arg_value(&args, "--output").unwrap_or_else(|| "data/annotated.csv".to_string());

    log::info!("🔍 Analyzing corpus {} ({})", input, backend.as_str());

    let records = match backend {
        BackendType::Sqlite => SqliteBallStore::open(&input)?.load_corpus()?,
        _ => read_corpus_csv(&input)?,
    };
    if records.is_empty() {
        log::warn!("Corpus is empty, nothing to analyze");
        return Ok(());
    }

    let index = HistoryIndex::build(&records);
    log::info!(
        "   {} rows across {} matches, {} distinct over sequences",
        records.len(),
        index.match_count(),
        index.overs.len()
    );

    let annotated = annotate_corpus(&index, &records);

    let output_backend = if output.ends_with(".jsonl") {
        BackendType::Jsonl
    } else {
        BackendType::Csv
    };
    let mut writer = AnnotatedWriter::create(output_backend, &output)?;
    for record in &annotated {
        writer.write(record)?;
    }
    let backend_name = writer.backend_type();
    writer.finish()?;

    log::info!("💾 Wrote {} annotated rows to {} ({})", annotated.len(), output, backend_name);
    Ok(())
}
