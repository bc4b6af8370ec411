use std::path::PathBuf;

use clap::Parser;

use euchre_bench::config::{BenchmarkConfig, ResolvedOutputs, RunMode};
use euchre_bench::logging::init_logging;
use euchre_bench::tournament::TournamentRunner;

/// Seeded simulation harness for Euchre bots.
#[derive(Debug, Parser)]
#[command(
    name = "euchre-bench",
    author,
    version,
    about = "Deterministic Euchre simulation harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the RNG seed for match and deck generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the number of matches (decks in bid_sweep mode).
    #[arg(long, value_name = "COUNT")]
    matches: Option<usize>,

    /// Stop after this many deals regardless of match progress.
    #[arg(long, value_name = "DEALS")]
    max_deals: Option<usize>,

    /// Exit after validating the configuration (nothing is simulated).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(seed) = cli.seed {
        config.deals.seed = Some(seed);
    }

    if let Some(matches) = cli.matches {
        config.deals.matches = matches;
    }

    if let Some(max_deals) = cli.max_deals {
        config.deals.max_deals = Some(max_deals);
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let mode = config.deals.mode;
    let units = config.deals.matches;

    println!(
        "Loaded configuration '{run_id}' in {mode:?} mode ({units} {}, seed {})",
        match mode {
            RunMode::Matches => "matches",
            RunMode::BidSweep => "decks",
        },
        config.deals.seed.unwrap_or(0)
    );

    let logging_guard = init_logging(&config.logging, &outputs)?;
    let runner = TournamentRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: simulation skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Run complete for '{run_id}': {} units, {} deals → {} rows at {}",
        summary.units_completed,
        summary.deals_played,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    if summary.mode == RunMode::Matches {
        println!(
            "Match wins: North/South {} | East/West {}",
            summary.match_wins[0], summary.match_wins[1]
        );
    }
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    Ok(())
}
