//! Edge Finder Service (Rust)
//!
//! End-to-end batch run:
//! - Scrape team season stats and the historical schedule
//! - Clean, join, and train the home-win probability model
//! - Load today's moneyline odds (CSV file or the built-in sample slate)
//! - Price both sides of every matchup and print the slate ranked by EV
//!
//! All data is collected before training begins; the join, feature, model,
//! and EV steps are pure functions over that snapshot.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use courtline_rust_core::clients::{BasketballReferenceClient, StatsSource};
use courtline_rust_core::evaluate::EvaluationEngine;
use courtline_rust_core::features::{training_matrix, FeatureSchema};
use courtline_rust_core::odds::OddsProvider;
use courtline_rust_core::processing::{build_training_table, clean_schedule};
use courtline_rust_core::win_prob::WinProbabilityModel;
use courtline_rust_core::EngineConfig;
use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod report;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("run failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config = EngineConfig::from_env();
    // Odds file: first CLI argument, else ODDS_CSV, else the sample slate.
    let odds_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| env::var("ODDS_CSV").ok().map(PathBuf::from));

    let source = BasketballReferenceClient::with_pause(config.request_pause_secs);
    info!(
        source = source.source_name(),
        year = config.season_year,
        "collecting season data"
    );
    let (stats, schedule) = tokio::try_join!(
        source.fetch_team_stats(config.season_year),
        source.fetch_schedule(config.season_year)
    )
    .context("season data fetch failed")?;

    let games = clean_schedule(&schedule);
    let records = build_training_table(&games, &stats)?;

    let schema = FeatureSchema::full();
    let (rows, labels) = training_matrix(&records);
    let mut model = WinProbabilityModel::new(&config);
    let training = model
        .train(&rows, &labels, &schema)
        .context("model training failed")?;
    if let Some(accuracy) = training.holdout_accuracy {
        info!(
            samples = training.samples,
            holdout = training.holdout_samples,
            accuracy,
            "model trained"
        );
    }

    let provider = OddsProvider::new(odds_path);
    let quotes = provider.todays_odds();

    let engine = EvaluationEngine::new(&config, &stats, &model, &schema);
    let slate = engine.evaluate_slate(&quotes)?;

    for skip in &slate.skipped {
        println!("Skipping {} ({})", skip.matchup, skip.reason);
    }
    if slate.results.is_empty() {
        println!("No betting opportunities found with current data matches.");
        return Ok(());
    }

    report::print_table(&slate.results);
    let path = report::write_csv(&slate.results).context("failed to write results file")?;
    info!(path = %path.display(), "results written");
    Ok(())
}
