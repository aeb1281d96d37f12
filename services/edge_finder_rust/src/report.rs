//! Console table and CSV persistence for evaluation results.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use courtline_rust_core::EvaluationResult;

const CSV_HEADER: &[&str] = &[
    "Matchup",
    "Bet",
    "Odds",
    "Model_Prob",
    "Market_Prob",
    "EV%",
    "EV",
    "Signal",
];

fn signal_label(result: &EvaluationResult) -> &'static str {
    if result.signal {
        "BET"
    } else {
        "no edge"
    }
}

/// Print the ranked slate as an aligned table.
pub fn print_table(results: &[EvaluationResult]) {
    println!(
        "{:<42} {:<26} {:>6} {:>10} {:>11} {:>8} {:>9}  Signal",
        "Matchup", "Bet", "Odds", "Model_Prob", "Market_Prob", "EV%", "EV"
    );
    for result in results {
        println!(
            "{:<42} {:<26} {:>+6} {:>10.4} {:>11.4} {:>7.2}% {:>9.4}  {}",
            result.matchup,
            result.bet,
            result.odds,
            result.model_prob,
            result.market_prob,
            result.ev * 100.0,
            result.ev,
            signal_label(result)
        );
    }
}

/// Write the slate to `nba_bets_<timestamp>.csv` in the working directory
/// and return the path.
pub fn write_csv(results: &[EvaluationResult]) -> Result<PathBuf> {
    let name = format!("nba_bets_{}.csv", Local::now().format("%Y%m%d_%H%M%S"));
    write_csv_to(Path::new("."), &name, results)
}

fn write_csv_to(dir: &Path, name: &str, results: &[EvaluationResult]) -> Result<PathBuf> {
    let path = dir.join(name);
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(CSV_HEADER)?;
    for result in results {
        writer.write_record(&[
            result.matchup.clone(),
            result.bet.clone(),
            format!("{:+}", result.odds),
            format!("{:.4}", result.model_prob),
            format!("{:.4}", result.market_prob),
            format!("{:.2}", result.ev * 100.0),
            format!("{:.4}", result.ev),
            signal_label(result).to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(path)
}
