//! Odds acquisition and American-odds math.
//!
//! Quotes come from a CSV file with columns
//! `game_date, away_team, home_team, away_odds, home_odds`, or from a
//! built-in sample slate when no usable file is available. Rows are filtered
//! to today's games; when none match, the whole file is used as an explicit,
//! logged fallback mode.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::types::OddsQuote;

/// Decimal odds are clamped to keep EV math sane on typo-sized prices
/// (+10000 or -10000 style inputs).
const DECIMAL_ODDS_MIN: f64 = 1.01;
const DECIMAL_ODDS_MAX: f64 = 101.0;

/// Implied probabilities are kept off the exact 0/1 boundary.
const IMPLIED_PROB_MIN: f64 = 0.01;
const IMPLIED_PROB_MAX: f64 = 0.99;

const REQUIRED_COLUMNS: &[&str] = &[
    "game_date",
    "away_team",
    "home_team",
    "away_odds",
    "home_odds",
];

/// Raw CSV row. Odds stay as text so a malformed price degrades to even
/// money instead of rejecting the row.
#[derive(Debug, Deserialize)]
struct OddsFileRow {
    game_date: String,
    away_team: String,
    home_team: String,
    away_odds: String,
    home_odds: String,
}

/// Today's matchups with moneyline prices, from a CSV file or the sample
/// slate.
#[derive(Debug, Clone, Default)]
pub struct OddsProvider {
    csv_path: Option<PathBuf>,
}

impl OddsProvider {
    pub fn new(csv_path: Option<PathBuf>) -> Self {
        Self { csv_path }
    }

    /// Load today's quotes. Never fails: a missing or malformed file falls
    /// back to the built-in sample slate with a warning.
    pub fn todays_odds(&self) -> Vec<OddsQuote> {
        let today = Local::now().date_naive();
        match &self.csv_path {
            Some(path) => match load_odds_csv(path) {
                Ok(quotes) => {
                    info!(rows = quotes.len(), path = %path.display(), "loaded odds file");
                    filter_to_date(quotes, today)
                }
                Err(err) => {
                    warn!(path = %path.display(), %err, "odds file unusable, using sample slate");
                    sample_slate(today)
                }
            },
            None => {
                info!("no odds file configured, using sample slate");
                sample_slate(today)
            }
        }
    }
}

/// Read and validate the odds CSV.
fn load_odds_csv(path: &Path) -> Result<Vec<OddsQuote>> {
    let mut reader = csv::Reader::from_path(path)?;

    let headers = reader.headers()?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(crate::CoreError::Parse(format!(
            "odds file missing required columns: {missing:?}"
        )));
    }

    let mut quotes = Vec::new();
    for record in reader.deserialize() {
        let row: OddsFileRow = record?;
        let Ok(date) = NaiveDate::parse_from_str(row.game_date.trim(), "%Y-%m-%d") else {
            warn!(game_date = %row.game_date, "unparseable game_date, dropping row");
            continue;
        };
        quotes.push(OddsQuote {
            date,
            visitor: row.away_team.trim().to_string(),
            home: row.home_team.trim().to_string(),
            visitor_moneyline: parse_moneyline(&row.away_odds, &row.away_team),
            home_moneyline: parse_moneyline(&row.home_odds, &row.home_team),
        });
    }
    Ok(quotes)
}

/// Parse an American price; malformed values become 0, which converts to
/// even money downstream.
fn parse_moneyline(raw: &str, team: &str) -> i32 {
    let cleaned = raw.trim().trim_start_matches('+');
    match cleaned.parse::<i32>() {
        Ok(odds) => odds,
        Err(_) => {
            warn!(team, odds = raw, "unparseable moneyline, treating as even money");
            0
        }
    }
}

/// Keep rows dated `today`; if none match, use the whole set. The fallback
/// is deliberate (a slate for the wrong date is still worth pricing) and
/// loud, never a silent default.
fn filter_to_date(all: Vec<OddsQuote>, today: NaiveDate) -> Vec<OddsQuote> {
    let todays: Vec<OddsQuote> = all.iter().filter(|q| q.date == today).cloned().collect();
    if todays.is_empty() && !all.is_empty() {
        warn!(
            rows = all.len(),
            %today,
            "no odds rows dated today, falling back to every row in the file"
        );
        return all;
    }
    todays
}

/// The built-in nine-game sample slate, dated `today`.
fn sample_slate(today: NaiveDate) -> Vec<OddsQuote> {
    const GAMES: &[(&str, &str, i32, i32)] = &[
        ("Dallas Mavericks", "Sacramento Kings", -150, 130),
        ("Denver Nuggets", "Orlando Magic", -180, 160),
        ("Phoenix Suns", "New Orleans Pelicans", -200, 170),
        ("New York Knicks", "Atlanta Hawks", -250, 205),
        ("Indiana Pacers", "Miami Heat", 305, -375),
        ("Milwaukee Bucks", "Chicago Bulls", 130, -150),
        ("Cleveland Cavaliers", "Houston Rockets", 150, -170),
        ("Brooklyn Nets", "Minnesota Timberwolves", 305, -375),
        ("Utah Jazz", "San Antonio Spurs", 800, -1350),
    ];
    GAMES
        .iter()
        .map(|&(visitor, home, visitor_moneyline, home_moneyline)| OddsQuote {
            date: today,
            visitor: visitor.to_string(),
            home: home.to_string(),
            visitor_moneyline,
            home_moneyline,
        })
        .collect()
}

/// Convert American odds to decimal odds.
///
/// Zero maps to even money (2.0), the value malformed prices degrade to
/// upstream. Output is clamped to [1.01, 101].
pub fn american_to_decimal(odds: i32) -> f64 {
    let decimal = if odds > 0 {
        odds as f64 / 100.0 + 1.0
    } else if odds < 0 {
        100.0 / (odds as f64).abs() + 1.0
    } else {
        2.0
    };
    decimal.clamp(DECIMAL_ODDS_MIN, DECIMAL_ODDS_MAX)
}

/// Market-implied win probability: the reciprocal of decimal odds, clamped
/// to [0.01, 0.99].
pub fn american_to_probability(odds: i32) -> f64 {
    (1.0 / american_to_decimal(odds)).clamp(IMPLIED_PROB_MIN, IMPLIED_PROB_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn decimal_conversion_reference_values() {
        // Kings +124 / Mavericks -148.
        assert!((american_to_decimal(124) - 2.24).abs() < 1e-9);
        assert!((american_to_decimal(-148) - 1.6756756756756757).abs() < 1e-9);
        assert_eq!(american_to_decimal(0), 2.0);
    }

    #[test]
    fn decimal_is_monotone_in_american_odds() {
        // Positive side: bigger underdog price, bigger payout.
        let mut prev = american_to_decimal(100);
        for odds in (105..=2000).step_by(5) {
            let dec = american_to_decimal(odds);
            assert!(dec >= prev, "decimal should not decrease at +{odds}");
            prev = dec;
        }
        // Negative side: payout grows as |odds| shrinks.
        let mut prev = american_to_decimal(-2000);
        for odds in (-1995..=-100).step_by(5) {
            let dec = american_to_decimal(odds);
            assert!(dec >= prev, "decimal should not decrease at {odds}");
            prev = dec;
        }
    }

    #[test]
    fn extreme_prices_are_clamped() {
        assert_eq!(american_to_decimal(1_000_000), 101.0);
        assert_eq!(american_to_decimal(-1_000_000), 1.01);
    }

    #[test]
    fn probability_is_reciprocal_within_clamps() {
        for odds in [-10_000, -250, -148, -101, 100, 124, 305, 10_000] {
            let dec = american_to_decimal(odds);
            let prob = american_to_probability(odds);
            let raw = 1.0 / dec;
            assert!((0.01..=0.99).contains(&prob));
            if (0.01..=0.99).contains(&raw) {
                assert!((prob - raw).abs() < 1e-12, "odds {odds}");
            }
        }
    }

    #[test]
    fn sample_slate_has_nine_games_today() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let slate = sample_slate(today);
        assert_eq!(slate.len(), 9);
        assert!(slate.iter().all(|q| q.date == today));
        assert_eq!(slate[0].visitor, "Dallas Mavericks");
        assert_eq!(slate[0].home, "Sacramento Kings");
    }

    #[test]
    fn date_filter_prefers_today() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let other = NaiveDate::from_ymd_opt(2026, 1, 14).unwrap();
        let mut quotes = sample_slate(today);
        quotes.extend(sample_slate(other));

        let filtered = filter_to_date(quotes, today);
        assert_eq!(filtered.len(), 9);
        assert!(filtered.iter().all(|q| q.date == today));
    }

    #[test]
    fn date_filter_falls_back_to_all_rows() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let stale = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        let quotes = sample_slate(stale);

        let filtered = filter_to_date(quotes.clone(), today);
        assert_eq!(filtered.len(), quotes.len());
    }

    #[test]
    fn malformed_moneyline_becomes_even_money() {
        assert_eq!(parse_moneyline("abc", "Utah Jazz"), 0);
        assert_eq!(parse_moneyline("+124", "Sacramento Kings"), 124);
        assert_eq!(parse_moneyline(" -148 ", "Dallas Mavericks"), -148);
    }

    #[test]
    fn csv_with_missing_columns_is_rejected() {
        let dir = std::env::temp_dir();
        let path = dir.join("courtline_odds_missing_cols.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "game_date,home_team,home_odds").unwrap();
        writeln!(file, "2026-01-15,Sacramento Kings,124").unwrap();

        let err = load_odds_csv(&path).unwrap_err();
        assert!(err.to_string().contains("missing required columns"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn csv_roundtrip_with_odd_values() {
        let dir = std::env::temp_dir();
        let path = dir.join("courtline_odds_roundtrip.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "game_date,away_team,home_team,away_odds,home_odds").unwrap();
        writeln!(file, "2026-01-15,Dallas Mavericks,Sacramento Kings,-148,+124").unwrap();
        writeln!(file, "2026-01-15,Utah Jazz,San Antonio Spurs,garbage,-1350").unwrap();
        writeln!(file, "not-a-date,Denver Nuggets,Orlando Magic,-180,160").unwrap();

        let quotes = load_odds_csv(&path).unwrap();
        assert_eq!(quotes.len(), 2, "row with a bad date is dropped");
        assert_eq!(quotes[0].visitor_moneyline, -148);
        assert_eq!(quotes[0].home_moneyline, 124);
        assert_eq!(quotes[1].visitor_moneyline, 0, "bad price degrades to even money");
        std::fs::remove_file(&path).ok();
    }
}
