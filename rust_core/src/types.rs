//! Core value types. Everything here is recomputed each run; there is no
//! persistent store and no identity beyond the run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-team season aggregates from the advanced stats table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSeasonStats {
    pub team: String,
    /// Possessions per game.
    pub pace: f64,
    /// Points scored per 100 possessions.
    pub ortg: f64,
    /// Points allowed per 100 possessions.
    pub drtg: f64,
    /// Net rating (ortg - drtg).
    pub nrtg: f64,
}

impl TeamSeasonStats {
    /// A row with any non-finite rating is excluded from training and
    /// inference.
    pub fn is_usable(&self) -> bool {
        [self.pace, self.ortg, self.drtg, self.nrtg]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// A schedule row as scraped, before cleaning. Point cells stay as text
/// because games that have not been played yet carry empty cells.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawScheduleRow {
    pub date: String,
    pub visitor: String,
    pub visitor_pts: String,
    pub home: String,
    pub home_pts: String,
}

/// A completed historical game with its home-win label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalGame {
    pub date: NaiveDate,
    pub visitor: String,
    pub home: String,
    pub visitor_pts: u32,
    pub home_pts: u32,
    pub home_win: bool,
}

/// A historical game joined with both sides' season stats. Both joins must
/// have resolved for the record to exist.
#[derive(Debug, Clone)]
pub struct TrainingRecord {
    pub game: HistoricalGame,
    pub visitor_stats: TeamSeasonStats,
    pub home_stats: TeamSeasonStats,
}

/// One matchup from the odds source with American moneyline prices for
/// each side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddsQuote {
    pub date: NaiveDate,
    pub visitor: String,
    pub home: String,
    /// American odds; 0 means the price was unparseable and is treated as
    /// even money downstream.
    pub visitor_moneyline: i32,
    pub home_moneyline: i32,
}

impl OddsQuote {
    /// "Visitor @ Home" label used in reports.
    pub fn matchup_label(&self) -> String {
        format!("{} @ {}", self.visitor, self.home)
    }
}

/// One evaluated side of a matchup. Ordering by descending EV defines the
/// output ranking.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResult {
    pub matchup: String,
    /// The side this row prices (team name as quoted by the odds source).
    pub bet: String,
    pub odds: i32,
    /// Model win probability for this side, after clipping.
    pub model_prob: f64,
    /// Market-implied probability from the American price.
    pub market_prob: f64,
    /// `model_prob * decimal_odds - 1`.
    pub ev: f64,
    /// Whether EV clears the configured reporting threshold. Cosmetic; never
    /// gates emission.
    pub signal: bool,
}

/// A matchup the evaluation engine could not price, with the reason.
#[derive(Debug, Clone)]
pub struct SkippedMatchup {
    pub matchup: String,
    pub reason: String,
}
