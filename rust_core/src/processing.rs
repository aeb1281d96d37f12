//! Schedule cleaning and the stats join that builds the training table.
//!
//! Both steps are pure functions over already-collected data. Row drops are
//! counted and logged so a shrinking training set is visible in the run log.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::error::{CoreError, Result};
use crate::types::{HistoricalGame, RawScheduleRow, TeamSeasonStats, TrainingRecord};
use crate::utils::matching::normalize_team_name;

/// Schedule dates come as basketball-reference's "Tue, Oct 22, 2024" or ISO.
fn parse_game_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%a, %b %d, %Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}

/// Clean raw schedule rows into labeled historical games.
///
/// A row with a missing or non-numeric point cell is a game that has not
/// been played and is dropped. Team names are normalized here, before any
/// join or match downstream.
pub fn clean_schedule(rows: &[RawScheduleRow]) -> Vec<HistoricalGame> {
    let mut games = Vec::with_capacity(rows.len());
    let mut not_played = 0usize;
    let mut malformed = 0usize;

    for row in rows {
        let Some(date) = parse_game_date(&row.date) else {
            malformed += 1;
            continue;
        };
        let visitor = normalize_team_name(&row.visitor);
        let home = normalize_team_name(&row.home);
        if visitor.is_empty() || home.is_empty() {
            malformed += 1;
            continue;
        }
        let (Ok(visitor_pts), Ok(home_pts)) = (
            row.visitor_pts.trim().parse::<u32>(),
            row.home_pts.trim().parse::<u32>(),
        ) else {
            not_played += 1;
            continue;
        };
        games.push(HistoricalGame {
            date,
            visitor,
            home,
            visitor_pts,
            home_pts,
            home_win: home_pts > visitor_pts,
        });
    }

    info!(
        completed = games.len(),
        not_played, malformed, "cleaned schedule rows"
    );
    games
}

/// Inner join of completed games with both sides' season stats, keyed on
/// normalized team names.
///
/// Games whose teams are missing from the stats table are excluded; the
/// usable-row count is logged post-hoc and is deterministic for fixed
/// inputs. Zero usable rows is an error, not an empty table.
pub fn build_training_table(
    games: &[HistoricalGame],
    stats: &[TeamSeasonStats],
) -> Result<Vec<TrainingRecord>> {
    let mut by_name: HashMap<String, &TeamSeasonStats> = HashMap::with_capacity(stats.len());
    for team_stats in stats {
        if !team_stats.is_usable() {
            warn!(team = %team_stats.team, "dropping stats row with non-finite ratings");
            continue;
        }
        let key = normalize_team_name(&team_stats.team);
        if by_name.insert(key, team_stats).is_some() {
            warn!(team = %team_stats.team, "duplicate team in stats table, keeping last row");
        }
    }

    let mut records = Vec::with_capacity(games.len());
    let mut unmatched = 0usize;
    for game in games {
        match (by_name.get(game.visitor.as_str()), by_name.get(game.home.as_str())) {
            (Some(visitor_stats), Some(home_stats)) => records.push(TrainingRecord {
                game: game.clone(),
                visitor_stats: (*visitor_stats).clone(),
                home_stats: (*home_stats).clone(),
            }),
            _ => unmatched += 1,
        }
    }

    info!(
        usable = records.len(),
        unmatched, "joined schedule with season stats"
    );
    if records.is_empty() {
        return Err(CoreError::NoTrainingData);
    }
    Ok(records)
}
