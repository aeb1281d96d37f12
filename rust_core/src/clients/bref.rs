//! basketball-reference.com client.
//!
//! Scrapes the season's advanced team stats table from the league year page
//! and the schedule from the month-by-month games pages. Schedule fetches
//! pause 3-5 seconds between months to stay polite to the source server;
//! months that have not started yet are skipped, not errors.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};

use super::StatsSource;
use crate::config::DEFAULT_REQUEST_PAUSE_SECS;
use crate::error::{CoreError, Result};
use crate::types::{RawScheduleRow, TeamSeasonStats};
use crate::utils::matching::normalize_team_name;

const BASE_URL: &str = "https://www.basketball-reference.com";

/// Season months in schedule order. Later months simply 404 until the
/// season reaches them.
const SCHEDULE_MONTHS: &[&str] = &[
    "october", "november", "december", "january", "february", "march", "april",
];

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

pub struct BasketballReferenceClient {
    client: Client,
    base_url: String,
    pause_secs: (f64, f64),
}

impl BasketballReferenceClient {
    pub fn new() -> Self {
        Self::with_pause(DEFAULT_REQUEST_PAUSE_SECS)
    }

    pub fn with_pause(pause_secs: (f64, f64)) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: BASE_URL.to_string(),
            pause_secs,
        }
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    /// Randomized politeness pause between successive schedule fetches.
    async fn pause(&self) {
        let (min, max) = self.pause_secs;
        let secs = if max > min {
            rand::thread_rng().gen_range(min..max)
        } else {
            min
        };
        if secs > 0.0 {
            tokio::time::sleep(Duration::from_secs_f64(secs)).await;
        }
    }
}

impl Default for BasketballReferenceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatsSource for BasketballReferenceClient {
    async fn fetch_team_stats(&self, year: u16) -> Result<Vec<TeamSeasonStats>> {
        let url = format!("{}/leagues/NBA_{}.html", self.base_url, year);
        info!(%url, "fetching advanced team stats");
        let html = self.fetch_text(&url).await?;
        let stats = parse_advanced_stats(&html)?;
        if stats.is_empty() {
            return Err(CoreError::DataUnavailable {
                src: self.source_name().to_string(),
                reason: "advanced stats table not found".to_string(),
            });
        }
        info!(teams = stats.len(), "parsed advanced team stats");
        Ok(stats)
    }

    async fn fetch_schedule(&self, year: u16) -> Result<Vec<RawScheduleRow>> {
        let mut rows = Vec::new();
        for (idx, month) in SCHEDULE_MONTHS.iter().copied().enumerate() {
            if idx > 0 {
                self.pause().await;
            }
            let url = format!("{}/leagues/NBA_{}_games-{}.html", self.base_url, year, month);
            match self.fetch_text(&url).await {
                Ok(html) => {
                    let month_rows = parse_schedule(&html)?;
                    info!(month, rows = month_rows.len(), "scraped schedule month");
                    rows.extend(month_rows);
                }
                // Month not published yet (or transient failure): skip it
                // and keep what we have.
                Err(err) => {
                    info!(month, %err, "schedule month unavailable, skipping");
                }
            }
        }
        if rows.is_empty() {
            return Err(CoreError::DataUnavailable {
                src: self.source_name().to_string(),
                reason: "no schedule rows in any month page".to_string(),
            });
        }
        Ok(rows)
    }

    fn source_name(&self) -> &str {
        "basketball-reference"
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| CoreError::Parse(format!("bad selector {css:?}: {e}")))
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Header cells of a table: the last `thead` row when present (the stats
/// page stacks a grouping row above the real header), else the first row.
fn header_cells(
    table: &ElementRef,
    thead_row_sel: &Selector,
    row_sel: &Selector,
    cell_sel: &Selector,
) -> Vec<String> {
    let header_row = table
        .select(thead_row_sel)
        .last()
        .or_else(|| table.select(row_sel).next());
    match header_row {
        Some(row) => row.select(cell_sel).map(|c| cell_text(&c)).collect(),
        None => Vec::new(),
    }
}

/// Find the table carrying `Pace`/`ORtg` headers and extract one stats row
/// per team. Divider rows ("League Average") and rows with non-numeric
/// ratings are skipped.
fn parse_advanced_stats(html: &str) -> Result<Vec<TeamSeasonStats>> {
    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let thead_row_sel = selector("thead tr")?;
    let row_sel = selector("tr")?;
    let body_row_sel = selector("tbody tr")?;
    let cell_sel = selector("th, td")?;

    for table in document.select(&table_sel) {
        let headers = header_cells(&table, &thead_row_sel, &row_sel, &cell_sel);
        let find = |name: &str| headers.iter().position(|h| h == name);
        let (Some(team_idx), Some(pace_idx), Some(ortg_idx), Some(drtg_idx), Some(nrtg_idx)) = (
            find("Team"),
            find("Pace"),
            find("ORtg"),
            find("DRtg"),
            find("NRtg"),
        ) else {
            continue;
        };

        let mut stats: Vec<TeamSeasonStats> = Vec::new();
        for row in table.select(&body_row_sel) {
            let cells: Vec<String> = row.select(&cell_sel).map(|c| cell_text(&c)).collect();
            let Some(raw_team) = cells.get(team_idx) else {
                continue;
            };
            let team = normalize_team_name(raw_team);
            if team.is_empty() || team == "League Average" || team == "Team" {
                continue;
            }
            let parse = |idx: usize| {
                cells
                    .get(idx)
                    .and_then(|v| v.parse::<f64>().ok())
                    .filter(|v| v.is_finite())
            };
            let (Some(pace), Some(ortg), Some(drtg), Some(nrtg)) = (
                parse(pace_idx),
                parse(ortg_idx),
                parse(drtg_idx),
                parse(nrtg_idx),
            ) else {
                warn!(%team, "skipping stats row with non-numeric ratings");
                continue;
            };
            if stats.iter().any(|s| s.team == team) {
                warn!(%team, "duplicate team row in stats table, keeping first");
                continue;
            }
            stats.push(TeamSeasonStats {
                team,
                pace,
                ortg,
                drtg,
                nrtg,
            });
        }
        if !stats.is_empty() {
            return Ok(stats);
        }
    }
    Ok(Vec::new())
}

/// Extract raw schedule rows from a month page. The first table is the
/// schedule; repeated in-table header rows are skipped. Point cells stay as
/// text so the cleaner can tell "not played" from a score.
fn parse_schedule(html: &str) -> Result<Vec<RawScheduleRow>> {
    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let thead_row_sel = selector("thead tr")?;
    let row_sel = selector("tr")?;
    let body_row_sel = selector("tbody tr")?;
    let cell_sel = selector("th, td")?;

    let Some(table) = document.select(&table_sel).next() else {
        return Ok(Vec::new());
    };
    let headers = header_cells(&table, &thead_row_sel, &row_sel, &cell_sel);
    let find = |name: &str| headers.iter().position(|h| h == name);
    let pts_indices: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.as_str() == "PTS")
        .map(|(i, _)| i)
        .collect();
    let (Some(date_idx), Some(visitor_idx), Some(home_idx)) = (
        find("Date"),
        headers.iter().position(|h| h.starts_with("Visitor")),
        headers.iter().position(|h| h.starts_with("Home")),
    ) else {
        warn!("schedule page missing expected columns");
        return Ok(Vec::new());
    };
    let &[visitor_pts_idx, home_pts_idx] = &pts_indices[..] else {
        warn!("schedule page missing point columns");
        return Ok(Vec::new());
    };

    let mut rows = Vec::new();
    for row in table.select(&body_row_sel) {
        let cells: Vec<String> = row.select(&cell_sel).map(|c| cell_text(&c)).collect();
        let Some(date) = cells.get(date_idx) else {
            continue;
        };
        // Repeated header rows and the "Playoffs" divider carry no game.
        if date.is_empty() || date == "Date" || date == "Playoffs" {
            continue;
        }
        rows.push(RawScheduleRow {
            date: date.clone(),
            visitor: cells.get(visitor_idx).cloned().unwrap_or_default(),
            visitor_pts: cells.get(visitor_pts_idx).cloned().unwrap_or_default(),
            home: cells.get(home_idx).cloned().unwrap_or_default(),
            home_pts: cells.get(home_pts_idx).cloned().unwrap_or_default(),
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATS_HTML: &str = r#"
        <html><body>
        <table>
          <thead><tr><th>Rk</th><th>Team</th><th>W</th></tr></thead>
          <tbody><tr><td>1</td><td>Boston Celtics</td><td>60</td></tr></tbody>
        </table>
        <table>
          <thead>
            <tr><th colspan="7">Advanced</th></tr>
            <tr><th>Rk</th><th>Team</th><th>Age</th><th>Pace</th><th>ORtg</th><th>DRtg</th><th>NRtg</th></tr>
          </thead>
          <tbody>
            <tr><td>1</td><td>Boston Celtics*</td><td>26.1</td><td>97.4</td><td>118.1</td><td>110.0</td><td>8.1</td></tr>
            <tr><td>2</td><td>Sacramento Kings</td><td>25.8</td><td>100.2</td><td>114.9</td><td>113.6</td><td>1.3</td></tr>
            <tr><td>3</td><td>Broken Row</td><td>25.0</td><td>n/a</td><td>110.0</td><td>110.0</td><td>0.0</td></tr>
            <tr><td></td><td>League Average</td><td>26.0</td><td>98.9</td><td>114.2</td><td>114.2</td><td>0.0</td></tr>
          </tbody>
        </table>
        </body></html>
    "#;

    const SCHEDULE_HTML: &str = r#"
        <html><body>
        <table>
          <thead>
            <tr><th>Date</th><th>Start (ET)</th><th>Visitor/Neutral</th><th>PTS</th><th>Home/Neutral</th><th>PTS</th><th>Notes</th></tr>
          </thead>
          <tbody>
            <tr><th>Tue, Oct 22, 2024</th><td>7:30p</td><td>Dallas Mavericks</td><td>110</td><td>Boston Celtics</td><td>118</td><td></td></tr>
            <tr><th>Date</th><td></td><td>Visitor/Neutral</td><td>PTS</td><td>Home/Neutral</td><td>PTS</td><td></td></tr>
            <tr><th>Fri, Apr 10, 2026</th><td>7:00p</td><td>Utah Jazz</td><td></td><td>Sacramento Kings</td><td></td><td></td></tr>
          </tbody>
        </table>
        </body></html>
    "#;

    #[test]
    fn stats_parser_finds_the_advanced_table() {
        let stats = parse_advanced_stats(STATS_HTML).unwrap();
        assert_eq!(stats.len(), 2, "divider and broken rows are skipped");
        assert_eq!(stats[0].team, "Boston Celtics", "asterisk is stripped");
        assert!((stats[0].pace - 97.4).abs() < 1e-9);
        assert!((stats[1].nrtg - 1.3).abs() < 1e-9);
    }

    #[test]
    fn stats_parser_handles_missing_table() {
        let stats = parse_advanced_stats("<html><body><p>rate limited</p></body></html>").unwrap();
        assert!(stats.is_empty());
    }

    #[test]
    fn schedule_parser_keeps_raw_point_text() {
        let rows = parse_schedule(SCHEDULE_HTML).unwrap();
        assert_eq!(rows.len(), 2, "repeated header row is skipped");
        assert_eq!(rows[0].visitor, "Dallas Mavericks");
        assert_eq!(rows[0].home_pts, "118");
        assert_eq!(rows[1].visitor_pts, "", "unplayed game keeps empty cells");
    }

    #[test]
    fn schedule_parser_tolerates_garbage() {
        assert!(parse_schedule("<html><body></body></html>").unwrap().is_empty());
        assert!(parse_schedule("<table><tr><td>x</td></tr></table>")
            .unwrap()
            .is_empty());
    }
}
