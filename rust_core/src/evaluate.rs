//! Matchup evaluation: model probability against the market price.
//!
//! For each quoted matchup the engine resolves both team names against the
//! stats table, asks the model for the home-win probability, converts the
//! American prices, and emits one EV result per side. Unresolved matchups
//! are skipped with a reason and reported, never a crash.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::features::{build_features, FeatureSchema};
use crate::odds::{american_to_decimal, american_to_probability};
use crate::types::{EvaluationResult, OddsQuote, SkippedMatchup, TeamSeasonStats};
use crate::utils::matching::best_team_match;
use crate::win_prob::WinProbabilityModel;

/// Everything produced by evaluating one slate of quotes.
#[derive(Debug, Clone)]
pub struct SlateEvaluation {
    /// Priced sides, sorted by descending EV.
    pub results: Vec<EvaluationResult>,
    pub skipped: Vec<SkippedMatchup>,
}

/// `probability * decimal_odds - 1`. Positive means the price is better
/// than the model's fair value.
pub fn expected_value(probability: f64, decimal_odds: f64) -> f64 {
    probability * decimal_odds - 1.0
}

pub struct EvaluationEngine<'a> {
    config: &'a EngineConfig,
    model: &'a WinProbabilityModel,
    schema: &'a FeatureSchema,
    stats_by_name: HashMap<String, &'a TeamSeasonStats>,
    canonical_names: Vec<String>,
}

impl<'a> EvaluationEngine<'a> {
    pub fn new(
        config: &'a EngineConfig,
        stats: &'a [TeamSeasonStats],
        model: &'a WinProbabilityModel,
        schema: &'a FeatureSchema,
    ) -> Self {
        let usable: Vec<&TeamSeasonStats> = stats.iter().filter(|s| s.is_usable()).collect();
        let canonical_names: Vec<String> = usable.iter().map(|s| s.team.clone()).collect();
        let stats_by_name: HashMap<String, &TeamSeasonStats> =
            usable.into_iter().map(|s| (s.team.clone(), s)).collect();
        Self {
            config,
            model,
            schema,
            stats_by_name,
            canonical_names,
        }
    }

    /// Price both sides of every quote. Model misuse (untrained, wrong
    /// schema) aborts the run; everything matchup-local degrades to a skip.
    pub fn evaluate_slate(&self, quotes: &[OddsQuote]) -> Result<SlateEvaluation> {
        let mut results = Vec::with_capacity(quotes.len() * 2);
        let mut skipped = Vec::new();

        for quote in quotes {
            let matchup = quote.matchup_label();

            let Some(home_name) =
                best_team_match(&quote.home, &self.canonical_names, self.config.fuzzy_match_threshold)
            else {
                warn!(%matchup, team = %quote.home, "skipping matchup, home team unresolved");
                skipped.push(SkippedMatchup {
                    matchup,
                    reason: format!("no stats match for home team {:?}", quote.home),
                });
                continue;
            };
            let Some(visitor_name) = best_team_match(
                &quote.visitor,
                &self.canonical_names,
                self.config.fuzzy_match_threshold,
            ) else {
                warn!(%matchup, team = %quote.visitor, "skipping matchup, visitor unresolved");
                skipped.push(SkippedMatchup {
                    matchup,
                    reason: format!("no stats match for visitor {:?}", quote.visitor),
                });
                continue;
            };
            let (Some(home_stats), Some(visitor_stats)) = (
                self.stats_by_name.get(home_name),
                self.stats_by_name.get(visitor_name),
            ) else {
                skipped.push(SkippedMatchup {
                    matchup,
                    reason: "matched name missing from stats table".to_string(),
                });
                continue;
            };

            let row = build_features(home_stats, visitor_stats);
            let home_prob = self.model.predict_probability(&[row], self.schema)?[0];
            let visitor_prob = 1.0 - home_prob;
            info!(
                %matchup,
                home = home_name,
                visitor = visitor_name,
                home_prob,
                "matchup resolved"
            );

            results.push(self.side_result(&matchup, &quote.home, quote.home_moneyline, home_prob));
            results.push(self.side_result(
                &matchup,
                &quote.visitor,
                quote.visitor_moneyline,
                visitor_prob,
            ));
        }

        results.sort_by(|a, b| b.ev.partial_cmp(&a.ev).unwrap_or(Ordering::Equal));
        info!(
            priced = results.len(),
            skipped = skipped.len(),
            "slate evaluation complete"
        );
        Ok(SlateEvaluation { results, skipped })
    }

    fn side_result(
        &self,
        matchup: &str,
        team: &str,
        odds: i32,
        probability: f64,
    ) -> EvaluationResult {
        let ev = expected_value(probability, american_to_decimal(odds));
        EvaluationResult {
            matchup: matchup.to_string(),
            bet: team.to_string(),
            odds,
            model_prob: probability,
            market_prob: american_to_probability(odds),
            ev,
            signal: ev >= self.config.ev_threshold,
        }
    }
}
