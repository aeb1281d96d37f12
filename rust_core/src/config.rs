//! Runtime configuration.
//!
//! Every tunable that gates a decision lives here instead of inline in the
//! engine. Defaults are documented constants; each can be overridden via an
//! environment variable.

use std::env;

/// Season year to scrape (e.g. 2026 for the 2025-26 season).
pub const DEFAULT_SEASON_YEAR: u16 = 2026;

/// Minimum similarity for a fuzzy team-name match to be accepted.
pub const DEFAULT_FUZZY_MATCH_THRESHOLD: f64 = 0.6;

/// Win probabilities are clipped to this band to avoid overconfident
/// extremes from a small training sample.
pub const DEFAULT_PROB_CLIP_MIN: f64 = 0.15;
pub const DEFAULT_PROB_CLIP_MAX: f64 = 0.85;

/// Pairwise |Pearson r| above which one feature of the pair is pruned.
pub const DEFAULT_CORRELATION_THRESHOLD: f64 = 0.85;

/// EV at or above this classifies a side as a recommended bet in reports.
pub const DEFAULT_EV_THRESHOLD: f64 = 0.02;

/// Fraction of training rows held out for the accuracy log line.
pub const DEFAULT_HOLDOUT_FRACTION: f64 = 0.2;

/// Pause range in seconds between successive schedule-page fetches.
pub const DEFAULT_REQUEST_PAUSE_SECS: (f64, f64) = (3.0, 5.0);

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub season_year: u16,
    pub fuzzy_match_threshold: f64,
    pub prob_clip_min: f64,
    pub prob_clip_max: f64,
    pub correlation_threshold: f64,
    pub ev_threshold: f64,
    pub holdout_fraction: f64,
    pub request_pause_secs: (f64, f64),
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            season_year: DEFAULT_SEASON_YEAR,
            fuzzy_match_threshold: DEFAULT_FUZZY_MATCH_THRESHOLD,
            prob_clip_min: DEFAULT_PROB_CLIP_MIN,
            prob_clip_max: DEFAULT_PROB_CLIP_MAX,
            correlation_threshold: DEFAULT_CORRELATION_THRESHOLD,
            ev_threshold: DEFAULT_EV_THRESHOLD,
            holdout_fraction: DEFAULT_HOLDOUT_FRACTION,
            request_pause_secs: DEFAULT_REQUEST_PAUSE_SECS,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables with documented
    /// defaults. Unset or unparseable values fall back silently.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            season_year: env_parse("SEASON_YEAR", defaults.season_year),
            fuzzy_match_threshold: env_parse(
                "FUZZY_MATCH_THRESHOLD",
                defaults.fuzzy_match_threshold,
            )
            .clamp(0.0, 1.0),
            prob_clip_min: env_parse("PROB_CLIP_MIN", defaults.prob_clip_min),
            prob_clip_max: env_parse("PROB_CLIP_MAX", defaults.prob_clip_max),
            correlation_threshold: env_parse(
                "CORRELATION_THRESHOLD",
                defaults.correlation_threshold,
            ),
            ev_threshold: env_parse("EV_THRESHOLD", defaults.ev_threshold),
            holdout_fraction: env_parse("HOLDOUT_FRACTION", defaults.holdout_fraction)
                .clamp(0.0, 0.5),
            request_pause_secs: defaults.request_pause_secs,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.season_year, DEFAULT_SEASON_YEAR);
        assert_eq!(cfg.fuzzy_match_threshold, DEFAULT_FUZZY_MATCH_THRESHOLD);
        assert_eq!(cfg.ev_threshold, DEFAULT_EV_THRESHOLD);
        assert!(cfg.prob_clip_min < cfg.prob_clip_max);
    }
}
