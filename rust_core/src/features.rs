//! Feature engineering with an explicitly tracked schema.
//!
//! Training and inference must use the identical column list. The schema is
//! a first-class value: the model records which columns survived correlation
//! pruning and re-applies exactly that list at inference time, so a silently
//! mismatched feature layout is impossible.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::types::{TeamSeasonStats, TrainingRecord};

/// Canonical feature columns, fixed order. The first eight are the raw
/// season aggregates; the rest are derived.
pub const FEATURE_NAMES: &[&str] = &[
    "v_pace",
    "v_ortg",
    "v_drtg",
    "v_nrtg",
    "h_pace",
    "h_ortg",
    "h_drtg",
    "h_nrtg",
    "ortg_diff",
    "drtg_diff",
    "nrtg_diff",
    "pace_diff",
    "h_off_eff",
    "v_off_eff",
    "offensive_advantage",
    "avg_ortg",
    "avg_drtg",
];

/// Stabilizer added to the divisor of the efficiency ratios so a zero
/// defensive rating cannot blow up the feature.
const EFF_EPSILON: f64 = 0.1;

/// Ordered list of feature column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    /// The full canonical schema.
    pub fn full() -> Self {
        Self::new(FEATURE_NAMES)
    }

    /// A schema over an arbitrary ordered column list.
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// A schema restricted to the given column indices (indices into this
    /// schema, original order preserved).
    pub fn subset(&self, keep: &[usize]) -> Self {
        Self {
            columns: keep.iter().map(|&i| self.columns[i].clone()).collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Width check for a feature row built against this schema.
    pub fn check_row(&self, row: &[f64]) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(CoreError::FeatureWidth {
                expected: self.columns.len(),
                got: row.len(),
            });
        }
        Ok(())
    }
}

/// Build the full feature vector for a matchup, home vs visitor, in
/// [`FEATURE_NAMES`] order.
pub fn build_features(home: &TeamSeasonStats, visitor: &TeamSeasonStats) -> Vec<f64> {
    let h_off_eff = home.ortg / (visitor.drtg + EFF_EPSILON);
    let v_off_eff = visitor.ortg / (home.drtg + EFF_EPSILON);
    vec![
        visitor.pace,
        visitor.ortg,
        visitor.drtg,
        visitor.nrtg,
        home.pace,
        home.ortg,
        home.drtg,
        home.nrtg,
        home.ortg - visitor.ortg,
        home.drtg - visitor.drtg,
        home.nrtg - visitor.nrtg,
        home.pace - visitor.pace,
        h_off_eff,
        v_off_eff,
        h_off_eff - v_off_eff,
        (home.ortg + visitor.ortg) / 2.0,
        (home.drtg + visitor.drtg) / 2.0,
    ]
}

/// Feature matrix plus home-win labels for a set of training records.
pub fn training_matrix(records: &[TrainingRecord]) -> (Vec<Vec<f64>>, Vec<bool>) {
    let mut rows = Vec::with_capacity(records.len());
    let mut labels = Vec::with_capacity(records.len());
    for record in records {
        rows.push(build_features(&record.home_stats, &record.visitor_stats));
        labels.push(record.game.home_win);
    }
    (rows, labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(team: &str, pace: f64, ortg: f64, drtg: f64) -> TeamSeasonStats {
        TeamSeasonStats {
            team: team.to_string(),
            pace,
            ortg,
            drtg,
            nrtg: ortg - drtg,
        }
    }

    #[test]
    fn vector_matches_schema_width_and_order() {
        let home = stats("Sacramento Kings", 100.0, 115.0, 112.0);
        let visitor = stats("Dallas Mavericks", 98.0, 117.0, 110.0);
        let row = build_features(&home, &visitor);
        let schema = FeatureSchema::full();

        assert_eq!(row.len(), schema.len());
        schema.check_row(&row).unwrap();

        // Raw prefix: visitor block then home block.
        assert_eq!(&row[..4], &[98.0, 117.0, 110.0, 7.0]);
        assert_eq!(&row[4..8], &[100.0, 115.0, 112.0, 3.0]);
    }

    #[test]
    fn derived_fields_are_consistent() {
        let home = stats("Sacramento Kings", 100.0, 115.0, 112.0);
        let visitor = stats("Dallas Mavericks", 98.0, 117.0, 110.0);
        let row = build_features(&home, &visitor);

        let ortg_diff = row[8];
        assert!((ortg_diff - (115.0 - 117.0)).abs() < 1e-12);

        let h_off_eff = row[12];
        let v_off_eff = row[13];
        assert!((h_off_eff - 115.0 / 110.1).abs() < 1e-12);
        assert!((v_off_eff - 117.0 / 112.1).abs() < 1e-12);

        let advantage = row[14];
        assert!((advantage - (h_off_eff - v_off_eff)).abs() < 1e-12);

        assert!((row[15] - 116.0).abs() < 1e-12);
        assert!((row[16] - 111.0).abs() < 1e-12);
    }

    #[test]
    fn efficiency_survives_zero_defense() {
        let home = stats("Sacramento Kings", 100.0, 115.0, 0.0);
        let visitor = stats("Dallas Mavericks", 98.0, 117.0, 0.0);
        let row = build_features(&home, &visitor);
        assert!(row.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn subset_preserves_order() {
        let schema = FeatureSchema::full();
        let sub = schema.subset(&[0, 4, 10]);
        assert_eq!(
            sub.columns(),
            &["v_pace".to_string(), "h_pace".to_string(), "nrtg_diff".to_string()]
        );
    }

    #[test]
    fn width_mismatch_is_an_error() {
        let schema = FeatureSchema::full();
        let err = schema.check_row(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            crate::CoreError::FeatureWidth { expected: 17, got: 2 }
        ));
    }
}
