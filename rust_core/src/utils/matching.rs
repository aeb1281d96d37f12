//! Team name normalization and fuzzy matching.
//!
//! Odds feeds and the stats table rarely agree on exact spellings
//! ("LA Clippers" vs "Los Angeles Clippers"), so matchup resolution runs a
//! similarity search over the canonical names from the stats table.

use strsim::jaro_winkler;
use tracing::debug;

/// Strip decoration characters and surrounding whitespace from a scraped
/// team name. basketball-reference marks playoff teams with a trailing `*`.
///
/// Idempotent: normalizing an already-normalized name returns it unchanged.
pub fn normalize_team_name(raw: &str) -> String {
    raw.replace('*', "").trim().to_string()
}

/// Find the canonical name most similar to `candidate`.
///
/// Every canonical name is scored with Jaro-Winkler similarity on the
/// lowercased, normalized forms; the best is returned if it reaches
/// `threshold`. Ties resolve to the first maximum in the order of
/// `canonical`, so a fixed candidate set always yields the same answer.
pub fn best_team_match<'a>(
    candidate: &str,
    canonical: &'a [String],
    threshold: f64,
) -> Option<&'a str> {
    let needle = normalize_team_name(candidate).to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let mut best: Option<(&'a str, f64)> = None;
    for name in canonical {
        let score = jaro_winkler(&needle, &name.to_lowercase());
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((name.as_str(), score));
        }
    }

    match best {
        Some((name, score)) if score >= threshold => {
            debug!(candidate, matched = name, score, "team name resolved");
            Some(name)
        }
        Some((closest, score)) => {
            debug!(candidate, closest, score, "no team match above threshold");
            None
        }
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical() -> Vec<String> {
        [
            "Boston Celtics",
            "Los Angeles Lakers",
            "Los Angeles Clippers",
            "Sacramento Kings",
            "Dallas Mavericks",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn normalize_strips_asterisks_and_whitespace() {
        assert_eq!(normalize_team_name("Lakers*  "), "Lakers");
        assert_eq!(normalize_team_name("  Boston Celtics"), "Boston Celtics");
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize_team_name("Lakers*  ");
        let twice = normalize_team_name(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn exact_name_matches() {
        let names = canonical();
        assert_eq!(
            best_team_match("Sacramento Kings", &names, 0.6),
            Some("Sacramento Kings")
        );
    }

    #[test]
    fn close_variant_matches() {
        let names = canonical();
        assert_eq!(
            best_team_match("Los Angeles Lakerz", &names, 0.6),
            Some("Los Angeles Lakers")
        );
    }

    #[test]
    fn unrelated_name_does_not_match() {
        let names = canonical();
        assert_eq!(best_team_match("zzzz qqqq", &names, 0.6), None);
    }

    #[test]
    fn decorated_name_matches_after_normalization() {
        let names = canonical();
        assert_eq!(
            best_team_match("Dallas Mavericks*  ", &names, 0.6),
            Some("Dallas Mavericks")
        );
    }

    #[test]
    fn matching_is_deterministic() {
        let names = canonical();
        let first = best_team_match("Los Angeles", &names, 0.6);
        for _ in 0..10 {
            assert_eq!(best_team_match("Los Angeles", &names, 0.6), first);
        }
    }

    #[test]
    fn empty_candidate_never_matches() {
        let names = canonical();
        assert_eq!(best_team_match("   ", &names, 0.6), None);
    }
}
