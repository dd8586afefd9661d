use std::collections::HashMap;

use serde_json::Value;

use crate::bracket::Bracket;
use crate::config::MetricSpec;
use crate::dataset::{flatten_pages, parse_stat_number, row_team};
use crate::names::{alias_for, normalize_name};

/// Seed assumed for a team absent from the bracket's seed list: the midpoint
/// of the 1..16 range, "unseeded, assume average" rather than confirmed bad.
pub const SEED_DEFAULT: f64 = 8.5;

/// Champion-name fields tried in order, most explicit first. Absence of all
/// of them means the record carries no champion, not a guess from other
/// fields.
const CHAMPION_FIELDS: &[&str] = &[
    "Champion (Record)",
    "Champion",
    "champion",
    "Winner",
    "winner",
    "Team",
    "team",
];

/// Sub-fields accepted when a champion field holds an object.
const CHAMPION_NAME_KEYS: &[&str] = &["team", "name", "school"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MissingPolicy {
    /// No value for this team: leave the metric out of the weighted average.
    Omit,
    /// No matching championship record means zero titles, not "unknown".
    ZeroTitles,
    /// Unseeded teams get the midpoint seed.
    MidpointSeed,
}

/// A resolved, queryable statistic. Built once per run from immutable source
/// data; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Metric {
    pub id: String,
    pub label: String,
    /// Literal source-dataset team name -> value.
    exact: HashMap<String, f64>,
    /// Canonical team-name key -> value, the cross-dataset lookup path.
    normalized: HashMap<String, f64>,
    pub min: f64,
    pub max: f64,
    invert: bool,
    missing: MissingPolicy,
}

impl Metric {
    /// Build a standard metric from a paginated (or flat) per-stat dataset.
    /// Rows with a missing team or unparseable value are dropped silently.
    pub fn build(spec: &MetricSpec, pages: &Value) -> Metric {
        let mut exact = HashMap::new();
        let mut normalized = HashMap::new();
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for row in flatten_pages(pages) {
            let Some(team) = row_team(row) else { continue };
            let Some(value) = row.get(spec.value_field).and_then(parse_stat_number) else {
                continue;
            };
            exact.insert(team.to_string(), value);
            normalized.insert(normalize_name(team), value);
            min = min.min(value);
            max = max.max(value);
        }

        Metric {
            id: spec.id.to_string(),
            label: spec.label.to_string(),
            exact,
            normalized,
            min,
            max,
            invert: spec.invert,
            missing: MissingPolicy::Omit,
        }
    }

    /// Tally championship titles per canonical team name.
    ///
    /// `min` is pinned at 0 because every team absent from the table
    /// implicitly has zero titles; `max` is the highest tally (1 when the
    /// dataset is empty, so normalization stays defined).
    pub fn build_history(spec: &MetricSpec, records: &Value) -> Metric {
        let rows: &[Value] = if let Some(arr) = records.as_array() {
            arr
        } else if let Some(arr) = records.get("data").and_then(Value::as_array) {
            arr
        } else {
            &[]
        };

        let mut counts: HashMap<String, f64> = HashMap::new();
        for record in rows {
            let Some(name) = extract_champion_name(record) else {
                continue;
            };
            let key = normalize_name(strip_trailing_parenthetical(&name));
            if key.is_empty() {
                continue;
            }
            *counts.entry(key).or_insert(0.0) += 1.0;
        }

        let max = counts.values().copied().fold(f64::NEG_INFINITY, f64::max);
        let max = if max.is_finite() { max } else { 1.0 };

        Metric {
            id: spec.id.to_string(),
            label: spec.label.to_string(),
            exact: HashMap::new(),
            normalized: counts,
            min: 0.0,
            max,
            invert: false,
            missing: MissingPolicy::ZeroTitles,
        }
    }

    /// Seed metric over the bracket itself. Bounds are the seed domain
    /// (1..16 on the inverted value), not observed data.
    pub fn build_seed(spec: &MetricSpec, bracket: &Bracket) -> Metric {
        let mut normalized = HashMap::new();
        for region in &bracket.regions {
            for entry in &region.teams {
                normalized.insert(normalize_name(&entry.team), f64::from(entry.seed));
            }
        }

        Metric {
            id: spec.id.to_string(),
            label: spec.label.to_string(),
            exact: HashMap::new(),
            normalized,
            min: 1.0,
            max: 16.0,
            invert: false,
            missing: MissingPolicy::MidpointSeed,
        }
    }

    /// Map a raw value into [0, 1]. Monotonic; increasing unless the metric
    /// is inverted (or seed-based, where a lower seed is better). Degenerate
    /// bounds fall back to a fixed neutral 0.5.
    pub fn normalize(&self, value: f64) -> f64 {
        match self.missing {
            MissingPolicy::MidpointSeed => ((17.0 - value) - 1.0) / 15.0,
            MissingPolicy::ZeroTitles => {
                if self.max <= 0.0 {
                    0.0
                } else {
                    value / self.max
                }
            }
            MissingPolicy::Omit => {
                if !self.min.is_finite() || !self.max.is_finite() || self.max == self.min {
                    return 0.5;
                }
                let base = (value - self.min) / (self.max - self.min);
                if self.invert { 1.0 - base } else { base }
            }
        }
    }

    /// Resolve a team's raw value given an arbitrary display name: exact
    /// literal match, then canonical key, then one alias hop, then the
    /// metric's missing-value policy. `None` means "omit from scoring".
    pub fn resolve(&self, team: &str) -> Option<f64> {
        if let Some(value) = self.exact.get(team) {
            return Some(*value);
        }
        let key = normalize_name(team);
        if let Some(value) = self.normalized.get(&key) {
            return Some(*value);
        }
        if let Some(canonical) = alias_for(&key) {
            if let Some(value) = self.normalized.get(canonical) {
                return Some(*value);
            }
        }
        match self.missing {
            MissingPolicy::ZeroTitles => Some(0.0),
            MissingPolicy::MidpointSeed => Some(SEED_DEFAULT),
            MissingPolicy::Omit => None,
        }
    }

    /// Resolve and normalize in one step.
    pub fn normalized_score(&self, team: &str) -> Option<f64> {
        self.resolve(team).map(|value| self.normalize(value))
    }
}

fn extract_champion_name(record: &Value) -> Option<String> {
    if let Some(name) = record.as_str() {
        return Some(name.to_string());
    }
    let obj = record.as_object()?;
    for field in CHAMPION_FIELDS {
        let Some(value) = obj.get(*field) else {
            continue;
        };
        match value {
            Value::String(name) if !name.trim().is_empty() => return Some(name.clone()),
            Value::Object(inner) => {
                for key in CHAMPION_NAME_KEYS {
                    if let Some(name) = inner.get(*key).and_then(Value::as_str) {
                        if !name.trim().is_empty() {
                            return Some(name.to_string());
                        }
                    }
                }
            }
            _ => {}
        }
    }
    None
}

/// "UConn (37-3)" -> "UConn". Only a trailing parenthetical is removed; the
/// season record is presentation noise, not part of the name.
fn strip_trailing_parenthetical(raw: &str) -> &str {
    let trimmed = raw.trim_end();
    if !trimmed.ends_with(')') {
        return raw;
    }
    match trimmed.rfind('(') {
        Some(open) => raw[..open].trim_end(),
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::{BracketEntry, Region};
    use crate::config::metric_spec;
    use serde_json::json;

    fn win_pct_metric(pages: Value) -> Metric {
        Metric::build(metric_spec("winPct").unwrap(), &pages)
    }

    #[test]
    fn build_indexes_and_bounds() {
        let metric = win_pct_metric(json!([
            { "data": [
                { "Team": "Auburn", "Pct": "91.4%" },
                { "Team": "Houston", "Pct": 87.9 },
            ]},
            { "data": [
                { "Team": "Duke", "Pct": "92.1" },
                { "Team": "Nowhere", "Pct": "n/a" },
                { "Pct": "50.0" },
            ]},
        ]));
        assert_eq!(metric.resolve("Auburn"), Some(91.4));
        assert_eq!(metric.resolve("duke"), Some(92.1));
        assert_eq!(metric.min, 87.9);
        assert_eq!(metric.max, 92.1);
        assert_eq!(metric.resolve("Nowhere"), None);
    }

    #[test]
    fn normalize_is_monotonic_and_invertible() {
        let metric = win_pct_metric(json!([
            { "Team": "A", "Pct": 10.0 },
            { "Team": "B", "Pct": 30.0 },
        ]));
        assert_eq!(metric.normalize(10.0), 0.0);
        assert_eq!(metric.normalize(30.0), 1.0);
        assert!(metric.normalize(15.0) < metric.normalize(25.0));

        let defense = Metric::build(
            metric_spec("scoringDefense").unwrap(),
            &json!([
                { "Team": "A", "OPP PPG": 58.0 },
                { "Team": "B", "OPP PPG": 74.0 },
            ]),
        );
        assert_eq!(defense.normalize(58.0), 1.0);
        assert_eq!(defense.normalize(74.0), 0.0);
        assert!(defense.normalize(60.0) > defense.normalize(70.0));
    }

    #[test]
    fn empty_dataset_normalizes_to_neutral() {
        let metric = win_pct_metric(json!([]));
        assert_eq!(metric.normalize(0.0), 0.5);
        assert_eq!(metric.normalize(123.4), 0.5);
        assert_eq!(metric.resolve("anyone"), None);
    }

    #[test]
    fn degenerate_bounds_normalize_to_neutral() {
        let metric = win_pct_metric(json!([
            { "Team": "A", "Pct": 50.0 },
            { "Team": "B", "Pct": 50.0 },
        ]));
        assert_eq!(metric.normalize(50.0), 0.5);
    }

    fn history_metric(records: Value) -> Metric {
        Metric::build_history(metric_spec("history").unwrap(), &records)
    }

    #[test]
    fn history_tallies_titles_across_record_shapes() {
        let metric = history_metric(json!([
            { "Champion (Record)": "UConn (37-3)" },
            { "Champion (Record)": "UConn (31-8)" },
            { "champion": "Villanova" },
            "Kansas",
            { "Winner": { "school": "Kansas" } },
            { "Season": "1939" },
        ]));
        assert_eq!(metric.resolve("uconn"), Some(2.0));
        assert_eq!(metric.resolve("Villanova"), Some(1.0));
        assert_eq!(metric.resolve("Kansas"), Some(2.0));
        assert_eq!(metric.min, 0.0);
        assert_eq!(metric.max, 2.0);
    }

    #[test]
    fn history_absence_is_zero_not_neutral() {
        let metric = history_metric(json!([
            { "Champion (Record)": "Duke (35-4)" },
        ]));
        assert_eq!(metric.resolve("Gonzaga"), Some(0.0));
        assert_eq!(metric.normalize(0.0), 0.0);
        assert_eq!(metric.normalize(1.0), 1.0);
    }

    #[test]
    fn empty_history_still_normalizes() {
        let metric = history_metric(json!([]));
        assert_eq!(metric.max, 1.0);
        assert_eq!(metric.resolve("anyone"), Some(0.0));
        assert_eq!(metric.normalize(0.0), 0.0);
    }

    #[test]
    fn history_accepts_page_wrapped_object() {
        let metric = history_metric(json!({
            "data": [ { "Champion": "Baylor" } ]
        }));
        assert_eq!(metric.resolve("Baylor"), Some(1.0));
    }

    fn seed_metric() -> Metric {
        let bracket = Bracket {
            regions: vec![Region {
                name: "South".to_string(),
                teams: vec![
                    BracketEntry { team: "Auburn".to_string(), seed: 1 },
                    BracketEntry { team: "Michigan St.".to_string(), seed: 2 },
                ],
            }],
            final_four: [
                ["West".to_string(), "South".to_string()],
                ["East".to_string(), "Midwest".to_string()],
            ],
        };
        Metric::build_seed(metric_spec("seed").unwrap(), &bracket)
    }

    #[test]
    fn seed_normalization_favors_low_seeds() {
        let metric = seed_metric();
        assert_eq!(metric.normalize(1.0), 1.0);
        assert_eq!(metric.normalize(16.0), 0.0);
        assert_eq!(metric.resolve("Auburn"), Some(1.0));
    }

    #[test]
    fn unseeded_team_defaults_to_midpoint() {
        let metric = seed_metric();
        assert_eq!(metric.resolve("Vermont"), Some(SEED_DEFAULT));
        assert_eq!(metric.normalize(SEED_DEFAULT), 0.5);
    }

    #[test]
    fn resolution_takes_one_alias_hop() {
        let metric = history_metric(json!([
            { "Champion (Record)": "Michigan State (30-8)" },
        ]));
        assert_eq!(metric.resolve("Michigan St."), Some(1.0));
    }

    #[test]
    fn strip_trailing_parenthetical_only_strips_suffix() {
        assert_eq!(strip_trailing_parenthetical("UConn (37-3)"), "UConn");
        assert_eq!(strip_trailing_parenthetical("UConn"), "UConn");
        assert_eq!(strip_trailing_parenthetical("(A) Team"), "(A) Team");
    }
}
