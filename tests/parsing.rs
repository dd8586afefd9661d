use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use madness_terminal::bracket::parse_bracket_json;
use madness_terminal::config::metric_spec;
use madness_terminal::dataset::flatten_pages;
use madness_terminal::metric::Metric;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn fixture_json(name: &str) -> Value {
    serde_json::from_str(&read_fixture(name)).expect("fixture should be valid json")
}

#[test]
fn flattens_paginated_stat_fixture() {
    let pages = fixture_json("winning-percentage.json");
    let rows = flatten_pages(&pages);
    assert_eq!(rows.len(), 11);
}

#[test]
fn builds_metric_from_paginated_fixture() {
    let pages = fixture_json("winning-percentage.json");
    let metric = Metric::build(metric_spec("winPct").expect("registry id"), &pages);
    assert_eq!(metric.resolve("Auburn"), Some(91.4));
    assert_eq!(metric.resolve("Tennessee"), Some(79.5));
    // Unparseable value and missing team drop their rows.
    assert_eq!(metric.resolve("Bryant"), None);
    assert_eq!(metric.min, 60.0);
    assert_eq!(metric.max, 91.4);
}

#[test]
fn builds_inverted_metric_from_flat_fixture() {
    let rows = fixture_json("scoring-defense.json");
    let metric = Metric::build(metric_spec("scoringDefense").expect("registry id"), &rows);
    // Lower opponent PPG is better.
    assert_eq!(metric.normalize(58.3), 1.0);
    assert_eq!(metric.normalize(81.4), 0.0);
    let houston = metric.normalized_score("Houston").expect("present");
    let alabama = metric.normalized_score("Alabama").expect("present");
    assert!(houston > alabama);
}

#[test]
fn tallies_history_fixture_across_record_shapes() {
    let records = fixture_json("historical-winners.json");
    let metric = Metric::build_history(metric_spec("history").expect("registry id"), &records);
    // Two explicit records for UConn, a bare string plus a record for
    // Michigan State, one nested object for Villanova.
    assert_eq!(metric.resolve("UConn"), Some(2.0));
    assert_eq!(metric.resolve("Michigan State"), Some(2.0));
    assert_eq!(metric.resolve("Villanova"), Some(1.0));
    assert_eq!(metric.resolve("Virginia"), Some(1.0));
    // The 1939 record has no champion field at all.
    assert_eq!(metric.max, 2.0);
    // Absent team is a confirmed zero, not unknown.
    assert_eq!(metric.resolve("Gonzaga"), Some(0.0));
}

#[test]
fn parses_bracket_fixture_with_default_final_four() {
    let bracket = parse_bracket_json(&read_fixture("bracket-2025.json")).expect("bracket parses");
    assert_eq!(bracket.regions.len(), 4);
    for region in &bracket.regions {
        assert_eq!(region.teams.len(), 16, "region {}", region.name);
    }
    assert_eq!(
        bracket.region("South").unwrap().team_by_seed(1),
        Some("Auburn")
    );
    // No final_four key in the file: the 2025 layout applies.
    assert_eq!(bracket.final_four[0], ["West", "South"]);
    assert_eq!(bracket.final_four[1], ["East", "Midwest"]);
}
