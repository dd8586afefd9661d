use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;
use serde_json::Value;

use crate::bracket::Bracket;
use crate::config::{MetricSource, SimConfig};
use crate::metric::Metric;

/// Dataset key -> file stem, one file per stat as the scraper writes them.
pub const STAT_FILES: &[(&str, &str)] = &[
    ("assistTurnoverRatio", "assist-turnover-ratio"),
    ("assistsPerGame", "assists-per-game"),
    ("benchPoints", "bench-points-per-game"),
    ("blocksPerGame", "blocks-per-game"),
    ("defensiveReboundsPerGame", "defensive-rebounds-per-game"),
    ("effectiveFieldGoalPercentage", "effective-field-goal-percentage"),
    ("fastbreakPoints", "fastbreak-points"),
    ("fieldGoalPercentageDefense", "field-goal-percentage-defense"),
    ("fieldGoalPercentage", "field-goal-percentage"),
    ("foulsPerGame", "fouls-per-game"),
    ("freeThrowAttemptsPerGame", "free-throw-attempts-per-game"),
    ("freeThrowPercentage", "free-throw-percentage"),
    ("freeThrowsMadePerGame", "free-throws-made-per-game"),
    ("offensiveReboundsPerGame", "offensive-rebounds-per-game"),
    ("reboundMargin", "rebound-margin"),
    ("reboundsPerGame", "rebounds-per-game"),
    ("scoringDefense", "scoring-defense"),
    ("scoringMargin", "scoring-margin"),
    ("scoringOffense", "scoring-offense"),
    ("stealsPerGame", "steals-per-game"),
    ("threePointAttemptsPerGame", "three-point-attempts-per-game"),
    ("threePointPercentageDefense", "three-point-percentage-defense"),
    ("threePointPercentage", "three-point-percentage"),
    ("threePointersPerGame", "three-pointers-per-game"),
    ("turnoverMargin", "turnover-margin"),
    ("turnoversForcedPerGame", "turnovers-forced-per-game"),
    ("turnoversPerGame", "turnovers-per-game"),
    ("winningPercentage", "winning-percentage"),
    ("historicalWinners", "historical-winners"),
    ("bracket", "bracket-2025"),
];

pub const BRACKET_DATASET: &str = "bracket";

#[derive(Debug, Default)]
pub struct DatasetLoad {
    pub datasets: HashMap<String, Value>,
    /// Files that existed but could not be read or parsed. Missing files
    /// are not errors; an absent dataset just leaves its metric empty.
    pub errors: Vec<String>,
}

/// Load every cataloged dataset present in `dir`. Reads run in parallel;
/// nothing else in a run does.
pub fn load_dataset_dir(dir: &Path) -> DatasetLoad {
    let loaded: Vec<(&str, Option<Value>, Option<String>)> = STAT_FILES
        .par_iter()
        .map(|&(key, stem)| {
            let path = dir.join(format!("{stem}.json"));
            if !path.exists() {
                return (key, None, None);
            }
            match read_json(&path) {
                Ok(value) => (key, Some(value), None),
                Err(err) => (key, None, Some(format!("{stem}.json: {err:#}"))),
            }
        })
        .collect();

    let mut out = DatasetLoad::default();
    for (key, value, error) in loaded {
        if let Some(value) = value {
            out.datasets.insert(key.to_string(), value);
        }
        if let Some(error) = error {
            out.errors.push(error);
        }
    }
    out
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read dataset {}", path.display()))?;
    serde_json::from_str(raw.trim())
        .with_context(|| format!("invalid dataset json {}", path.display()))
}

/// Pull the bracket topology out of a loaded dataset map.
pub fn bracket_from_datasets(datasets: &HashMap<String, Value>) -> Result<Bracket> {
    let value = datasets
        .get(BRACKET_DATASET)
        .ok_or_else(|| anyhow!("bracket dataset not loaded"))?;
    serde_json::from_value(value.clone()).context("invalid bracket structure")
}

/// Build the enabled metrics for one run. Absent datasets produce empty
/// metrics that degrade to neutral scores rather than failing the run.
pub fn build_metrics(
    config: &SimConfig,
    datasets: &HashMap<String, Value>,
    bracket: &Bracket,
) -> Vec<Metric> {
    config
        .active_specs()
        .into_iter()
        .map(|spec| {
            let dataset = datasets.get(spec.dataset).unwrap_or(&Value::Null);
            match spec.source {
                MetricSource::Stat => Metric::build(spec, dataset),
                MetricSource::History => Metric::build_history(spec, dataset),
                MetricSource::Bracket => Metric::build_seed(spec, bracket),
            }
        })
        .collect()
}
