use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Pseudo-metric id for the randomness slider. It carries a weight and a
/// toggle like the real metrics but never resolves team values.
pub const RANDOMNESS_ID: &str = "randomness";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricSource {
    /// Built from a scraped per-stat dataset.
    Stat,
    /// Tallied from the championship-history dataset.
    History,
    /// Derived from the bracket's own seed list.
    Bracket,
}

#[derive(Debug, Clone, Copy)]
pub struct MetricSpec {
    pub id: &'static str,
    pub label: &'static str,
    /// Key into the loaded dataset map (see `data_files::STAT_FILES`).
    pub dataset: &'static str,
    pub value_field: &'static str,
    /// Lower raw value is better (e.g. opponent PPG).
    pub invert: bool,
    pub source: MetricSource,
}

/// The metrics available for weighted scoring.
pub const METRIC_REGISTRY: &[MetricSpec] = &[
    MetricSpec {
        id: "winPct",
        label: "Winning %",
        dataset: "winningPercentage",
        value_field: "Pct",
        invert: false,
        source: MetricSource::Stat,
    },
    MetricSpec {
        id: "scoringDefense",
        label: "Opp PPG (lower better)",
        dataset: "scoringDefense",
        value_field: "OPP PPG",
        invert: true,
        source: MetricSource::Stat,
    },
    MetricSpec {
        id: "fgPct",
        label: "FG%",
        dataset: "fieldGoalPercentage",
        value_field: "FG%",
        invert: false,
        source: MetricSource::Stat,
    },
    MetricSpec {
        id: "threePG",
        label: "3PG",
        dataset: "threePointersPerGame",
        value_field: "3PG",
        invert: false,
        source: MetricSource::Stat,
    },
    MetricSpec {
        id: "rpg",
        label: "RPG",
        dataset: "reboundsPerGame",
        value_field: "RPG",
        invert: false,
        source: MetricSource::Stat,
    },
    MetricSpec {
        id: "atr",
        label: "Assist/Turnover Ratio",
        dataset: "assistTurnoverRatio",
        value_field: "Ratio",
        invert: false,
        source: MetricSource::Stat,
    },
    MetricSpec {
        id: "history",
        label: "Historical Titles",
        dataset: "historicalWinners",
        value_field: "Titles",
        invert: false,
        source: MetricSource::History,
    },
    MetricSpec {
        id: "seed",
        label: "Seeding",
        dataset: "bracket",
        value_field: "Seed",
        invert: false,
        source: MetricSource::Bracket,
    },
];

pub fn metric_spec(id: &str) -> Option<&'static MetricSpec> {
    METRIC_REGISTRY.iter().find(|spec| spec.id == id)
}

/// Every toggleable id, registry metrics plus the randomness pseudo-metric.
pub fn all_toggle_ids() -> Vec<String> {
    METRIC_REGISTRY
        .iter()
        .map(|spec| spec.id.to_string())
        .chain(std::iter::once(RANDOMNESS_ID.to_string()))
        .collect()
}

/// Per-metric weights (0..=100) plus the randomness weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub metrics: HashMap<String, u32>,
    pub randomness: u32,
}

impl Weights {
    pub fn metric_weight(&self, id: &str) -> u32 {
        self.metrics.get(id).copied().unwrap_or(0)
    }

    pub fn set_metric_weight(&mut self, id: &str, weight: u32) {
        self.metrics.insert(id.to_string(), weight.min(100));
    }

    /// Randomness share of the final comparison score, in [0, 1].
    pub fn randomness_factor(&self) -> f64 {
        (f64::from(self.randomness) / 100.0).clamp(0.0, 1.0)
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            metrics: METRIC_REGISTRY
                .iter()
                .map(|spec| (spec.id.to_string(), 50))
                .collect(),
            randomness: 20,
        }
    }
}

/// One simulation run's configuration. Owned by the caller; persistence
/// happens outside the engine (see `persist`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub enabled: Vec<String>,
    pub weights: Weights,
    /// Pin the RNG for reproducible brackets; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            enabled: all_toggle_ids(),
            weights: Weights::default(),
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn is_enabled(&self, id: &str) -> bool {
        self.enabled.iter().any(|e| e == id)
    }

    pub fn toggle(&mut self, id: &str) {
        if let Some(pos) = self.enabled.iter().position(|e| e == id) {
            self.enabled.remove(pos);
        } else {
            self.enabled.push(id.to_string());
        }
    }

    /// Registry specs that are currently enabled, in registry order.
    pub fn active_specs(&self) -> Vec<&'static MetricSpec> {
        METRIC_REGISTRY
            .iter()
            .filter(|spec| self.is_enabled(spec.id))
            .collect()
    }

    /// Weights as the engine should see them: a disabled randomness toggle
    /// forces the randomness weight to zero.
    pub fn run_weights(&self) -> Weights {
        let mut weights = self.weights.clone();
        if !self.is_enabled(RANDOMNESS_ID) {
            weights.randomness = 0;
        }
        weights
    }
}
