use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Canonical opening-round pairing inside a 16-team region.
pub const FIRST_ROUND_PAIRS: [(u8, u8); 8] =
    [(1, 16), (8, 9), (5, 12), (4, 13), (6, 11), (3, 14), (7, 10), (2, 15)];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketEntry {
    pub team: String,
    pub seed: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub teams: Vec<BracketEntry>,
}

impl Region {
    pub fn team_by_seed(&self, seed: u8) -> Option<&str> {
        self.teams
            .iter()
            .find(|entry| entry.seed == seed)
            .map(|entry| entry.team.as_str())
    }

    pub fn seed_of(&self, team: &str) -> Option<u8> {
        self.teams
            .iter()
            .find(|entry| entry.team == team)
            .map(|entry| entry.seed)
    }
}

/// The 64-team field: four regions plus the cross-region Final Four
/// assignment. The assignment is configured data, not derived; files that
/// omit it get the 2025 layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub regions: Vec<Region>,
    #[serde(default = "default_final_four")]
    pub final_four: [[String; 2]; 2],
}

fn default_final_four() -> [[String; 2]; 2] {
    [
        ["West".to_string(), "South".to_string()],
        ["East".to_string(), "Midwest".to_string()],
    ]
}

impl Bracket {
    pub fn region(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|region| region.name == name)
    }

    /// Seed of a team anywhere in the field, with its region name.
    pub fn seed_for_team(&self, team: &str) -> Option<(&str, u8)> {
        self.regions.iter().find_map(|region| {
            region.seed_of(team).map(|seed| (region.name.as_str(), seed))
        })
    }
}

pub fn parse_bracket_json(raw: &str) -> Result<Bracket> {
    serde_json::from_str(raw).context("invalid bracket json")
}

pub fn load_bracket(path: &Path) -> Result<Bracket> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read bracket file {}", path.display()))?;
    parse_bracket_json(&raw)
}
