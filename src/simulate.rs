use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::bracket::{Bracket, FIRST_ROUND_PAIRS, Region};
use crate::config::Weights;
use crate::metric::Metric;
use crate::scoring::comparison_scores;

/// A bracket slot. `None` is a missing/unresolvable team; the simulation
/// carries it through instead of aborting, and scoring fallbacks decide the
/// games it appears in.
pub type TeamSlot = Option<String>;

/// One decided game. Scores are the randomness-blended comparison scores,
/// rounded to 3 decimals; a tie goes to side A.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub team_a: TeamSlot,
    pub team_b: TeamSlot,
    pub score_a: f64,
    pub score_b: f64,
    pub winner: TeamSlot,
    pub loser: TeamSlot,
}

pub type Round = Vec<Matchup>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionResult {
    pub name: String,
    /// Round of 64 through Elite 8, in order.
    pub rounds: Vec<Round>,
    pub champion: TeamSlot,
}

/// Full tournament output: a plain data tree for rendering, export, and
/// persistence. Freshly allocated per run, never aliased with prior runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub regions: Vec<RegionResult>,
    pub final_four: Round,
    pub championship: Round,
    pub champion: TeamSlot,
}

impl SimulationResult {
    pub fn region(&self, name: &str) -> Option<&RegionResult> {
        self.regions.iter().find(|region| region.name == name)
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Decide every matchup in a round. Each matchup transitions pending ->
/// decided exactly once; no matchup is revisited.
pub fn play_round(
    pairs: Vec<(TeamSlot, TeamSlot)>,
    metrics: &[Metric],
    weights: &Weights,
    rng: &mut impl Rng,
) -> Round {
    pairs
        .into_iter()
        .map(|(team_a, team_b)| {
            let (score_a, score_b) = comparison_scores(
                team_a.as_deref(),
                team_b.as_deref(),
                metrics,
                weights,
                rng,
            );
            let a_wins = score_a >= score_b;
            let (winner, loser) = if a_wins {
                (team_a.clone(), team_b.clone())
            } else {
                (team_b.clone(), team_a.clone())
            };
            Matchup {
                team_a,
                team_b,
                score_a: round3(score_a),
                score_b: round3(score_b),
                winner,
                loser,
            }
        })
        .collect()
}

/// Pair consecutive winners (0,1), (2,3), ... preserving bracket-position
/// order; this is plain advancement, not a re-seeding step.
pub fn winners_to_pairs(round: &Round) -> Vec<(TeamSlot, TeamSlot)> {
    round
        .chunks(2)
        .map(|pair| {
            let first = pair[0].winner.clone();
            let second = pair.get(1).and_then(|matchup| matchup.winner.clone());
            (first, second)
        })
        .collect()
}

/// Opening-round slots for a region under the canonical seed pairing. A
/// seed with no team yields an undefined side.
pub fn first_round_slots(region: &Region) -> Vec<(TeamSlot, TeamSlot)> {
    FIRST_ROUND_PAIRS
        .iter()
        .map(|&(seed_a, seed_b)| {
            (
                region.team_by_seed(seed_a).map(str::to_string),
                region.team_by_seed(seed_b).map(str::to_string),
            )
        })
        .collect()
}

/// Play the four regional rounds (Round of 64 through Elite 8).
pub fn simulate_region(
    region: &Region,
    metrics: &[Metric],
    weights: &Weights,
    rng: &mut impl Rng,
) -> RegionResult {
    let mut rounds = Vec::with_capacity(4);
    let mut current = play_round(first_round_slots(region), metrics, weights, rng);
    for _ in 0..3 {
        let next = play_round(winners_to_pairs(&current), metrics, weights, rng);
        rounds.push(current);
        current = next;
    }
    let champion = current.first().and_then(|matchup| matchup.winner.clone());
    rounds.push(current);
    RegionResult {
        name: region.name.clone(),
        rounds,
        champion,
    }
}

/// Simulate the whole field: four independent regions, then the configured
/// Final Four pairing, then the Championship.
pub fn simulate_tournament(
    bracket: &Bracket,
    metrics: &[Metric],
    weights: &Weights,
    rng: &mut impl Rng,
) -> SimulationResult {
    let regions: Vec<RegionResult> = bracket
        .regions
        .iter()
        .map(|region| simulate_region(region, metrics, weights, rng))
        .collect();

    let champion_of = |name: &str| {
        regions
            .iter()
            .find(|region| region.name == name)
            .and_then(|region| region.champion.clone())
    };
    let semifinal_pairs = bracket
        .final_four
        .iter()
        .map(|pair| (champion_of(&pair[0]), champion_of(&pair[1])))
        .collect();

    let final_four = play_round(semifinal_pairs, metrics, weights, rng);
    let championship = play_round(winners_to_pairs(&final_four), metrics, weights, rng);
    let champion = championship.first().and_then(|matchup| matchup.winner.clone());

    SimulationResult {
        regions,
        final_four,
        championship,
        champion,
    }
}
