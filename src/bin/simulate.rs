use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use madness_terminal::config::SimConfig;
use madness_terminal::data_files::{bracket_from_datasets, build_metrics, load_dataset_dir};
use madness_terminal::export::{REGION_ROUND_LABELS, export_bracket_json};
use madness_terminal::persist;
use madness_terminal::simulate::{Round, TeamSlot, simulate_tournament};

/// Headless bracket run: `simulate [data_dir] [seed] [out.json]`.
///
/// Uses the persisted TUI settings when present so both front ends agree on
/// weights.
fn main() -> Result<()> {
    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    let seed = std::env::args()
        .nth(2)
        .map(|raw| raw.parse::<u64>())
        .transpose()
        .context("seed must be an unsigned integer")?;
    let out_path = std::env::args().nth(3).map(PathBuf::from);

    let load = load_dataset_dir(&data_dir);
    for error in &load.errors {
        eprintln!("warning: {error}");
    }
    let bracket = bracket_from_datasets(&load.datasets)
        .map_err(|err| anyhow!("{err:#}; is {} populated?", data_dir.display()))?;

    let mut config = persist::load()
        .map(|cache| cache.config)
        .unwrap_or_else(SimConfig::default);
    if seed.is_some() {
        config.seed = seed;
    }

    let metrics = build_metrics(&config, &load.datasets, &bracket);
    let weights = config.run_weights();
    let mut rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let result = simulate_tournament(&bracket, &metrics, &weights, &mut rng);

    for region in &result.regions {
        println!("== {} ==", region.name);
        for (round, label) in region.rounds.iter().zip(REGION_ROUND_LABELS) {
            print_round(label, round);
        }
    }
    println!("== Finals ==");
    print_round("Final Four", &result.final_four);
    print_round("Championship", &result.championship);
    println!(
        "Champion: {}",
        result.champion.as_deref().unwrap_or("(none)")
    );

    if let Some(path) = out_path {
        export_bracket_json(&path, &result)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn print_round(label: &str, round: &Round) {
    println!("  {label}");
    for matchup in round {
        println!(
            "    {} {:.3} vs {} {:.3} -> {}",
            slot(&matchup.team_a),
            matchup.score_a,
            slot(&matchup.team_b),
            matchup.score_b,
            slot(&matchup.winner),
        );
    }
}

fn slot(team: &TeamSlot) -> &str {
    team.as_deref().unwrap_or("-")
}
