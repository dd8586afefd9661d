use rand::Rng;

use crate::config::Weights;
use crate::metric::Metric;

/// Weighted average of the team's normalized metric values over every metric
/// with a strictly-positive weight. A metric that cannot resolve the team
/// contributes neither value nor weight; zero accumulated weight scores 0.
pub fn score_team(team: &str, metrics: &[Metric], weights: &Weights) -> f64 {
    let mut total_weight = 0.0;
    let mut weighted_sum = 0.0;
    for metric in metrics {
        let weight = weights.metric_weight(&metric.id);
        if weight == 0 {
            continue;
        }
        let Some(normalized) = metric.normalized_score(team) else {
            continue;
        };
        let weight = f64::from(weight);
        weighted_sum += normalized * weight;
        total_weight += weight;
    }
    if total_weight == 0.0 {
        0.0
    } else {
        weighted_sum / total_weight
    }
}

/// Final comparison scores for both sides of a matchup. One fresh uniform
/// draw per side; the blend is the only stochastic element in a run. An
/// undefined side has no metrics to resolve and scores 0 deterministically.
pub fn comparison_scores(
    team_a: Option<&str>,
    team_b: Option<&str>,
    metrics: &[Metric],
    weights: &Weights,
    rng: &mut impl Rng,
) -> (f64, f64) {
    let r = weights.randomness_factor();
    let det_a = team_a.map_or(0.0, |team| score_team(team, metrics, weights));
    let det_b = team_b.map_or(0.0, |team| score_team(team, metrics, weights));
    let rand_a = rng.gen_range(0.0..1.0);
    let rand_b = rng.gen_range(0.0..1.0);
    (
        (1.0 - r) * det_a + r * rand_a,
        (1.0 - r) * det_b + r * rand_b,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SimConfig, metric_spec};
    use crate::metric::Metric;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use serde_json::json;
    use std::collections::HashMap;

    fn metrics_fixture() -> Vec<Metric> {
        vec![
            Metric::build(
                metric_spec("winPct").unwrap(),
                &json!([
                    { "Team": "Auburn", "Pct": 91.4 },
                    { "Team": "Alabama St.", "Pct": 55.0 },
                ]),
            ),
            Metric::build(
                metric_spec("rpg").unwrap(),
                &json!([
                    { "Team": "Auburn", "RPG": 40.0 },
                    { "Team": "Alabama St.", "RPG": 30.0 },
                ]),
            ),
        ]
    }

    fn weights(win_pct: u32, rpg: u32, randomness: u32) -> Weights {
        Weights {
            metrics: HashMap::from([
                ("winPct".to_string(), win_pct),
                ("rpg".to_string(), rpg),
            ]),
            randomness,
        }
    }

    #[test]
    fn all_zero_weights_score_zero() {
        let metrics = metrics_fixture();
        assert_eq!(score_team("Auburn", &metrics, &weights(0, 0, 0)), 0.0);
    }

    #[test]
    fn score_is_weighted_average_of_normalized_values() {
        let metrics = metrics_fixture();
        // Auburn tops both metrics: normalized 1.0 each.
        assert_eq!(score_team("Auburn", &metrics, &weights(100, 50, 0)), 1.0);
        assert_eq!(score_team("Alabama St.", &metrics, &weights(100, 50, 0)), 0.0);
    }

    #[test]
    fn unresolved_metric_is_omitted_from_the_average() {
        let mut metrics = metrics_fixture();
        // A metric that knows nothing about either team.
        metrics.push(Metric::build(
            metric_spec("fgPct").unwrap(),
            &json!([{ "Team": "Somebody Else", "FG%": 48.0 }]),
        ));
        let w = Weights {
            metrics: HashMap::from([
                ("winPct".to_string(), 100),
                ("fgPct".to_string(), 100),
            ]),
            randomness: 0,
        };
        // fgPct neither drags Auburn down nor dilutes the weight.
        assert_eq!(score_team("Auburn", &metrics, &w), 1.0);
    }

    #[test]
    fn default_weights_stay_in_unit_interval() {
        let metrics = metrics_fixture();
        let config = SimConfig::default();
        let w = config.run_weights();
        for team in ["Auburn", "Alabama St.", "Unknown U."] {
            let s = score_team(team, &metrics, &w);
            assert!((0.0..=1.0).contains(&s), "score {s} out of range for {team}");
        }
    }

    #[test]
    fn zero_randomness_is_deterministic() {
        let metrics = metrics_fixture();
        let w = weights(100, 0, 0);
        let mut rng_a = ChaCha8Rng::seed_from_u64(1);
        let mut rng_b = ChaCha8Rng::seed_from_u64(999);
        let scores_a =
            comparison_scores(Some("Auburn"), Some("Alabama St."), &metrics, &w, &mut rng_a);
        let scores_b =
            comparison_scores(Some("Auburn"), Some("Alabama St."), &metrics, &w, &mut rng_b);
        assert_eq!(scores_a, scores_b);
    }

    #[test]
    fn full_randomness_ignores_metrics() {
        let metrics = metrics_fixture();
        let w = weights(100, 0, 100);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let (a, b) = comparison_scores(Some("Auburn"), Some("Alabama St."), &metrics, &w, &mut rng);
        let mut check = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(a, check.gen_range(0.0..1.0));
        assert_eq!(b, check.gen_range(0.0..1.0));
    }

    #[test]
    fn undefined_side_scores_zero_deterministically() {
        let metrics = metrics_fixture();
        let w = weights(100, 0, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let (a, b) = comparison_scores(Some("Auburn"), None, &metrics, &w, &mut rng);
        assert!(a > b);
        assert_eq!(b, 0.0);
    }
}
