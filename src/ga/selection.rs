//! Selection strategies.
//!
//! Selection turns a sorted population into a mating pool. Every strategy
//! returns exactly the requested number of indices into the population;
//! indices may repeat (sampling with replacement).
//!
//! The population must already be sorted best-first (see
//! [`sort_population`](super::population::sort_population)). Rank selection
//! depends on that order directly, and the proportional strategies walk it.
//!
//! # References
//!
//! - Baker (1987), "Reducing Bias and Inefficiency in the Selection
//!   Algorithm" (stochastic universal sampling)
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and
//!   Machine Learning* (roulette wheel, sigma scaling)
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"

use super::error::ConfigError;
use super::population::is_fitter;
use super::types::Individual;
use rand::Rng;

/// Lowest weight sigma scaling will assign.
const SIGMA_FLOOR: f64 = 0.1;

/// Selection strategy for building the mating pool.
///
/// # Examples
///
/// ```
/// use u_evolve::ga::Selection;
///
/// // Fitness-proportionate, one draw per slot
/// let sel = Selection::RouletteWheel;
///
/// // Binary tournament, fitter competitor wins 75% of the time
/// let sel = Selection::Tournament { threshold: 0.75 };
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Fitness-proportionate selection with independent draws.
    ///
    /// # Complexity
    /// O(n) to build the cumulative table, O(log n) per draw
    #[default]
    RouletteWheel,

    /// Stochastic universal sampling: one random offset, evenly spaced
    /// pointers, a single pass over the population.
    ///
    /// Same expected counts as [`RouletteWheel`](Self::RouletteWheel) with
    /// much lower variance.
    ///
    /// # Complexity
    /// O(n + k) per generation
    StochasticUniversal,

    /// Linear rank selection: the best of `n` candidates gets weight `n`,
    /// the worst gets weight 1, then stochastic universal sampling.
    ///
    /// Insensitive to the scale of the scores.
    Rank,

    /// Binary tournament: two uniformly drawn competitors, the fitter wins
    /// with probability `threshold`, otherwise the weaker one wins.
    ///
    /// `threshold` must lie in `(0.5, 1]`. At `1.0` the fitter always wins.
    Tournament { threshold: f64 },

    /// Sigma scaling: weight `max(0.1, 1 + (score - mean) / (2σ))`, or 1 for
    /// every candidate when σ is 0, then stochastic universal sampling.
    ///
    /// When lower scores are better the deviation is inverted, giving
    /// `max(0.1, 1 - (score - mean) / (2σ))`.
    SigmaScaling,
}

impl Selection {
    /// Short strategy name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Selection::RouletteWheel => "roulette_wheel",
            Selection::StochasticUniversal => "stochastic_universal",
            Selection::Rank => "rank",
            Selection::Tournament { .. } => "tournament",
            Selection::SigmaScaling => "sigma_scaling",
        }
    }

    /// Checks strategy-specific options.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Selection::Tournament { threshold } = *self {
            if !(threshold > 0.5 && threshold <= 1.0) {
                return Err(ConfigError::InvalidTournamentThreshold(threshold));
            }
        }
        Ok(())
    }

    /// Selects `count` candidates from a best-first sorted population.
    ///
    /// Returns indices into `population`.
    ///
    /// # Panics
    /// Panics if `population` is empty and `count > 0`.
    pub fn select<I: Individual, R: Rng>(
        &self,
        population: &[I],
        count: usize,
        natural: bool,
        rng: &mut R,
    ) -> Vec<usize> {
        if count == 0 {
            return Vec::new();
        }
        assert!(
            !population.is_empty(),
            "cannot select from empty population"
        );

        match self {
            Selection::RouletteWheel => {
                roulette(&proportional_weights(population, natural), count, rng)
            }
            Selection::StochasticUniversal => {
                sus(&proportional_weights(population, natural), count, rng)
            }
            Selection::Rank => sus(&rank_weights(population.len()), count, rng),
            Selection::Tournament { threshold } => {
                tournament(population, *threshold, count, natural, rng)
            }
            Selection::SigmaScaling => sus(&sigma_weights(population, natural), count, rng),
        }
    }

    /// Returns the per-candidate selection weights this strategy samples
    /// from, or `None` for tournament selection, which has no weights.
    ///
    /// Weights are computed in a side table; candidate scores are not
    /// modified.
    pub fn weights<I: Individual>(&self, population: &[I], natural: bool) -> Option<Vec<f64>> {
        match self {
            Selection::RouletteWheel | Selection::StochasticUniversal => {
                Some(proportional_weights(population, natural))
            }
            Selection::Rank => Some(rank_weights(population.len())),
            Selection::Tournament { .. } => None,
            Selection::SigmaScaling => Some(sigma_weights(population, natural)),
        }
    }
}

/// Maps a raw score to a maximization-compatible weight.
///
/// With `natural` (higher is better) the score is returned unchanged.
/// Otherwise the reciprocal is returned, and a score of exactly 0 maps to
/// `+∞`.
pub fn adjust_score(raw: f64, natural: bool) -> f64 {
    if natural {
        raw
    } else if raw == 0.0 {
        f64::INFINITY
    } else {
        1.0 / raw
    }
}

/// Adjusted scores, with negative and NaN weights clamped to 0.
fn proportional_weights<I: Individual>(population: &[I], natural: bool) -> Vec<f64> {
    population
        .iter()
        .map(|ind| {
            let w = adjust_score(ind.score(), natural);
            if w > 0.0 {
                w
            } else {
                0.0
            }
        })
        .collect()
}

/// Ordinal rank of each position in a best-first population: `n, n-1, .., 1`.
fn rank_weights(n: usize) -> Vec<f64> {
    (0..n).map(|i| (n - i) as f64).collect()
}

fn sigma_weights<I: Individual>(population: &[I], natural: bool) -> Vec<f64> {
    let n = population.len() as f64;
    let mean = population.iter().map(Individual::score).sum::<f64>() / n;
    let variance = population
        .iter()
        .map(|ind| (ind.score() - mean).powi(2))
        .sum::<f64>()
        / n;
    let std_dev = variance.sqrt();

    // Lower scores are better under the inverted convention.
    let direction = if natural { 1.0 } else { -1.0 };

    population
        .iter()
        .map(|ind| {
            if std_dev == 0.0 {
                1.0
            } else {
                let scaled = 1.0 + direction * (ind.score() - mean) / (2.0 * std_dev);
                scaled.max(SIGMA_FLOOR)
            }
        })
        .collect()
}

/// Handles weight tables that cannot be sampled proportionally.
///
/// - infinite total: draw uniformly among the infinite-weight entries
/// - zero or NaN total: draw uniformly over the whole table
fn degenerate_draws<R: Rng>(weights: &[f64], count: usize, rng: &mut R) -> Option<Vec<usize>> {
    let total: f64 = weights.iter().sum();
    if total.is_finite() && total > 0.0 {
        return None;
    }

    let mut pool: Vec<usize> = if total.is_infinite() {
        (0..weights.len())
            .filter(|&i| weights[i].is_infinite())
            .collect()
    } else {
        Vec::new()
    };
    if pool.is_empty() {
        pool = (0..weights.len()).collect();
    }

    Some(
        (0..count)
            .map(|_| pool[rng.random_range(0..pool.len())])
            .collect(),
    )
}

/// Roulette wheel over a cumulative weight table.
///
/// Each draw lands uniformly in `[0, total)` and is mapped to the smallest
/// index whose cumulative weight is at least the draw.
fn roulette<R: Rng>(weights: &[f64], count: usize, rng: &mut R) -> Vec<usize> {
    if let Some(picks) = degenerate_draws(weights, count, rng) {
        return picks;
    }

    let cumulative: Vec<f64> = weights
        .iter()
        .scan(0.0, |acc, &w| {
            *acc += w;
            Some(*acc)
        })
        .collect();
    let last = cumulative.len() - 1;
    let total = cumulative[last];

    (0..count)
        .map(|_| {
            let draw = rng.random::<f64>() * total;
            cumulative.partition_point(|&c| c < draw).min(last)
        })
        .collect()
}

/// Stochastic universal sampling over a weight table.
fn sus<R: Rng>(weights: &[f64], count: usize, rng: &mut R) -> Vec<usize> {
    if let Some(picks) = degenerate_draws(weights, count, rng) {
        return picks;
    }

    let aggregate: f64 = weights.iter().sum();
    let offset = rng.random::<f64>();
    let mut selected = Vec::with_capacity(count);
    let mut expectation = 0.0;

    for (i, &w) in weights.iter().enumerate() {
        expectation += w / aggregate * count as f64;
        while selected.len() < count && expectation > offset + selected.len() as f64 {
            selected.push(i);
        }
    }

    // Rounding can leave the last pointer just past the final accumulation.
    if selected.len() < count {
        let tail = weights
            .iter()
            .rposition(|&w| w > 0.0)
            .unwrap_or(weights.len() - 1);
        selected.resize(count, tail);
    }
    selected
}

fn tournament<I: Individual, R: Rng>(
    population: &[I],
    threshold: f64,
    count: usize,
    natural: bool,
    rng: &mut R,
) -> Vec<usize> {
    let n = population.len();
    (0..count)
        .map(|_| {
            let a = rng.random_range(0..n);
            let b = rng.random_range(0..n);
            let b_wins = is_fitter(population[b].score(), population[a].score(), natural);
            let (fitter, weaker) = if b_wins { (b, a) } else { (a, b) };
            if rng.random::<f64>() < threshold {
                fitter
            } else {
                weaker
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::population::sort_population;
    use crate::random::create_rng;
    use proptest::prelude::*;

    #[derive(Clone, Debug)]
    struct TestInd {
        fit: f64,
    }

    impl Individual for TestInd {
        fn score(&self) -> f64 {
            self.fit
        }
        fn set_score(&mut self, f: f64) {
            self.fit = f;
        }
    }

    fn make_population(fitnesses: &[f64], natural: bool) -> Vec<TestInd> {
        let mut pop: Vec<TestInd> = fitnesses.iter().map(|&f| TestInd { fit: f }).collect();
        sort_population(&mut pop, natural);
        pop
    }

    const ALL: [Selection; 5] = [
        Selection::RouletteWheel,
        Selection::StochasticUniversal,
        Selection::Rank,
        Selection::Tournament { threshold: 0.75 },
        Selection::SigmaScaling,
    ];

    #[test]
    fn test_adjust_score() {
        assert_eq!(adjust_score(4.0, true), 4.0);
        assert_eq!(adjust_score(4.0, false), 0.25);
        assert_eq!(adjust_score(0.0, false), f64::INFINITY);
        assert_eq!(adjust_score(0.0, true), 0.0);
    }

    #[test]
    fn test_validate_tournament_threshold() {
        assert!(Selection::Tournament { threshold: 0.75 }.validate().is_ok());
        assert!(Selection::Tournament { threshold: 1.0 }.validate().is_ok());
        assert_eq!(
            Selection::Tournament { threshold: 0.5 }.validate(),
            Err(ConfigError::InvalidTournamentThreshold(0.5))
        );
        assert!(Selection::Tournament { threshold: 1.01 }.validate().is_err());
        assert!(Selection::Tournament { threshold: f64::NAN }.validate().is_err());
        assert!(Selection::Rank.validate().is_ok());
    }

    #[test]
    fn test_roulette_favors_best() {
        // Sorted descending: [100, 80, 50, 1]
        let pop = make_population(&[100.0, 50.0, 1.0, 80.0], true);
        let mut rng = create_rng(42);

        let picks = Selection::RouletteWheel.select(&pop, 10_000, true, &mut rng);
        let mut counts = [0u32; 4];
        for i in picks {
            counts[i] += 1;
        }
        assert!(
            counts[0] > counts[3] * 20,
            "best should dominate worst: {counts:?}"
        );
    }

    #[test]
    fn test_roulette_inverted_favors_lowest() {
        // Sorted ascending for minimization: [1, 50, 80, 100]
        let pop = make_population(&[100.0, 50.0, 1.0, 80.0], false);
        let mut rng = create_rng(42);

        let picks = Selection::RouletteWheel.select(&pop, 10_000, false, &mut rng);
        let best = picks.iter().filter(|&&i| i == 0).count();
        assert!(best > 8_000, "expected 1.0 to dominate, got {best}/10000");
    }

    #[test]
    fn test_roulette_skips_zero_weight() {
        let pop = make_population(&[5.0, 0.0, 5.0], true);
        let mut rng = create_rng(9);
        let picks = Selection::RouletteWheel.select(&pop, 2_000, true, &mut rng);
        // Zero-score candidate sorted last
        assert!(picks.iter().all(|&i| i != 2));
    }

    #[test]
    fn test_sus_expected_counts_are_exact() {
        // Weights 4:2:1:1, 8 slots -> SUS yields exactly 4, 2, 1, 1
        let pop = make_population(&[4.0, 2.0, 1.0, 1.0], true);
        for seed in 0..20 {
            let mut rng = create_rng(seed);
            let picks = Selection::StochasticUniversal.select(&pop, 8, true, &mut rng);
            let mut counts = [0usize; 4];
            for i in picks {
                counts[i] += 1;
            }
            assert_eq!(counts, [4, 2, 1, 1], "seed {seed}");
        }
    }

    #[test]
    fn test_zero_score_inverted_gets_all_draws() {
        let pop = make_population(&[3.0, 0.0, 7.0], false);
        let mut rng = create_rng(5);
        for sel in [Selection::RouletteWheel, Selection::StochasticUniversal] {
            let picks = sel.select(&pop, 50, false, &mut rng);
            assert_eq!(picks.len(), 50);
            // 0.0 sorts first under the inverted convention
            assert!(picks.iter().all(|&i| i == 0), "{sel:?}: {picks:?}");
        }
    }

    #[test]
    fn test_all_zero_natural_is_uniform() {
        let pop = make_population(&[0.0, 0.0, 0.0, 0.0], true);
        let mut rng = create_rng(42);
        let picks = Selection::RouletteWheel.select(&pop, 8_000, true, &mut rng);
        let mut counts = [0u32; 4];
        for i in picks {
            counts[i] += 1;
        }
        for &c in &counts {
            assert!(c > 1_500, "expected uniform, got {counts:?}");
        }
    }

    #[test]
    fn test_rank_weights_and_scores_untouched() {
        let pop = make_population(&[10.0, 30.0, 20.0], true);
        let before: Vec<f64> = pop.iter().map(|i| i.fit).collect();
        let mut rng = create_rng(1);

        assert_eq!(
            Selection::Rank.weights(&pop, true),
            Some(vec![3.0, 2.0, 1.0])
        );
        let picks = Selection::Rank.select(&pop, 6, true, &mut rng);
        assert_eq!(picks.len(), 6);

        let after: Vec<f64> = pop.iter().map(|i| i.fit).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_rank_favors_best() {
        let pop = make_population(&[100.0, 50.0, 1.0, 80.0], false);
        let mut rng = create_rng(42);
        let picks = Selection::Rank.select(&pop, 1_000, false, &mut rng);
        let best = picks.iter().filter(|&&i| i == 0).count();
        let worst = picks.iter().filter(|&&i| i == 3).count();
        assert!(best > worst, "best={best}, worst={worst}");
    }

    #[test]
    fn test_tournament_threshold_one_is_deterministic() {
        // With threshold 1.0 a candidate can win only against an equal or
        // weaker competitor, so the worst can only win against itself.
        let pop = make_population(&[1.0, 2.0, 3.0, 4.0, 5.0], true);
        let sel = Selection::Tournament { threshold: 1.0 };

        let mut rng_a = create_rng(77);
        let mut rng_b = create_rng(77);
        let a = sel.select(&pop, 500, true, &mut rng_a);
        let b = sel.select(&pop, 500, true, &mut rng_b);
        assert_eq!(a, b);

        // Replay the draws: the winner is always the fitter competitor
        let mut rng = create_rng(77);
        for &winner in &a {
            let x = rng.random_range(0..pop.len());
            let y = rng.random_range(0..pop.len());
            let _coin = rng.random::<f64>();
            assert_eq!(winner, x.min(y), "sorted best-first, fitter = lower index");
        }
    }

    #[test]
    fn test_tournament_inverted_prefers_lower() {
        let pop = make_population(&[9.0, 1.0], false);
        let mut rng = create_rng(3);
        let sel = Selection::Tournament { threshold: 1.0 };
        let picks = sel.select(&pop, 200, false, &mut rng);
        // The 9.0 candidate (index 1) can only win a tournament against itself
        let ones = picks.iter().filter(|&&i| i == 1).count();
        assert!(ones < 100, "got {ones}");
    }

    #[test]
    fn test_tournament_low_threshold_lets_weaker_win() {
        let pop = make_population(&[10.0, 1.0], true);
        let mut rng = create_rng(3);
        let sel = Selection::Tournament { threshold: 0.6 };
        let picks = sel.select(&pop, 4_000, true, &mut rng);
        let weak = picks.iter().filter(|&&i| i == 1).count();
        assert!(weak > 1_000, "weaker should win sometimes, got {weak}");
    }

    #[test]
    fn test_sigma_zero_std_dev_weights_one() {
        let pop = make_population(&[4.0, 4.0, 4.0, 4.0], true);
        let w = Selection::SigmaScaling.weights(&pop, true).unwrap();
        assert_eq!(w, vec![1.0; 4]);
        let w = Selection::SigmaScaling.weights(&pop, false).unwrap();
        assert_eq!(w, vec![1.0; 4]);
    }

    #[test]
    fn test_sigma_weights_values_and_floor() {
        // scores [3, 1] -> mean 2, σ 1 -> weights 1.5 and 0.5
        let pop = make_population(&[3.0, 1.0], true);
        let w = Selection::SigmaScaling.weights(&pop, true).unwrap();
        assert!((w[0] - 1.5).abs() < 1e-12);
        assert!((w[1] - 0.5).abs() < 1e-12);

        // Inverted: lower is better, so the deviation flips
        let pop = make_population(&[3.0, 1.0], false);
        let w = Selection::SigmaScaling.weights(&pop, false).unwrap();
        assert!((w[0] - 1.5).abs() < 1e-12); // score 1.0
        assert!((w[1] - 0.5).abs() < 1e-12); // score 3.0

        // mean 9, σ 3: the lone 0.0 would get 1 - 9/6 = -0.5 and is floored
        let mut scores = vec![10.0; 9];
        scores.push(0.0);
        let pop = make_population(&scores, true);
        let w = Selection::SigmaScaling.weights(&pop, true).unwrap();
        assert_eq!(w[9], SIGMA_FLOOR);
        assert!((w[0] - (1.0 + 1.0 / 6.0)).abs() < 1e-12);
    }

    #[test]
    fn test_tournament_has_no_weights() {
        let pop = make_population(&[1.0, 2.0], true);
        assert!(Selection::Tournament { threshold: 0.9 }
            .weights(&pop, true)
            .is_none());
    }

    #[test]
    fn test_single_individual() {
        let pop = make_population(&[5.0], true);
        let mut rng = create_rng(42);
        for sel in ALL {
            assert_eq!(sel.select(&pop, 3, true, &mut rng), vec![0, 0, 0]);
        }
    }

    #[test]
    fn test_zero_count() {
        let pop: Vec<TestInd> = Vec::new();
        let mut rng = create_rng(42);
        for sel in ALL {
            assert!(sel.select(&pop, 0, true, &mut rng).is_empty());
        }
    }

    #[test]
    #[should_panic(expected = "cannot select from empty population")]
    fn test_empty_population_panics() {
        let pop: Vec<TestInd> = vec![];
        let mut rng = create_rng(42);
        Selection::RouletteWheel.select(&pop, 1, true, &mut rng);
    }

    proptest! {
        #[test]
        fn prop_select_size_and_membership(
            scores in prop::collection::vec(0.0f64..1000.0, 1..40),
            count in 0usize..60,
            natural in any::<bool>(),
            seed in any::<u64>(),
            which in 0usize..5,
        ) {
            let pop = make_population(&scores, natural);
            let mut rng = create_rng(seed);
            let picks = ALL[which].select(&pop, count, natural, &mut rng);
            prop_assert_eq!(picks.len(), count);
            prop_assert!(picks.iter().all(|&i| i < pop.len()));
        }

        #[test]
        fn prop_selection_is_seed_deterministic(
            scores in prop::collection::vec(0.1f64..50.0, 1..20),
            seed in any::<u64>(),
            which in 0usize..5,
        ) {
            let pop = make_population(&scores, false);
            let a = ALL[which].select(&pop, 15, false, &mut create_rng(seed));
            let b = ALL[which].select(&pop, 15, false, &mut create_rng(seed));
            prop_assert_eq!(a, b);
        }
    }
}
