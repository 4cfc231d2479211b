//! Per-generation statistics.
//!
//! [`GenerationStats`] is built from a sorted population (or from every
//! island's sorted population) once per generation and handed to the
//! termination check and the observer. It is never mutated afterwards.

use super::population::is_fitter;
use super::types::Individual;
use std::time::Duration;

/// Aggregate statistics over every score of one generation.
#[derive(Debug, Clone)]
pub struct GenerationStats<I> {
    /// Raw scores in population order (islands concatenated in index order).
    pub scores: Vec<f64>,

    /// Number of scores.
    pub count: usize,

    /// Sum of all scores.
    pub sum: f64,

    /// Product of all scores.
    pub product: f64,

    /// Sum of `1 / score`.
    pub reciprocal_sum: f64,

    /// Smallest score.
    pub min: f64,

    /// Largest score.
    pub max: f64,

    /// Arithmetic mean.
    pub mean: f64,

    /// Population standard deviation (divisor `count`, not `count - 1`).
    pub std_dev: f64,

    /// Best candidate of the generation.
    pub best: I,

    /// Score of [`best`](Self::best).
    pub best_score: f64,

    /// Generation number; the initial population is generation 0.
    pub generation: usize,

    /// Wall time since the run started.
    pub elapsed: Duration,
}

impl<I: Individual> GenerationStats<I> {
    /// Computes statistics for a single sorted population.
    ///
    /// Returns `None` for an empty population.
    pub fn from_population(
        population: &[I],
        natural: bool,
        generation: usize,
        elapsed: Duration,
    ) -> Option<Self> {
        Self::from_islands(std::slice::from_ref(&population), natural, generation, elapsed)
    }

    /// Computes statistics over several sorted populations.
    ///
    /// Scores are flattened across all islands. The best candidate is chosen
    /// by comparing the head (index 0) of every island under the `natural`
    /// convention; ties go to the lower island index.
    pub fn from_islands<P: AsRef<[I]>>(
        islands: &[P],
        natural: bool,
        generation: usize,
        elapsed: Duration,
    ) -> Option<Self> {
        let best = islands
            .iter()
            .filter_map(|island| island.as_ref().first())
            .reduce(|best, head| {
                if is_fitter(head.score(), best.score(), natural) {
                    head
                } else {
                    best
                }
            })?
            .clone();

        let scores: Vec<f64> = islands
            .iter()
            .flat_map(|island| island.as_ref().iter().map(Individual::score))
            .collect();

        let count = scores.len();
        let mut sum = 0.0;
        let mut product = 1.0;
        let mut reciprocal_sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &s in &scores {
            sum += s;
            product *= s;
            reciprocal_sum += 1.0 / s;
            min = min.min(s);
            max = max.max(s);
        }

        let mean = sum / count as f64;
        let variance = scores.iter().map(|&s| (mean - s) * (mean - s)).sum::<f64>() / count as f64;

        Some(Self {
            best_score: best.score(),
            best,
            scores,
            count,
            sum,
            product,
            reciprocal_sum,
            min,
            max,
            mean,
            std_dev: variance.sqrt(),
            generation,
            elapsed,
        })
    }
}
