//! Core trait definitions for the evolutionary engine.
//!
//! [`Individual`] and [`GaProblem`] define the contract between the generic
//! engine and a domain-specific problem. Crossover and mutation are supplied
//! separately through [`CrossoverOperator`] and [`MutationOperator`] so that
//! each stage can be switched on or off independently.

use super::error::Stage;
use super::stats::GenerationStats;
use rand::Rng;

/// A candidate solution in the population.
///
/// Candidates carry their own score. The engine calls
/// [`GaProblem::evaluate`] every generation and stores the result via
/// [`set_score`](Individual::set_score).
///
/// # Implementing
///
/// ```ignore
/// #[derive(Clone)]
/// struct Word {
///     letters: Vec<u8>,
///     score: f64,
/// }
///
/// impl Individual for Word {
///     fn score(&self) -> f64 { self.score }
///     fn set_score(&mut self, s: f64) { self.score = s; }
/// }
/// ```
pub trait Individual: Clone + Send + Sync {
    /// Returns the score assigned by the last evaluation.
    fn score(&self) -> f64;

    /// Overwrites the score. Called by the engine after evaluation.
    fn set_score(&mut self, score: f64);
}

/// What a single factory call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Spawn<I> {
    /// A single candidate.
    One(I),
    /// Several candidates at once. Must not be empty.
    Batch(Vec<I>),
}

impl<I> From<I> for Spawn<I> {
    fn from(individual: I) -> Self {
        Spawn::One(individual)
    }
}

/// Defines an optimization problem for the engine.
///
/// Covers the three mandatory collaborators of a run:
///
/// 1. **Factory**: how to create initial candidates
/// 2. **Evaluation**: how to score a candidate
/// 3. **Termination**: when to stop, given the latest statistics
///
/// Whether a higher or lower score is better is decided by
/// [`GaConfig::natural`](super::GaConfig::natural), not by the problem.
///
/// # Thread Safety
///
/// `GaProblem` must be `Send + Sync` because the engine may evaluate
/// candidates in parallel (feature `parallel`).
pub trait GaProblem: Send + Sync {
    /// The candidate type for this problem.
    type Individual: Individual;

    /// Creates one candidate, or a batch of candidates.
    ///
    /// `index` is the number of candidates created so far for the
    /// population being filled, `target` is that population's final size.
    /// Any error aborts initialization.
    fn create_individual<R: Rng>(
        &self,
        index: usize,
        target: usize,
        rng: &mut R,
    ) -> anyhow::Result<Spawn<Self::Individual>>;

    /// Scores a candidate.
    ///
    /// Called for every candidate of every generation, possibly from
    /// several threads at once. Any error aborts the generation.
    fn evaluate(&self, individual: &Self::Individual) -> anyhow::Result<f64>;

    /// Returns `true` when the run should stop.
    ///
    /// Checked once per generation, after statistics are computed. The
    /// engine has no other stopping rule, so this must eventually return
    /// `true` (a generation cap is the usual safeguard).
    fn should_terminate(&self, stats: &GenerationStats<Self::Individual>) -> bool;
}

/// Recombines two parents into offspring.
///
/// Closures of the form `Fn(&I, &I, usize, &mut R) -> anyhow::Result<Vec<I>>`
/// implement this trait for any concrete generator type `R`.
pub trait CrossoverOperator<I, R: Rng> {
    /// Produces offspring from `parent1` and `parent2` using `points`
    /// crossover points. Any number of offspring may be returned.
    fn crossover(&self, parent1: &I, parent2: &I, points: usize, rng: &mut R)
        -> anyhow::Result<Vec<I>>;
}

impl<I, R, F> CrossoverOperator<I, R> for F
where
    R: Rng,
    F: Fn(&I, &I, usize, &mut R) -> anyhow::Result<Vec<I>>,
{
    fn crossover(
        &self,
        parent1: &I,
        parent2: &I,
        points: usize,
        rng: &mut R,
    ) -> anyhow::Result<Vec<I>> {
        self(parent1, parent2, points, rng)
    }
}

/// Perturbs a candidate.
///
/// The operator receives the configured per-element probability and decides
/// on its own which parts of the candidate to change.
pub trait MutationOperator<I, R: Rng> {
    fn mutate(&self, individual: I, probability: f64, rng: &mut R) -> anyhow::Result<I>;
}

impl<I, R, F> MutationOperator<I, R> for F
where
    R: Rng,
    F: Fn(I, f64, &mut R) -> anyhow::Result<I>,
{
    fn mutate(&self, individual: I, probability: f64, rng: &mut R) -> anyhow::Result<I> {
        self(individual, probability, rng)
    }
}

/// Receives lifecycle signals from a run.
///
/// Populations are passed per island, in ring order; without the island
/// model there is exactly one entry. All hooks default to no-ops.
pub trait GaObserver<I: Individual> {
    /// The initial population was created (not yet scored).
    fn on_initial_population(&self, _islands: &[Vec<I>]) {}

    /// Every candidate of `generation` has a score.
    fn on_population_evaluated(&self, _generation: usize, _islands: &[Vec<I>]) {}

    /// Statistics for a generation are ready.
    fn on_generation(&self, _stats: &GenerationStats<I>) {}

    /// A stage failed and the run is aborting.
    fn on_failure(&self, _stage: Stage, _error: &anyhow::Error) {}
}

impl<I: Individual, T: GaObserver<I> + ?Sized> GaObserver<I> for &T {
    fn on_initial_population(&self, islands: &[Vec<I>]) {
        (**self).on_initial_population(islands)
    }

    fn on_population_evaluated(&self, generation: usize, islands: &[Vec<I>]) {
        (**self).on_population_evaluated(generation, islands)
    }

    fn on_generation(&self, stats: &GenerationStats<I>) {
        (**self).on_generation(stats)
    }

    fn on_failure(&self, stage: Stage, error: &anyhow::Error) {
        (**self).on_failure(stage, error)
    }
}

/// Observer that ignores every signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl<I: Individual> GaObserver<I> for NoopObserver {}

/// Placeholder for a stage whose operator was not supplied.
///
/// The runner refuses to start when the matching stage is enabled, so
/// these methods are never reached during a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unset;

impl<I, R: Rng> CrossoverOperator<I, R> for Unset {
    fn crossover(&self, _: &I, _: &I, _: usize, _: &mut R) -> anyhow::Result<Vec<I>> {
        anyhow::bail!("no crossover operator supplied")
    }
}

impl<I, R: Rng> MutationOperator<I, R> for Unset {
    fn mutate(&self, _: I, _: f64, _: &mut R) -> anyhow::Result<I> {
        anyhow::bail!("no mutation operator supplied")
    }
}
