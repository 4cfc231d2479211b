//! Evolutionary loop execution.
//!
//! [`GaRunner`] orchestrates a run:
//! initialization → evaluation → sort → statistics → termination check →
//! selection/reproduction (or migration) → evaluation → …
//!
//! Every generation is a strict barrier pipeline. A failing stage aborts the
//! run with [`GaError::Stage`]; the generation in progress is discarded.

use super::config::GaConfig;
use super::error::{ConfigError, GaError, Stage};
use super::island::migrate;
use super::population::{create_population, evaluate_population, is_fitter, sort_population};
use super::reproduction::Reproducer;
use super::stats::GenerationStats;
use super::types::{
    CrossoverOperator, GaObserver, GaProblem, Individual, MutationOperator, NoopObserver, Unset,
};
use crate::random::rng_from_seed;
use rand::rngs::StdRng;
use std::time::Instant;
use tracing::instrument;

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct GaResult<I> {
    /// The best candidate seen in any generation.
    pub best: I,

    /// Score of [`best`](Self::best).
    pub best_score: f64,

    /// Generation at which the termination check returned `true`.
    pub generation: usize,

    /// Best score of each generation, starting with generation 0.
    pub score_history: Vec<f64>,

    /// Statistics of the final generation.
    pub stats: GenerationStats<I>,
}

/// Executes the evolutionary loop.
///
/// # Usage
///
/// ```ignore
/// let problem = MyProblem::new();
/// let config = GaConfig::default().with_seed(42).with_elite_ratio(0.05);
/// let result = GaRunner::new(&problem, config)
///     .with_crossover(SinglePoint)
///     .with_mutation(RandomReset)
///     .run()?;
/// println!("best {:?} at generation {}", result.best_score, result.generation);
/// ```
///
/// Crossover and mutation are enabled by default in [`GaConfig`]; running
/// without supplying the matching operator is a configuration error. Turn a
/// stage off with [`GaConfig::with_crossover`] / [`GaConfig::with_mutation`].
pub struct GaRunner<'a, P, C = Unset, M = Unset, O = NoopObserver> {
    problem: &'a P,
    config: GaConfig,
    crossover: Option<C>,
    mutation: Option<M>,
    observer: O,
}

impl<'a, P: GaProblem> GaRunner<'a, P> {
    /// Creates a runner with no operators and no observer.
    pub fn new(problem: &'a P, config: GaConfig) -> Self {
        Self {
            problem,
            config,
            crossover: None,
            mutation: None,
            observer: NoopObserver,
        }
    }
}

impl<'a, P: GaProblem, C, M, O> GaRunner<'a, P, C, M, O> {
    /// Supplies the crossover operator.
    pub fn with_crossover<C2>(self, crossover: C2) -> GaRunner<'a, P, C2, M, O> {
        GaRunner {
            problem: self.problem,
            config: self.config,
            crossover: Some(crossover),
            mutation: self.mutation,
            observer: self.observer,
        }
    }

    /// Supplies the mutation operator.
    pub fn with_mutation<M2>(self, mutation: M2) -> GaRunner<'a, P, C, M2, O> {
        GaRunner {
            problem: self.problem,
            config: self.config,
            crossover: self.crossover,
            mutation: Some(mutation),
            observer: self.observer,
        }
    }

    /// Attaches an observer for lifecycle signals.
    pub fn with_observer<O2>(self, observer: O2) -> GaRunner<'a, P, C, M, O2> {
        GaRunner {
            problem: self.problem,
            config: self.config,
            crossover: self.crossover,
            mutation: self.mutation,
            observer,
        }
    }

    /// The run configuration.
    pub fn config(&self) -> &GaConfig {
        &self.config
    }
}

impl<P, C, M, O> GaRunner<'_, P, C, M, O>
where
    P: GaProblem,
    C: CrossoverOperator<P::Individual, StdRng>,
    M: MutationOperator<P::Individual, StdRng>,
    O: GaObserver<P::Individual>,
{
    /// Runs from a population built by the problem's factory.
    pub fn run(&self) -> Result<GaResult<P::Individual>, GaError> {
        self.validate(None)?;
        self.execute(None)
    }

    /// Runs from an explicit initial population.
    ///
    /// The population size is taken from `initial`, overriding
    /// [`GaConfig::population_size`]. In island mode every island starts
    /// from its own copy of `initial`. The factory is never called.
    pub fn run_with_population(
        &self,
        initial: Vec<P::Individual>,
    ) -> Result<GaResult<P::Individual>, GaError> {
        if initial.is_empty() {
            return Err(ConfigError::EmptyInitialPopulation.into());
        }
        self.validate(Some(initial.len()))?;
        self.execute(Some(initial))
    }

    fn validate(&self, seeded_size: Option<usize>) -> Result<(), ConfigError> {
        match seeded_size {
            Some(_) => self.config.validate_rates()?,
            None => self.config.validate()?,
        }
        if self.config.crossover_enabled && self.crossover.is_none() {
            return Err(ConfigError::MissingOperator { field: "crossover" });
        }
        if self.config.mutation_enabled && self.mutation.is_none() {
            return Err(ConfigError::MissingOperator { field: "mutation" });
        }
        Ok(())
    }

    #[instrument(level = "info", skip_all, fields(selection = self.config.selection.name()))]
    fn execute(
        &self,
        seeded: Option<Vec<P::Individual>>,
    ) -> Result<GaResult<P::Individual>, GaError> {
        let config = &self.config;
        let start = Instant::now();
        let mut rng = rng_from_seed(config.seed);
        let island_count = config.islands.map_or(1, |islands| islands.island_count);

        let reproducer = Reproducer {
            crossover: self
                .crossover
                .as_ref()
                .filter(|_| config.crossover_enabled)
                .map(|op| (op, config.crossover_points)),
            mutation: self
                .mutation
                .as_ref()
                .filter(|_| config.mutation_enabled)
                .map(|op| (op, config.mutation_probability)),
        };

        // Init
        let mut islands: Vec<Vec<P::Individual>> = match seeded {
            Some(initial) => vec![initial; island_count],
            None => (0..island_count)
                .map(|_| create_population(self.problem, config.population_size, &mut rng))
                .collect::<anyhow::Result<_>>()
                .map_err(|e| self.fail(Stage::Initialization, e))?,
        };
        tracing::info!(
            population_size = islands[0].len(),
            islands = island_count,
            seed = ?config.seed,
            "initial population ready"
        );
        self.observer.on_initial_population(&islands);

        let mut generation = 0usize;
        let mut score_history = Vec::new();
        let mut best: Option<P::Individual> = None;

        loop {
            // Evaluating
            for island in islands.iter_mut() {
                evaluate_population(self.problem, island, config.parallel)
                    .map_err(|e| self.fail(Stage::Evaluation, e))?;
            }
            self.observer.on_population_evaluated(generation, &islands);

            // Sorting
            for island in islands.iter_mut() {
                sort_population(island, config.natural);
            }

            // Stats
            let stats = GenerationStats::from_islands(
                &islands,
                config.natural,
                generation,
                start.elapsed(),
            )
            .ok_or_else(|| self.fail(Stage::Stats, anyhow::anyhow!("population is empty")))?;

            tracing::debug!(
                generation,
                best = stats.best_score,
                mean = stats.mean,
                std_dev = stats.std_dev,
                "generation stats ready"
            );
            score_history.push(stats.best_score);
            let improved = match &best {
                Some(b) => is_fitter(stats.best_score, b.score(), config.natural),
                None => true,
            };
            if improved {
                best = Some(stats.best.clone());
            }
            self.observer.on_generation(&stats);

            if self.problem.should_terminate(&stats) {
                let best = best.unwrap_or_else(|| stats.best.clone());
                tracing::info!(
                    generation,
                    best_score = best.score(),
                    elapsed_ms = stats.elapsed.as_millis() as u64,
                    "run terminated"
                );
                return Ok(GaResult {
                    best_score: best.score(),
                    best,
                    generation,
                    score_history,
                    stats,
                });
            }

            // Evolving
            islands = self.evolve(islands, generation, &reproducer, &mut rng)?;
            generation += 1;
        }
    }

    /// Produces generation `generation + 1` of every island.
    ///
    /// When `generation` is a multiple of the epoch length (generation 0
    /// included) the islands exchange migrants instead of breeding. Islands breed one after another in index order, so the
    /// shared generator is consumed in a fixed order.
    fn evolve(
        &self,
        mut islands: Vec<Vec<P::Individual>>,
        generation: usize,
        reproducer: &Reproducer<'_, C, M>,
        rng: &mut StdRng,
    ) -> Result<Vec<Vec<P::Individual>>, GaError> {
        if let Some(ic) = self.config.islands {
            if generation % ic.epoch_length == 0 {
                let received = migrate(&mut islands, ic.migration_fraction, rng);
                tracing::debug!(from_generation = generation, ?received, "migration complete");
                return Ok(islands);
            }
        }

        let mut next = Vec::with_capacity(islands.len());
        for (index, island) in islands.iter().enumerate() {
            tracing::trace!(from_generation = generation, island = index, "breeding island");
            let offspring = reproducer
                .next_generation(island, &self.config, rng)
                .map_err(|e| self.fail(Stage::Reproduction, e))?;
            next.push(offspring);
        }
        Ok(next)
    }

    fn fail(&self, stage: Stage, error: anyhow::Error) -> GaError {
        tracing::error!(stage = stage.as_str(), error = %error, "evolution stage failed");
        self.observer.on_failure(stage, &error);
        GaError::stage(stage, error)
    }
}

// ============================================================================
// Tests
// ============================================================================
