//! Run configuration.
//!
//! [`GaConfig`] holds every parameter of a run. It is plain data: the
//! caller-supplied operators live on [`GaRunner`](super::GaRunner), which
//! validates both together before the first generation.

use super::error::ConfigError;
use super::selection::Selection;

/// Island-model parameters.
///
/// All three fields are required together; the island model is off when
/// [`GaConfig::islands`] is `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IslandConfig {
    /// Number of islands in the ring.
    pub island_count: usize,

    /// Fraction of each island sent to its neighbour at every migration,
    /// in `[0, 1)`.
    pub migration_fraction: f64,

    /// Migration runs on every generation divisible by this value.
    pub epoch_length: usize,
}

impl IslandConfig {
    pub fn new(island_count: usize, migration_fraction: f64, epoch_length: usize) -> Self {
        Self {
            island_count,
            migration_fraction,
            epoch_length,
        }
    }

    /// Validates the island parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.island_count == 0 {
            return Err(ConfigError::InvalidIslandConfig {
                field: "island_count",
                reason: "must be greater than 0",
            });
        }
        if !(0.0..1.0).contains(&self.migration_fraction) {
            return Err(ConfigError::InvalidIslandConfig {
                field: "migration_fraction",
                reason: "must be in [0, 1)",
            });
        }
        if self.epoch_length == 0 {
            return Err(ConfigError::InvalidIslandConfig {
                field: "epoch_length",
                reason: "must be greater than 0",
            });
        }
        Ok(())
    }
}

/// Configuration for an evolutionary run.
///
/// # Defaults
///
/// ```
/// use u_evolve::ga::{GaConfig, Selection};
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert!(config.natural);
/// assert_eq!(config.selection, Selection::RouletteWheel);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_evolve::ga::{GaConfig, IslandConfig, Selection};
///
/// let config = GaConfig::default()
///     .with_population_size(60)
///     .with_natural(false)
///     .with_selection(Selection::Tournament { threshold: 0.8 })
///     .with_elite_ratio(0.05)
///     .with_mutation_probability(0.02)
///     .with_islands(IslandConfig::new(4, 0.1, 10))
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaConfig {
    /// Number of candidates in the population, or in each island.
    ///
    /// Ignored when the run starts from an explicit initial population;
    /// the size is then taken from that population.
    pub population_size: usize,

    /// `true` when higher scores are better, `false` when lower scores are
    /// better.
    pub natural: bool,

    /// Fraction of the population carried unchanged into the next
    /// generation, in `[0, 1)`.
    ///
    /// The elite count is `floor(population_size * elite_ratio)`.
    pub elite_ratio: f64,

    /// Selection strategy for building the mating pool.
    pub selection: Selection,

    /// Whether the crossover stage runs. Requires a crossover operator.
    pub crossover_enabled: bool,

    /// Number of crossover points handed to the operator. Must be positive.
    pub crossover_points: usize,

    /// Whether the mutation stage runs. Requires a mutation operator.
    pub mutation_enabled: bool,

    /// Per-element mutation probability handed to the operator, in `(0, 1]`.
    pub mutation_probability: f64,

    /// Island model parameters. `None` runs a single population.
    pub islands: Option<IslandConfig>,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,

    /// Whether to evaluate candidates in parallel using rayon.
    ///
    /// Only effective with the `parallel` cargo feature. Evaluation never
    /// touches the generator, so results are identical either way.
    pub parallel: bool,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            natural: true,
            elite_ratio: 0.0,
            selection: Selection::default(),
            crossover_enabled: true,
            crossover_points: 1,
            mutation_enabled: true,
            mutation_probability: 1.0,
            islands: None,
            seed: None,
            parallel: false,
        }
    }
}

impl GaConfig {
    /// Sets the population size (per island in island mode).
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the score convention: `true` for higher-is-better.
    pub fn with_natural(mut self, natural: bool) -> Self {
        self.natural = natural;
        self
    }

    /// Sets the elite ratio.
    pub fn with_elite_ratio(mut self, ratio: f64) -> Self {
        self.elite_ratio = ratio;
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, sel: Selection) -> Self {
        self.selection = sel;
        self
    }

    /// Enables or disables the crossover stage.
    pub fn with_crossover(mut self, enabled: bool) -> Self {
        self.crossover_enabled = enabled;
        self
    }

    /// Sets the number of crossover points.
    pub fn with_crossover_points(mut self, points: usize) -> Self {
        self.crossover_points = points;
        self
    }

    /// Enables or disables the mutation stage.
    pub fn with_mutation(mut self, enabled: bool) -> Self {
        self.mutation_enabled = enabled;
        self
    }

    /// Sets the per-element mutation probability.
    pub fn with_mutation_probability(mut self, p: f64) -> Self {
        self.mutation_probability = p;
        self
    }

    /// Enables the island model.
    pub fn with_islands(mut self, islands: IslandConfig) -> Self {
        self.islands = Some(islands);
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Number of elites for a population of `population_size` candidates.
    pub fn elite_count(&self, population_size: usize) -> usize {
        (population_size as f64 * self.elite_ratio).floor() as usize
    }

    /// Validates every field.
    ///
    /// Operator presence is checked by the runner, which is where the
    /// operators are supplied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::InvalidPopulationSize);
        }
        self.validate_rates()
    }

    /// Validates everything except the population size.
    pub(crate) fn validate_rates(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.elite_ratio) {
            return Err(ConfigError::OutOfRange {
                field: "elite_ratio",
                value: self.elite_ratio,
                expected: "[0, 1)",
            });
        }
        self.selection.validate()?;
        if self.crossover_enabled && self.crossover_points == 0 {
            return Err(ConfigError::OutOfRange {
                field: "crossover_points",
                value: 0.0,
                expected: "[1, ∞)",
            });
        }
        if self.mutation_enabled
            && !(self.mutation_probability > 0.0 && self.mutation_probability <= 1.0)
        {
            return Err(ConfigError::OutOfRange {
                field: "mutation_probability",
                value: self.mutation_probability,
                expected: "(0, 1]",
            });
        }
        if let Some(islands) = &self.islands {
            islands.validate()?;
        }
        Ok(())
    }
}
