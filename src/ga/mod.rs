//! Generational evolutionary search.
//!
//! A generic, domain-agnostic engine built on trait-based abstractions.
//! Users define their problem by implementing [`GaProblem`] (factory,
//! evaluation, termination) and supply crossover and mutation through
//! [`CrossoverOperator`] and [`MutationOperator`].
//!
//! # Core Traits
//!
//! - [`Individual`]: A candidate solution carrying its score
//! - [`GaProblem`]: Problem definition: factory, evaluator, stopping rule
//! - [`GaObserver`]: Optional lifecycle hooks
//!
//! # Key Types
//!
//! - [`GaConfig`]: Run parameters (population size, selection, elitism, islands)
//! - [`Selection`]: Roulette wheel, SUS, rank, tournament, sigma scaling
//! - [`GaRunner`]: Executes the evolutionary loop
//! - [`GaResult`]: Best candidate, stopping generation, history
//! - [`GenerationStats`]: Per-generation aggregate statistics
//!
//! # Generation Pipeline
//!
//! ```text
//! init → evaluate → sort → stats → terminate?
//!                    ↑                  │ no
//!                    └── select → crossover → mutate → + elites
//!                        (or ring migration on island epochs)
//! ```
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Whitley, Rana & Heckendorn (1998), "The Island Model Genetic Algorithm"

mod config;
mod error;
pub mod island;
pub mod population;
mod reproduction;
mod runner;
mod selection;
mod stats;
mod types;

pub use config::{GaConfig, IslandConfig};
pub use error::{ConfigError, GaError, Stage};
pub use runner::{GaResult, GaRunner};
pub use selection::{adjust_score, Selection};
pub use stats::GenerationStats;
pub use types::{
    CrossoverOperator, GaObserver, GaProblem, Individual, MutationOperator, NoopObserver, Spawn,
    Unset,
};
