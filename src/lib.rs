//! Domain-agnostic evolutionary search engine.
//!
//! Drives a generational search over a population of candidate solutions
//! until a caller-supplied termination condition holds. Representation,
//! fitness, crossover and mutation are pluggable; the engine owns the rest:
//!
//! - **Population lifecycle**: factory-driven initialization, barrier
//!   evaluation, best-first sorting
//! - **Selection**: roulette wheel, stochastic universal sampling, rank,
//!   binary tournament and sigma scaling
//! - **Reproduction**: pairwise crossover, mutation and elitism
//! - **Island model**: independent sub-populations with periodic ring
//!   migration
//! - **Statistics**: per-generation aggregates feeding the stopping rule
//!
//! All randomness in a run flows through one seeded generator, so a seeded
//! run is reproducible bit for bit.
//!
//! # Architecture
//!
//! This crate sits at Layer 2 (Algorithms) in the U-Engine ecosystem. It
//! contains no domain-specific concepts; candidate encodings and their
//! operators are defined by consumers at higher layers.

pub mod ga;
pub mod random;
