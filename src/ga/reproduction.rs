//! Crossover, mutation and elite carry-over.
//!
//! One call to [`Reproducer::next_generation`] turns a sorted population into
//! its successor of the same size:
//!
//! 1. select `size - elites` parents
//! 2. crossover, pairwise over the mating pool (if enabled)
//! 3. mutation of every offspring (if enabled)
//! 4. reconcile the offspring count to `size - elites`
//! 5. append the elites unchanged

use super::config::GaConfig;
use super::types::{CrossoverOperator, Individual, MutationOperator};
use rand::Rng;

/// Operators for the two optional reproduction stages.
///
/// `None` means the stage is disabled.
pub(crate) struct Reproducer<'a, C, M> {
    pub crossover: Option<(&'a C, usize)>,
    pub mutation: Option<(&'a M, f64)>,
}

impl<C, M> Reproducer<'_, C, M> {
    /// Builds the next generation from a best-first sorted population.
    ///
    /// Fails only if an operator fails; nothing from the failed call is
    /// kept.
    pub fn next_generation<I, R>(
        &self,
        population: &[I],
        config: &GaConfig,
        rng: &mut R,
    ) -> anyhow::Result<Vec<I>>
    where
        I: Individual,
        R: Rng,
        C: CrossoverOperator<I, R>,
        M: MutationOperator<I, R>,
    {
        let size = population.len();
        let elite_count = config.elite_count(size);
        let offspring_count = size - elite_count;

        let picks = config
            .selection
            .select(population, offspring_count, config.natural, rng);
        let mut pool: Vec<I> = picks.into_iter().map(|i| population[i].clone()).collect();

        if let Some((op, points)) = self.crossover {
            pool = crossover_pool(pool, op, points, rng)?;
        }
        if let Some((op, probability)) = self.mutation {
            pool = mutate_pool(pool, op, probability, rng)?;
        }

        reconcile_size(&mut pool, population, elite_count, offspring_count);
        pool.extend_from_slice(&population[..elite_count]);
        Ok(pool)
    }
}

/// Recombines the pool two at a time. An odd last candidate passes through.
pub(crate) fn crossover_pool<I, C, R>(
    pool: Vec<I>,
    op: &C,
    points: usize,
    rng: &mut R,
) -> anyhow::Result<Vec<I>>
where
    C: CrossoverOperator<I, R>,
    R: Rng,
{
    let mut offspring = Vec::with_capacity(pool.len());
    let mut parents = pool.into_iter();
    while let Some(parent1) = parents.next() {
        match parents.next() {
            Some(parent2) => offspring.extend(op.crossover(&parent1, &parent2, points, rng)?),
            None => offspring.push(parent1),
        }
    }
    Ok(offspring)
}

/// Runs the mutation operator once over every candidate.
pub(crate) fn mutate_pool<I, M, R>(
    pool: Vec<I>,
    op: &M,
    probability: f64,
    rng: &mut R,
) -> anyhow::Result<Vec<I>>
where
    M: MutationOperator<I, R>,
    R: Rng,
{
    pool.into_iter()
        .map(|ind| op.mutate(ind, probability, rng))
        .collect()
}

/// Forces the offspring count to `target`.
///
/// Excess offspring are dropped from the tail. A shortfall is filled with
/// clones of the previous population in fitness order, starting right after
/// the elites and wrapping around the non-elite part.
fn reconcile_size<I: Clone>(pool: &mut Vec<I>, previous: &[I], elite_count: usize, target: usize) {
    if pool.len() >= target {
        pool.truncate(target);
        return;
    }
    let donors = &previous[elite_count..];
    let missing = target - pool.len();
    pool.extend(donors.iter().cycle().take(missing).cloned());
}
