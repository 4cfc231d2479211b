//! Population construction, evaluation and ordering.

use super::types::{GaProblem, Individual, Spawn};
use rand::Rng;
use std::cmp::Ordering;

/// Returns `true` if score `a` is strictly better than score `b`.
///
/// `natural` means higher is better; otherwise lower is better.
pub(crate) fn is_fitter(a: f64, b: f64, natural: bool) -> bool {
    if natural {
        a > b
    } else {
        a < b
    }
}

/// Orders two candidates best-first under the `natural` convention.
///
/// NaN scores compare as worse than any number.
fn fitness_order(a: f64, b: f64, natural: bool) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
            if natural {
                ord.reverse()
            } else {
                ord
            }
        }
    }
}

/// Sorts a population best-first (stable).
pub fn sort_population<I: Individual>(population: &mut [I], natural: bool) {
    population.sort_by(|a, b| fitness_order(a.score(), b.score(), natural));
}

/// Fills a population of exactly `size` candidates from the problem factory.
///
/// A batch that overshoots `size` is truncated. An empty batch is treated
/// as a factory failure, as is any error the factory returns; in both cases
/// the partially built population is dropped.
pub fn create_population<P: GaProblem, R: Rng>(
    problem: &P,
    size: usize,
    rng: &mut R,
) -> anyhow::Result<Vec<P::Individual>> {
    let mut population = Vec::with_capacity(size);
    while population.len() < size {
        match problem.create_individual(population.len(), size, rng)? {
            Spawn::One(individual) => population.push(individual),
            Spawn::Batch(batch) => {
                if batch.is_empty() {
                    anyhow::bail!(
                        "factory returned an empty batch at index {}",
                        population.len()
                    );
                }
                let room = size - population.len();
                population.extend(batch.into_iter().take(room));
            }
        }
    }
    Ok(population)
}

/// Scores every candidate.
///
/// This is a barrier: it returns only once every candidate has a score,
/// or with the first error encountered.
pub fn evaluate_population<P: GaProblem>(
    problem: &P,
    population: &mut [P::Individual],
    parallel: bool,
) -> anyhow::Result<()> {
    if parallel {
        return evaluate_parallel(problem, population);
    }
    for ind in population.iter_mut() {
        let score = problem.evaluate(ind)?;
        ind.set_score(score);
    }
    Ok(())
}

#[cfg(feature = "parallel")]
fn evaluate_parallel<P: GaProblem>(
    problem: &P,
    population: &mut [P::Individual],
) -> anyhow::Result<()> {
    use rayon::prelude::*;

    population.par_iter_mut().try_for_each(|ind| {
        let score = problem.evaluate(ind)?;
        ind.set_score(score);
        Ok(())
    })
}

#[cfg(not(feature = "parallel"))]
fn evaluate_parallel<P: GaProblem>(
    problem: &P,
    population: &mut [P::Individual],
) -> anyhow::Result<()> {
    evaluate_population(problem, population, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::GenerationStats;
    use crate::random::create_rng;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    #[derive(Clone, Debug)]
    struct Num {
        value: f64,
        score: f64,
    }

    impl Individual for Num {
        fn score(&self) -> f64 {
            self.score
        }
        fn set_score(&mut self, s: f64) {
            self.score = s;
        }
    }

    /// Factory that yields batches of `batch` candidates (or single ones if 1).
    struct Batches {
        batch: usize,
        calls: AtomicUsize,
        fail_at: Option<usize>,
    }

    impl Batches {
        fn new(batch: usize) -> Self {
            Self {
                batch,
                calls: AtomicUsize::new(0),
                fail_at: None,
            }
        }
    }

    impl GaProblem for Batches {
        type Individual = Num;

        fn create_individual<R: Rng>(
            &self,
            index: usize,
            _target: usize,
            rng: &mut R,
        ) -> anyhow::Result<Spawn<Num>> {
            self.calls.fetch_add(1, AtomicOrdering::Relaxed);
            if self.fail_at == Some(index) {
                anyhow::bail!("factory broke at {index}");
            }
            let mut make = || Num {
                value: rng.random_range(0.0..10.0),
                score: f64::NAN,
            };
            if self.batch == 1 {
                Ok(Spawn::One(make()))
            } else {
                Ok(Spawn::Batch((0..self.batch).map(|_| make()).collect()))
            }
        }

        fn evaluate(&self, ind: &Num) -> anyhow::Result<f64> {
            if ind.value < 0.0 {
                anyhow::bail!("negative value");
            }
            Ok(ind.value)
        }

        fn should_terminate(&self, _stats: &GenerationStats<Num>) -> bool {
            true
        }
    }

    fn scored(scores: &[f64]) -> Vec<Num> {
        scores
            .iter()
            .map(|&s| Num { value: s, score: s })
            .collect()
    }

    #[test]
    fn test_create_single() {
        let problem = Batches::new(1);
        let mut rng = create_rng(1);
        let p = create_population(&problem, 7, &mut rng).unwrap();
        assert_eq!(p.len(), 7);
        assert_eq!(problem.calls.load(AtomicOrdering::Relaxed), 7);
    }

    #[test]
    fn test_create_batches_truncate() {
        let problem = Batches::new(3);
        let mut rng = create_rng(1);
        let p = create_population(&problem, 7, &mut rng).unwrap();
        assert_eq!(p.len(), 7);
        assert_eq!(problem.calls.load(AtomicOrdering::Relaxed), 3);
    }

    #[test]
    fn test_create_empty_batch_fails() {
        let problem = Batches::new(0);
        let mut rng = create_rng(1);
        assert!(create_population(&problem, 4, &mut rng).is_err());
    }

    #[test]
    fn test_create_failure_propagates() {
        let mut problem = Batches::new(1);
        problem.fail_at = Some(2);
        let mut rng = create_rng(1);
        let err = create_population(&problem, 5, &mut rng).unwrap_err();
        assert!(err.to_string().contains("factory broke at 2"));
    }

    #[test]
    fn test_evaluate_all() {
        let problem = Batches::new(1);
        let mut p = vec![
            Num { value: 2.0, score: f64::NAN },
            Num { value: 5.0, score: f64::NAN },
        ];
        evaluate_population(&problem, &mut p, false).unwrap();
        assert_eq!(p[0].score, 2.0);
        assert_eq!(p[1].score, 5.0);
    }

    #[test]
    fn test_evaluate_error() {
        let problem = Batches::new(1);
        let mut p = vec![Num { value: -1.0, score: 0.0 }];
        assert!(evaluate_population(&problem, &mut p, true).is_err());
    }

    #[test]
    fn test_sort_natural_descending() {
        let mut p = scored(&[1.0, 5.0, 3.0]);
        sort_population(&mut p, true);
        let s: Vec<f64> = p.iter().map(|n| n.score).collect();
        assert_eq!(s, vec![5.0, 3.0, 1.0]);
    }

    #[test]
    fn test_sort_inverted_ascending() {
        let mut p = scored(&[1.0, 5.0, 3.0]);
        sort_population(&mut p, false);
        let s: Vec<f64> = p.iter().map(|n| n.score).collect();
        assert_eq!(s, vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_sort_nan_last() {
        let mut p = scored(&[f64::NAN, 2.0, 4.0]);
        sort_population(&mut p, true);
        assert_eq!(p[0].score, 4.0);
        assert!(p[2].score.is_nan());

        let mut p = scored(&[f64::NAN, 2.0, 4.0]);
        sort_population(&mut p, false);
        assert_eq!(p[0].score, 2.0);
        assert!(p[2].score.is_nan());
    }

    #[test]
    fn test_is_fitter() {
        assert!(is_fitter(2.0, 1.0, true));
        assert!(!is_fitter(2.0, 1.0, false));
        assert!(!is_fitter(1.0, 1.0, true));
    }
}
