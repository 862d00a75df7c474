//! Fitness assessment seam and the parallel assessment helper.

use std::thread;

use evoctl_expr::Expr;
use evoctl_gp::Individual;

/// A fitness function over control laws.
///
/// Implementations must be safe to call from multiple threads; assessment of
/// a population fans out one thread per unassessed individual.
pub trait AssessmentRunner: Sync {
    /// Number of objectives in the fitness vector.
    fn objectives(&self) -> usize;

    /// Computes the (minimized) objectives for one law.
    ///
    /// Failures are reported as `f64::INFINITY` objectives, never as panics.
    fn assess(&self, law: &Expr) -> Vec<f64>;
}

/// Assesses every invalid individual in place, in parallel.
///
/// Returns the number of individuals assessed.
pub fn assess_population(
    population: &mut [Individual],
    runner: &(impl AssessmentRunner + ?Sized),
) -> usize {
    let invalid: Vec<&mut Individual> = population
        .iter_mut()
        .filter(|ind| !ind.is_valid())
        .collect();
    let count = invalid.len();
    thread::scope(|s| {
        for ind in invalid {
            s.spawn(move || {
                let fitness = runner.assess(&ind.law);
                assert_eq!(fitness.len(), runner.objectives());
                ind.set_fitness(fitness);
            });
        }
    });
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SizeAssessment;

    impl AssessmentRunner for SizeAssessment {
        fn objectives(&self) -> usize {
            2
        }

        #[expect(clippy::cast_precision_loss)]
        fn assess(&self, law: &Expr) -> Vec<f64> {
            vec![law.eval(&[1.0, 1.0]).abs(), law.size() as f64]
        }
    }

    #[test]
    fn only_invalid_individuals_are_assessed() {
        let mut population = vec![
            Individual::new(Expr::Var(0)),
            Individual::new(Expr::Const(3.0)),
        ];
        population[0].set_fitness(vec![7.0, 7.0]);
        let assessed = assess_population(&mut population, &SizeAssessment);
        assert_eq!(assessed, 1);
        assert_eq!(population[0].fitness(), [7.0, 7.0]);
        assert_eq!(population[1].fitness(), [3.0, 1.0]);
    }

    #[test]
    fn all_individuals_valid_afterwards() {
        let mut population: Vec<_> = (0..8).map(|i| Individual::new(Expr::Var(i))).collect();
        assess_population(&mut population, &SizeAssessment);
        assert!(population.iter().all(Individual::is_valid));
    }
}
