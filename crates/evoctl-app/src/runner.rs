use evoctl_gp::{Individual, ParetoFront};
use evoctl_stats::Logbook;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    assess::{AssessmentRunner, assess_population},
    config::EvolutionConfig,
};

/// Runner for a genetic-programming problem.
///
/// Owns the evolutionary state and takes care of proper initialization,
/// execution, and accounting of a run: population creation, generation
/// count, hall of fame, and logbook. [`init`](Self::init) must be called
/// once before stepping through the evolution with [`step`](Self::step);
/// both invoke the assessment runner on individuals that need fitness.
///
/// After a step the population holds the `pop_size` survivors followed by
/// `pop_size` fresh offspring; the next step's environmental selection
/// reduces the pool again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpRunner {
    config: EvolutionConfig,
    population: Vec<Individual>,
    hall_of_fame: ParetoFront,
    logbook: Logbook,
    step_count: usize,
}

impl GpRunner {
    #[must_use]
    pub fn new(config: EvolutionConfig) -> Self {
        Self {
            config,
            population: Vec::new(),
            hall_of_fame: ParetoFront::new(),
            logbook: Logbook::new(),
            step_count: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    #[must_use]
    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    #[must_use]
    pub fn hall_of_fame(&self) -> &ParetoFront {
        &self.hall_of_fame
    }

    #[must_use]
    pub fn logbook(&self) -> &Logbook {
        &self.logbook
    }

    /// Generations evolved so far.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Initializes the run: fresh hall of fame and logbook, generation zero,
    /// and a ramped half-and-half population, immediately assessed.
    pub fn init<R>(&mut self, rng: &mut R, assessment: &(impl AssessmentRunner + ?Sized))
    where
        R: Rng + ?Sized,
    {
        self.hall_of_fame = ParetoFront::new();
        self.logbook = Logbook::new();
        self.step_count = 0;
        self.population = (0..self.config.pop_size)
            .map(|_| {
                Individual::new(self.config.variation.pset.ramped_half_and_half(
                    rng,
                    self.config.tree_min_depth,
                    self.config.tree_max_depth,
                ))
            })
            .collect();
        self.update(assessment);
    }

    /// Steps through one generation of the evolution process.
    pub fn step<R>(&mut self, rng: &mut R, assessment: &(impl AssessmentRunner + ?Sized))
    where
        R: Rng + ?Sized,
    {
        self.population = self.config.algorithm.evolve(
            &self.population,
            self.config.pop_size,
            &self.config.variation,
            rng,
        );
        self.step_count += 1;
        self.update(assessment);
    }

    fn update(&mut self, assessment: &(impl AssessmentRunner + ?Sized)) {
        let evaluations = assess_population(&mut self.population, assessment);
        self.hall_of_fame.update(&self.population);
        self.logbook.record(
            self.step_count,
            evaluations,
            self.population.iter().map(Individual::fitness),
        );
    }
}

#[cfg(test)]
mod tests {
    use evoctl_expr::Expr;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    struct StubAssessment;

    impl AssessmentRunner for StubAssessment {
        fn objectives(&self) -> usize {
            2
        }

        #[expect(clippy::cast_precision_loss)]
        fn assess(&self, law: &Expr) -> Vec<f64> {
            vec![law.eval(&[0.5, -0.5]).abs(), law.size() as f64]
        }
    }

    #[test]
    fn init_creates_an_assessed_population() {
        let mut runner = GpRunner::new(EvolutionConfig::new(2, 1));
        let mut rng = Pcg64Mcg::seed_from_u64(1);
        runner.init(&mut rng, &StubAssessment);
        assert_eq!(runner.population().len(), 10);
        assert!(runner.population().iter().all(Individual::is_valid));
        assert_eq!(runner.step_count(), 0);
        assert_eq!(runner.logbook().len(), 1);
        assert!(!runner.hall_of_fame().is_empty());
    }

    #[test]
    fn step_counts_generations_and_records() {
        let mut runner = GpRunner::new(EvolutionConfig::new(2, 1));
        let mut rng = Pcg64Mcg::seed_from_u64(2);
        runner.init(&mut rng, &StubAssessment);
        for expected in 1..=3 {
            runner.step(&mut rng, &StubAssessment);
            assert_eq!(runner.step_count(), expected);
            assert_eq!(runner.logbook().len(), expected + 1);
            assert_eq!(runner.population().len(), 20);
            assert!(runner.population().iter().all(Individual::is_valid));
        }
    }

    #[test]
    fn identical_seeds_give_identical_runs() {
        let mut a = GpRunner::new(EvolutionConfig::new(2, 5));
        let mut b = GpRunner::new(EvolutionConfig::new(2, 5));
        let mut rng_a = Pcg64Mcg::seed_from_u64(5);
        let mut rng_b = Pcg64Mcg::seed_from_u64(5);
        a.init(&mut rng_a, &StubAssessment);
        b.init(&mut rng_b, &StubAssessment);
        for _ in 0..3 {
            a.step(&mut rng_a, &StubAssessment);
            b.step(&mut rng_b, &StubAssessment);
        }
        assert_eq!(a, b);
    }
}
