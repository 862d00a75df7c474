use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::SeedableRng as _;
use rand_pcg::Pcg64Mcg;

use crate::{
    assess::AssessmentRunner,
    checkpoint::{Checkpoint, CheckpointError},
    runner::GpRunner,
};

/// Condition checked between evolutionary steps; returning true stops the run.
pub type BreakCondition<'a> = &'a dyn Fn(&GpRunner) -> bool;

/// An application based on [`GpRunner`].
///
/// Controls execution of the runner and adds checkpointing and logging:
/// every update streams the newest logbook record, appends the hall-of-fame
/// snapshot to the Pareto-front history, and saves a checkpoint when one is
/// due. A resumed application continues the run (and the random stream) of
/// the checkpoint it was created from.
#[derive(Debug)]
pub struct Application {
    runner: GpRunner,
    checkpoint_file: Option<PathBuf>,
    pareto_fronts: Vec<Vec<evoctl_gp::Individual>>,
    rng: Pcg64Mcg,
    initialized: bool,
}

impl Application {
    /// Creates an application for a fresh run; the random stream is seeded
    /// from the runner's configuration.
    #[must_use]
    pub fn new(runner: GpRunner, checkpoint_file: Option<PathBuf>) -> Self {
        let rng = Pcg64Mcg::seed_from_u64(runner.config().seed);
        Self {
            runner,
            checkpoint_file,
            pareto_fronts: Vec::new(),
            rng,
            initialized: false,
        }
    }

    /// Restores an application from a checkpoint file. Further checkpoints
    /// go to the same file.
    pub fn from_checkpoint(path: &Path) -> Result<Self, CheckpointError> {
        let Checkpoint {
            saved_at: _,
            runner,
            rng,
            pareto_fronts,
            initialized,
        } = Checkpoint::load(path)?;
        tracing::debug!("loaded checkpoint from {}", path.display());
        Ok(Self {
            runner,
            checkpoint_file: Some(path.to_path_buf()),
            pareto_fronts,
            rng,
            initialized,
        })
    }

    #[must_use]
    pub fn runner(&self) -> &GpRunner {
        &self.runner
    }

    /// Hall-of-fame snapshot taken after every generation.
    #[must_use]
    pub fn pareto_fronts(&self) -> &[Vec<evoctl_gp::Individual>] {
        &self.pareto_fronts
    }

    /// Runs the evolution to the configured generation count.
    ///
    /// `break_condition` is checked before every step. Returns the number of
    /// iterations (init counts as one) executed during this call; a zero
    /// population size runs nothing.
    pub fn run(
        &mut self,
        assessment: &(impl AssessmentRunner + ?Sized),
        break_condition: Option<BreakCondition<'_>>,
    ) -> Result<usize, CheckpointError> {
        let stop = |runner: &GpRunner| break_condition.is_some_and(|cond| cond(runner));
        let mut iterations = 0;
        if self.runner.config().pop_size == 0 {
            return Ok(iterations);
        }
        if !self.initialized {
            self.runner.init(&mut self.rng, assessment);
            self.initialized = true;
            self.update()?;
            iterations += 1;
        }
        while self.runner.step_count() < self.runner.config().num_generations
            && !stop(&self.runner)
        {
            self.runner.step(&mut self.rng, assessment);
            self.update()?;
            iterations += 1;
        }
        Ok(iterations)
    }

    fn update(&mut self) -> Result<(), CheckpointError> {
        if let Some(record) = self.runner.logbook().last() {
            tracing::info!("{record}");
        }
        self.pareto_fronts
            .push(self.runner.hall_of_fame().members().to_vec());
        if self.checkpoint_due() {
            self.save_checkpoint()?;
        }
        Ok(())
    }

    fn checkpoint_due(&self) -> bool {
        let frequency = self.runner.config().checkpoint_frequency;
        self.checkpoint_file.is_some()
            && frequency > 0
            && self.runner.step_count() % frequency == 0
    }

    /// Saves the current state of the evolution.
    pub fn save_checkpoint(&self) -> Result<(), CheckpointError> {
        let Some(path) = &self.checkpoint_file else {
            return Ok(());
        };
        let checkpoint = Checkpoint {
            saved_at: Utc::now(),
            runner: self.runner.clone(),
            rng: self.rng.clone(),
            pareto_fronts: self.pareto_fronts.clone(),
            initialized: self.initialized,
        };
        checkpoint.save(path)?;
        tracing::debug!("saved checkpoint to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use evoctl_expr::Expr;

    use crate::config::EvolutionConfig;

    use super::*;

    struct StubAssessment;

    impl AssessmentRunner for StubAssessment {
        fn objectives(&self) -> usize {
            2
        }

        #[expect(clippy::cast_precision_loss)]
        fn assess(&self, law: &Expr) -> Vec<f64> {
            vec![law.eval(&[0.3, -0.4]).abs(), law.size() as f64]
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("evoctl-app-{}-{name}.json", std::process::id()))
    }

    fn config(generations: usize, seed: u64) -> EvolutionConfig {
        let mut config = EvolutionConfig::new(2, seed);
        config.num_generations = generations;
        config
    }

    #[test]
    fn run_executes_init_plus_steps() {
        let mut app = Application::new(GpRunner::new(config(3, 1)), None);
        let iterations = app.run(&StubAssessment, None).unwrap();
        assert_eq!(iterations, 4);
        assert_eq!(app.runner().step_count(), 3);
        assert_eq!(app.pareto_fronts().len(), 4);
    }

    #[test]
    fn empty_population_runs_nothing() {
        let mut cfg = config(5, 1);
        cfg.pop_size = 0;
        let mut app = Application::new(GpRunner::new(cfg), None);
        assert_eq!(app.run(&StubAssessment, None).unwrap(), 0);
    }

    #[test]
    fn finished_run_does_not_iterate_again() {
        let mut app = Application::new(GpRunner::new(config(2, 1)), None);
        assert_eq!(app.run(&StubAssessment, None).unwrap(), 3);
        assert_eq!(app.run(&StubAssessment, None).unwrap(), 0);
    }

    #[test]
    fn break_condition_stops_early() {
        let mut app = Application::new(GpRunner::new(config(10, 1)), None);
        let stop: BreakCondition<'_> = &|runner| runner.step_count() >= 2;
        app.run(&StubAssessment, Some(stop)).unwrap();
        assert_eq!(app.runner().step_count(), 2);
    }

    #[test]
    fn resumed_run_matches_uninterrupted_run() {
        let path = temp_path("resume");

        // uninterrupted reference run
        let mut reference = Application::new(GpRunner::new(config(4, 42)), None);
        reference.run(&StubAssessment, None).unwrap();

        // interrupted run: stop after generation 2, checkpointing each one
        let mut first = Application::new(GpRunner::new(config(4, 42)), Some(path.clone()));
        let stop: BreakCondition<'_> = &|runner| runner.step_count() >= 2;
        first.run(&StubAssessment, Some(stop)).unwrap();
        assert_eq!(first.runner().step_count(), 2);

        let mut resumed = Application::from_checkpoint(&path).unwrap();
        resumed.run(&StubAssessment, None).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(resumed.runner(), reference.runner());
        assert_eq!(resumed.pareto_fronts(), reference.pareto_fronts());
    }
}
