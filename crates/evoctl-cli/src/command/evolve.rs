use std::path::PathBuf;

use anyhow::{Context as _, ensure};
use evoctl_app::{Application, EvolutionConfig, GpRunner};
use evoctl_gp::{
    algorithm::AlgorithmKind,
    ops::{MatingKind, MutationKind},
};
use rand::Rng as _;

use crate::{
    model::ControlLawModel,
    problem::{ControlProblem, SystemArg},
    util::Output,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvolveArg {
    #[command(flatten)]
    pub system: SystemArg,
    /// Initial population size
    #[arg(short, long, default_value_t = 10)]
    pub pop_size: usize,
    /// Number of generations to evolve
    #[arg(short, long, default_value_t = 10)]
    pub num_generations: usize,
    /// Seed for the random stream (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,
    /// Do checkpointing every n generations
    #[arg(short = 'f', long, default_value_t = 1)]
    pub checkpoint_frequency: usize,
    /// The gp algorithm
    #[arg(long, default_value = "nsga2")]
    pub algorithm: AlgorithmKind,
    /// Crossover probability for mating
    #[arg(long, default_value_t = 0.5)]
    pub cxpb: f64,
    /// Mutation probability
    #[arg(long, default_value_t = 0.2)]
    pub mutpb: f64,
    /// Tournament size for mating selection
    #[arg(long, default_value_t = 2)]
    pub tournament_size: usize,
    /// The mating method
    #[arg(long, default_value = "cxonepoint")]
    pub mating: MatingKind,
    /// Height limit for trees produced by mating
    #[arg(long, default_value_t = 20)]
    pub mating_max_height: usize,
    /// The mutation method
    #[arg(long, default_value = "mutuniform")]
    pub mutation: MutationKind,
    /// Height limit for trees produced by mutation
    #[arg(long, default_value_t = 20)]
    pub mutation_max_height: usize,
    /// Checkpoint to FILE
    #[arg(short = 'o', value_name = "FILE", default_value = "./checkpoint.json")]
    pub checkpoint_file: PathBuf,
    /// Resume from checkpoint FILE
    #[arg(long, value_name = "FILE", conflicts_with = "checkpoint_file")]
    pub resume: Option<PathBuf>,
    /// Write the champion front as JSON to FILE (default: stdout)
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &EvolveArg) -> anyhow::Result<()> {
    ensure!(
        (0.0..=1.0).contains(&arg.cxpb) && (0.0..=1.0).contains(&arg.mutpb),
        "--cxpb and --mutpb must lie in [0, 1]"
    );
    let problem = ControlProblem::from_arg(&arg.system)?;

    let mut app = match &arg.resume {
        Some(path) => {
            let app = Application::from_checkpoint(path)
                .with_context(|| format!("Failed to resume from {}", path.display()))?;
            ensure!(
                app.runner().config().variation.pset.variables == problem.variables(),
                "checkpoint was recorded for a {}-variable environment, \
                 but {} senses {} variables",
                app.runner().config().variation.pset.variables,
                problem.name(),
                problem.variables(),
            );
            app
        }
        None => {
            let config = build_config(arg, problem.variables());
            tracing::info!("evolving {} with seed {}", problem.name(), config.seed);
            Application::new(GpRunner::new(config), Some(arg.checkpoint_file.clone()))
        }
    };

    let iterations = app.run(&problem, None)?;
    tracing::info!(
        "finished after {iterations} iterations, front holds {} laws",
        app.runner().hall_of_fame().members().len()
    );

    let model = ControlLawModel::from_runner(problem.name(), app.runner());
    Output::save_json(&model, arg.output.clone())
}

fn build_config(arg: &EvolveArg, variables: usize) -> EvolutionConfig {
    if arg.tournament_size != 2 {
        tracing::warn!(
            "only binary crowded tournaments are implemented, ignoring --tournament-size {}",
            arg.tournament_size
        );
    }
    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    let mut config = EvolutionConfig::new(variables, seed);
    config.pop_size = arg.pop_size;
    config.num_generations = arg.num_generations;
    config.checkpoint_frequency = arg.checkpoint_frequency;
    config.algorithm = arg.algorithm;
    config.variation.mating = arg.mating;
    config.variation.mating_max_height = arg.mating_max_height;
    config.variation.mutation = arg.mutation;
    config.variation.mutation_max_height = arg.mutation_max_height;
    config.variation.crossover_prob = arg.cxpb;
    config.variation.mutation_prob = arg.mutpb;
    config
}
