use std::path::PathBuf;

use anyhow::Context as _;
use evoctl_app::Checkpoint;
use evoctl_expr::Expr;

use crate::{
    problem::{ControlProblem, SystemArg},
    util::Output,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    #[command(flatten)]
    pub system: SystemArg,
    /// Checkpoint holding evolved laws; simulate uncontrolled when omitted
    #[arg(long, value_name = "FILE")]
    pub checkpoint: Option<PathBuf>,
    /// Index into the champion front of the checkpoint
    #[arg(long, default_value_t = 0)]
    pub law: usize,
    /// Write the trajectory as JSON to FILE (default: stdout)
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let problem = ControlProblem::from_arg(&arg.system)?;
    let law = match &arg.checkpoint {
        Some(path) => Some(load_law(path, arg.law)?),
        None => None,
    };

    match &law {
        Some(law) => tracing::info!("simulating {} under u = {law}", problem.name()),
        None => tracing::info!("simulating uncontrolled {}", problem.name()),
    }

    let trajectory = problem
        .simulate(law.as_ref())
        .with_context(|| format!("Failed to integrate {}", problem.name()))?;
    Output::save_json(&trajectory, arg.output.clone())
}

fn load_law(path: &std::path::Path, index: usize) -> anyhow::Result<Expr> {
    let checkpoint = Checkpoint::load(path)
        .with_context(|| format!("Failed to load checkpoint {}", path.display()))?;
    let front = checkpoint.runner.hall_of_fame().members();
    let individual = front.get(index).with_context(|| {
        format!(
            "No law {index} in the champion front of {} ({} laws)",
            path.display(),
            front.len()
        )
    })?;
    Ok(individual.law.clone())
}
