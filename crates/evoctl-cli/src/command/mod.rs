use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use self::{evolve::EvolveArg, simulate::SimulateArg};

mod evolve;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Raise log verbosity; repeat for more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve control laws for a dynamical system
    Evolve(#[clap(flatten)] EvolveArg),
    /// Replay an evolved law (or the uncontrolled system) and emit the trajectory
    Simulate(#[clap(flatten)] SimulateArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_tracing(args.verbose);
    match &args.mode {
        Mode::Evolve(arg) => evolve::run(arg)?,
        Mode::Simulate(arg) => simulate::run(arg)?,
    }
    Ok(())
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evolve_defaults_parse() {
        let args = CommandArgs::try_parse_from(["evoctl", "evolve"]).unwrap();
        let Mode::Evolve(arg) = args.mode else {
            panic!("expected evolve mode");
        };
        assert_eq!(arg.pop_size, 10);
        assert_eq!(arg.num_generations, 10);
        assert_eq!(arg.checkpoint_frequency, 1);
        assert!(arg.seed.is_none());
    }

    #[test]
    fn checkpoint_file_conflicts_with_resume() {
        let result = CommandArgs::try_parse_from([
            "evoctl",
            "evolve",
            "-o",
            "run.json",
            "--resume",
            "run.json",
        ]);
        assert!(result.is_err());
        // the default -o value must not trigger the conflict
        CommandArgs::try_parse_from(["evoctl", "evolve", "--resume", "run.json"]).unwrap();
    }

    #[test]
    fn simulate_accepts_network_options() {
        let args = CommandArgs::try_parse_from([
            "evoctl",
            "simulate",
            "--system",
            "vanderpol",
            "--units",
            "6",
            "--coupling",
            "global",
        ])
        .unwrap();
        let Mode::Simulate(arg) = args.mode else {
            panic!("expected simulate mode");
        };
        assert_eq!(arg.system.units, 6);
    }
}
