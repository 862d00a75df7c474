//! Concrete control problems bridging the evolutionary harness and the
//! simulation environments.
//!
//! A problem fixes an environment, an initial state, and a sample grid. A
//! candidate law acts as the environment's actuator; its fitness is the
//! root-mean-square distance of the trajectory from the origin together
//! with the expression size. Networks are sensed through the mean of each
//! state component across units, so a law always sees a fixed number of
//! variables regardless of the network size.

use anyhow::{Context as _, bail, ensure};
use evoctl_app::AssessmentRunner;
use evoctl_dynsys::{
    IntegrationError, IntegratorOptions, Trajectory, coupling, integrate,
    system::{
        AnharmonicOscillator, FitzHughNagumoNetwork, HarmonicOscillator, HindmarshRoseNetwork,
        Lorenz, LorenzDrive, VanDerPolNetwork,
    },
};
use evoctl_expr::Expr;
use nalgebra::DMatrix;

/// Environment selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::FromStr)]
pub(crate) enum SystemKind {
    #[display("harmonic")]
    Harmonic,
    #[display("anharmonic")]
    Anharmonic,
    #[display("lorenz")]
    Lorenz,
    #[display("vanderpol")]
    VanDerPol,
    #[display("fitzhughnagumo")]
    FitzhughNagumo,
    #[display("hindmarshrose")]
    HindmarshRose,
}

/// Which Lorenz equation the actuator drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub(crate) enum DriveKind {
    Second,
    Third,
}

/// Network topology selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub(crate) enum CouplingKind {
    Global,
    Pairwise,
    Circular,
    Grid,
    Dgm,
}

/// Environment options shared by the `evolve` and `simulate` commands.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SystemArg {
    /// Control environment
    #[arg(long, default_value = "harmonic")]
    pub system: SystemKind,
    /// Lorenz equation driven by the actuator (second or third)
    #[arg(long, default_value = "second")]
    pub lorenz_drive: DriveKind,
    /// Number of units in a network environment
    #[arg(long, default_value_t = 4)]
    pub units: usize,
    /// Coupling topology for network environments
    #[arg(long, default_value = "circular")]
    pub coupling: CouplingKind,
    /// Wrap the 2-D grid topology at its edges
    #[arg(long)]
    pub periodic: bool,
    /// Scale applied to the coupling matrix
    #[arg(long, default_value_t = 1.0)]
    pub coupling_strength: f64,
    /// Simulated time horizon
    #[arg(long, default_value_t = 10.0)]
    pub horizon: f64,
    /// Number of sample intervals over the horizon
    #[arg(long, default_value_t = 100)]
    pub samples: usize,
}

#[derive(Debug, Clone)]
enum SystemSpec {
    Harmonic,
    Anharmonic,
    Lorenz { drive: LorenzDrive },
    VanDerPol { coupling: DMatrix<f64> },
    FitzhughNagumo { coupling: DMatrix<f64> },
    HindmarshRose { coupling: DMatrix<f64> },
}

impl SystemSpec {
    /// Per-unit state components, which is also what a law senses.
    fn variables(&self) -> usize {
        match self {
            SystemSpec::Harmonic
            | SystemSpec::Anharmonic
            | SystemSpec::VanDerPol { .. }
            | SystemSpec::FitzhughNagumo { .. } => 2,
            SystemSpec::Lorenz { .. } | SystemSpec::HindmarshRose { .. } => 3,
        }
    }

    fn units(&self) -> usize {
        match self {
            SystemSpec::Harmonic | SystemSpec::Anharmonic | SystemSpec::Lorenz { .. } => 1,
            SystemSpec::VanDerPol { coupling }
            | SystemSpec::FitzhughNagumo { coupling }
            | SystemSpec::HindmarshRose { coupling } => coupling.nrows(),
        }
    }
}

/// A fully specified fitness case: environment, initial state, sample grid.
#[derive(Debug, Clone)]
pub(crate) struct ControlProblem {
    name: String,
    spec: SystemSpec,
    y0: Vec<f64>,
    times: Vec<f64>,
    options: IntegratorOptions,
}

impl ControlProblem {
    pub fn from_arg(arg: &SystemArg) -> anyhow::Result<Self> {
        ensure!(arg.horizon > 0.0, "horizon must be positive");
        ensure!(arg.samples > 0, "at least one sample interval is required");

        let spec = match arg.system {
            SystemKind::Harmonic => SystemSpec::Harmonic,
            SystemKind::Anharmonic => SystemSpec::Anharmonic,
            SystemKind::Lorenz => SystemSpec::Lorenz {
                drive: match arg.lorenz_drive {
                    DriveKind::Second => LorenzDrive::Second,
                    DriveKind::Third => LorenzDrive::Third,
                },
            },
            SystemKind::VanDerPol => SystemSpec::VanDerPol {
                coupling: build_coupling(arg)?,
            },
            SystemKind::FitzhughNagumo => SystemSpec::FitzhughNagumo {
                coupling: build_coupling(arg)?,
            },
            SystemKind::HindmarshRose => SystemSpec::HindmarshRose {
                coupling: build_coupling(arg)?,
            },
        };

        let y0 = initial_state(&spec);
        #[expect(clippy::cast_precision_loss)]
        let times = (0..=arg.samples)
            .map(|i| arg.horizon * i as f64 / arg.samples as f64)
            .collect();

        Ok(Self {
            name: arg.system.to_string(),
            spec,
            y0,
            times,
            options: IntegratorOptions::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of variables a law is evolved over.
    pub fn variables(&self) -> usize {
        self.spec.variables()
    }

    /// Integrates the environment under `law`, or uncontrolled when `None`.
    pub fn simulate(&self, law: Option<&Expr>) -> Result<Trajectory, IntegrationError> {
        let actuator = |y: &[f64]| law.map_or(0.0, |law| self.sense(law, y));
        match &self.spec {
            SystemSpec::Harmonic => integrate(
                &HarmonicOscillator::new(&actuator),
                &self.y0,
                &self.times,
                self.options,
            ),
            SystemSpec::Anharmonic => integrate(
                &AnharmonicOscillator::new(&actuator),
                &self.y0,
                &self.times,
                self.options,
            ),
            SystemSpec::Lorenz { drive } => integrate(
                &Lorenz::new(*drive, &actuator),
                &self.y0,
                &self.times,
                self.options,
            ),
            SystemSpec::VanDerPol { coupling } => integrate(
                &VanDerPolNetwork::new(coupling.clone(), &actuator),
                &self.y0,
                &self.times,
                self.options,
            ),
            SystemSpec::FitzhughNagumo { coupling } => integrate(
                &FitzHughNagumoNetwork::new(coupling.clone(), &actuator),
                &self.y0,
                &self.times,
                self.options,
            ),
            SystemSpec::HindmarshRose { coupling } => integrate(
                &HindmarshRoseNetwork::new(coupling.clone(), &actuator),
                &self.y0,
                &self.times,
                self.options,
            ),
        }
    }

    /// Evaluates `law` on the sensed state: the raw state for single-unit
    /// environments, the per-component mean across units for networks.
    fn sense(&self, law: &Expr, y: &[f64]) -> f64 {
        let units = self.spec.units();
        if units == 1 {
            return law.eval(y);
        }
        let vars = self.spec.variables();
        let mut sensed = [0.0_f64; 3];
        #[expect(clippy::cast_precision_loss)]
        for (k, slot) in sensed.iter_mut().enumerate().take(vars) {
            *slot = y[k * units..(k + 1) * units].iter().sum::<f64>() / units as f64;
        }
        law.eval(&sensed[..vars])
    }
}

impl AssessmentRunner for ControlProblem {
    fn objectives(&self) -> usize {
        2
    }

    fn assess(&self, law: &Expr) -> Vec<f64> {
        match self.simulate(Some(law)) {
            #[expect(clippy::cast_precision_loss)]
            Ok(trajectory) => vec![rms_error(&trajectory), law.size() as f64],
            Err(err) => {
                tracing::debug!("assessment of `{law}` failed: {err}");
                vec![f64::INFINITY; self.objectives()]
            }
        }
    }
}

/// Root-mean-square distance of the trajectory from the origin.
#[expect(clippy::cast_precision_loss)]
fn rms_error(trajectory: &Trajectory) -> f64 {
    let dim = trajectory.states[0].len();
    let sum: f64 = trajectory
        .states
        .iter()
        .flat_map(|y| y.iter().map(|v| v * v))
        .sum();
    (sum / (trajectory.states.len() * dim) as f64).sqrt()
}

fn build_coupling(arg: &SystemArg) -> anyhow::Result<DMatrix<f64>> {
    ensure!(arg.units > 0, "a network needs at least one unit");
    let matrix = match arg.coupling {
        CouplingKind::Global => coupling::global_coupling(arg.units),
        CouplingKind::Pairwise => {
            ensure!(
                arg.units.is_multiple_of(2),
                "pairwise coupling needs an even unit count, got {}",
                arg.units
            );
            coupling::pairwise_coupling(arg.units)
        }
        CouplingKind::Circular => coupling::circular_array_coupling(arg.units),
        CouplingKind::Grid => {
            let side = grid_side(arg.units).with_context(|| {
                format!("grid coupling needs a square unit count, got {}", arg.units)
            })?;
            coupling::grid_2d_coupling(side, side, arg.periodic)
        }
        CouplingKind::Dgm => {
            let generation = dgm_generation(arg.units).with_context(|| {
                format!(
                    "Dorogovtsev-Goltsev-Mendes graphs have (3^g + 3) / 2 units \
                     (3, 6, 15, 42, ..), got {}",
                    arg.units
                )
            })?;
            coupling::dorogovtsev_goltsev_mendes_coupling(generation)
        }
    };
    Ok(matrix * arg.coupling_strength)
}

fn grid_side(units: usize) -> anyhow::Result<usize> {
    #[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let side = (units as f64).sqrt().round() as usize;
    if side * side == units {
        Ok(side)
    } else {
        bail!("{units} is not a perfect square")
    }
}

fn dgm_generation(units: usize) -> anyhow::Result<usize> {
    // node counts per generation: 3, 6, 15, 42, .. ((3^g + 3) / 2)
    let mut nodes = 3_usize;
    for generation in 1.. {
        match nodes.cmp(&units) {
            std::cmp::Ordering::Equal => return Ok(generation),
            std::cmp::Ordering::Greater => break,
            std::cmp::Ordering::Less => nodes = 3 * nodes - 3,
        }
    }
    bail!("{units} is not a Dorogovtsev-Goltsev-Mendes size")
}

/// Deterministic, unit-staggered initial state away from the origin.
fn initial_state(spec: &SystemSpec) -> Vec<f64> {
    let units = spec.units();
    let vars = spec.variables();
    match spec {
        SystemSpec::Lorenz { .. } => vec![1.0, 1.0, 1.0],
        SystemSpec::Harmonic | SystemSpec::Anharmonic => vec![1.0, 0.0],
        _ => {
            #[expect(clippy::cast_precision_loss)]
            let base = |i: usize| (i + 1) as f64 / (units + 1) as f64;
            let mut y0 = vec![0.0; units * vars];
            for k in 0..vars {
                for i in 0..units {
                    y0[k * units + i] = base(i);
                }
            }
            y0
        }
    }
}
