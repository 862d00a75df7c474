//! Dynamical-system environments for control experiments.
//!
//! Each environment is an ODE right-hand side with an actuator hook: a
//! caller-supplied scalar function of the full state, added to the driven
//! equation exactly where the textbook formulation puts a forcing term.
//! Plugging in an evolved control law turns any of these systems into a
//! closed-loop simulation.
//!
//! - [`system`] - the [`DynamicalSystem`](system::DynamicalSystem) seam and
//!   the oscillator/attractor/network environments
//! - [`solver`] - fixed-step RK4 and the adaptive Dormand-Prince 5(4)
//!   integrator behind [`integrate`](solver::integrate)
//! - [`coupling`] - negative graph-Laplacian coupling matrices for the
//!   network environments

pub mod coupling;
pub mod solver;
pub mod system;

pub use self::{
    solver::{IntegrationError, IntegratorOptions, Trajectory, integrate},
    system::DynamicalSystem,
};
