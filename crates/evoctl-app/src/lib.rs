//! Orchestration of a genetic-programming run.
//!
//! This crate sequences everything around the search without implementing
//! any of it: population initialization, stochastic evolve steps, fitness
//! assessment, hall-of-fame and logbook upkeep, and checkpoint persistence.
//!
//! - [`GpRunner`] owns the evolutionary state (population, Pareto-front hall
//!   of fame, logbook, generation counter) and steps it
//! - [`Application`] drives a runner to completion: run loop with an optional
//!   break condition, periodic checkpointing, resume from a checkpoint file
//! - [`AssessmentRunner`](assess::AssessmentRunner) is the seam through which
//!   a concrete control problem supplies fitness
//!
//! A single `Pcg64Mcg` stream feeds every stochastic operator and is stored
//! in checkpoints, so a run is reproducible from its seed and a resumed run
//! continues the exact random sequence of an uninterrupted one.

pub mod assess;
pub mod checkpoint;
pub mod config;
mod application;
mod runner;

pub use self::{
    application::Application,
    assess::AssessmentRunner,
    checkpoint::{Checkpoint, CheckpointError},
    config::EvolutionConfig,
    runner::GpRunner,
};
