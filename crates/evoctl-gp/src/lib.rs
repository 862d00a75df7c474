//! Evolutionary search over control-law expression trees.
//!
//! This crate implements the genetic-programming machinery that breeds
//! populations of [`evoctl_expr::Expr`] trees against multi-objective
//! (minimized) fitness vectors:
//!
//! 1. **Variation** - one-point subtree crossover and subtree/node/shrink
//!    mutations, all under static height limits ([`ops`])
//! 2. **Selection** - Pareto dominance, fast non-dominated sorting with
//!    crowding distance (NSGA-II) and strength/density selection (SPEA2)
//!    ([`select`])
//! 3. **Generational algorithms** - a mu+lambda evolve step behind
//!    [`algorithm::AlgorithmKind`]
//! 4. **Hall of fame** - a [`pareto::ParetoFront`] archive of the
//!    non-dominated individuals seen so far
//!
//! All stochastic operators draw from a caller-supplied `Rng`, so a run is
//! fully reproducible from a seed and the random stream can be checkpointed
//! by whoever owns it.
//!
//! # Evolve contract
//!
//! [`algorithm::AlgorithmKind::evolve`] consumes an assessed population of at
//! least `mu` individuals and returns `mu` survivors plus `mu` fresh (invalid,
//! unassessed) offspring. The caller assesses the offspring before the next
//! step, mirroring the init/step/assess cycle of the runner that drives it.

pub mod algorithm;
pub mod individual;
pub mod ops;
pub mod pareto;
pub mod select;

pub use self::{individual::Individual, pareto::ParetoFront};
