//! Fitness statistics and the generation logbook.
//!
//! - [`descriptive`]: per-objective summaries of a population's fitness
//!   values, ignoring non-finite entries the way failed assessments produce
//!   them
//! - [`logbook`]: one record per generation, rendered as an aligned text
//!   stream for the run log and serialized into checkpoints
//!
//! # Examples
//!
//! ```
//! use evoctl_stats::descriptive::FitnessStats;
//!
//! let stats = FitnessStats::new([3.0, 1.0, 2.0, f64::INFINITY]).unwrap();
//! assert_eq!(stats.min, 1.0);
//! assert_eq!(stats.max, 3.0);
//! assert_eq!(stats.mean, 2.0);
//! ```

pub mod descriptive;
pub mod logbook;

pub use self::{descriptive::FitnessStats, logbook::Logbook};
