use evoctl_expr::generate::PrimitiveSet;
use evoctl_gp::{
    algorithm::AlgorithmKind,
    ops::{MatingKind, MutationKind, Variation},
};
use serde::{Deserialize, Serialize};

/// Complete configuration of an evolution run.
///
/// The configuration is stored in checkpoints; together with the persisted
/// state it is everything needed to resume a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Population size (mu). Zero means the run does nothing.
    pub pop_size: usize,
    /// Number of generations to evolve.
    pub num_generations: usize,
    /// Seed for the shared random stream.
    pub seed: u64,
    /// Checkpoint every n generations; zero disables checkpointing.
    pub checkpoint_frequency: usize,
    pub algorithm: AlgorithmKind,
    pub variation: Variation,
    /// Depth ramp for initial trees (ramped half-and-half).
    pub tree_min_depth: usize,
    pub tree_max_depth: usize,
}

impl EvolutionConfig {
    /// A configuration with the stock defaults for a law over `variables`
    /// state inputs.
    #[must_use]
    pub fn new(variables: usize, seed: u64) -> Self {
        Self {
            pop_size: 10,
            num_generations: 10,
            seed,
            checkpoint_frequency: 1,
            algorithm: AlgorithmKind::Nsga2,
            variation: Variation {
                pset: PrimitiveSet::new(variables),
                mating: MatingKind::CxOnePoint,
                mating_max_height: 20,
                mutation: MutationKind::MutUniform,
                mutation_max_height: 20,
                crossover_prob: 0.5,
                mutation_prob: 0.2,
            },
            tree_min_depth: 1,
            tree_max_depth: 4,
        }
    }
}
