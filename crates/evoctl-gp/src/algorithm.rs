//! Generational evolution step behind a selectable algorithm.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    Individual,
    ops::Variation,
    select::{sel_nsga2, sel_spea2, spea2_fitness, tournament_dcd},
};

/// Multi-objective search algorithm, selectable by name on the command line.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, derive_more::FromStr,
)]
pub enum AlgorithmKind {
    #[default]
    Nsga2,
    Spea2,
}

impl AlgorithmKind {
    /// Evolves one generation with a mu+lambda scheme.
    ///
    /// The input population must be assessed and hold at least `mu`
    /// individuals. Environmental selection reduces it to `mu` survivors,
    /// mating selection picks `mu` parents among them, and variation breeds
    /// `mu` offspring. The returned population is the survivors followed by
    /// the (unassessed) offspring, so the caller assesses exactly the new
    /// laws before the next step.
    #[must_use]
    pub fn evolve<R>(
        self,
        population: &[Individual],
        mu: usize,
        variation: &Variation,
        rng: &mut R,
    ) -> Vec<Individual>
    where
        R: Rng + ?Sized,
    {
        assert!(population.len() >= mu);
        assert!(population.iter().all(Individual::is_valid));
        let survivors = match self {
            Self::Nsga2 => sel_nsga2(population, mu),
            Self::Spea2 => sel_spea2(population, mu),
        };
        let parents = match self {
            Self::Nsga2 => tournament_dcd(&survivors, mu, rng),
            Self::Spea2 => spea2_tournament(&survivors, mu, rng),
        };
        let offspring = variation.breed(&parents, rng);
        let mut next = survivors;
        next.extend(offspring);
        next
    }
}

/// Binary tournament on precomputed SPEA2 fitness (lower wins).
fn spea2_tournament<R>(population: &[Individual], k: usize, rng: &mut R) -> Vec<Individual>
where
    R: Rng + ?Sized,
{
    assert!(!population.is_empty());
    let fitness = spea2_fitness(population);
    (0..k)
        .map(|_| {
            let a = rng.random_range(0..population.len());
            let b = rng.random_range(0..population.len());
            let winner = if fitness[a] <= fitness[b] { a } else { b };
            population[winner].clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use evoctl_expr::generate::PrimitiveSet;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use crate::ops::{MatingKind, MutationKind};

    use super::*;

    fn variation() -> Variation {
        Variation {
            pset: PrimitiveSet::new(2),
            mating: MatingKind::CxOnePoint,
            mating_max_height: 10,
            mutation: MutationKind::MutUniform,
            mutation_max_height: 10,
            crossover_prob: 0.5,
            mutation_prob: 0.2,
        }
    }

    fn assessed_population(rng: &mut Pcg64Mcg, n: usize) -> Vec<Individual> {
        let pset = PrimitiveSet::new(2);
        (0..n)
            .map(|i| {
                let mut ind = Individual::new(pset.ramped_half_and_half(rng, 1, 4));
                #[expect(clippy::cast_precision_loss)]
                ind.set_fitness(vec![i as f64, (n - i) as f64]);
                ind
            })
            .collect()
    }

    #[test]
    fn evolve_returns_mu_survivors_plus_mu_offspring() {
        let mut rng = Pcg64Mcg::seed_from_u64(1);
        let population = assessed_population(&mut rng, 10);
        for kind in [AlgorithmKind::Nsga2, AlgorithmKind::Spea2] {
            let next = kind.evolve(&population, 10, &variation(), &mut rng);
            assert_eq!(next.len(), 20);
            assert!(next[..10].iter().all(Individual::is_valid));
        }
    }

    #[test]
    fn evolve_shrinks_an_expanded_population_back_to_mu() {
        let mut rng = Pcg64Mcg::seed_from_u64(2);
        let population = assessed_population(&mut rng, 20);
        let next = AlgorithmKind::Nsga2.evolve(&population, 10, &variation(), &mut rng);
        assert_eq!(next.len(), 20);
    }

    #[test]
    fn evolve_is_deterministic_for_a_seed() {
        let mut rng_a = Pcg64Mcg::seed_from_u64(3);
        let mut rng_b = Pcg64Mcg::seed_from_u64(3);
        let pop_a = assessed_population(&mut rng_a, 8);
        let pop_b = assessed_population(&mut rng_b, 8);
        let next_a = AlgorithmKind::Nsga2.evolve(&pop_a, 8, &variation(), &mut rng_a);
        let next_b = AlgorithmKind::Nsga2.evolve(&pop_b, 8, &variation(), &mut rng_b);
        assert_eq!(next_a, next_b);
    }

    #[test]
    fn algorithm_names_parse() {
        assert_eq!("nsga2".parse::<AlgorithmKind>().unwrap(), AlgorithmKind::Nsga2);
        assert_eq!("spea2".parse::<AlgorithmKind>().unwrap(), AlgorithmKind::Spea2);
    }
}
