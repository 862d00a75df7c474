use serde::{Deserialize, Serialize};

use crate::Individual;

/// Hall of fame holding every non-dominated individual seen so far.
///
/// The archive is kept minimal: inserting an individual evicts the members
/// it dominates, and an individual dominated by (or identical to) a member
/// is not inserted. Unlike a sized hall of fame there is no capacity limit;
/// the front only holds mutually non-dominating laws.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParetoFront {
    members: Vec<Individual>,
}

impl ParetoFront {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn members(&self) -> &[Individual] {
        &self.members
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Updates the front with an assessed population.
    pub fn update(&mut self, population: &[Individual]) {
        for candidate in population {
            self.insert(candidate);
        }
    }

    fn insert(&mut self, candidate: &Individual) {
        let duplicate_or_dominated = self.members.iter().any(|m| {
            m.dominates(candidate) || (m.fitness() == candidate.fitness() && m.law == candidate.law)
        });
        if duplicate_or_dominated {
            return;
        }
        self.members.retain(|m| !candidate.dominates(m));
        self.members.push(candidate.clone());
    }
}

#[cfg(test)]
mod tests {
    use evoctl_expr::Expr;

    use super::*;

    fn ind(var: usize, fitness: &[f64]) -> Individual {
        let mut ind = Individual::new(Expr::Var(var));
        ind.set_fitness(fitness.to_vec());
        ind
    }

    #[test]
    fn dominated_members_are_evicted() {
        let mut front = ParetoFront::new();
        front.update(&[ind(0, &[2.0, 2.0])]);
        front.update(&[ind(1, &[1.0, 1.0])]);
        assert_eq!(front.len(), 1);
        assert_eq!(front.members()[0].fitness(), [1.0, 1.0]);
    }

    #[test]
    fn dominated_candidates_are_rejected() {
        let mut front = ParetoFront::new();
        front.update(&[ind(0, &[1.0, 1.0]), ind(1, &[2.0, 2.0])]);
        assert_eq!(front.len(), 1);
    }

    #[test]
    fn trade_offs_coexist() {
        let mut front = ParetoFront::new();
        front.update(&[ind(0, &[1.0, 4.0]), ind(1, &[4.0, 1.0]), ind(0, &[2.0, 2.0])]);
        assert_eq!(front.len(), 3);
    }

    #[test]
    fn exact_duplicates_are_not_stored_twice() {
        let mut front = ParetoFront::new();
        front.update(&[ind(0, &[1.0, 2.0])]);
        front.update(&[ind(0, &[1.0, 2.0])]);
        assert_eq!(front.len(), 1);
    }
}
