//! Variation operators: mating and mutation under static height limits.
//!
//! Any operator that would grow a tree past its height limit returns the
//! parent unchanged instead, so limits hold by construction and bloat stays
//! bounded without post-hoc repair.

use evoctl_expr::{
    Expr,
    generate::PrimitiveSet,
    primitive::{BinaryOp, UnaryOp},
};
use rand::{Rng, seq::IndexedRandom};
use rand_distr::{Distribution as _, Normal};
use serde::{Deserialize, Serialize};

/// Depth range for subtrees grown by uniform mutation.
const MUTATE_TREE_MIN: usize = 0;
const MUTATE_TREE_MAX: usize = 2;

/// Standard deviation of the constant jitter applied by node replacement.
const CONST_JITTER_SIGMA: f64 = 0.1;

/// Mating method, selectable by name on the command line.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, derive_more::FromStr,
)]
pub enum MatingKind {
    /// Exchange the subtrees at one random point in each parent.
    #[default]
    CxOnePoint,
}

/// Mutation method, selectable by name on the command line.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, derive_more::FromStr,
)]
pub enum MutationKind {
    /// Replace a random subtree with a freshly grown one.
    #[default]
    MutUniform,
    /// Swap a random node for another of the same arity; constants get
    /// Gaussian jitter.
    MutNodeReplacement,
    /// Replace a random function node with one of its arguments.
    MutShrink,
}

/// The full variation configuration for a run: primitive set, operator
/// choices, their height limits, and the per-individual application
/// probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variation {
    pub pset: PrimitiveSet,
    pub mating: MatingKind,
    pub mating_max_height: usize,
    pub mutation: MutationKind,
    pub mutation_max_height: usize,
    pub crossover_prob: f64,
    pub mutation_prob: f64,
}

impl Variation {
    /// Breeds offspring from parents, varAnd style: clone everyone, mate
    /// adjacent pairs with probability `crossover_prob`, then mutate each
    /// with probability `mutation_prob`. Individuals touched by either
    /// operator are invalidated.
    #[must_use]
    pub fn breed<R>(&self, parents: &[super::Individual], rng: &mut R) -> Vec<super::Individual>
    where
        R: Rng + ?Sized,
    {
        let mut offspring = parents.to_vec();
        for pair in offspring.chunks_mut(2) {
            if pair.len() == 2 && rng.random_bool(self.crossover_prob) {
                let (a, b) = pair.split_at_mut(1);
                let (left, right) =
                    cx_one_point(&a[0].law, &b[0].law, self.mating_max_height, rng);
                a[0].law = left;
                b[0].law = right;
                a[0].invalidate();
                b[0].invalidate();
            }
        }
        for child in &mut offspring {
            if rng.random_bool(self.mutation_prob) {
                child.law = self.mutate(&child.law, rng);
                child.invalidate();
            }
        }
        offspring
    }

    /// Applies the configured mutation to a single law.
    #[must_use]
    pub fn mutate<R>(&self, law: &Expr, rng: &mut R) -> Expr
    where
        R: Rng + ?Sized,
    {
        match self.mutation {
            MutationKind::MutUniform => {
                mut_uniform(law, &self.pset, self.mutation_max_height, rng)
            }
            MutationKind::MutNodeReplacement => mut_node_replacement(law, &self.pset, rng),
            MutationKind::MutShrink => mut_shrink(law, rng),
        }
    }
}

/// One-point subtree crossover.
///
/// Picks a random node in each parent and exchanges the subtrees. A child
/// exceeding `max_height` is discarded in favor of its parent.
pub fn cx_one_point<R>(a: &Expr, b: &Expr, max_height: usize, rng: &mut R) -> (Expr, Expr)
where
    R: Rng + ?Sized,
{
    let point_a = rng.random_range(0..a.size());
    let point_b = rng.random_range(0..b.size());
    let sub_a = a.subtree(point_a).unwrap().clone();
    let sub_b = b.subtree(point_b).unwrap().clone();

    let mut child_a = a.clone();
    child_a.replace_subtree(point_a, sub_b);
    let mut child_b = b.clone();
    child_b.replace_subtree(point_b, sub_a);

    let child_a = if child_a.height() <= max_height {
        child_a
    } else {
        a.clone()
    };
    let child_b = if child_b.height() <= max_height {
        child_b
    } else {
        b.clone()
    };
    (child_a, child_b)
}

/// Uniform subtree mutation: replace a random subtree with a grown one.
pub fn mut_uniform<R>(law: &Expr, pset: &PrimitiveSet, max_height: usize, rng: &mut R) -> Expr
where
    R: Rng + ?Sized,
{
    let point = rng.random_range(0..law.size());
    let replacement = pset.grow(rng, MUTATE_TREE_MIN, MUTATE_TREE_MAX);
    let mut mutant = law.clone();
    mutant.replace_subtree(point, replacement);
    if mutant.height() <= max_height {
        mutant
    } else {
        law.clone()
    }
}

/// Node replacement: swap one node for another of the same arity.
///
/// Variables become a fresh terminal, constants are jittered with Gaussian
/// noise. The tree shape is preserved, so no height check is needed.
pub fn mut_node_replacement<R>(law: &Expr, pset: &PrimitiveSet, rng: &mut R) -> Expr
where
    R: Rng + ?Sized,
{
    let point = rng.random_range(0..law.size());
    let mut mutant = law.clone();
    let replacement = match mutant.subtree(point).unwrap() {
        Expr::Binary { op: _, left, right } => Expr::Binary {
            op: *BinaryOp::ALL.choose(rng).unwrap(),
            left: left.clone(),
            right: right.clone(),
        },
        Expr::Unary { op: _, arg } => Expr::Unary {
            op: *UnaryOp::ALL.choose(rng).unwrap(),
            arg: arg.clone(),
        },
        Expr::Var(_) => {
            if pset.variables > 0 {
                Expr::Var(rng.random_range(0..pset.variables))
            } else {
                Expr::Const(0.0)
            }
        }
        Expr::Const(c) => {
            let normal = Normal::new(0.0, CONST_JITTER_SIGMA).unwrap();
            Expr::Const(c + normal.sample(rng))
        }
    };
    mutant.replace_subtree(point, replacement);
    mutant
}

/// Shrink mutation: replace a random function node with one of its arguments.
///
/// Leaves a single-leaf tree unchanged.
pub fn mut_shrink<R>(law: &Expr, rng: &mut R) -> Expr
where
    R: Rng + ?Sized,
{
    let function_points: Vec<usize> = (0..law.size())
        .filter(|&i| {
            matches!(
                law.subtree(i),
                Some(Expr::Binary { .. } | Expr::Unary { .. })
            )
        })
        .collect();
    let Some(&point) = function_points.choose(rng) else {
        return law.clone();
    };
    let replacement = match law.subtree(point).unwrap() {
        Expr::Binary { left, right, .. } => {
            if rng.random_bool(0.5) {
                (**left).clone()
            } else {
                (**right).clone()
            }
        }
        Expr::Unary { arg, .. } => (**arg).clone(),
        Expr::Var(_) | Expr::Const(_) => unreachable!(),
    };
    let mut mutant = law.clone();
    mutant.replace_subtree(point, replacement);
    mutant
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    fn pset() -> PrimitiveSet {
        PrimitiveSet::new(2)
    }

    fn deep_tree(rng: &mut Pcg64Mcg) -> Expr {
        pset().full(rng, 5)
    }

    #[test]
    fn crossover_respects_height_limit() {
        let mut rng = Pcg64Mcg::seed_from_u64(1);
        for _ in 0..100 {
            let a = deep_tree(&mut rng);
            let b = deep_tree(&mut rng);
            let (ca, cb) = cx_one_point(&a, &b, 6, &mut rng);
            assert!(ca.height() <= 6);
            assert!(cb.height() <= 6);
        }
    }

    #[test]
    fn crossover_at_limit_falls_back_to_parent() {
        let mut rng = Pcg64Mcg::seed_from_u64(2);
        let a = pset().full(&mut rng, 3);
        let b = pset().full(&mut rng, 3);
        // limit below the parents' own height: children can only be the parents
        let (ca, cb) = cx_one_point(&a, &b, 0, &mut rng);
        assert!(ca == a || ca.height() == 0);
        assert!(cb == b || cb.height() == 0);
    }

    #[test]
    fn mut_uniform_respects_height_limit() {
        let mut rng = Pcg64Mcg::seed_from_u64(3);
        for _ in 0..100 {
            let law = deep_tree(&mut rng);
            let mutant = mut_uniform(&law, &pset(), 5, &mut rng);
            assert!(mutant.height() <= 5);
        }
    }

    #[test]
    fn mut_node_replacement_preserves_shape() {
        let mut rng = Pcg64Mcg::seed_from_u64(4);
        for _ in 0..100 {
            let law = deep_tree(&mut rng);
            let mutant = mut_node_replacement(&law, &pset(), &mut rng);
            assert_eq!(mutant.size(), law.size());
            assert_eq!(mutant.height(), law.height());
        }
    }

    #[test]
    fn mut_shrink_never_grows() {
        let mut rng = Pcg64Mcg::seed_from_u64(5);
        for _ in 0..100 {
            let law = deep_tree(&mut rng);
            let mutant = mut_shrink(&law, &mut rng);
            assert!(mutant.size() < law.size());
        }
    }

    #[test]
    fn mut_shrink_leaves_leaf_unchanged() {
        let mut rng = Pcg64Mcg::seed_from_u64(6);
        let leaf = Expr::Var(0);
        assert_eq!(mut_shrink(&leaf, &mut rng), leaf);
    }

    #[test]
    fn breed_invalidates_varied_offspring() {
        let mut rng = Pcg64Mcg::seed_from_u64(7);
        let variation = Variation {
            pset: pset(),
            mating: MatingKind::CxOnePoint,
            mating_max_height: 20,
            mutation: MutationKind::MutUniform,
            mutation_max_height: 20,
            crossover_prob: 1.0,
            mutation_prob: 1.0,
        };
        let parents: Vec<_> = (0..4)
            .map(|_| {
                let mut ind = crate::Individual::new(pset().full(&mut rng, 3));
                ind.set_fitness(vec![0.0, 0.0]);
                ind
            })
            .collect();
        let offspring = variation.breed(&parents, &mut rng);
        assert_eq!(offspring.len(), parents.len());
        assert!(offspring.iter().all(|ind| !ind.is_valid()));
    }

    #[test]
    fn operator_names_parse() {
        assert_eq!(
            "cxonepoint".parse::<MatingKind>().unwrap(),
            MatingKind::CxOnePoint
        );
        assert_eq!(
            "mutuniform".parse::<MutationKind>().unwrap(),
            MutationKind::MutUniform
        );
        assert_eq!(
            "mutshrink".parse::<MutationKind>().unwrap(),
            MutationKind::MutShrink
        );
    }
}
