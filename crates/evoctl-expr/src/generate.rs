//! Random tree construction.
//!
//! Initial populations use ramped half-and-half: tree depths are spread over
//! `[min_depth, max_depth]` and each tree is built with either the `grow` or
//! the `full` method, chosen by coin flip. Subtree mutation reuses `grow` with
//! a small depth range.

use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{
    Expr,
    primitive::{BinaryOp, UnaryOp},
};

/// Terminal and function set available to generated trees.
///
/// The variable count is fixed per problem (the dimension of the sensor
/// output); constants are ephemeral, sampled uniformly at generation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveSet {
    /// Number of state variables `y0..y{n-1}` visible to the law.
    pub variables: usize,
    /// Inclusive range for ephemeral constants.
    pub constant_range: (f64, f64),
}

impl PrimitiveSet {
    #[must_use]
    pub fn new(variables: usize) -> Self {
        assert!(variables > 0, "a control law needs at least one input");
        Self {
            variables,
            constant_range: (-1.0, 1.0),
        }
    }

    fn random_terminal<R>(&self, rng: &mut R) -> Expr
    where
        R: Rng + ?Sized,
    {
        // one extra slot for an ephemeral constant
        let choice = rng.random_range(0..=self.variables);
        if choice < self.variables {
            Expr::Var(choice)
        } else {
            let (lo, hi) = self.constant_range;
            Expr::Const(rng.random_range(lo..=hi))
        }
    }

    fn random_function<R>(&self, rng: &mut R, build: impl Fn(&mut R, &Self) -> Expr) -> Expr
    where
        R: Rng + ?Sized,
    {
        // binary and unary primitives weighted by count
        let n_binary = BinaryOp::ALL.len();
        if rng.random_range(0..n_binary + UnaryOp::ALL.len()) < n_binary {
            let op = *BinaryOp::ALL.choose(rng).unwrap();
            Expr::binary(op, build(rng, self), build(rng, self))
        } else {
            let op = *UnaryOp::ALL.choose(rng).unwrap();
            Expr::unary(op, build(rng, self))
        }
    }

    /// Builds a tree with the `grow` method: interior nodes may terminate
    /// early, so the result has height at most `max_depth`.
    pub fn grow<R>(&self, rng: &mut R, min_depth: usize, max_depth: usize) -> Expr
    where
        R: Rng + ?Sized,
    {
        assert!(min_depth <= max_depth);
        if max_depth == 0 || (min_depth == 0 && rng.random_bool(0.3)) {
            return self.random_terminal(rng);
        }
        self.random_function(rng, |rng, pset| {
            pset.grow(rng, min_depth.saturating_sub(1), max_depth - 1)
        })
    }

    /// Builds a tree with the `full` method: every branch reaches exactly
    /// `depth`.
    pub fn full<R>(&self, rng: &mut R, depth: usize) -> Expr
    where
        R: Rng + ?Sized,
    {
        if depth == 0 {
            return self.random_terminal(rng);
        }
        self.random_function(rng, |rng, pset| pset.full(rng, depth - 1))
    }

    /// Builds a tree with ramped half-and-half: uniform depth in
    /// `[min_depth, max_depth]`, then `grow` or `full` by coin flip.
    pub fn ramped_half_and_half<R>(&self, rng: &mut R, min_depth: usize, max_depth: usize) -> Expr
    where
        R: Rng + ?Sized,
    {
        assert!(min_depth <= max_depth);
        let depth = rng.random_range(min_depth..=max_depth);
        if rng.random_bool(0.5) {
            self.full(rng, depth)
        } else {
            self.grow(rng, min_depth.min(depth), depth)
        }
    }
}
