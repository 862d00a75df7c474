use std::fmt;

use serde::{Deserialize, Serialize};

use crate::primitive::{BinaryOp, UnaryOp};

/// A control-law expression tree.
///
/// Leaves are state variables (`Var`) or numeric constants (`Const`); inner
/// nodes apply a primitive to their children. Nodes are addressed by preorder
/// index (the root is node 0), which is how the variation operators pick
/// crossover and mutation points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        arg: Box<Expr>,
    },
    /// State variable `y<index>`.
    Var(usize),
    Const(f64),
}

impl Expr {
    #[must_use]
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn unary(op: UnaryOp, arg: Expr) -> Self {
        Self::Unary {
            op,
            arg: Box::new(arg),
        }
    }

    /// Evaluates the expression against a state vector.
    ///
    /// Variables referring past the end of `state` read as 0.0, so a law bred
    /// for a larger system degrades instead of panicking.
    #[must_use]
    pub fn eval(&self, state: &[f64]) -> f64 {
        match self {
            Self::Binary { op, left, right } => op.apply(left.eval(state), right.eval(state)),
            Self::Unary { op, arg } => op.apply(arg.eval(state)),
            Self::Var(i) => state.get(*i).copied().unwrap_or(0.0),
            Self::Const(c) => *c,
        }
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Self::Binary { left, right, .. } => 1 + left.size() + right.size(),
            Self::Unary { arg, .. } => 1 + arg.size(),
            Self::Var(_) | Self::Const(_) => 1,
        }
    }

    /// Height of the tree; a single leaf has height 0.
    #[must_use]
    pub fn height(&self) -> usize {
        match self {
            Self::Binary { left, right, .. } => 1 + left.height().max(right.height()),
            Self::Unary { arg, .. } => 1 + arg.height(),
            Self::Var(_) | Self::Const(_) => 0,
        }
    }

    /// Returns the subtree rooted at the given preorder index.
    #[must_use]
    pub fn subtree(&self, index: usize) -> Option<&Expr> {
        if index == 0 {
            return Some(self);
        }
        let mut rest = index - 1;
        for child in self.children() {
            let size = child.size();
            if rest < size {
                return child.subtree(rest);
            }
            rest -= size;
        }
        None
    }

    /// Replaces the subtree at the given preorder index.
    ///
    /// Returns `false` (leaving `self` unchanged) if the index is out of range.
    pub fn replace_subtree(&mut self, index: usize, replacement: Expr) -> bool {
        if index == 0 {
            *self = replacement;
            return true;
        }
        let mut rest = index - 1;
        for child in self.children_mut() {
            let size = child.size();
            if rest < size {
                return child.replace_subtree(rest, replacement);
            }
            rest -= size;
        }
        false
    }

    fn children(&self) -> impl Iterator<Item = &Expr> {
        let (a, b) = match self {
            Self::Binary { left, right, .. } => (Some(&**left), Some(&**right)),
            Self::Unary { arg, .. } => (Some(&**arg), None),
            Self::Var(_) | Self::Const(_) => (None, None),
        };
        a.into_iter().chain(b)
    }

    fn children_mut(&mut self) -> impl Iterator<Item = &mut Expr> {
        let (a, b) = match self {
            Self::Binary { left, right, .. } => (Some(&mut **left), Some(&mut **right)),
            Self::Unary { arg, .. } => (Some(&mut **arg), None),
            Self::Var(_) | Self::Const(_) => (None, None),
        };
        a.into_iter().chain(b)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary { op, left, right } => write!(f, "({left} {op} {right})"),
            Self::Unary { op, arg } => write!(f, "{op}({arg})"),
            Self::Var(i) => write!(f, "y{i}"),
            Self::Const(c) => write!(f, "{c}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Expr {
        // (y0 + sin(y1)) * 2
        Expr::binary(
            BinaryOp::Mul,
            Expr::binary(
                BinaryOp::Add,
                Expr::Var(0),
                Expr::unary(UnaryOp::Sin, Expr::Var(1)),
            ),
            Expr::Const(2.0),
        )
    }

    #[test]
    fn eval_matches_hand_computation() {
        let e = sample();
        let state = [1.5, 0.0];
        assert_eq!(e.eval(&state), 3.0);
    }

    #[test]
    fn out_of_range_variable_reads_zero() {
        let e = Expr::Var(7);
        assert_eq!(e.eval(&[1.0, 2.0]), 0.0);
    }

    #[test]
    fn size_and_height() {
        let e = sample();
        assert_eq!(e.size(), 6);
        assert_eq!(e.height(), 3);
        assert_eq!(Expr::Var(0).size(), 1);
        assert_eq!(Expr::Var(0).height(), 0);
    }

    #[test]
    fn preorder_subtree_addressing() {
        let e = sample();
        // preorder: Mul, Add, y0, sin, y1, 2.0
        assert_eq!(e.subtree(0), Some(&e));
        assert_eq!(e.subtree(2), Some(&Expr::Var(0)));
        assert_eq!(e.subtree(4), Some(&Expr::Var(1)));
        assert_eq!(e.subtree(5), Some(&Expr::Const(2.0)));
        assert_eq!(e.subtree(6), None);
    }

    #[test]
    fn replace_subtree_at_index() {
        let mut e = sample();
        assert!(e.replace_subtree(3, Expr::Var(1)));
        // (y0 + y1) * 2
        assert_eq!(e.eval(&[1.0, 2.0]), 6.0);
        assert!(!e.replace_subtree(99, Expr::Const(0.0)));
    }

    #[test]
    fn display_is_infix() {
        assert_eq!(sample().to_string(), "((y0 + sin(y1)) * 2)");
    }

    #[test]
    fn serde_round_trip() {
        let e = sample();
        let json = serde_json::to_string(&e).unwrap();
        let back: Expr = serde_json::from_str(&json).unwrap();
        assert_eq!(e, back);
    }
}
