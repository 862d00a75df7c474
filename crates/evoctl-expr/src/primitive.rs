//! Operator set for control-law expressions.
//!
//! Every primitive is total over `f64`: division is protected against
//! near-zero denominators and the exponential is clamped so a single node
//! can never turn a finite input into an infinity. Divergence of a whole
//! trajectory is detected by the integrator instead.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Denominators smaller than this are treated as zero by protected division.
pub const DIV_EPSILON: f64 = 1e-9;

/// Arguments to `exp` are clamped to this value.
pub const EXP_ARG_MAX: f64 = 50.0;

/// Two-argument primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    /// Protected division: returns 1.0 when the denominator is near zero.
    Div,
}

impl BinaryOp {
    /// All binary primitives, in the order used by random generation.
    pub const ALL: [Self; 4] = [Self::Add, Self::Sub, Self::Mul, Self::Div];

    #[must_use]
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
            Self::Div => {
                if b.abs() < DIV_EPSILON {
                    1.0
                } else {
                    a / b
                }
            }
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One-argument primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Sin,
    Cos,
    /// Bounded exponential: the argument is clamped to [`EXP_ARG_MAX`].
    Exp,
}

impl UnaryOp {
    /// All unary primitives, in the order used by random generation.
    pub const ALL: [Self; 4] = [Self::Neg, Self::Sin, Self::Cos, Self::Exp];

    #[must_use]
    pub fn apply(self, a: f64) -> f64 {
        match self {
            Self::Neg => -a,
            Self::Sin => a.sin(),
            Self::Cos => a.cos(),
            Self::Exp => a.min(EXP_ARG_MAX).exp(),
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Neg => "neg",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Exp => "exp",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
