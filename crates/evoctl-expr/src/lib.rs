//! Expression trees representing candidate control laws.
//!
//! A control law is a scalar function `u(y0, y1, ..)` of the state of a dynamical
//! system, represented as a tree of arithmetic and transcendental primitives over
//! state variables and numeric constants. This crate provides:
//!
//! - [`Expr`] - the tree itself, with evaluation, size/height, and subtree access
//! - [`primitive`] - the operator set (protected division, bounded exponential)
//! - [`generate`] - random tree construction (grow, full, ramped half-and-half)
//!
//! Trees are plain data: they serialize with serde (checkpoints store whole
//! populations) and render as infix strings for reports.
//!
//! # Example
//!
//! ```
//! use evoctl_expr::{Expr, primitive::BinaryOp};
//!
//! // u(y) = y0 * 0.5
//! let law = Expr::binary(BinaryOp::Mul, Expr::Var(0), Expr::Const(0.5));
//! assert_eq!(law.eval(&[2.0, 0.0]), 1.0);
//! assert_eq!(law.to_string(), "(y0 * 0.5)");
//! ```

pub mod generate;
pub mod primitive;
mod tree;

pub use self::tree::Expr;
