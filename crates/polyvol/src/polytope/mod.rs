//! Polytope representation (H-rep) and derived bodies.
//!
//! Purpose
//! - `HPolytope`: immutable `{x : A x <= b}` with the oracles every walk needs.
//! - `ConvexBody`: membership, chord and boundary-hit oracles; implemented for
//!   `HPolytope`, `Ball` and `BallPolytope` (`P ∩ B`).
//! - `LowDimHPolytope`: adds `Aeq x = beq` and projects onto the equality
//!   subspace, returning the basis and shift that lift samples back.
//!
//! Assumptions and conventions
//! - Half-spaces use `a_i·x <= b_i`; rows are not normalized.
//! - Membership tolerance `1e-9` on raw slacks.
//! - Affine maps act as `x = T y + shift` (rounded → original coordinates).

mod body;
pub(crate) mod cfg;
mod lowdim;
pub mod special;
mod types;

pub use body::{Ball, BallPolytope, ConvexBody};
pub use lowdim::{FullDimProjection, LowDimHPolytope};
pub use types::HPolytope;

#[cfg(test)]
mod tests;
