//! Tolerance defaults for polytope oracles (internal).
//!
//! Policy
//! - Fixed constants, same as for the other geometry modules. Algorithm knobs
//!   that users tune live in the `*Cfg` structs of their modules instead.

/// Membership slack used by `HPolytope::contains`.
pub(crate) const FEAS_EPS: f64 = 1e-9;
/// Direction components below this are treated as parallel to a facet.
pub(crate) const PARALLEL_EPS: f64 = 1e-14;
/// Rows (or vectors) with a smaller norm are considered zero.
pub(crate) const MIN_NORM: f64 = 1e-12;
/// Relative singular-value cutoff for the equality system's rank.
pub(crate) const RANK_EPS: f64 = 1e-10;
