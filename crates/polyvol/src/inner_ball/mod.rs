//! Interior point plus inscribed radius ("inner ball") suppliers.
//!
//! Purpose
//! - Every walk starts from an interior point and scales its steps by an
//!   inscribed radius; MMCS needs a fresh pair after each rounding phase.
//! - `LpInnerBall` solves the Chebyshev-centre LP exactly (dense simplex).
//! - `GeometricInnerBall` avoids LP machinery: it maximizes a smoothed minimum
//!   of the normalized slacks and reports the exact minimum slack at the result.
//!
//! Both return `DegenerateSystem` when the body is empty, has no interior, or
//! admits arbitrarily large inscribed balls.

mod geometric;
mod lp;

use std::str::FromStr;

use nalgebra::DVector;

use crate::error::{PolyError, Result};
use crate::polytope::HPolytope;

pub use geometric::GeometricInnerBall;
pub use lp::LpInnerBall;
pub(crate) use lp::is_bounded;

/// Ball `B(center, radius)` contained in a polytope.
#[derive(Clone, Debug, PartialEq)]
pub struct InnerBall {
    pub center: DVector<f64>,
    pub radius: f64,
}

/// Pluggable supplier of an inscribed ball.
pub trait InnerBallSolver: Send + Sync {
    fn inner_ball(&self, poly: &HPolytope) -> Result<InnerBall>;

    fn name(&self) -> &'static str;
}

/// Selects the supplier: `Fast` is LP-backed, `Slow` is pure geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum InnerBallKind {
    #[default]
    Fast,
    Slow,
}

impl InnerBallKind {
    pub fn from_fast_mode(fast_mode: bool) -> Self {
        if fast_mode {
            Self::Fast
        } else {
            Self::Slow
        }
    }

    pub fn solver(self) -> Box<dyn InnerBallSolver> {
        match self {
            Self::Fast => Box::new(LpInnerBall::default()),
            Self::Slow => Box::new(GeometricInnerBall::default()),
        }
    }

    /// Convenience: run the selected supplier once.
    pub fn inner_ball(self, poly: &HPolytope) -> Result<InnerBall> {
        let solver = self.solver();
        let ball = solver.inner_ball(poly)?;
        tracing::debug!(solver = solver.name(), radius = ball.radius, "inner ball");
        Ok(ball)
    }
}

impl FromStr for InnerBallKind {
    type Err = PolyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fast" | "lp" => Ok(Self::Fast),
            "slow" | "geometric" => Ok(Self::Slow),
            _ => Err(PolyError::unsupported("inner ball solver", s)),
        }
    }
}

/// Shared post-check: finite centre strictly inside with a positive radius.
fn validate(poly: &HPolytope, ball: InnerBall) -> Result<InnerBall> {
    if ball.center.len() != poly.dimension() {
        return Err(PolyError::mismatch(
            "inner ball center",
            poly.dimension(),
            ball.center.len(),
        ));
    }
    if !ball.radius.is_finite() || ball.center.iter().any(|v| !v.is_finite()) {
        return Err(PolyError::degenerate("inscribed ball is unbounded"));
    }
    if ball.radius <= 0.0 {
        return Err(PolyError::degenerate("polytope has an empty interior"));
    }
    Ok(ball)
}

#[cfg(test)]
mod tests;
