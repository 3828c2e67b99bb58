//! Affine rounding: bring a polytope into well-conditioned position.
//!
//! Purpose
//! - `min_ellipsoid`: map the minimum-volume enclosing ellipsoid of walk samples to the unit ball.
//! - `max_ellipsoid` (alias `john_position`): map a large inscribed ellipsoid,
//!   built from John weights at the analytic centre, to the unit ball. Deterministic.
//! - `isotropic_position`: whiten by the sample covariance.
//!
//! Conventions
//! - Original coordinates `x`, rounded coordinates `y`, `x = T y + shift`.
//! - The rounded polytope is `{y : A T y <= b - A shift}` and
//!   `vol(P) = |det T| * vol(P_rounded)`; `round_value = |det T|`.
//! - Sampled methods repeat until one step's factor has `sqrt(lambda_max / lambda_min)`
//!   at most `condition_threshold`, composing `T <- T L`, `shift <- T_old mu + shift`.

mod isotropic;
mod max_ellipsoid;
mod min_ellipsoid;

pub(crate) use isotropic::step as isotropic_step;

use std::fmt;
use std::str::FromStr;

use nalgebra::{DMatrix, DVector};
use rand::Rng;

use crate::error::{PolyError, Result};
use crate::linalg::sqrt_condition;
use crate::polytope::HPolytope;
use crate::stats::columns;
use crate::walks::{apply_sampling, check_start, SamplingParams, WalkType};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoundingMethod {
    MinEllipsoid,
    MaxEllipsoid,
    IsotropicPosition,
}

impl RoundingMethod {
    pub const ALL: [RoundingMethod; 3] = [Self::MinEllipsoid, Self::MaxEllipsoid, Self::IsotropicPosition];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MinEllipsoid => "min_ellipsoid",
            Self::MaxEllipsoid => "max_ellipsoid",
            Self::IsotropicPosition => "isotropic_position",
        }
    }
}

impl fmt::Display for RoundingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoundingMethod {
    type Err = PolyError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("john_position") {
            return Ok(Self::MaxEllipsoid);
        }
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PolyError::unsupported("rounding method", s))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoundingCfg {
    /// Kernel used to sample for `min_ellipsoid` and `isotropic_position`.
    pub walk: WalkType,
    pub walk_len: usize,
    /// Points per round: `max(min_points, points_per_dim * n)`.
    pub points_per_dim: usize,
    pub min_points: usize,
    pub burn_in_points: usize,
    pub max_iterations: usize,
    pub condition_threshold: f64,
    pub mvee_tol: f64,
    pub mvee_max_iter: usize,
    pub newton_iter: usize,
    pub john_iter: usize,
}

impl Default for RoundingCfg {
    fn default() -> Self {
        Self {
            walk: WalkType::BilliardWalk,
            walk_len: 1,
            points_per_dim: 20,
            min_points: 400,
            burn_in_points: 20,
            max_iterations: 20,
            condition_threshold: 2.0,
            mvee_tol: 1e-6,
            mvee_max_iter: 2000,
            newton_iter: 100,
            john_iter: 500,
        }
    }
}

impl RoundingCfg {
    fn points(&self, n: usize) -> usize {
        self.min_points.max(self.points_per_dim * n)
    }
}

/// Rounded polytope plus the map back to the caller's coordinates.
#[derive(Clone, Debug)]
pub struct Rounding {
    pub polytope: HPolytope,
    pub transform: DMatrix<f64>,
    pub shift: DVector<f64>,
    /// `|det transform|`: multiply a rounded-space volume by this.
    pub round_value: f64,
}

impl Rounding {
    fn identity(poly: &HPolytope) -> Self {
        let n = poly.dimension();
        Self {
            polytope: poly.clone(),
            transform: DMatrix::identity(n, n),
            shift: DVector::zeros(n),
            round_value: 1.0,
        }
    }

    /// `x = T y + shift`.
    pub fn to_original(&self, y: &DVector<f64>) -> Result<DVector<f64>> {
        if y.len() != self.shift.len() {
            return Err(PolyError::mismatch("point length", self.shift.len(), y.len()));
        }
        Ok(&self.transform * y + &self.shift)
    }

    /// Columns of `ys` (d x N) mapped to original coordinates.
    pub fn to_original_columns(&self, ys: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        if ys.nrows() != self.shift.len() {
            return Err(PolyError::mismatch("sample rows", self.shift.len(), ys.nrows()));
        }
        let mut out = &self.transform * ys;
        for mut col in out.column_iter_mut() {
            col += &self.shift;
        }
        Ok(out)
    }

    /// `y = T^{-1} (x - shift)`.
    pub fn to_rounded(&self, x: &DVector<f64>) -> Result<DVector<f64>> {
        if x.len() != self.shift.len() {
            return Err(PolyError::mismatch("point length", self.shift.len(), x.len()));
        }
        self.transform
            .clone()
            .lu()
            .solve(&(x - &self.shift))
            .ok_or_else(|| PolyError::numerical("rounding transform is singular"))
    }

    /// Apply one more step `y_old = L y + mu`.
    fn compose(&mut self, l: &DMatrix<f64>, mu: &DVector<f64>) -> Result<()> {
        self.polytope = self.polytope.linear_transform(l, mu)?;
        self.shift += &self.transform * mu;
        self.transform = &self.transform * l;
        self.round_value = self.transform.determinant().abs();
        Ok(())
    }
}

/// Round `poly` with `method`, starting the sampler at the interior point `start`
/// with inscribed radius `radius`.
pub fn rounding<R: Rng + ?Sized>(
    poly: &HPolytope,
    method: RoundingMethod,
    start: &DVector<f64>,
    radius: f64,
    cfg: &RoundingCfg,
    rng: &mut R,
) -> Result<Rounding> {
    check_start(poly, start, radius)?;
    let mut out = Rounding::identity(poly);
    if method == RoundingMethod::MaxEllipsoid {
        let (l, mu) = max_ellipsoid::step(poly, start, cfg.newton_iter, cfg.john_iter)?;
        out.compose(&l, &mu)?;
        tracing::debug!(method = %method, round_value = out.round_value, "rounding done");
        return Ok(out);
    }

    let n = poly.dimension();
    let params = SamplingParams {
        walk_len: cfg.walk_len,
        number_of_points: cfg.points(n),
        number_of_points_to_burn: cfg.burn_in_points,
    };
    let (mut center, mut r) = (start.clone(), radius);
    for it in 0..cfg.max_iterations.max(1) {
        let samples = columns(&apply_sampling(&out.polytope, cfg.walk, &params, &center, r, rng)?);
        let (l, mu) = match method {
            RoundingMethod::MinEllipsoid => min_ellipsoid::step(&samples, cfg.mvee_tol, cfg.mvee_max_iter)?,
            _ => isotropic::step(&samples)?,
        };
        let cond = sqrt_condition(&(&l * l.transpose()));
        out.compose(&l, &mu)?;
        // `mu` is a convex combination of interior points, hence the new origin is interior.
        center = DVector::zeros(n);
        r = out.polytope.facet_distance(&center);
        if !(r > 0.0 && r.is_finite()) {
            return Err(PolyError::numerical("rounded polytope lost its interior"));
        }
        tracing::debug!(method = %method, iteration = it, cond, round_value = out.round_value, "rounding step");
        if cond <= cfg.condition_threshold {
            break;
        }
    }
    Ok(out)
}
