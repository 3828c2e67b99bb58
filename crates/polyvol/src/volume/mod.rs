//! Randomized volume estimation by telescoping products of ratios.
//!
//! Purpose
//! - `sequence_of_balls`: fixed radii `r0 * 2^{i/n}` between the inscribed ball
//!   and an enclosing radius; each ratio `vol(P ∩ B_{i-1}) / vol(P ∩ B_i)` comes
//!   from the fraction of walk points of `P ∩ B_i` that fall in `B_{i-1}`.
//! - `cooling_balls`: same estimator with radii chosen from quantiles of
//!   sample norms, so every ratio stays bounded away from zero.
//! - `cooling_gaussian`: anneals `exp(-a ||x||^2)` from a concentrated Gaussian
//!   (integral known in closed form) down to `a = 0` (the uniform measure).
//!
//! Conventions
//! - The polytope is first translated so that the inner-ball centre is the
//!   origin; `B(0, r0) ⊂ P` anchors every schedule.
//! - `epsilon` is split evenly in quadrature: each of the `m` ratios is sampled
//!   until its relative standard error is at most `epsilon / (z sqrt(m))`, with
//!   `z = cfg.confidence`. Standard errors use the chain's effective sample size
//!   (`stats::ess`), not the raw point count, so walk correlation is accounted for.
//! - Products are accumulated in log space.
//!
//! References
//! - Lovász, Simonovits (1993); Cousins, Vempala (2015) "Bypassing KLS";
//!   Chalkis, Emiris, Fisikopoulos (2019) "Practical volume estimation by a new annealing schedule".

mod balls;
mod cooling_balls;
mod cooling_gaussian;

use std::fmt;
use std::str::FromStr;

use nalgebra::DVector;
use rand::Rng;

use crate::error::{PolyError, Result};
use crate::inner_ball::InnerBall;
use crate::polytope::{ConvexBody, HPolytope};
use crate::stats;
use crate::walks::{
    BallWalk, BilliardWalk, Cdhr, GaussianBallWalk, GaussianCdhr, GaussianRdhr, GaussianWalk,
    Rdhr, Walk,
};

pub use crate::walks::VolumeWalk;

/// Volume algorithms accepted by `compute_volume`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VolumeMethod {
    SequenceOfBalls,
    CoolingGaussian,
    CoolingBalls,
}

impl VolumeMethod {
    pub const ALL: [VolumeMethod; 3] = [
        Self::SequenceOfBalls,
        Self::CoolingGaussian,
        Self::CoolingBalls,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SequenceOfBalls => "sequence_of_balls",
            Self::CoolingGaussian => "cooling_gaussian",
            Self::CoolingBalls => "cooling_balls",
        }
    }

    /// Whether `walk` can drive this algorithm.
    pub fn supports(self, walk: VolumeWalk) -> bool {
        match self {
            Self::SequenceOfBalls | Self::CoolingBalls => !walk.is_gaussian(),
            Self::CoolingGaussian => walk.is_gaussian(),
        }
    }
}

impl fmt::Display for VolumeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VolumeMethod {
    type Err = PolyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PolyError::unsupported("volume method", s))
    }
}

/// Sample-size and schedule knobs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumeCfg {
    /// Lower bound on recorded points per ratio.
    pub min_points_per_ratio: usize,
    /// Hard cap per ratio; reaching it logs a warning and keeps the estimate.
    pub max_points_per_ratio: usize,
    /// Stopping rule is re-evaluated once the point count has grown by this factor.
    pub check_growth: f64,
    /// Standard errors per `epsilon`: the final estimate is within `epsilon` at
    /// roughly this many sigmas.
    pub confidence: f64,
    /// Points (each `walk_len` steps) discarded at the start of every phase.
    pub burn_in_points: usize,
    /// Points used to place radii or Gaussian parameters.
    pub schedule_points: usize,
    /// Enclosing radius = `radius_margin * max sample norm`.
    pub radius_margin: f64,
    /// Cooling balls: next radius is this quantile of the current sample norms.
    pub ball_ratio_quantile: f64,
    /// Cooling balls: stop once this fraction of samples lies in `B(0, r0)`.
    pub ball_stop_fraction: f64,
    /// Cooling Gaussians: bound on the relative variance `E[w^2]/E[w]^2 - 1`.
    pub gaussian_var_bound: f64,
    /// Cooling Gaussians: mass of the first Gaussian allowed outside `B(0, r0)`.
    pub gaussian_delta: f64,
    pub max_phases: usize,
}

impl Default for VolumeCfg {
    fn default() -> Self {
        Self {
            min_points_per_ratio: 1000,
            max_points_per_ratio: 200_000,
            check_growth: 1.25,
            confidence: 2.5,
            burn_in_points: 50,
            schedule_points: 1500,
            radius_margin: 1.05,
            ball_ratio_quantile: 0.5,
            ball_stop_fraction: 0.1,
            gaussian_var_bound: 1.0,
            gaussian_delta: 0.01,
            max_phases: 200,
        }
    }
}

impl VolumeCfg {
    pub fn validate(&self) -> Result<()> {
        if self.schedule_points == 0 || self.min_points_per_ratio == 0 {
            return Err(PolyError::invalid("volume cfg", "point counts must be positive"));
        }
        if self.max_points_per_ratio < self.min_points_per_ratio {
            return Err(PolyError::invalid(
                "volume cfg",
                "max_points_per_ratio is below min_points_per_ratio",
            ));
        }
        if !(self.check_growth > 1.0) || !(self.confidence > 0.0) {
            return Err(PolyError::invalid(
                "volume cfg",
                "check_growth must exceed 1 and confidence must be positive",
            ));
        }
        if !(self.ball_ratio_quantile > 0.0 && self.ball_ratio_quantile < 1.0) {
            return Err(PolyError::invalid("volume cfg", "ball_ratio_quantile must lie in (0, 1)"));
        }
        if !(self.gaussian_delta > 0.0 && self.gaussian_delta < 1.0) || self.gaussian_var_bound <= 0.0 {
            return Err(PolyError::invalid("volume cfg", "gaussian knobs out of range"));
        }
        Ok(())
    }
}

/// Estimate `vol(poly)` with `method` driven by `walk`.
///
/// `ball` must be an inscribed ball of `poly` (any supplier). The combination of
/// method and walk is validated before any sampling.
#[allow(clippy::too_many_arguments)]
pub fn compute_volume<R: Rng + ?Sized>(
    poly: &HPolytope,
    method: VolumeMethod,
    walk: VolumeWalk,
    walk_len: usize,
    epsilon: f64,
    ball: &InnerBall,
    cfg: &VolumeCfg,
    rng: &mut R,
) -> Result<f64> {
    check_request(method, walk, walk_len, epsilon, cfg)?;
    crate::walks::check_start(poly, &ball.center, ball.radius)?;
    let q = poly.shifted(&ball.center)?;
    let ctx = Ctx {
        poly: &q,
        walk,
        walk_len,
        epsilon,
        r0: ball.radius,
        cfg,
    };
    let log_vol = match method {
        VolumeMethod::SequenceOfBalls => balls::sequence_of_balls(&ctx, rng)?,
        VolumeMethod::CoolingBalls => cooling_balls::cooling_balls(&ctx, rng)?,
        VolumeMethod::CoolingGaussian => cooling_gaussian::cooling_gaussian(&ctx, rng)?,
    };
    let vol = log_vol.exp();
    if !vol.is_finite() || vol <= 0.0 {
        return Err(PolyError::numerical(format!("volume estimate is {vol}")));
    }
    tracing::debug!(method = %method, walk = %walk, volume = vol, "volume estimate");
    Ok(vol)
}

/// Argument checks that need no geometry: the method/walk pairing, `epsilon`,
/// `walk_len` and the knobs in `cfg`.
pub fn check_request(
    method: VolumeMethod,
    walk: VolumeWalk,
    walk_len: usize,
    epsilon: f64,
    cfg: &VolumeCfg,
) -> Result<()> {
    if !method.supports(walk) {
        return Err(PolyError::unsupported(
            "volume walk",
            format!("{walk} for {method}"),
        ));
    }
    if !(epsilon > 0.0 && epsilon < 1.0) {
        return Err(PolyError::invalid("epsilon", format!("must lie in (0, 1), got {epsilon}")));
    }
    if walk_len == 0 {
        return Err(PolyError::invalid("walk_len", "must be at least 1"));
    }
    cfg.validate()
}

/// Per-call context shared by the three schedules; `poly` is centred at the inner ball.
pub(crate) struct Ctx<'a> {
    pub poly: &'a HPolytope,
    pub walk: VolumeWalk,
    pub walk_len: usize,
    pub epsilon: f64,
    pub r0: f64,
    pub cfg: &'a VolumeCfg,
}

impl Ctx<'_> {
    fn dim(&self) -> usize {
        self.poly.dimension()
    }

    /// Uniform kernel for a body of outer radius `outer`.
    fn uniform_kernel(&self, outer: f64) -> UniformKernel {
        let n = self.dim();
        match self.walk {
            VolumeWalk::Cdhr => UniformKernel::Cdhr(Cdhr),
            VolumeWalk::Rdhr => UniformKernel::Rdhr(Rdhr),
            VolumeWalk::Billiard => {
                let mut k = BilliardWalk::for_radius(n, self.r0);
                k.trajectory_len = k.trajectory_len.min(2.0 * outer);
                UniformKernel::Billiard(k)
            }
            _ => UniformKernel::Ball(BallWalk::for_radius(n, self.r0)),
        }
    }

    /// Gaussian kernel for parameter `a`.
    fn gaussian_kernel(&self, a: f64) -> GaussianKernel {
        match self.walk {
            VolumeWalk::GaussianCdhr => GaussianKernel::Cdhr(GaussianCdhr),
            VolumeWalk::GaussianRdhr => GaussianKernel::Rdhr(GaussianRdhr),
            _ => {
                let n = self.dim();
                let sd = if a > 0.0 { (0.5 / a).sqrt() } else { f64::INFINITY };
                let base = GaussianBallWalk::for_radius(n, self.r0);
                GaussianKernel::Ball(GaussianBallWalk {
                    delta: base.delta.min(2.0 * sd),
                })
            }
        }
    }

    /// Per-ratio relative standard error target for `m` ratios.
    fn ratio_tolerance(&self, m: usize) -> f64 {
        self.epsilon / (self.cfg.confidence * (m.max(1) as f64).sqrt())
    }

    /// Point count at which the stopping rule is next evaluated.
    fn next_check(&self, total: usize) -> usize {
        ((total as f64 * self.cfg.check_growth).ceil() as usize).max(total + 1)
    }
}

/// Relative standard error of the mean of a nonnegative chain output series,
/// `sqrt(var / mean^2 / ess)`. Infinite while the mean is zero.
pub(crate) fn relative_standard_error(series: &[f64]) -> f64 {
    let k = series.len() as f64;
    let mean = series.iter().sum::<f64>() / k;
    if !(mean > 0.0) {
        return f64::INFINITY;
    }
    let var = series.iter().map(|w| (w - mean).powi(2)).sum::<f64>() / k;
    let ess = stats::ess(series).max(1.0);
    (var / (mean * mean) / ess).sqrt()
}

#[derive(Clone, Copy, Debug)]
enum UniformKernel {
    Ball(BallWalk),
    Cdhr(Cdhr),
    Rdhr(Rdhr),
    Billiard(BilliardWalk),
}

impl Walk for UniformKernel {
    fn step<B: ConvexBody + ?Sized, R: Rng + ?Sized>(
        &self,
        body: &B,
        x: &mut DVector<f64>,
        rng: &mut R,
    ) -> Result<()> {
        match self {
            Self::Ball(k) => k.step(body, x, rng),
            Self::Cdhr(k) => k.step(body, x, rng),
            Self::Rdhr(k) => k.step(body, x, rng),
            Self::Billiard(k) => k.step(body, x, rng),
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum GaussianKernel {
    Ball(GaussianBallWalk),
    Cdhr(GaussianCdhr),
    Rdhr(GaussianRdhr),
}

impl GaussianWalk for GaussianKernel {
    fn step<B: ConvexBody + ?Sized, R: Rng + ?Sized>(
        &self,
        body: &B,
        x: &mut DVector<f64>,
        a: f64,
        rng: &mut R,
    ) -> Result<()> {
        match self {
            Self::Ball(k) => k.step(body, x, a, rng),
            Self::Cdhr(k) => k.step(body, x, a, rng),
            Self::Rdhr(k) => k.step(body, x, a, rng),
        }
    }
}

#[cfg(test)]
mod tests;
