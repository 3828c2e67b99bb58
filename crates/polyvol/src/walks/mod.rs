//! Markov-chain kernels on H-polytopes and the uniform sampling driver.
//!
//! Purpose
//! - `Walk`: uniform kernels that only need the `ConvexBody` oracles (CDHR,
//!   RDHR, ball, billiard), so the volume schedules can run them on `P ∩ B`.
//! - `GaussianWalk`: the same directions for a target `exp(-a ||x||^2)`.
//! - `BarrierWalk`: Dikin/Vaidya/John Metropolis walks; these need `A` and `b`.
//! - `apply_sampling`: burn-in plus `number_of_points` recorded points, each
//!   separated by `walk_len` kernel steps.
//!
//! Why this design
//! - Method names are closed enums (`WalkType`, `VolumeWalk`) parsed with
//!   `FromStr`; an unknown name is rejected before any random number is drawn.
//! - Every kernel keeps the chain inside the body: rejection (ball, barrier),
//!   reflection with a short stop (billiard), or exact chord sampling (hit-and-run).
//!
//! Code cross-refs: `polytope::ConvexBody`, `linalg::{john_weights, leverage_scores}`.

mod ball;
mod barrier;
mod billiard;
mod gaussian;
mod hit_and_run;
pub(crate) mod util;

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use nalgebra::DVector;
use rand::Rng;

use crate::error::{PolyError, Result};
use crate::polytope::{ConvexBody, HPolytope};

pub use ball::BallWalk;
pub use barrier::{Barrier, BarrierWalk};
pub use billiard::BilliardWalk;
pub use gaussian::{GaussianBallWalk, GaussianCdhr, GaussianRdhr, GaussianWalk};
pub use hit_and_run::{Cdhr, Rdhr};

/// Uniform Markov kernel driven by the `ConvexBody` oracles.
pub trait Walk {
    /// Advance `x` by one kernel step; `x` stays in `body`.
    fn step<B: ConvexBody + ?Sized, R: Rng + ?Sized>(
        &self,
        body: &B,
        x: &mut DVector<f64>,
        rng: &mut R,
    ) -> Result<()>;
}

/// Sampling methods accepted by `generate_samples`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WalkType {
    Cdhr,
    Rdhr,
    BallWalk,
    BilliardWalk,
    DikinWalk,
    JohnWalk,
    VaidyaWalk,
}

impl WalkType {
    pub const ALL: [WalkType; 7] = [
        Self::Cdhr,
        Self::Rdhr,
        Self::BallWalk,
        Self::BilliardWalk,
        Self::DikinWalk,
        Self::JohnWalk,
        Self::VaidyaWalk,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cdhr => "cdhr",
            Self::Rdhr => "rdhr",
            Self::BallWalk => "ball_walk",
            Self::BilliardWalk => "billiard_walk",
            Self::DikinWalk => "dikin_walk",
            Self::JohnWalk => "john_walk",
            Self::VaidyaWalk => "vaidya_walk",
        }
    }

    /// Walks that move along chords and do not need a barrier Hessian.
    pub fn is_directional(self) -> bool {
        matches!(self, Self::Cdhr | Self::Rdhr | Self::BilliardWalk)
    }
}

impl fmt::Display for WalkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WalkType {
    type Err = PolyError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|w| w.as_str() == lower)
            .ok_or_else(|| PolyError::unsupported("walk method", s))
    }
}

/// Walks accepted by `compute_volume`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VolumeWalk {
    UniformBall,
    Cdhr,
    Rdhr,
    GaussianBall,
    GaussianCdhr,
    GaussianRdhr,
    Billiard,
}

impl VolumeWalk {
    pub const ALL: [VolumeWalk; 7] = [
        Self::UniformBall,
        Self::Cdhr,
        Self::Rdhr,
        Self::GaussianBall,
        Self::GaussianCdhr,
        Self::GaussianRdhr,
        Self::Billiard,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::UniformBall => "uniform_ball",
            Self::Cdhr => "CDHR",
            Self::Rdhr => "RDHR",
            Self::GaussianBall => "gaussian_ball",
            Self::GaussianCdhr => "gaussian_CDHR",
            Self::GaussianRdhr => "gaussian_RDHR",
            Self::Billiard => "billiard",
        }
    }

    pub fn is_gaussian(self) -> bool {
        matches!(self, Self::GaussianBall | Self::GaussianCdhr | Self::GaussianRdhr)
    }
}

impl fmt::Display for VolumeWalk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VolumeWalk {
    type Err = PolyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|w| w.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PolyError::unsupported("volume walk", s))
    }
}

/// A concrete uniform kernel chosen from a `WalkType` and an inscribed radius.
#[derive(Clone, Copy, Debug)]
pub enum Kernel {
    Cdhr(Cdhr),
    Rdhr(Rdhr),
    Ball(BallWalk),
    Billiard(BilliardWalk),
    Barrier(BarrierWalk),
}

impl Kernel {
    pub fn new(walk: WalkType, dimension: usize, radius: f64) -> Self {
        match walk {
            WalkType::Cdhr => Self::Cdhr(Cdhr),
            WalkType::Rdhr => Self::Rdhr(Rdhr),
            WalkType::BallWalk => Self::Ball(BallWalk::for_radius(dimension, radius)),
            WalkType::BilliardWalk => Self::Billiard(BilliardWalk::for_radius(dimension, radius)),
            WalkType::DikinWalk => Self::Barrier(BarrierWalk::new(Barrier::Dikin)),
            WalkType::JohnWalk => Self::Barrier(BarrierWalk::new(Barrier::John)),
            WalkType::VaidyaWalk => Self::Barrier(BarrierWalk::new(Barrier::Vaidya)),
        }
    }

    pub fn step<R: Rng + ?Sized>(&self, poly: &HPolytope, x: &mut DVector<f64>, rng: &mut R) -> Result<()> {
        match self {
            Self::Cdhr(k) => k.step(poly, x, rng),
            Self::Rdhr(k) => k.step(poly, x, rng),
            Self::Ball(k) => k.step(poly, x, rng),
            Self::Billiard(k) => k.step(poly, x, rng),
            Self::Barrier(k) => k.step(poly, x, rng),
        }
    }
}

/// Chain-length knobs shared by every sampling entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplingParams {
    /// Kernel steps between consecutive recorded points.
    pub walk_len: usize,
    pub number_of_points: usize,
    /// Points discarded before recording starts (each worth `walk_len` steps).
    pub number_of_points_to_burn: usize,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            walk_len: 1,
            number_of_points: 1000,
            number_of_points_to_burn: 0,
        }
    }
}

impl SamplingParams {
    pub fn validate(&self) -> Result<()> {
        if self.walk_len == 0 {
            return Err(PolyError::invalid("walk_len", "must be at least 1"));
        }
        Ok(())
    }
}

/// Check the chain's starting state against the polytope.
pub(crate) fn check_start(poly: &HPolytope, start: &DVector<f64>, radius: f64) -> Result<()> {
    if start.len() != poly.dimension() {
        return Err(PolyError::mismatch("start point", poly.dimension(), start.len()));
    }
    if !(radius > 0.0 && radius.is_finite()) {
        return Err(PolyError::invalid("radius", format!("must be positive and finite, got {radius}")));
    }
    if !poly.is_interior(start) {
        return Err(PolyError::invalid("start_point", "not strictly inside the polytope"));
    }
    if !crate::inner_ball::is_bounded(poly)? {
        return Err(PolyError::degenerate("polytope is unbounded; random walks need a bounded body"));
    }
    Ok(())
}

/// Run one chain: burn `number_of_points_to_burn` points, then record `number_of_points`.
pub fn apply_sampling<R: Rng + ?Sized>(
    poly: &HPolytope,
    walk: WalkType,
    params: &SamplingParams,
    start: &DVector<f64>,
    radius: f64,
    rng: &mut R,
) -> Result<Vec<DVector<f64>>> {
    params.validate()?;
    check_start(poly, start, radius)?;
    let kernel = Kernel::new(walk, poly.dimension(), radius);
    let mut x = start.clone();
    for _ in 0..params.number_of_points_to_burn * params.walk_len {
        kernel.step(poly, &mut x, rng)?;
    }
    let mut out = Vec::with_capacity(params.number_of_points);
    for _ in 0..params.number_of_points {
        for _ in 0..params.walk_len {
            kernel.step(poly, &mut x, rng)?;
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(PolyError::numerical(format!("{walk} produced a non-finite point")));
        }
        out.push(x.clone());
    }
    tracing::debug!(
        walk = %walk,
        points = out.len(),
        burn = params.number_of_points_to_burn,
        walk_len = params.walk_len,
        "sampling done"
    );
    Ok(out)
}

/// Seed from the caller, else from the wall clock.
pub fn seed_or_clock(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    })
}
