//! Kernels for the spherical Gaussian `exp(-a ||x||^2)` restricted to a body.
//!
//! Along any line `x + t v` (unit `v`) the target is a 1D normal with mean `-x·v`
//! and standard deviation `1 / sqrt(2a)`, truncated to the chord, so hit-and-run
//! samples the chord exactly. The ball walk uses a Metropolis filter.

use nalgebra::DVector;
use rand::Rng;

use super::util::{random_direction, random_in_ball, truncated_normal};
use crate::error::{PolyError, Result};
use crate::polytope::ConvexBody;

/// Markov kernel for a Gaussian target of precision parameter `a` (density `exp(-a ||x||^2)`).
pub trait GaussianWalk {
    fn step<B: ConvexBody + ?Sized, R: Rng + ?Sized>(
        &self,
        body: &B,
        x: &mut DVector<f64>,
        a: f64,
        rng: &mut R,
    ) -> Result<()>;
}

fn sd_for(a: f64) -> Result<f64> {
    if a > 0.0 && a.is_finite() {
        Ok((0.5 / a).sqrt())
    } else {
        Err(PolyError::invalid("a", format!("Gaussian parameter must be positive, got {a}")))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GaussianCdhr;

#[derive(Clone, Copy, Debug, Default)]
pub struct GaussianRdhr;

#[derive(Clone, Copy, Debug)]
pub struct GaussianBallWalk {
    pub delta: f64,
}

impl GaussianBallWalk {
    pub fn for_radius(n: usize, radius: f64) -> Self {
        Self {
            delta: 4.0 * radius / (n as f64).sqrt(),
        }
    }
}

impl GaussianWalk for GaussianCdhr {
    fn step<B: ConvexBody + ?Sized, R: Rng + ?Sized>(
        &self,
        body: &B,
        x: &mut DVector<f64>,
        a: f64,
        rng: &mut R,
    ) -> Result<()> {
        let sd = sd_for(a)?;
        let j = rng.gen_range(0..body.dimension());
        let (lo, hi) = body.coordinate_intersect(x, j);
        let xj = x[j];
        // Coordinate j itself is N(0, sd^2) truncated to [xj + lo, xj + hi];
        // the Gaussian keeps unbounded chords integrable.
        x[j] = truncated_normal(0.0, sd, xj + lo, xj + hi, rng);
        Ok(())
    }
}

impl GaussianWalk for GaussianRdhr {
    fn step<B: ConvexBody + ?Sized, R: Rng + ?Sized>(
        &self,
        body: &B,
        x: &mut DVector<f64>,
        a: f64,
        rng: &mut R,
    ) -> Result<()> {
        let sd = sd_for(a)?;
        let v = random_direction(body.dimension(), rng);
        let (lo, hi) = body.line_intersect(x, &v);
        let t = truncated_normal(-x.dot(&v), sd, lo, hi, rng);
        x.axpy(t, &v, 1.0);
        Ok(())
    }
}

impl GaussianWalk for GaussianBallWalk {
    fn step<B: ConvexBody + ?Sized, R: Rng + ?Sized>(
        &self,
        body: &B,
        x: &mut DVector<f64>,
        a: f64,
        rng: &mut R,
    ) -> Result<()> {
        sd_for(a)?;
        let y = &*x + random_in_ball(body.dimension(), rng) * self.delta;
        if !body.contains(&y) {
            return Ok(());
        }
        let log_ratio = -a * (y.norm_squared() - x.norm_squared());
        if log_ratio >= 0.0 || rng.gen::<f64>().ln() < log_ratio {
            *x = y;
        }
        Ok(())
    }
}
