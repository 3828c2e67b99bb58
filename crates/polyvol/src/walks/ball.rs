//! Ball walk: propose a uniform point of `B(x, delta)`, stay put if it leaves the body.

use nalgebra::DVector;
use rand::Rng;

use super::util::random_in_ball;
use super::Walk;
use crate::error::Result;
use crate::polytope::ConvexBody;

#[derive(Clone, Copy, Debug)]
pub struct BallWalk {
    pub delta: f64,
}

impl BallWalk {
    /// Default step `4 r / sqrt(n)` for an inscribed radius `r`.
    pub fn for_radius(n: usize, radius: f64) -> Self {
        Self {
            delta: 4.0 * radius / (n as f64).sqrt(),
        }
    }
}

impl Walk for BallWalk {
    fn step<B: ConvexBody + ?Sized, R: Rng + ?Sized>(
        &self,
        body: &B,
        x: &mut DVector<f64>,
        rng: &mut R,
    ) -> Result<()> {
        let y = &*x + random_in_ball(body.dimension(), rng) * self.delta;
        if body.contains(&y) {
            *x = y;
        }
        Ok(())
    }
}
