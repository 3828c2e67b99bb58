//! Billiard walk: travel a random length along a random direction, reflecting at facets.
//!
//! - Trajectory length `T = L * U(0, 1)`, `L = 4 sqrt(n) r` by default.
//! - Each flight stops at `0.995` of the distance to the hit so the point stays interior.
//! - Reflection `v <- v - 2 (v·n) n` with the outward unit normal of the hit facet.
//! - After `50 n` reflections the step is abandoned and the chain stays where it was.
//!
//! References
//! - Gryazina, Polyak (2014), "Random sampling: Billiard Walk algorithm".

use nalgebra::DVector;
use rand::Rng;

use super::util::random_direction;
use super::Walk;
use crate::error::{PolyError, Result};
use crate::polytope::ConvexBody;

const STOP_SHORT: f64 = 0.995;

#[derive(Clone, Copy, Debug)]
pub struct BilliardWalk {
    pub trajectory_len: f64,
    pub max_reflections_per_dim: usize,
}

impl BilliardWalk {
    pub fn for_radius(n: usize, radius: f64) -> Self {
        Self {
            trajectory_len: 4.0 * (n as f64).sqrt() * radius,
            max_reflections_per_dim: 50,
        }
    }
}

impl Walk for BilliardWalk {
    fn step<B: ConvexBody + ?Sized, R: Rng + ?Sized>(
        &self,
        body: &B,
        x: &mut DVector<f64>,
        rng: &mut R,
    ) -> Result<()> {
        let n = body.dimension();
        let mut remaining = self.trajectory_len * rng.gen::<f64>();
        let mut v = random_direction(n, rng);
        let mut p = x.clone();
        for _ in 0..self.max_reflections_per_dim * n {
            let Some((t_hit, normal)) = body.boundary_hit(&p, &v) else {
                return Err(PolyError::numerical("billiard ray never meets the boundary"));
            };
            if remaining <= STOP_SHORT * t_hit {
                p.axpy(remaining, &v, 1.0);
                *x = p;
                return Ok(());
            }
            let travel = STOP_SHORT * t_hit;
            p.axpy(travel, &v, 1.0);
            remaining -= travel;
            let vn = v.dot(&normal);
            v.axpy(-2.0 * vn, &normal, 1.0);
        }
        Ok(())
    }
}
