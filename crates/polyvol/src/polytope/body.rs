//! Membership/boundary oracles shared by the directional walks.
//!
//! Hit-and-run, ball and billiard walks only talk to a body through this trait,
//! so the volume algorithms can run them on `P ∩ B(0, r)` without materializing
//! an H-representation of the intersection.

use nalgebra::DVector;

use super::cfg::FEAS_EPS;
use super::types::HPolytope;

/// Convex body with line and boundary oracles.
pub trait ConvexBody: Sync {
    fn dimension(&self) -> usize;

    fn contains(&self, x: &DVector<f64>) -> bool;

    /// Chord `{x + t v} ∩ K` as `(t_min, t_max)`; for interior `x`, `t_min <= 0 <= t_max`.
    /// Unbounded directions report infinities.
    fn line_intersect(&self, x: &DVector<f64>, v: &DVector<f64>) -> (f64, f64);

    /// Chord along the coordinate axis `coord`.
    fn coordinate_intersect(&self, x: &DVector<f64>, coord: usize) -> (f64, f64) {
        let mut e = DVector::zeros(self.dimension());
        e[coord] = 1.0;
        self.line_intersect(x, &e)
    }

    /// First boundary hit along the ray `x + t v` (`t >= 0`) and the outward unit
    /// normal there. `None` if the ray never leaves the body.
    fn boundary_hit(&self, x: &DVector<f64>, v: &DVector<f64>) -> Option<(f64, DVector<f64>)>;
}

/// Euclidean ball.
#[derive(Clone, Debug, PartialEq)]
pub struct Ball {
    pub center: DVector<f64>,
    pub radius: f64,
}

impl Ball {
    pub fn new(center: DVector<f64>, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Roots of `||x + t v - c||^2 = r^2`, ordered.
    fn roots(&self, x: &DVector<f64>, v: &DVector<f64>) -> Option<(f64, f64)> {
        let d = x - &self.center;
        let qa = v.norm_squared();
        if qa == 0.0 {
            return None;
        }
        let qb = 2.0 * v.dot(&d);
        let qc = d.norm_squared() - self.radius * self.radius;
        let disc = qb * qb - 4.0 * qa * qc;
        if disc < 0.0 {
            return None;
        }
        let sq = disc.sqrt();
        Some(((-qb - sq) / (2.0 * qa), (-qb + sq) / (2.0 * qa)))
    }
}

impl ConvexBody for Ball {
    fn dimension(&self) -> usize {
        self.center.len()
    }

    fn contains(&self, x: &DVector<f64>) -> bool {
        (x - &self.center).norm() <= self.radius + FEAS_EPS
    }

    fn line_intersect(&self, x: &DVector<f64>, v: &DVector<f64>) -> (f64, f64) {
        match self.roots(x, v) {
            Some((lo, hi)) => (lo.min(0.0), hi.max(0.0)),
            None => (0.0, 0.0),
        }
    }

    fn boundary_hit(&self, x: &DVector<f64>, v: &DVector<f64>) -> Option<(f64, DVector<f64>)> {
        let (_, hi) = self.roots(x, v)?;
        let t = hi.max(0.0);
        let hit = x + v * t;
        let normal = (hit - &self.center) / self.radius;
        Some((t, normal))
    }
}

/// `P ∩ B(c, r)`, the bodies of the ball-annealing volume schedules.
#[derive(Clone, Debug)]
pub struct BallPolytope<'a> {
    pub polytope: &'a HPolytope,
    pub ball: Ball,
}

impl<'a> BallPolytope<'a> {
    pub fn new(polytope: &'a HPolytope, ball: Ball) -> Self {
        Self { polytope, ball }
    }
}

impl ConvexBody for BallPolytope<'_> {
    fn dimension(&self) -> usize {
        self.polytope.dimension()
    }

    fn contains(&self, x: &DVector<f64>) -> bool {
        self.ball.contains(x) && self.polytope.contains(x)
    }

    fn line_intersect(&self, x: &DVector<f64>, v: &DVector<f64>) -> (f64, f64) {
        let (plo, phi) = self.polytope.line_intersect(x, v);
        let (blo, bhi) = self.ball.line_intersect(x, v);
        (plo.max(blo), phi.min(bhi))
    }

    fn coordinate_intersect(&self, x: &DVector<f64>, coord: usize) -> (f64, f64) {
        let (plo, phi) = self.polytope.coordinate_intersect(x, coord);
        let (blo, bhi) = ConvexBody::coordinate_intersect(&self.ball, x, coord);
        (plo.max(blo), phi.min(bhi))
    }

    fn boundary_hit(&self, x: &DVector<f64>, v: &DVector<f64>) -> Option<(f64, DVector<f64>)> {
        match (self.polytope.boundary_hit(x, v), self.ball.boundary_hit(x, v)) {
            (Some(p), Some(b)) => Some(if p.0 <= b.0 { p } else { b }),
            (p, b) => p.or(b),
        }
    }
}
