//! Hit-and-run: pick a line through the current point, then a uniform point on its chord.
//!
//! - CDHR: coordinate directions, chord from one column of `A`.
//! - RDHR: uniform directions on the sphere.

use nalgebra::DVector;
use rand::Rng;

use super::util::{random_direction, uniform_in};
use super::Walk;
use crate::error::{PolyError, Result};
use crate::polytope::ConvexBody;

/// Coordinate-directions hit-and-run.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cdhr;

/// Random-directions hit-and-run.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rdhr;

pub(crate) fn checked_chord(lo: f64, hi: f64) -> Result<(f64, f64)> {
    if !lo.is_finite() || !hi.is_finite() {
        return Err(PolyError::numerical("chord is unbounded; the body must be bounded"));
    }
    Ok((lo, hi))
}

impl Walk for Cdhr {
    fn step<B: ConvexBody + ?Sized, R: Rng + ?Sized>(
        &self,
        body: &B,
        x: &mut DVector<f64>,
        rng: &mut R,
    ) -> Result<()> {
        let j = rng.gen_range(0..body.dimension());
        let (lo, hi) = body.coordinate_intersect(x, j);
        let (lo, hi) = checked_chord(lo, hi)?;
        x[j] += uniform_in(lo, hi, rng);
        Ok(())
    }
}

impl Walk for Rdhr {
    fn step<B: ConvexBody + ?Sized, R: Rng + ?Sized>(
        &self,
        body: &B,
        x: &mut DVector<f64>,
        rng: &mut R,
    ) -> Result<()> {
        let v = random_direction(body.dimension(), rng);
        let (lo, hi) = body.line_intersect(x, &v);
        let (lo, hi) = checked_chord(lo, hi)?;
        x.axpy(uniform_in(lo, hi, rng), &v, 1.0);
        Ok(())
    }
}
