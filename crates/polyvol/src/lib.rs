//! Random-walk geometry on H-polytopes `{x : Ax <= b}`.
//!
//! Purpose
//! - Estimate volumes, draw (uniform or Gaussian) samples, round polytopes into
//!   well-conditioned position, and run multiphase Monte Carlo sampling (MMCS).
//!
//! Layout
//! - `polytope`: H-representation, oracle trait for convex bodies, low-dimensional
//!   projection, and a few closed-form test bodies.
//! - `inner_ball`: interior point + inscribed radius suppliers (LP and pure geometry).
//! - `walks`: Markov-chain kernels (hit-and-run, ball, billiard, barrier, Gaussian).
//! - `volume`: sequence-of-balls, cooling-balls and cooling-Gaussian estimators.
//! - `rounding`: min/max ellipsoid and isotropic rounding.
//! - `mmcs`: the phase-by-phase controller and a driver loop.
//! - `api`: string-typed entry points that validate method names up front.
//!
//! API Policy
//! - Method names are parsed into closed enums at the boundary; the numerical
//!   core never sees an unvalidated name.
//! - Matrices are owned `nalgebra` values or borrowed for the length of a call.

pub mod api;
pub mod error;
pub mod inner_ball;
pub mod linalg;
pub mod mmcs;
pub mod polytope;
pub mod rounding;
pub mod stats;
pub mod volume;
pub mod walks;

pub use error::{PolyError, Result};

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::error::{PolyError, Result};
    pub use crate::inner_ball::{
        GeometricInnerBall, InnerBall, InnerBallKind, InnerBallSolver, LpInnerBall,
    };
    pub use crate::mmcs::{
        fast_mmcs, run_mmcs, slow_mmcs, MmcsOutcome, MmcsOutput, MmcsSession, MmcsSettings,
        PhaseStatus,
    };
    pub use crate::polytope::{
        special, Ball, BallPolytope, ConvexBody, FullDimProjection, HPolytope, LowDimHPolytope,
    };
    pub use crate::rounding::{rounding, Rounding, RoundingCfg, RoundingMethod};
    pub use crate::volume::{compute_volume, VolumeCfg, VolumeMethod, VolumeWalk};
    pub use crate::walks::{apply_sampling, seed_or_clock, SamplingParams, WalkType};
    pub use nalgebra::{DMatrix, DVector};
}
