//! Phase loop around `MmcsSession`: recompute the inner ball between phases
//! until convergence, failure or the phase cap.

use nalgebra::{DMatrix, DVector};

use super::{MmcsSession, MmcsSettings, PhaseStatus};
use crate::error::{PolyError, Result};
use crate::inner_ball::InnerBallKind;
use crate::polytope::HPolytope;

#[derive(Clone, Debug, PartialEq)]
pub enum MmcsOutcome {
    Converged,
    /// `max_phases` ran out before convergence.
    PhaseCap,
    /// A phase broke down; samples of completed phases are kept.
    Failed(PolyError),
}

impl MmcsOutcome {
    /// Lowercase tag: `converged`, `phase_cap` or `failed`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Converged => "converged",
            Self::PhaseCap => "phase_cap",
            Self::Failed(_) => "failed",
        }
    }

    pub fn error(&self) -> Option<&PolyError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Final state of a run: the last rounded polytope, the composed transform
/// and every sample in original coordinates.
#[derive(Clone, Debug)]
pub struct MmcsOutput {
    pub outcome: MmcsOutcome,
    pub a: DMatrix<f64>,
    pub b: DVector<f64>,
    pub transform: DMatrix<f64>,
    pub shift: DVector<f64>,
    /// `d x N`, one column per point.
    pub samples: DMatrix<f64>,
    pub phases: usize,
    pub ess: f64,
    pub psrf: Option<f64>,
}

/// Drive a session over `poly` with inner balls from `kind`.
///
/// Errors only on invalid settings or when the initial inner ball cannot be found.
pub fn run_mmcs(poly: &HPolytope, settings: &MmcsSettings, kind: InnerBallKind) -> Result<MmcsOutput> {
    let mut session = MmcsSession::initialize(poly.clone(), *settings)?;
    let mut ball = kind.inner_ball(poly)?;
    let mut outcome = MmcsOutcome::PhaseCap;
    for _ in 0..settings.max_phases {
        let (status, _) = session.step(&ball.center, ball.radius)?;
        match status {
            PhaseStatus::Converged => {
                outcome = MmcsOutcome::Converged;
                break;
            }
            PhaseStatus::Failed => {
                outcome = failed(&session);
                break;
            }
            PhaseStatus::Continue => match kind.inner_ball(session.polytope()) {
                Ok(next) => ball = next,
                Err(err) => {
                    session.fail(err);
                    outcome = failed(&session);
                    break;
                }
            },
        }
    }
    if outcome == MmcsOutcome::PhaseCap {
        tracing::warn!(phases = settings.max_phases, ess = session.ess(), "mmcs hit the phase cap");
    }
    let (a, b) = session.polytope_as_matrices();
    let (transform, shift, samples) = session.samples();
    Ok(MmcsOutput {
        outcome,
        a,
        b,
        transform,
        shift,
        samples,
        phases: session.phase_count(),
        ess: session.ess(),
        psrf: session.last_psrf(),
    })
}

fn failed(session: &MmcsSession) -> MmcsOutcome {
    MmcsOutcome::Failed(
        session
            .failure()
            .cloned()
            .unwrap_or_else(|| PolyError::numerical("mmcs phase failed")),
    )
}

/// MMCS with the LP inner-ball supplier.
pub fn fast_mmcs(poly: &HPolytope, settings: &MmcsSettings) -> Result<MmcsOutput> {
    run_mmcs(poly, settings, InnerBallKind::Fast)
}

/// MMCS with the pure-geometry inner-ball supplier.
pub fn slow_mmcs(poly: &HPolytope, settings: &MmcsSettings) -> Result<MmcsOutput> {
    run_mmcs(poly, settings, InnerBallKind::Slow)
}
