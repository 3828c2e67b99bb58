//! Multiphase Monte Carlo sampling (MMCS).
//!
//! Each phase samples the current (rounded) polytope with a directional walk,
//! maps the points back to the caller's coordinates, accumulates ESS, optionally
//! checks the split-chain PSRF of everything collected so far, and, unless
//! converged, whitens the polytope with the phase's samples for the next phase.
//!
//! State machine: `Initialized -> Running { phase } -> {Running, Converged, Failed}`.
//! Terminal states reject further `step` calls.
//!
//! Chains per phase are fixed at `num_threads`; `parallel` only decides whether
//! they run on a rayon pool, so results do not depend on it.

mod driver;

pub use driver::{fast_mmcs, run_mmcs, slow_mmcs, MmcsOutcome, MmcsOutput};

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::error::{PolyError, Result};
use crate::polytope::HPolytope;
use crate::rounding::isotropic_step;
use crate::stats::{columns, min_ess, psrf};
use crate::walks::{apply_sampling, check_start, seed_or_clock, SamplingParams, WalkType};

/// Segments used for the split-chain PSRF.
const PSRF_CHUNKS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MmcsSettings {
    pub target_ess: usize,
    pub psrf_check: bool,
    pub parallel: bool,
    /// Chains per phase (and pool size when `parallel`).
    pub num_threads: usize,
    /// Must be directional (`cdhr`, `rdhr`, `billiard_walk`).
    pub walk: WalkType,
    pub walk_len: usize,
    /// Total points per phase, split evenly over the chains.
    pub points_per_phase: usize,
    pub burn_in_points: usize,
    pub psrf_threshold: f64,
    pub max_phases: usize,
    pub seed: Option<u64>,
}

impl Default for MmcsSettings {
    fn default() -> Self {
        Self {
            target_ess: 1000,
            psrf_check: true,
            parallel: false,
            num_threads: 1,
            walk: WalkType::BilliardWalk,
            walk_len: 1,
            points_per_phase: 500,
            burn_in_points: 20,
            psrf_threshold: 1.1,
            max_phases: 50,
            seed: None,
        }
    }
}

impl MmcsSettings {
    pub fn validate(&self) -> Result<()> {
        if !self.walk.is_directional() {
            return Err(PolyError::unsupported("mmcs walk", self.walk.as_str()));
        }
        if self.target_ess == 0 {
            return Err(PolyError::invalid("target_ess", "must be positive"));
        }
        if self.num_threads == 0 {
            return Err(PolyError::invalid("num_threads", "must be positive"));
        }
        if self.walk_len == 0 {
            return Err(PolyError::invalid("walk_len", "must be at least 1"));
        }
        if self.points_per_phase < 2 * self.num_threads {
            return Err(PolyError::invalid(
                "points_per_phase",
                "needs at least two points per chain",
            ));
        }
        if !(self.psrf_threshold > 1.0) {
            return Err(PolyError::invalid("psrf_threshold", "must exceed 1"));
        }
        Ok(())
    }

    fn points_per_chain(&self) -> usize {
        self.points_per_phase.div_ceil(self.num_threads)
    }
}

/// Outcome of one phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseStatus {
    Continue,
    Converged,
    Failed,
}

impl PhaseStatus {
    /// Numeric convention: continue in `(0, 1]`, converged in `(1, 2)`, failed `>= 2`.
    pub fn code(self) -> f64 {
        match self {
            Self::Continue => 1.0,
            Self::Converged => 1.5,
            Self::Failed => 2.0,
        }
    }

    pub fn from_code(code: f64) -> Self {
        if code > 0.0 && code <= 1.0 {
            Self::Continue
        } else if code > 1.0 && code < 2.0 {
            Self::Converged
        } else {
            Self::Failed
        }
    }

    pub fn is_terminal(self) -> bool {
        self != Self::Continue
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Initialized,
    Running { phase: usize },
    Converged,
    Failed,
}

/// One MMCS run. Created once, mutated per phase.
#[derive(Debug)]
pub struct MmcsSession {
    settings: MmcsSettings,
    polytope: HPolytope,
    transform: DMatrix<f64>,
    shift: DVector<f64>,
    /// Per-phase samples in original coordinates (`d x N_k`).
    phases: Vec<DMatrix<f64>>,
    ess: f64,
    last_psrf: Option<f64>,
    state: SessionState,
    failure: Option<PolyError>,
    rng: StdRng,
}

impl MmcsSession {
    pub fn initialize(polytope: HPolytope, settings: MmcsSettings) -> Result<Self> {
        settings.validate()?;
        let n = polytope.dimension();
        let seed = seed_or_clock(settings.seed);
        tracing::debug!(seed, dimension = n, target_ess = settings.target_ess, "mmcs session");
        Ok(Self {
            settings,
            polytope,
            transform: DMatrix::identity(n, n),
            shift: DVector::zeros(n),
            phases: Vec::new(),
            ess: 0.0,
            last_psrf: None,
            state: SessionState::Initialized,
            failure: None,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn dimension(&self) -> usize {
        self.polytope.dimension()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn settings(&self) -> &MmcsSettings {
        &self.settings
    }

    /// Polytope of the next phase, in current rounded coordinates.
    pub fn polytope(&self) -> &HPolytope {
        &self.polytope
    }

    pub fn polytope_as_matrices(&self) -> (DMatrix<f64>, DVector<f64>) {
        (self.polytope.a().clone(), self.polytope.b().clone())
    }

    pub fn sample_count(&self) -> usize {
        self.phases.iter().map(|m| m.ncols()).sum()
    }

    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    pub fn ess(&self) -> f64 {
        self.ess
    }

    pub fn last_psrf(&self) -> Option<f64> {
        self.last_psrf
    }

    /// Error that moved the session to `Failed`, if any.
    pub fn failure(&self) -> Option<&PolyError> {
        self.failure.as_ref()
    }

    /// `(T, shift, samples)`: samples are in original coordinates, `x = T y + shift`
    /// maps the current polytope onto the original one.
    pub fn samples(&self) -> (DMatrix<f64>, DVector<f64>, DMatrix<f64>) {
        (self.transform.clone(), self.shift.clone(), self.all_samples())
    }

    fn all_samples(&self) -> DMatrix<f64> {
        if self.phases.is_empty() {
            return DMatrix::zeros(self.dimension(), 0);
        }
        concat(&self.phases)
    }

    /// Mark the session failed from outside a phase (e.g. the inner-ball supplier).
    pub fn fail(&mut self, err: PolyError) {
        tracing::warn!(error = %err, phases = self.phases.len(), "mmcs failed");
        self.state = SessionState::Failed;
        self.failure = Some(err);
    }

    /// Run one phase from `start` with inscribed radius `radius` (current coordinates).
    ///
    /// Misuse (finished session, bad start) is an `Err`; numerical breakdown inside
    /// the phase yields `Ok(Failed)` and keeps the samples of earlier phases.
    pub fn step(&mut self, start: &DVector<f64>, radius: f64) -> Result<(PhaseStatus, usize)> {
        if matches!(self.state, SessionState::Converged | SessionState::Failed) {
            return Err(PolyError::invalid("session", "mmcs run already finished"));
        }
        check_start(&self.polytope, start, radius)?;
        let phase = self.phases.len();
        self.state = SessionState::Running { phase };
        let status = match self.run_phase(start, radius) {
            Ok(status) => status,
            Err(err) => {
                self.fail(err);
                PhaseStatus::Failed
            }
        };
        if status == PhaseStatus::Converged {
            self.state = SessionState::Converged;
        }
        tracing::info!(
            phase,
            status = ?status,
            samples = self.sample_count(),
            ess = self.ess,
            psrf = ?self.last_psrf,
            "mmcs phase"
        );
        Ok((status, self.sample_count()))
    }

    /// Nothing is committed to the session unless the whole phase succeeds.
    fn run_phase(&mut self, start: &DVector<f64>, radius: f64) -> Result<PhaseStatus> {
        let seeds: Vec<u64> = (0..self.settings.num_threads).map(|_| self.rng.gen()).collect();
        let chains = self.run_chains(&seeds, start, radius)?;

        let original: Vec<DMatrix<f64>> = chains.iter().map(|y| self.to_original(y)).collect();
        let ess = self.ess + min_ess(&original);
        let mut phases = self.phases.clone();
        phases.push(concat(&original));

        let mut converged = ess >= self.settings.target_ess as f64;
        let mut last_psrf = self.last_psrf;
        if self.settings.psrf_check {
            last_psrf = psrf(&concat(&phases), PSRF_CHUNKS);
            converged &= last_psrf.is_some_and(|r| r <= self.settings.psrf_threshold);
        }

        if !converged {
            let (l, mu) = isotropic_step(&concat(&chains))?;
            self.polytope = self.polytope.linear_transform(&l, &mu)?;
            self.shift += &self.transform * &mu;
            self.transform = &self.transform * &l;
        }
        self.ess = ess;
        self.phases = phases;
        self.last_psrf = last_psrf;
        Ok(if converged { PhaseStatus::Converged } else { PhaseStatus::Continue })
    }

    fn run_chains(&self, seeds: &[u64], start: &DVector<f64>, radius: f64) -> Result<Vec<DMatrix<f64>>> {
        let params = SamplingParams {
            walk_len: self.settings.walk_len,
            number_of_points: self.settings.points_per_chain(),
            number_of_points_to_burn: self.settings.burn_in_points,
        };
        let poly = &self.polytope;
        let walk = self.settings.walk;
        let chain = |seed: &u64| -> Result<DMatrix<f64>> {
            let mut rng = StdRng::seed_from_u64(*seed);
            let pts = apply_sampling(poly, walk, &params, start, radius, &mut rng)?;
            Ok(columns(&pts))
        };
        if self.settings.parallel {
            match ThreadPoolBuilder::new()
                .num_threads(self.settings.num_threads)
                .thread_name(|i| format!("polyvol-mmcs-{i}"))
                .build()
            {
                Ok(pool) => return pool.install(|| seeds.par_iter().map(&chain).collect()),
                Err(err) => tracing::warn!(error = %err, "thread pool unavailable; running chains sequentially"),
            }
        }
        seeds.iter().map(&chain).collect()
    }

    fn to_original(&self, y: &DMatrix<f64>) -> DMatrix<f64> {
        let mut x = &self.transform * y;
        for mut col in x.column_iter_mut() {
            col += &self.shift;
        }
        x
    }
}

fn concat(parts: &[DMatrix<f64>]) -> DMatrix<f64> {
    let d = parts.first().map_or(0, |m| m.nrows());
    let total = parts.iter().map(|m| m.ncols()).sum();
    let mut out = DMatrix::zeros(d, total);
    let mut at = 0;
    for m in parts {
        out.columns_mut(at, m.ncols()).copy_from(m);
        at += m.ncols();
    }
    out
}

#[cfg(test)]
mod tests;
