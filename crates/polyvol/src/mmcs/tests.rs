use super::*;
use crate::inner_ball::InnerBallKind;
use crate::polytope::special;
use nalgebra::dvector;

fn skewed_box() -> HPolytope {
    special::boxed(&[1.0, 0.2, 0.5])
}

fn settings(seed: u64) -> MmcsSettings {
    MmcsSettings {
        target_ess: 300,
        points_per_phase: 400,
        seed: Some(seed),
        ..MmcsSettings::default()
    }
}

#[test]
fn status_codes_follow_the_convention() {
    for s in [PhaseStatus::Continue, PhaseStatus::Converged, PhaseStatus::Failed] {
        assert_eq!(PhaseStatus::from_code(s.code()), s);
    }
    assert_eq!(PhaseStatus::from_code(0.3), PhaseStatus::Continue);
    assert_eq!(PhaseStatus::from_code(1.9), PhaseStatus::Converged);
    assert_eq!(PhaseStatus::from_code(-1.0), PhaseStatus::Failed);
    assert_eq!(PhaseStatus::from_code(0.0), PhaseStatus::Failed);
    assert!(!PhaseStatus::Continue.is_terminal());
}

#[test]
fn fixed_seed_without_psrf_is_deterministic() {
    let p = skewed_box();
    let s = MmcsSettings {
        psrf_check: false,
        ..settings(11)
    };
    let a = fast_mmcs(&p, &s).unwrap();
    let b = fast_mmcs(&p, &s).unwrap();
    assert_eq!(a.outcome, MmcsOutcome::Converged);
    assert_eq!(a.phases, b.phases);
    assert_eq!(a.samples.ncols(), b.samples.ncols());
    assert_eq!(a.samples, b.samples);
    assert!(a.ess >= 300.0);
}

#[test]
fn parallel_flag_changes_nothing_but_scheduling() {
    let p = skewed_box();
    let seq = MmcsSettings {
        num_threads: 2,
        psrf_check: false,
        ..settings(3)
    };
    let par = MmcsSettings { parallel: true, ..seq };
    let a = fast_mmcs(&p, &seq).unwrap();
    let b = fast_mmcs(&p, &par).unwrap();
    assert_eq!(a.samples, b.samples);
    assert_eq!(a.transform, b.transform);
}

#[test]
fn converged_run_has_target_samples_and_one_terminal_status() {
    let p = skewed_box();
    let mut session = MmcsSession::initialize(p.clone(), settings(5)).unwrap();
    let mut ball = InnerBallKind::Fast.inner_ball(&p).unwrap();
    let mut statuses = Vec::new();
    for _ in 0..50 {
        let (status, count) = session.step(&ball.center, ball.radius).unwrap();
        assert_eq!(count, session.sample_count());
        statuses.push(status);
        if status.is_terminal() {
            break;
        }
        ball = InnerBallKind::Fast.inner_ball(session.polytope()).unwrap();
    }
    assert_eq!(statuses.last(), Some(&PhaseStatus::Converged));
    assert_eq!(statuses.iter().filter(|s| **s == PhaseStatus::Converged).count(), 1);
    assert_eq!(session.state(), SessionState::Converged);
    assert!(session.last_psrf().is_some_and(|r| r <= 1.1));

    let (t, shift, samples) = session.samples();
    assert!(samples.ncols() >= 300);
    for col in samples.column_iter() {
        assert!(p.contains_eps(&col.into_owned(), 1e-9));
    }
    assert_eq!(t.shape(), (3, 3));
    assert_eq!(shift.len(), 3);
    assert!(matches!(
        session.step(&ball.center, ball.radius),
        Err(PolyError::InvalidParameter { name: "session", .. })
    ));
}

#[test]
fn transform_maps_current_polytope_onto_original() {
    let p = skewed_box();
    let s = MmcsSettings {
        psrf_check: false,
        target_ess: 100_000,
        max_phases: 3,
        ..settings(9)
    };
    let out = slow_mmcs(&p, &s).unwrap();
    assert_eq!(out.outcome, MmcsOutcome::PhaseCap);
    assert_eq!(out.phases, 3);
    let current = HPolytope::new(out.a.clone(), out.b.clone()).unwrap();
    // Pulling the original back along the composed map gives the current polytope.
    let pulled = p.linear_transform(&out.transform, &out.shift).unwrap();
    assert!((pulled.a() - current.a()).amax() < 1e-9);
    assert!((pulled.b() - current.b()).amax() < 1e-9);
}

#[test]
fn breakdown_fails_the_session_without_partial_samples() {
    // Two points cannot give a 3 x 3 covariance.
    let p = skewed_box();
    let s = MmcsSettings {
        points_per_phase: 2,
        psrf_check: false,
        ..settings(1)
    };
    let mut session = MmcsSession::initialize(p.clone(), s).unwrap();
    let (status, count) = session.step(&DVector::zeros(3), 0.2).unwrap();
    assert_eq!(status, PhaseStatus::Failed);
    assert_eq!(count, 0);
    assert_eq!(session.state(), SessionState::Failed);
    assert!(matches!(session.failure(), Some(PolyError::InvalidParameter { .. })));
    assert!(session.step(&DVector::zeros(3), 0.2).is_err());

    let out = fast_mmcs(&p, &s).unwrap();
    assert!(matches!(out.outcome, MmcsOutcome::Failed(_)));
    assert_eq!(out.samples.ncols(), 0);
}

#[test]
fn failure_after_a_phase_keeps_its_samples() {
    let p = skewed_box();
    let s = MmcsSettings {
        psrf_check: false,
        target_ess: 100_000,
        ..settings(3)
    };
    let mut session = MmcsSession::initialize(p.clone(), s).unwrap();
    let ball = InnerBallKind::Fast.inner_ball(&p).unwrap();
    let (status, count) = session.step(&ball.center, ball.radius).unwrap();
    assert_eq!(status, PhaseStatus::Continue);
    assert!(count > 0);
    session.fail(PolyError::numerical("inner ball lost"));
    assert_eq!(session.state(), SessionState::Failed);
    let (_, _, kept) = session.samples();
    assert_eq!(kept.ncols(), count);
    for col in kept.column_iter() {
        assert!(p.contains_eps(&col.into_owned(), 1e-9));
    }
}

#[test]
fn outcome_tags() {
    assert_eq!(MmcsOutcome::Converged.as_str(), "converged");
    assert_eq!(MmcsOutcome::PhaseCap.as_str(), "phase_cap");
    let failed = MmcsOutcome::Failed(PolyError::numerical("x"));
    assert_eq!(failed.as_str(), "failed");
    assert!(matches!(failed.error(), Some(PolyError::NumericalFailure { .. })));
    assert!(MmcsOutcome::PhaseCap.error().is_none());
}

#[test]
fn settings_and_start_are_validated() {
    let p = skewed_box();
    let bad_walk = MmcsSettings {
        walk: WalkType::DikinWalk,
        ..settings(0)
    };
    assert!(matches!(
        MmcsSession::initialize(p.clone(), bad_walk),
        Err(PolyError::UnsupportedMethod { .. })
    ));
    for bad in [
        MmcsSettings { num_threads: 0, ..settings(0) },
        MmcsSettings { target_ess: 0, ..settings(0) },
        MmcsSettings { psrf_threshold: 1.0, ..settings(0) },
    ] {
        assert!(matches!(
            MmcsSession::initialize(p.clone(), bad),
            Err(PolyError::InvalidParameter { .. })
        ));
    }
    let mut session = MmcsSession::initialize(p, settings(0)).unwrap();
    assert!(matches!(
        session.step(&dvector![0.0, 0.0], 0.1),
        Err(PolyError::DimensionMismatch { .. })
    ));
    assert!(session.step(&dvector![5.0, 0.0, 0.0], 0.1).is_err());
    assert_eq!(session.state(), SessionState::Initialized);
}
