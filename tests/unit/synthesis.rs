//! Unit tests for trajectory synthesis and evaluation through the public API.

use servo_motion::error::MotionError;
use servo_motion::motion::synth::{angle_based, time_based};
use servo_motion::motion::{Action, AfterStop, MotionPhase, Reference, Trajectory};

/// Test the trapezoid reaches cruise speed and stops exactly at its end.
#[test]
fn test_time_based_endpoints() {
    let t = time_based(1_000, 2_001_000, 0, 0, 1000, 2000, 1000)
        .unwrap()
        .with_action(Action::RunTime, AfterStop::Coast);

    assert_eq!(t.duration(), 2_000_000);
    assert_eq!(t.t1 - t.t0, 1_000_000);
    assert_eq!(t.reference(t.t0), Reference { count: 0, rate: 0 });
    assert_eq!(t.reference(t.t3), Reference { count: t.th3, rate: 0 });
    assert_eq!(t.phase(t.t3 + 1), MotionPhase::Holding);
    assert!(t.is_done(t.t3));
}

/// Test the same profile tagged RUN never leaves cruise.
#[test]
fn test_unbounded_action_keeps_cruising() {
    let t = time_based(0, 30_000_000, 0, 0, 800, 2000, 1000)
        .unwrap()
        .with_action(Action::RunStalled, AfterStop::Hold);

    assert_eq!(t.phase(t.t3 + 60_000_000), MotionPhase::Cruising);
    assert_eq!(t.reference(t.t3 + 60_000_000).rate, 800);
    assert!(!t.is_done(t.t3 + 60_000_000));
}

/// Test the angle-based profile covers the requested distance exactly.
#[test]
fn test_angle_based_distance() {
    for (th0, th3) in [(0, 1234), (500, -777), (-40, -41)] {
        let t = angle_based(0, th0, th3, 0, 600, 1000, 1500).unwrap();
        assert_eq!(t.th3, th3);
        assert_eq!(t.reference(t.t3), Reference { count: th3, rate: 0 });
    }
}

/// Test a zero-length move is the degenerate profile.
#[test]
fn test_angle_based_zero_length() {
    let t = angle_based(7, 90, 90, 0, 600, 1000, 1500).unwrap();
    assert_eq!(t, Trajectory::none(7, 90, 0));
}

/// Test reversal is an involution.
#[test]
fn test_reversal_involution() {
    let t = angle_based(0, 100, 900, 200, 600, 1000, 1500).unwrap();
    assert_eq!(t.reversed().reversed(), t);
}

/// Test invalid requests are rejected before any solving.
#[test]
fn test_invalid_arguments() {
    assert_eq!(
        angle_based(0, 0, 100, 0, 0, 1000, 1000),
        Err(MotionError::InvalidArgument("target speed must be nonzero"))
    );
    assert!(matches!(
        time_based(0, 1_000_000, 0, 0, 100, 1000, 0),
        Err(MotionError::InvalidArgument(_))
    ));
}
