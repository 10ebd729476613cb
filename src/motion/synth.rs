//! Trajectory synthesis.
//!
//! Both entry points are pure. They normalize the request to a forward
//! maneuver with [`Sense`], solve the forward case and denormalize the result.
//! The returned trajectory carries [`Action::None`]; the caller tags it.
//!
//! [`Action::None`]: super::Action::None

use crate::error::MotionError;

use super::fixed::{isqrt, timest, timest2, wdiva, Accel, Counts, Micros, Rate};
use super::trajectory::{Sense, Trajectory};

fn check_limits(wmax: Rate, a: Accel) -> Result<(), MotionError> {
    if a <= 0 {
        return Err(MotionError::InvalidArgument("acceleration must be positive"));
    }
    if wmax <= 0 {
        return Err(MotionError::InvalidArgument("max speed must be positive"));
    }
    Ok(())
}

/// Synthesize a trajectory lasting exactly `t3 - t0`.
///
/// `wt` is the signed target speed; its sign selects the direction. The
/// initial speed `w0` is clamped to what can be shed within the duration.
/// If `wt` cannot be reached and left again in time, the profile becomes
/// triangular with its peak at the midpoint.
///
/// # Errors
///
/// * `InvalidArgument` for a negative duration or non-positive limits.
/// * `SynthesisFailure` if a phase duration comes out negative.
pub fn time_based(
    t0: Micros,
    t3: Micros,
    th0: Counts,
    w0: Rate,
    wt: Rate,
    wmax: Rate,
    a: Accel,
) -> Result<Trajectory, MotionError> {
    // Work with intervals; read 'm' as '-'
    let t3mt0 = t3 - t0;
    if t3mt0 < 0 {
        return Err(MotionError::InvalidArgument("negative duration"));
    }
    check_limits(wmax, a)?;

    let sense = Sense::of_rate(wt);
    let wt = sense.normalize_rate(wt).min(wmax);
    let w0 = sense.normalize_rate(w0);

    let abs_max = wmax.min(timest(a, t3mt0));
    let w0 = w0.clamp(-abs_max, abs_max);

    let (a0, w1, t1mt0) = if w0 < wt {
        // Accelerate, either up to wt or to a midpoint peak
        if wdiva(wt - w0, a) - (t3mt0 - wdiva(w0, a)) / 2 < 0 {
            (a, wt, wdiva(wt - w0, a))
        } else {
            (a, timest(a, t3mt0) / 2 + w0 / 2, (t3mt0 - wdiva(w0, a)) / 2)
        }
    } else {
        (-a, wt, wdiva(w0 - wt, a))
    };

    let a2 = -a;
    let t3mt2 = wdiva(w1, a);
    let t2mt1 = t3mt0 - t3mt2 - t1mt0;

    if t1mt0 < 0 || t2mt1 < 0 || t3mt2 < 0 {
        return Err(MotionError::SynthesisFailure);
    }

    let th1 = th0 + timest(w0, t1mt0) + timest2(a0, t1mt0);
    let th2 = th1 + timest(w1, t2mt1);
    let th3 = th2 + timest(w1, t3mt2) + timest2(a2, t3mt2);

    let forward = Trajectory {
        t0,
        t1: t0 + t1mt0,
        t2: t0 + t1mt0 + t2mt1,
        t3,
        th0,
        th1,
        th2,
        th3,
        w0,
        w1,
        a0,
        a2,
        ..Trajectory::default()
    };
    Ok(sense.denormalize(forward))
}

/// Synthesize a trajectory travelling exactly from `th0` to `th3`.
///
/// Only the magnitude of `wt` matters; direction follows the sign of
/// `th3 - th0`. A zero-length request yields [`Trajectory::none`].
///
/// # Errors
///
/// * `InvalidArgument` for zero target speed or non-positive limits.
/// * `SynthesisFailure` if a phase duration comes out negative.
pub fn angle_based(
    t0: Micros,
    th0: Counts,
    th3: Counts,
    w0: Rate,
    wt: Rate,
    wmax: Rate,
    a: Accel,
) -> Result<Trajectory, MotionError> {
    if wt == 0 {
        return Err(MotionError::InvalidArgument("target speed must be nonzero"));
    }
    check_limits(wmax, a)?;

    if th3 == th0 {
        return Ok(Trajectory::none(t0, th0, 0));
    }

    let sense = Sense::of_travel(th0, th3);
    let th3 = sense.normalize_count(th0, th3);
    let mut w0 = sense.normalize_rate(w0);
    let wt = wt.abs().min(wmax);

    // Only take the root when w0 would overshoot the target
    if w0 > 0 && (w0 * w0) / (2 * a) > th3 - th0 {
        w0 = isqrt(2 * a * (th3 - th0));
    }

    let (a0, th1, th2, w1) = if w0 < wt {
        // Position where the accelerating arc has zero speed
        let thf = th0 - (w0 * w0) / (2 * a);

        if th3 - thf >= (wt * wt) / a {
            (a, thf + (wt * wt) / (2 * a), th3 - (wt * wt) / (2 * a), wt)
        } else {
            // Arcs meet halfway; rounding may place the peak just under w0
            let th1 = (th3 + thf) / 2;
            (a, th1, th1, isqrt(2 * a * (th1 - thf)).max(w0))
        }
    } else {
        (-a, th0 + (w0 * w0 - wt * wt) / (2 * a), th3 - (wt * wt) / (2 * a), wt)
    };

    let t1mt0 = wdiva(w1 - w0, a0);
    let t2mt1 = if th2 == th1 { 0 } else { wdiva(th2 - th1, w1) };
    let t3mt2 = wdiva(w1, a);

    if t1mt0 < 0 || t2mt1 < 0 || t3mt2 < 0 {
        return Err(MotionError::SynthesisFailure);
    }

    let t1 = t0 + t1mt0;
    let t2 = t1 + t2mt1;
    let forward = Trajectory {
        t0,
        t1,
        t2,
        t3: t2 + t3mt2,
        th0,
        th1,
        th2,
        th3,
        w0,
        w1,
        a0,
        a2: -a,
        ..Trajectory::default()
    };
    Ok(sense.denormalize(forward))
}
