//! Four-segment trajectory representation.

use super::fixed::{Accel, Counts, Micros, Rate};

/// Command that produced a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// No maneuver.
    #[default]
    None,
    /// Run at constant speed until a new command.
    Run,
    /// Run for a given duration.
    RunTime,
    /// Run until the motor stalls.
    RunStalled,
    /// Run by a relative angle.
    RunAngle,
    /// Run to an absolute target.
    RunTarget,
    /// Hold an absolute target indefinitely.
    TrackTarget,
}

impl Action {
    /// Actions without a real end time; they never enter deceleration.
    #[inline]
    pub fn is_unbounded(self) -> bool {
        matches!(self, Action::Run | Action::RunStalled)
    }
}

/// What the motor does once a maneuver ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AfterStop {
    /// Let the motor spin freely.
    #[default]
    Coast,
    /// Short the windings.
    Brake,
    /// Actively hold the final position.
    Hold,
}

/// Accelerate / cruise / decelerate / hold motion profile for one axis.
///
/// Checkpoints satisfy `t0 <= t1 <= t2 <= t3`. `a0` takes `w0` to `w1` over
/// `t0..t1`, `a2` takes `w1` to zero over `t2..t3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Trajectory {
    /// Start time.
    pub t0: Micros,
    /// End of acceleration.
    pub t1: Micros,
    /// End of cruise.
    pub t2: Micros,
    /// End of deceleration.
    pub t3: Micros,
    /// Start position.
    pub th0: Counts,
    /// Position at `t1`.
    pub th1: Counts,
    /// Position at `t2`.
    pub th2: Counts,
    /// Final position.
    pub th3: Counts,
    /// Initial speed.
    pub w0: Rate,
    /// Cruise speed.
    pub w1: Rate,
    /// Acceleration during the first phase.
    pub a0: Accel,
    /// Acceleration during the deceleration phase.
    pub a2: Accel,
    /// Originating action.
    pub action: Action,
    /// Policy once the maneuver ends.
    pub after_stop: AfterStop,
}

impl Trajectory {
    /// Degenerate profile: every checkpoint at `(t0, th0)`, no acceleration,
    /// cruise speed `w1` carried through.
    pub fn none(t0: Micros, th0: Counts, w1: Rate) -> Self {
        Self {
            t0,
            t1: t0,
            t2: t0,
            t3: t0,
            th0,
            th1: th0,
            th2: th0,
            th3: th0,
            w0: 0,
            w1,
            a0: 0,
            a2: 0,
            action: Action::None,
            after_stop: AfterStop::Coast,
        }
    }

    /// Tag with the originating command.
    #[inline]
    pub fn with_action(mut self, action: Action, after_stop: AfterStop) -> Self {
        self.action = action;
        self.after_stop = after_stop;
        self
    }

    /// Mirror positions about `th0` and negate speeds and accelerations.
    pub fn reversed(mut self) -> Self {
        self.th1 = 2 * self.th0 - self.th1;
        self.th2 = 2 * self.th0 - self.th2;
        self.th3 = 2 * self.th0 - self.th3;
        self.w0 = -self.w0;
        self.w1 = -self.w1;
        self.a0 = -self.a0;
        self.a2 = -self.a2;
        self
    }

    /// Total duration.
    #[inline]
    pub fn duration(&self) -> Micros {
        self.t3 - self.t0
    }

    /// Whether `now` is past the end of a maneuver that has one.
    #[inline]
    pub fn is_done(&self, now: Micros) -> bool {
        !self.action.is_unbounded() && self.action != Action::TrackTarget && now >= self.t3
    }
}

/// Sense of a requested maneuver.
///
/// Synthesis normalizes inputs to a forward maneuver, solves the forward case
/// only, then denormalizes the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// Positive counts.
    Forward,
    /// Negative counts.
    Backward,
}

impl Sense {
    /// Sense of a signed speed; zero counts as forward.
    #[inline]
    pub fn of_rate(w: Rate) -> Self {
        if w < 0 {
            Sense::Backward
        } else {
            Sense::Forward
        }
    }

    /// Sense of travel from `from` to `to`.
    #[inline]
    pub fn of_travel(from: Counts, to: Counts) -> Self {
        if to < from {
            Sense::Backward
        } else {
            Sense::Forward
        }
    }

    /// Normalize a speed into the forward frame.
    #[inline]
    pub fn normalize_rate(self, w: Rate) -> Rate {
        match self {
            Sense::Forward => w,
            Sense::Backward => -w,
        }
    }

    /// Normalize a position into the forward frame, mirrored about `origin`.
    #[inline]
    pub fn normalize_count(self, origin: Counts, th: Counts) -> Counts {
        match self {
            Sense::Forward => th,
            Sense::Backward => 2 * origin - th,
        }
    }

    /// Map a forward-frame trajectory back to the requested sense.
    #[inline]
    pub fn denormalize(self, trajectory: Trajectory) -> Trajectory {
        match self {
            Sense::Forward => trajectory,
            Sense::Backward => trajectory.reversed(),
        }
    }
}
