//! Per-port control activity.

/// Control activity of one servo.
///
/// Changed only by command dispatch and by the control update itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Activity {
    /// Not controlled; the motor coasts or brakes.
    #[default]
    Idle,
    /// New maneuver; the control law resets on the next tick.
    Starting,
    /// Following a trajectory.
    Running,
    /// Holding the end position of a finished maneuver.
    Holding,
    /// Maneuver replaced mid-flight; control law state is kept.
    Restarting,
    /// Stopped by a stall.
    Stalled,
    /// Disconnected after a failed control update.
    Errored,
}

impl Activity {
    /// Whether a maneuver is under closed-loop control right now.
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, Activity::Running | Activity::Holding)
    }

    /// Whether a maneuver is active or about to become active on the next tick.
    #[inline]
    pub fn is_engaged(self) -> bool {
        matches!(
            self,
            Activity::Starting | Activity::Running | Activity::Holding | Activity::Restarting
        )
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Activity::Idle => "Idle",
            Activity::Starting => "Starting",
            Activity::Running => "Running",
            Activity::Holding => "Holding",
            Activity::Restarting => "Restarting",
            Activity::Stalled => "Stalled",
            Activity::Errored => "Errored",
        }
    }
}
