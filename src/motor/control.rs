//! Closed-loop control law.
//!
//! The control law turns tracking errors into a duty cycle. Gains come from
//! configuration; nothing here tunes them.

use crate::config::ControlLimits;
use crate::device::MAX_DUTY;
use crate::motion::{timest, Counts, Micros, Rate};

/// Gains are applied in hundredths of a duty step per count.
const GAIN_SCALE: i64 = 100;

/// Tracking error fed to a [`ControlLaw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tracking {
    /// Reference minus measured position.
    pub count_error: Counts,
    /// Reference minus measured speed.
    pub rate_error: Rate,
}

/// Low-level control step run once per tick for an active servo.
pub trait ControlLaw {
    /// Drop internal state such as integral terms.
    fn reset(&mut self);

    /// Compute a duty cycle in `-MAX_DUTY..=MAX_DUTY`.
    fn update(&mut self, now: Micros, tracking: Tracking, limits: &ControlLimits) -> i32;
}

/// Integer PID on position error, with the speed error as derivative term.
#[derive(Debug, Clone, Default)]
pub struct Pid {
    integral: i64,
    last: Option<Micros>,
}

impl Pid {
    /// Accumulated integral of the position error, in count-seconds.
    pub fn integral(&self) -> i64 {
        self.integral
    }
}

impl ControlLaw for Pid {
    fn reset(&mut self) {
        self.integral = 0;
        self.last = None;
    }

    fn update(&mut self, now: Micros, tracking: Tracking, limits: &ControlLimits) -> i32 {
        let dt = self.last.map_or(0, |last| now - last);
        self.last = Some(now);

        let proportional = limits.pid_kp as i64 * tracking.count_error;
        let derivative = limits.pid_kd as i64 * tracking.rate_error;
        let integral = self.integral + timest(tracking.count_error, dt);

        let duty = (proportional + limits.pid_ki as i64 * integral + derivative) / GAIN_SCALE;
        let max = MAX_DUTY as i64;

        // Integrate only while unsaturated
        if duty.abs() < max {
            self.integral = integral;
        }
        duty.clamp(-max, max) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MotorSettings;

    fn limits() -> ControlLimits {
        ControlLimits::derive(&MotorSettings::default(), 1.0)
    }

    #[test]
    fn test_proportional_and_derivative() {
        let mut pid = Pid::default();
        let duty = pid.update(
            0,
            Tracking {
                count_error: 10,
                rate_error: 100,
            },
            &limits(),
        );
        // (800 * 10 + 5 * 100) / 100, no integral on the first sample
        assert_eq!(duty, 85);
    }

    #[test]
    fn test_integral_accumulates_and_resets() {
        let mut pid = Pid::default();
        let l = limits();
        let err = Tracking {
            count_error: 100,
            rate_error: 0,
        };

        pid.update(0, err, &l);
        pid.update(500_000, err, &l);
        assert_eq!(pid.integral(), 50);

        pid.reset();
        assert_eq!(pid.integral(), 0);
    }

    #[test]
    fn test_saturation_stops_windup() {
        let mut pid = Pid::default();
        let l = limits();
        let err = Tracking {
            count_error: 50_000,
            rate_error: 0,
        };

        assert_eq!(pid.update(0, err, &l), MAX_DUTY);
        assert_eq!(pid.update(1_000_000, err, &l), MAX_DUTY);
        assert_eq!(pid.integral(), 0);

        let duty = pid.update(
            2_000_000,
            Tracking {
                count_error: -50_000,
                rate_error: 0,
            },
            &l,
        );
        assert_eq!(duty, -MAX_DUTY);
    }
}
