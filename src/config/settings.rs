//! Per-port control settings.
//!
//! [`MotorSettings`] is the user-facing record (user units, milliseconds).
//! [`ControlLimits`] is derived from it and the port calibration and is what
//! trajectory synthesis and the control update actually read.

use core::fmt;

use serde::Deserialize;

use crate::motion::US_PER_MS;

/// Maximum length of a rendered settings report.
pub const MAX_SETTINGS_STR_LENGTH: usize = 400;

/// Control settings for one motor port, in user units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MotorSettings {
    /// Torque limit while detecting stalls, percent of full duty (1-100).
    #[serde(rename = "stall_torque_limit_pct")]
    pub stall_torque_limit: i16,

    /// Speed below which the motor may be considered stalled.
    pub stall_speed_limit: i32,

    /// Time the stall condition must persist, in milliseconds.
    #[serde(rename = "stall_time_ms")]
    pub stall_time: i16,

    /// Allowed speed error.
    pub speed_tolerance: i32,

    /// Maximum speed of any maneuver.
    pub max_speed: i32,

    /// Allowed position error.
    pub position_tolerance: i32,

    /// Acceleration magnitude used when speeding up.
    pub acceleration_start: i32,

    /// Acceleration magnitude used when slowing down.
    pub acceleration_end: i32,

    /// RUN commands closer together than this skip re-synthesis, in milliseconds.
    #[serde(rename = "tight_loop_time_ms")]
    pub tight_loop_time: i32,

    /// Proportional gain.
    pub pid_kp: i16,

    /// Integral gain.
    pub pid_ki: i16,

    /// Derivative gain.
    pub pid_kd: i16,
}

impl Default for MotorSettings {
    fn default() -> Self {
        Self {
            stall_torque_limit: 100,
            stall_speed_limit: 2,
            stall_time: 500,
            speed_tolerance: 5,
            max_speed: 1000,
            position_tolerance: 1,
            acceleration_start: 1000,
            acceleration_end: 1000,
            tight_loop_time: 100,
            pid_kp: 800,
            pid_ki: 800,
            pid_kd: 5,
        }
    }
}

/// Control limits in encoder counts and microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlLimits {
    /// Torque limit while detecting stalls, percent.
    pub stall_torque_limit: i16,
    /// Stall speed threshold (counts/s).
    pub stall_rate_limit: i64,
    /// Stall persistence time (µs).
    pub stall_time: i64,
    /// Speed tolerance (counts/s).
    pub rate_tolerance: i64,
    /// Maximum speed (counts/s).
    pub max_rate: i64,
    /// Position tolerance (counts).
    pub count_tolerance: i64,
    /// Acceleration magnitude (counts/s²).
    pub abs_accl_start: i64,
    /// Deceleration magnitude (counts/s²).
    pub abs_accl_end: i64,
    /// Tight loop threshold (µs).
    pub tight_loop_time: i64,
    /// Proportional gain.
    pub pid_kp: i16,
    /// Integral gain.
    pub pid_ki: i16,
    /// Derivative gain.
    pub pid_kd: i16,
}

impl ControlLimits {
    /// Derive count-based limits from user settings and the output scale.
    pub fn derive(settings: &MotorSettings, counts_per_output_unit: f32) -> Self {
        let scale = |v: i32| (counts_per_output_unit * v as f32) as i64;
        Self {
            stall_torque_limit: settings.stall_torque_limit,
            stall_rate_limit: scale(settings.stall_speed_limit),
            stall_time: settings.stall_time as i64 * US_PER_MS,
            rate_tolerance: scale(settings.speed_tolerance),
            max_rate: scale(settings.max_speed),
            count_tolerance: scale(settings.position_tolerance),
            abs_accl_start: scale(settings.acceleration_start),
            abs_accl_end: scale(settings.acceleration_end),
            tight_loop_time: settings.tight_loop_time as i64 * US_PER_MS,
            pid_kp: settings.pid_kp,
            pid_ki: settings.pid_ki,
            pid_kd: settings.pid_kd,
        }
    }
}

/// Human-readable dump of a port's calibration and limits.
///
/// Ratios print with three decimals; limits are converted back to user units.
/// Meant for diagnostics, not for parsing.
#[derive(Debug, Clone, Copy)]
pub struct SettingsReport<'a> {
    /// Encoder counts per user unit at the motor shaft.
    pub counts_per_unit: f32,
    /// Encoder counts per user unit at the output, gear ratio included.
    pub counts_per_output_unit: f32,
    /// Derived limits to report.
    pub limits: &'a ControlLimits,
}

impl SettingsReport<'_> {
    /// Render into a fixed-capacity string.
    pub fn render(&self) -> heapless::String<MAX_SETTINGS_STR_LENGTH> {
        use core::fmt::Write;
        let mut out = heapless::String::new();
        // Truncation on overflow is acceptable for a diagnostic string
        let _ = write!(out, "{}", self);
        out
    }
}

struct Fixed3(f32);

impl fmt::Display for Fixed3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 as i32;
        let frac = (self.0 * 1000.0 - (whole * 1000) as f32) as i32;
        write!(f, "{}.{:03}", whole, frac.abs())
    }
}

impl fmt::Display for SettingsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cpou = self.counts_per_output_unit;
        let user = |counts: i64| (counts as f32 / cpou) as i32;
        let l = self.limits;
        writeln!(f, "Counts per unit\t {}", Fixed3(self.counts_per_unit))?;
        writeln!(f, "Gear ratio\t {}", Fixed3(cpou / self.counts_per_unit))?;
        writeln!(f, "Stall speed\t {}", user(l.stall_rate_limit))?;
        writeln!(f, "Stall time\t {}", l.stall_time / US_PER_MS)?;
        writeln!(f, "Speed tolerance\t {}", user(l.rate_tolerance))?;
        writeln!(f, "Max speed\t {}", user(l.max_rate))?;
        writeln!(f, "Angle tolerance\t {}", user(l.count_tolerance))?;
        writeln!(f, "Acceleration\t {}", user(l.abs_accl_start))?;
        writeln!(f, "Deceleration\t {}", user(l.abs_accl_end))?;
        writeln!(f, "Tight Loop\t {}", l.tight_loop_time / US_PER_MS)?;
        writeln!(f, "kp\t\t {}", l.pid_kp)?;
        writeln!(f, "ki\t\t {}", l.pid_ki)?;
        write!(f, "kd\t\t {}", l.pid_kd)
    }
}
