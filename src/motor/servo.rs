//! Per-port servo: command dispatch and control update.
//!
//! A [`Servo`] owns everything about one motor port: calibration, settings,
//! derived limits, the active trajectory and the control activity. Commands
//! replace the trajectory; the control update follows it once per tick.

use crate::config::{validate_settings, ControlLimits, MotorSettings, Port, PortConfig, SettingsReport};
use crate::device::{MotorHardware, MAX_DUTY};
use crate::error::{DeviceError, MotionError, Result};
use crate::motion::{
    synth, wdiva, Accel, Action, AfterStop, Counts, Micros, Rate, Reference, Trajectory, US_PER_MS,
    US_PER_SECOND,
};

use super::control::{ControlLaw, Tracking};
use super::encoder::EncoderScale;
use super::state::Activity;

/// Shortest nominal duration given to RUN and RUN_STALLED so the time-based
/// solver yields their acceleration phase. Their cruise never ends regardless.
///
/// Slow accelerations get a longer duration, see [`unbounded_run_duration`].
pub const UNBOUNDED_RUN_MS: i64 = 30_000;

/// Nominal duration for an unbounded run from `w0` towards `wt`.
///
/// Long enough to reverse out of `w0`, reach `wt` and still leave room to
/// cruise, so the profile is never cut down to a triangle.
pub fn unbounded_run_duration(w0: Rate, wt: Rate, a: Accel) -> Micros {
    let reach = wdiva(2 * (wt.abs() + w0.abs()), a) + US_PER_SECOND;
    reach.max(UNBOUNDED_RUN_MS * US_PER_MS)
}

/// A motor command in user units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command {
    /// What to do.
    pub action: Action,
    /// Signed speed in user units per second.
    pub speed: i32,
    /// Duration in milliseconds for RUN_TIME, relative angle for RUN_ANGLE,
    /// absolute target for RUN_TARGET and TRACK_TARGET; unused otherwise.
    pub duration_or_target: i32,
    /// What to do once the maneuver ends.
    pub after_stop: AfterStop,
}

impl Command {
    /// Run at constant speed until the next command.
    pub fn run(speed: i32) -> Self {
        Self {
            action: Action::Run,
            speed,
            duration_or_target: 0,
            after_stop: AfterStop::Coast,
        }
    }

    /// Run at `speed` for `duration_ms`.
    pub fn run_time(speed: i32, duration_ms: i32, after_stop: AfterStop) -> Self {
        Self {
            action: Action::RunTime,
            speed,
            duration_or_target: duration_ms,
            after_stop,
        }
    }

    /// Run at `speed` until the motor stalls.
    pub fn run_stalled(speed: i32, after_stop: AfterStop) -> Self {
        Self {
            action: Action::RunStalled,
            speed,
            duration_or_target: 0,
            after_stop,
        }
    }

    /// Turn by `angle`; a negative speed reverses the direction.
    pub fn run_angle(speed: i32, angle: i32, after_stop: AfterStop) -> Self {
        Self {
            action: Action::RunAngle,
            speed,
            duration_or_target: angle,
            after_stop,
        }
    }

    /// Go to absolute `target` at `speed` (magnitude only).
    pub fn run_target(speed: i32, target: i32, after_stop: AfterStop) -> Self {
        Self {
            action: Action::RunTarget,
            speed,
            duration_or_target: target,
            after_stop,
        }
    }

    /// Hold absolute `target` until the next command.
    pub fn track_target(target: i32) -> Self {
        Self {
            action: Action::TrackTarget,
            speed: 0,
            duration_or_target: target,
            after_stop: AfterStop::Hold,
        }
    }
}

/// Latest measurements and outputs of a servo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServoStatus {
    /// Calibrated count.
    pub count: Counts,
    /// Calibrated rate.
    pub rate: Rate,
    /// Applied duty cycle.
    pub duty: i32,
    /// Reference that was tracked.
    pub reference: Reference,
}

/// One encoded motor port under trajectory control.
#[derive(Debug, Clone)]
pub struct Servo {
    port: Port,
    scale: EncoderScale,
    settings: MotorSettings,
    limits: ControlLimits,
    trajectory: Trajectory,
    activity: Activity,
    connected: bool,
    stall_since: Option<Micros>,
    status: ServoStatus,
}

impl Servo {
    /// Unconfigured, disconnected servo with default settings.
    pub fn new(port: Port) -> Self {
        let scale = EncoderScale::default();
        let settings = MotorSettings::default();
        Self {
            port,
            scale,
            settings,
            limits: ControlLimits::derive(&settings, scale.counts_per_output_unit()),
            trajectory: Trajectory::default(),
            activity: Activity::Idle,
            connected: false,
            stall_since: None,
            status: ServoStatus::default(),
        }
    }

    /// Connected servo calibrated from configuration.
    pub fn from_config(port: Port, config: &PortConfig) -> Self {
        Self {
            scale: EncoderScale::from_config(config),
            settings: config.settings,
            limits: config.limits(),
            connected: true,
            ..Self::new(port)
        }
    }

    /// Apply configuration and zero the encoder at the current position.
    pub fn setup<H>(&mut self, hw: &mut H, config: &PortConfig) -> core::result::Result<(), DeviceError>
    where
        H: MotorHardware + ?Sized,
    {
        let mut configured = Self::from_config(self.port, config);
        configured.reset_count(hw, 0)?;
        *self = configured;
        Ok(())
    }

    /// Port this servo drives.
    #[inline]
    pub fn port(&self) -> Port {
        self.port
    }

    /// Encoder calibration.
    #[inline]
    pub fn scale(&self) -> &EncoderScale {
        &self.scale
    }

    /// User settings.
    #[inline]
    pub fn settings(&self) -> &MotorSettings {
        &self.settings
    }

    /// Limits derived from the settings.
    #[inline]
    pub fn limits(&self) -> &ControlLimits {
        &self.limits
    }

    /// Active trajectory.
    #[inline]
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Control activity.
    #[inline]
    pub fn activity(&self) -> Activity {
        self.activity
    }

    /// Whether the poller services this servo.
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Latest measurements from the control update.
    #[inline]
    pub fn status(&self) -> &ServoStatus {
        &self.status
    }

    /// Replace the settings and recompute the derived limits.
    ///
    /// # Errors
    ///
    /// Rejects out-of-range settings and leaves the current ones in place.
    pub fn set_settings(&mut self, settings: MotorSettings) -> Result<()> {
        validate_settings(&settings)?;
        self.settings = settings;
        self.limits = ControlLimits::derive(&settings, self.scale.counts_per_output_unit());
        Ok(())
    }

    /// Diagnostic dump of calibration and limits.
    pub fn settings_report(&self) -> SettingsReport<'_> {
        SettingsReport {
            counts_per_unit: self.scale.counts_per_unit(),
            counts_per_output_unit: self.scale.counts_per_output_unit(),
            limits: &self.limits,
        }
    }

    /// Stop servicing this servo until [`reconnect`](Self::reconnect).
    pub fn disconnect(&mut self) {
        self.connected = false;
        self.activity = Activity::Errored;
    }

    /// Resume servicing this servo, idle.
    pub fn reconnect(&mut self) {
        self.connected = true;
        self.activity = Activity::Idle;
        self.stall_since = None;
    }

    /// Calibrated count.
    pub fn get_count<H>(&self, hw: &mut H) -> core::result::Result<Counts, DeviceError>
    where
        H: MotorHardware + ?Sized,
    {
        self.scale.get_count(hw, self.port)
    }

    /// Make the current position read as `count`. Coasts and ends any maneuver.
    pub fn reset_count<H>(&mut self, hw: &mut H, count: Counts) -> core::result::Result<(), DeviceError>
    where
        H: MotorHardware + ?Sized,
    {
        self.scale.reset_count(hw, self.port, count)?;
        self.activity = Activity::Idle;
        Ok(())
    }

    /// Calibrated angle in output units.
    pub fn get_angle<H>(&self, hw: &mut H) -> core::result::Result<i64, DeviceError>
    where
        H: MotorHardware + ?Sized,
    {
        self.scale.get_angle(hw, self.port)
    }

    /// Make the current position read as `angle`. Coasts and ends any maneuver.
    pub fn reset_angle<H>(&mut self, hw: &mut H, angle: i32) -> core::result::Result<(), DeviceError>
    where
        H: MotorHardware + ?Sized,
    {
        self.scale.reset_angle(hw, self.port, angle)?;
        self.activity = Activity::Idle;
        Ok(())
    }

    /// Calibrated rate in counts per second.
    pub fn get_rate<H>(&self, hw: &mut H) -> core::result::Result<Rate, DeviceError>
    where
        H: MotorHardware + ?Sized,
    {
        self.scale.get_rate(hw, self.port)
    }

    /// Rate in output units per second.
    pub fn get_angular_rate<H>(&self, hw: &mut H) -> core::result::Result<i64, DeviceError>
    where
        H: MotorHardware + ?Sized,
    {
        self.scale.get_angular_rate(hw, self.port)
    }

    /// Whether this port has an encoder.
    pub fn has_encoder<H>(&self, hw: &mut H) -> core::result::Result<bool, DeviceError>
    where
        H: MotorHardware + ?Sized,
    {
        self.scale.has_encoder(hw, self.port)
    }

    /// Start a new maneuver, superseding the current one.
    ///
    /// Nothing is modified on error: a rejected argument, a failed sensor
    /// read or a failed synthesis all leave the previous trajectory and
    /// activity in place.
    pub fn command<H>(&mut self, hw: &mut H, now: Micros, command: Command) -> Result<()>
    where
        H: MotorHardware + ?Sized,
    {
        let previous = self.trajectory;
        let active = self.activity.is_active();
        let speed = self.scale.to_counts(command.speed);

        match command.action {
            Action::None => return Err(MotionError::InvalidArgument("no action").into()),
            Action::Run
                if previous.action == Action::Run
                    && self.activity.is_engaged()
                    && now - previous.t0 < self.limits.tight_loop_time =>
            {
                // Repeated RUN: restart from the current reference, no synthesis
                let reference = previous.reference(now);
                let speed = speed.clamp(-self.limits.max_rate, self.limits.max_rate);
                self.trajectory = Trajectory::none(now, reference.count, speed)
                    .with_action(Action::Run, command.after_stop);
                trace!("port {}: tight loop run", self.port);
                return Ok(());
            }
            Action::TrackTarget => {
                let target = self.scale.to_counts(command.duration_or_target);
                self.trajectory = Trajectory::none(now, target, 0)
                    .with_action(Action::TrackTarget, command.after_stop);
                self.activity = if previous.action == Action::TrackTarget && active {
                    Activity::Running
                } else {
                    Activity::Starting
                };
                self.stall_since = None;
                debug!("port {}: track target, {}", self.port, self.activity);
                return Ok(());
            }
            _ => {}
        }

        // Position-bounded maneuvers always start from the measured state
        let continuing = active && !matches!(command.action, Action::RunAngle | Action::RunTarget);
        let start = if continuing {
            previous.reference(now)
        } else {
            Reference {
                count: self.scale.get_count(hw, self.port)?,
                rate: self.scale.get_rate(hw, self.port)?,
            }
        };

        let max_rate = self.limits.max_rate;
        let accel = self.limits.abs_accl_start;
        let trajectory = match command.action {
            Action::Run | Action::RunStalled | Action::RunTime => {
                let duration = if command.action == Action::RunTime {
                    command.duration_or_target as i64 * US_PER_MS
                } else {
                    unbounded_run_duration(start.rate, speed, accel)
                };
                synth::time_based(
                    now,
                    now + duration,
                    start.count,
                    start.rate,
                    speed,
                    max_rate,
                    accel,
                )
            }
            _ => {
                let target = if command.action == Action::RunTarget {
                    self.scale.to_counts(command.duration_or_target)
                } else {
                    // Negative speed reverses the meaning of the angle
                    let relative = if command.speed > 0 {
                        command.duration_or_target
                    } else {
                        -command.duration_or_target
                    };
                    start.count + self.scale.to_counts(relative)
                };
                synth::angle_based(now, start.count, target, start.rate, speed, max_rate, accel)
            }
        }
        .map_err(|e| {
            warn!("port {}: {} rejected: {}", self.port, command.action, e);
            e
        })?;

        self.trajectory = trajectory.with_action(command.action, command.after_stop);
        self.activity = if continuing {
            Activity::Restarting
        } else {
            Activity::Starting
        };
        self.stall_since = None;
        debug!("port {}: {} -> {}", self.port, command.action, self.activity);
        Ok(())
    }

    /// Run at constant speed until the next command.
    pub fn run<H: MotorHardware + ?Sized>(&mut self, hw: &mut H, now: Micros, speed: i32) -> Result<()> {
        self.command(hw, now, Command::run(speed))
    }

    /// Run at `speed` for `duration_ms`.
    pub fn run_time<H: MotorHardware + ?Sized>(
        &mut self,
        hw: &mut H,
        now: Micros,
        speed: i32,
        duration_ms: i32,
        after_stop: AfterStop,
    ) -> Result<()> {
        self.command(hw, now, Command::run_time(speed, duration_ms, after_stop))
    }

    /// Run at `speed` until the motor stalls.
    pub fn run_stalled<H: MotorHardware + ?Sized>(
        &mut self,
        hw: &mut H,
        now: Micros,
        speed: i32,
        after_stop: AfterStop,
    ) -> Result<()> {
        self.command(hw, now, Command::run_stalled(speed, after_stop))
    }

    /// Turn by `angle` output units.
    pub fn run_angle<H: MotorHardware + ?Sized>(
        &mut self,
        hw: &mut H,
        now: Micros,
        speed: i32,
        angle: i32,
        after_stop: AfterStop,
    ) -> Result<()> {
        self.command(hw, now, Command::run_angle(speed, angle, after_stop))
    }

    /// Go to absolute `target` output units.
    pub fn run_target<H: MotorHardware + ?Sized>(
        &mut self,
        hw: &mut H,
        now: Micros,
        speed: i32,
        target: i32,
        after_stop: AfterStop,
    ) -> Result<()> {
        self.command(hw, now, Command::run_target(speed, target, after_stop))
    }

    /// Hold absolute `target` output units until the next command.
    pub fn track_target<H: MotorHardware + ?Sized>(
        &mut self,
        hw: &mut H,
        now: Micros,
        target: i32,
    ) -> Result<()> {
        self.command(hw, now, Command::track_target(target))
    }

    /// Stop immediately: coast, brake, or hold the current position.
    pub fn stop<H>(&mut self, hw: &mut H, now: Micros, after_stop: AfterStop) -> core::result::Result<(), DeviceError>
    where
        H: MotorHardware + ?Sized,
    {
        match after_stop {
            AfterStop::Coast => {
                hw.coast(self.port)?;
                self.activity = Activity::Idle;
            }
            AfterStop::Brake => {
                hw.brake(self.port)?;
                self.activity = Activity::Idle;
            }
            AfterStop::Hold => {
                let count = self.scale.get_count(hw, self.port)?;
                self.trajectory = Trajectory::none(now, count, 0).with_action(Action::None, AfterStop::Hold);
                self.activity = if self.activity.is_active() {
                    Activity::Holding
                } else {
                    Activity::Starting
                };
            }
        }
        self.stall_since = None;
        Ok(())
    }

    /// One control tick: sample the encoder, follow the trajectory and drive
    /// the motor.
    ///
    /// # Errors
    ///
    /// Any sensor or actuator failure. The poller disconnects the servo.
    pub fn control_update<H, L>(&mut self, hw: &mut H, law: &mut L, now: Micros) -> core::result::Result<(), DeviceError>
    where
        H: MotorHardware + ?Sized,
        L: ControlLaw + ?Sized,
    {
        let count = self.scale.get_count(hw, self.port)?;
        let rate = self.scale.get_rate(hw, self.port)?;
        self.status.count = count;
        self.status.rate = rate;

        match self.activity {
            Activity::Idle | Activity::Stalled | Activity::Errored => {
                self.status.duty = 0;
                return Ok(());
            }
            Activity::Starting => {
                law.reset();
                self.activity = Activity::Running;
            }
            Activity::Restarting => self.activity = Activity::Running,
            Activity::Running | Activity::Holding => {}
        }

        if self.activity == Activity::Running && self.trajectory.is_done(now) {
            debug!("port {}: {} complete", self.port, self.trajectory.action);
            if self.finish(hw, now, count)? {
                return Ok(());
            }
        }

        let reference = self.trajectory.reference(now);
        let duty_limit = self.limits.stall_torque_limit as i32 * MAX_DUTY / 100;
        let tracking = Tracking {
            count_error: reference.count - count,
            rate_error: reference.rate - rate,
        };
        let duty = law.update(now, tracking, &self.limits).clamp(-duty_limit, duty_limit);
        self.status.reference = reference;

        if self.activity == Activity::Running && self.stalled(now, duty, duty_limit, rate) {
            warn!("port {}: stalled during {}", self.port, self.trajectory.action);
            if self.trajectory.action == Action::RunStalled {
                self.finish(hw, now, count)?;
            } else {
                hw.coast(self.port)?;
                self.activity = Activity::Stalled;
                self.status.duty = 0;
            }
            return Ok(());
        }

        // Duty is computed in calibrated counts; the bridge sees raw sense
        hw.set_duty(self.port, duty * self.scale.direction().sign() as i32)?;
        self.status.duty = duty;
        Ok(())
    }

    /// Apply the after-stop policy. Returns `true` if the motor was released.
    fn finish<H>(&mut self, hw: &mut H, now: Micros, count: Counts) -> core::result::Result<bool, DeviceError>
    where
        H: MotorHardware + ?Sized,
    {
        self.stall_since = None;
        match self.trajectory.after_stop {
            AfterStop::Coast => hw.coast(self.port)?,
            AfterStop::Brake => hw.brake(self.port)?,
            AfterStop::Hold => {
                if self.trajectory.action.is_unbounded() {
                    // No end position to hold; keep where it stopped
                    self.trajectory = Trajectory::none(now, count, 0).with_action(Action::None, AfterStop::Hold);
                }
                self.activity = Activity::Holding;
                return Ok(false);
            }
        }
        self.activity = Activity::Idle;
        self.status.duty = 0;
        Ok(true)
    }

    /// Track how long the output has been saturated without moving.
    fn stalled(&mut self, now: Micros, duty: i32, duty_limit: i32, rate: Rate) -> bool {
        if duty.abs() < duty_limit || rate.abs() >= self.limits.stall_rate_limit {
            self.stall_since = None;
            return false;
        }
        let since = *self.stall_since.get_or_insert(now);
        now - since >= self.limits.stall_time
    }
}
