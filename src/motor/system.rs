//! Motor system facade and control-tick poller.
//!
//! Owns one [`Servo`] and one control law per port plus the optional
//! drivebase, and advances all of them once per control tick.

use crate::config::{
    validate_config, MotorSettings, Port, PortMap, SettingsReport, SystemConfig, NUM_MOTOR_PORTS,
};
use crate::device::MotorHardware;
use crate::error::{ConfigError, Error, Result};
use crate::motion::Micros;

use super::control::{ControlLaw, Pid};
use super::drivebase::Drivebase;
use super::servo::{Command, Servo};

/// All servos of a controller plus the optional drivebase.
///
/// # Example
///
/// ```rust,ignore
/// use servo_motion::{MotorSystem, Port, Command};
///
/// let config = servo_motion::load_config("ports.toml")?;
/// let mut system: MotorSystem = MotorSystem::from_config(&config)?;
///
/// system.command(&mut hw, Port::A, clock.now(), Command::run(360))?;
/// loop {
///     system.poll(&mut hw, clock.now());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MotorSystem<L = Pid, const N: usize = NUM_MOTOR_PORTS> {
    servos: PortMap<Servo, N>,
    laws: PortMap<L, N>,
    drivebase: Option<Drivebase>,
}

impl<L: ControlLaw + Default, const N: usize> MotorSystem<L, N> {
    /// System with every servo disconnected and default settings.
    pub fn new() -> Self {
        Self {
            servos: PortMap::from_fn(Servo::new),
            laws: PortMap::from_fn(|_| L::default()),
            drivebase: None,
        }
    }

    /// Build from a configuration. Configured ports start connected.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or names a port this
    /// system has no slot for.
    pub fn from_config(config: &SystemConfig) -> Result<Self> {
        validate_config(config)?;

        let mut system = Self::new();
        for (name, port_config) in config.ports.iter() {
            let port = Port::from_name(name.as_str())
                .ok_or_else(|| Error::Config(ConfigError::InvalidPortName(name.clone())))?;
            *system.servos.get_mut(port)? = Servo::from_config(port, port_config);
        }

        if let Some(db) = Drivebase::from_config(config) {
            let (left, right) = db.ports();
            system.servos.get(left)?;
            system.servos.get(right)?;
            system.drivebase = Some(db);
        }

        info!("motor system ready, {} ports", system.connected_count());
        Ok(system)
    }
}

impl<L: ControlLaw + Default, const N: usize> Default for MotorSystem<L, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ControlLaw, const N: usize> MotorSystem<L, N> {
    /// Servo on a port.
    pub fn servo(&self, port: Port) -> Result<&Servo> {
        Ok(self.servos.get(port)?)
    }

    /// Servo on a port, mutably.
    pub fn servo_mut(&mut self, port: Port) -> Result<&mut Servo> {
        Ok(self.servos.get_mut(port)?)
    }

    /// Iterate over all servos.
    pub fn servos(&self) -> impl Iterator<Item = (Port, &Servo)> {
        self.servos.iter()
    }

    /// Number of servos the poller currently services.
    pub fn connected_count(&self) -> usize {
        self.servos.iter().filter(|(_, s)| s.is_connected()).count()
    }

    /// The drivebase, if configured.
    pub fn drivebase(&self) -> Option<&Drivebase> {
        self.drivebase.as_ref()
    }

    /// Pair two servos as the drivebase, replacing any existing one.
    pub fn set_drivebase(&mut self, drivebase: Drivebase) -> Result<()> {
        let (left, right) = drivebase.ports();
        if left == right {
            return Err(Error::Config(ConfigError::InvalidDrivebase));
        }
        self.servos.get(left)?;
        self.servos.get(right)?;
        self.drivebase = Some(drivebase);
        Ok(())
    }

    /// Issue a command to one servo.
    pub fn command<H>(&mut self, hw: &mut H, port: Port, now: Micros, command: Command) -> Result<()>
    where
        H: MotorHardware + ?Sized,
    {
        self.servos.get_mut(port)?.command(hw, now, command)
    }

    /// Replace a servo's settings.
    pub fn set_settings(&mut self, port: Port, settings: MotorSettings) -> Result<()> {
        self.servos.get_mut(port)?.set_settings(settings)
    }

    /// Diagnostic dump of a servo's calibration and limits.
    pub fn settings_report(&self, port: Port) -> Result<SettingsReport<'_>> {
        Ok(self.servos.get(port)?.settings_report())
    }

    /// Bring a disconnected servo back into the poll loop.
    pub fn reconnect(&mut self, port: Port) -> Result<()> {
        self.servos.get_mut(port)?.reconnect();
        info!("port {} reconnected", port);
        Ok(())
    }

    /// One control tick.
    ///
    /// Updates every connected servo, disconnecting any whose update fails
    /// without affecting the others. The drivebase is updated last, and only
    /// if both of its servos are still connected.
    pub fn poll<H>(&mut self, hw: &mut H, now: Micros)
    where
        H: MotorHardware + ?Sized,
    {
        for ((port, servo), (_, law)) in self.servos.iter_mut().zip(self.laws.iter_mut()) {
            if !servo.is_connected() {
                continue;
            }
            if let Err(e) = servo.control_update(hw, law, now) {
                warn!("port {} disconnected: {}", port, e);
                servo.disconnect();
            }
        }

        if let Some(db) = self.drivebase.as_mut() {
            let (left, right) = db.ports();
            if let (Ok(l), Ok(r)) = (self.servos.get(left), self.servos.get(right)) {
                if l.is_connected() && r.is_connected() {
                    db.update(l, r);
                }
            }
        }
    }
}
