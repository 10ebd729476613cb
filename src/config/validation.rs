//! Configuration validation.

use heapless::String;

use crate::error::{ConfigError, Error, Result};

use super::settings::MotorSettings;
use super::units::Port;
use super::{PortConfig, SystemConfig};

/// Validate a system configuration.
///
/// Checks:
/// - Port names are motor ports and each physical port appears once
/// - Calibration ratios are positive
/// - Motor settings are in range
/// - The drivebase pairs two distinct configured ports with positive geometry
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    let mut seen = [false; super::units::NUM_MOTOR_PORTS];

    for (name, port_config) in config.ports.iter() {
        let port = Port::from_name(name.as_str())
            .ok_or_else(|| Error::Config(ConfigError::InvalidPortName(name.clone())))?;
        if core::mem::replace(&mut seen[port.index()], true) {
            return Err(Error::Config(ConfigError::DuplicatePort(name.clone())));
        }
        validate_port(port_config)?;
    }

    if let Some(ref db) = config.drivebase {
        let (left, right) = config
            .drivebase_ports()
            .ok_or(Error::Config(ConfigError::InvalidDrivebase))?;
        if left == right || config.port(left).is_none() || config.port(right).is_none() {
            return Err(Error::Config(ConfigError::InvalidDrivebase));
        }
        for v in [db.wheel_diameter, db.axle_track] {
            if !(v > 0.0) {
                return Err(Error::Config(ConfigError::InvalidGeometry(v)));
            }
        }
    }

    Ok(())
}

/// Validate a single port's calibration and settings.
pub fn validate_port(config: &PortConfig) -> Result<()> {
    // Gear ratio must be positive
    if !(config.gear_ratio > 0.0) {
        return Err(Error::Config(ConfigError::InvalidGearRatio(config.gear_ratio)));
    }

    if !(config.counts_per_unit > 0.0) {
        return Err(Error::Config(ConfigError::InvalidCountsPerUnit(
            config.counts_per_unit,
        )));
    }

    validate_settings(&config.settings)
}

/// Validate motor settings ranges.
pub fn validate_settings(settings: &MotorSettings) -> Result<()> {
    let invalid = |name: &'static str, value: i32| {
        Err(Error::Config(ConfigError::InvalidSetting { name, value }))
    };

    if !(1..=100).contains(&settings.stall_torque_limit) {
        return invalid("stall_torque_limit_pct", settings.stall_torque_limit as i32);
    }
    if settings.max_speed <= 0 {
        return invalid("max_speed", settings.max_speed);
    }
    if settings.acceleration_start <= 0 {
        return invalid("acceleration_start", settings.acceleration_start);
    }
    if settings.acceleration_end <= 0 {
        return invalid("acceleration_end", settings.acceleration_end);
    }

    let non_negative = [
        ("stall_speed_limit", settings.stall_speed_limit),
        ("stall_time_ms", settings.stall_time as i32),
        ("speed_tolerance", settings.speed_tolerance),
        ("position_tolerance", settings.position_tolerance),
        ("tight_loop_time_ms", settings.tight_loop_time),
        ("pid_kp", settings.pid_kp as i32),
        ("pid_ki", settings.pid_ki as i32),
        ("pid_kd", settings.pid_kd as i32),
    ];
    for (name, value) in non_negative {
        if value < 0 {
            return invalid(name, value);
        }
    }

    Ok(())
}
