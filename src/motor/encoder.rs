//! Encoder unit conversion.
//!
//! Raw counts are corrected for the configured direction and shifted by a
//! zero offset. Angles and angular rates are counts scaled by the output
//! ratio (gearing included), truncated toward zero.

use crate::config::units::{from_counts, to_counts};
use crate::config::{Direction, Port, PortConfig};
use crate::device::MotorHardware;
use crate::error::DeviceError;
use crate::motion::{Counts, Rate};

/// Calibration of one encoded port.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncoderScale {
    direction: Direction,
    counts_per_unit: f32,
    counts_per_output_unit: f32,
    offset: Counts,
}

impl Default for EncoderScale {
    fn default() -> Self {
        Self::new(Direction::Clockwise, 1.0, 1.0)
    }
}

impl EncoderScale {
    /// Scale with zero offset.
    pub fn new(direction: Direction, counts_per_unit: f32, gear_ratio: f32) -> Self {
        Self {
            direction,
            counts_per_unit,
            counts_per_output_unit: counts_per_unit * gear_ratio,
            offset: 0,
        }
    }

    /// Scale from a port configuration.
    pub fn from_config(config: &PortConfig) -> Self {
        Self::new(config.direction, config.counts_per_unit, config.gear_ratio)
    }

    /// Configured direction.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Counts per user unit at the motor shaft.
    #[inline]
    pub fn counts_per_unit(&self) -> f32 {
        self.counts_per_unit
    }

    /// Counts per user unit at the output.
    #[inline]
    pub fn counts_per_output_unit(&self) -> f32 {
        self.counts_per_output_unit
    }

    /// Current zero offset in direction-corrected counts.
    #[inline]
    pub fn offset(&self) -> Counts {
        self.offset
    }

    /// User units to counts at the output.
    #[inline]
    pub fn to_counts(&self, value: i32) -> Counts {
        to_counts(value, self.counts_per_output_unit)
    }

    /// Counts to user units at the output.
    #[inline]
    pub fn from_counts(&self, counts: Counts) -> i64 {
        from_counts(counts, self.counts_per_output_unit)
    }

    /// Calibrated count: raw count times direction sign, minus the offset.
    pub fn get_count<H>(&self, hw: &mut H, port: Port) -> Result<Counts, DeviceError>
    where
        H: MotorHardware + ?Sized,
    {
        Ok(hw.encoder_count(port)? * self.direction.sign() - self.offset)
    }

    /// Make the current position read as `count`.
    ///
    /// The motor is coasted before the raw count is sampled, so the offset is
    /// latched against a motor that is no longer driven.
    pub fn reset_count<H>(&mut self, hw: &mut H, port: Port, count: Counts) -> Result<(), DeviceError>
    where
        H: MotorHardware + ?Sized,
    {
        hw.coast(port)?;
        let unbiased = hw.encoder_count(port)? * self.direction.sign();
        self.offset = unbiased - count;
        Ok(())
    }

    /// Calibrated angle in output units.
    pub fn get_angle<H>(&self, hw: &mut H, port: Port) -> Result<i64, DeviceError>
    where
        H: MotorHardware + ?Sized,
    {
        Ok(self.from_counts(self.get_count(hw, port)?))
    }

    /// Make the current position read as `angle` output units.
    pub fn reset_angle<H>(&mut self, hw: &mut H, port: Port, angle: i32) -> Result<(), DeviceError>
    where
        H: MotorHardware + ?Sized,
    {
        let count = self.to_counts(angle);
        self.reset_count(hw, port, count)
    }

    /// Direction-corrected rate in counts per second. Rates carry no offset.
    pub fn get_rate<H>(&self, hw: &mut H, port: Port) -> Result<Rate, DeviceError>
    where
        H: MotorHardware + ?Sized,
    {
        Ok(hw.encoder_rate(port)? * self.direction.sign())
    }

    /// Rate in output units per second.
    pub fn get_angular_rate<H>(&self, hw: &mut H, port: Port) -> Result<i64, DeviceError>
    where
        H: MotorHardware + ?Sized,
    {
        Ok(self.from_counts(self.get_rate(hw, port)?))
    }

    /// Whether the port has an encoder at all.
    ///
    /// `NoDevice` answers `false`; other failures are transient and returned.
    pub fn has_encoder<H>(&self, hw: &mut H, port: Port) -> Result<bool, DeviceError>
    where
        H: MotorHardware + ?Sized,
    {
        match hw.encoder_count(port) {
            Ok(_) => Ok(true),
            Err(DeviceError::NoDevice) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
