//! Sensor and actuator interfaces consumed by the control core.
//!
//! Everything is port-indexed and reports raw, uncalibrated values. A read
//! that is not ready yet returns `DeviceError::NotReady` instead of blocking.

use crate::config::Port;
use crate::error::DeviceError;
use crate::motion::{Counts, Rate};

/// Full-scale duty cycle magnitude accepted by [`Actuators::set_duty`].
pub const MAX_DUTY: i32 = 10_000;

/// Raw encoder feedback per port.
pub trait EncoderSource {
    /// Raw encoder count.
    fn encoder_count(&mut self, port: Port) -> Result<Counts, DeviceError>;

    /// Raw encoder rate in counts per second.
    fn encoder_rate(&mut self, port: Port) -> Result<Rate, DeviceError>;
}

/// Motor outputs per port.
pub trait Actuators {
    /// Let the motor spin freely.
    fn coast(&mut self, port: Port) -> Result<(), DeviceError>;

    /// Short the motor windings.
    fn brake(&mut self, port: Port) -> Result<(), DeviceError>;

    /// Apply a signed duty cycle in `-MAX_DUTY..=MAX_DUTY`.
    fn set_duty(&mut self, port: Port, duty: i32) -> Result<(), DeviceError>;
}

/// Everything a servo needs from below.
pub trait MotorHardware: EncoderSource + Actuators {}

impl<T: EncoderSource + Actuators + ?Sized> MotorHardware for T {}
