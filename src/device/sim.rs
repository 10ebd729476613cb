//! Simulated motor plant.
//!
//! A first-order speed response to duty cycle, integrated into a position.
//! Good enough to close the loop in tests and demos; not a physics model.

use crate::config::{Port, PortMap};
use crate::error::DeviceError;
use crate::motion::{Counts, Rate, US_PER_SECOND};
use crate::motor::MotorOutput;

use super::hal::{Actuators, EncoderSource, MAX_DUTY};
use super::registry::Counter;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Drive {
    Coast,
    Brake,
    Duty(i32),
}

/// One simulated encoded motor.
#[derive(Debug, Clone, PartialEq)]
pub struct SimMotor {
    position: f32,
    rate: f32,
    drive: Drive,
    /// Steady-state speed at full duty, counts per second.
    pub max_rate: f32,
    /// Speed response time constant in seconds.
    pub time_constant: f32,
    /// Whether an encoder is attached; reads fail with `NoDevice` otherwise.
    pub attached: bool,
    /// Output shaft is mechanically blocked.
    pub blocked: bool,
    /// Next reads fail with `Io`.
    pub faulted: bool,
}

impl Default for SimMotor {
    fn default() -> Self {
        Self {
            position: 0.0,
            rate: 0.0,
            drive: Drive::Coast,
            max_rate: 1500.0,
            time_constant: 0.05,
            attached: true,
            blocked: false,
            faulted: false,
        }
    }
}

impl SimMotor {
    /// A motor resting at `position`.
    pub fn at(position: Counts) -> Self {
        Self {
            position: position as f32,
            ..Self::default()
        }
    }

    /// Advance the plant by `dt` microseconds.
    pub fn step(&mut self, dt: i64) {
        let dt = dt as f32 / US_PER_SECOND as f32;
        let (target, tau) = match self.drive {
            Drive::Duty(duty) => (duty as f32 / MAX_DUTY as f32 * self.max_rate, self.time_constant),
            Drive::Coast => (0.0, self.time_constant * 4.0),
            Drive::Brake => (0.0, self.time_constant / 4.0),
        };
        self.rate += (target - self.rate) * (dt / tau).min(1.0);
        if self.blocked {
            self.rate = 0.0;
        }
        self.position += self.rate * dt;
    }

    /// Last applied duty, zero when coasting or braking.
    pub fn duty(&self) -> i32 {
        match self.drive {
            Drive::Duty(duty) => duty,
            _ => 0,
        }
    }

    /// Whether the output is freewheeling.
    pub fn is_coasting(&self) -> bool {
        self.drive == Drive::Coast
    }

    fn check(&self) -> Result<(), DeviceError> {
        if !self.attached {
            Err(DeviceError::NoDevice)
        } else if self.faulted {
            Err(DeviceError::Io)
        } else {
            Ok(())
        }
    }
}

impl Counter for SimMotor {
    fn count(&mut self) -> Result<Counts, DeviceError> {
        self.check()?;
        Ok(self.position as Counts)
    }

    fn rate(&mut self) -> Result<Rate, DeviceError> {
        self.check()?;
        Ok(self.rate as Rate)
    }
}

impl MotorOutput for SimMotor {
    fn coast(&mut self) -> Result<(), DeviceError> {
        self.drive = Drive::Coast;
        Ok(())
    }

    fn brake(&mut self) -> Result<(), DeviceError> {
        self.drive = Drive::Brake;
        Ok(())
    }

    fn set_duty(&mut self, duty: i32) -> Result<(), DeviceError> {
        self.drive = Drive::Duty(duty.clamp(-MAX_DUTY, MAX_DUTY));
        Ok(())
    }
}

/// A bench of simulated motors, one per port.
#[derive(Debug, Clone)]
pub struct SimBench<const N: usize> {
    motors: PortMap<SimMotor, N>,
}

impl<const N: usize> Default for SimBench<N> {
    fn default() -> Self {
        Self {
            motors: PortMap::from_fn(|_| SimMotor::default()),
        }
    }
}

impl<const N: usize> SimBench<N> {
    /// Bench of default motors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Motor on a port.
    pub fn motor(&self, port: Port) -> Result<&SimMotor, DeviceError> {
        self.motors.get(port)
    }

    /// Motor on a port, mutably.
    pub fn motor_mut(&mut self, port: Port) -> Result<&mut SimMotor, DeviceError> {
        self.motors.get_mut(port)
    }

    /// Advance every motor by `dt` microseconds.
    pub fn step(&mut self, dt: i64) {
        for (_, motor) in self.motors.iter_mut() {
            motor.step(dt);
        }
    }
}

impl<const N: usize> EncoderSource for SimBench<N> {
    fn encoder_count(&mut self, port: Port) -> Result<Counts, DeviceError> {
        self.motors.get_mut(port)?.count()
    }

    fn encoder_rate(&mut self, port: Port) -> Result<Rate, DeviceError> {
        self.motors.get_mut(port)?.rate()
    }
}

impl<const N: usize> Actuators for SimBench<N> {
    fn coast(&mut self, port: Port) -> Result<(), DeviceError> {
        MotorOutput::coast(self.motors.get_mut(port)?)
    }

    fn brake(&mut self, port: Port) -> Result<(), DeviceError> {
        MotorOutput::brake(self.motors.get_mut(port)?)
    }

    fn set_duty(&mut self, port: Port, duty: i32) -> Result<(), DeviceError> {
        MotorOutput::set_duty(self.motors.get_mut(port)?, duty)
    }
}
