//! H-bridge motor outputs over embedded-hal 1.0.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::config::Port;
use crate::device::{Actuators, MAX_DUTY};
use crate::error::DeviceError;

/// One motor output stage.
pub trait MotorOutput {
    /// Let the motor spin freely.
    fn coast(&mut self) -> Result<(), DeviceError>;

    /// Short the motor windings.
    fn brake(&mut self) -> Result<(), DeviceError>;

    /// Apply a signed duty cycle in `-MAX_DUTY..=MAX_DUTY`.
    fn set_duty(&mut self, duty: i32) -> Result<(), DeviceError>;
}

/// Two direction inputs plus a PWM enable, as on TB6612/L298-style drivers.
///
/// | in1 | in2 | pwm  | effect  |
/// |-----|-----|------|---------|
/// | L   | L   | off  | coast   |
/// | H   | H   | on   | brake   |
/// | H   | L   | duty | forward |
/// | L   | H   | duty | reverse |
pub struct HBridge<IN1, IN2, PWM> {
    in1: IN1,
    in2: IN2,
    pwm: PWM,
}

impl<IN1, IN2, PWM> HBridge<IN1, IN2, PWM>
where
    IN1: OutputPin,
    IN2: OutputPin,
    PWM: SetDutyCycle,
{
    /// Wrap the driver pins. Outputs are not touched until the first command.
    pub fn new(in1: IN1, in2: IN2, pwm: PWM) -> Self {
        Self { in1, in2, pwm }
    }

    /// Give the pins back.
    pub fn release(self) -> (IN1, IN2, PWM) {
        (self.in1, self.in2, self.pwm)
    }

    fn set_inputs(&mut self, in1: bool, in2: bool) -> Result<(), DeviceError> {
        self.in1.set_state(in1.into()).map_err(|_| DeviceError::Io)?;
        self.in2.set_state(in2.into()).map_err(|_| DeviceError::Io)
    }
}

impl<IN1, IN2, PWM> MotorOutput for HBridge<IN1, IN2, PWM>
where
    IN1: OutputPin,
    IN2: OutputPin,
    PWM: SetDutyCycle,
{
    fn coast(&mut self) -> Result<(), DeviceError> {
        self.pwm.set_duty_cycle_fully_off().map_err(|_| DeviceError::Io)?;
        self.set_inputs(false, false)
    }

    fn brake(&mut self) -> Result<(), DeviceError> {
        self.set_inputs(true, true)?;
        self.pwm.set_duty_cycle_fully_on().map_err(|_| DeviceError::Io)
    }

    fn set_duty(&mut self, duty: i32) -> Result<(), DeviceError> {
        let duty = duty.clamp(-MAX_DUTY, MAX_DUTY);
        if duty == 0 {
            return self.coast();
        }
        self.set_inputs(duty > 0, duty < 0)?;
        self.pwm
            .set_duty_cycle_fraction(duty.unsigned_abs() as u16, MAX_DUTY as u16)
            .map_err(|_| DeviceError::Io)
    }
}

impl<M: MotorOutput, const N: usize> Actuators for [M; N] {
    fn coast(&mut self, port: Port) -> Result<(), DeviceError> {
        output(self, port)?.coast()
    }

    fn brake(&mut self, port: Port) -> Result<(), DeviceError> {
        output(self, port)?.brake()
    }

    fn set_duty(&mut self, port: Port, duty: i32) -> Result<(), DeviceError> {
        output(self, port)?.set_duty(duty)
    }
}

fn output<M>(outputs: &mut [M], port: Port) -> Result<&mut M, DeviceError> {
    outputs
        .get_mut(port.index())
        .ok_or(DeviceError::InvalidPort(port.index() as u8))
}
