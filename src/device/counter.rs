//! Motor hardware backed by a counter registry.

use crate::config::Port;
use crate::error::{DeviceError, Error};
use crate::motion::{Counts, Rate};

use super::hal::{Actuators, EncoderSource};
use super::registry::{Counter, DeviceRegistry};

/// Encoder reads resolved through a [`DeviceRegistry`], outputs through an
/// [`Actuators`] implementation.
///
/// The counter id of a port is its index.
#[derive(Debug)]
pub struct CounterMotors<H, A, const N: usize> {
    counters: DeviceRegistry<H, N>,
    outputs: A,
}

impl<H, A, const N: usize> CounterMotors<H, A, N> {
    /// Combine a counter registry and motor outputs.
    pub fn new(counters: DeviceRegistry<H, N>, outputs: A) -> Self {
        Self { counters, outputs }
    }

    /// Counter registry, for drivers to populate.
    pub fn counters_mut(&mut self) -> &mut DeviceRegistry<H, N> {
        &mut self.counters
    }

    /// Motor outputs.
    pub fn outputs_mut(&mut self) -> &mut A {
        &mut self.outputs
    }
}

impl<H: Counter, A, const N: usize> CounterMotors<H, A, N> {
    fn counter(&mut self, port: Port) -> Result<&mut H, DeviceError> {
        match self.counters.get_mut(port.index() as u8) {
            Ok(counter) => Ok(counter),
            Err(Error::Device(e)) => Err(e),
            // No counter slot for this port at all
            Err(_) => Err(DeviceError::NoDevice),
        }
    }
}

impl<H: Counter, A, const N: usize> EncoderSource for CounterMotors<H, A, N> {
    fn encoder_count(&mut self, port: Port) -> Result<Counts, DeviceError> {
        self.counter(port)?.count()
    }

    fn encoder_rate(&mut self, port: Port) -> Result<Rate, DeviceError> {
        self.counter(port)?.rate()
    }
}

impl<H, A: Actuators, const N: usize> Actuators for CounterMotors<H, A, N> {
    fn coast(&mut self, port: Port) -> Result<(), DeviceError> {
        self.outputs.coast(port)
    }

    fn brake(&mut self, port: Port) -> Result<(), DeviceError> {
        self.outputs.brake(port)
    }

    fn set_duty(&mut self, port: Port, duty: i32) -> Result<(), DeviceError> {
        self.outputs.set_duty(port, duty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(i64);

    impl Counter for Fixed {
        fn count(&mut self) -> Result<Counts, DeviceError> {
            Ok(self.0)
        }

        fn rate(&mut self) -> Result<Rate, DeviceError> {
            Ok(0)
        }
    }

    #[derive(Default)]
    struct Recorder {
        coasted: Vec<Port>,
    }

    impl Actuators for Recorder {
        fn coast(&mut self, port: Port) -> Result<(), DeviceError> {
            self.coasted.push(port);
            Ok(())
        }

        fn brake(&mut self, _port: Port) -> Result<(), DeviceError> {
            Ok(())
        }

        fn set_duty(&mut self, _port: Port, _duty: i32) -> Result<(), DeviceError> {
            Ok(())
        }
    }

    #[test]
    fn test_reads_resolve_through_registry() {
        let mut reg: DeviceRegistry<Fixed, 2> = DeviceRegistry::new();
        reg.register(1, Fixed(77)).unwrap();
        let mut hw = CounterMotors::new(reg, Recorder::default());

        assert_eq!(hw.encoder_count(Port::B), Err(DeviceError::NotReady));
        hw.counters_mut().set_initialized(1, true).unwrap();
        assert_eq!(hw.encoder_count(Port::B), Ok(77));

        // Empty slot is pending, missing slot means no encoder
        assert_eq!(hw.encoder_count(Port::A), Err(DeviceError::NotReady));
        assert_eq!(hw.encoder_count(Port::C), Err(DeviceError::NoDevice));

        hw.coast(Port::D).unwrap();
        assert_eq!(hw.outputs_mut().coasted, vec![Port::D]);
    }
}
