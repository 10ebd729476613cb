//! Device layer.
//!
//! Port-indexed sensor/actuator traits consumed by the servos, the counter
//! registry drivers populate, and a simulated plant.

mod counter;
mod hal;
mod registry;
pub mod sim;

pub use counter::CounterMotors;
pub use hal::{Actuators, EncoderSource, MotorHardware, MAX_DUTY};
pub use registry::{Counter, CounterDriver, DeviceRegistry};
