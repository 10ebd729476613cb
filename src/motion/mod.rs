//! Motion module for servo-motion.
//!
//! Trajectory representation, closed-form synthesis and real-time evaluation.
//! Everything here is pure integer arithmetic on encoder counts and
//! microseconds; nothing touches hardware.

mod evaluate;
mod fixed;
pub mod synth;
mod trajectory;

pub use evaluate::{MotionPhase, Reference};
pub use fixed::{
    isqrt, timest, timest2, wdiva, Accel, Counts, Micros, Rate, US_PER_MS, US_PER_SECOND,
};
pub use trajectory::{Action, AfterStop, Sense, Trajectory};
