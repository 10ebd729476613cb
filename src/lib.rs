//! # servo-motion
//!
//! Encoder-feedback servo motion control for DC motors, with embedded-hal 1.0
//! support.
//!
//! ## Features
//!
//! - **Configuration-driven**: Port calibration, control settings and the
//!   drivebase come from TOML files
//! - **embedded-hal 1.0**: H-bridge outputs over `OutputPin` and `SetDutyCycle`
//! - **no_std compatible**: Core library works without standard library
//! - **Integer trajectories**: Trapezoidal and triangular profiles in encoder
//!   counts and microseconds, no floating point in the control path
//! - **Stall detection**: Saturated, motionless motors stop or finish their
//!   maneuver
//! - **Fault isolation**: A port that fails its control update is
//!   disconnected without affecting the others
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use servo_motion::{AfterStop, Command, MotorSystem, Port};
//!
//! // Load configuration from TOML
//! let config = servo_motion::load_config("ports.toml")?;
//! let mut system: MotorSystem = MotorSystem::from_config(&config)?;
//!
//! // Turn the output on port A by 90 degrees, then hold it there
//! system.command(&mut hw, Port::A, clock.now(), Command::run_angle(500, 90, AfterStop::Hold))?;
//!
//! // Control tick
//! loop {
//!     system.poll(&mut hw, clock.now());
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `alloc`: Enables heap allocation for no_std with allocator
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Logging shims, must come before the modules using them
#[macro_use]
mod fmt;

// Core modules
pub mod config;
pub mod device;
pub mod error;
pub mod motion;
pub mod motor;

// Re-exports for ergonomic API
pub use config::{validate_config, Direction, MotorSettings, Port, PortConfig, SystemConfig};
pub use device::{DeviceRegistry, MotorHardware};
pub use error::{Error, Result};
pub use motion::{Action, AfterStop, MotionPhase, Reference, Trajectory};
pub use motor::{state, Activity, Command, Drivebase, MotorSystem, Pid, Servo};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};
