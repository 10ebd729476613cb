//! Configuration module for servo-motion.
//!
//! Provides types for loading and validating per-port calibration, control
//! settings and the optional drivebase from TOML files (with `std` feature)
//! or pre-parsed data.

mod drivebase;
#[cfg(feature = "std")]
mod loader;
mod port;
mod settings;
mod system;
pub mod units;
mod validation;

pub use drivebase::DrivebaseConfig;
pub use port::PortConfig;
pub use settings::{ControlLimits, MotorSettings, SettingsReport, MAX_SETTINGS_STR_LENGTH};
pub use system::SystemConfig;
pub use validation::{validate_config, validate_port, validate_settings};

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Direction, Port, PortMap, NUM_MOTOR_PORTS};
