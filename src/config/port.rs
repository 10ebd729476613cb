//! Motor port configuration from TOML.

use serde::Deserialize;

use super::settings::{ControlLimits, MotorSettings};
use super::units::Direction;

/// Configuration of one encoded motor port.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PortConfig {
    /// Positive rotation sense.
    #[serde(default)]
    pub direction: Direction,

    /// Encoder counts per user unit at the motor shaft.
    #[serde(default = "default_ratio")]
    pub counts_per_unit: f32,

    /// Gear ratio between motor shaft and output (e.g. 3.0 for 3:1 reduction).
    #[serde(default = "default_ratio")]
    pub gear_ratio: f32,

    /// Control settings.
    #[serde(default)]
    pub settings: MotorSettings,
}

fn default_ratio() -> f32 {
    1.0
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            direction: Direction::Clockwise,
            counts_per_unit: 1.0,
            gear_ratio: 1.0,
            settings: MotorSettings::default(),
        }
    }
}

impl PortConfig {
    /// Encoder counts per user unit at the output shaft.
    pub fn counts_per_output_unit(&self) -> f32 {
        self.counts_per_unit * self.gear_ratio
    }

    /// Derived control limits for this port.
    pub fn limits(&self) -> ControlLimits {
        ControlLimits::derive(&self.settings, self.counts_per_output_unit())
    }
}
