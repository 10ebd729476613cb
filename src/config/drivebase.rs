//! Drivebase configuration from TOML.

use heapless::String;
use serde::Deserialize;

/// Two-motor differential drivebase.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DrivebaseConfig {
    /// Port name of the left motor.
    pub left: String<8>,

    /// Port name of the right motor.
    pub right: String<8>,

    /// Wheel diameter in millimeters.
    #[serde(rename = "wheel_diameter_mm")]
    pub wheel_diameter: f32,

    /// Distance between the wheel contact points in millimeters.
    #[serde(rename = "axle_track_mm")]
    pub axle_track: f32,
}
