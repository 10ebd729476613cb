//! Error types for servo-motion library.
//!
//! Provides unified error handling across configuration, device access,
//! trajectory synthesis and the device registry.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all servo-motion operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Sensor or actuator access error
    Device(DeviceError),
    /// Trajectory synthesis error
    Motion(MotionError),
    /// Device registry error
    Registry(RegistryError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Port name is not one of the motor ports
    InvalidPortName(heapless::String<8>),
    /// Same physical port configured twice
    DuplicatePort(heapless::String<8>),
    /// Invalid gear ratio (must be > 0)
    InvalidGearRatio(f32),
    /// Invalid counts per unit (must be > 0)
    InvalidCountsPerUnit(f32),
    /// A motor setting is out of its allowed range
    InvalidSetting {
        /// Name of the offending setting
        name: &'static str,
        /// Value that was rejected
        value: i32,
    },
    /// Drivebase references unconfigured or identical ports
    InvalidDrivebase,
    /// Wheel diameter or axle track not positive
    InvalidGeometry(f32),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Sensor and actuator errors.
///
/// `NotReady` means "try again on a later tick", `NoDevice` means the port
/// has no such peripheral at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError {
    /// Device exists but has not finished initialization
    NotReady,
    /// No device of the requested kind is attached
    NoDevice,
    /// Port index outside the configured motor ports
    InvalidPort(u8),
    /// Transient bus or read failure
    Io,
}

/// Trajectory synthesis errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionError {
    /// Request rejected before any state was touched
    InvalidArgument(&'static str),
    /// A computed phase duration came out negative
    SynthesisFailure,
}

/// Device registry errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// Id is outside the registry capacity
    InvalidId(u8),
    /// Slot already holds a device
    AlreadyRegistered(u8),
    /// Handle is not registered
    NotFound,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Device(e) => write!(f, "Device error: {}", e),
            Error::Motion(e) => write!(f, "Motion error: {}", e),
            Error::Registry(e) => write!(f, "Registry error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidPortName(name) => {
                write!(f, "Invalid port '{}'. Valid ports: A, B, C, D", name)
            }
            ConfigError::DuplicatePort(name) => write!(f, "Port '{}' configured twice", name),
            ConfigError::InvalidGearRatio(v) => write!(f, "Invalid gear ratio: {}. Must be > 0", v),
            ConfigError::InvalidCountsPerUnit(v) => {
                write!(f, "Invalid counts per unit: {}. Must be > 0", v)
            }
            ConfigError::InvalidSetting { name, value } => {
                write!(f, "Invalid value {} for setting '{}'", value, name)
            }
            ConfigError::InvalidDrivebase => {
                write!(f, "Drivebase needs two distinct configured ports")
            }
            ConfigError::InvalidGeometry(v) => {
                write!(f, "Invalid wheel geometry: {}. Must be > 0", v)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::NotReady => write!(f, "Device not ready, try again"),
            DeviceError::NoDevice => write!(f, "No device attached"),
            DeviceError::InvalidPort(p) => write!(f, "Invalid port index {}", p),
            DeviceError::Io => write!(f, "Device read failed"),
        }
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::InvalidArgument(what) => write!(f, "Invalid argument: {}", what),
            MotionError::SynthesisFailure => {
                write!(f, "Trajectory synthesis produced a negative phase duration")
            }
        }
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::InvalidId(id) => write!(f, "Device id {} out of range", id),
            RegistryError::AlreadyRegistered(id) => {
                write!(f, "Device id {} already registered", id)
            }
            RegistryError::NotFound => write!(f, "Device not registered"),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<DeviceError> for Error {
    fn from(e: DeviceError) -> Self {
        Error::Device(e)
    }
}

impl From<MotionError> for Error {
    fn from(e: MotionError) -> Self {
        Error::Motion(e)
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Error::Registry(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for DeviceError {}

#[cfg(feature = "std")]
impl std::error::Error for MotionError {}

#[cfg(feature = "std")]
impl std::error::Error for RegistryError {}
