//! Unit and identifier types.
//!
//! Motor ports, rotation direction and the user-unit to encoder-count scale
//! shared by configuration, encoder conversion and command dispatch.

use core::fmt;

use serde::Deserialize;

use crate::error::DeviceError;

/// Number of motor ports on the controller.
pub const NUM_MOTOR_PORTS: usize = 4;

/// Positive rotation sense of a motor as seen on its output shaft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Raw encoder counts are used as-is.
    #[default]
    Clockwise,
    /// Raw encoder counts and rates are negated.
    Counterclockwise,
}

impl Direction {
    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Direction::Clockwise => 1,
            Direction::Counterclockwise => -1,
        }
    }
}

/// A motor port identifier.
///
/// Ports are a dense index starting at zero; [`PortMap`] validates the index
/// on every access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Port(u8);

impl Port {
    /// Port A.
    pub const A: Self = Self(0);
    /// Port B.
    pub const B: Self = Self(1);
    /// Port C.
    pub const C: Self = Self(2);
    /// Port D.
    pub const D: Self = Self(3);

    /// Create a port from its index.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::InvalidPort` for indices past the last motor port.
    pub fn new(index: u8) -> Result<Self, DeviceError> {
        if (index as usize) < NUM_MOTOR_PORTS {
            Ok(Self(index))
        } else {
            Err(DeviceError::InvalidPort(index))
        }
    }

    /// Parse a port letter (`"A"` to `"D"`, case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        let letter = chars.next()?.to_ascii_uppercase();
        if chars.next().is_some() || !letter.is_ascii_uppercase() {
            return None;
        }
        Self::new(letter as u8 - b'A').ok()
    }

    /// Zero-based index of this port.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Port letter.
    #[inline]
    pub fn letter(self) -> char {
        (b'A' + self.0) as char
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Fixed-capacity arena holding one record per motor port.
#[derive(Debug, Clone)]
pub struct PortMap<T, const N: usize = NUM_MOTOR_PORTS> {
    slots: [T; N],
}

impl<T, const N: usize> PortMap<T, N> {
    /// Build one record per port.
    pub fn from_fn(mut f: impl FnMut(Port) -> T) -> Self {
        Self {
            slots: core::array::from_fn(|i| f(Port(i as u8))),
        }
    }

    /// Get the record for a port.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::InvalidPort` if the port is outside this map.
    pub fn get(&self, port: Port) -> Result<&T, DeviceError> {
        self.slots
            .get(port.index())
            .ok_or(DeviceError::InvalidPort(port.0))
    }

    /// Get the record for a port mutably.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::InvalidPort` if the port is outside this map.
    pub fn get_mut(&mut self, port: Port) -> Result<&mut T, DeviceError> {
        self.slots
            .get_mut(port.index())
            .ok_or(DeviceError::InvalidPort(port.0))
    }

    /// Number of ports in this map.
    #[inline]
    pub const fn len(&self) -> usize {
        N
    }

    /// Check if the map has no ports.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Iterate over `(port, record)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Port, &T)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, v)| (Port(i as u8), v))
    }

    /// Iterate mutably over `(port, record)` pairs.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Port, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .map(|(i, v)| (Port(i as u8), v))
    }
}

/// Convert a user-unit quantity to encoder counts.
///
/// Truncates toward zero.
#[inline]
pub fn to_counts(value: i32, counts_per_output_unit: f32) -> i64 {
    (value as f64 * counts_per_output_unit as f64) as i64
}

/// Convert encoder counts to user units, truncating toward zero.
#[inline]
pub fn from_counts(counts: i64, counts_per_output_unit: f32) -> i64 {
    (counts as f64 / counts_per_output_unit as f64) as i64
}
