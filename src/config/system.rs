//! System configuration - root configuration structure.

use heapless::{FnvIndexMap, String};
use serde::Deserialize;

use super::drivebase::DrivebaseConfig;
use super::port::PortConfig;
use super::units::{Port, NUM_MOTOR_PORTS};

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    /// Motor port configurations keyed by port letter.
    #[serde(default)]
    pub ports: FnvIndexMap<String<8>, PortConfig, NUM_MOTOR_PORTS>,

    /// Optional two-motor drivebase.
    #[serde(default)]
    pub drivebase: Option<DrivebaseConfig>,
}

impl SystemConfig {
    /// Get the configuration for a port, if present.
    pub fn port(&self, port: Port) -> Option<&PortConfig> {
        self.ports
            .iter()
            .find(|(k, _)| Port::from_name(k.as_str()) == Some(port))
            .map(|(_, v)| v)
    }

    /// List configured ports whose names parse.
    pub fn configured_ports(&self) -> impl Iterator<Item = Port> + '_ {
        self.ports.keys().filter_map(|k| Port::from_name(k.as_str()))
    }

    /// Drivebase ports as `(left, right)`, if a drivebase is configured and
    /// both names parse.
    pub fn drivebase_ports(&self) -> Option<(Port, Port)> {
        let db = self.drivebase.as_ref()?;
        Some((Port::from_name(&db.left)?, Port::from_name(&db.right)?))
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            ports: FnvIndexMap::new(),
            drivebase: None,
        }
    }
}
