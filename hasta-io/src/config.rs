//! Device selection configuration
//!
//! Deserialized from the `[device]` table of the controller's TOML file:
//!
//! ```toml
//! [device]
//! type = "sim"
//!
//! [device.simulation]
//! random_seed = 42
//! target = { x = 3.2, y = 1.1, description = "red ball", color = "red" }
//! ```

use crate::devices::sim::SimConfig;
use serde::Deserialize;

/// Device backend selection
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    /// Backend type (only "sim" is available without hardware)
    #[serde(rename = "type", default = "default_device_type")]
    pub device_type: String,

    /// Simulation parameters, used when `type = "sim"`
    #[serde(default)]
    pub simulation: SimConfig,
}

fn default_device_type() -> String {
    "sim".to_string()
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_type: default_device_type(),
            simulation: SimConfig::default(),
        }
    }
}
