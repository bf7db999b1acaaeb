//! Device implementations

pub mod scripted;
pub mod sim;

use crate::config::DeviceConfig;
use crate::drivers::{Detector, Locomotion, Manipulator};
use crate::error::{Error, Result};
use sim::{SimArm, SimDetector, SimLocomotion, SimWorld};

/// The three collaborators a mission needs, boxed for dynamic dispatch
pub struct DeviceSet {
    pub detector: Box<dyn Detector>,
    pub locomotion: Box<dyn Locomotion>,
    pub manipulator: Box<dyn Manipulator>,
}

/// Create the device set based on configuration
pub fn create_devices(config: &DeviceConfig) -> Result<DeviceSet> {
    match config.device_type.as_str() {
        "sim" => {
            let world = SimWorld::new(config.simulation.clone());
            log::info!(
                "Simulated room: target '{}' at ({:.2}, {:.2}), {} obstacle(s)",
                config.simulation.target.description,
                config.simulation.target.x,
                config.simulation.target.y,
                config.simulation.obstacles.len()
            );
            Ok(DeviceSet {
                detector: Box::new(SimDetector::new(world.clone())),
                locomotion: Box::new(SimLocomotion::new(world.clone())),
                manipulator: Box::new(SimArm::new(world)),
            })
        }
        other => Err(Error::UnknownDevice(other.to_string())),
    }
}
