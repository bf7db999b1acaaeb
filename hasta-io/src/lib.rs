//! HastaIO - Hardware abstraction library for the fetch robot
//!
//! This library provides the narrow device contracts the mission controller
//! talks to, plus two families of backends that need no hardware:
//!
//! - [`devices::sim`]: a small simulated room with a camera, drive base,
//!   ultrasonic sensors and a gripper arm sharing one world state
//! - [`devices::scripted`]: deterministic test doubles fed from queues

pub mod config;
pub mod devices;
pub mod drivers;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::DeviceConfig;
pub use devices::{DeviceSet, create_devices};
pub use drivers::{Detector, Locomotion, Manipulator};
pub use error::{Error, Result};
pub use types::{
    ArmPose, DetectionSample, GripForce, GripperState, MotionAck, MotionCommand,
    ObstacleReadings, TurnDirection,
};
