//! Simulated fetch robot for hardware-free runs
//!
//! One [`SimWorld`] holds the true robot pose, the target object, a list of
//! round obstacles and the arm state. The three drivers share it:
//!
//! | Driver | Simulation Method |
//! |--------|-------------------|
//! | [`SimDetector`] | Pinhole camera: bearing from target angle, distance from apparent width |
//! | [`SimLocomotion`] | Constant-speed kinematics, ultrasonic ray casting against obstacles |
//! | [`SimArm`] | Grip succeeds when the target is within reach in front of the base |
//!
//! Example configuration:
//!
//! ```toml
//! [device.simulation]
//! start_x = 0.0
//! start_y = 0.0
//! time_scale = 0.25    # 1.0 = real time, 0.0 = no waiting
//! random_seed = 42     # 0 = random each run
//!
//! [device.simulation.target]
//! x = 3.2
//! y = 1.1
//! description = "red ball"
//! color = "red"
//! width_cm = 10.0
//!
//! [[device.simulation.obstacles]]
//! x = 2.0
//! y = 0.0
//! radius_m = 0.15
//! ```

pub mod config;
mod arm;
mod detector;
mod locomotion;
mod noise;
mod world;

pub use arm::SimArm;
pub use config::{ArmConfig, CameraConfig, ObstacleConfig, SimConfig, SonarConfig, TargetConfig};
pub use detector::{SimDetector, known_object_width_cm};
pub use locomotion::SimLocomotion;
pub use world::SimWorld;
