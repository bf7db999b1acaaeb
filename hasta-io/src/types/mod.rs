//! Data types exchanged with the device drivers

mod arm;
mod detection;
mod motion;
mod obstacle;

pub use arm::{ArmPose, GripForce, GripperState};
pub use detection::DetectionSample;
pub use motion::{MotionAck, MotionCommand, TurnDirection};
pub use obstacle::ObstacleReadings;
