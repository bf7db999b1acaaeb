//! Arm driver trait

use crate::error::Result;
use crate::types::{ArmPose, GripForce, GripperState};

/// Servo arm with a gripper
pub trait Manipulator: Send {
    /// Move every joint to a named pose and wait until it is reached
    fn move_to_pose(&mut self, pose: ArmPose) -> Result<()>;

    /// Open or close the gripper
    fn set_gripper(&mut self, state: GripperState, force: GripForce) -> Result<()>;

    /// Check whether an object is held between the jaws
    fn verify_grip(&mut self) -> Result<bool>;
}
