//! Arm and gripper types

use serde::Deserialize;
use std::fmt;

/// Pre-defined arm poses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArmPose {
    /// Folded, gripper open
    Home,
    /// Lowered in front of the base with the gripper open
    ReadyToGrab,
    /// Lowered with the gripper closed
    Grab,
    /// Raised with the gripper closed
    Lift,
    /// Raised towards the user
    Present,
}

impl ArmPose {
    pub fn name(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::ReadyToGrab => "ready_to_grab",
            Self::Grab => "grab",
            Self::Lift => "lift",
            Self::Present => "present",
        }
    }

    /// Joint angles (base, shoulder, elbow, wrist, gripper) in degrees
    pub fn joint_angles(self) -> [f32; 5] {
        match self {
            Self::Home => [90.0, 90.0, 90.0, 90.0, 0.0],
            Self::ReadyToGrab => [90.0, 45.0, 45.0, 0.0, 0.0],
            Self::Grab => [90.0, 45.0, 45.0, 0.0, 180.0],
            Self::Lift => [90.0, 90.0, 90.0, 45.0, 180.0],
            Self::Present => [90.0, 135.0, 45.0, 90.0, 180.0],
        }
    }
}

impl fmt::Display for ArmPose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Gripper jaw state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GripperState {
    Open,
    Closed,
}

/// Closing force for the gripper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GripForce {
    Light,
    #[default]
    Medium,
    Firm,
}

impl GripForce {
    /// Gripper servo angle for this force (0 = fully open)
    pub fn servo_angle(self) -> f32 {
        match self {
            Self::Light => 120.0,
            Self::Medium => 150.0,
            Self::Firm => 180.0,
        }
    }
}
