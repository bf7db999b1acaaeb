//! Motion command definitions

use std::fmt;

/// Direction of an in-place turn.
///
/// Headings are counter-clockwise positive, so a left turn increases the
/// heading and a right turn decreases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    Left,
    Right,
}

impl TurnDirection {
    /// Sign of the heading change produced by this direction
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => 1.0,
            Self::Right => -1.0,
        }
    }

    /// Direction that reduces a signed heading error (degrees, CCW positive)
    pub fn toward(heading_error_deg: f32) -> Self {
        if heading_error_deg >= 0.0 {
            Self::Left
        } else {
            Self::Right
        }
    }
}

impl fmt::Display for TurnDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// Motion command types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionCommand {
    /// Drive forward at base speed for a duration
    Forward {
        /// Duration in seconds
        duration_s: f32,
    },

    /// Drive backward at base speed for a duration
    Backward {
        /// Duration in seconds
        duration_s: f32,
    },

    /// Rotate in place
    Turn {
        direction: TurnDirection,
        /// Angle in degrees (always positive)
        angle_deg: f32,
    },

    /// Stop motion
    Stop,
}

impl MotionCommand {
    /// Get command type as string
    pub fn command_type(&self) -> &'static str {
        match self {
            Self::Forward { .. } => "forward",
            Self::Backward { .. } => "backward",
            Self::Turn { .. } => "turn",
            Self::Stop => "stop",
        }
    }

    /// Check if this command moves the robot across the floor
    pub fn is_translation(&self) -> bool {
        matches!(self, Self::Forward { .. } | Self::Backward { .. })
    }
}

impl fmt::Display for MotionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward { duration_s } => write!(f, "forward {:.2}s", duration_s),
            Self::Backward { duration_s } => write!(f, "backward {:.2}s", duration_s),
            Self::Turn {
                direction,
                angle_deg,
            } => write!(f, "turn {} {:.1}°", direction, angle_deg),
            Self::Stop => f.write_str("stop"),
        }
    }
}

/// Acknowledgement returned once a command has finished executing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionAck {
    /// Time the drive base spent executing the command (seconds)
    pub elapsed_s: f32,
}
