//! Drive base driver trait

use crate::error::Result;
use crate::types::{MotionAck, MotionCommand, ObstacleReadings};

/// Differential drive base with ultrasonic range sensors
pub trait Locomotion: Send {
    /// Execute one motion command and block until it has completed
    fn execute(&mut self, command: &MotionCommand) -> Result<MotionAck>;

    /// Read the front, left and right range sensors
    fn read_obstacle_sensors(&mut self) -> Result<ObstacleReadings>;
}
