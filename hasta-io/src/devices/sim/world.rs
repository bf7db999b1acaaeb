//! Shared world state for the simulated drivers

use super::config::SimConfig;
use super::noise::SensorNoise;
use crate::types::{ArmPose, GripperState};
use parking_lot::Mutex;
use std::sync::Arc;

/// Handle to the simulated room, cheap to clone and shared by all drivers
#[derive(Clone)]
pub struct SimWorld {
    state: Arc<Mutex<WorldState>>,
}

pub(super) struct WorldState {
    pub config: SimConfig,
    pub x: f32,
    pub y: f32,
    pub heading_deg: f32,
    pub target_x: f32,
    pub target_y: f32,
    pub holding: bool,
    pub gripper: GripperState,
    pub arm_pose: ArmPose,
    pub noise: SensorNoise,
}

impl SimWorld {
    /// Create a world with the robot at its configured start pose
    pub fn new(config: SimConfig) -> Self {
        let state = WorldState {
            x: config.start_x,
            y: config.start_y,
            heading_deg: normalize_deg(config.start_heading_deg),
            target_x: config.target.x,
            target_y: config.target.y,
            holding: false,
            gripper: GripperState::Open,
            arm_pose: ArmPose::Home,
            noise: SensorNoise::seeded(config.random_seed),
            config,
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// True robot pose (x, y, heading in degrees)
    pub fn pose(&self) -> (f32, f32, f32) {
        let state = self.state.lock();
        (state.x, state.y, state.heading_deg)
    }

    /// Teleport the robot (tests and scenario setup)
    pub fn set_pose(&self, x: f32, y: f32, heading_deg: f32) {
        let mut state = self.state.lock();
        state.x = x;
        state.y = y;
        state.heading_deg = normalize_deg(heading_deg);
    }

    /// Current target position; follows the robot while held
    pub fn target_position(&self) -> (f32, f32) {
        let state = self.state.lock();
        (state.target_x, state.target_y)
    }

    /// Check if the gripper holds the target
    pub fn is_holding(&self) -> bool {
        self.state.lock().holding
    }

    /// Current arm pose
    pub fn arm_pose(&self) -> ArmPose {
        self.state.lock().arm_pose
    }

    pub(super) fn with<R>(&self, f: impl FnOnce(&mut WorldState) -> R) -> R {
        let mut state = self.state.lock();
        f(&mut state)
    }
}

impl WorldState {
    /// Range (meters) and bearing (degrees, CCW positive) of a point seen from the robot
    pub fn relative(&self, px: f32, py: f32) -> (f32, f32) {
        let dx = px - self.x;
        let dy = py - self.y;
        let range = (dx * dx + dy * dy).sqrt();
        let bearing = normalize_deg(dy.atan2(dx).to_degrees() - self.heading_deg);
        (range, bearing)
    }

    /// Range and bearing of the target
    pub fn target_relative(&self) -> (f32, f32) {
        self.relative(self.target_x, self.target_y)
    }
}

/// Normalize angle to (-180, 180] degrees
pub(super) fn normalize_deg(angle: f32) -> f32 {
    let mut a = angle % 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a <= -180.0 {
        a += 360.0;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_relative_bearing() {
        let world = SimWorld::new(SimConfig::default());
        world.set_pose(0.0, 0.0, 90.0);
        let (range, bearing) = world.with(|w| w.relative(1.0, 1.0));
        assert_relative_eq!(range, 2.0f32.sqrt(), epsilon = 1e-5);
        assert_relative_eq!(bearing, -45.0, epsilon = 1e-3);
    }

    #[test]
    fn test_normalize_deg() {
        assert_relative_eq!(normalize_deg(270.0), -90.0);
        assert_relative_eq!(normalize_deg(-180.0), 180.0);
        assert_relative_eq!(normalize_deg(725.0), 5.0, epsilon = 1e-4);
    }
}
