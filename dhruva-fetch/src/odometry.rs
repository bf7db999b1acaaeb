//! Command-based dead reckoning
//!
//! The controller has no wheel encoders to read back, so the pose estimate is
//! advanced from acknowledged motion commands using the drive base's nominal
//! speed and turn rate.

use hasta_io::MotionCommand;

use crate::geometry::Pose2D;
use crate::utils::normalize_deg;

/// Dead-reckoning pose tracker
#[derive(Debug, Clone)]
pub struct Odometry {
    /// Straight-line speed in m/s
    base_speed_mps: f32,
    /// In-place turn rate in deg/s
    turn_rate_deg_s: f32,
    /// Current estimated pose
    pose: Pose2D,
}

impl Odometry {
    pub fn new(base_speed_mps: f32, turn_rate_deg_s: f32, start_pose: Pose2D) -> Self {
        Self {
            base_speed_mps,
            turn_rate_deg_s,
            pose: start_pose,
        }
    }

    /// Current pose estimate
    #[inline]
    pub fn pose(&self) -> Pose2D {
        self.pose
    }

    /// Advance the estimate by one completed command
    pub fn apply(&mut self, command: &MotionCommand) -> Pose2D {
        match *command {
            MotionCommand::Forward { duration_s } => self.translate(self.base_speed_mps * duration_s),
            MotionCommand::Backward { duration_s } => {
                self.translate(-self.base_speed_mps * duration_s)
            }
            MotionCommand::Turn {
                direction,
                angle_deg,
            } => {
                self.pose.heading_deg =
                    normalize_deg(self.pose.heading_deg + direction.sign() * angle_deg);
            }
            MotionCommand::Stop => {}
        }
        self.pose
    }

    /// Nominal time the drive base needs for a command (seconds)
    pub fn expected_duration(&self, command: &MotionCommand) -> f32 {
        match *command {
            MotionCommand::Forward { duration_s } | MotionCommand::Backward { duration_s } => {
                duration_s
            }
            MotionCommand::Turn { angle_deg, .. } => angle_deg / self.turn_rate_deg_s,
            MotionCommand::Stop => 0.0,
        }
    }

    fn translate(&mut self, distance: f32) {
        let heading = self.pose.heading_deg.to_radians();
        self.pose.x += distance * heading.cos();
        self.pose.y += distance * heading.sin();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hasta_io::TurnDirection;

    #[test]
    fn test_square_returns_to_origin() {
        let mut odom = Odometry::new(0.5, 45.0, Pose2D::default());
        for _ in 0..4 {
            odom.apply(&MotionCommand::Forward { duration_s: 2.0 });
            odom.apply(&MotionCommand::Turn {
                direction: TurnDirection::Left,
                angle_deg: 90.0,
            });
        }
        let pose = odom.pose();
        assert_relative_eq!(pose.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(pose.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(pose.heading_deg, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_backward_and_right_turn() {
        let mut odom = Odometry::new(0.5, 45.0, Pose2D::new(1.0, 1.0, 0.0));
        odom.apply(&MotionCommand::Backward { duration_s: 1.0 });
        let pose = odom.apply(&MotionCommand::Turn {
            direction: TurnDirection::Right,
            angle_deg: 45.0,
        });
        assert_relative_eq!(pose.x, 0.5, epsilon = 1e-5);
        assert_relative_eq!(pose.heading_deg, -45.0);
        assert_relative_eq!(
            odom.expected_duration(&MotionCommand::Turn {
                direction: TurnDirection::Left,
                angle_deg: 90.0
            }),
            2.0
        );
    }
}
