//! Transit steps toward a point and obstacle avoidance.

use hasta_io::{MotionCommand, ObstacleReadings, TurnDirection};

use crate::config::MotionConfig;
use crate::geometry::{Pose2D, Waypoint};

/// Next transit action toward a goal
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransitMove {
    /// Within tolerance of the goal
    Arrived,
    /// Rotate in place to face the goal
    Turn(MotionCommand),
    /// Drive toward the goal; the front must be checked first
    Drive(MotionCommand),
}

/// Choose one transit step: face the goal first, then drive at most one
/// transit segment toward it.
pub fn next_move(pose: &Pose2D, goal: &Waypoint, motion: &MotionConfig) -> TransitMove {
    let distance = pose.distance_to(goal);
    if distance <= motion.waypoint_tolerance_m {
        return TransitMove::Arrived;
    }

    let heading_error = pose.heading_error_to(goal);
    if heading_error.abs() > motion.heading_tolerance_deg {
        return TransitMove::Turn(MotionCommand::Turn {
            direction: TurnDirection::toward(heading_error),
            angle_deg: heading_error.abs(),
        });
    }

    let duration_s = (distance / motion.base_speed_mps).min(motion.transit_step_s);
    TransitMove::Drive(MotionCommand::Forward { duration_s })
}

/// True when the front sensor reports something inside the safety distance
#[inline]
pub fn front_blocked(readings: &ObstacleReadings, motion: &MotionConfig) -> bool {
    readings.front_m < motion.min_safe_distance_m
}

/// Stop, back off, then turn toward the clearer side.
///
/// Left is preferred when both sides are clear; with neither side clear the
/// robot turns around.
pub fn avoidance_maneuver(readings: &ObstacleReadings, motion: &MotionConfig) -> [MotionCommand; 3] {
    let min_safe = motion.min_safe_distance_m;
    let escape = if readings.left_clear(min_safe) {
        MotionCommand::Turn {
            direction: TurnDirection::Left,
            angle_deg: motion.avoid_turn_deg,
        }
    } else if readings.right_clear(min_safe) {
        MotionCommand::Turn {
            direction: TurnDirection::Right,
            angle_deg: motion.avoid_turn_deg,
        }
    } else {
        MotionCommand::Turn {
            direction: TurnDirection::Right,
            angle_deg: 180.0,
        }
    };
    [
        MotionCommand::Stop,
        MotionCommand::Backward {
            duration_s: motion.backoff_s,
        },
        escape,
    ]
}
