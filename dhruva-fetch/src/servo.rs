//! Visual servo controller.
//!
//! Turns one detector reading into one motion command: first centre the
//! target horizontally, then close the distance, then stop. The controller
//! keeps no state between ticks; lost-target counting belongs to the caller.

use hasta_io::{DetectionSample, MotionCommand, TurnDirection};
use serde::Deserialize;

use crate::error::{FetchError, Result};

/// Approach controller tuning
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ServoParams {
    /// Bearing error treated as centred (pixels)
    #[serde(default = "default_center_tolerance_px")]
    pub center_tolerance_px: i32,

    /// Stop once the target is this close (cm)
    #[serde(default = "default_target_distance_cm")]
    pub target_distance_cm: f32,

    /// Turn angle per pixel of bearing error (deg/px)
    #[serde(default = "default_turn_gain_deg_per_px")]
    pub turn_gain_deg_per_px: f32,

    /// Largest single correction turn (degrees)
    #[serde(default = "default_max_turn_deg")]
    pub max_turn_deg: f32,

    /// Duration of one forward creep (seconds)
    #[serde(default = "default_forward_step_s")]
    pub forward_step_s: f32,

    /// Seconds of drive time per degree turned
    #[serde(default = "default_turn_duration_scale")]
    pub turn_duration_scale: f32,
}

impl Default for ServoParams {
    fn default() -> Self {
        Self {
            center_tolerance_px: default_center_tolerance_px(),
            target_distance_cm: default_target_distance_cm(),
            turn_gain_deg_per_px: default_turn_gain_deg_per_px(),
            max_turn_deg: default_max_turn_deg(),
            forward_step_s: default_forward_step_s(),
            turn_duration_scale: default_turn_duration_scale(),
        }
    }
}

fn default_center_tolerance_px() -> i32 {
    50
}
fn default_target_distance_cm() -> f32 {
    30.0
}
fn default_turn_gain_deg_per_px() -> f32 {
    0.1
}
fn default_max_turn_deg() -> f32 {
    30.0
}
fn default_forward_step_s() -> f32 {
    0.5
}
fn default_turn_duration_scale() -> f32 {
    1.0 / 45.0
}

impl ServoParams {
    /// Reject values that would stall or invert the controller
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("target_distance_cm", self.target_distance_cm),
            ("turn_gain_deg_per_px", self.turn_gain_deg_per_px),
            ("max_turn_deg", self.max_turn_deg),
            ("forward_step_s", self.forward_step_s),
            ("turn_duration_scale", self.turn_duration_scale),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(FetchError::InvalidConfiguration(format!(
                    "servo.{name} must be a positive number, got {value}"
                )));
            }
        }
        if self.center_tolerance_px < 0 {
            return Err(FetchError::InvalidConfiguration(format!(
                "servo.center_tolerance_px must not be negative, got {}",
                self.center_tolerance_px
            )));
        }
        if self.max_turn_deg > 180.0 {
            return Err(FetchError::InvalidConfiguration(format!(
                "servo.max_turn_deg must be at most 180, got {}",
                self.max_turn_deg
            )));
        }
        Ok(())
    }

    /// Nominal time a command takes on the drive base (seconds)
    pub fn expected_duration(&self, command: &MotionCommand) -> f32 {
        match *command {
            MotionCommand::Forward { duration_s } | MotionCommand::Backward { duration_s } => {
                duration_s
            }
            MotionCommand::Turn { angle_deg, .. } => angle_deg * self.turn_duration_scale,
            MotionCommand::Stop => 0.0,
        }
    }
}

/// Outcome class of one servo tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServoStatus {
    /// Target seen, still correcting or closing in
    Tracking,
    /// Target centred and within reach
    Arrived,
    /// Target not in this frame
    Lost,
}

/// Command plus status for one tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ServoDecision {
    pub command: MotionCommand,
    pub status: ServoStatus,
}

impl ServoDecision {
    /// True when the approach has terminated successfully
    #[inline]
    pub fn done(&self) -> bool {
        self.status == ServoStatus::Arrived
    }
}

/// Stateless bearing/distance controller
#[derive(Clone, Debug, Default)]
pub struct VisualServoController {
    params: ServoParams,
}

impl VisualServoController {
    pub fn new(params: ServoParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ServoParams {
        &self.params
    }

    /// Decide the next command from one detection
    pub fn decide(&self, sample: &DetectionSample) -> ServoDecision {
        if !sample.detected {
            return ServoDecision {
                command: MotionCommand::Stop,
                status: ServoStatus::Lost,
            };
        }

        let bearing = sample.bearing_error_px;
        if bearing.abs() > self.params.center_tolerance_px {
            // Positive bearing: target right of centre
            let direction = if bearing > 0 {
                TurnDirection::Right
            } else {
                TurnDirection::Left
            };
            let angle_deg = (bearing.unsigned_abs() as f32 * self.params.turn_gain_deg_per_px)
                .min(self.params.max_turn_deg);
            return ServoDecision {
                command: MotionCommand::Turn {
                    direction,
                    angle_deg,
                },
                status: ServoStatus::Tracking,
            };
        }

        if sample.estimated_distance_cm > self.params.target_distance_cm {
            return ServoDecision {
                command: MotionCommand::Forward {
                    duration_s: self.params.forward_step_s,
                },
                status: ServoStatus::Tracking,
            };
        }

        ServoDecision {
            command: MotionCommand::Stop,
            status: ServoStatus::Arrived,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn controller() -> VisualServoController {
        VisualServoController::new(ServoParams::default())
    }

    #[test]
    fn test_off_centre_turns_toward_target() {
        let decision = controller().decide(&DetectionSample::hit(200, 120.0));
        match decision.command {
            MotionCommand::Turn {
                direction,
                angle_deg,
            } => {
                assert_eq!(direction, TurnDirection::Right);
                assert_relative_eq!(angle_deg, 20.0, epsilon = 1e-4);
            }
            other => panic!("expected a turn, got {other:?}"),
        }
        assert!(!decision.done());
    }

    #[test]
    fn test_turn_is_capped() {
        let decision = controller().decide(&DetectionSample::hit(-320, 120.0));
        assert_eq!(
            decision.command,
            MotionCommand::Turn {
                direction: TurnDirection::Left,
                angle_deg: 30.0
            }
        );
    }

    #[test]
    fn test_centred_and_far_moves_forward() {
        let decision = controller().decide(&DetectionSample::hit(20, 87.5));
        assert_eq!(
            decision.command,
            MotionCommand::Forward { duration_s: 0.5 }
        );
        assert_eq!(decision.status, ServoStatus::Tracking);
        assert!(!decision.done());
    }

    #[test]
    fn test_centred_and_close_arrives() {
        let decision = controller().decide(&DetectionSample::hit(3, 28.7));
        assert_eq!(decision.command, MotionCommand::Stop);
        assert!(decision.done());
    }

    #[test]
    fn test_tolerance_boundary_is_centred() {
        let decision = controller().decide(&DetectionSample::hit(50, 28.0));
        assert!(decision.done());
    }

    #[test]
    fn test_miss_is_lost() {
        let decision = controller().decide(&DetectionSample::miss());
        assert_eq!(decision.command, MotionCommand::Stop);
        assert_eq!(decision.status, ServoStatus::Lost);
        assert!(!decision.done());
    }

    #[test]
    fn test_same_input_same_output() {
        let servo = controller();
        for sample in [
            DetectionSample::hit(200, 120.0),
            DetectionSample::hit(20, 87.5),
            DetectionSample::hit(3, 28.7),
            DetectionSample::miss(),
        ] {
            assert_eq!(servo.decide(&sample), servo.decide(&sample));
        }
    }

    #[test]
    fn test_validate_and_durations() {
        let params = ServoParams::default();
        params.validate().unwrap();
        assert_relative_eq!(
            params.expected_duration(&MotionCommand::Turn {
                direction: TurnDirection::Left,
                angle_deg: 45.0
            }),
            1.0,
            epsilon = 1e-6
        );

        let bad = ServoParams {
            turn_gain_deg_per_px: 0.0,
            ..ServoParams::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(FetchError::InvalidConfiguration(_))
        ));
    }
}
