//! Simulated drive base and ultrasonic sensors

use super::world::{SimWorld, WorldState, normalize_deg};
use crate::drivers::Locomotion;
use crate::error::{Error, Result};
use crate::types::{MotionAck, MotionCommand, ObstacleReadings};
use std::time::Duration;

/// Constant-speed drive base moving the simulated robot
pub struct SimLocomotion {
    world: SimWorld,
}

impl SimLocomotion {
    pub fn new(world: SimWorld) -> Self {
        Self { world }
    }
}

impl Locomotion for SimLocomotion {
    fn execute(&mut self, command: &MotionCommand) -> Result<MotionAck> {
        let (elapsed_s, time_scale) = self.world.with(|w| -> Result<(f32, f32)> {
            let elapsed = drive(w, command)?;
            Ok((elapsed, w.config.time_scale))
        })?;

        log::debug!("SimLocomotion: {} ({:.2}s)", command, elapsed_s);

        if time_scale > 0.0 && elapsed_s > 0.0 {
            std::thread::sleep(Duration::from_secs_f32(elapsed_s * time_scale));
        }
        Ok(MotionAck { elapsed_s })
    }

    fn read_obstacle_sensors(&mut self) -> Result<ObstacleReadings> {
        Ok(self.world.with(|w| {
            let stddev = w.config.sonar.range_stddev_m;
            let max = w.config.sonar.max_range_m;
            let [front_m, left_m, right_m] = [0.0, 90.0, -90.0].map(|bearing_deg| {
                let true_m = sonar_range(w, bearing_deg);
                w.noise.range_m(true_m, stddev, max)
            });
            ObstacleReadings {
                front_m,
                left_m,
                right_m,
            }
        }))
    }
}

/// Apply one command to the world, returning its duration in seconds
fn drive(w: &mut WorldState, command: &MotionCommand) -> Result<f32> {
    let elapsed = match *command {
        MotionCommand::Forward { duration_s } | MotionCommand::Backward { duration_s } => {
            if !(duration_s.is_finite() && duration_s >= 0.0) {
                return Err(Error::InvalidParameter(format!(
                    "drive duration {duration_s}"
                )));
            }
            let sign = if matches!(command, MotionCommand::Forward { .. }) {
                1.0
            } else {
                -1.0
            };
            let distance = sign * w.config.base_speed_mps * duration_s;
            let heading = w.heading_deg.to_radians();
            w.x += distance * heading.cos();
            w.y += distance * heading.sin();
            duration_s
        }
        MotionCommand::Turn {
            direction,
            angle_deg,
        } => {
            if !(angle_deg.is_finite() && angle_deg >= 0.0) {
                return Err(Error::InvalidParameter(format!("turn angle {angle_deg}")));
            }
            w.heading_deg = normalize_deg(w.heading_deg + direction.sign() * angle_deg);
            angle_deg / w.config.turn_rate_deg_s
        }
        MotionCommand::Stop => 0.0,
    };

    if w.holding {
        w.target_x = w.x;
        w.target_y = w.y;
    }
    Ok(elapsed)
}

/// Distance from the base rim to the nearest obstacle along a sensor axis
fn sonar_range(w: &WorldState, mount_deg: f32) -> f32 {
    let axis = (w.heading_deg + mount_deg).to_radians();
    let (ux, uy) = (axis.cos(), axis.sin());
    let sonar = &w.config.sonar;

    w.config
        .obstacles
        .iter()
        .filter_map(|obstacle| {
            let cx = obstacle.x - w.x;
            let cy = obstacle.y - w.y;
            let along = cx * ux + cy * uy;
            let off_axis_sq = cx * cx + cy * cy - along * along;
            let radius_sq = obstacle.radius_m * obstacle.radius_m;
            if along < 0.0 || off_axis_sq > radius_sq {
                return None;
            }
            let hit = along - (radius_sq - off_axis_sq).sqrt();
            Some((hit - sonar.robot_radius_m).max(0.0))
        })
        .fold(sonar.max_range_m, f32::min)
}
