//! Simulated gripper arm

use super::world::SimWorld;
use crate::drivers::Manipulator;
use crate::error::Result;
use crate::types::{ArmPose, GripForce, GripperState};

/// Arm that picks up the simulated target when it is lifted with closed jaws
pub struct SimArm {
    world: SimWorld,
}

impl SimArm {
    pub fn new(world: SimWorld) -> Self {
        Self { world }
    }
}

impl Manipulator for SimArm {
    fn move_to_pose(&mut self, pose: ArmPose) -> Result<()> {
        self.world.with(|w| {
            w.arm_pose = pose;
            log::debug!("SimArm: pose '{}' joints {:?}", pose, pose.joint_angles());

            if pose == ArmPose::Lift && w.gripper == GripperState::Closed && !w.holding {
                let (range_m, bearing_deg) = w.target_relative();
                let arm = w.config.arm.clone();
                let in_reach =
                    range_m <= arm.reach_m && bearing_deg.abs() <= arm.max_grip_bearing_deg;
                let slipped = w.noise.occurs(arm.grip_failure_probability);
                if in_reach && !slipped {
                    w.holding = true;
                    w.target_x = w.x;
                    w.target_y = w.y;
                    log::info!("SimArm: target lifted");
                } else {
                    log::info!(
                        "SimArm: closed on nothing (target {:.2}m at {:.1}°)",
                        range_m,
                        bearing_deg
                    );
                }
            }
        });
        Ok(())
    }

    fn set_gripper(&mut self, state: GripperState, force: GripForce) -> Result<()> {
        self.world.with(|w| {
            w.gripper = state;
            if state == GripperState::Open && w.holding {
                w.holding = false;
                log::info!("SimArm: target released at ({:.2}, {:.2})", w.x, w.y);
            }
        });
        log::debug!(
            "SimArm: gripper {:?} (servo {:.0}°)",
            state,
            match state {
                GripperState::Open => 0.0,
                GripperState::Closed => force.servo_angle(),
            }
        );
        Ok(())
    }

    fn verify_grip(&mut self) -> Result<bool> {
        Ok(self
            .world
            .with(|w| w.holding && w.gripper == GripperState::Closed))
    }
}
