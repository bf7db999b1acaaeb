//! Scripted test doubles
//!
//! Each double keeps its state behind an `Arc<Mutex<..>>`, so a test can keep
//! a clone of the handle after boxing the driver into a controller and inspect
//! what the controller did afterwards.

use crate::drivers::{Detector, Locomotion, Manipulator};
use crate::error::{Error, Result};
use crate::types::{
    ArmPose, DetectionSample, GripForce, GripperState, MotionAck, MotionCommand,
    ObstacleReadings,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Detector replaying a queue of samples; misses once the queue runs dry
#[derive(Clone, Default)]
pub struct ScriptedDetector {
    state: Arc<Mutex<DetectorScript>>,
}

#[derive(Default)]
struct DetectorScript {
    samples: VecDeque<DetectionSample>,
    active: bool,
    targets: Vec<(String, Option<String>)>,
    polls: usize,
    releases: usize,
    fail_initialize: bool,
    poll_delay: Duration,
}

impl ScriptedDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `count` frames with the target out of view
    pub fn push_misses(&self, count: usize) {
        let mut state = self.state.lock();
        state
            .samples
            .extend(std::iter::repeat_with(DetectionSample::miss).take(count));
    }

    /// Queue one frame with the target in view
    pub fn push_hit(&self, bearing_error_px: i32, estimated_distance_cm: f32) {
        self.state
            .lock()
            .samples
            .push_back(DetectionSample::hit(bearing_error_px, estimated_distance_cm));
    }

    /// Make every following `initialize` fail as if the camera were missing
    pub fn fail_initialize(&self, fail: bool) {
        self.state.lock().fail_initialize = fail;
    }

    /// Block each poll for this long
    pub fn set_poll_delay(&self, delay: Duration) {
        self.state.lock().poll_delay = delay;
    }

    /// Targets passed to `initialize`, in call order
    pub fn targets(&self) -> Vec<(String, Option<String>)> {
        self.state.lock().targets.clone()
    }

    pub fn poll_count(&self) -> usize {
        self.state.lock().polls
    }

    pub fn release_count(&self) -> usize {
        self.state.lock().releases
    }
}

impl Detector for ScriptedDetector {
    fn initialize(&mut self, description: &str, color: Option<&str>) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_initialize {
            return Err(Error::Unavailable("scripted camera missing".to_string()));
        }
        if state.active {
            return Err(Error::Unavailable("camera already acquired".to_string()));
        }
        state.active = true;
        state
            .targets
            .push((description.to_string(), color.map(str::to_string)));
        Ok(())
    }

    fn poll(&mut self) -> Result<DetectionSample> {
        let delay = {
            let mut state = self.state.lock();
            if !state.active {
                return Err(Error::NotInitialized("detector"));
            }
            state.polls += 1;
            state.poll_delay
        };
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        let mut state = self.state.lock();
        Ok(state
            .samples
            .pop_front()
            .unwrap_or_else(DetectionSample::miss))
    }

    fn release(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        if state.active {
            state.active = false;
            state.releases += 1;
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.state.lock().active
    }
}

/// Drive base that records every command and replays range readings
#[derive(Clone, Default)]
pub struct RecordingLocomotion {
    state: Arc<Mutex<LocomotionScript>>,
}

#[derive(Default)]
struct LocomotionScript {
    commands: Vec<MotionCommand>,
    readings: VecDeque<ObstacleReadings>,
    sensor_reads: usize,
    execute_delay: Duration,
    fail_execute: bool,
}

/// Range reported once the readings queue is empty (meters)
const CLEAR_RANGE_M: f32 = 4.0;

impl RecordingLocomotion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one set of range readings
    pub fn push_readings(&self, readings: ObstacleReadings) {
        self.state.lock().readings.push_back(readings);
    }

    /// Block each command for this long
    pub fn set_execute_delay(&self, delay: Duration) {
        self.state.lock().execute_delay = delay;
    }

    /// Make every following `execute` fail
    pub fn fail_execute(&self, fail: bool) {
        self.state.lock().fail_execute = fail;
    }

    /// Commands executed so far, in order
    pub fn commands(&self) -> Vec<MotionCommand> {
        self.state.lock().commands.clone()
    }

    pub fn sensor_reads(&self) -> usize {
        self.state.lock().sensor_reads
    }
}

impl Locomotion for RecordingLocomotion {
    fn execute(&mut self, command: &MotionCommand) -> Result<MotionAck> {
        let delay = {
            let mut state = self.state.lock();
            if state.fail_execute {
                return Err(Error::Unavailable("scripted motor fault".to_string()));
            }
            state.commands.push(*command);
            state.execute_delay
        };
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        Ok(MotionAck {
            elapsed_s: delay.as_secs_f32(),
        })
    }

    fn read_obstacle_sensors(&mut self) -> Result<ObstacleReadings> {
        let mut state = self.state.lock();
        state.sensor_reads += 1;
        Ok(state
            .readings
            .pop_front()
            .unwrap_or_else(|| ObstacleReadings::uniform(CLEAR_RANGE_M)))
    }
}

/// Arm recording poses and gripper calls, replaying grip verification results
#[derive(Clone, Default)]
pub struct ScriptedArm {
    state: Arc<Mutex<ArmScript>>,
}

/// One call made on the arm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmCall {
    Pose(ArmPose),
    Gripper(GripperState, GripForce),
    VerifyGrip,
}

#[derive(Default)]
struct ArmScript {
    calls: Vec<ArmCall>,
    grip_results: VecDeque<bool>,
    default_grip: bool,
}

impl ScriptedArm {
    /// Arm whose grip checks succeed unless scripted otherwise
    pub fn new() -> Self {
        let arm = Self::default();
        arm.state.lock().default_grip = true;
        arm
    }

    /// Queue grip verification results
    pub fn push_grip_results(&self, results: &[bool]) {
        self.state.lock().grip_results.extend(results.iter().copied());
    }

    /// Every call made on the arm, in order
    pub fn calls(&self) -> Vec<ArmCall> {
        self.state.lock().calls.clone()
    }

    /// Only the poses, in order
    pub fn poses(&self) -> Vec<ArmPose> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ArmCall::Pose(pose) => Some(pose),
                _ => None,
            })
            .collect()
    }
}

impl Manipulator for ScriptedArm {
    fn move_to_pose(&mut self, pose: ArmPose) -> Result<()> {
        self.state.lock().calls.push(ArmCall::Pose(pose));
        Ok(())
    }

    fn set_gripper(&mut self, state: GripperState, force: GripForce) -> Result<()> {
        self.state.lock().calls.push(ArmCall::Gripper(state, force));
        Ok(())
    }

    fn verify_grip(&mut self) -> Result<bool> {
        let mut state = self.state.lock();
        state.calls.push(ArmCall::VerifyGrip);
        let default = state.default_grip;
        Ok(state.grip_results.pop_front().unwrap_or(default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detector_replays_then_misses() {
        let script = ScriptedDetector::new();
        script.push_hit(120, 80.0);
        let mut detector: Box<dyn Detector> = Box::new(script.clone());

        assert!(detector.poll().is_err());
        detector.initialize("red ball", Some("red")).unwrap();
        assert!(detector.poll().unwrap().detected);
        assert!(!detector.poll().unwrap().detected);
        detector.release().unwrap();

        assert_eq!(script.poll_count(), 2);
        assert_eq!(script.release_count(), 1);
        assert_eq!(
            script.targets(),
            vec![("red ball".to_string(), Some("red".to_string()))]
        );
    }

    #[test]
    fn test_locomotion_records_in_order() {
        let script = RecordingLocomotion::new();
        let mut base: Box<dyn Locomotion> = Box::new(script.clone());
        base.execute(&MotionCommand::Forward { duration_s: 1.0 })
            .unwrap();
        base.execute(&MotionCommand::Stop).unwrap();
        assert_eq!(
            script.commands(),
            vec![MotionCommand::Forward { duration_s: 1.0 }, MotionCommand::Stop]
        );
        assert_eq!(
            base.read_obstacle_sensors().unwrap(),
            ObstacleReadings::uniform(CLEAR_RANGE_M)
        );
    }

    #[test]
    fn test_arm_grip_script() {
        let script = ScriptedArm::new();
        script.push_grip_results(&[false]);
        let mut arm: Box<dyn Manipulator> = Box::new(script.clone());
        assert!(!arm.verify_grip().unwrap());
        assert!(arm.verify_grip().unwrap());
        arm.move_to_pose(ArmPose::Home).unwrap();
        assert_eq!(script.poses(), vec![ArmPose::Home]);
    }
}
