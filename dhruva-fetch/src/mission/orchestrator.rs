//! Fetch mission state machine.
//!
//! Driven one control tick at a time. Each tick does the work of the current
//! state (at most one detector poll and a short burst of motion), then feeds
//! the resulting event through [`transition`]. Every device call is measured
//! against a budget, and the abort flag is checked before any work is done.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use hasta_io::{
    ArmPose, DetectionSample, DeviceSet, Detector, GripperState, Locomotion, Manipulator,
    MotionCommand, ObstacleReadings,
};

use crate::command::{CommandParser, TaskAction, TaskPlan};
use crate::config::FetchConfig;
use crate::error::{FetchError, Result};
use crate::geometry::{Pose2D, Waypoint};
use crate::odometry::Odometry;
use crate::planning::{BreadcrumbTrail, SearchPathPlanner};
use crate::servo::{ServoStatus, VisualServoController};

use super::navigation::{TransitMove, avoidance_maneuver, front_blocked, next_move};
use super::report::{FailureReason, MissionOutcome, MissionReport, Progress};
use super::state::{AgentState, MissionEvent, transition};

/// Request to stop the running mission at the next tick boundary.
#[derive(Clone, Debug, Default)]
pub struct AbortHandle {
    requested: Arc<AtomicBool>,
}

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.requested.store(false, Ordering::SeqCst);
    }
}

/// Whether executed commands extend the breadcrumb trail
#[derive(Clone, Copy, PartialEq, Eq)]
enum Trail {
    Record,
    Skip,
}

/// Per-mission bookkeeping, dropped when the mission ends
struct Mission {
    plan: TaskPlan,
    waypoints: Vec<Waypoint>,
    /// Index of the first waypoint not yet reached
    next_waypoint: usize,
    /// Obstacle detours since the current goal was set
    detours: u32,
    /// Consecutive approach ticks without a detection
    lost_ticks: u32,
    approach_ticks: u32,
    grasp_attempts: u32,
    /// Reversed trail still to drive
    return_queue: VecDeque<Pose2D>,
    /// Trail poses reached while returning
    return_path: Vec<Pose2D>,
    target_location: Option<Pose2D>,
    ticks: u32,
    failure: Option<(FailureReason, String)>,
}

impl Mission {
    fn new(plan: TaskPlan) -> Self {
        Self {
            plan,
            waypoints: Vec::new(),
            next_waypoint: 0,
            detours: 0,
            lost_ticks: 0,
            approach_ticks: 0,
            grasp_attempts: 0,
            return_queue: VecDeque::new(),
            return_path: Vec::new(),
            target_location: None,
            ticks: 0,
            failure: None,
        }
    }

    fn into_report(self, final_pose: Pose2D) -> MissionReport {
        let outcome = match self.failure {
            Some((reason, message)) => MissionOutcome::Failed { reason, message },
            None => MissionOutcome::Completed,
        };
        MissionReport {
            plan: self.plan,
            outcome,
            target_location: self.target_location,
            return_path: self.return_path,
            ticks: self.ticks,
            final_pose,
        }
    }
}

/// Mission controller owning the robot's collaborators and pose estimate.
pub struct TaskOrchestrator {
    config: FetchConfig,
    parser: Box<dyn CommandParser>,
    detector: Box<dyn Detector>,
    locomotion: Box<dyn Locomotion>,
    manipulator: Box<dyn Manipulator>,
    planner: SearchPathPlanner,
    servo: VisualServoController,
    odometry: Odometry,
    trail: BreadcrumbTrail,
    state: AgentState,
    abort: AbortHandle,
    mission: Option<Mission>,
}

impl TaskOrchestrator {
    /// Create an idle orchestrator at the origin.
    pub fn new(
        config: FetchConfig,
        parser: Box<dyn CommandParser>,
        devices: DeviceSet,
    ) -> Result<Self> {
        Self::with_start_pose(config, parser, devices, Pose2D::default())
    }

    /// Create an idle orchestrator with a known starting pose.
    pub fn with_start_pose(
        config: FetchConfig,
        parser: Box<dyn CommandParser>,
        devices: DeviceSet,
        start_pose: Pose2D,
    ) -> Result<Self> {
        config.validate()?;
        let odometry = Odometry::new(
            config.motion.base_speed_mps,
            config.motion.turn_rate_deg_s,
            start_pose,
        );
        Ok(Self {
            servo: VisualServoController::new(config.servo.clone()),
            config,
            parser,
            detector: devices.detector,
            locomotion: devices.locomotion,
            manipulator: devices.manipulator,
            planner: SearchPathPlanner::new(),
            odometry,
            trail: BreadcrumbTrail::new(),
            state: AgentState::Idle,
            abort: AbortHandle::new(),
            mission: None,
        })
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Current pose estimate
    pub fn pose(&self) -> Pose2D {
        self.odometry.pose()
    }

    pub fn trail(&self) -> &BreadcrumbTrail {
        &self.trail
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Plan of the running mission
    pub fn plan(&self) -> Option<&TaskPlan> {
        self.mission.as_ref().map(|m| &m.plan)
    }

    /// Index of the waypoint the search is heading for
    pub fn waypoint_index(&self) -> Option<usize> {
        self.mission
            .as_ref()
            .filter(|m| m.next_waypoint < m.waypoints.len())
            .map(|m| m.next_waypoint)
    }

    /// Waypoints of the running mission's sweep
    pub fn waypoints(&self) -> &[Waypoint] {
        self.mission
            .as_ref()
            .map(|m| m.waypoints.as_slice())
            .unwrap_or(&[])
    }

    /// One-line summary for status output
    pub fn status_line(&self) -> String {
        let pose = self.pose();
        match &self.mission {
            None => format!("{} at {}", self.state, pose),
            Some(mission) => format!(
                "{} ({}) at {}, waypoint {}/{}, trail {}",
                self.state,
                mission.plan,
                pose,
                mission.next_waypoint.min(mission.waypoints.len()),
                mission.waypoints.len(),
                self.trail.len()
            ),
        }
    }

    /// Parse a command and start a mission.
    ///
    /// A parse failure leaves the orchestrator idle.
    pub fn begin(&mut self, raw: &str) -> Result<TaskPlan> {
        if self.state.is_active() {
            return Err(FetchError::Busy);
        }
        let plan = self.parser.parse(raw)?;
        tracing::info!("Mission accepted: {} (via {} parser)", plan, self.parser.name());

        self.abort.clear();
        let mut mission = Mission::new(plan.clone());
        self.apply(&mut mission, MissionEvent::CommandReceived);
        self.mission = Some(mission);
        Ok(plan)
    }

    /// Run one control tick.
    pub fn step(&mut self) -> Progress {
        let Some(mut mission) = self.mission.take() else {
            return Progress::Idle;
        };
        mission.ticks += 1;

        if self.state != AgentState::Error && self.abort.is_requested() {
            tracing::warn!("Abort requested during {}", self.state);
            self.fail(&mut mission, FetchError::Aborted);
            self.mission = Some(mission);
            return Progress::Running(self.state);
        }

        let outcome = match self.state {
            AgentState::Idle => Ok(None),
            AgentState::Planning => self.plan_tick(&mut mission),
            AgentState::Searching => self.search_tick(&mut mission),
            AgentState::Approaching => self.approach_tick(&mut mission),
            AgentState::Grasping => self.grasp_tick(&mut mission),
            AgentState::Returning => self.return_tick(&mut mission),
            AgentState::TaskComplete => self.complete_tick(&mission),
            AgentState::Error => Ok(Some(self.error_tick(&mission))),
        };

        match outcome {
            Ok(Some(event)) => self.apply(&mut mission, event),
            Ok(None) => {}
            Err(error) => self.fail(&mut mission, error),
        }

        if self.state == AgentState::Idle {
            let report = mission.into_report(self.odometry.pose());
            match &report.outcome {
                MissionOutcome::Completed => tracing::info!("Mission complete: {}", report),
                MissionOutcome::Failed { .. } => tracing::warn!("Mission failed: {}", report),
            }
            return Progress::Finished(report);
        }

        self.mission = Some(mission);
        Progress::Running(self.state)
    }

    /// Parse a command and tick until the mission ends.
    pub fn run(&mut self, raw: &str) -> Result<MissionReport> {
        self.begin(raw)?;
        loop {
            match self.step() {
                Progress::Running(_) => {}
                Progress::Finished(report) => return Ok(report),
                Progress::Idle => {
                    return Err(FetchError::Internal(
                        "mission ended without a report".to_string(),
                    ));
                }
            }
        }
    }

    // --- State handlers ---

    fn plan_tick(&mut self, mission: &mut Mission) -> Result<Option<MissionEvent>> {
        let plan = &mission.plan;
        let detector = &mut self.detector;
        bounded(
            "detector initialize",
            self.config.mission.arm_timeout(),
            || detector.initialize(&plan.object_description, plan.object_color.as_deref()),
        )?;

        self.trail.clear();
        self.trail.record(self.odometry.pose());

        let search = &self.config.search;
        mission.waypoints =
            self.planner
                .generate(search.area_width_m, search.area_height_m, search.step_size_m)?;
        mission.next_waypoint = 0;
        tracing::info!(
            "Searching for {} over {} waypoints",
            mission.plan.object_description,
            mission.waypoints.len()
        );
        Ok(Some(MissionEvent::PlanReady))
    }

    fn search_tick(&mut self, mission: &mut Mission) -> Result<Option<MissionEvent>> {
        let sample = self.poll()?;
        if sample.detected {
            tracing::info!(
                "Target detected: bearing {} px, ~{:.0} cm",
                sample.bearing_error_px,
                sample.estimated_distance_cm
            );
            mission.lost_ticks = 0;
            mission.approach_ticks = 0;
            return Ok(Some(MissionEvent::TargetDetected));
        }

        loop {
            let Some(goal) = mission.waypoints.get(mission.next_waypoint).copied() else {
                return Err(FetchError::ObjectNotFound {
                    waypoints: mission.waypoints.len(),
                });
            };
            match next_move(&self.odometry.pose(), &goal, &self.config.motion) {
                TransitMove::Arrived => {
                    mission.next_waypoint += 1;
                    mission.detours = 0;
                    tracing::debug!(
                        "Waypoint {}/{} {} reached",
                        mission.next_waypoint,
                        mission.waypoints.len(),
                        goal
                    );
                }
                TransitMove::Turn(command) => {
                    self.drive(command, Trail::Record)?;
                    return Ok(None);
                }
                TransitMove::Drive(command) => {
                    if self.guarded_forward(command, Trail::Record)? {
                        self.count_detour(mission, "search")?;
                    } else if self.odometry.pose().distance_to(&goal)
                        <= self.config.motion.waypoint_tolerance_m
                    {
                        mission.next_waypoint += 1;
                        mission.detours = 0;
                    }
                    return Ok(None);
                }
            }
        }
    }

    fn approach_tick(&mut self, mission: &mut Mission) -> Result<Option<MissionEvent>> {
        mission.approach_ticks += 1;
        if mission.approach_ticks > self.config.mission.max_approach_ticks {
            return Err(FetchError::Timeout { step: "approach" });
        }

        let sample = self.poll()?;
        let decision = self.servo.decide(&sample);
        match decision.status {
            ServoStatus::Lost => {
                mission.lost_ticks += 1;
                self.drive(decision.command, Trail::Record)?;
                if mission.lost_ticks < self.config.mission.lost_tick_threshold {
                    tracing::debug!(
                        "Target not in view ({}/{})",
                        mission.lost_ticks,
                        self.config.mission.lost_tick_threshold
                    );
                    return Ok(None);
                }
                if mission.next_waypoint < mission.waypoints.len() {
                    tracing::warn!(
                        "Target lost for {} ticks, resuming search at waypoint {}",
                        mission.lost_ticks,
                        mission.next_waypoint
                    );
                    mission.lost_ticks = 0;
                    Ok(Some(MissionEvent::TargetLost))
                } else {
                    Err(FetchError::ObjectLost)
                }
            }
            ServoStatus::Tracking => {
                mission.lost_ticks = 0;
                if decision.command.is_translation() {
                    self.guarded_forward(decision.command, Trail::Record)?;
                } else {
                    self.drive(decision.command, Trail::Record)?;
                }
                Ok(None)
            }
            ServoStatus::Arrived => {
                mission.lost_ticks = 0;
                let pose = self.drive(decision.command, Trail::Record)?;
                mission.target_location = Some(pose);
                tracing::info!(
                    "Reached {} at {} (~{:.0} cm)",
                    mission.plan.object_description,
                    pose,
                    sample.estimated_distance_cm
                );
                match mission.plan.action {
                    TaskAction::Fetch => Ok(Some(MissionEvent::ApproachComplete)),
                    TaskAction::Find => {
                        self.start_return(mission)?;
                        Ok(Some(MissionEvent::TargetLocated))
                    }
                }
            }
        }
    }

    fn grasp_tick(&mut self, mission: &mut Mission) -> Result<Option<MissionEvent>> {
        mission.grasp_attempts += 1;
        let force = self.config.mission.grip_force;
        tracing::info!(
            "Grasp attempt {} ({:?} grip)",
            mission.grasp_attempts,
            force
        );

        self.arm_pose(ArmPose::ReadyToGrab)?;
        self.gripper(GripperState::Closed)?;
        self.arm_pose(ArmPose::Lift)?;
        let manipulator = &mut self.manipulator;
        let held = bounded("grip check", self.config.mission.arm_timeout(), || {
            manipulator.verify_grip()
        })?;

        if held {
            tracing::info!("Grip verified");
            self.start_return(mission)?;
            return Ok(Some(MissionEvent::GraspVerified));
        }

        self.gripper(GripperState::Open)?;
        if mission.grasp_attempts > self.config.mission.grasp_retries {
            self.arm_pose(ArmPose::Home)?;
            return Err(FetchError::GraspFailed {
                attempts: mission.grasp_attempts,
            });
        }
        tracing::warn!("Grip not detected, retrying");
        Ok(None)
    }

    fn return_tick(&mut self, mission: &mut Mission) -> Result<Option<MissionEvent>> {
        loop {
            let Some(goal) = mission.return_queue.front().copied() else {
                tracing::info!("Back at start after {} trail poses", mission.return_path.len());
                return Ok(Some(MissionEvent::TrailConsumed));
            };
            match next_move(&self.odometry.pose(), &goal.position(), &self.config.motion) {
                TransitMove::Arrived => {
                    mission.return_queue.pop_front();
                    mission.return_path.push(goal);
                    mission.detours = 0;
                }
                TransitMove::Turn(command) => {
                    self.drive(command, Trail::Skip)?;
                    return Ok(None);
                }
                TransitMove::Drive(command) => {
                    if self.guarded_forward(command, Trail::Skip)? {
                        self.count_detour(mission, "return")?;
                    }
                    return Ok(None);
                }
            }
        }
    }

    fn complete_tick(&mut self, mission: &Mission) -> Result<Option<MissionEvent>> {
        if mission.plan.action == TaskAction::Fetch {
            self.arm_pose(ArmPose::Present)?;
            self.gripper(GripperState::Open)?;
            tracing::info!("Released {}", mission.plan.object_description);
        }
        self.arm_pose(ArmPose::Home)?;
        self.trail.clear();
        Ok(Some(MissionEvent::Released))
    }

    /// Best-effort cleanup: the failure is already recorded.
    fn error_tick(&mut self, mission: &Mission) -> MissionEvent {
        if let Some((reason, message)) = &mission.failure {
            tracing::warn!("Stopping after failure ({}): {}", reason, message);
        }
        if let Err(e) = self.locomotion.execute(&MotionCommand::Stop) {
            tracing::warn!("Stop failed during cleanup: {}", e);
        }
        if self.detector.is_active() {
            if let Err(e) = self.detector.release() {
                tracing::warn!("Detector release failed during cleanup: {}", e);
            }
        }
        MissionEvent::Reset
    }

    // --- Helpers ---

    fn apply(&mut self, mission: &mut Mission, event: MissionEvent) {
        match transition(self.state, event) {
            Ok(next) => {
                if next != self.state {
                    tracing::info!("{} -> {} ({:?})", self.state, next, event);
                }
                self.state = next;
            }
            Err(e) => {
                tracing::error!("{}", e);
                mission.failure = Some((FailureReason::Internal, e.to_string()));
                self.state = AgentState::Error;
            }
        }
    }

    fn fail(&mut self, mission: &mut Mission, error: FetchError) {
        let reason = FailureReason::from_error(&error);
        tracing::warn!("{} failed: {}", self.state, error);
        mission.failure = Some((reason, error.to_string()));
        let event = match reason {
            FailureReason::ObjectNotFound => MissionEvent::WaypointsExhausted,
            FailureReason::GraspFailed => MissionEvent::GraspFailed,
            other => MissionEvent::Fault(other),
        };
        self.apply(mission, event);
    }

    fn start_return(&mut self, mission: &mut Mission) -> Result<()> {
        self.detector.release().map_err(|source| FetchError::Device {
            step: "detector release",
            source,
        })?;
        mission.return_queue = self.trail.reverse_path().into();
        mission.return_path.clear();
        mission.detours = 0;
        tracing::info!("Returning along {} trail poses", mission.return_queue.len());
        Ok(())
    }

    fn poll(&mut self) -> Result<DetectionSample> {
        let detector = &mut self.detector;
        bounded("detector poll", self.config.mission.poll_timeout(), || {
            detector.poll()
        })
    }

    fn read_obstacles(&mut self) -> Result<ObstacleReadings> {
        let locomotion = &mut self.locomotion;
        bounded("obstacle sensors", self.config.mission.poll_timeout(), || {
            locomotion.read_obstacle_sensors()
        })
    }

    /// Execute a command and advance the pose estimate.
    fn drive(&mut self, command: MotionCommand, trail: Trail) -> Result<Pose2D> {
        let nominal_s = if self.state == AgentState::Approaching {
            self.servo.params().expected_duration(&command)
        } else {
            self.odometry.expected_duration(&command)
        };
        let budget = self.config.mission.command_budget(nominal_s);
        let locomotion = &mut self.locomotion;
        let ack = bounded("motion", budget, || locomotion.execute(&command))?;

        let pose = self.odometry.apply(&command);
        if trail == Trail::Record {
            self.trail.record(pose);
        }
        tracing::debug!("{} ({:.2}s) -> {}", command, ack.elapsed_s, pose);
        Ok(pose)
    }

    /// Drive forward unless the front is blocked, in which case steer around.
    ///
    /// Returns true when the avoidance maneuver ran instead of `command`.
    fn guarded_forward(&mut self, command: MotionCommand, trail: Trail) -> Result<bool> {
        let readings = self.read_obstacles()?;
        if front_blocked(&readings, &self.config.motion) {
            tracing::info!(
                "Obstacle at {:.2} m (left {:.2}, right {:.2}), avoiding",
                readings.front_m,
                readings.left_m,
                readings.right_m
            );
            for step in avoidance_maneuver(&readings, &self.config.motion) {
                self.drive(step, trail)?;
            }
            return Ok(true);
        }
        self.drive(command, trail)?;
        Ok(false)
    }

    /// Count a detour toward the current goal; past the limit the step times out.
    fn count_detour(&self, mission: &mut Mission, step: &'static str) -> Result<()> {
        mission.detours += 1;
        let limit = self.config.mission.max_detours_per_goal;
        if mission.detours > limit {
            tracing::warn!("Still blocked after {} detours", limit);
            return Err(FetchError::Timeout { step });
        }
        Ok(())
    }

    fn arm_pose(&mut self, pose: ArmPose) -> Result<()> {
        let manipulator = &mut self.manipulator;
        bounded("arm move", self.config.mission.arm_timeout(), || {
            manipulator.move_to_pose(pose)
        })
    }

    fn gripper(&mut self, state: GripperState) -> Result<()> {
        let force = self.config.mission.grip_force;
        let manipulator = &mut self.manipulator;
        bounded("gripper", self.config.mission.arm_timeout(), || {
            manipulator.set_gripper(state, force)
        })
    }
}

/// Run a device call, mapping its error and enforcing the time budget.
fn bounded<T>(
    step: &'static str,
    budget: Duration,
    call: impl FnOnce() -> hasta_io::Result<T>,
) -> Result<T> {
    let started = Instant::now();
    let value = call().map_err(|source| match source {
        hasta_io::Error::Timeout => FetchError::Timeout { step },
        source => FetchError::Device { step, source },
    })?;
    let elapsed = started.elapsed();
    if elapsed > budget {
        tracing::warn!(
            "{} took {:?}, budget {:?}",
            step,
            elapsed,
            budget
        );
        return Err(FetchError::Timeout { step });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::RuleBasedParser;
    use hasta_io::devices::scripted::{RecordingLocomotion, ScriptedArm, ScriptedDetector};

    fn orchestrator() -> (TaskOrchestrator, ScriptedDetector, RecordingLocomotion) {
        let detector = ScriptedDetector::new();
        let locomotion = RecordingLocomotion::new();
        let devices = DeviceSet {
            detector: Box::new(detector.clone()),
            locomotion: Box::new(locomotion.clone()),
            manipulator: Box::new(ScriptedArm::new()),
        };
        let orchestrator = TaskOrchestrator::new(
            FetchConfig::default(),
            Box::new(RuleBasedParser::new()),
            devices,
        )
        .unwrap();
        (orchestrator, detector, locomotion)
    }

    #[test]
    fn test_begin_moves_to_planning() {
        let (mut orch, detector, _) = orchestrator();
        let plan = orch.begin("bring me the red ball").unwrap();
        assert_eq!(plan.object_description, "red ball");
        assert_eq!(orch.state(), AgentState::Planning);

        assert!(matches!(orch.step(), Progress::Running(AgentState::Searching)));
        assert_eq!(
            detector.targets(),
            vec![("red ball".to_string(), Some("red".to_string()))]
        );
        assert_eq!(orch.trail().len(), 1);
        assert_eq!(orch.waypoints().len(), 14);
        assert_eq!(orch.waypoint_index(), Some(0));
    }

    #[test]
    fn test_idle_step_does_nothing() {
        let (mut orch, detector, locomotion) = orchestrator();
        assert!(matches!(orch.step(), Progress::Idle));
        assert_eq!(detector.poll_count(), 0);
        assert!(locomotion.commands().is_empty());
    }

    #[test]
    fn test_budget_overrun_is_timeout() {
        let result: Result<()> = bounded("slow", Duration::from_millis(1), || {
            std::thread::sleep(Duration::from_millis(20));
            Ok(())
        });
        assert!(matches!(result, Err(FetchError::Timeout { step: "slow" })));

        let result: Result<()> = bounded("driver", Duration::from_secs(1), || {
            Err(hasta_io::Error::Timeout)
        });
        assert!(matches!(result, Err(FetchError::Timeout { step: "driver" })));
    }

    #[test]
    fn test_abort_handle_is_shared() {
        let (orch, _, _) = orchestrator();
        let handle = orch.abort_handle();
        handle.abort();
        assert!(orch.abort_handle().is_requested());
    }
}
