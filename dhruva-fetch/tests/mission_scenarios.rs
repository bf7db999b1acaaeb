//! Mission scenarios against scripted devices
//!
//! Each test scripts the detector, drive base and arm, then drives the
//! orchestrator tick by tick and checks the states, device calls and the
//! final report.

mod common;

use std::time::Duration;

use common::{finish, rig, rig_with, single_row_config, step_until};
use dhruva_fetch::mission::{
    AgentState, FailureReason, MissionOutcome, MissionReport, Progress,
};
use dhruva_fetch::{FetchConfig, FetchError};
use hasta_io::devices::scripted::ArmCall;
use hasta_io::{ArmPose, GripForce, GripperState, MotionCommand, ObstacleReadings, TurnDirection};

// ============================================================================
// Search and approach
// ============================================================================

#[test]
fn test_lost_target_resumes_search_at_same_waypoint() {
    let mut rig = rig();
    rig.detector.push_misses(3);
    rig.detector.push_hit(0, 100.0);
    rig.orchestrator.begin("bring me the red ball").unwrap();

    assert!(step_until(&mut rig.orchestrator, AgentState::Approaching));
    assert_eq!(rig.orchestrator.waypoint_index(), Some(1));

    // Script is empty now: every poll misses
    for _ in 0..4 {
        rig.orchestrator.step();
        assert_eq!(rig.orchestrator.state(), AgentState::Approaching);
    }
    rig.orchestrator.step();
    assert_eq!(rig.orchestrator.state(), AgentState::Searching);
    assert_eq!(rig.orchestrator.waypoint_index(), Some(1));
}

#[test]
fn test_lost_target_without_waypoints_fails() {
    let mut rig = rig_with(single_row_config());
    rig.detector.push_misses(1);
    rig.detector.push_hit(0, 100.0);
    rig.orchestrator.begin("fetch the red ball").unwrap();

    // Planning, then one search tick covers the whole row
    rig.orchestrator.step();
    rig.orchestrator.step();
    assert_eq!(rig.orchestrator.waypoint_index(), None);

    assert!(step_until(&mut rig.orchestrator, AgentState::Approaching));
    assert!(step_until(&mut rig.orchestrator, AgentState::Error));

    let report = finish(&mut rig.orchestrator);
    assert_eq!(report.failure_reason(), Some(FailureReason::ObjectLost));
    assert_eq!(rig.orchestrator.state(), AgentState::Idle);
}

#[test]
fn test_exhausted_search_reports_not_found() {
    let mut rig = rig_with(single_row_config());
    rig.orchestrator.begin("find my phone").unwrap();

    let report = finish(&mut rig.orchestrator);
    assert_eq!(report.failure_reason(), Some(FailureReason::ObjectNotFound));
    assert!(report.target_location.is_none());
    // Start pose plus the single forward leg
    assert_eq!(rig.orchestrator.trail().len(), 2);
    assert_eq!(rig.detector.release_count(), 1);
}

#[test]
fn test_obstacle_avoidance_keeps_waypoint() {
    let mut rig = rig();
    rig.locomotion.push_readings(ObstacleReadings {
        front_m: 0.1,
        left_m: 2.0,
        right_m: 2.0,
    });
    rig.orchestrator.begin("get the green bottle").unwrap();
    rig.orchestrator.step();
    rig.orchestrator.step();

    assert_eq!(
        rig.locomotion.commands(),
        vec![
            MotionCommand::Stop,
            MotionCommand::Backward { duration_s: 0.5 },
            MotionCommand::Turn {
                direction: TurnDirection::Left,
                angle_deg: 45.0,
            },
        ]
    );
    assert_eq!(rig.orchestrator.waypoint_index(), Some(1));
    assert_eq!(rig.orchestrator.state(), AgentState::Searching);
}

fn blocked_ahead() -> ObstacleReadings {
    ObstacleReadings {
        front_m: 0.1,
        left_m: 2.0,
        right_m: 2.0,
    }
}

fn backoffs(commands: &[MotionCommand]) -> usize {
    commands
        .iter()
        .filter(|c| matches!(c, MotionCommand::Backward { .. }))
        .count()
}

fn failure_message(report: &MissionReport) -> &str {
    match &report.outcome {
        MissionOutcome::Failed { message, .. } => message,
        MissionOutcome::Completed => "",
    }
}

#[test]
fn test_permanently_blocked_waypoint_times_out() {
    let mut rig = rig();
    for _ in 0..100 {
        rig.locomotion.push_readings(blocked_ahead());
    }
    rig.orchestrator.begin("fetch the red ball").unwrap();

    let report = finish(&mut rig.orchestrator);
    assert_eq!(report.failure_reason(), Some(FailureReason::Timeout));
    assert!(failure_message(&report).contains("search"), "{report}");
    // Default limit is five detours; the sixth gives up
    assert_eq!(backoffs(&rig.locomotion.commands()), 6);
    assert_eq!(rig.locomotion.sensor_reads(), 6);
    assert!(rig.orchestrator.trail().len() < 40);
    assert!(report.ticks < 20);
}

#[test]
fn test_detour_limit_is_configurable() {
    let mut config = FetchConfig::default();
    config.mission.max_detours_per_goal = 2;
    let mut rig = rig_with(config);
    for _ in 0..100 {
        rig.locomotion.push_readings(blocked_ahead());
    }

    let report = rig.orchestrator.run("fetch the red ball").unwrap();
    assert_eq!(report.failure_reason(), Some(FailureReason::Timeout));
    assert_eq!(backoffs(&rig.locomotion.commands()), 3);
}

#[test]
fn test_blocked_return_times_out() {
    let mut rig = rig();
    // One clear leg of search, then a wall between the robot and home
    rig.locomotion.push_readings(ObstacleReadings::uniform(4.0));
    for _ in 0..100 {
        rig.locomotion.push_readings(blocked_ahead());
    }
    rig.detector.push_misses(1);
    rig.detector.push_hit(0, 20.0);
    rig.detector.push_hit(0, 20.0);
    rig.orchestrator.begin("fetch the red ball").unwrap();

    assert!(step_until(&mut rig.orchestrator, AgentState::Returning));
    let report = finish(&mut rig.orchestrator);
    assert_eq!(report.failure_reason(), Some(FailureReason::Timeout));
    assert!(failure_message(&report).contains("return"), "{report}");
    assert_eq!(backoffs(&rig.locomotion.commands()), 6);
}

#[test]
fn test_approach_tick_limit() {
    let mut config = FetchConfig::default();
    config.mission.max_approach_ticks = 3;
    let mut rig = rig_with(config);
    for _ in 0..10 {
        rig.detector.push_hit(0, 100.0);
    }
    rig.orchestrator.begin("fetch the red ball").unwrap();

    let report = finish(&mut rig.orchestrator);
    assert_eq!(report.failure_reason(), Some(FailureReason::Timeout));
}

// ============================================================================
// Grasp and return
// ============================================================================

#[test]
fn test_grasp_failure_after_retry() {
    let mut rig = rig();
    rig.detector.push_hit(0, 20.0);
    rig.detector.push_hit(0, 20.0);
    rig.arm.push_grip_results(&[false, false]);

    let report = rig.orchestrator.run("bring me the blue cup").unwrap();
    assert_eq!(report.failure_reason(), Some(FailureReason::GraspFailed));
    assert_eq!(rig.orchestrator.state(), AgentState::Idle);

    let verifies = rig
        .arm
        .calls()
        .iter()
        .filter(|call| **call == ArmCall::VerifyGrip)
        .count();
    assert_eq!(verifies, 2);
    let calls = rig.arm.calls();
    assert_eq!(
        &calls[calls.len() - 2..],
        &[
            ArmCall::Gripper(GripperState::Open, GripForce::Medium),
            ArmCall::Pose(ArmPose::Home),
        ]
    );
    assert_eq!(rig.detector.release_count(), 1);
    assert_eq!(rig.locomotion.commands().last(), Some(&MotionCommand::Stop));
}

#[test]
fn test_return_path_is_reversed_trail() {
    let mut rig = rig();
    rig.detector.push_misses(2);
    rig.detector.push_hit(0, 100.0);
    rig.detector.push_hit(0, 100.0);
    rig.detector.push_hit(0, 20.0);
    rig.orchestrator.begin("fetch the red ball").unwrap();

    assert!(step_until(&mut rig.orchestrator, AgentState::Returning));
    // The camera is handed back before the drive home
    assert_eq!(rig.detector.release_count(), 1);
    let expected = rig.orchestrator.trail().reverse_path();
    assert!(expected.len() > 3);

    let report = finish(&mut rig.orchestrator);
    assert!(report.is_success(), "{report}");
    assert_eq!(report.return_path, expected);
    assert!(rig.orchestrator.trail().is_empty());
    assert!(report.final_pose.distance_to(&expected[expected.len() - 1].position()) < 0.1);
    assert_eq!(
        rig.arm.poses(),
        vec![
            ArmPose::ReadyToGrab,
            ArmPose::Lift,
            ArmPose::Present,
            ArmPose::Home,
        ]
    );
}

#[test]
fn test_find_mission_skips_grasp() {
    let mut rig = rig();
    rig.detector.push_hit(0, 20.0);
    rig.detector.push_hit(0, 20.0);

    let report = rig.orchestrator.run("where is the blue cup").unwrap();
    assert!(report.is_success(), "{report}");
    assert!(report.target_location.is_some());
    assert_eq!(rig.arm.calls(), vec![ArmCall::Pose(ArmPose::Home)]);
    assert_eq!(rig.detector.release_count(), 1);
}

// ============================================================================
// Commands and failures
// ============================================================================

#[test]
fn test_second_command_is_busy() {
    let mut rig = rig();
    rig.orchestrator.begin("fetch the red ball").unwrap();
    assert!(matches!(
        rig.orchestrator.begin("fetch the blue cup"),
        Err(FetchError::Busy)
    ));
    assert_eq!(
        rig.orchestrator.plan().map(|p| p.object_description.as_str()),
        Some("red ball")
    );
}

#[test]
fn test_parse_failure_stays_idle() {
    let mut rig = rig();
    assert!(matches!(
        rig.orchestrator.begin("sing me a song"),
        Err(FetchError::Parse(_))
    ));
    assert_eq!(rig.orchestrator.state(), AgentState::Idle);
    assert!(matches!(rig.orchestrator.step(), Progress::Idle));
    assert_eq!(rig.detector.poll_count(), 0);
    assert!(rig.detector.targets().is_empty());
}

#[test]
fn test_abort_stops_robot() {
    let mut rig = rig();
    rig.orchestrator.begin("fetch the red ball").unwrap();
    rig.orchestrator.step();
    rig.orchestrator.abort_handle().abort();

    let report = finish(&mut rig.orchestrator);
    assert_eq!(report.failure_reason(), Some(FailureReason::Aborted));
    assert_eq!(rig.locomotion.commands(), vec![MotionCommand::Stop]);
    assert_eq!(rig.detector.poll_count(), 0);

    // The next mission starts with the flag cleared
    rig.orchestrator.begin("fetch the red ball").unwrap();
    rig.orchestrator.step();
    assert_eq!(rig.orchestrator.state(), AgentState::Searching);
}

#[test]
fn test_slow_poll_times_out() {
    let mut config = FetchConfig::default();
    config.mission.poll_timeout_ms = 5;
    let mut rig = rig_with(config);
    rig.detector.set_poll_delay(Duration::from_millis(30));

    let report = rig.orchestrator.run("fetch the red ball").unwrap();
    assert_eq!(report.failure_reason(), Some(FailureReason::Timeout));
    assert_eq!(rig.detector.poll_count(), 1);
}

#[test]
fn test_camera_failure_is_hardware_fault() {
    let mut rig = rig();
    rig.detector.fail_initialize(true);

    let report = rig.orchestrator.run("fetch the red ball").unwrap();
    assert_eq!(report.failure_reason(), Some(FailureReason::Hardware));
    assert!(rig.orchestrator.waypoints().is_empty());
}

#[test]
fn test_motor_fault_is_hardware_fault() {
    let mut rig = rig();
    rig.locomotion.fail_execute(true);

    let report = rig.orchestrator.run("fetch the red ball").unwrap();
    assert_eq!(report.failure_reason(), Some(FailureReason::Hardware));
    assert_eq!(rig.detector.release_count(), 1);
}
