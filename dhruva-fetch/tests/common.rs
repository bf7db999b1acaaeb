//! Shared fixtures for mission integration tests.

#![allow(dead_code)]

use dhruva_fetch::command::RuleBasedParser;
use dhruva_fetch::mission::{AgentState, MissionReport, Progress, TaskOrchestrator};
use dhruva_fetch::FetchConfig;
use hasta_io::DeviceSet;
use hasta_io::devices::scripted::{RecordingLocomotion, ScriptedArm, ScriptedDetector};

/// Upper bound on ticks before a test gives up on a mission
pub const MAX_TICKS: usize = 5_000;

/// Orchestrator wired to scripted devices, plus handles to inspect them
pub struct Rig {
    pub orchestrator: TaskOrchestrator,
    pub detector: ScriptedDetector,
    pub locomotion: RecordingLocomotion,
    pub arm: ScriptedArm,
}

pub fn rig() -> Rig {
    rig_with(FetchConfig::default())
}

pub fn rig_with(config: FetchConfig) -> Rig {
    let detector = ScriptedDetector::new();
    let locomotion = RecordingLocomotion::new();
    let arm = ScriptedArm::new();
    let devices = DeviceSet {
        detector: Box::new(detector.clone()),
        locomotion: Box::new(locomotion.clone()),
        manipulator: Box::new(arm.clone()),
    };
    let orchestrator =
        TaskOrchestrator::new(config, Box::new(RuleBasedParser::new()), devices).unwrap();
    Rig {
        orchestrator,
        detector,
        locomotion,
        arm,
    }
}

/// Config with a single 0.5 m row to sweep
pub fn single_row_config() -> FetchConfig {
    let mut config = FetchConfig::default();
    config.search.area_width_m = 0.5;
    config.search.area_height_m = 0.0;
    config
}

/// Tick until the orchestrator reaches `state`; false if the mission ended first
pub fn step_until(orchestrator: &mut TaskOrchestrator, state: AgentState) -> bool {
    for _ in 0..MAX_TICKS {
        if orchestrator.state() == state {
            return true;
        }
        match orchestrator.step() {
            Progress::Running(_) => {}
            Progress::Finished(_) | Progress::Idle => return orchestrator.state() == state,
        }
    }
    false
}

/// Tick until the mission reports
pub fn finish(orchestrator: &mut TaskOrchestrator) -> MissionReport {
    for _ in 0..MAX_TICKS {
        match orchestrator.step() {
            Progress::Running(_) => {}
            Progress::Finished(report) => return report,
            Progress::Idle => panic!("orchestrator idle without a report"),
        }
    }
    panic!("mission did not finish within {MAX_TICKS} ticks");
}
