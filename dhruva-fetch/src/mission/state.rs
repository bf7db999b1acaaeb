//! Mission states and the transition table.

use std::fmt;

use thiserror::Error;

use super::report::FailureReason;

/// Phase of the fetch mission. Exactly one is active per orchestrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AgentState {
    /// Waiting for a command
    Idle,
    /// Preparing detector, trail and search path
    Planning,
    /// Sweeping the search area
    Searching,
    /// Closing in on a detected target
    Approaching,
    /// Picking the target up
    Grasping,
    /// Retracing the breadcrumb trail
    Returning,
    /// Back at the start, handing the object over
    TaskComplete,
    /// Mission failed, cleaning up
    Error,
}

impl AgentState {
    /// True while a mission is in progress
    pub fn is_active(self) -> bool {
        self != AgentState::Idle
    }

    pub fn name(self) -> &'static str {
        match self {
            AgentState::Idle => "IDLE",
            AgentState::Planning => "PLANNING",
            AgentState::Searching => "SEARCHING",
            AgentState::Approaching => "APPROACHING",
            AgentState::Grasping => "GRASPING",
            AgentState::Returning => "RETURNING",
            AgentState::TaskComplete => "TASK_COMPLETE",
            AgentState::Error => "ERROR",
        }
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trigger for a state change
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissionEvent {
    /// A command arrived while idle
    CommandReceived,
    /// Detector, trail and waypoints are ready
    PlanReady,
    /// Every waypoint visited without a detection
    WaypointsExhausted,
    TargetDetected,
    /// Target out of view for too many ticks, waypoints remain
    TargetLost,
    /// Target centred and within reach
    ApproachComplete,
    /// Target reached on a find-only mission
    TargetLocated,
    GraspVerified,
    /// Grasp retries used up
    GraspFailed,
    /// Reverse trail fully driven
    TrailConsumed,
    /// Object handed over, arm stowed
    Released,
    /// Unrecoverable failure in any active state
    Fault(FailureReason),
    /// Failure reported, back to idle
    Reset,
}

/// Event not allowed in the current state
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no transition from {from} on {event:?}")]
pub struct InvalidTransition {
    pub from: AgentState,
    pub event: MissionEvent,
}

/// The mission transition table.
pub fn transition(
    state: AgentState,
    event: MissionEvent,
) -> Result<AgentState, InvalidTransition> {
    use AgentState as S;
    use MissionEvent as E;

    let next = match (state, event) {
        (S::Idle, E::CommandReceived) => S::Planning,
        (S::Planning, E::PlanReady) => S::Searching,
        (S::Searching, E::TargetDetected) => S::Approaching,
        (S::Searching, E::WaypointsExhausted) => S::Error,
        (S::Approaching, E::TargetLost) => S::Searching,
        (S::Approaching, E::ApproachComplete) => S::Grasping,
        (S::Approaching, E::TargetLocated) => S::Returning,
        (S::Grasping, E::GraspVerified) => S::Returning,
        (S::Grasping, E::GraspFailed) => S::Error,
        (S::Returning, E::TrailConsumed) => S::TaskComplete,
        (S::TaskComplete, E::Released) => S::Idle,
        (S::Error, E::Reset) => S::Idle,
        (
            S::Planning | S::Searching | S::Approaching | S::Grasping | S::Returning
            | S::TaskComplete,
            E::Fault(_),
        ) => S::Error,
        (from, event) => return Err(InvalidTransition { from, event }),
    };
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [AgentState; 8] = [
        AgentState::Idle,
        AgentState::Planning,
        AgentState::Searching,
        AgentState::Approaching,
        AgentState::Grasping,
        AgentState::Returning,
        AgentState::TaskComplete,
        AgentState::Error,
    ];

    #[test]
    fn test_fetch_path() {
        let events = [
            MissionEvent::CommandReceived,
            MissionEvent::PlanReady,
            MissionEvent::TargetDetected,
            MissionEvent::ApproachComplete,
            MissionEvent::GraspVerified,
            MissionEvent::TrailConsumed,
            MissionEvent::Released,
        ];
        let mut state = AgentState::Idle;
        let mut visited = vec![state];
        for event in events {
            state = transition(state, event).unwrap();
            visited.push(state);
        }
        assert_eq!(
            visited,
            vec![
                AgentState::Idle,
                AgentState::Planning,
                AgentState::Searching,
                AgentState::Approaching,
                AgentState::Grasping,
                AgentState::Returning,
                AgentState::TaskComplete,
                AgentState::Idle,
            ]
        );
    }

    #[test]
    fn test_recoverable_and_find_edges() {
        assert_eq!(
            transition(AgentState::Approaching, MissionEvent::TargetLost),
            Ok(AgentState::Searching)
        );
        assert_eq!(
            transition(AgentState::Approaching, MissionEvent::TargetLocated),
            Ok(AgentState::Returning)
        );
        assert_eq!(
            transition(AgentState::Grasping, MissionEvent::GraspFailed),
            Ok(AgentState::Error)
        );
        assert_eq!(
            transition(AgentState::Error, MissionEvent::Reset),
            Ok(AgentState::Idle)
        );
    }

    #[test]
    fn test_fault_from_active_states_only() {
        let fault = MissionEvent::Fault(FailureReason::Aborted);
        for state in ALL_STATES {
            let result = transition(state, fault);
            match state {
                AgentState::Idle | AgentState::Error => assert!(result.is_err(), "{state}"),
                _ => assert_eq!(result, Ok(AgentState::Error), "{state}"),
            }
        }
    }

    #[test]
    fn test_illegal_transitions_rejected() {
        let illegal = [
            (AgentState::Idle, MissionEvent::PlanReady),
            (AgentState::Idle, MissionEvent::Reset),
            (AgentState::Planning, MissionEvent::CommandReceived),
            (AgentState::Searching, MissionEvent::GraspVerified),
            (AgentState::Searching, MissionEvent::ApproachComplete),
            (AgentState::Grasping, MissionEvent::TrailConsumed),
            (AgentState::Returning, MissionEvent::TargetDetected),
            (AgentState::TaskComplete, MissionEvent::Reset),
            (AgentState::Error, MissionEvent::Released),
        ];
        for (state, event) in illegal {
            assert_eq!(
                transition(state, event),
                Err(InvalidTransition { from: state, event })
            );
        }
    }

    #[test]
    fn test_only_idle_is_inactive() {
        for state in ALL_STATES {
            assert_eq!(state.is_active(), state != AgentState::Idle);
        }
        assert_eq!(AgentState::TaskComplete.to_string(), "TASK_COMPLETE");
    }
}
