//! Mission outcome reporting.

use std::fmt;

use crate::command::TaskPlan;
use crate::error::FetchError;
use crate::geometry::Pose2D;

use super::state::AgentState;

/// Category of an unrecoverable mission failure
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureReason {
    ParseError,
    InvalidConfiguration,
    ObjectNotFound,
    ObjectLost,
    GraspFailed,
    Timeout,
    Aborted,
    /// A device call failed
    Hardware,
    /// The state machine was driven with an event it does not accept
    Internal,
}

impl FailureReason {
    pub fn from_error(error: &FetchError) -> Self {
        match error {
            FetchError::Parse(_) => FailureReason::ParseError,
            FetchError::InvalidConfiguration(_) | FetchError::Config(_) => {
                FailureReason::InvalidConfiguration
            }
            FetchError::ObjectNotFound { .. } => FailureReason::ObjectNotFound,
            FetchError::ObjectLost => FailureReason::ObjectLost,
            FetchError::GraspFailed { .. } => FailureReason::GraspFailed,
            FetchError::Timeout { .. } => FailureReason::Timeout,
            FetchError::Aborted => FailureReason::Aborted,
            FetchError::Device { .. } | FetchError::Io(_) => FailureReason::Hardware,
            FetchError::Busy | FetchError::Internal(_) => FailureReason::Internal,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// How a mission ended
#[derive(Clone, Debug, PartialEq)]
pub enum MissionOutcome {
    Completed,
    Failed {
        reason: FailureReason,
        message: String,
    },
}

/// Summary delivered when a mission ends
#[derive(Clone, Debug)]
pub struct MissionReport {
    pub plan: TaskPlan,
    pub outcome: MissionOutcome,
    /// Robot pose when the target was reached
    pub target_location: Option<Pose2D>,
    /// Trail poses reached on the way back, in driving order
    pub return_path: Vec<Pose2D>,
    /// Control ticks spent
    pub ticks: u32,
    pub final_pose: Pose2D,
}

impl MissionReport {
    pub fn is_success(&self) -> bool {
        self.outcome == MissionOutcome::Completed
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        match &self.outcome {
            MissionOutcome::Completed => None,
            MissionOutcome::Failed { reason, .. } => Some(*reason),
        }
    }
}

impl fmt::Display for MissionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            MissionOutcome::Completed => write!(f, "{}: completed", self.plan)?,
            MissionOutcome::Failed { reason, message } => {
                write!(f, "{}: failed ({}): {}", self.plan, reason, message)?
            }
        }
        if let Some(location) = self.target_location {
            write!(f, ", target at {}", location)?;
        }
        write!(f, ", {} ticks, final pose {}", self.ticks, self.final_pose)
    }
}

/// Result of one orchestrator tick
#[derive(Clone, Debug)]
pub enum Progress {
    /// No mission
    Idle,
    /// Mission continues in this state
    Running(AgentState),
    /// Mission ended; the orchestrator is idle again
    Finished(MissionReport),
}
