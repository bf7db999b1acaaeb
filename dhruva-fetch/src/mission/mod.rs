//! Fetch mission sequencing.
//!
//! This module provides:
//! - The mission state set and its pure transition table
//! - Transit and obstacle-avoidance helpers
//! - The tick-driven orchestrator and its reports

mod navigation;
mod orchestrator;
mod report;
mod state;

pub use navigation::{TransitMove, avoidance_maneuver, front_blocked, next_move};
pub use orchestrator::{AbortHandle, TaskOrchestrator};
pub use report::{FailureReason, MissionOutcome, MissionReport, Progress};
pub use state::{AgentState, InvalidTransition, MissionEvent, transition};
