//! DhruvaFetch - Mission controller for a fetch robot
//!
//! Takes a natural-language request ("bring me the red ball"), sweeps a
//! search area until the detector sees the object, servos onto it using
//! per-frame bearing and distance estimates, grasps it and retraces its own
//! trail back to the start.
//!
//! ## Layout
//!
//! - [`command`]: operator text to [`command::TaskPlan`]
//! - [`planning`]: lawnmower sweep and breadcrumb trail
//! - [`servo`]: stateless visual approach controller
//! - [`mission`]: the tick-driven state machine
//! - [`runner`]: mission worker thread with busy gate and abort
//!
//! Devices come from [`hasta_io`], either the simulator or scripted doubles.

pub mod command;
pub mod config;
pub mod error;
pub mod geometry;
pub mod mission;
pub mod odometry;
pub mod planning;
pub mod runner;
pub mod servo;
pub mod utils;

pub use config::FetchConfig;
pub use error::{FetchError, Result};
pub use geometry::{Pose2D, Waypoint};
pub use mission::{AgentState, MissionReport, TaskOrchestrator};
pub use runner::{MissionRunner, MissionUpdate};
