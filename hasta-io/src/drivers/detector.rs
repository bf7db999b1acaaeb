//! Vision detector driver trait

use crate::error::Result;
use crate::types::DetectionSample;

/// Camera-backed object detector.
///
/// The detector is acquired with [`initialize`](Detector::initialize) for one
/// target and must be [`release`](Detector::release)d before it can be
/// re-targeted by another mission.
pub trait Detector: Send {
    /// Acquire the camera and set the target to look for
    fn initialize(&mut self, description: &str, color: Option<&str>) -> Result<()>;

    /// Capture one frame and report the target, if visible
    ///
    /// Must return within a bounded time; a stalled camera is reported as
    /// [`Error::Timeout`](crate::Error::Timeout).
    fn poll(&mut self) -> Result<DetectionSample>;

    /// Release the camera
    fn release(&mut self) -> Result<()>;

    /// Check if the camera is currently acquired
    fn is_active(&self) -> bool;
}
