//! Vision measurement types

use std::time::Instant;

/// One detector reading, produced per control tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionSample {
    /// Whether the target is in view
    pub detected: bool,
    /// Horizontal offset of the target from image centre (pixels, positive = right)
    pub bearing_error_px: i32,
    /// Distance estimated from apparent size (centimetres)
    pub estimated_distance_cm: f32,
    /// When the frame was captured
    pub timestamp: Instant,
}

impl DetectionSample {
    /// Sample with the target in view
    pub fn hit(bearing_error_px: i32, estimated_distance_cm: f32) -> Self {
        Self {
            detected: true,
            bearing_error_px,
            estimated_distance_cm,
            timestamp: Instant::now(),
        }
    }

    /// Sample with no target in view
    pub fn miss() -> Self {
        Self {
            detected: false,
            bearing_error_px: 0,
            estimated_distance_cm: 0.0,
            timestamp: Instant::now(),
        }
    }
}
