//! Lawnmower search path generation.

use crate::error::{FetchError, Result};
use crate::geometry::Waypoint;

/// Fraction of a step below which a leftover strip of height gets no row of its own
const ROW_EPSILON: f32 = 1e-3;

/// Boustrophedon sweep planner.
///
/// Rows run parallel to the x axis, `step_size` apart. Even rows sweep from
/// x = 0 to x = width, odd rows sweep back, so consecutive waypoints only
/// ever differ along a single axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchPathPlanner;

impl SearchPathPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Generate the sweep for a `width` × `height` area.
    ///
    /// Returns two waypoints (row start, row end) per row. The last row always
    /// runs along y = `height` so the sweep covers the far edge without
    /// leaving the area.
    pub fn generate(&self, width: f32, height: f32, step_size: f32) -> Result<Vec<Waypoint>> {
        if !width.is_finite() || !height.is_finite() || !step_size.is_finite() {
            return Err(FetchError::InvalidConfiguration(format!(
                "search area must be finite (width={width}, height={height}, step={step_size})"
            )));
        }
        if width <= 0.0 {
            return Err(FetchError::InvalidConfiguration(format!(
                "search area width must be positive, got {width}"
            )));
        }
        if height < 0.0 {
            return Err(FetchError::InvalidConfiguration(format!(
                "search area height must not be negative, got {height}"
            )));
        }
        if step_size <= 0.0 {
            return Err(FetchError::InvalidConfiguration(format!(
                "search step must be positive, got {step_size}"
            )));
        }

        let rows = Self::row_count(height, step_size);
        let mut waypoints = Vec::with_capacity(rows * 2);
        for row in 0..rows {
            let y = if row + 1 == rows {
                height
            } else {
                row as f32 * step_size
            };
            if row % 2 == 0 {
                waypoints.push(Waypoint::new(0.0, y));
                waypoints.push(Waypoint::new(width, y));
            } else {
                waypoints.push(Waypoint::new(width, y));
                waypoints.push(Waypoint::new(0.0, y));
            }
        }

        tracing::debug!(
            "Search sweep: {} rows, {} waypoints over {:.2}x{:.2} m",
            rows,
            waypoints.len(),
            width,
            height
        );
        Ok(waypoints)
    }

    fn row_count(height: f32, step_size: f32) -> usize {
        ((height / step_size) - ROW_EPSILON).ceil().max(0.0) as usize + 1
    }
}
