//! Planar pose and waypoint types

use std::fmt;

use crate::utils::normalize_deg;

/// A point on the floor (meters)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Waypoint {
    pub x: f32,
    pub y: f32,
}

impl Waypoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    #[inline]
    pub fn distance(&self, other: &Waypoint) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl fmt::Display for Waypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// Robot pose: position in meters, heading in degrees (CCW from +X)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose2D {
    pub x: f32,
    pub y: f32,
    pub heading_deg: f32,
}

impl Pose2D {
    pub fn new(x: f32, y: f32, heading_deg: f32) -> Self {
        Self {
            x,
            y,
            heading_deg: normalize_deg(heading_deg),
        }
    }

    /// Position without heading
    #[inline]
    pub fn position(&self) -> Waypoint {
        Waypoint::new(self.x, self.y)
    }

    /// Distance from this pose to a point
    #[inline]
    pub fn distance_to(&self, target: &Waypoint) -> f32 {
        self.position().distance(target)
    }

    /// Signed heading change (degrees, CCW positive) that faces `target`
    pub fn heading_error_to(&self, target: &Waypoint) -> f32 {
        let dx = target.x - self.x;
        let dy = target.y - self.y;
        normalize_deg(dy.atan2(dx).to_degrees() - self.heading_deg)
    }
}

impl fmt::Display for Pose2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.2}, {:.2}, {:.0}°)",
            self.x, self.y, self.heading_deg
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_heading_error() {
        let pose = Pose2D::new(0.0, 0.0, 90.0);
        assert_relative_eq!(pose.heading_error_to(&Waypoint::new(1.0, 0.0)), -90.0);
        assert_relative_eq!(pose.heading_error_to(&Waypoint::new(0.0, 2.0)), 0.0);
        assert_relative_eq!(pose.heading_error_to(&Waypoint::new(-1.0, 0.0)), 90.0);
    }

    #[test]
    fn test_distance() {
        let pose = Pose2D::new(1.0, 1.0, 0.0);
        assert_relative_eq!(pose.distance_to(&Waypoint::new(4.0, 5.0)), 5.0);
    }
}
