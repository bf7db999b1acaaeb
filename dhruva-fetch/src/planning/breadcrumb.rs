//! Record of traversed poses, replayed backwards on the return leg.

use crate::geometry::Pose2D;

/// Append-only pose history.
#[derive(Debug, Clone, Default)]
pub struct BreadcrumbTrail {
    poses: Vec<Pose2D>,
}

impl BreadcrumbTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pose.
    #[inline]
    pub fn record(&mut self, pose: Pose2D) {
        self.poses.push(pose);
    }

    /// Recorded poses, newest first. The trail itself is untouched.
    pub fn reverse_path(&self) -> Vec<Pose2D> {
        self.poses.iter().rev().copied().collect()
    }

    pub fn clear(&mut self) {
        self.poses.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Poses in recording order.
    pub fn iter(&self) -> impl Iterator<Item = &Pose2D> {
        self.poses.iter()
    }
}
