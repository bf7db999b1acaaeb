//! Ultrasonic range readings

/// Distances reported by the front, left and right ultrasonic sensors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleReadings {
    /// Front sensor range (meters)
    pub front_m: f32,
    /// Left sensor range (meters)
    pub left_m: f32,
    /// Right sensor range (meters)
    pub right_m: f32,
}

impl ObstacleReadings {
    /// Readings with every sensor at the given range
    pub fn uniform(range_m: f32) -> Self {
        Self {
            front_m: range_m,
            left_m: range_m,
            right_m: range_m,
        }
    }

    pub fn front_clear(&self, min_safe_m: f32) -> bool {
        self.front_m > min_safe_m
    }

    pub fn left_clear(&self, min_safe_m: f32) -> bool {
        self.left_m > min_safe_m
    }

    pub fn right_clear(&self, min_safe_m: f32) -> bool {
        self.right_m > min_safe_m
    }
}
