//! Shared utility functions

/// Normalize angle to (-180, 180] degrees
#[inline]
pub fn normalize_deg(angle: f32) -> f32 {
    let mut a = angle % 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a <= -180.0 {
        a += 360.0;
    }
    a
}
