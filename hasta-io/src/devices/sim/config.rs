//! Simulation configuration
//!
//! Every parameter has a default so an empty `[device.simulation]` table
//! produces a usable room. Camera constants follow a 640 px wide webcam with
//! a 600 px focal length.

use serde::Deserialize;

/// Top-level simulation parameters
#[derive(Debug, Clone, Deserialize)]
pub struct SimConfig {
    /// Robot start position X (meters)
    #[serde(default)]
    pub start_x: f32,

    /// Robot start position Y (meters)
    #[serde(default)]
    pub start_y: f32,

    /// Robot start heading (degrees, CCW from +X)
    #[serde(default)]
    pub start_heading_deg: f32,

    /// Drive speed (m/s)
    #[serde(default = "default_base_speed")]
    pub base_speed_mps: f32,

    /// In-place turn rate (deg/s)
    #[serde(default = "default_turn_rate")]
    pub turn_rate_deg_s: f32,

    /// Wall-clock seconds slept per simulated second (0 = no waiting)
    #[serde(default)]
    pub time_scale: f32,

    /// Noise seed (0 = random each run)
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,

    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub obstacles: Vec<ObstacleConfig>,

    #[serde(default)]
    pub camera: CameraConfig,

    #[serde(default)]
    pub sonar: SonarConfig,

    #[serde(default)]
    pub arm: ArmConfig,
}

/// The object placed in the room
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    #[serde(default = "default_target_x")]
    pub x: f32,

    #[serde(default = "default_target_y")]
    pub y: f32,

    /// Words the detector matches against (e.g. "red ball")
    #[serde(default = "default_target_description")]
    pub description: String,

    #[serde(default = "default_target_color")]
    pub color: Option<String>,

    /// True object width (cm)
    #[serde(default = "default_target_width")]
    pub width_cm: f32,
}

/// Round obstacle seen only by the ultrasonic sensors
#[derive(Debug, Clone, Deserialize)]
pub struct ObstacleConfig {
    pub x: f32,
    pub y: f32,
    pub radius_m: f32,
}

/// Camera model
#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_frame_width")]
    pub frame_width_px: u32,

    #[serde(default = "default_focal_length")]
    pub focal_length_px: f32,

    /// Horizontal field of view (degrees)
    #[serde(default = "default_field_of_view")]
    pub field_of_view_deg: f32,

    /// Beyond this range the target is too small to segment (meters)
    #[serde(default = "default_camera_range")]
    pub max_range_m: f32,

    #[serde(default = "default_bearing_stddev")]
    pub bearing_stddev_px: f32,

    #[serde(default = "default_distance_stddev")]
    pub distance_stddev_cm: f32,

    /// Probability that a visible target is missed in a frame
    #[serde(default = "default_dropout")]
    pub dropout_probability: f32,
}

/// Ultrasonic sensor model
#[derive(Debug, Clone, Deserialize)]
pub struct SonarConfig {
    #[serde(default = "default_sonar_range")]
    pub max_range_m: f32,

    #[serde(default = "default_sonar_stddev")]
    pub range_stddev_m: f32,

    /// Sensors sit on the rim of the base, this far from its centre
    #[serde(default = "default_robot_radius")]
    pub robot_radius_m: f32,
}

/// Gripper arm model
#[derive(Debug, Clone, Deserialize)]
pub struct ArmConfig {
    /// Furthest target distance the gripper can close on (meters)
    #[serde(default = "default_reach")]
    pub reach_m: f32,

    /// Largest target bearing the gripper can close on (degrees)
    #[serde(default = "default_max_grip_bearing")]
    pub max_grip_bearing_deg: f32,

    /// Probability that a well-placed grasp still slips
    #[serde(default)]
    pub grip_failure_probability: f32,
}

fn default_base_speed() -> f32 {
    0.5
}
fn default_turn_rate() -> f32 {
    45.0
}
fn default_random_seed() -> u64 {
    42
}
fn default_target_x() -> f32 {
    3.2
}
fn default_target_y() -> f32 {
    1.1
}
fn default_target_description() -> String {
    "red ball".to_string()
}
fn default_target_color() -> Option<String> {
    Some("red".to_string())
}
fn default_target_width() -> f32 {
    10.0
}
fn default_frame_width() -> u32 {
    640
}
fn default_focal_length() -> f32 {
    600.0
}
fn default_field_of_view() -> f32 {
    60.0
}
fn default_camera_range() -> f32 {
    2.0
}
fn default_bearing_stddev() -> f32 {
    2.0
}
fn default_distance_stddev() -> f32 {
    1.0
}
fn default_dropout() -> f32 {
    0.02
}
fn default_sonar_range() -> f32 {
    4.0
}
fn default_sonar_stddev() -> f32 {
    0.01
}
fn default_robot_radius() -> f32 {
    0.12
}
fn default_reach() -> f32 {
    0.40
}
fn default_max_grip_bearing() -> f32 {
    20.0
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start_x: 0.0,
            start_y: 0.0,
            start_heading_deg: 0.0,
            base_speed_mps: default_base_speed(),
            turn_rate_deg_s: default_turn_rate(),
            time_scale: 0.0,
            random_seed: default_random_seed(),
            target: TargetConfig::default(),
            obstacles: Vec::new(),
            camera: CameraConfig::default(),
            sonar: SonarConfig::default(),
            arm: ArmConfig::default(),
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            x: default_target_x(),
            y: default_target_y(),
            description: default_target_description(),
            color: default_target_color(),
            width_cm: default_target_width(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            frame_width_px: default_frame_width(),
            focal_length_px: default_focal_length(),
            field_of_view_deg: default_field_of_view(),
            max_range_m: default_camera_range(),
            bearing_stddev_px: default_bearing_stddev(),
            distance_stddev_cm: default_distance_stddev(),
            dropout_probability: default_dropout(),
        }
    }
}

impl Default for SonarConfig {
    fn default() -> Self {
        Self {
            max_range_m: default_sonar_range(),
            range_stddev_m: default_sonar_stddev(),
            robot_radius_m: default_robot_radius(),
        }
    }
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            reach_m: default_reach(),
            max_grip_bearing_deg: default_max_grip_bearing(),
            grip_failure_probability: 0.0,
        }
    }
}
