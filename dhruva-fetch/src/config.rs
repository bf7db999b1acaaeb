//! Configuration loading for DhruvaFetch

use crate::command::ParserConfig;
use crate::error::{FetchError, Result};
use crate::servo::ServoParams;
use hasta_io::{DeviceConfig, GripForce};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FetchConfig {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub servo: ServoParams,
    #[serde(default)]
    pub mission: MissionConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub device: DeviceConfig,
}

/// Search area swept when looking for the object
#[derive(Clone, Debug, Deserialize)]
pub struct SearchConfig {
    /// Area extent along x in meters (default: 5.0)
    #[serde(default = "default_area_width")]
    pub area_width_m: f32,

    /// Area extent along y in meters (default: 3.0)
    #[serde(default = "default_area_height")]
    pub area_height_m: f32,

    /// Spacing between sweep rows in meters (default: 0.5)
    #[serde(default = "default_step_size")]
    pub step_size_m: f32,
}

/// Mission sequencing limits
#[derive(Clone, Debug, Deserialize)]
pub struct MissionConfig {
    /// Consecutive missed frames before the approach gives up (default: 5)
    #[serde(default = "default_lost_tick_threshold")]
    pub lost_tick_threshold: u32,

    /// Extra grasp attempts after the first failure (default: 1)
    #[serde(default = "default_grasp_retries")]
    pub grasp_retries: u32,

    /// Approach ticks before the mission times out (default: 120)
    #[serde(default = "default_max_approach_ticks")]
    pub max_approach_ticks: u32,

    /// Obstacle detours toward one waypoint or return pose before the
    /// search or return times out (default: 5)
    #[serde(default = "default_max_detours_per_goal")]
    pub max_detours_per_goal: u32,

    /// Gripper force used for grasping
    #[serde(default)]
    pub grip_force: GripForce,

    /// Budget for one detector poll in milliseconds (default: 1000)
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,

    /// Budget for one arm or gripper call in milliseconds (default: 5000)
    #[serde(default = "default_arm_timeout_ms")]
    pub arm_timeout_ms: u64,

    /// Allowance on top of a motion command's nominal duration (default: 2000)
    #[serde(default = "default_command_slack_ms")]
    pub command_slack_ms: u64,
}

/// Drive base model and transit behaviour
#[derive(Clone, Debug, Deserialize)]
pub struct MotionConfig {
    /// Straight-line speed in m/s (default: 0.5)
    #[serde(default = "default_base_speed")]
    pub base_speed_mps: f32,

    /// In-place turn rate in deg/s (default: 45.0)
    #[serde(default = "default_turn_rate")]
    pub turn_rate_deg_s: f32,

    /// Front range below which the path counts as blocked (default: 0.3)
    #[serde(default = "default_min_safe_distance")]
    pub min_safe_distance_m: f32,

    /// Heading error accepted before driving forward (default: 5.0)
    #[serde(default = "default_heading_tolerance")]
    pub heading_tolerance_deg: f32,

    /// Distance at which a waypoint counts as reached (default: 0.1)
    #[serde(default = "default_waypoint_tolerance")]
    pub waypoint_tolerance_m: f32,

    /// Longest forward segment between detector polls (default: 1.0)
    #[serde(default = "default_transit_step")]
    pub transit_step_s: f32,

    /// Reverse duration when backing off an obstacle (default: 0.5)
    #[serde(default = "default_backoff")]
    pub backoff_s: f32,

    /// Turn angle when steering around an obstacle (default: 45.0)
    #[serde(default = "default_avoid_turn")]
    pub avoid_turn_deg: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            area_width_m: default_area_width(),
            area_height_m: default_area_height(),
            step_size_m: default_step_size(),
        }
    }
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            lost_tick_threshold: default_lost_tick_threshold(),
            grasp_retries: default_grasp_retries(),
            max_approach_ticks: default_max_approach_ticks(),
            max_detours_per_goal: default_max_detours_per_goal(),
            grip_force: GripForce::default(),
            poll_timeout_ms: default_poll_timeout_ms(),
            arm_timeout_ms: default_arm_timeout_ms(),
            command_slack_ms: default_command_slack_ms(),
        }
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            base_speed_mps: default_base_speed(),
            turn_rate_deg_s: default_turn_rate(),
            min_safe_distance_m: default_min_safe_distance(),
            heading_tolerance_deg: default_heading_tolerance(),
            waypoint_tolerance_m: default_waypoint_tolerance(),
            transit_step_s: default_transit_step(),
            backoff_s: default_backoff(),
            avoid_turn_deg: default_avoid_turn(),
        }
    }
}

// Default value functions
fn default_area_width() -> f32 {
    5.0
}
fn default_area_height() -> f32 {
    3.0
}
fn default_step_size() -> f32 {
    0.5
}
fn default_lost_tick_threshold() -> u32 {
    5
}
fn default_grasp_retries() -> u32 {
    1
}
fn default_max_approach_ticks() -> u32 {
    120
}
fn default_max_detours_per_goal() -> u32 {
    5
}
fn default_poll_timeout_ms() -> u64 {
    1000
}
fn default_arm_timeout_ms() -> u64 {
    5000
}
fn default_command_slack_ms() -> u64 {
    2000
}

// Motion defaults
fn default_base_speed() -> f32 {
    0.5
}
fn default_turn_rate() -> f32 {
    45.0
}
fn default_min_safe_distance() -> f32 {
    0.3
}
fn default_heading_tolerance() -> f32 {
    5.0
}
fn default_waypoint_tolerance() -> f32 {
    0.1
}
fn default_transit_step() -> f32 {
    1.0
}
fn default_backoff() -> f32 {
    0.5
}
fn default_avoid_turn() -> f32 {
    45.0
}

impl MissionConfig {
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    pub fn arm_timeout(&self) -> Duration {
        Duration::from_millis(self.arm_timeout_ms)
    }

    /// Budget for a motion command expected to take `nominal_s` seconds
    pub fn command_budget(&self, nominal_s: f32) -> Duration {
        Duration::from_secs_f32(nominal_s.max(0.0)) + Duration::from_millis(self.command_slack_ms)
    }
}

impl FetchConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FetchError::Config(format!("Failed to read config file: {}", e)))?;
        let config: FetchConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Reject values the controller cannot run with
    pub fn validate(&self) -> Result<()> {
        self.servo.validate()?;

        let positive = [
            ("motion.base_speed_mps", self.motion.base_speed_mps),
            ("motion.turn_rate_deg_s", self.motion.turn_rate_deg_s),
            ("motion.waypoint_tolerance_m", self.motion.waypoint_tolerance_m),
            ("motion.transit_step_s", self.motion.transit_step_s),
            ("motion.backoff_s", self.motion.backoff_s),
            ("motion.avoid_turn_deg", self.motion.avoid_turn_deg),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(FetchError::InvalidConfiguration(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if !(self.motion.heading_tolerance_deg.is_finite()
            && self.motion.heading_tolerance_deg >= 0.0)
        {
            return Err(FetchError::InvalidConfiguration(format!(
                "motion.heading_tolerance_deg must not be negative, got {}",
                self.motion.heading_tolerance_deg
            )));
        }
        if !self.motion.min_safe_distance_m.is_finite() || self.motion.min_safe_distance_m < 0.0 {
            return Err(FetchError::InvalidConfiguration(format!(
                "motion.min_safe_distance_m must not be negative, got {}",
                self.motion.min_safe_distance_m
            )));
        }
        if self.mission.lost_tick_threshold == 0 {
            return Err(FetchError::InvalidConfiguration(
                "mission.lost_tick_threshold must be at least 1".to_string(),
            ));
        }
        if self.mission.max_approach_ticks == 0 {
            return Err(FetchError::InvalidConfiguration(
                "mission.max_approach_ticks must be at least 1".to_string(),
            ));
        }
        if self.mission.max_detours_per_goal == 0 {
            return Err(FetchError::InvalidConfiguration(
                "mission.max_detours_per_goal must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: FetchConfig = toml::from_str("").unwrap();
        assert_eq!(config.search.area_width_m, 5.0);
        assert_eq!(config.mission.lost_tick_threshold, 5);
        assert_eq!(config.mission.grasp_retries, 1);
        assert_eq!(config.servo, ServoParams::default());
        assert_eq!(config.device.device_type, "sim");
        config.validate().unwrap();
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[mission]\ngrasp_retries = 3\ngrip_force = \"firm\"\n\n[servo]\ncenter_tolerance_px = 40\n\n[device.simulation]\nrandom_seed = 7"
        )
        .unwrap();

        let config = FetchConfig::load(file.path()).unwrap();
        assert_eq!(config.mission.grasp_retries, 3);
        assert_eq!(config.mission.grip_force, GripForce::Firm);
        assert_eq!(config.mission.max_approach_ticks, 120);
        assert_eq!(config.mission.max_detours_per_goal, 5);
        assert_eq!(config.servo.center_tolerance_px, 40);
        assert_eq!(config.servo.max_turn_deg, 30.0);
        assert_eq!(config.device.simulation.random_seed, 7);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[motion]\nbase_speed_mps = 0.0").unwrap();
        assert!(matches!(
            FetchConfig::load(file.path()),
            Err(FetchError::InvalidConfiguration(_))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[mission]\nmax_detours_per_goal = 0").unwrap();
        assert!(matches!(
            FetchConfig::load(file.path()),
            Err(FetchError::InvalidConfiguration(_))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[mission\n").unwrap();
        assert!(matches!(
            FetchConfig::load(file.path()),
            Err(FetchError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = FetchConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.motion.min_safe_distance_m, 0.3);
    }

    #[test]
    fn test_command_budget() {
        let mission = MissionConfig::default();
        assert_eq!(mission.command_budget(1.5), Duration::from_millis(3500));
    }

    #[test]
    fn test_sample_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("dhruva-fetch.toml");
        let config = FetchConfig::load(&path).unwrap();
        assert_eq!(config.servo, ServoParams::default());
        assert_eq!(config.mission.grip_force, GripForce::Medium);
        assert_eq!(config.device.simulation.obstacles.len(), 1);
    }
}
