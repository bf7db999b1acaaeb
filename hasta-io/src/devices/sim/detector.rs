//! Simulated camera detector

use super::world::SimWorld;
use crate::drivers::Detector;
use crate::error::{Error, Result};
use crate::types::DetectionSample;

/// Typical object widths used to turn apparent size into distance (cm)
const KNOWN_OBJECT_WIDTHS: &[(&str, f32)] = &[
    ("phone", 15.0),
    ("book", 20.0),
    ("pen", 1.5),
    ("ball", 10.0),
    ("cup", 8.0),
    ("bottle", 7.0),
    ("tool", 15.0),
    ("box", 20.0),
    ("laptop", 35.0),
    ("remote", 15.0),
    ("wallet", 10.0),
];

/// Fallback width for objects not in the table (cm)
const DEFAULT_OBJECT_WIDTH_CM: f32 = 10.0;

/// Assumed real-world width of an object type (cm)
pub fn known_object_width_cm(object_type: &str) -> f32 {
    KNOWN_OBJECT_WIDTHS
        .iter()
        .find(|(name, _)| *name == object_type)
        .map(|(_, width)| *width)
        .unwrap_or(DEFAULT_OBJECT_WIDTH_CM)
}

struct TargetQuery {
    object_type: String,
    color: Option<String>,
    assumed_width_cm: f32,
}

/// Pinhole-camera detector looking at the simulated target
pub struct SimDetector {
    world: SimWorld,
    query: Option<TargetQuery>,
}

impl SimDetector {
    pub fn new(world: SimWorld) -> Self {
        Self { world, query: None }
    }
}

impl Detector for SimDetector {
    fn initialize(&mut self, description: &str, color: Option<&str>) -> Result<()> {
        if self.query.is_some() {
            return Err(Error::Unavailable("camera already acquired".to_string()));
        }
        let object_type = description
            .split_whitespace()
            .last()
            .ok_or_else(|| Error::InvalidParameter("empty target description".to_string()))?
            .to_lowercase();
        let assumed_width_cm = known_object_width_cm(&object_type);

        log::info!(
            "SimDetector: target set to '{}' (color {:?}, assumed width {:.1}cm)",
            object_type,
            color,
            assumed_width_cm
        );

        self.query = Some(TargetQuery {
            object_type,
            color: color.map(str::to_lowercase),
            assumed_width_cm,
        });
        Ok(())
    }

    fn poll(&mut self) -> Result<DetectionSample> {
        let query = self.query.as_ref().ok_or(Error::NotInitialized("detector"))?;

        let sample = self.world.with(|w| {
            let target = &w.config.target;
            let description = target.description.to_lowercase();
            let type_matches = description
                .split_whitespace()
                .any(|word| word == query.object_type);
            let color_matches = match (&query.color, &target.color) {
                (None, _) => true,
                (Some(wanted), Some(actual)) => wanted.eq_ignore_ascii_case(actual),
                (Some(_), None) => false,
            };
            if w.holding || !type_matches || !color_matches {
                return DetectionSample::miss();
            }

            let camera = w.config.camera.clone();
            let true_width_cm = target.width_cm;
            let (range_m, bearing_deg) = w.target_relative();
            if range_m > camera.max_range_m || bearing_deg.abs() > camera.field_of_view_deg / 2.0 {
                return DetectionSample::miss();
            }
            if w.noise.occurs(camera.dropout_probability) {
                return DetectionSample::miss();
            }

            // Image x grows to the right while bearings grow counter-clockwise
            let half_frame = camera.frame_width_px as f32 / 2.0;
            let offset_px = -camera.focal_length_px * bearing_deg.to_radians().tan();
            let bearing_error_px =
                w.noise.pixel_offset(offset_px, camera.bearing_stddev_px, half_frame);

            let true_cm = w.noise.distance_cm(range_m * 100.0, camera.distance_stddev_cm);
            let pixel_width = (true_width_cm * camera.focal_length_px / true_cm)
                .round()
                .max(1.0);
            let estimated_distance_cm = query.assumed_width_cm * camera.focal_length_px / pixel_width;

            DetectionSample::hit(bearing_error_px, estimated_distance_cm)
        });

        log::trace!("SimDetector: {:?}", sample);
        Ok(sample)
    }

    fn release(&mut self) -> Result<()> {
        if self.query.take().is_some() {
            log::info!("SimDetector: camera released");
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.query.is_some()
    }
}
