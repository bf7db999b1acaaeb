//! Seeded sensor noise for the simulated room
//!
//! Each helper applies the error model of one sensor, so the drivers never
//! handle raw samples.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Noise source shared by the simulated sensors
#[derive(Clone)]
pub struct SensorNoise {
    rng: SmallRng,
}

impl SensorNoise {
    /// Seed 0 draws from entropy; any other seed replays the same run.
    pub fn seeded(seed: u64) -> Self {
        let rng = match seed {
            0 => SmallRng::from_entropy(),
            seed => SmallRng::seed_from_u64(seed),
        };
        Self { rng }
    }

    fn jitter(&mut self, stddev: f32) -> f32 {
        if stddev > 0.0 {
            stddev * self.rng.sample::<f32, _>(StandardNormal)
        } else {
            0.0
        }
    }

    /// Sonar echo: perturbed, then limited to what the transducer can report
    pub fn range_m(&mut self, true_m: f32, stddev_m: f32, max_m: f32) -> f32 {
        (true_m + self.jitter(stddev_m)).clamp(0.0, max_m)
    }

    /// Horizontal image offset of the target, whole pixels inside the frame
    pub fn pixel_offset(&mut self, true_px: f32, stddev_px: f32, half_frame_px: f32) -> i32 {
        (true_px + self.jitter(stddev_px))
            .clamp(-half_frame_px, half_frame_px)
            .round() as i32
    }

    /// Camera-to-target distance, never closer than 1 cm
    pub fn distance_cm(&mut self, true_cm: f32, stddev_cm: f32) -> f32 {
        (true_cm + self.jitter(stddev_cm)).max(1.0)
    }

    /// Whether a rare event (dropped frame, slipped grip) happens this time
    pub fn occurs(&mut self, probability: f32) -> bool {
        probability > 0.0 && self.rng.gen_bool(f64::from(probability.min(1.0)))
    }
}
