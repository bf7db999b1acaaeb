//! Device driver traits

pub mod detector;
pub mod locomotion;
pub mod manipulator;

pub use detector::Detector;
pub use locomotion::Locomotion;
pub use manipulator::Manipulator;
