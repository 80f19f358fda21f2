// Each test binary uses its own subset of the fixtures
#![allow(dead_code, unused_imports)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from huecircle for tests
pub use huecircle::{
    BackgroundSubtractorKind, Candidate, DetectorConfig, Detector, ShapeCircle,
};
