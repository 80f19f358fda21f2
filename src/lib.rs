pub mod background;
pub mod config;
pub mod debug;
pub mod detection;
pub mod models;

pub use background::{BackgroundModel, BackgroundSubtractor};
pub use config::{BackgroundSubtractorKind, DetectorConfig};
pub use debug::DebugDump;
pub use detection::Detector;
pub use models::{Candidate, CircleScalar, FitsIn, ShapeCircle};
