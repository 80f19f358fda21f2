use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

const DEFAULT_FPS: i32 = 15;
const DEFAULT_CANNY_LOW: u32 = 100;
const DEFAULT_CANNY_HIGH: u32 = 200;

/// Which temporal background model, if any, the detector runs on the colour mask
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundSubtractorKind {
    /// No background subtraction
    #[default]
    None,
    /// Gaussian mixture (KaewTraKulPong and Bowden)
    Mog,
    /// Adaptive Gaussian mixture (Zivkovic)
    Mog2,
    /// Per-pixel Bayesian segmentation (Godbehere, Matsukawa and Goldberg)
    Gmg,
    /// Pixel stability counting; the cheapest model on small hardware
    Cnt,
    /// K-nearest-neighbour sample model
    Knn,
}

impl BackgroundSubtractorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Mog => "mog",
            Self::Mog2 => "mog2",
            Self::Gmg => "gmg",
            Self::Cnt => "cnt",
            Self::Knn => "knn",
        }
    }
}

impl fmt::Display for BackgroundSubtractorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackgroundSubtractorKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "mog" => Ok(Self::Mog),
            "mog2" => Ok(Self::Mog2),
            "gmg" => Ok(Self::Gmg),
            "cnt" => Ok(Self::Cnt),
            "knn" => Ok(Self::Knn),
            other => Err(anyhow!("unknown background subtractor: {}", other)),
        }
    }
}

/// Tunable characteristics of the object being looked for.
///
/// Colour bounds are HSV triples in the 8-bit convention (hue 0..=179,
/// saturation and value 0..=255) and are matched inclusively. Nothing here
/// is validated: inverted colour bounds match no pixel and the Canny
/// thresholds are passed through in whatever order they were given.
///
/// Setters return `&mut Self` so they chain:
///
/// ```
/// use huecircle::{BackgroundSubtractorKind, DetectorConfig};
///
/// let mut config = DetectorConfig::default();
/// config
///     .set_background_subtractor(BackgroundSubtractorKind::Cnt)
///     .set_colour_bounds([115, 50, 50], [116, 255, 255])
///     .set_canny_threshold(100, 100)
///     .set_frames_per_second(2);
/// assert_eq!(config.frames_per_second(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    lower_colour_bound: [u8; 3],
    upper_colour_bound: [u8; 3],
    background_subtractor: BackgroundSubtractorKind,
    /// Frame rate of the capture device; only CNT uses it
    frames_per_second: i32,
    canny_threshold_low: u32,
    canny_threshold_high: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            lower_colour_bound: [0, 0, 0],
            upper_colour_bound: [0, 0, 0],
            background_subtractor: BackgroundSubtractorKind::None,
            frames_per_second: DEFAULT_FPS,
            canny_threshold_low: DEFAULT_CANNY_LOW,
            canny_threshold_high: DEFAULT_CANNY_HIGH,
        }
    }
}

impl DetectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| anyhow!("invalid detector config: {}", e))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("failed to read config {}: {}", path.display(), e))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| anyhow!("failed to serialize config: {}", e))
    }

    pub fn set_colour_bounds(&mut self, lower: [u8; 3], upper: [u8; 3]) -> &mut Self {
        self.lower_colour_bound = lower;
        self.upper_colour_bound = upper;
        self
    }

    pub fn lower_colour_bound(&self) -> [u8; 3] {
        self.lower_colour_bound
    }

    pub fn upper_colour_bound(&self) -> [u8; 3] {
        self.upper_colour_bound
    }

    pub fn set_frames_per_second(&mut self, fps: i32) -> &mut Self {
        self.frames_per_second = fps;
        self
    }

    pub fn frames_per_second(&self) -> i32 {
        self.frames_per_second
    }

    pub fn set_canny_threshold(&mut self, low: u32, high: u32) -> &mut Self {
        self.canny_threshold_low = low;
        self.canny_threshold_high = high;
        self
    }

    pub fn canny_threshold_low(&self) -> u32 {
        self.canny_threshold_low
    }

    pub fn canny_threshold_high(&self) -> u32 {
        self.canny_threshold_high
    }

    /// Record which background model to use. The model itself is built by
    /// the detector that receives this config.
    pub fn set_background_subtractor(&mut self, kind: BackgroundSubtractorKind) -> &mut Self {
        self.background_subtractor = kind;
        self
    }

    pub fn background_subtractor(&self) -> BackgroundSubtractorKind {
        self.background_subtractor
    }

    pub fn with_colour_bounds(mut self, lower: [u8; 3], upper: [u8; 3]) -> Self {
        self.set_colour_bounds(lower, upper);
        self
    }

    pub fn with_frames_per_second(mut self, fps: i32) -> Self {
        self.set_frames_per_second(fps);
        self
    }

    pub fn with_canny_threshold(mut self, low: u32, high: u32) -> Self {
        self.set_canny_threshold(low, high);
        self
    }

    pub fn with_background_subtractor(mut self, kind: BackgroundSubtractorKind) -> Self {
        self.set_background_subtractor(kind);
        self
    }
}
