//! Temporal background models applied to the colour mask.
//!
//! Every model consumes a single-channel mask per frame and returns a mask
//! of the pixels it considers foreground (255), background (0) or, for the
//! models with shadow detection, shadow (127). Models keep all of their
//! history internally; a frame of a different size restarts that history.

pub mod cnt;
pub mod gmg;
pub mod knn;
pub mod mog;
pub mod mog2;

use image::GrayImage;

use crate::config::{BackgroundSubtractorKind, DetectorConfig};

pub use cnt::Cnt;
pub use gmg::Gmg;
pub use knn::Knn;
pub use mog::Mog;
pub use mog2::Mog2;

pub const FOREGROUND: u8 = 255;
pub const SHADOW: u8 = 127;
pub const BACKGROUND: u8 = 0;

/// A stateful per-pixel background model
pub trait BackgroundModel {
    /// Feed one mask and get back its foreground mask
    fn apply(&mut self, mask: &GrayImage) -> GrayImage;

    /// Forget all accumulated history
    fn reset(&mut self);

    /// Frames fed since construction or the last reset
    fn frames_seen(&self) -> u64;
}

/// One concrete model per [`BackgroundSubtractorKind`] other than `None`
#[derive(Debug, Clone)]
pub enum BackgroundSubtractor {
    Mog(Mog),
    Mog2(Mog2),
    Gmg(Gmg),
    Cnt(Cnt),
    Knn(Knn),
}

impl BackgroundSubtractor {
    pub fn kind(&self) -> BackgroundSubtractorKind {
        match self {
            Self::Mog(_) => BackgroundSubtractorKind::Mog,
            Self::Mog2(_) => BackgroundSubtractorKind::Mog2,
            Self::Gmg(_) => BackgroundSubtractorKind::Gmg,
            Self::Cnt(_) => BackgroundSubtractorKind::Cnt,
            Self::Knn(_) => BackgroundSubtractorKind::Knn,
        }
    }

    fn model_mut(&mut self) -> &mut dyn BackgroundModel {
        match self {
            Self::Mog(m) => m,
            Self::Mog2(m) => m,
            Self::Gmg(m) => m,
            Self::Cnt(m) => m,
            Self::Knn(m) => m,
        }
    }

    fn model(&self) -> &dyn BackgroundModel {
        match self {
            Self::Mog(m) => m,
            Self::Mog2(m) => m,
            Self::Gmg(m) => m,
            Self::Cnt(m) => m,
            Self::Knn(m) => m,
        }
    }
}

impl BackgroundModel for BackgroundSubtractor {
    fn apply(&mut self, mask: &GrayImage) -> GrayImage {
        self.model_mut().apply(mask)
    }

    fn reset(&mut self) {
        self.model_mut().reset()
    }

    fn frames_seen(&self) -> u64 {
        self.model().frames_seen()
    }
}

/// Build a fresh model for the configured kind.
///
/// CNT is given the configured frame rate as its minimum stability and a
/// minute of frames as its maximum history credit; the other models use
/// their stock parameters.
pub fn create_background_subtractor(config: &DetectorConfig) -> Option<BackgroundSubtractor> {
    let fps = config.frames_per_second().max(1) as u32;
    let model = match config.background_subtractor() {
        BackgroundSubtractorKind::None => return None,
        BackgroundSubtractorKind::Cnt => {
            BackgroundSubtractor::Cnt(Cnt::new(fps, true, fps.saturating_mul(60)))
        },
        BackgroundSubtractorKind::Gmg => BackgroundSubtractor::Gmg(Gmg::default()),
        BackgroundSubtractorKind::Mog => BackgroundSubtractor::Mog(Mog::default()),
        BackgroundSubtractorKind::Mog2 => BackgroundSubtractor::Mog2(Mog2::default()),
        BackgroundSubtractorKind::Knn => BackgroundSubtractor::Knn(Knn::default()),
    };
    log::info!("created {} background model", model.kind());
    Some(model)
}

/// Pixel count of a mask, or `None` when `size` no longer matches it
pub(crate) fn matching_len(size: Option<(u32, u32)>, mask: &GrayImage) -> Option<usize> {
    match size {
        Some(s) if s == mask.dimensions() => Some(mask.len()),
        _ => None,
    }
}
