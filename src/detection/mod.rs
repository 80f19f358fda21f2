pub mod circles;
pub mod contours;
pub mod edges;
pub mod enclosing;
pub mod preprocessing;

use image::{DynamicImage, GenericImageView, GrayImage};

use crate::background::{create_background_subtractor, BackgroundModel, BackgroundSubtractor};
use crate::config::DetectorConfig;
use crate::debug::{DebugDump, Stage};
use crate::models::{Candidate, ShapeCircle};

fn is_empty_image<I: GenericImageView>(img: &I) -> bool {
    img.width() == 0 || img.height() == 0
}

/// Finds the largest circular object of a configured colour, frame by frame.
///
/// The detector owns at most one background model, built from its config.
/// That model accumulates history over successive frames, so frames of one
/// stream must be fed in order and one at a time. Replacing the config
/// always starts a fresh model.
///
/// "Nothing found" is a normal per-frame outcome and is reported as the
/// empty circle, never as an error.
#[derive(Debug)]
pub struct Detector {
    config: DetectorConfig,
    background: Option<BackgroundSubtractor>,
    debug: Option<DebugDump>,
}

impl Detector {
    pub fn new(config: DetectorConfig) -> Self {
        let mut detector = Self {
            config,
            background: None,
            debug: None,
        };
        detector.create_background_subtractor();
        detector
    }

    /// Save the intermediate images of every processed frame
    pub fn with_debug(mut self, dump: DebugDump) -> Self {
        self.debug = Some(dump);
        self
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Replace the whole config and rebuild the background model.
    ///
    /// Accumulated background history is dropped even when the subtractor
    /// kind did not change.
    pub fn set_characteristics(&mut self, config: DetectorConfig) -> &mut Self {
        self.config = config;
        self.create_background_subtractor();
        self
    }

    pub fn has_background_model(&self) -> bool {
        self.background.is_some()
    }

    /// Frames the current background model has seen; 0 without a model
    pub fn frames_processed(&self) -> u64 {
        self.background.as_ref().map_or(0, |m| m.frames_seen())
    }

    /// Feed a background-only frame to warm up the background model.
    ///
    /// Returns false for an empty frame, true otherwise.
    pub fn supply_background_image(&mut self, frame: &DynamicImage) -> bool {
        if is_empty_image(frame) {
            return false;
        }
        // The mask itself is not needed, only the model update
        self.process_image(frame);
        true
    }

    /// Center and radius of the largest circular object of the configured
    /// colour, or the empty circle when there is none.
    pub fn detect_circular_object_centers(&mut self, frame: &DynamicImage) -> ShapeCircle {
        let candidates = self.candidate_contours(frame);

        let Some(best) = circles::largest_candidate(&candidates) else {
            log::debug!("no circular candidate");
            return ShapeCircle::none();
        };

        let circle = best.enclosing_circle();
        log::debug!(
            "detected circle at ({:.1}, {:.1}) r={:.1} from {} candidates",
            circle.center_x(),
            circle.center_y(),
            circle.radius(),
            candidates.len()
        );
        circle
    }

    /// Contours that pass the circularity filter (for debugging).
    ///
    /// Runs the full mask pipeline, so the background model advances.
    pub fn candidate_contours(&mut self, frame: &DynamicImage) -> Vec<Candidate> {
        if is_empty_image(frame) {
            return Vec::new();
        }

        let mask = self.process_image(frame);
        if is_empty_image(&mask) {
            return Vec::new();
        }

        let edges = preprocessing::detect_edges(
            &mask,
            self.config.canny_threshold_low() as f32,
            self.config.canny_threshold_high() as f32,
        );
        if let Some(dump) = &self.debug {
            dump.save(Stage::Edges, &edges);
        }

        let external = contours::find_external_contours(&edges);
        let total = external.len();
        let candidates = circles::filter_circles(external);
        log::debug!("{} external contours, {} circular", total, candidates.len());
        candidates
    }

    /// Colour mask of a frame, cleaned up and passed through the background
    /// model when there is one. Empty frames give an empty mask.
    pub fn process_image(&mut self, frame: &DynamicImage) -> GrayImage {
        if is_empty_image(frame) {
            return GrayImage::new(0, 0);
        }
        if let Some(dump) = self.debug.as_mut() {
            dump.next_frame();
        }

        let hsv = preprocessing::to_hsv(frame);
        let mask = preprocessing::in_range(
            &hsv,
            self.config.lower_colour_bound(),
            self.config.upper_colour_bound(),
        );
        self.save_stage(Stage::HsvMask, &mask);

        let blurred = preprocessing::apply_blur(&mask, preprocessing::BLUR_SIGMA);
        let cleaned = preprocessing::clean_mask(&blurred);
        self.save_stage(Stage::Cleaned, &cleaned);
        log::debug!(
            "colour mask: {} px, cleaned: {} px",
            preprocessing::foreground_pixels(&mask),
            preprocessing::foreground_pixels(&cleaned)
        );

        match self.background.as_mut() {
            Some(model) => {
                let foreground = model.apply(&cleaned);
                self.save_stage(Stage::Background, &foreground);
                foreground
            }
            None => cleaned,
        }
    }

    fn save_stage(&self, stage: Stage, image: &GrayImage) {
        if let Some(dump) = &self.debug {
            dump.save(stage, image);
        }
    }

    fn create_background_subtractor(&mut self) {
        self.background = create_background_subtractor(&self.config);
    }
}
