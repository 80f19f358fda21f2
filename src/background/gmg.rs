use image::{GrayImage, Luma};
use imageproc::filter::median_filter;

use super::{matching_len, BackgroundModel, BACKGROUND, FOREGROUND};

#[derive(Debug, Clone, Copy)]
struct Feature {
    colour: u8,
    weight: f32,
}

#[derive(Debug, Clone, Default)]
struct Histogram {
    features: Vec<Feature>,
}

impl Histogram {
    fn weight_of(&self, colour: u8) -> f32 {
        self.features
            .iter()
            .find(|f| f.colour == colour)
            .map_or(0.0, |f| f.weight)
    }

    /// Add `weight` to `colour`, evicting the weakest feature when full
    fn insert(&mut self, colour: u8, weight: f32, max_features: usize) {
        if let Some(f) = self.features.iter_mut().find(|f| f.colour == colour) {
            f.weight += weight;
        } else if self.features.len() < max_features {
            self.features.push(Feature { colour, weight });
        } else if let Some(weakest) = self
            .features
            .iter_mut()
            .min_by(|a, b| a.weight.total_cmp(&b.weight))
        {
            *weakest = Feature { colour, weight };
        }
    }

    fn normalize(&mut self) {
        let total: f32 = self.features.iter().map(|f| f.weight).sum();
        if total > 0.0 {
            for f in &mut self.features {
                f.weight /= total;
            }
        }
    }

    fn decay(&mut self, factor: f32) {
        for f in &mut self.features {
            f.weight *= factor;
        }
    }
}

/// Per-pixel Bayesian segmentation after Godbehere, Matsukawa and Goldberg.
///
/// Each pixel keeps a histogram of quantized values. For the first
/// `initialization_frames` frames the histograms are only built and the
/// output is all background; afterwards the foreground posterior is
/// median-smoothed and thresholded at `decision_threshold`.
#[derive(Debug, Clone)]
pub struct Gmg {
    initialization_frames: u64,
    decision_threshold: f32,
    learning_rate: f32,
    quantization_levels: u32,
    max_features: usize,
    background_prior: f32,
    smoothing_radius: u32,
    size: Option<(u32, u32)>,
    histograms: Vec<Histogram>,
    frames: u64,
}

impl Gmg {
    pub fn new(initialization_frames: u64, decision_threshold: f32) -> Self {
        Self {
            initialization_frames,
            decision_threshold,
            learning_rate: 0.025,
            quantization_levels: 16,
            max_features: 64,
            background_prior: 0.8,
            smoothing_radius: 3,
            size: None,
            histograms: Vec::new(),
            frames: 0,
        }
    }

    pub fn initialization_frames(&self) -> u64 {
        self.initialization_frames
    }

    fn quantize(&self, value: u8) -> u8 {
        let level = value as u32 * self.quantization_levels / 256;
        level.min(self.quantization_levels - 1) as u8
    }

    fn foreground_posterior(&self, weight: f32) -> f32 {
        let prior = self.background_prior;
        let evidence = weight * prior + (1.0 - weight) * (1.0 - prior);
        if evidence <= 0.0 {
            return 1.0;
        }
        1.0 - weight * prior / evidence
    }
}

impl Default for Gmg {
    fn default() -> Self {
        Self::new(120, 0.8)
    }
}

impl BackgroundModel for Gmg {
    fn apply(&mut self, mask: &GrayImage) -> GrayImage {
        let (width, height) = mask.dimensions();
        if matching_len(self.size, mask).is_none() {
            self.size = Some((width, height));
            self.histograms = vec![Histogram::default(); mask.len()];
            self.frames = 0;
        }
        self.frames += 1;

        let mut histograms = std::mem::take(&mut self.histograms);

        if self.frames <= self.initialization_frames {
            let last = self.frames == self.initialization_frames;
            for (hist, src) in histograms.iter_mut().zip(mask.pixels()) {
                hist.insert(self.quantize(src[0]), 1.0, self.max_features);
                if last {
                    hist.normalize();
                }
            }
            self.histograms = histograms;
            return GrayImage::new(width, height);
        }

        let mut posterior = GrayImage::new(width, height);
        for ((hist, src), dst) in histograms
            .iter_mut()
            .zip(mask.pixels())
            .zip(posterior.pixels_mut())
        {
            let colour = self.quantize(src[0]);
            let p = self.foreground_posterior(hist.weight_of(colour));
            *dst = Luma([(p * 255.0).round() as u8]);

            hist.decay(1.0 - self.learning_rate);
            hist.insert(colour, self.learning_rate, self.max_features);
            hist.normalize();
        }
        self.histograms = histograms;

        let smoothed = median_filter(&posterior, self.smoothing_radius, self.smoothing_radius);
        let cut = self.decision_threshold * 255.0;
        let mut out = smoothed;
        for pixel in out.pixels_mut() {
            pixel[0] = if pixel[0] as f32 > cut { FOREGROUND } else { BACKGROUND };
        }
        out
    }

    fn reset(&mut self) {
        self.size = None;
        self.histograms.clear();
        self.frames = 0;
    }

    fn frames_seen(&self) -> u64 {
        self.frames
    }
}
