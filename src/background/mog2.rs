use image::{GrayImage, Luma};

use super::{matching_len, BackgroundModel, BACKGROUND, FOREGROUND, SHADOW};

const MAX_MODES: usize = 5;

#[derive(Debug, Clone, Copy, Default)]
struct Mode {
    weight: f32,
    mean: f32,
    var: f32,
}

#[derive(Debug, Clone, Copy, Default)]
struct PixelModel {
    modes: [Mode; MAX_MODES],
    used: usize,
}

/// Adaptive Gaussian mixture after Zivkovic, with a per-pixel mode count.
///
/// Modes are kept sorted by weight. A pixel is background when it falls
/// within `var_threshold` of one of the leading modes covering
/// `background_ratio` of the weight; otherwise it may still be reported as a
/// shadow (a darker version of a background mode).
#[derive(Debug, Clone)]
pub struct Mog2 {
    history: u32,
    var_threshold: f32,
    detect_shadows: bool,
    background_ratio: f32,
    var_threshold_gen: f32,
    var_init: f32,
    var_min: f32,
    var_max: f32,
    complexity_reduction: f32,
    shadow_threshold: f32,
    size: Option<(u32, u32)>,
    pixels: Vec<PixelModel>,
    frames: u64,
}

impl Mog2 {
    pub fn new(history: u32, var_threshold: f32, detect_shadows: bool) -> Self {
        Self {
            history: history.max(1),
            var_threshold,
            detect_shadows,
            background_ratio: 0.9,
            var_threshold_gen: 3.0 * 3.0,
            var_init: 15.0,
            var_min: 4.0,
            var_max: 5.0 * 15.0,
            complexity_reduction: 0.05,
            shadow_threshold: 0.5,
            size: None,
            pixels: Vec::new(),
            frames: 0,
        }
    }

    pub fn detect_shadows(&self) -> bool {
        self.detect_shadows
    }

    fn is_shadow(&self, model: &PixelModel, pixel: f32) -> bool {
        let mut total = 0.0;
        for mode in &model.modes[..model.used] {
            let numerator = pixel * mode.mean;
            let denominator = mode.mean * mode.mean;
            if denominator == 0.0 {
                return false;
            }
            // Strictly darker than the mode, but not by more than the threshold
            if numerator < denominator && numerator >= self.shadow_threshold * denominator {
                let a = numerator / denominator;
                let dist2 = (a * mode.mean - pixel).powi(2);
                if dist2 < self.var_threshold * mode.var * a * a {
                    return true;
                }
            }
            total += mode.weight;
            if total > self.background_ratio {
                return false;
            }
        }
        false
    }

    fn classify(&self, model: &mut PixelModel, pixel: f32, alpha: f32) -> u8 {
        let prune = -alpha * self.complexity_reduction;
        let mut fits = false;
        let mut background = false;
        let mut total = 0.0;

        let mut i = 0;
        while i < model.used {
            let var_min = self.var_min;
            let var_max = self.var_max;
            let mode = &mut model.modes[i];
            mode.weight = (1.0 - alpha) * mode.weight + prune;

            if !fits {
                let dist2 = (mode.mean - pixel).powi(2);
                if total < self.background_ratio && dist2 < self.var_threshold * mode.var {
                    background = true;
                }
                if dist2 < self.var_threshold_gen * mode.var {
                    fits = true;
                    mode.weight += alpha;
                    let k = alpha / mode.weight;
                    mode.mean += k * (pixel - mode.mean);
                    mode.var = (mode.var + k * (dist2 - mode.var)).clamp(var_min, var_max);
                }
            }

            let weight = mode.weight;
            if weight < -prune {
                model.modes.copy_within(i + 1..model.used, i);
                model.used -= 1;
                continue;
            }
            total += weight;
            i += 1;
        }

        if total > 0.0 {
            for mode in &mut model.modes[..model.used] {
                mode.weight /= total;
            }
        }

        if !fits {
            let slot = if model.used == MAX_MODES {
                MAX_MODES - 1
            } else {
                model.used += 1;
                model.used - 1
            };
            let weight = if model.used == 1 {
                1.0
            } else {
                for mode in &mut model.modes[..model.used - 1] {
                    mode.weight *= 1.0 - alpha;
                }
                alpha
            };
            model.modes[slot] = Mode {
                weight,
                mean: pixel,
                var: self.var_init,
            };
        }

        model.modes[..model.used].sort_by(|a, b| b.weight.total_cmp(&a.weight));

        if background {
            BACKGROUND
        } else if self.detect_shadows && self.is_shadow(model, pixel) {
            SHADOW
        } else {
            FOREGROUND
        }
    }
}

impl Default for Mog2 {
    fn default() -> Self {
        Self::new(500, 16.0, true)
    }
}

impl BackgroundModel for Mog2 {
    fn apply(&mut self, mask: &GrayImage) -> GrayImage {
        let (width, height) = mask.dimensions();
        if matching_len(self.size, mask).is_none() {
            self.size = Some((width, height));
            self.pixels = vec![PixelModel::default(); mask.len()];
            self.frames = 0;
        }
        self.frames += 1;

        let alpha = 1.0 / (2 * self.frames).min(self.history as u64) as f32;
        let mut pixels = std::mem::take(&mut self.pixels);
        let mut out = GrayImage::new(width, height);
        for ((model, src), dst) in pixels.iter_mut().zip(mask.pixels()).zip(out.pixels_mut()) {
            *dst = Luma([self.classify(model, src[0] as f32, alpha)]);
        }
        self.pixels = pixels;
        out
    }

    fn reset(&mut self) {
        self.size = None;
        self.pixels.clear();
        self.frames = 0;
    }

    fn frames_seen(&self) -> u64 {
        self.frames
    }
}
