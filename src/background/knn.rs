use image::{GrayImage, Luma};

use super::{matching_len, BackgroundModel, BACKGROUND, FOREGROUND, SHADOW};

/// Samples kept per tier (short, mid and long term)
const SAMPLES: usize = 7;
const TIERS: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
struct Sample {
    value: f32,
    /// Set when the sample itself looked like background when stored
    included: bool,
    valid: bool,
}

/// Sample-based background model using k nearest neighbours.
///
/// Every pixel keeps three rings of samples refreshed at short, medium and
/// long intervals derived from `history`. A pixel is background when at
/// least `knn` included samples lie within `dist2_threshold`.
#[derive(Debug, Clone)]
pub struct Knn {
    history: u32,
    dist2_threshold: f32,
    detect_shadows: bool,
    knn: usize,
    shadow_threshold: f32,
    /// Frames between refreshes of each tier
    periods: [u64; TIERS],
    size: Option<(u32, u32)>,
    samples: Vec<Sample>,
    /// Next slot to overwrite in each tier
    cursors: [usize; TIERS],
    frames: u64,
}

impl Knn {
    pub fn new(history: u32, dist2_threshold: f32, detect_shadows: bool) -> Self {
        let history = history.max(1);
        Self {
            history,
            dist2_threshold,
            detect_shadows,
            knn: 2,
            shadow_threshold: 0.5,
            periods: update_periods(history),
            size: None,
            samples: Vec::new(),
            cursors: [0; TIERS],
            frames: 0,
        }
    }

    pub fn history(&self) -> u32 {
        self.history
    }

    fn classify(&self, samples: &[Sample], pixel: f32) -> (u8, bool) {
        let mut close = 0;
        let mut close_included = 0;
        for s in samples.iter().filter(|s| s.valid) {
            if (s.value - pixel).powi(2) < self.dist2_threshold {
                close += 1;
                if s.included {
                    close_included += 1;
                    if close_included >= self.knn {
                        return (BACKGROUND, true);
                    }
                }
            }
        }

        let include = close >= self.knn;
        if self.detect_shadows && self.is_shadow(samples, pixel) {
            (SHADOW, include)
        } else {
            (FOREGROUND, include)
        }
    }

    fn is_shadow(&self, samples: &[Sample], pixel: f32) -> bool {
        let mut hits = 0;
        for s in samples.iter().filter(|s| s.valid && s.included) {
            let numerator = pixel * s.value;
            let denominator = s.value * s.value;
            if denominator == 0.0 {
                continue;
            }
            if numerator < denominator && numerator >= self.shadow_threshold * denominator {
                let a = numerator / denominator;
                let dist2 = (a * s.value - pixel).powi(2);
                if dist2 < self.dist2_threshold * a * a {
                    hits += 1;
                    if hits >= self.knn {
                        return true;
                    }
                }
            }
        }
        false
    }
}

/// Refresh intervals for the three tiers.
///
/// With a learning rate of `1 / history`, a sample written to the short,
/// mid and long tier has decayed to 70%, 40% and 10% influence by the time
/// its tier wraps around; each tier's span is split over its samples.
fn update_periods(history: u32) -> [u64; TIERS] {
    let alpha = 1.0 / history as f64;
    let span = |fraction: f64| (fraction.ln() / (1.0 - alpha).ln()).max(1.0);
    let short = span(0.7) + 1.0;
    let mid = (span(0.4) - short + 1.0).max(1.0);
    let long = (span(0.1) - short - mid + 1.0).max(1.0);
    [short, mid, long].map(|k| ((k / SAMPLES as f64).round() as u64).max(1))
}

impl Default for Knn {
    fn default() -> Self {
        Self::new(500, 400.0, true)
    }
}

impl BackgroundModel for Knn {
    fn apply(&mut self, mask: &GrayImage) -> GrayImage {
        let (width, height) = mask.dimensions();
        if matching_len(self.size, mask).is_none() {
            self.size = Some((width, height));
            self.samples = vec![Sample::default(); mask.len() * SAMPLES * TIERS];
            self.cursors = [0; TIERS];
            self.frames = 0;
        }

        // Every tier takes a sample on the first frame
        let refresh: Vec<usize> = (0..TIERS)
            .filter(|&t| self.frames % self.periods[t] == 0)
            .collect();
        self.frames += 1;

        let mut samples = std::mem::take(&mut self.samples);
        let mut out = GrayImage::new(width, height);
        for ((pixel_samples, src), dst) in samples
            .chunks_exact_mut(SAMPLES * TIERS)
            .zip(mask.pixels())
            .zip(out.pixels_mut())
        {
            let value = src[0] as f32;
            let (label, include) = self.classify(pixel_samples, value);
            *dst = Luma([label]);

            for &tier in &refresh {
                pixel_samples[tier * SAMPLES + self.cursors[tier]] = Sample {
                    value,
                    included: include,
                    valid: true,
                };
            }
        }
        self.samples = samples;

        for tier in refresh {
            self.cursors[tier] = (self.cursors[tier] + 1) % SAMPLES;
        }
        out
    }

    fn reset(&mut self) {
        self.size = None;
        self.samples.clear();
        self.cursors = [0; TIERS];
        self.frames = 0;
    }

    fn frames_seen(&self) -> u64 {
        self.frames
    }
}
