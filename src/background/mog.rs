use image::{GrayImage, Luma};

use super::{matching_len, BackgroundModel, BACKGROUND, FOREGROUND};

const MIXTURES: usize = 5;
const MIN_WEIGHT: f32 = f32::EPSILON;

#[derive(Debug, Clone, Copy, Default)]
struct Gaussian {
    weight: f32,
    mean: f32,
    var: f32,
}

impl Gaussian {
    fn sort_key(&self) -> f32 {
        if self.weight < MIN_WEIGHT {
            0.0
        } else {
            self.weight / self.var.sqrt()
        }
    }
}

fn rank(mixture: &[Gaussian]) -> [usize; MIXTURES] {
    let mut order = [0, 1, 2, 3, 4];
    order.sort_by(|&a, &b| mixture[b].sort_key().total_cmp(&mixture[a].sort_key()));
    order
}

/// Per-pixel Gaussian mixture model after KaewTraKulPong and Bowden.
///
/// Components are ranked by `weight / sigma`; the top components whose
/// weights add up to `background_ratio` describe the background.
#[derive(Debug, Clone)]
pub struct Mog {
    history: u32,
    background_ratio: f32,
    noise_sigma: f32,
    var_threshold: f32,
    size: Option<(u32, u32)>,
    mixtures: Vec<Gaussian>,
    frames: u64,
}

impl Mog {
    pub fn new(history: u32, background_ratio: f32, noise_sigma: f32) -> Self {
        Self {
            history: history.max(1),
            background_ratio,
            noise_sigma: if noise_sigma > 0.0 { noise_sigma } else { 15.0 },
            var_threshold: 2.5 * 2.5,
            size: None,
            mixtures: Vec::new(),
            frames: 0,
        }
    }

    pub fn history(&self) -> u32 {
        self.history
    }

    fn classify(&self, mixture: &mut [Gaussian], pixel: f32, alpha: f32) -> u8 {
        let min_var = self.noise_sigma * self.noise_sigma;
        let order = rank(mixture);

        let matched = order.iter().copied().find(|&k| {
            let g = mixture[k];
            g.weight >= MIN_WEIGHT && (pixel - g.mean).powi(2) < self.var_threshold * g.var
        });

        let hit = match matched {
            Some(k) => {
                let g = &mut mixture[k];
                let diff = pixel - g.mean;
                g.mean += alpha * diff;
                g.var = (g.var + alpha * (diff * diff - g.var)).max(min_var);
                k
            }
            None => {
                // Reuse an unused slot, otherwise the weakest component
                let k = order
                    .iter()
                    .copied()
                    .find(|&k| mixture[k].weight < MIN_WEIGHT)
                    .unwrap_or(order[MIXTURES - 1]);
                mixture[k] = Gaussian {
                    weight: 0.0,
                    mean: pixel,
                    var: min_var,
                };
                k
            }
        };

        for (k, g) in mixture.iter_mut().enumerate() {
            let owned = if k == hit { 1.0 } else { 0.0 };
            g.weight = (1.0 - alpha) * g.weight + alpha * owned;
        }
        let total: f32 = mixture.iter().map(|g| g.weight).sum();
        if total > 0.0 {
            for g in mixture.iter_mut() {
                g.weight /= total;
            }
        }

        let mut cumulative = 0.0;
        for k in rank(mixture) {
            cumulative += mixture[k].weight;
            if k == hit {
                return BACKGROUND;
            }
            if cumulative > self.background_ratio {
                break;
            }
        }
        FOREGROUND
    }
}

impl Default for Mog {
    fn default() -> Self {
        Self::new(200, 0.7, 0.0)
    }
}

impl BackgroundModel for Mog {
    fn apply(&mut self, mask: &GrayImage) -> GrayImage {
        let (width, height) = mask.dimensions();
        if matching_len(self.size, mask).is_none() {
            self.size = Some((width, height));
            self.mixtures = vec![Gaussian::default(); mask.len() * MIXTURES];
            self.frames = 0;
        }
        self.frames += 1;

        let alpha = 1.0 / self.frames.min(self.history as u64) as f32;
        let mut mixtures = std::mem::take(&mut self.mixtures);
        let mut out = GrayImage::new(width, height);
        for ((mixture, src), dst) in mixtures
            .chunks_exact_mut(MIXTURES)
            .zip(mask.pixels())
            .zip(out.pixels_mut())
        {
            *dst = Luma([self.classify(mixture, src[0] as f32, alpha)]);
        }
        self.mixtures = mixtures;
        out
    }

    fn reset(&mut self) {
        self.size = None;
        self.mixtures.clear();
        self.frames = 0;
    }

    fn frames_seen(&self) -> u64 {
        self.frames
    }
}
