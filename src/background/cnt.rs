use image::{GrayImage, Luma};

use super::{matching_len, BackgroundModel, BACKGROUND, FOREGROUND};

/// Intensity difference below which two samples count as the same colour
const THRESHOLD: i16 = 30;

#[derive(Debug, Clone, Copy, Default)]
struct PixelState {
    previous: u8,
    background: u8,
    stability: u32,
    history_colour: u8,
    history_stability: u32,
}

/// Counting-based background model (CNT).
///
/// A pixel whose value holds steady for `min_pixel_stability` frames becomes
/// the background. With history on, the credit a stable value earned is
/// remembered across a short interruption (up to `max_pixel_stability`), so
/// a colour that returns is background again as soon as it is stable.
#[derive(Debug, Clone)]
pub struct Cnt {
    min_pixel_stability: u32,
    use_history: bool,
    max_pixel_stability: u32,
    size: Option<(u32, u32)>,
    pixels: Vec<PixelState>,
    frames: u64,
}

impl Cnt {
    pub fn new(min_pixel_stability: u32, use_history: bool, max_pixel_stability: u32) -> Self {
        Self {
            min_pixel_stability: min_pixel_stability.max(1),
            use_history,
            max_pixel_stability: max_pixel_stability.max(min_pixel_stability),
            size: None,
            pixels: Vec::new(),
            frames: 0,
        }
    }

    pub fn min_pixel_stability(&self) -> u32 {
        self.min_pixel_stability
    }

    pub fn max_pixel_stability(&self) -> u32 {
        self.max_pixel_stability
    }

    pub fn use_history(&self) -> bool {
        self.use_history
    }

    fn step(&self, state: &mut PixelState, current: u8) -> u8 {
        let same = |a: u8, b: u8| (a as i16 - b as i16).abs() < THRESHOLD;

        if same(current, state.previous) {
            state.stability = state.stability.saturating_add(1);
            if self.use_history
                && state.stability == self.min_pixel_stability
                && state.history_stability > 0
                && same(current, state.history_colour)
            {
                state.stability = state.stability.max(state.history_stability);
            }
            state.stability = state.stability.min(self.max_pixel_stability);
            if state.stability >= self.min_pixel_stability {
                state.background = current;
            }
        } else {
            if self.use_history && state.stability >= self.min_pixel_stability {
                state.history_colour = state.previous;
                state.history_stability = state.stability;
            }
            state.stability = 0;
        }
        state.previous = current;

        if same(current, state.background) {
            BACKGROUND
        } else {
            FOREGROUND
        }
    }
}

impl Default for Cnt {
    fn default() -> Self {
        Self::new(15, true, 15 * 60)
    }
}

impl BackgroundModel for Cnt {
    fn apply(&mut self, mask: &GrayImage) -> GrayImage {
        let (width, height) = mask.dimensions();

        if matching_len(self.size, mask).is_none() {
            // First frame is the initial background
            self.frames = 1;
            self.size = Some((width, height));
            self.pixels = mask
                .pixels()
                .map(|p| PixelState {
                    previous: p[0],
                    background: p[0],
                    ..PixelState::default()
                })
                .collect();
            return GrayImage::new(width, height);
        }

        self.frames += 1;
        let mut out = GrayImage::new(width, height);
        let mut pixels = std::mem::take(&mut self.pixels);
        for ((state, src), dst) in pixels.iter_mut().zip(mask.pixels()).zip(out.pixels_mut()) {
            *dst = Luma([self.step(state, src[0])]);
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
