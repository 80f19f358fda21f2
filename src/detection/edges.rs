use image::{GrayImage, Luma};
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

/// tan(22.5°)
const TAN_22_5: f32 = 0.414_213_57;
/// tan(67.5°)
const TAN_67_5: f32 = 2.414_213_6;

/// Canny edge detection straight on the input, with no smoothing pass.
///
/// Edge strength is the L1 Sobel magnitude `|dx| + |dy|`, so the largest
/// value on an 8-bit image is 2040. Thresholds may be given in either order;
/// the smaller one is the hysteresis low threshold. Pixels stronger than
/// the high threshold seed edges, which then grow through 8-connected
/// pixels stronger than the low one. Output is 255 on edges, 0 elsewhere.
pub fn canny(img: &GrayImage, threshold_a: f32, threshold_b: f32) -> GrayImage {
    let low = threshold_a.min(threshold_b);
    let high = threshold_a.max(threshold_b);
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return GrayImage::new(width, height);
    }

    let gx = horizontal_sobel(img).into_raw();
    let gy = vertical_sobel(img).into_raw();
    let magnitude: Vec<f32> = gx
        .iter()
        .zip(&gy)
        .map(|(&dx, &dy)| (dx as f32).abs() + (dy as f32).abs())
        .collect();

    let grid = Grid {
        width: width as i64,
        height: height as i64,
    };
    let thinned = suppress_non_maxima(&grid, &magnitude, &gx, &gy);
    hysteresis(&grid, &thinned, low, high)
}

struct Grid {
    width: i64,
    height: i64,
}

impl Grid {
    fn index(&self, x: i64, y: i64) -> Option<usize> {
        (x >= 0 && y >= 0 && x < self.width && y < self.height)
            .then(|| (y * self.width + x) as usize)
    }

    fn at(&self, values: &[f32], x: i64, y: i64) -> f32 {
        self.index(x, y).map_or(0.0, |i| values[i])
    }
}

/// Keep only pixels that are a maximum along their gradient direction.
///
/// Ties along a horizontal or vertical gradient keep the first pixel of the
/// pair, so a step edge comes out one pixel wide.
fn suppress_non_maxima(grid: &Grid, magnitude: &[f32], gx: &[i16], gy: &[i16]) -> Vec<f32> {
    let mut out = vec![0.0; magnitude.len()];
    for y in 0..grid.height {
        for x in 0..grid.width {
            let i = (y * grid.width + x) as usize;
            let m = magnitude[i];
            if m == 0.0 {
                continue;
            }

            let dx = (gx[i] as f32).abs();
            let dy = (gy[i] as f32).abs();
            let keep = if dy <= TAN_22_5 * dx {
                m > grid.at(magnitude, x - 1, y) && m >= grid.at(magnitude, x + 1, y)
            } else if dy > TAN_67_5 * dx {
                m > grid.at(magnitude, x, y - 1) && m >= grid.at(magnitude, x, y + 1)
            } else {
                let s = if (gx[i] < 0) != (gy[i] < 0) { -1 } else { 1 };
                m > grid.at(magnitude, x - s, y - 1) && m > grid.at(magnitude, x + s, y + 1)
            };

            if keep {
                out[i] = m;
            }
        }
    }
    out
}

fn hysteresis(grid: &Grid, thinned: &[f32], low: f32, high: f32) -> GrayImage {
    let mut edge = vec![false; thinned.len()];
    let mut stack = Vec::new();

    for (seed, &m) in thinned.iter().enumerate() {
        if m <= high || edge[seed] {
            continue;
        }
        edge[seed] = true;
        stack.push(seed);

        while let Some(i) = stack.pop() {
            let (x, y) = (i as i64 % grid.width, i as i64 / grid.width);
            for (nx, ny) in neighbours(x, y) {
                if let Some(n) = grid.index(nx, ny) {
                    if !edge[n] && thinned[n] > low {
                        edge[n] = true;
                        stack.push(n);
                    }
                }
            }
        }
    }

    let mut out = GrayImage::new(grid.width as u32, grid.height as u32);
    for (pixel, &on) in out.pixels_mut().zip(&edge) {
        if on {
            *pixel = Luma([255]);
        }
    }
    out
}

fn neighbours(x: i64, y: i64) -> impl Iterator<Item = (i64, i64)> {
    (-1..=1)
        .flat_map(move |dy| (-1..=1).map(move |dx| (dx, dy)))
        .filter(|&(dx, dy)| dx != 0 || dy != 0)
        .map(move |(dx, dy)| (x + dx, y + dy))
}
