use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{close, open};

/// Sigma OpenCV derives for a 3x3 Gaussian kernel
pub const BLUR_SIGMA: f32 = 0.8;

/// Convert a pixel to 8-bit HSV: H in 0..=179 (degrees halved), S and V in 0..=255
pub fn rgb_to_hsv(pixel: Rgb<u8>) -> [u8; 3] {
    let [r, g, b] = pixel.0.map(f32::from);
    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = v - min;

    let s = if v > 0.0 { 255.0 * delta / v } else { 0.0 };

    let mut h = if delta == 0.0 {
        0.0
    } else if v == r {
        60.0 * (g - b) / delta
    } else if v == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }

    // 360 degrees rounds back onto hue 0
    let h = ((h / 2.0).round() as u16 % 180) as u8;
    [h, s.round() as u8, v as u8]
}

/// Convert a frame to HSV, stored channel-wise in an `RgbImage`
pub fn to_hsv(img: &DynamicImage) -> RgbImage {
    let mut hsv = img.to_rgb8();
    for pixel in hsv.pixels_mut() {
        *pixel = Rgb(rgb_to_hsv(*pixel));
    }
    hsv
}

/// Binary mask of the pixels whose every channel lies in `[lower, upper]`
pub fn in_range(hsv: &RgbImage, lower: [u8; 3], upper: [u8; 3]) -> GrayImage {
    GrayImage::from_fn(hsv.width(), hsv.height(), |x, y| {
        let p = hsv.get_pixel(x, y).0;
        let inside = (0..3).all(|c| lower[c] <= p[c] && p[c] <= upper[c]);
        Luma([if inside { 255 } else { 0 }])
    })
}

/// Apply a small Gaussian blur and snap the result back to a binary mask
pub fn apply_blur(mask: &GrayImage, sigma: f32) -> GrayImage {
    let mut blurred = gaussian_blur_f32(mask, sigma);
    for pixel in blurred.pixels_mut() {
        pixel[0] = if pixel[0] >= 128 { 255 } else { 0 };
    }
    blurred
}

/// Opening then closing with the 3x3 ellipse (the 3x3 cross).
///
/// Opening drops isolated foreground specks, closing fills pin holes.
pub fn clean_mask(mask: &GrayImage) -> GrayImage {
    let opened = open(mask, Norm::L1, 1);
    close(&opened, Norm::L1, 1)
}

/// Canny edges of a binary mask, without the smoothing pass of `imageproc::edges::canny`.
///
/// The thresholds may come in either order.
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    super::edges::canny(img, low_threshold, high_threshold)
}

pub fn foreground_pixels(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p[0] > 0).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_colours_map_to_opencv_hues() {
        assert_eq!(rgb_to_hsv(Rgb([255, 0, 0])), [0, 255, 255]);
        assert_eq!(rgb_to_hsv(Rgb([0, 255, 0])), [60, 255, 255]);
        assert_eq!(rgb_to_hsv(Rgb([0, 0, 255])), [120, 255, 255]);
        assert_eq!(rgb_to_hsv(Rgb([255, 255, 0])), [30, 255, 255]);
    }

    #[test]
    fn greys_have_no_saturation() {
        assert_eq!(rgb_to_hsv(Rgb([0, 0, 0])), [0, 0, 0]);
        assert_eq!(rgb_to_hsv(Rgb([128, 128, 128])), [0, 0, 128]);
    }

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let hsv = RgbImage::from_vec(3, 1, vec![10, 50, 50, 20, 255, 255, 21, 100, 100]).unwrap();
        let mask = in_range(&hsv, [10, 50, 50], [20, 255, 255]);
        assert_eq!(mask.get_pixel(0, 0)[0], 255);
        assert_eq!(mask.get_pixel(1, 0)[0], 255);
        assert_eq!(mask.get_pixel(2, 0)[0], 0);
    }

    #[test]
    fn inverted_bounds_match_nothing() {
        let hsv = RgbImage::from_pixel(4, 4, Rgb([15, 100, 100]));
        let mask = in_range(&hsv, [20, 0, 0], [10, 255, 255]);
        assert_eq!(foreground_pixels(&mask), 0);
    }

    #[test]
    fn opening_removes_isolated_specks() {
        let mut mask = GrayImage::new(20, 20);
        mask.put_pixel(3, 3, Luma([255]));
        for y in 8..16 {
            for x in 8..16 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        let cleaned = clean_mask(&mask);
        assert_eq!(cleaned.get_pixel(3, 3)[0], 0);
        assert_eq!(cleaned.get_pixel(12, 12)[0], 255);
    }

    #[test]
    fn closing_fills_pin_holes() {
        let mut mask = GrayImage::from_pixel(20, 20, Luma([255]));
        mask.put_pixel(10, 10, Luma([0]));
        let cleaned = clean_mask(&mask);
        assert_eq!(cleaned.get_pixel(10, 10)[0], 255);
    }
}
