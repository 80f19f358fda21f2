use huecircle::{BackgroundSubtractorKind, DetectorConfig};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;

/// Frame size used by the end-to-end tests
pub const WIDTH: u32 = 160;
pub const HEIGHT: u32 = 120;

/// Target colour: pure blue, HSV (120, 255, 255)
pub const TEST_BLUE: Rgb<u8> = Rgb([0, 0, 255]);
/// Background colours outside the blue bounds
pub const TEST_WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const TEST_RED: Rgb<u8> = Rgb([255, 0, 0]);

/// Config matching `TEST_BLUE` with no background model
pub fn blue_config() -> DetectorConfig {
    DetectorConfig::default()
        .with_colour_bounds([110, 100, 100], [130, 255, 255])
        .with_canny_threshold(100, 200)
}

pub fn blue_config_with(kind: BackgroundSubtractorKind, fps: i32) -> DetectorConfig {
    blue_config()
        .with_background_subtractor(kind)
        .with_frames_per_second(fps)
}

/// A frame filled with a single colour
pub fn solid_frame(background: Rgb<u8>) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(WIDTH, HEIGHT, background))
}

/// A frame with solid discs drawn over a uniform background
pub fn frame_with_discs(background: Rgb<u8>, discs: &[((i32, i32), i32)], colour: Rgb<u8>) -> DynamicImage {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, background);
    for &(center, radius) in discs {
        draw_filled_circle_mut(&mut img, center, radius, colour);
    }
    DynamicImage::ImageRgb8(img)
}

/// A frame with solid axis-aligned squares, given as top-left corner and side
pub fn frame_with_squares(background: Rgb<u8>, squares: &[((i32, i32), u32)], colour: Rgb<u8>) -> DynamicImage {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, background);
    for &((x, y), side) in squares {
        draw_filled_rect_mut(&mut img, Rect::at(x, y).of_size(side, side), colour);
    }
    DynamicImage::ImageRgb8(img)
}

/// Outline of a circle as an ordered contour without repeated points
pub fn circle_contour(cx: i32, cy: i32, radius: f64) -> Vec<Point<i32>> {
    let mut points: Vec<Point<i32>> = (0..720)
        .map(|step| {
            let t = (step as f64 / 2.0).to_radians();
            Point::new(
                cx + (radius * t.cos()).round() as i32,
                cy + (radius * t.sin()).round() as i32,
            )
        })
        .collect();
    points.dedup();
    while points.len() > 1 && points.last() == points.first() {
        points.pop();
    }
    points
}

/// Outline of an axis-aligned square, one point per pixel step, starting at a corner
pub fn square_contour(x: i32, y: i32, side: i32) -> Vec<Point<i32>> {
    let mut points = Vec::new();
    for i in 0..side {
        points.push(Point::new(x + i, y));
    }
    for i in 0..side {
        points.push(Point::new(x + side, y + i));
    }
    for i in 0..side {
        points.push(Point::new(x + side - i, y + side));
    }
    for i in 0..side {
        points.push(Point::new(x, y + side - i));
    }
    points
}

pub fn assert_close(actual: f32, expected: f32, tolerance: f32, what: &str) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "{}: expected {} +/- {}, got {}",
        what,
        expected,
        tolerance,
        actual
    );
}
