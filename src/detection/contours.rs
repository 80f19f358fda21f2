use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;

/// Outermost contours of a binary image.
///
/// Hole borders and anything nested inside another region are dropped; only
/// the outer boundary of each top-level region is returned, in tracing order.
pub fn find_external_contours(edges: &GrayImage) -> Vec<Vec<Point<i32>>> {
    find_contours::<i32>(edges)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .map(|c| c.points)
        .collect()
}

/// Area enclosed by a closed polygon (shoelace formula)
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let twice_area: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();

    twice_area.abs() as f64 / 2.0
}
