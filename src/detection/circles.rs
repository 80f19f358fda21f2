use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;

use crate::detection::contours::contour_area;
use crate::models::Candidate;

/// Approximated polygons with fewer vertices than this are not circles
pub const MIN_CIRCLE_VERTICES: usize = 8;

/// Polygon approximation tolerance as a fraction of the contour perimeter
pub const APPROX_EPSILON_RATIO: f64 = 0.01;

/// Vertex count of the closed polygon approximating `points`
pub fn approximate_vertices(points: &[Point<i32>]) -> usize {
    // A closing point that repeats the start adds nothing to the outline
    let mut end = points.len();
    while end > 1 && points[end - 1] == points[0] {
        end -= 1;
    }
    let points = &points[..end];

    if points.len() < 2 {
        return points.len();
    }

    let epsilon = APPROX_EPSILON_RATIO * arc_length(points, true);
    if epsilon <= 0.0 {
        return 1;
    }

    let mut polygon = approximate_polygon_dp(points, epsilon, true);
    // Closed approximations may repeat the starting vertex at the end
    if polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon.pop();
    }
    polygon.len()
}

/// Whether the contour's polygon approximation has enough vertices to be a circle
pub fn is_circular(points: &[Point<i32>]) -> bool {
    approximate_vertices(points) >= MIN_CIRCLE_VERTICES
}

/// Keep only the contours that look circular
pub fn filter_circles(contours: Vec<Vec<Point<i32>>>) -> Vec<Candidate> {
    contours
        .into_iter()
        .filter_map(|points| {
            let vertices = approximate_vertices(&points);
            log::trace!("contour with {} points -> {} vertices", points.len(), vertices);
            if vertices < MIN_CIRCLE_VERTICES {
                return None;
            }
            let area = contour_area(&points);
            Some(Candidate {
                points,
                area,
                vertices,
            })
        })
        .collect()
}

/// The candidate enclosing the largest area; the first one wins a tie
pub fn largest_candidate(candidates: &[Candidate]) -> Option<&Candidate> {
    candidates.iter().fold(None, |best, candidate| match best {
        Some(b) if b.area >= candidate.area => Some(b),
        _ => Some(candidate),
    })
}
