use imageproc::point::Point;

const EPS: f64 = 1e-7;

#[derive(Debug, Clone, Copy)]
struct Disc {
    x: f64,
    y: f64,
    r: f64,
}

impl Disc {
    fn contains(&self, p: (f64, f64)) -> bool {
        let dx = p.0 - self.x;
        let dy = p.1 - self.y;
        (dx * dx + dy * dy).sqrt() <= self.r + EPS * self.r.max(1.0)
    }

    fn from_two(a: (f64, f64), b: (f64, f64)) -> Self {
        let x = (a.0 + b.0) / 2.0;
        let y = (a.1 + b.1) / 2.0;
        let r = ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt() / 2.0;
        Self { x, y, r }
    }

    fn from_three(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Self {
        let bx = b.0 - a.0;
        let by = b.1 - a.1;
        let cx = c.0 - a.0;
        let cy = c.1 - a.1;
        let d = 2.0 * (bx * cy - by * cx);

        if d.abs() < EPS {
            // Collinear: the widest pair spans the other point
            let candidates = [Self::from_two(a, b), Self::from_two(a, c), Self::from_two(b, c)];
            return candidates
                .into_iter()
                .fold(candidates[0], |best, disc| if disc.r > best.r { disc } else { best });
        }

        let b2 = bx * bx + by * by;
        let c2 = cx * cx + cy * cy;
        let ux = (cy * b2 - by * c2) / d;
        let uy = (bx * c2 - cx * b2) / d;
        Self {
            x: a.0 + ux,
            y: a.1 + uy,
            r: (ux * ux + uy * uy).sqrt(),
        }
    }
}

/// Visit order that breaks up the boundary ordering of traced contours.
///
/// Contour points arrive sorted along the outline, which is the worst case
/// for the incremental algorithm; striding by a step coprime with `n`
/// visits every point exactly once in a scattered order.
fn scattered_order(n: usize) -> impl Iterator<Item = usize> {
    let mut stride = ((n as f64) * 0.618).round().max(1.0) as usize;
    while gcd(stride, n) != 1 {
        stride += 1;
    }
    (0..n).map(move |i| (i * stride) % n)
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Minimum enclosing circle of a point set (incremental Welzl).
///
/// Returns the center and radius, or `None` for an empty slice.
pub fn min_enclosing_circle(points: &[Point<i32>]) -> Option<(Point<f32>, f32)> {
    if points.is_empty() {
        return None;
    }

    let pts: Vec<(f64, f64)> = scattered_order(points.len())
        .map(|i| (points[i].x as f64, points[i].y as f64))
        .collect();

    let mut disc = Disc {
        x: pts[0].0,
        y: pts[0].1,
        r: 0.0,
    };

    for i in 1..pts.len() {
        if disc.contains(pts[i]) {
            continue;
        }
        disc = Disc {
            x: pts[i].0,
            y: pts[i].1,
            r: 0.0,
        };
        for j in 0..i {
            if disc.contains(pts[j]) {
                continue;
            }
            disc = Disc::from_two(pts[i], pts[j]);
            for k in 0..j {
                if !disc.contains(pts[k]) {
                    disc = Disc::from_three(pts[i], pts[j], pts[k]);
                }
            }
        }
    }

    Some((Point::new(disc.x as f32, disc.y as f32), disc.r as f32))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32, tol: f32) {
        assert!((a - b).abs() <= tol, "{} vs {}", a, b);
    }

    #[test]
    fn empty_slice_has_no_circle() {
        assert!(min_enclosing_circle(&[]).is_none());
    }

    #[test]
    fn single_point_is_zero_radius() {
        let (c, r) = min_enclosing_circle(&[Point::new(4, 7)]).unwrap();
        assert_eq!((c.x, c.y), (4.0, 7.0));
        assert_eq!(r, 0.0);
    }

    #[test]
    fn square_corners_share_the_circumcircle() {
        let pts = [
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
            Point::new(5, 5),
        ];
        let (c, r) = min_enclosing_circle(&pts).unwrap();
        assert_close(c.x, 5.0, 1e-4);
        assert_close(c.y, 5.0, 1e-4);
        assert_close(r, 50f32.sqrt(), 1e-4);
    }

    #[test]
    fn collinear_points_use_the_extreme_pair() {
        let pts = [Point::new(0, 0), Point::new(3, 0), Point::new(8, 0)];
        let (c, r) = min_enclosing_circle(&pts).unwrap();
        assert_close(c.x, 4.0, 1e-4);
        assert_close(c.y, 0.0, 1e-4);
        assert_close(r, 4.0, 1e-4);
    }

    #[test]
    fn ordered_circle_outline() {
        let pts: Vec<Point<i32>> = (0..360)
            .map(|deg| {
                let t = (deg as f64).to_radians();
                Point::new(
                    (50.0 + 20.0 * t.cos()).round() as i32,
                    (40.0 + 20.0 * t.sin()).round() as i32,
                )
            })
            .collect();
        let (c, r) = min_enclosing_circle(&pts).unwrap();
        assert_close(c.x, 50.0, 0.75);
        assert_close(c.y, 40.0, 0.75);
        assert_close(r, 20.0, 0.75);
    }
}
