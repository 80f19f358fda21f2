mod common;

use common::*;
use huecircle::CircleScalar;
use imageproc::point::Point;

#[test]
fn test_negative_radius_is_stored_as_magnitude() -> anyhow::Result<()> {
    assert_eq!(ShapeCircle::new(10.0f32, 20.0, -5.0).radius(), 5.0);
    assert_eq!(ShapeCircle::<i32>::new(1, 2, -7).radius(), 7);
    assert_eq!(ShapeCircle::<f64>::none().with_radius(-2.5).radius(), 2.5);

    // Center coordinates are never touched
    let circle = ShapeCircle::<i16>::new(-4, -9, -3);
    assert_eq!((circle.center_x(), circle.center_y()), (-4, -9));

    Ok(())
}

#[test]
fn test_empty_means_zero_radius() -> anyhow::Result<()> {
    let none = ShapeCircle::<f32>::none();
    assert!(none.is_empty());
    assert_eq!(none, ShapeCircle::new(0.0, 0.0, 0.0));
    assert_eq!(none, ShapeCircle::default());

    // The center does not matter
    assert!(ShapeCircle::new(12.0f32, 34.0, 0.0).is_empty());
    assert!(!ShapeCircle::new(0.0f32, 0.0, 0.5).is_empty());
    assert!(!ShapeCircle::<u8>::new(0, 0, 1).is_empty());

    Ok(())
}

#[test]
fn test_from_vec3_widens_components() -> anyhow::Result<()> {
    let circle = ShapeCircle::<f32>::from_vec3([10u8, 20, 30]);
    assert_eq!(circle, ShapeCircle::new(10.0, 20.0, 30.0));

    let circle = ShapeCircle::<f64>::from_vec3([-3i32, 4, -12]);
    assert_eq!(circle.center(), Point::new(-3.0, 4.0));
    assert_eq!(circle.radius(), 12.0);

    Ok(())
}

#[test]
fn test_from_center_and_with_center() -> anyhow::Result<()> {
    let circle = ShapeCircle::<f32>::from_center(Point::new(3i16, 4i16), 2.5);
    assert_eq!(circle.center(), Point::new(3.0, 4.0));
    assert_eq!(circle.radius(), 2.5);

    let moved = circle.with_center(Point::new(100u16, 200u16));
    assert_eq!(moved.center(), Point::new(100.0, 200.0));
    assert_eq!(moved.radius(), 2.5);

    let moved = moved.with_center_xy(-1i8, -2i8);
    assert_eq!((moved.center_x(), moved.center_y()), (-1.0, -2.0));

    Ok(())
}

#[test]
fn test_from_points_encloses_everything() -> anyhow::Result<()> {
    assert!(ShapeCircle::<f32>::from_points(&[]).is_empty());

    let square = [
        Point::new(0, 0),
        Point::new(10, 0),
        Point::new(10, 10),
        Point::new(0, 10),
        Point::new(5, 5),
    ];
    let circle = ShapeCircle::<f32>::from_points(&square);
    assert_close(circle.center_x(), 5.0, 0.01, "center x");
    assert_close(circle.center_y(), 5.0, 0.01, "center y");
    assert_close(circle.radius(), 50f32.sqrt(), 0.01, "radius");

    let outline = circle_contour(40, 30, 12.0);
    let circle = ShapeCircle::<f32>::from_points(&outline);
    assert_close(circle.center_x(), 40.0, 0.5, "outline center x");
    assert_close(circle.center_y(), 30.0, 0.5, "outline center y");
    assert_close(circle.radius(), 12.0, 0.75, "outline radius");

    Ok(())
}

#[test]
fn test_convert_keeps_values() -> anyhow::Result<()> {
    let circle = ShapeCircle::<i32>::new(-150, 320, 45);
    let wide: ShapeCircle<f64> = circle.convert();
    assert_eq!(wide, ShapeCircle::new(-150.0, 320.0, 45.0));

    let from_bytes: ShapeCircle<i64> = ShapeCircle::<u8>::new(1, 2, 3).convert();
    assert_eq!(from_bytes, ShapeCircle::new(1, 2, 3));

    Ok(())
}

#[test]
fn test_scalar_ranges_are_ordered() -> anyhow::Result<()> {
    // Spot checks of the ordering behind the FitsIn impls
    assert!(<f32 as CircleScalar>::MAX >= <i64 as CircleScalar>::MAX);
    assert!(<i32 as CircleScalar>::MAX >= <u16 as CircleScalar>::MAX);
    assert!(<u8 as CircleScalar>::MAX >= <i8 as CircleScalar>::MAX);
    assert!(<f64 as CircleScalar>::MAX >= <f32 as CircleScalar>::MAX);

    Ok(())
}

#[test]
fn test_display() -> anyhow::Result<()> {
    let circle = ShapeCircle::<i32>::new(3, 4, 5);
    assert_eq!(circle.to_string(), "centre=(3, 4) radius=5");
    Ok(())
}
