use std::fmt;

use imageproc::point::Point;

use crate::detection::enclosing::min_enclosing_circle;

/// Numeric types usable as circle coordinates.
///
/// `MAX` is the largest representable value, widened to `f64`, and is what
/// [`FitsIn`] is checked against.
pub trait CircleScalar: Copy + PartialEq + PartialOrd + Default + fmt::Debug {
    const MAX: f64;

    fn to_f64(self) -> f64;
    fn from_f64(value: f64) -> Self;
    /// Absolute value; identity for unsigned types.
    fn magnitude(self) -> Self;
}

macro_rules! signed_scalar {
    ($($t:ty),*) => {$(
        impl CircleScalar for $t {
            const MAX: f64 = <$t>::MAX as f64;
            fn to_f64(self) -> f64 { self as f64 }
            fn from_f64(value: f64) -> Self { value as $t }
            fn magnitude(self) -> Self { self.saturating_abs() }
        }
    )*};
}

macro_rules! unsigned_scalar {
    ($($t:ty),*) => {$(
        impl CircleScalar for $t {
            const MAX: f64 = <$t>::MAX as f64;
            fn to_f64(self) -> f64 { self as f64 }
            fn from_f64(value: f64) -> Self { value as $t }
            fn magnitude(self) -> Self { self }
        }
    )*};
}

macro_rules! float_scalar {
    ($($t:ty),*) => {$(
        impl CircleScalar for $t {
            const MAX: f64 = <$t>::MAX as f64;
            fn to_f64(self) -> f64 { self as f64 }
            fn from_f64(value: f64) -> Self { value as $t }
            fn magnitude(self) -> Self { self.abs() }
        }
    )*};
}

signed_scalar!(i8, i16, i32, i64);
unsigned_scalar!(u8, u16, u32, u64);
float_scalar!(f32, f64);

/// Marker: every value of `Self` lies inside the range of `T`.
///
/// Only implemented where `T::MAX >= Self::MAX`, so a conversion that would
/// truncate (say `f32` into `i32`) does not compile.
pub trait FitsIn<T: CircleScalar>: CircleScalar {}

macro_rules! fits_in {
    ($dst:ty => $($src:ty),*) => {$(
        impl FitsIn<$dst> for $src {}
    )*};
}

fits_in!(i8 => i8);
fits_in!(u8 => u8, i8);
fits_in!(i16 => i16, u8, i8);
fits_in!(u16 => u16, i16, u8, i8);
fits_in!(i32 => i32, u16, i16, u8, i8);
fits_in!(u32 => u32, i32, u16, i16, u8, i8);
fits_in!(i64 => i64, u32, i32, u16, i16, u8, i8);
fits_in!(u64 => u64, i64, u32, i32, u16, i16, u8, i8);
fits_in!(f32 => f32, u64, i64, u32, i32, u16, i16, u8, i8);
fits_in!(f64 => f64, f32, u64, i64, u32, i32, u16, i16, u8, i8);

fn widen<T: CircleScalar, U: FitsIn<T>>(value: U) -> T {
    debug_assert!(T::MAX >= U::MAX, "{} does not fit in the target type", U::MAX);
    T::from_f64(value.to_f64())
}

/// A circle described by its center and radius.
///
/// The radius is never negative: every constructor and [`with_radius`]
/// store the absolute value of what they are given, so a negative radius is
/// accepted silently rather than rejected. A zero radius marks the "no
/// detection" circle, see [`is_empty`].
///
/// [`with_radius`]: ShapeCircle::with_radius
/// [`is_empty`]: ShapeCircle::is_empty
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShapeCircle<T: CircleScalar = f32> {
    center_x: T,
    center_y: T,
    radius: T,
}

impl<T: CircleScalar> ShapeCircle<T> {
    pub fn new(center_x: T, center_y: T, radius: T) -> Self {
        Self {
            center_x,
            center_y,
            radius: radius.magnitude(),
        }
    }

    /// The canonical empty circle at (0, 0) with radius 0
    pub fn none() -> Self {
        Self::default()
    }

    /// Build from a packed `[x, y, r]` vector
    pub fn from_vec3<U: FitsIn<T>>(params: [U; 3]) -> Self {
        Self::new(widen(params[0]), widen(params[1]), widen(params[2].magnitude()))
    }

    pub fn from_center<U: FitsIn<T>>(center: Point<U>, radius: T) -> Self {
        Self::new(widen(center.x), widen(center.y), radius)
    }

    /// Smallest circle enclosing every point; empty input gives the empty circle.
    pub fn from_points(points: &[Point<i32>]) -> Self
    where
        f32: FitsIn<T>,
    {
        match min_enclosing_circle(points) {
            Some((center, radius)) => Self::none()
                .with_center(center)
                .with_radius(widen(radius)),
            None => Self::none(),
        }
    }

    pub fn center(&self) -> Point<T> {
        Point::new(self.center_x, self.center_y)
    }

    pub fn center_x(&self) -> T {
        self.center_x
    }

    pub fn center_y(&self) -> T {
        self.center_y
    }

    pub fn radius(&self) -> T {
        self.radius
    }

    /// True iff the radius is zero, whatever the center
    pub fn is_empty(&self) -> bool {
        self.radius == T::default()
    }

    pub fn with_center<U: FitsIn<T>>(self, center: Point<U>) -> Self {
        self.with_center_xy(center.x, center.y)
    }

    pub fn with_center_xy<U: FitsIn<T>>(mut self, center_x: U, center_y: U) -> Self {
        self.center_x = widen(center_x);
        self.center_y = widen(center_y);
        self
    }

    pub fn with_radius(mut self, radius: T) -> Self {
        self.radius = radius.magnitude();
        self
    }

    /// Re-express the circle in a wider numeric type
    pub fn convert<U: CircleScalar>(self) -> ShapeCircle<U>
    where
        T: FitsIn<U>,
    {
        ShapeCircle {
            center_x: widen(self.center_x),
            center_y: widen(self.center_y),
            radius: widen(self.radius),
        }
    }
}

impl<T: CircleScalar + fmt::Display> fmt::Display for ShapeCircle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "centre=({}, {}) radius={}",
            self.center_x, self.center_y, self.radius
        )
    }
}

/// An external contour that passed the circularity filter
#[derive(Debug, Clone)]
pub struct Candidate {
    pub points: Vec<Point<i32>>,
    /// Enclosed area of the contour polygon
    pub area: f64,
    /// Vertex count of the polygon approximation
    pub vertices: usize,
}

impl Candidate {
    pub fn enclosing_circle(&self) -> ShapeCircle {
        ShapeCircle::from_points(&self.points)
    }
}
