//! Points and quadrilaterals in page pixel space.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// A 2-D point. Serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Check whether both coordinates are within `tolerance` of another point.
    pub fn approx_eq(&self, other: &Point, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Point {
    type Output = Point;

    fn div(self, rhs: f64) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

/// A quadrilateral with corners in the fixed order
/// `[top_left, top_right, bottom_right, bottom_left]`.
///
/// The quad may be rotated or skewed. Serialized as
/// `[[x, y], [x, y], [x, y], [x, y]]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[Point; 4]", into = "[Point; 4]")]
pub struct Quad {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
}

impl Quad {
    /// Create a quad from its four corners.
    pub const fn new(
        top_left: Point,
        top_right: Point,
        bottom_right: Point,
        bottom_left: Point,
    ) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    /// Create an axis-aligned quad from a top-left corner and a size.
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(
            Point::new(x, y),
            Point::new(x + width, y),
            Point::new(x + width, y + height),
            Point::new(x, y + height),
        )
    }

    /// Corners in `[top_left, top_right, bottom_right, bottom_left]` order.
    pub fn corners(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Vector from the left end to the right end of the top edge.
    pub fn top_edge(&self) -> Point {
        self.top_right - self.top_left
    }

    /// Vector from the left end to the right end of the bottom edge.
    pub fn bottom_edge(&self) -> Point {
        self.bottom_right - self.bottom_left
    }

    /// Check whether every corner is within `tolerance` of another quad's.
    pub fn approx_eq(&self, other: &Quad, tolerance: f64) -> bool {
        self.corners()
            .iter()
            .zip(other.corners().iter())
            .all(|(a, b)| a.approx_eq(b, tolerance))
    }
}

impl From<[Point; 4]> for Quad {
    fn from([tl, tr, br, bl]: [Point; 4]) -> Self {
        Self::new(tl, tr, br, bl)
    }
}

impl From<Quad> for [Point; 4] {
    fn from(q: Quad) -> Self {
        q.corners()
    }
}

impl From<[[f64; 2]; 4]> for Quad {
    fn from(c: [[f64; 2]; 4]) -> Self {
        Self::new(
            Point::new(c[0][0], c[0][1]),
            Point::new(c[1][0], c[1][1]),
            Point::new(c[2][0], c[2][1]),
            Point::new(c[3][0], c[3][1]),
        )
    }
}
