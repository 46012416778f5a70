//! Bounding box and point primitives used for midpoint matching

use crate::error::{Result, TrackError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Arithmetic mean of two points
    pub fn midpoint(a: Point, b: Point) -> Self {
        Self {
            x: (a.x + b.x) / 2.0,
            y: (a.y + b.y) / 2.0,
        }
    }

    /// Euclidean distance to `other`
    pub fn distance(&self, other: &Point) -> f32 {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        dx.hypot(dy)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f32; 2]> for Point {
    fn from(p: [f32; 2]) -> Self {
        Self::new(p[0], p[1])
    }
}

impl From<(f32, f32)> for Point {
    fn from(p: (f32, f32)) -> Self {
        Self::new(p.0, p.1)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Axis-aligned bounding box with validated corner ordering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bbox {
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

impl Bbox {
    /// Build a box from its top-left and bottom-right corners.
    ///
    /// Inverted corners are rejected rather than swapped. Degenerate boxes
    /// (zero width or height) are accepted.
    pub fn from_corners(top_left: Point, bottom_right: Point) -> Result<Self> {
        if !top_left.is_finite()
            || !bottom_right.is_finite()
            || top_left.x > bottom_right.x
            || top_left.y > bottom_right.y
        {
            return Err(TrackError::MalformedBoundingBox {
                x1: top_left.x,
                y1: top_left.y,
                x2: bottom_right.x,
                y2: bottom_right.y,
            });
        }

        Ok(Self {
            xmin: top_left.x,
            ymin: top_left.y,
            xmax: bottom_right.x,
            ymax: bottom_right.y,
        })
    }

    pub fn width(&self) -> f32 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f32 {
        self.ymax - self.ymin
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Midpoint of the two corners, the position proxy used for matching
    pub fn center(&self) -> Point {
        Point::midpoint(
            Point::new(self.xmin, self.ymin),
            Point::new(self.xmax, self.ymax),
        )
    }

    /// Convert to bounds array [xmin, ymin, xmax, ymax]
    pub fn to_bounds(&self) -> [f32; 4] {
        [self.xmin, self.ymin, self.xmax, self.ymax]
    }
}

impl fmt::Display for Bbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bbox({}, {}, {}, {})",
            self.xmin, self.ymin, self.xmax, self.ymax
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_bbox_creation() {
        let bbox = Bbox::from_corners(Point::new(0.0, 0.0), Point::new(10.0, 10.0)).unwrap();
        assert_eq!(bbox.to_bounds(), [0.0, 0.0, 10.0, 10.0]);
    }

    #[test]
    fn test_bbox_properties() {
        let bbox = Bbox::from_corners(Point::new(0.0, 0.0), Point::new(10.0, 5.0)).unwrap();
        assert_eq!(bbox.width(), 10.0);
        assert_eq!(bbox.height(), 5.0);
        assert_eq!(bbox.area(), 50.0);
        assert_eq!(bbox.center(), Point::new(5.0, 2.5));
    }

    #[test]
    fn test_midpoint() {
        let mid = Point::midpoint(Point::new(100.0, 40.0), Point::new(180.0, 120.0));
        assert_eq!(mid, Point::new(140.0, 80.0));
    }

    #[test]
    fn test_euclidean_distance() {
        let a = Point::new(0.0, 0.0);
        assert_abs_diff_eq!(a.distance(&Point::new(3.0, 4.0)), 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(Point::new(3.0, 4.0).distance(&a), 5.0, epsilon = 1e-6);
        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn test_degenerate_box_is_accepted() {
        let bbox = Bbox::from_corners(Point::new(5.0, 5.0), Point::new(5.0, 5.0)).unwrap();
        assert_eq!(bbox.area(), 0.0);
        assert_eq!(bbox.center(), Point::new(5.0, 5.0));
    }

    // Inverted corners are an error; they are not normalized by swapping.
    #[test]
    fn test_inverted_corners_are_rejected_not_normalized() {
        let err = Bbox::from_corners(Point::new(10.0, 0.0), Point::new(0.0, 10.0)).unwrap_err();
        assert!(matches!(err, TrackError::MalformedBoundingBox { .. }));

        let err = Bbox::from_corners(Point::new(0.0, 10.0), Point::new(10.0, 0.0)).unwrap_err();
        assert!(matches!(err, TrackError::MalformedBoundingBox { .. }));
    }

    #[test]
    fn test_non_finite_corners_are_rejected() {
        let res = Bbox::from_corners(Point::new(f32::NAN, 0.0), Point::new(10.0, 10.0));
        assert!(res.is_err());
        let res = Bbox::from_corners(Point::new(0.0, 0.0), Point::new(f32::INFINITY, 10.0));
        assert!(res.is_err());
    }
}
