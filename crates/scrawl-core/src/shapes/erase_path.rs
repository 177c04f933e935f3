//! Erase paths recorded against vector objects by the path eraser.

use crate::geometry::points_bounds;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A freehand polyline that masks part of the object it is attached to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErasePath {
    pub points: Vec<Point>,
    pub width: f64,
}

impl ErasePath {
    pub fn new(points: Vec<Point>, width: f64) -> Self {
        Self { points, width }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounds including half the eraser width on every side.
    pub fn bounds(&self) -> Rect {
        let half = self.width / 2.0;
        points_bounds(&self.points)
            .map(|r| r.inflate(half, half))
            .unwrap_or(Rect::ZERO)
    }

    /// Whether the stroke touches the given rectangle.
    pub fn overlaps(&self, rect: Rect) -> bool {
        if self.points.is_empty() {
            return false;
        }
        let b = self.bounds();
        b.x0 <= rect.x1 && rect.x0 <= b.x1 && b.y0 <= rect.y1 && rect.y0 <= b.y1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_include_half_width() {
        let path = ErasePath::new(vec![Point::new(10.0, 10.0), Point::new(20.0, 10.0)], 4.0);
        let bounds = path.bounds();
        assert!((bounds.x0 - 8.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_overlaps() {
        let path = ErasePath::new(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)], 10.0);
        assert!(path.overlaps(Rect::new(40.0, -20.0, 60.0, 20.0)));
        assert!(!path.overlaps(Rect::new(40.0, 30.0, 60.0, 50.0)));
    }
}
