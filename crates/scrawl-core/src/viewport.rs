//! Viewport transform for pan/zoom.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Index of the horizontal translation in the transform array.
pub const OFFSET_X: usize = 4;
/// Index of the vertical translation in the transform array.
pub const OFFSET_Y: usize = 5;

/// The scene's view transform, stored as the six affine coefficients
/// `[a, b, c, d, e, f]` so hosts can read and write offsets 4 and 5 directly.
///
/// Maps scene coordinates to screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub transform: [f64; 6],
    /// Minimum allowed zoom level
    pub min_zoom: f64,
    /// Maximum allowed zoom level
    pub max_zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            transform: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            min_zoom: 0.1,
            max_zoom: 10.0,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn affine(&self) -> Affine {
        Affine::new(self.transform)
    }

    /// Current translation.
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.transform[OFFSET_X], self.transform[OFFSET_Y])
    }

    pub fn zoom(&self) -> f64 {
        self.transform[0]
    }

    /// Convert a screen point to scene coordinates.
    pub fn to_scene(&self, screen_point: Point) -> Point {
        self.affine().inverse() * screen_point
    }

    /// Convert a scene point to screen coordinates.
    pub fn to_screen(&self, scene_point: Point) -> Point {
        self.affine() * scene_point
    }

    /// Pan by a delta in screen coordinates.
    pub fn relative_pan(&mut self, delta: Vec2) {
        self.transform[OFFSET_X] += delta.x;
        self.transform[OFFSET_Y] += delta.y;
    }

    /// Zoom, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_zoom = (self.zoom() * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom()).abs() < f64::EPSILON {
            return;
        }

        let scene_point = self.to_scene(screen_point);
        self.transform[0] = new_zoom;
        self.transform[3] = new_zoom;

        let moved = self.to_screen(scene_point);
        self.relative_pan(screen_point - moved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_mapping() {
        let viewport = Viewport::new();
        let p = Point::new(100.0, 200.0);
        assert_eq!(viewport.to_scene(p), p);
    }

    #[test]
    fn test_relative_pan_accumulates() {
        let mut viewport = Viewport::new();
        viewport.relative_pan(Vec2::new(10.0, -5.0));
        viewport.relative_pan(Vec2::new(2.5, 7.0));
        assert!((viewport.transform[OFFSET_X] - 12.5).abs() < f64::EPSILON);
        assert!((viewport.transform[OFFSET_Y] - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_to_scene_with_pan_and_zoom() {
        let mut viewport = Viewport::new();
        viewport.transform = [2.0, 0.0, 0.0, 2.0, 50.0, 100.0];
        let scene = viewport.to_scene(Point::new(150.0, 300.0));
        assert!((scene.x - 50.0).abs() < 1e-9);
        assert!((scene.y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_at_keeps_point_fixed() {
        let mut viewport = Viewport::new();
        let anchor = Point::new(200.0, 150.0);
        let before = viewport.to_scene(anchor);
        viewport.zoom_at(anchor, 2.0);
        let after = viewport.to_scene(anchor);
        assert!((viewport.zoom() - 2.0).abs() < f64::EPSILON);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }
}
