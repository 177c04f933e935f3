//! Object eraser: removes whole objects near the pointer.

use crate::geometry::distance;
use crate::scene::Scene;
use crate::shapes::ShapeId;
use crate::tools::ToolContext;
use kurbo::Point;

/// Objects whose center lies strictly inside `radius + width / 2` of `point`.
///
/// Only the object's width is considered, so tall narrow objects are hit
/// later than their height would suggest.
pub fn objects_within(scene: &Scene, point: Point, radius: f64) -> Vec<ShapeId> {
    scene
        .objects()
        .filter(|object| distance(object.center(), point) < radius + object.width() / 2.0)
        .map(|object| object.id())
        .collect()
}

#[derive(Debug, Default)]
pub(super) struct ObjectEraser {
    erasing: bool,
    removed: usize,
}

impl ObjectEraser {
    pub fn arm(&mut self, ctx: &mut ToolContext<'_>) {
        *self = Self::default();
        ctx.scene.lock_interaction();
    }

    pub fn disarm(&mut self, ctx: &mut ToolContext<'_>) {
        self.erasing = false;
        ctx.scene.release_interaction();
    }

    pub fn press(&mut self, point: Point, radius: f64, ctx: &mut ToolContext<'_>) {
        self.erasing = true;
        self.removed = 0;
        self.sweep(point, radius, ctx);
    }

    pub fn drag(&mut self, point: Point, radius: f64, ctx: &mut ToolContext<'_>) {
        if self.erasing {
            self.sweep(point, radius, ctx);
        }
    }

    /// End the drag; saves history when anything was removed.
    pub fn release(&mut self, ctx: &mut ToolContext<'_>) -> usize {
        if !std::mem::take(&mut self.erasing) {
            return 0;
        }
        let removed = std::mem::take(&mut self.removed);
        if removed > 0 {
            log::debug!("Object eraser removed {} objects", removed);
            ctx.history.save_state(ctx.scene);
        }
        removed
    }

    fn sweep(&mut self, point: Point, radius: f64, ctx: &mut ToolContext<'_>) {
        let hits = objects_within(ctx.scene, point, radius);
        if hits.is_empty() {
            return;
        }
        for id in hits {
            if ctx.scene.remove(id).is_some() {
                self.removed += 1;
            }
        }
        ctx.scene.render_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Rectangle, Shape};

    fn scene_with(rect: Rectangle) -> (Scene, ShapeId) {
        let mut scene = Scene::new();
        let id = scene.add_shape(Shape::Rectangle(rect));
        (scene, id)
    }

    #[test]
    fn test_removes_strictly_inside() {
        // Center (5, 5), half width 5; radius 10 reaches 15.
        let (scene, id) = scene_with(Rectangle::new(Point::ZERO, 10.0, 10.0));
        assert_eq!(objects_within(&scene, Point::new(19.9, 5.0), 10.0), vec![id]);
    }

    #[test]
    fn test_boundary_equality_keeps_object() {
        let (scene, _) = scene_with(Rectangle::new(Point::ZERO, 10.0, 10.0));
        assert!(objects_within(&scene, Point::new(20.0, 5.0), 10.0).is_empty());
    }

    #[test]
    fn test_reach_uses_width_only() {
        // 2 wide, 100 tall: the vertical reach ignores the height.
        let (scene, _) = scene_with(Rectangle::new(Point::ZERO, 2.0, 100.0));
        assert!(objects_within(&scene, Point::new(1.0, 61.0), 10.0).is_empty());
        assert_eq!(objects_within(&scene, Point::new(1.0, 60.5), 10.0).len(), 1);
    }
}
