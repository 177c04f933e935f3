//! Drag-to-draw shapes.

use crate::input::{MouseButton, Pointer};
use crate::settings::{Live, ShapeSettings};
use crate::shapes::{Ellipse, Line, Rectangle, Shape, ShapeId, ShapeStyle, Triangle};
use crate::tools::{Bindings, ToolContext, ToolEngine, reset_surface};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Minimum width and height of boxed shapes.
const MIN_BOX_SIZE: f64 = 5.0;
const MIN_CIRCLE_RADIUS: f64 = 3.0;
const MIN_LINE_LENGTH: f64 = 5.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Circle,
    Ellipse,
    Triangle,
    Line,
}

impl ShapeKind {
    /// A zero-size shape of this kind anchored at `start`.
    fn seed(self, start: Point, style: ShapeStyle) -> Shape {
        let mut shape = match self {
            ShapeKind::Rectangle => Shape::Rectangle(Rectangle::new(start, 0.0, 0.0)),
            ShapeKind::Circle => Shape::Ellipse(Ellipse::circle(start, 0.0)),
            ShapeKind::Ellipse => Shape::Ellipse(Ellipse::new(start, 0.0, 0.0)),
            ShapeKind::Triangle => Shape::Triangle(Triangle::new(start, 0.0, 0.0)),
            ShapeKind::Line => Shape::Line(Line::new(start, start)),
        };
        *shape.style_mut() = style;
        shape
    }
}

/// Stretch `shape` so it spans from `start` to `current`.
fn resize(shape: &mut Shape, kind: ShapeKind, start: Point, current: Point) {
    match (kind, shape) {
        (ShapeKind::Circle, Shape::Ellipse(circle)) => {
            let d = current - start;
            let radius = d.x.abs().max(d.y.abs()) / 2.0;
            let corner = Point::new(start.x + radius * 2.0 * d.x.signum(), start.y + radius * 2.0 * d.y.signum());
            circle.set_rect(Rect::from_points(start, corner));
        }
        (_, Shape::Ellipse(ellipse)) => ellipse.set_rect(Rect::from_points(start, current)),
        (_, Shape::Rectangle(rect)) => rect.set_corners(start, current),
        (_, Shape::Triangle(triangle)) => triangle.set_corners(start, current),
        (_, Shape::Line(line)) => line.end = current,
        _ => {}
    }
}

/// Whether a finished draft is too small to keep.
fn too_small(shape: &Shape, kind: ShapeKind) -> bool {
    match (kind, shape) {
        (ShapeKind::Circle, Shape::Ellipse(circle)) => circle.radius_x < MIN_CIRCLE_RADIUS,
        (_, Shape::Line(line)) => line.length() < MIN_LINE_LENGTH,
        (_, shape) => {
            let bounds = shape.bounds();
            bounds.width() < MIN_BOX_SIZE || bounds.height() < MIN_BOX_SIZE
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Draft {
    id: ShapeId,
    kind: ShapeKind,
    start: Point,
}

#[derive(Debug, Default)]
pub struct ShapeEngine {
    settings: Option<Live<ShapeSettings>>,
    draft: Option<Draft>,
}

impl ShapeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable(&mut self, settings: Live<ShapeSettings>, ctx: &mut ToolContext<'_>) -> Bindings {
        reset_surface(ctx);
        ctx.scene.set_selection_enabled(false);
        log::info!("Shape tool armed ({:?})", settings.read().kind);
        self.settings = Some(settings);
        self.draft = None;
        Bindings::POINTER.with_escape()
    }

    pub fn is_armed(&self) -> bool {
        self.settings.is_some()
    }

    /// Id of the shape being dragged out, if any.
    pub fn draft(&self) -> Option<ShapeId> {
        self.draft.map(|d| d.id)
    }

    fn discard_draft(&mut self, ctx: &mut ToolContext<'_>) -> bool {
        let Some(draft) = self.draft.take() else {
            return false;
        };
        ctx.scene.remove(draft.id);
        ctx.scene.release_interaction();
        ctx.scene.render_all();
        true
    }
}

impl ToolEngine for ShapeEngine {
    fn disable(&mut self, ctx: &mut ToolContext<'_>) {
        if self.settings.take().is_none() {
            return;
        }
        if self.discard_draft(ctx) {
            log::debug!("Shape tool disarmed mid-draft");
        }
    }

    fn pointer_down(&mut self, pointer: &Pointer, ctx: &mut ToolContext<'_>) {
        if pointer.button != MouseButton::Left || self.draft.is_some() {
            return;
        }
        let Some(settings) = &self.settings else {
            return;
        };
        if ctx.scene.top_object_at(pointer.scene, 0.0).is_some() {
            return;
        }
        let (kind, style) = {
            let s = settings.read();
            (s.kind, s.style())
        };

        // The draft is added under the lock, so it starts inert.
        let start = pointer.scene;
        ctx.scene.lock_interaction();
        let id = ctx.scene.add_shape(kind.seed(start, style));
        self.draft = Some(Draft { id, kind, start });
        ctx.scene.render_all();
    }

    fn pointer_move(&mut self, pointer: &Pointer, ctx: &mut ToolContext<'_>) {
        let Some(draft) = self.draft else {
            return;
        };
        let Some(object) = ctx.scene.get_mut(draft.id) else {
            self.draft = None;
            ctx.scene.release_interaction();
            return;
        };
        resize(&mut object.shape, draft.kind, draft.start, pointer.scene);
        ctx.scene.render_all();
    }

    fn pointer_up(&mut self, _pointer: &Pointer, ctx: &mut ToolContext<'_>) {
        let Some(draft) = self.draft.take() else {
            return;
        };
        let keep = ctx
            .scene
            .get(draft.id)
            .is_some_and(|object| !too_small(&object.shape, draft.kind));
        if !keep {
            log::debug!("Discarding {:?} draft below minimum size", draft.kind);
            ctx.scene.remove(draft.id);
            ctx.scene.release_interaction();
            ctx.scene.render_all();
            return;
        }
        ctx.scene.release_interaction();
        ctx.scene.set_active_object(Some(draft.id));
        ctx.scene.render_all();
        ctx.tasks.defer_save();
    }

    fn escape(&mut self, ctx: &mut ToolContext<'_>) {
        if self.discard_draft(ctx) {
            log::debug!("Shape draft cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::Harness;

    fn armed(harness: &mut Harness, kind: ShapeKind) -> ShapeEngine {
        let mut engine = ShapeEngine::new();
        let settings = Live::new(ShapeSettings {
            kind,
            ..Default::default()
        });
        let bindings = engine.enable(settings, &mut harness.ctx());
        assert!(bindings.escape);
        engine
    }

    fn drag(engine: &mut ShapeEngine, harness: &mut Harness, from: Point, to: Point) -> Option<ShapeId> {
        engine.pointer_down(&Pointer::at(from), &mut harness.ctx());
        let id = engine.draft();
        engine.pointer_move(&Pointer::at(to), &mut harness.ctx());
        engine.pointer_up(&Pointer::at(to), &mut harness.ctx());
        id
    }

    #[test]
    fn test_rectangle_drag_finalizes() {
        let mut harness = Harness::new(200, 200);
        let mut engine = armed(&mut harness, ShapeKind::Rectangle);
        let id = drag(&mut engine, &mut harness, Point::new(50.0, 50.0), Point::new(10.0, 30.0)).unwrap();

        let object = harness.scene.get(id).unwrap();
        assert_eq!(object.bounds(), Rect::new(10.0, 30.0, 50.0, 50.0));
        assert!(object.selectable && object.evented);
        assert_eq!(harness.scene.active_object(), Some(id));
        assert_eq!(harness.pump().saves, 1);
    }

    #[test]
    fn test_circle_uses_larger_delta() {
        let mut harness = Harness::new(200, 200);
        let mut engine = armed(&mut harness, ShapeKind::Circle);
        let id = drag(&mut engine, &mut harness, Point::new(0.0, 0.0), Point::new(20.0, -8.0)).unwrap();

        match &harness.scene.get(id).unwrap().shape {
            Shape::Ellipse(circle) => {
                assert!((circle.radius_x - circle.radius_y).abs() < 1e-9);
                assert!((circle.radius_x - 10.0).abs() < 1e-9);
                assert_eq!(circle.center, Point::new(10.0, -10.0));
            }
            other => panic!("expected circle, got {:?}", other),
        }
    }

    #[test]
    fn test_line_follows_pointer() {
        let mut harness = Harness::new(200, 200);
        let mut engine = armed(&mut harness, ShapeKind::Line);
        let id = drag(&mut engine, &mut harness, Point::new(5.0, 5.0), Point::new(5.0, 45.0)).unwrap();
        match &harness.scene.get(id).unwrap().shape {
            Shape::Line(line) => assert_eq!(line.end, Point::new(5.0, 45.0)),
            other => panic!("expected line, got {:?}", other),
        }
    }

    #[test]
    fn test_small_drafts_are_discarded() {
        let cases = [
            (ShapeKind::Rectangle, Point::new(40.0, 4.0)),
            (ShapeKind::Ellipse, Point::new(4.0, 40.0)),
            (ShapeKind::Triangle, Point::new(4.9, 4.9)),
            (ShapeKind::Circle, Point::new(5.0, 5.0)),
            (ShapeKind::Line, Point::new(3.0, 3.0)),
        ];
        for (kind, to) in cases {
            let mut harness = Harness::new(100, 100);
            let mut engine = armed(&mut harness, kind);
            drag(&mut engine, &mut harness, Point::ZERO, to);
            assert!(harness.scene.is_empty(), "{:?} draft kept", kind);
            assert!(harness.tasks.is_empty());
        }
    }

    #[test]
    fn test_press_on_existing_object_draws_nothing() {
        let mut harness = Harness::new(100, 100);
        harness
            .scene
            .add_shape(Shape::Rectangle(Rectangle::new(Point::ZERO, 50.0, 50.0)));
        let mut engine = armed(&mut harness, ShapeKind::Rectangle);
        assert!(drag(&mut engine, &mut harness, Point::new(25.0, 25.0), Point::new(90.0, 90.0)).is_none());
        assert_eq!(harness.scene.len(), 1);
    }

    #[test]
    fn test_escape_discards_draft() {
        let mut harness = Harness::new(100, 100);
        let mut engine = armed(&mut harness, ShapeKind::Triangle);
        engine.pointer_down(&Pointer::at(Point::new(10.0, 10.0)), &mut harness.ctx());
        engine.pointer_move(&Pointer::at(Point::new(60.0, 60.0)), &mut harness.ctx());
        assert_eq!(harness.scene.len(), 1);
        assert!(!harness.scene.objects().all(|o| o.selectable));

        engine.escape(&mut harness.ctx());
        assert!(harness.scene.is_empty());
        engine.pointer_up(&Pointer::at(Point::new(60.0, 60.0)), &mut harness.ctx());
        assert!(harness.tasks.is_empty());
    }

    #[test]
    fn test_existing_flags_locked_during_draft_and_restored() {
        let mut harness = Harness::new(100, 100);
        let open = harness
            .scene
            .add_shape(Shape::Rectangle(Rectangle::new(Point::new(80.0, 80.0), 10.0, 10.0)));
        let pinned = harness
            .scene
            .add_shape(Shape::Rectangle(Rectangle::new(Point::new(60.0, 80.0), 10.0, 10.0)));
        harness.scene.get_mut(pinned).unwrap().selectable = false;

        let mut engine = armed(&mut harness, ShapeKind::Rectangle);
        engine.pointer_down(&Pointer::at(Point::new(5.0, 5.0)), &mut harness.ctx());
        let draft = engine.draft().unwrap();
        assert!(harness.scene.objects().all(|o| !o.selectable && !o.evented));

        engine.pointer_move(&Pointer::at(Point::new(40.0, 40.0)), &mut harness.ctx());
        engine.pointer_up(&Pointer::at(Point::new(40.0, 40.0)), &mut harness.ctx());

        let flags = |id| {
            let o = harness.scene.get(id).unwrap();
            (o.selectable, o.evented)
        };
        assert_eq!(flags(draft), (true, true));
        assert_eq!(flags(open), (true, true));
        assert_eq!(flags(pinned), (false, true));
    }

    #[test]
    fn test_escape_restores_existing_flags() {
        let mut harness = Harness::new(100, 100);
        let other = harness
            .scene
            .add_shape(Shape::Rectangle(Rectangle::new(Point::new(80.0, 80.0), 10.0, 10.0)));
        let mut engine = armed(&mut harness, ShapeKind::Ellipse);
        engine.pointer_down(&Pointer::at(Point::new(5.0, 5.0)), &mut harness.ctx());
        assert!(!harness.scene.get(other).unwrap().selectable);

        engine.escape(&mut harness.ctx());
        assert!(harness.scene.get(other).unwrap().selectable);
    }

    #[test]
    fn test_draft_takes_configured_style() {
        let mut harness = Harness::new(100, 100);
        let mut engine = ShapeEngine::new();
        let settings = Live::new(ShapeSettings {
            kind: ShapeKind::Rectangle,
            fill: "#00ff00".to_string(),
            stroke: "#0000ff".to_string(),
            stroke_width: 3.0,
        });
        engine.enable(settings, &mut harness.ctx());
        let id = drag(&mut engine, &mut harness, Point::ZERO, Point::new(30.0, 30.0)).unwrap();
        let style = harness.scene.get(id).unwrap().shape.style().clone();
        assert_eq!(style.stroke_width, 3.0);
        assert_eq!(style.fill_color.map(|c| c.channels()), Some([0, 255, 0, 255]));
    }
}
