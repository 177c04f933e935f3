//! Erasers: whole-object proximity removal and path clipping.
//!
//! Both modes show an indicator circle of the eraser radius that follows
//! the pointer. The mode is read when the tool is armed.

mod clip;
mod object;
mod path;

pub use clip::{ClipEdit, ClippedObject, Clipper, PathClipper};
pub use object::objects_within;
pub use path::EraserBrush;

use crate::input::{MouseButton, Pointer};
use crate::scene::Indicator;
use crate::settings::{EraserMode, EraserSettings, Live};
use crate::tools::{Bindings, ToolContext, ToolEngine, reset_surface};
use kurbo::Point;
use object::ObjectEraser;
use path::PathEraser;

#[derive(Debug, Default)]
pub struct EraserEngine {
    settings: Option<Live<EraserSettings>>,
    mode: EraserMode,
    object: ObjectEraser,
    path: PathEraser,
}

impl EraserEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable(&mut self, settings: Live<EraserSettings>, ctx: &mut ToolContext<'_>) -> Bindings {
        reset_surface(ctx);
        ctx.scene.set_selection_enabled(false);

        let (mode, size, radius) = {
            let s = settings.read();
            (s.mode, s.size(), s.radius())
        };
        ctx.scene.set_indicator(Indicator {
            center: Point::ZERO,
            radius,
        });
        match mode {
            EraserMode::Object => self.object.arm(ctx),
            EraserMode::Path => self.path.arm(size, ctx),
        }

        log::info!("Eraser armed ({:?}, size {})", mode, size);
        self.mode = mode;
        self.settings = Some(settings);
        Bindings::POINTER
    }

    pub fn is_armed(&self) -> bool {
        self.settings.is_some()
    }

    pub fn mode(&self) -> EraserMode {
        self.mode
    }

    /// The path eraser's live stroke instance, when armed in path mode.
    pub fn path_brush(&self) -> Option<&EraserBrush> {
        self.path.brush()
    }

    /// Re-read the size: indicator radius and path stroke width follow.
    pub fn size_changed(&mut self, ctx: &mut ToolContext<'_>) {
        let Some(settings) = &self.settings else {
            return;
        };
        let (size, radius) = {
            let s = settings.read();
            (s.size(), s.radius())
        };
        if let Some(indicator) = ctx.scene.indicator_mut() {
            indicator.radius = radius;
        }
        self.path.set_width(size);
        ctx.scene.render_all();
    }

    fn radius(&self) -> f64 {
        self.settings.as_ref().map_or(0.0, |s| s.read().radius())
    }

    fn track(pointer: &Pointer, ctx: &mut ToolContext<'_>) {
        if let Some(indicator) = ctx.scene.indicator_mut() {
            indicator.center = pointer.scene;
        }
    }
}

impl ToolEngine for EraserEngine {
    fn disable(&mut self, ctx: &mut ToolContext<'_>) {
        if self.settings.take().is_none() {
            return;
        }
        ctx.scene.remove_indicator();
        match self.mode {
            EraserMode::Object => self.object.disarm(ctx),
            EraserMode::Path => {
                self.path.disarm(ctx);
                ctx.scene.set_drawing_mode(false);
            }
        }
        ctx.scene.set_selection_enabled(true);
        log::debug!("Eraser disarmed");
    }

    fn pointer_down(&mut self, pointer: &Pointer, ctx: &mut ToolContext<'_>) {
        if pointer.button != MouseButton::Left || !self.is_armed() {
            return;
        }
        Self::track(pointer, ctx);
        match self.mode {
            EraserMode::Object => {
                let radius = self.radius();
                self.object.press(pointer.scene, radius, ctx);
            }
            EraserMode::Path => self.path.press(pointer.scene, pointer.screen, ctx),
        }
    }

    fn pointer_move(&mut self, pointer: &Pointer, ctx: &mut ToolContext<'_>) {
        if !self.is_armed() {
            return;
        }
        Self::track(pointer, ctx);
        match self.mode {
            EraserMode::Object => {
                let radius = self.radius();
                self.object.drag(pointer.scene, radius, ctx);
            }
            EraserMode::Path => self.path.drag(pointer.scene, pointer.screen, ctx),
        }
    }

    fn pointer_up(&mut self, _pointer: &Pointer, ctx: &mut ToolContext<'_>) {
        match self.mode {
            EraserMode::Object => {
                self.object.release(ctx);
            }
            EraserMode::Path => {
                self.path.release(ctx);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::History;
    use crate::shapes::{Rectangle, Shape, ShapeId};
    use crate::tools::testing::Harness;

    fn arm(harness: &mut Harness, mode: EraserMode, size: f64) -> (EraserEngine, Live<EraserSettings>) {
        let settings = Live::new(EraserSettings { mode, size });
        let mut engine = EraserEngine::new();
        engine.enable(settings.clone(), &mut harness.ctx());
        (engine, settings)
    }

    fn add_rect(harness: &mut Harness, x: f64, y: f64) -> ShapeId {
        harness
            .scene
            .add_shape(Shape::Rectangle(Rectangle::new(Point::new(x, y), 10.0, 10.0)))
    }

    fn drag(engine: &mut EraserEngine, harness: &mut Harness, points: &[Point]) {
        let (first, rest) = points.split_first().unwrap();
        engine.pointer_down(&Pointer::at(*first), &mut harness.ctx());
        for p in rest {
            engine.pointer_move(&Pointer::at(*p), &mut harness.ctx());
        }
        let last = points.last().copied().unwrap_or(*first);
        engine.pointer_up(&Pointer::at(last), &mut harness.ctx());
    }

    #[test]
    fn test_object_eraser_removes_along_drag() {
        let mut harness = Harness::new(200, 200);
        let near = add_rect(&mut harness, 0.0, 0.0);
        let far = add_rect(&mut harness, 150.0, 150.0);
        let (mut engine, _) = arm(&mut harness, EraserMode::Object, 20.0);

        drag(&mut engine, &mut harness, &[Point::new(40.0, 40.0), Point::new(10.0, 10.0)]);
        assert!(!harness.scene.contains(near));
        assert!(harness.scene.contains(far));
        assert_eq!(harness.history.saves(), 1);
    }

    #[test]
    fn test_object_eraser_without_hits_saves_nothing() {
        let mut harness = Harness::new(200, 200);
        add_rect(&mut harness, 0.0, 0.0);
        let (mut engine, _) = arm(&mut harness, EraserMode::Object, 4.0);
        drag(&mut engine, &mut harness, &[Point::new(100.0, 100.0), Point::new(120.0, 100.0)]);
        assert_eq!(harness.scene.len(), 1);
        assert_eq!(harness.history.saves(), 0);
    }

    #[test]
    fn test_moves_without_press_do_not_erase() {
        let mut harness = Harness::new(100, 100);
        let id = add_rect(&mut harness, 0.0, 0.0);
        let (mut engine, _) = arm(&mut harness, EraserMode::Object, 20.0);
        engine.pointer_move(&Pointer::at(Point::new(5.0, 5.0)), &mut harness.ctx());
        assert!(harness.scene.contains(id));
        assert_eq!(harness.scene.indicator().map(|i| i.center), Some(Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_objects_added_while_armed_are_locked() {
        let mut harness = Harness::new(100, 100);
        let (mut engine, _) = arm(&mut harness, EraserMode::Object, 20.0);
        let late = add_rect(&mut harness, 50.0, 50.0);
        assert!(!harness.scene.get(late).unwrap().selectable);

        engine.disable(&mut harness.ctx());
        assert!(harness.scene.get(late).unwrap().selectable);
        assert!(harness.scene.get(late).unwrap().evented);
        assert!(harness.scene.indicator().is_none());
        assert!(harness.scene.selection_enabled());
    }

    #[test]
    fn test_size_change_updates_indicator_and_stroke() {
        let mut harness = Harness::new(100, 100);
        let (mut engine, settings) = arm(&mut harness, EraserMode::Path, 20.0);
        assert_eq!(harness.scene.indicator().map(|i| i.radius), Some(10.0));

        settings.update(|s| s.size = 30.0);
        engine.size_changed(&mut harness.ctx());
        assert_eq!(harness.scene.indicator().map(|i| i.radius), Some(15.0));
        assert_eq!(engine.path_brush().map(|b| b.width), Some(30.0));
    }

    #[test]
    fn test_path_erase_clips_overlapping_targets() {
        let mut harness = Harness::new(200, 200);
        let crossed = add_rect(&mut harness, 0.0, 0.0);
        let untouched = add_rect(&mut harness, 150.0, 150.0);
        let (mut engine, _) = arm(&mut harness, EraserMode::Path, 4.0);

        drag(&mut engine, &mut harness, &[Point::new(-5.0, 5.0), Point::new(15.0, 5.0)]);
        assert!(harness.overlay.is_blank());
        let report = harness.pump();
        assert_eq!(report.clipped, 1);
        assert_eq!(harness.history.saves(), 1);
        assert_eq!(harness.scene.get(crossed).unwrap().erasures.len(), 1);
        assert!(harness.scene.get(untouched).unwrap().erasures.is_empty());
        assert!(harness.scene.get(untouched).unwrap().erasable);
    }

    #[test]
    fn test_path_erase_over_empty_canvas_queues_nothing() {
        let mut harness = Harness::new(100, 100);
        let (mut engine, _) = arm(&mut harness, EraserMode::Path, 4.0);
        drag(&mut engine, &mut harness, &[Point::new(10.0, 10.0), Point::new(20.0, 20.0)]);
        assert!(harness.tasks.is_empty());
    }

    #[test]
    fn test_undo_rebuilds_path_stroke_preserving_width() {
        let mut harness = Harness::new(200, 200);
        add_rect(&mut harness, 0.0, 0.0);
        harness.history.save_state(&harness.scene);
        let (mut engine, _) = arm(&mut harness, EraserMode::Path, 6.0);

        drag(&mut engine, &mut harness, &[Point::new(-5.0, 5.0), Point::new(15.0, 5.0)]);
        harness.pump();
        assert_eq!(engine.path_brush().map(|b| b.generation), Some(0));

        assert!(harness.history.undo(&mut harness.scene));
        engine.pointer_down(&Pointer::at(Point::new(50.0, 50.0)), &mut harness.ctx());
        let brush = engine.path_brush().unwrap();
        assert_eq!(brush.generation, 1);
        assert_eq!(brush.width, 6.0);
        assert!(harness.scene.objects().all(|o| o.erasures.is_empty() && o.erasable));
    }

    #[test]
    fn test_path_disarm_unregisters_reset() {
        let mut harness = Harness::new(100, 100);
        add_rect(&mut harness, 0.0, 0.0);
        let (mut engine, _) = arm(&mut harness, EraserMode::Path, 4.0);
        assert!(harness.history.has_tool_reset());
        assert!(harness.scene.drawing_mode());

        engine.disable(&mut harness.ctx());
        assert!(!harness.history.has_tool_reset());
        assert!(!harness.scene.drawing_mode());
        assert!(harness.scene.objects().all(|o| !o.erasable));
    }
}
