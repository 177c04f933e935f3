//! Hand tool, plus the middle-button pan hosts wire up independently of
//! the armed tool.

use crate::input::{MouseButton, Pointer, PointerEvent};
use crate::tools::{Bindings, ToolContext, ToolEngine, reset_surface};
use crate::viewport::{OFFSET_X, OFFSET_Y, Viewport};
use kurbo::Point;

#[derive(Debug, Default)]
pub struct PanEngine {
    armed: bool,
    last: Option<Point>,
}

impl PanEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable(&mut self, ctx: &mut ToolContext<'_>) -> Bindings {
        reset_surface(ctx);
        ctx.scene.lock_interaction();
        ctx.scene.set_selection_enabled(false);
        self.armed = true;
        self.last = None;
        log::info!("Pan armed");
        Bindings::POINTER
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

impl ToolEngine for PanEngine {
    fn disable(&mut self, ctx: &mut ToolContext<'_>) {
        if !std::mem::take(&mut self.armed) {
            return;
        }
        self.last = None;
        ctx.scene.release_interaction();
    }

    fn pointer_down(&mut self, pointer: &Pointer, ctx: &mut ToolContext<'_>) {
        if !self.armed {
            return;
        }
        ctx.scene.set_selection_enabled(false);
        self.last = Some(pointer.screen);
    }

    fn pointer_move(&mut self, pointer: &Pointer, ctx: &mut ToolContext<'_>) {
        let Some(last) = self.last else {
            return;
        };
        ctx.scene.viewport.relative_pan(pointer.screen - last);
        self.last = Some(pointer.screen);
        ctx.scene.render_all();
    }

    fn pointer_up(&mut self, _pointer: &Pointer, _ctx: &mut ToolContext<'_>) {
        self.last = None;
    }
}

/// Middle-button drag panning, active whatever tool is armed.
#[derive(Debug, Default)]
pub struct MiddleButtonPan {
    last: Option<Point>,
}

impl MiddleButtonPan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a raw pointer event. Returns true when the event was consumed.
    pub fn handle(&mut self, event: &PointerEvent, viewport: &mut Viewport) -> bool {
        match *event {
            PointerEvent::Down {
                position,
                button: MouseButton::Middle,
            } => {
                self.last = Some(position);
                true
            }
            PointerEvent::Move { position } => {
                let Some(last) = self.last else {
                    return false;
                };
                viewport.transform[OFFSET_X] += position.x - last.x;
                viewport.transform[OFFSET_Y] += position.y - last.y;
                self.last = Some(position);
                true
            }
            PointerEvent::Up {
                button: MouseButton::Middle,
                ..
            } => self.last.take().is_some(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Rectangle, Shape};
    use crate::tools::testing::Harness;
    use kurbo::Vec2;

    #[test]
    fn test_pan_accumulates_exact_deltas() {
        let mut harness = Harness::new(100, 100);
        let mut engine = PanEngine::new();
        engine.enable(&mut harness.ctx());

        engine.pointer_down(&Pointer::at(Point::new(10.0, 10.0)), &mut harness.ctx());
        engine.pointer_move(&Pointer::at(Point::new(15.0, 7.0)), &mut harness.ctx());
        assert_eq!(harness.scene.viewport.offset(), Vec2::new(5.0, -3.0));
        engine.pointer_move(&Pointer::at(Point::new(25.0, 7.0)), &mut harness.ctx());
        assert_eq!(harness.scene.viewport.offset(), Vec2::new(15.0, -3.0));
        engine.pointer_up(&Pointer::at(Point::new(25.0, 7.0)), &mut harness.ctx());

        engine.pointer_move(&Pointer::at(Point::new(90.0, 90.0)), &mut harness.ctx());
        assert_eq!(harness.scene.viewport.offset(), Vec2::new(15.0, -3.0));
    }

    #[test]
    fn test_pan_locks_and_restores_objects() {
        let mut harness = Harness::new(100, 100);
        let id = harness
            .scene
            .add_shape(Shape::Rectangle(Rectangle::new(Point::ZERO, 10.0, 10.0)));
        let mut engine = PanEngine::new();
        engine.enable(&mut harness.ctx());
        assert!(!harness.scene.get(id).unwrap().selectable);

        engine.disable(&mut harness.ctx());
        engine.disable(&mut harness.ctx());
        assert!(harness.scene.get(id).unwrap().selectable);
        assert!(!engine.is_armed());
    }

    #[test]
    fn test_middle_button_pan() {
        let mut viewport = Viewport::new();
        let mut pan = MiddleButtonPan::new();
        let left = PointerEvent::Down {
            position: Point::new(0.0, 0.0),
            button: MouseButton::Left,
        };
        assert!(!pan.handle(&left, &mut viewport));
        assert!(!pan.handle(&PointerEvent::Move { position: Point::new(5.0, 5.0) }, &mut viewport));

        pan.handle(
            &PointerEvent::Down {
                position: Point::new(10.0, 10.0),
                button: MouseButton::Middle,
            },
            &mut viewport,
        );
        pan.handle(&PointerEvent::Move { position: Point::new(14.0, 12.0) }, &mut viewport);
        pan.handle(&PointerEvent::Move { position: Point::new(20.0, 12.0) }, &mut viewport);
        assert_eq!(viewport.transform[OFFSET_X], 10.0);
        assert_eq!(viewport.transform[OFFSET_Y], 2.0);

        assert!(pan.handle(
            &PointerEvent::Up {
                position: Point::new(20.0, 12.0),
                button: MouseButton::Middle,
            },
            &mut viewport,
        ));
        assert!(!pan.handle(&PointerEvent::Move { position: Point::new(50.0, 50.0) }, &mut viewport));
    }
}
