//! Path eraser: a freehand stroke clipped out of the erasable objects it
//! crosses once the pointer is released.

use crate::color::Rgba;
use crate::history::ResetSignal;
use crate::raster::{DrawStyle, Paint};
use crate::scene::SceneObject;
use crate::shapes::ErasePath;
use crate::tools::ToolContext;
use kurbo::Point;

/// The live stroke instance. Rebuilt whenever history invalidates it.
#[derive(Debug, Clone, PartialEq)]
pub struct EraserBrush {
    pub width: f64,
    /// Incremented on every rebuild.
    pub generation: u64,
    points: Vec<Point>,
    last_screen: Option<Point>,
}

impl EraserBrush {
    fn new(width: f64, generation: u64) -> Self {
        Self {
            width,
            generation,
            points: Vec::new(),
            last_screen: None,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn is_drawing(&self) -> bool {
        self.last_screen.is_some()
    }
}

#[derive(Debug, Default)]
pub(super) struct PathEraser {
    brush: Option<EraserBrush>,
    reset: Option<ResetSignal>,
}

impl PathEraser {
    pub fn arm(&mut self, width: f64, ctx: &mut ToolContext<'_>) {
        ctx.scene.set_drawing_mode(true);
        ctx.scene.mark_all_erasable();

        let signal = ResetSignal::new();
        ctx.history.register_tool_reset(signal.clone());
        self.reset = Some(signal);
        self.brush = Some(EraserBrush::new(width, 0));
    }

    pub fn disarm(&mut self, ctx: &mut ToolContext<'_>) {
        if self.reset.take().is_some() {
            ctx.history.unregister_tool_reset();
        }
        self.brush = None;
        ctx.scene.release_erasable();
    }

    pub fn brush(&self) -> Option<&EraserBrush> {
        self.brush.as_ref()
    }

    pub fn set_width(&mut self, width: f64) {
        if let Some(brush) = self.brush.as_mut() {
            brush.width = width;
        }
    }

    /// Rebuild the stroke instance if history raised the reset signal.
    fn poll_reset(&mut self, ctx: &mut ToolContext<'_>) {
        if !self.reset.as_ref().is_some_and(ResetSignal::take) {
            return;
        }
        if let Some(old) = self.brush.take() {
            log::debug!("Rebuilding path eraser after history change");
            if old.is_drawing() {
                ctx.overlay.clear();
            }
            self.brush = Some(EraserBrush::new(old.width, old.generation + 1));
        }
    }

    pub fn press(&mut self, scene_point: Point, screen_point: Point, ctx: &mut ToolContext<'_>) {
        self.poll_reset(ctx);
        let Some(brush) = self.brush.as_mut() else {
            return;
        };
        brush.points.clear();
        brush.points.push(scene_point);
        brush.last_screen = Some(screen_point);

        let style = DrawStyle {
            color: Rgba::new(128, 128, 128, 0.5),
            width: brush.width * ctx.scene.viewport.zoom(),
            shadow: None,
        };
        let (color, radius) = (style.color, style.width / 2.0);
        ctx.overlay.set_style(style);
        ctx.overlay.fill_circle(screen_point, radius, Paint::Solid(color));
    }

    pub fn drag(&mut self, scene_point: Point, screen_point: Point, ctx: &mut ToolContext<'_>) {
        self.poll_reset(ctx);
        let Some(brush) = self.brush.as_mut() else {
            return;
        };
        let Some(last) = brush.last_screen else {
            return;
        };
        if brush.points.last() == Some(&scene_point) {
            return;
        }
        brush.points.push(scene_point);
        brush.last_screen = Some(screen_point);
        ctx.overlay.stroke_segment(last, screen_point);
    }

    /// Finish the stroke and queue the clip against overlapping erasable
    /// objects. Returns the number of targets.
    pub fn release(&mut self, ctx: &mut ToolContext<'_>) -> usize {
        self.poll_reset(ctx);
        let Some(brush) = self.brush.as_mut() else {
            return 0;
        };
        if brush.last_screen.take().is_none() {
            return 0;
        }
        ctx.overlay.clear();
        let path = ErasePath::new(std::mem::take(&mut brush.points), brush.width);

        let targets: Vec<SceneObject> = ctx
            .scene
            .objects()
            .filter(|object| object.erasable && path.overlaps(object.bounds()))
            .cloned()
            .collect();
        if targets.is_empty() {
            log::debug!("Erase stroke crossed no erasable objects");
            return 0;
        }
        let count = targets.len();
        ctx.tasks.apply_clip(ctx.clipper.clip(targets, path));
        count
    }
}
