//! Region fill: recolor the object under the pointer.

mod flood;

pub use flood::{FillRegion, flood_fill};

use crate::color::Rgba;
use crate::input::{MouseButton, Pointer};
use crate::settings::{FillSettings, Live};
use crate::shapes::{SerializableColor, ShapeId};
use crate::tools::{Bindings, ToolContext, ToolEngine, reset_surface};
use kurbo::Point;

pub const NO_TARGET_WARNING: &str = "Fill only applies to enclosed regions picked from an existing shape";

/// What a fill click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    Missed,
    AlreadyMatching(ShapeId),
    Filled(ShapeId),
}

#[derive(Debug, Default)]
pub struct FillEngine {
    settings: Option<Live<FillSettings>>,
}

impl FillEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable(&mut self, settings: Live<FillSettings>, ctx: &mut ToolContext<'_>) -> Bindings {
        reset_surface(ctx);
        ctx.scene.set_selection_enabled(false);
        log::info!("Fill armed ({})", settings.read().color);
        self.settings = Some(settings);
        Bindings {
            pointer_down: true,
            ..Bindings::NONE
        }
    }

    pub fn is_armed(&self) -> bool {
        self.settings.is_some()
    }

    /// Fill the top-most object under `point` (scene coordinates).
    pub fn apply(&self, point: Point, ctx: &mut ToolContext<'_>) -> FillOutcome {
        let Some(settings) = &self.settings else {
            return FillOutcome::Missed;
        };
        let (requested, tolerance) = {
            let s = settings.read();
            (s.color(), s.tolerance)
        };

        let Some(id) = ctx.scene.top_object_at(point, 0.0) else {
            ctx.notifier.warn(NO_TARGET_WARNING);
            return FillOutcome::Missed;
        };
        let Some(object) = ctx.scene.get_mut(id) else {
            return FillOutcome::Missed;
        };

        let current = object.shape.style().fill_or_transparent();
        if Rgba::from(current).matches(&requested, tolerance) {
            log::debug!("Object {} already has fill {}", id, requested.to_css());
            return FillOutcome::AlreadyMatching(id);
        }

        object.original_fill = Some(current);
        object.shape.style_mut().fill_color = Some(SerializableColor::from(requested));
        ctx.scene.render_all();
        ctx.tasks.defer_save();
        FillOutcome::Filled(id)
    }
}

impl ToolEngine for FillEngine {
    fn disable(&mut self, _ctx: &mut ToolContext<'_>) {
        if self.settings.take().is_some() {
            log::debug!("Fill disarmed");
        }
    }

    fn pointer_down(&mut self, pointer: &Pointer, ctx: &mut ToolContext<'_>) {
        if pointer.button == MouseButton::Left {
            self.apply(pointer.scene, ctx);
        }
    }
}
