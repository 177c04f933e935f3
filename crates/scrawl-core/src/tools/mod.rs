//! Tool mode controller.
//!
//! Exactly one engine is armed at a time. Arming always disarms every engine
//! first, then lets the requested engine restore the surface and hand back
//! the input bindings it wants. The controller keeps that single
//! [`Subscription`] and routes events through it.

#[cfg(test)]
pub(crate) mod testing;

use crate::brush::{BrushEngine, RasterDecoder};
use crate::eraser::{Clipper, EraserEngine};
use crate::fill::FillEngine;
use crate::history::History;
use crate::input::Pointer;
use crate::notify::Notifier;
use crate::pan::PanEngine;
use crate::raster::Overlay;
use crate::scene::Scene;
use crate::settings::{BrushSettings, EraserSettings, FillSettings, Live, LiveSettings, ShapeSettings};
use crate::shape_tool::ShapeEngine;
use crate::tasks::TaskQueue;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    /// Neutral: no engine armed, plain selection.
    #[default]
    Select,
    Brush,
    Eraser,
    Shape,
    Fill,
    Pan,
}

/// Settings handed to an engine when it is armed.
#[derive(Debug, Clone, Default)]
pub enum ToolSettings {
    #[default]
    None,
    Brush(Live<BrushSettings>),
    Eraser(Live<EraserSettings>),
    Shape(Live<ShapeSettings>),
    Fill(Live<FillSettings>),
}

impl ToolSettings {
    /// Pick the record a tool needs out of the full settings set.
    pub fn for_tool(tool: ToolKind, settings: &LiveSettings) -> Self {
        match tool {
            ToolKind::Select | ToolKind::Pan => ToolSettings::None,
            ToolKind::Brush => ToolSettings::Brush(settings.brush.clone()),
            ToolKind::Eraser => ToolSettings::Eraser(settings.eraser.clone()),
            ToolKind::Shape => ToolSettings::Shape(settings.shape.clone()),
            ToolKind::Fill => ToolSettings::Fill(settings.fill.clone()),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ToolSettings::None => "none",
            ToolSettings::Brush(_) => "brush",
            ToolSettings::Eraser(_) => "eraser",
            ToolSettings::Shape(_) => "shape",
            ToolSettings::Fill(_) => "fill",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("Tool {tool:?} cannot be armed with {settings} settings")]
    SettingsMismatch { tool: ToolKind, settings: &'static str },
}

/// Which input events an armed engine receives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bindings {
    pub pointer_down: bool,
    pub pointer_move: bool,
    pub pointer_up: bool,
    pub escape: bool,
    pub frame: bool,
}

impl Bindings {
    pub const NONE: Bindings = Bindings {
        pointer_down: false,
        pointer_move: false,
        pointer_up: false,
        escape: false,
        frame: false,
    };

    /// Pointer down/move/up.
    pub const POINTER: Bindings = Bindings {
        pointer_down: true,
        pointer_move: true,
        pointer_up: true,
        escape: false,
        frame: false,
    };

    pub fn with_escape(self) -> Self {
        Self { escape: true, ..self }
    }

    pub fn with_frame(self) -> Self {
        Self { frame: true, ..self }
    }
}

/// The live bindings of the armed tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    pub tool: ToolKind,
    pub bindings: Bindings,
}

/// Everything an engine may touch while handling an event.
pub struct ToolContext<'a> {
    pub scene: &'a mut Scene,
    pub overlay: &'a mut Overlay,
    pub history: &'a mut dyn History,
    pub notifier: &'a mut dyn Notifier,
    pub tasks: &'a mut TaskQueue,
    pub decoder: &'a dyn RasterDecoder,
    pub clipper: &'a dyn Clipper,
}

/// Event surface shared by all engines. Arming is engine specific since
/// each takes its own settings type.
pub trait ToolEngine {
    /// Disarm. Safe to call when not armed or already disarmed.
    fn disable(&mut self, ctx: &mut ToolContext<'_>);

    fn pointer_down(&mut self, _pointer: &Pointer, _ctx: &mut ToolContext<'_>) {}

    fn pointer_move(&mut self, _pointer: &Pointer, _ctx: &mut ToolContext<'_>) {}

    fn pointer_up(&mut self, _pointer: &Pointer, _ctx: &mut ToolContext<'_>) {}

    fn escape(&mut self, _ctx: &mut ToolContext<'_>) {}

    /// Animation frame.
    fn frame(&mut self, _ctx: &mut ToolContext<'_>) {}
}

/// Strip anything a previous tool may have left on the scene: the eraser
/// indicator, interaction locks and erasable marks.
pub fn reset_surface(ctx: &mut ToolContext<'_>) {
    if ctx.scene.remove_indicator() {
        log::debug!("Removed dangling eraser indicator");
    }
    ctx.scene.release_interaction();
    ctx.scene.release_erasable();
}

/// Owns every engine and arms one at a time.
#[derive(Debug, Default)]
pub struct ToolController {
    brush: BrushEngine,
    eraser: EraserEngine,
    shape: ShapeEngine,
    fill: FillEngine,
    pan: PanEngine,
    subscription: Option<Subscription>,
}

impl ToolController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controller whose brushes use reproducible jitter.
    pub fn with_brush_seed(seed: u64) -> Self {
        Self {
            brush: BrushEngine::with_seed(seed),
            ..Self::default()
        }
    }

    pub fn subscription(&self) -> Option<&Subscription> {
        self.subscription.as_ref()
    }

    pub fn current_tool(&self) -> ToolKind {
        self.subscription.map_or(ToolKind::Select, |s| s.tool)
    }

    pub fn brush(&self) -> &BrushEngine {
        &self.brush
    }

    pub fn eraser(&self) -> &EraserEngine {
        &self.eraser
    }

    pub fn shape(&self) -> &ShapeEngine {
        &self.shape
    }

    pub fn pan(&self) -> &PanEngine {
        &self.pan
    }

    /// Disarm everything and return the surface to its neutral state.
    pub fn deactivate(&mut self, ctx: &mut ToolContext<'_>) {
        if let Some(old) = self.subscription.take() {
            log::debug!("Disposing {:?} bindings", old.tool);
        }
        self.brush.disable(ctx);
        self.eraser.disable(ctx);
        self.shape.disable(ctx);
        self.fill.disable(ctx);
        self.pan.disable(ctx);

        ctx.scene.set_selection_enabled(true);
        ctx.scene.set_drawing_mode(false);
        ctx.overlay.clear();
    }

    /// Arm `tool`, disarming whatever was armed before.
    ///
    /// On a settings mismatch the surface is left disarmed and neutral.
    pub fn activate(
        &mut self,
        tool: ToolKind,
        settings: ToolSettings,
        ctx: &mut ToolContext<'_>,
    ) -> Result<(), ToolError> {
        self.deactivate(ctx);

        let bindings = match (tool, settings) {
            (ToolKind::Select, ToolSettings::None) => {
                reset_surface(ctx);
                Bindings::NONE
            }
            (ToolKind::Brush, ToolSettings::Brush(s)) => self.brush.enable(s, ctx),
            (ToolKind::Eraser, ToolSettings::Eraser(s)) => self.eraser.enable(s, ctx),
            (ToolKind::Shape, ToolSettings::Shape(s)) => self.shape.enable(s, ctx),
            (ToolKind::Fill, ToolSettings::Fill(s)) => self.fill.enable(s, ctx),
            (ToolKind::Pan, ToolSettings::None) => self.pan.enable(ctx),
            (tool, settings) => {
                log::warn!("Refusing to arm {:?} with {} settings", tool, settings.name());
                return Err(ToolError::SettingsMismatch {
                    tool,
                    settings: settings.name(),
                });
            }
        };

        log::info!("Armed {:?}", tool);
        self.subscription = Some(Subscription { tool, bindings });
        Ok(())
    }

    fn engine(&mut self, tool: ToolKind) -> Option<&mut dyn ToolEngine> {
        match tool {
            ToolKind::Select => None,
            ToolKind::Brush => Some(&mut self.brush),
            ToolKind::Eraser => Some(&mut self.eraser),
            ToolKind::Shape => Some(&mut self.shape),
            ToolKind::Fill => Some(&mut self.fill),
            ToolKind::Pan => Some(&mut self.pan),
        }
    }

    /// The armed engine, if it is bound to the event picked by `bound`.
    fn bound(&mut self, bound: impl Fn(&Bindings) -> bool) -> Option<&mut dyn ToolEngine> {
        let sub = self.subscription?;
        if !bound(&sub.bindings) {
            return None;
        }
        self.engine(sub.tool)
    }

    pub fn pointer_down(&mut self, pointer: &Pointer, ctx: &mut ToolContext<'_>) {
        if let Some(engine) = self.bound(|b| b.pointer_down) {
            engine.pointer_down(pointer, ctx);
        }
    }

    pub fn pointer_move(&mut self, pointer: &Pointer, ctx: &mut ToolContext<'_>) {
        if let Some(engine) = self.bound(|b| b.pointer_move) {
            engine.pointer_move(pointer, ctx);
        }
    }

    pub fn pointer_up(&mut self, pointer: &Pointer, ctx: &mut ToolContext<'_>) {
        if let Some(engine) = self.bound(|b| b.pointer_up) {
            engine.pointer_up(pointer, ctx);
        }
    }

    pub fn escape(&mut self, ctx: &mut ToolContext<'_>) {
        if let Some(engine) = self.bound(|b| b.escape) {
            engine.escape(ctx);
        }
    }

    pub fn frame(&mut self, ctx: &mut ToolContext<'_>) {
        if let Some(engine) = self.bound(|b| b.frame) {
            engine.frame(ctx);
        }
    }

    /// Forward an eraser size change to the indicator and stroke.
    pub fn eraser_size_changed(&mut self, ctx: &mut ToolContext<'_>) {
        if self.current_tool() == ToolKind::Eraser {
            self.eraser.size_changed(ctx);
        }
    }
}
