//! The drawing surface: scene, overlay, tool controller and the host
//! collaborators, driven by raw input events.

use crate::brush::{PngDecoder, RasterDecoder};
use crate::eraser::{Clipper, PathClipper};
use crate::history::{History, SnapshotHistory};
use crate::input::{Key, MouseButton, Pointer, PointerEvent};
use crate::notify::{LogNotifier, Notifier};
use crate::pan::MiddleButtonPan;
use crate::raster::Overlay;
use crate::scene::Scene;
use crate::settings::LiveSettings;
use crate::tasks::{PumpReport, TaskQueue};
use crate::tools::{ToolContext, ToolController, ToolError, ToolKind, ToolSettings};

pub struct Canvas {
    scene: Scene,
    overlay: Overlay,
    controller: ToolController,
    tasks: TaskQueue,
    middle_pan: MiddleButtonPan,
    history: Box<dyn History>,
    notifier: Box<dyn Notifier>,
    decoder: Box<dyn RasterDecoder>,
    clipper: Box<dyn Clipper>,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("objects", &self.scene.len())
            .field("tool", &self.controller.current_tool())
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

impl Canvas {
    /// Empty canvas with a `width` x `height` CSS pixel surface, snapshot
    /// history and log-only notifications.
    pub fn new(width: u32, height: u32, dpr: f64) -> Self {
        Self::from_scene(Scene::new(), width, height, dpr)
    }

    /// Canvas over an existing scene; undo history starts at its content.
    pub fn from_scene(scene: Scene, width: u32, height: u32, dpr: f64) -> Self {
        let history = SnapshotHistory::new(&scene);
        Self {
            overlay: Overlay::new(width, height, dpr),
            scene,
            controller: ToolController::new(),
            tasks: TaskQueue::new(),
            middle_pan: MiddleButtonPan::new(),
            history: Box::new(history),
            notifier: Box::new(LogNotifier),
            decoder: Box::new(PngDecoder),
            clipper: Box::new(PathClipper),
        }
    }

    pub fn with_history(mut self, history: impl History + 'static) -> Self {
        self.history = Box::new(history);
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn with_decoder(mut self, decoder: impl RasterDecoder + 'static) -> Self {
        self.decoder = Box::new(decoder);
        self
    }

    pub fn with_clipper(mut self, clipper: impl Clipper + 'static) -> Self {
        self.clipper = Box::new(clipper);
        self
    }

    /// Reproducible brush jitter.
    pub fn with_brush_seed(mut self, seed: u64) -> Self {
        self.controller = ToolController::with_brush_seed(seed);
        self
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn controller(&self) -> &ToolController {
        &self.controller
    }

    pub fn current_tool(&self) -> ToolKind {
        self.controller.current_tool()
    }

    fn split(&mut self) -> (&mut ToolController, ToolContext<'_>) {
        (
            &mut self.controller,
            ToolContext {
                scene: &mut self.scene,
                overlay: &mut self.overlay,
                history: self.history.as_mut(),
                notifier: self.notifier.as_mut(),
                tasks: &mut self.tasks,
                decoder: self.decoder.as_ref(),
                clipper: self.clipper.as_ref(),
            },
        )
    }

    pub fn activate(&mut self, tool: ToolKind, settings: ToolSettings) -> Result<(), ToolError> {
        let (controller, mut ctx) = self.split();
        controller.activate(tool, settings, &mut ctx)
    }

    /// Arm `tool` with its record from the full settings set.
    pub fn activate_with(&mut self, tool: ToolKind, settings: &LiveSettings) -> Result<(), ToolError> {
        self.activate(tool, ToolSettings::for_tool(tool, settings))
    }

    pub fn deactivate(&mut self) {
        let (controller, mut ctx) = self.split();
        controller.deactivate(&mut ctx);
    }

    /// Route a pointer event. Middle-button drags pan the view whatever
    /// tool is armed and never reach the tool.
    pub fn pointer(&mut self, event: PointerEvent) {
        if self.middle_pan.handle(&event, &mut self.scene.viewport) {
            self.scene.render_all();
            return;
        }
        let screen = event.position();
        let button = match event {
            PointerEvent::Down { button, .. } | PointerEvent::Up { button, .. } => button,
            PointerEvent::Move { .. } => MouseButton::Left,
        };
        let pointer = Pointer {
            screen,
            scene: self.scene.to_local(screen),
            button,
        };

        let (controller, mut ctx) = self.split();
        match event {
            PointerEvent::Down { .. } => controller.pointer_down(&pointer, &mut ctx),
            PointerEvent::Move { .. } => controller.pointer_move(&pointer, &mut ctx),
            PointerEvent::Up { .. } => controller.pointer_up(&pointer, &mut ctx),
        }
    }

    pub fn key(&mut self, key: &Key) {
        if *key == Key::Escape {
            let (controller, mut ctx) = self.split();
            controller.escape(&mut ctx);
        }
    }

    /// Animation tick; the host calls this every
    /// [`RIBBON_FRAME_INTERVAL`](crate::brush::RIBBON_FRAME_INTERVAL) while a
    /// kinetic stroke is live.
    pub fn frame(&mut self) {
        let (controller, mut ctx) = self.split();
        controller.frame(&mut ctx);
    }

    /// The eraser size setting changed.
    pub fn eraser_size_changed(&mut self) {
        let (controller, mut ctx) = self.split();
        controller.eraser_size_changed(&mut ctx);
    }

    /// Apply resolved commits and deferred saves.
    pub fn pump(&mut self) -> PumpReport {
        self.tasks.pump(&mut self.scene, self.history.as_mut())
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.scene)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.scene)
    }

    /// Resize the drawing surface. Any stroke in progress is lost.
    pub fn resize(&mut self, width: u32, height: u32, dpr: f64) {
        self.overlay.resize(width, height, dpr);
    }
}
