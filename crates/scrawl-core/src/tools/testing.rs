//! Owned collaborators for engine tests.

use super::ToolContext;
use crate::brush::PngDecoder;
use crate::eraser::PathClipper;
use crate::history::SnapshotHistory;
use crate::notify::QueuedNotifier;
use crate::raster::Overlay;
use crate::scene::Scene;
use crate::tasks::{PumpReport, TaskQueue};

pub(crate) struct Harness {
    pub scene: Scene,
    pub overlay: Overlay,
    pub history: SnapshotHistory,
    pub notifier: QueuedNotifier,
    pub tasks: TaskQueue,
    pub decoder: PngDecoder,
    pub clipper: PathClipper,
}

impl Harness {
    pub fn new(width: u32, height: u32) -> Self {
        let scene = Scene::new();
        let history = SnapshotHistory::new(&scene);
        Self {
            scene,
            overlay: Overlay::new(width, height, 1.0),
            history,
            notifier: QueuedNotifier::new(),
            tasks: TaskQueue::new(),
            decoder: PngDecoder,
            clipper: PathClipper,
        }
    }

    pub fn ctx(&mut self) -> ToolContext<'_> {
        ToolContext {
            scene: &mut self.scene,
            overlay: &mut self.overlay,
            history: &mut self.history,
            notifier: &mut self.notifier,
            tasks: &mut self.tasks,
            decoder: &self.decoder,
            clipper: &self.clipper,
        }
    }

    pub fn pump(&mut self) -> PumpReport {
        self.tasks.pump(&mut self.scene, &mut self.history)
    }
}
