//! History collaborator contract and a bounded snapshot implementation.

use crate::scene::{Scene, SceneSnapshot};
use std::cell::Cell;
use std::rc::Rc;

/// Maximum number of undo states to keep.
const MAX_UNDO_HISTORY: usize = 50;

/// Flag raised by history when restored state may have invalidated a
/// tool's internal bookkeeping. The tool polls and clears it.
#[derive(Debug, Clone, Default)]
pub struct ResetSignal(Rc<Cell<bool>>);

impl ResetSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.set(true);
    }

    /// Returns whether the signal was raised, clearing it.
    pub fn take(&self) -> bool {
        self.0.replace(false)
    }
}

/// Receives a notification after every committed scene mutation.
pub trait History {
    /// Record the scene as a new history state.
    fn save_state(&mut self, scene: &Scene);

    /// Register the signal raised on undo/redo. Replaces any earlier one.
    fn register_tool_reset(&mut self, _signal: ResetSignal) {}

    fn unregister_tool_reset(&mut self) {}

    /// Step back one state. Returns false when nothing was undone.
    fn undo(&mut self, _scene: &mut Scene) -> bool {
        false
    }

    /// Step forward one state. Returns false when nothing was redone.
    fn redo(&mut self, _scene: &mut Scene) -> bool {
        false
    }
}

/// History that discards everything.
#[derive(Debug, Default)]
pub struct NoHistory;

impl History for NoHistory {
    fn save_state(&mut self, _scene: &Scene) {}
}

/// Undo/redo over whole-scene snapshots.
///
/// The last entry of `states` is the current state.
#[derive(Debug)]
pub struct SnapshotHistory {
    states: Vec<SceneSnapshot>,
    redo_stack: Vec<SceneSnapshot>,
    reset: Option<ResetSignal>,
    saves: usize,
}

impl SnapshotHistory {
    /// Start history at the scene's current content.
    pub fn new(scene: &Scene) -> Self {
        Self {
            states: vec![scene.snapshot()],
            redo_stack: Vec::new(),
            reset: None,
            saves: 0,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.states.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of `save_state` calls received.
    pub fn saves(&self) -> usize {
        self.saves
    }

    #[cfg(test)]
    pub(crate) fn has_tool_reset(&self) -> bool {
        self.reset.is_some()
    }

    fn fire_reset(&self) {
        if let Some(signal) = &self.reset {
            signal.raise();
        }
    }
}

impl History for SnapshotHistory {
    fn save_state(&mut self, scene: &Scene) {
        self.saves += 1;
        self.states.push(scene.snapshot());
        self.redo_stack.clear();
        if self.states.len() > MAX_UNDO_HISTORY + 1 {
            self.states.remove(0);
        }
    }

    fn register_tool_reset(&mut self, signal: ResetSignal) {
        self.reset = Some(signal);
    }

    fn unregister_tool_reset(&mut self) {
        self.reset = None;
    }

    fn undo(&mut self, scene: &mut Scene) -> bool {
        if !self.can_undo() {
            return false;
        }
        if let Some(current) = self.states.pop() {
            self.redo_stack.push(current);
        }
        match self.states.last() {
            Some(previous) => {
                scene.restore(previous.clone());
                self.fire_reset();
                true
            }
            None => false,
        }
    }

    fn redo(&mut self, scene: &mut Scene) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        scene.restore(next.clone());
        self.states.push(next);
        self.fire_reset();
        true
    }
}
