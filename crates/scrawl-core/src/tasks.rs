//! Deferred commits.
//!
//! Brush decodes and path-eraser clips resolve asynchronously; fill and
//! shape commits defer their history save. All of them are queued here and
//! applied to the scene when the host calls [`TaskQueue::pump`], which polls
//! each job once without blocking.

use crate::eraser::ClippedObject;
use crate::history::History;
use crate::scene::{Scene, SceneObject};
use crate::shapes::Shape;
use futures::task::noop_waker_ref;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;

/// Boxed single-threaded future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Future resolving to a commit payload.
pub type CommitFuture<T> = BoxFuture<'static, Result<T, CommitError>>;

/// Failures of asynchronous commits.
#[derive(Debug, Error)]
pub enum CommitError {
    #[error("Raster codec error: {0}")]
    Codec(#[from] image::ImageError),
    #[error("Nothing to commit")]
    Empty,
    #[error("Commit rejected: {0}")]
    Rejected(String),
}

enum Job {
    /// History save deferred to the next pump.
    Save,
    /// A decoded brush stroke to add on top of the scene.
    AddRaster(CommitFuture<Shape>),
    /// Erase edits produced by the path eraser.
    ApplyClip(CommitFuture<Vec<ClippedObject>>),
}

/// What a pump applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpReport {
    pub added: usize,
    pub clipped: usize,
    pub saves: usize,
    pub failed: usize,
    /// Jobs still waiting on their future.
    pub pending: usize,
}

#[derive(Default)]
pub struct TaskQueue {
    jobs: VecDeque<Job>,
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue").field("jobs", &self.jobs.len()).finish()
    }
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Save history on the next pump.
    pub fn defer_save(&mut self) {
        self.jobs.push_back(Job::Save);
    }

    pub fn add_raster(&mut self, future: CommitFuture<Shape>) {
        self.jobs.push_back(Job::AddRaster(future));
    }

    pub fn apply_clip(&mut self, future: CommitFuture<Vec<ClippedObject>>) {
        self.jobs.push_back(Job::ApplyClip(future));
    }

    /// Poll every queued job once, in order, applying the ready ones.
    ///
    /// A failed job is logged and leaves the scene and history untouched.
    pub fn pump(&mut self, scene: &mut Scene, history: &mut dyn History) -> PumpReport {
        let mut report = PumpReport::default();
        let mut cx = Context::from_waker(noop_waker_ref());
        let mut waiting = VecDeque::new();

        while let Some(job) = self.jobs.pop_front() {
            match job {
                Job::Save => {
                    history.save_state(scene);
                    report.saves += 1;
                }
                Job::AddRaster(mut future) => match future.as_mut().poll(&mut cx) {
                    Poll::Pending => waiting.push_back(Job::AddRaster(future)),
                    Poll::Ready(Ok(shape)) => {
                        let id = scene.add(SceneObject::new(shape));
                        log::debug!("Committed stroke raster {}", id);
                        scene.render_all();
                        history.save_state(scene);
                        report.added += 1;
                        report.saves += 1;
                    }
                    Poll::Ready(Err(e)) => {
                        log::warn!("Dropping brush stroke, decode failed: {}", e);
                        report.failed += 1;
                    }
                },
                Job::ApplyClip(mut future) => match future.as_mut().poll(&mut cx) {
                    Poll::Pending => waiting.push_back(Job::ApplyClip(future)),
                    Poll::Ready(Ok(clipped)) => {
                        let applied = apply_clipped(scene, clipped);
                        report.clipped += applied;
                        if applied > 0 {
                            scene.render_all();
                            history.save_state(scene);
                            report.saves += 1;
                        }
                    }
                    Poll::Ready(Err(e)) => {
                        log::warn!("Erase commit failed: {}", e);
                        report.failed += 1;
                    }
                },
            }
        }

        report.pending = waiting.len();
        self.jobs = waiting;
        report
    }
}

/// Apply erase edits to the objects as they are at commit time.
fn apply_clipped(scene: &mut Scene, clipped: Vec<ClippedObject>) -> usize {
    let mut applied = 0;
    for ClippedObject { id, edit } in clipped {
        let Some(object) = scene.get_mut(id) else {
            log::debug!("Clip target {} was removed before commit", id);
            continue;
        };
        match edit.apply_to(object) {
            Ok(true) => applied += 1,
            Ok(false) => {}
            Err(e) => log::warn!("Skipping erase of {}: {}", id, e),
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eraser::ClipEdit;
    use crate::history::SnapshotHistory;
    use crate::shapes::{ErasePath, Rectangle, SerializableColor};
    use futures::future;
    use kurbo::Point;

    fn rect() -> Shape {
        Shape::Rectangle(Rectangle::new(Point::ZERO, 10.0, 10.0))
    }

    #[test]
    fn test_ready_raster_is_added_and_saved() {
        let mut scene = Scene::new();
        let mut history = SnapshotHistory::new(&scene);
        let mut queue = TaskQueue::new();
        queue.add_raster(Box::pin(future::ready(Ok(rect()))));

        let report = queue.pump(&mut scene, &mut history);
        assert_eq!(report.added, 1);
        assert_eq!(report.saves, 1);
        assert_eq!(scene.len(), 1);
        assert_eq!(history.saves(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_failed_raster_adds_nothing() {
        let mut scene = Scene::new();
        let mut history = SnapshotHistory::new(&scene);
        let mut queue = TaskQueue::new();
        queue.add_raster(Box::pin(future::ready(Err(CommitError::Rejected(
            "bad".to_string(),
        )))));

        let report = queue.pump(&mut scene, &mut history);
        assert_eq!(report.failed, 1);
        assert!(scene.is_empty());
        assert_eq!(history.saves(), 0);
    }

    #[test]
    fn test_pending_jobs_stay_queued() {
        let mut scene = Scene::new();
        let mut history = SnapshotHistory::new(&scene);
        let mut queue = TaskQueue::new();
        queue.add_raster(Box::pin(future::pending()));
        queue.defer_save();

        let report = queue.pump(&mut scene, &mut history);
        assert_eq!(report.pending, 1);
        assert_eq!(report.saves, 1);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_clip_of_removed_object_is_ignored() {
        let mut scene = Scene::new();
        let mut history = SnapshotHistory::new(&scene);
        let id = rect().id();
        let mut queue = TaskQueue::new();
        queue.apply_clip(Box::pin(future::ready(Ok(vec![ClippedObject {
            id,
            edit: ClipEdit::Mask(ErasePath::new(vec![Point::ZERO], 4.0)),
        }]))));

        let report = queue.pump(&mut scene, &mut history);
        assert_eq!(report.clipped, 0);
        assert_eq!(history.saves(), 0);
    }

    #[test]
    fn test_clip_lands_on_live_object() {
        let mut scene = Scene::new();
        let mut history = SnapshotHistory::new(&scene);
        let id = scene.add_shape(rect());
        let path = ErasePath::new(vec![Point::new(0.0, 5.0), Point::new(10.0, 5.0)], 4.0);
        let mut queue = TaskQueue::new();
        queue.apply_clip(Box::pin(future::ready(Ok(vec![ClippedObject {
            id,
            edit: ClipEdit::Mask(path.clone()),
        }]))));

        // Filled after the stroke was released, before the commit ran.
        let red = SerializableColor::new(255, 0, 0, 255);
        scene.get_mut(id).unwrap().shape.style_mut().fill_color = Some(red);

        let report = queue.pump(&mut scene, &mut history);
        assert_eq!(report.clipped, 1);
        assert_eq!(history.saves(), 1);
        let object = scene.get(id).unwrap();
        assert_eq!(object.shape.style().fill_color, Some(red));
        assert_eq!(object.erasures, vec![path]);
    }
}
