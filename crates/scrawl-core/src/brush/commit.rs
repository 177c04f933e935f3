//! Turning a finished overlay into a scene object.

use crate::raster::{Overlay, crop, trim_bounds};
use crate::shapes::{Image, Shape};
use crate::tasks::{CommitError, CommitFuture, TaskQueue};
use crate::viewport::Viewport;
use image::RgbaImage;
use kurbo::Point;

/// Where a committed raster lands in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Scene position of the top-left corner.
    pub position: Point,
    pub width: f64,
    pub height: f64,
}

/// Turns a cropped stroke buffer into a scene object, asynchronously.
pub trait RasterDecoder {
    fn decode(&self, pixels: RgbaImage, placement: Placement) -> CommitFuture<Shape>;
}

/// Encodes the stroke as a PNG-backed image object.
#[derive(Debug, Default, Clone, Copy)]
pub struct PngDecoder;

impl RasterDecoder for PngDecoder {
    fn decode(&self, pixels: RgbaImage, placement: Placement) -> CommitFuture<Shape> {
        Box::pin(async move { encode_image(&pixels, placement) })
    }
}

fn encode_image(pixels: &RgbaImage, placement: Placement) -> Result<Shape, CommitError> {
    if pixels.width() == 0 || pixels.height() == 0 {
        return Err(CommitError::Empty);
    }
    let image = Image::from_rgba(placement.position, pixels)?.with_size(placement.width, placement.height);
    Ok(Shape::Image(image))
}

/// Snapshot, trim and crop the overlay, then queue the decode.
///
/// The overlay is cleared before returning; the queued decode owns its own
/// copy, so the next stroke can start immediately. Returns false when the
/// overlay held no visible pixels.
pub fn commit_overlay(
    overlay: &mut Overlay,
    viewport: &Viewport,
    decoder: &dyn RasterDecoder,
    tasks: &mut TaskQueue,
) -> bool {
    let snapshot = overlay.snapshot();
    overlay.clear();

    let Some(bounds) = trim_bounds(&snapshot) else {
        log::debug!("Overlay is fully transparent, nothing to commit");
        return false;
    };
    let pixels = crop(&snapshot, bounds);

    // Buffer pixels -> CSS pixels -> scene units.
    let dpr = overlay.dpr();
    let zoom = viewport.zoom();
    let screen_origin = Point::new(bounds.x as f64 / dpr, bounds.y as f64 / dpr);
    let placement = Placement {
        position: viewport.to_scene(screen_origin),
        width: bounds.width as f64 / dpr / zoom,
        height: bounds.height as f64 / dpr / zoom,
    };

    log::debug!(
        "Committing {}x{} stroke at ({:.1}, {:.1})",
        bounds.width,
        bounds.height,
        placement.position.x,
        placement.position.y
    );
    tasks.add_raster(decoder.decode(pixels, placement));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::history::SnapshotHistory;
    use crate::raster::DrawStyle;
    use crate::scene::Scene;

    fn stroked_overlay(dpr: f64) -> Overlay {
        let mut overlay = Overlay::new(100, 100, dpr);
        overlay.set_style(DrawStyle {
            color: Rgba::new(0, 0, 255, 1.0),
            width: 2.0,
            shadow: None,
        });
        overlay.stroke_segment(Point::new(20.0, 30.0), Point::new(40.0, 30.0));
        overlay
    }

    #[test]
    fn test_commit_places_crop_in_scene_units() {
        let mut overlay = stroked_overlay(2.0);
        let mut viewport = Viewport::new();
        viewport.transform = [2.0, 0.0, 0.0, 2.0, 10.0, 0.0];
        let mut tasks = TaskQueue::new();

        assert!(commit_overlay(&mut overlay, &viewport, &PngDecoder, &mut tasks));
        assert!(overlay.is_blank());

        let mut scene = Scene::new();
        let mut history = SnapshotHistory::new(&scene);
        tasks.pump(&mut scene, &mut history);

        let image = scene.objects().next().and_then(|o| o.shape.as_image()).cloned().unwrap();
        // Stroke spans x 19..41, y 29..31 in CSS px; scene = (css - 10) / 2.
        assert!((image.position.x - 4.5).abs() < 0.6);
        assert!((image.position.y - 14.5).abs() < 0.6);
        assert!((image.width * 2.0 * 2.0 - image.source_width as f64).abs() < 1e-9);
        assert!(image.width > 10.0 && image.width < 12.0);
    }

    #[test]
    fn test_blank_overlay_commits_nothing() {
        let mut overlay = Overlay::new(10, 10, 1.0);
        let mut tasks = TaskQueue::new();
        assert!(!commit_overlay(&mut overlay, &Viewport::new(), &PngDecoder, &mut tasks));
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_decode_snapshot_is_independent_of_overlay() {
        let mut overlay = stroked_overlay(1.0);
        let mut tasks = TaskQueue::new();
        commit_overlay(&mut overlay, &Viewport::new(), &PngDecoder, &mut tasks);

        // A second stroke before the first decode resolves.
        overlay.stroke_segment(Point::new(0.0, 90.0), Point::new(90.0, 90.0));

        let mut scene = Scene::new();
        let mut history = SnapshotHistory::new(&scene);
        tasks.pump(&mut scene, &mut history);
        let image = scene.objects().next().and_then(|o| o.shape.as_image()).cloned().unwrap();
        assert!(image.source_height < 10);
    }
}
