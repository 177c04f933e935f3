//! Applying a finished erase stroke to the objects it crossed.

use crate::raster::erase_segment;
use crate::scene::SceneObject;
use crate::shapes::{ErasePath, Image, ShapeId};
use crate::tasks::{CommitError, CommitFuture};
use image::RgbaImage;

/// What an erase stroke does to one object.
#[derive(Debug, Clone)]
pub enum ClipEdit {
    /// Erased copy of a raster object's source buffer.
    Pixels(RgbaImage),
    /// Erase mask for a vector object.
    Mask(ErasePath),
}

/// Erase result for one object, applied to the live object on commit.
#[derive(Debug, Clone)]
pub struct ClippedObject {
    pub id: ShapeId,
    pub edit: ClipEdit,
}

impl ClipEdit {
    /// Apply the edit to the object as it is now. Returns whether anything changed.
    ///
    /// Erasing only lowers alpha, so erased pixels are merged by keeping the
    /// lower alpha of each pixel. Edits computed from the same source buffer
    /// compose, and later changes to the object's style or geometry survive.
    pub fn apply_to(self, object: &mut SceneObject) -> Result<bool, CommitError> {
        match self {
            ClipEdit::Mask(path) => {
                object.erasures.push(path);
                Ok(true)
            }
            ClipEdit::Pixels(erased) => {
                let image = object
                    .shape
                    .as_image_mut()
                    .ok_or_else(|| CommitError::Rejected("erase target is no longer an image".to_string()))?;
                merge_alpha(image, &erased)
            }
        }
    }
}

fn merge_alpha(image: &mut Image, erased: &RgbaImage) -> Result<bool, CommitError> {
    let mut live = image.decode_rgba()?;
    if live.dimensions() != erased.dimensions() {
        return Err(CommitError::Rejected(format!(
            "image resized from {:?} to {:?} during erase",
            erased.dimensions(),
            live.dimensions()
        )));
    }
    let mut changed = false;
    for (pixel, erased) in live.pixels_mut().zip(erased.pixels()) {
        if erased[3] < pixel[3] {
            pixel[3] = erased[3];
            changed = true;
        }
    }
    if changed {
        image.set_rgba(&live)?;
    }
    Ok(changed)
}

/// Produces erase edits for the objects a stroke crossed.
pub trait Clipper {
    fn clip(&self, targets: Vec<SceneObject>, path: ErasePath) -> CommitFuture<Vec<ClippedObject>>;
}

/// Clears raster pixels under the stroke and records the stroke on vector
/// objects as an erasure mask.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathClipper;

impl Clipper for PathClipper {
    fn clip(&self, targets: Vec<SceneObject>, path: ErasePath) -> CommitFuture<Vec<ClippedObject>> {
        Box::pin(async move { clip_all(targets, &path) })
    }
}

fn clip_all(targets: Vec<SceneObject>, path: &ErasePath) -> Result<Vec<ClippedObject>, CommitError> {
    if path.is_empty() {
        return Err(CommitError::Empty);
    }
    let mut clipped = Vec::with_capacity(targets.len());
    for object in targets {
        let id = object.id();
        let edit = match object.shape.as_image() {
            Some(image) => match erase_pixels(image, path)? {
                Some(pixels) => ClipEdit::Pixels(pixels),
                None => continue,
            },
            None => ClipEdit::Mask(path.clone()),
        };
        clipped.push(ClippedObject { id, edit });
    }
    Ok(clipped)
}

/// The erased source buffer, or `None` when the stroke missed every pixel.
fn erase_pixels(image: &Image, path: &ErasePath) -> Result<Option<RgbaImage>, CommitError> {
    let mut pixels = image.decode_rgba()?;
    let width = path.width * image.pixel_scale();
    let points: Vec<_> = path.points.iter().map(|p| image.scene_to_pixel(*p)).collect();

    let mut erased = false;
    match points.as_slice() {
        [only] => erased |= erase_segment(&mut pixels, *only, *only, width),
        _ => {
            for pair in points.windows(2) {
                erased |= erase_segment(&mut pixels, pair[0], pair[1], width);
            }
        }
    }
    Ok(erased.then_some(pixels))
}
