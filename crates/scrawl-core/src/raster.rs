//! Software raster surface used as the transient stroke overlay, plus trim/crop helpers.
//!
//! Coordinates passed to the overlay are CSS pixels; the backing buffer is scaled by the
//! device pixel ratio. Primitives are anti-aliased capsules blended source-over.

use crate::color::Rgba;
use crate::geometry::point_to_segment_dist;
use image::{Rgba as Pixel, RgbaImage, imageops};
use kurbo::{Point, Vec2};

/// Integer pixel bounds within a raster buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Drop shadow painted beneath every primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowStyle {
    pub blur: f64,
    pub offset: Vec2,
    pub color: Rgba,
}

/// Current draw style of the overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawStyle {
    /// Stroke color with opacity already folded into alpha.
    pub color: Rgba,
    pub width: f64,
    pub shadow: Option<ShadowStyle>,
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self {
            color: Rgba::BLACK,
            width: 1.0,
            shadow: None,
        }
    }
}

/// Source of color for covered pixels.
#[derive(Debug, Clone, Copy)]
pub enum Paint<'a> {
    Solid(Rgba),
    /// Repeating tile, anchored at the buffer origin.
    Tile(&'a RgbaImage),
}

/// Transient drawing surface composited above the scene during a stroke.
#[derive(Debug, Clone)]
pub struct Overlay {
    image: RgbaImage,
    dpr: f64,
    style: DrawStyle,
}

impl Overlay {
    /// Create an overlay covering `width` x `height` CSS pixels.
    pub fn new(width: u32, height: u32, dpr: f64) -> Self {
        let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        Self {
            image: RgbaImage::new(scaled(width, dpr), scaled(height, dpr)),
            dpr,
            style: DrawStyle::default(),
        }
    }

    /// Reallocate for a new viewport size; drops current contents.
    pub fn resize(&mut self, width: u32, height: u32, dpr: f64) {
        let style = self.style.clone();
        *self = Self::new(width, height, dpr);
        self.style = style;
    }

    pub fn dpr(&self) -> f64 {
        self.dpr
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn style(&self) -> &DrawStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: DrawStyle) {
        self.style = style;
    }

    /// Clear every pixel to transparent.
    pub fn clear(&mut self) {
        for p in self.image.pixels_mut() {
            *p = Pixel([0, 0, 0, 0]);
        }
    }

    pub fn is_blank(&self) -> bool {
        self.image.pixels().all(|p| p[3] == 0)
    }

    /// Owned copy of the current contents.
    pub fn snapshot(&self) -> RgbaImage {
        self.image.clone()
    }

    /// Stroke a segment with the current style.
    pub fn stroke_segment(&mut self, a: Point, b: Point) -> bool {
        let (color, width) = (self.style.color, self.style.width);
        self.stroke_segment_with(a, b, width, Paint::Solid(color))
    }

    /// Stroke a segment with an explicit width and paint, shadow included.
    ///
    /// Returns true when at least one pixel changed.
    pub fn stroke_segment_with(&mut self, a: Point, b: Point, width: f64, paint: Paint<'_>) -> bool {
        if !(width > 0.0) {
            return false;
        }
        let mut painted = false;
        if let Some(shadow) = self.style.shadow.clone() {
            if shadow.color.a > 0.0 {
                let color = shadow.color.with_opacity(0.5);
                painted |= self.fill_capsule(
                    a + shadow.offset,
                    b + shadow.offset,
                    width + shadow.blur.max(0.0),
                    Paint::Solid(color),
                );
            }
        }
        painted |= self.fill_capsule(a, b, width, paint);
        painted
    }

    /// Fill a disc with the current shadow settings applied.
    pub fn fill_circle(&mut self, center: Point, radius: f64, paint: Paint<'_>) -> bool {
        self.stroke_segment_with(center, center, radius * 2.0, paint)
    }

    fn fill_capsule(&mut self, a: Point, b: Point, width: f64, paint: Paint<'_>) -> bool {
        let s = self.dpr;
        let a = Point::new(a.x * s, a.y * s);
        let b = Point::new(b.x * s, b.y * s);
        let half = width * s / 2.0;
        let mut painted = false;
        let (w, h) = self.image.dimensions();
        let image = &mut self.image;
        for_each_covered(w, h, a, b, half, |x, y, coverage| {
            let src = match paint {
                Paint::Solid(color) => color.channels(),
                Paint::Tile(tile) if tile.width() > 0 && tile.height() > 0 => {
                    tile.get_pixel(x % tile.width(), y % tile.height()).0
                }
                Paint::Tile(_) => return,
            };
            let alpha = src[3] as f64 / 255.0 * coverage;
            if alpha <= 0.0 {
                return;
            }
            blend_over(image.get_pixel_mut(x, y), src, alpha);
            painted = true;
        });
        painted
    }
}

fn scaled(len: u32, dpr: f64) -> u32 {
    (len as f64 * dpr).round().max(0.0) as u32
}

/// Visit every pixel within `half` of segment a→b with its anti-aliased coverage.
fn for_each_covered(
    width: u32,
    height: u32,
    a: Point,
    b: Point,
    half: f64,
    mut visit: impl FnMut(u32, u32, f64),
) {
    if !(half > 0.0) || width == 0 || height == 0 {
        return;
    }
    let min_x = (a.x.min(b.x) - half - 1.0).floor().max(0.0);
    let min_y = (a.y.min(b.y) - half - 1.0).floor().max(0.0);
    let max_x = (a.x.max(b.x) + half + 1.0).ceil().min(width as f64);
    let max_y = (a.y.max(b.y) + half + 1.0).ceil().min(height as f64);
    if !(min_x < max_x && min_y < max_y) {
        return;
    }

    for y in min_y as u32..max_y as u32 {
        for x in min_x as u32..max_x as u32 {
            let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            let d = point_to_segment_dist(center, a, b);
            let coverage = (half + 0.5 - d).clamp(0.0, 1.0);
            if coverage > 0.0 {
                visit(x, y, coverage);
            }
        }
    }
}

/// Straight-alpha source-over blend.
fn blend_over(dst: &mut Pixel<u8>, src: [u8; 4], alpha: f64) {
    let dst_a = dst[3] as f64 / 255.0;
    let out_a = alpha + dst_a * (1.0 - alpha);
    if out_a <= 0.0 {
        *dst = Pixel([0, 0, 0, 0]);
        return;
    }
    for i in 0..3 {
        let c = (src[i] as f64 * alpha + dst[i] as f64 * dst_a * (1.0 - alpha)) / out_a;
        dst[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Reduce alpha under segment a→b (buffer pixel coordinates).
///
/// Returns true when any pixel lost alpha.
pub fn erase_segment(image: &mut RgbaImage, a: Point, b: Point, width: f64) -> bool {
    let mut erased = false;
    let (w, h) = image.dimensions();
    for_each_covered(w, h, a, b, width / 2.0, |x, y, coverage| {
        let p = image.get_pixel_mut(x, y);
        if p[3] == 0 {
            return;
        }
        p[3] = (p[3] as f64 * (1.0 - coverage)).round() as u8;
        erased = true;
    });
    erased
}

/// Tight bounds of all pixels with non-zero alpha.
pub fn trim_bounds(image: &RgbaImage) -> Option<PixelBounds> {
    let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
    let (mut max_x, mut max_y) = (0u32, 0u32);
    let mut found = false;
    for (x, y, p) in image.enumerate_pixels() {
        if p[3] == 0 {
            continue;
        }
        found = true;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    found.then(|| PixelBounds {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

/// Copy out the pixels inside `bounds`.
pub fn crop(image: &RgbaImage, bounds: PixelBounds) -> RgbaImage {
    imageops::crop_imm(image, bounds.x, bounds.y, bounds.width, bounds.height).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Rgba {
        Rgba::new(255, 0, 0, 1.0)
    }

    #[test]
    fn test_new_overlay_is_blank() {
        let overlay = Overlay::new(20, 10, 2.0);
        assert_eq!(overlay.image().dimensions(), (40, 20));
        assert!(overlay.is_blank());
        assert!(trim_bounds(overlay.image()).is_none());
    }

    #[test]
    fn test_stroke_marks_pixels() {
        let mut overlay = Overlay::new(100, 100, 1.0);
        overlay.set_style(DrawStyle { color: red(), width: 4.0, shadow: None });
        assert!(overlay.stroke_segment(Point::new(10.0, 10.0), Point::new(50.0, 10.0)));
        let p = overlay.image().get_pixel(30, 10);
        assert_eq!(p.0, [255, 0, 0, 255]);
        assert_eq!(overlay.image().get_pixel(30, 40)[3], 0);
    }

    #[test]
    fn test_zero_width_paints_nothing() {
        let mut overlay = Overlay::new(50, 50, 1.0);
        overlay.set_style(DrawStyle { color: red(), width: 0.0, shadow: None });
        assert!(!overlay.stroke_segment(Point::new(1.0, 1.0), Point::new(40.0, 40.0)));
        assert!(overlay.is_blank());
    }

    #[test]
    fn test_offscreen_segment_paints_nothing() {
        let mut overlay = Overlay::new(50, 50, 1.0);
        assert!(!overlay.stroke_segment(Point::new(-100.0, -100.0), Point::new(-80.0, -90.0)));
    }

    #[test]
    fn test_trim_and_crop() {
        let mut overlay = Overlay::new(100, 100, 1.0);
        overlay.set_style(DrawStyle { color: red(), width: 2.0, shadow: None });
        overlay.stroke_segment(Point::new(20.0, 30.0), Point::new(60.0, 30.0));
        let bounds = trim_bounds(overlay.image()).unwrap();
        assert!(bounds.x >= 17 && bounds.x <= 20);
        assert!(bounds.y >= 27 && bounds.y <= 30);
        assert!(bounds.width >= 40 && bounds.width <= 46);

        let cropped = crop(overlay.image(), bounds);
        assert_eq!(cropped.dimensions(), (bounds.width, bounds.height));
        assert!(trim_bounds(&cropped).is_some_and(|b| b.x == 0 && b.y == 0));
    }

    #[test]
    fn test_shadow_extends_coverage() {
        let mut overlay = Overlay::new(100, 100, 1.0);
        overlay.set_style(DrawStyle {
            color: red(),
            width: 2.0,
            shadow: Some(ShadowStyle {
                blur: 2.0,
                offset: Vec2::new(0.0, 10.0),
                color: Rgba::BLACK,
            }),
        });
        overlay.stroke_segment(Point::new(20.0, 20.0), Point::new(40.0, 20.0));
        assert!(overlay.image().get_pixel(30, 30)[3] > 0);
    }

    #[test]
    fn test_tile_paint_repeats() {
        let mut tile = RgbaImage::new(2, 1);
        tile.put_pixel(0, 0, Pixel([0, 0, 255, 255]));
        let mut overlay = Overlay::new(20, 20, 1.0);
        overlay.stroke_segment_with(Point::new(0.0, 5.0), Point::new(20.0, 5.0), 4.0, Paint::Tile(&tile));
        assert_eq!(overlay.image().get_pixel(4, 5).0, [0, 0, 255, 255]);
        assert_eq!(overlay.image().get_pixel(5, 5)[3], 0);
    }

    #[test]
    fn test_erase_segment_clears_alpha() {
        let mut image = RgbaImage::from_pixel(10, 10, Pixel([9, 9, 9, 255]));
        assert!(erase_segment(&mut image, Point::new(0.0, 5.0), Point::new(10.0, 5.0), 4.0));
        assert_eq!(image.get_pixel(5, 5)[3], 0);
        assert_eq!(image.get_pixel(5, 0)[3], 255);
    }
}
