//! Raster image objects, the committed form of brush strokes.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use base64::{Engine, engine::general_purpose::STANDARD};
use image::{ImageFormat as CodecFormat, RgbaImage};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use uuid::Uuid;

/// Image format for stored image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        None
    }

    fn codec(&self) -> CodecFormat {
        match self {
            ImageFormat::Png => CodecFormat::Png,
            ImageFormat::Jpeg => CodecFormat::Jpeg,
            ImageFormat::WebP => CodecFormat::WebP,
        }
    }
}

/// An image shape that displays a raster image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub(crate) id: ShapeId,
    /// Top-left corner position.
    pub position: Point,
    /// Display width.
    pub width: f64,
    /// Display height.
    pub height: f64,
    /// Image width in pixels.
    pub source_width: u32,
    /// Image height in pixels.
    pub source_height: u32,
    pub format: ImageFormat,
    /// Encoded image bytes as base64 so the scene serializes to plain JSON.
    pub data_base64: String,
    pub style: ShapeStyle,
}

impl Image {
    /// Create a new image shape from encoded image data.
    pub fn new(
        position: Point,
        data: &[u8],
        source_width: u32,
        source_height: u32,
        format: ImageFormat,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width: source_width as f64,
            height: source_height as f64,
            source_width,
            source_height,
            format,
            data_base64: STANDARD.encode(data),
            style: ShapeStyle::default(),
        }
    }

    /// Encode an RGBA buffer as PNG and wrap it in an image shape.
    pub fn from_rgba(position: Point, pixels: &RgbaImage) -> Result<Self, image::ImageError> {
        let data = encode_png(pixels)?;
        Ok(Self::new(
            position,
            &data,
            pixels.width(),
            pixels.height(),
            ImageFormat::Png,
        ))
    }

    /// Create an image shape with specific display dimensions.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Decode the stored bytes into an RGBA buffer.
    ///
    /// The codec follows the payload's magic bytes; `format` is only used
    /// when the header is unrecognized.
    pub fn decode_rgba(&self) -> Result<RgbaImage, image::ImageError> {
        let bytes = STANDARD.decode(&self.data_base64).map_err(|e| {
            image::ImageError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        let format = ImageFormat::from_magic_bytes(&bytes).unwrap_or(self.format);
        if format != self.format {
            log::debug!("Image {} tagged {:?} but holds {:?} data", self.id, self.format, format);
        }
        let decoded = image::load_from_memory_with_format(&bytes, format.codec())?;
        Ok(decoded.to_rgba8())
    }

    /// Replace the pixel content, keeping position and display size.
    pub fn set_rgba(&mut self, pixels: &RgbaImage) -> Result<(), image::ImageError> {
        let data = encode_png(pixels)?;
        self.data_base64 = STANDARD.encode(data);
        self.source_width = pixels.width();
        self.source_height = pixels.height();
        self.format = ImageFormat::Png;
        Ok(())
    }

    /// Map a scene point to pixel coordinates of the source buffer.
    pub fn scene_to_pixel(&self, point: Point) -> Point {
        let sx = if self.width > 0.0 { self.source_width as f64 / self.width } else { 1.0 };
        let sy = if self.height > 0.0 { self.source_height as f64 / self.height } else { 1.0 };
        Point::new(
            (point.x - self.position.x) * sx,
            (point.y - self.position.y) * sy,
        )
    }

    /// Scene-to-pixel scale along x.
    pub fn pixel_scale(&self) -> f64 {
        if self.width > 0.0 { self.source_width as f64 / self.width } else { 1.0 }
    }

    /// Get the bounding rectangle.
    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }
}

fn encode_png(pixels: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut out = Cursor::new(Vec::new());
    pixels.write_to(&mut out, CodecFormat::Png)?;
    Ok(out.into_inner())
}

impl ShapeTrait for Image {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.as_rect().inflate(tolerance, tolerance).contains(point)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_format_detection() {
        let png_magic = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(ImageFormat::from_magic_bytes(&png_magic), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_magic_bytes(&[0, 1]), None);
    }

    #[test]
    fn test_rgba_survives_png_encoding() {
        let mut pixels = RgbaImage::new(4, 3);
        pixels.put_pixel(1, 2, Rgba([10, 20, 30, 255]));

        let img = Image::from_rgba(Point::new(5.0, 6.0), &pixels).unwrap();
        assert_eq!(img.source_width, 4);
        assert_eq!(img.source_height, 3);
        assert_eq!(img.format, ImageFormat::Png);

        let decoded = img.decode_rgba().unwrap();
        assert_eq!(decoded.get_pixel(1, 2), &Rgba([10, 20, 30, 255]));
        assert_eq!(decoded.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_decode_follows_payload_header() {
        let mut pixels = RgbaImage::new(2, 2);
        pixels.put_pixel(1, 1, Rgba([1, 2, 3, 255]));
        let mut img = Image::from_rgba(Point::ZERO, &pixels).unwrap();
        img.format = ImageFormat::Jpeg;

        let decoded = img.decode_rgba().unwrap();
        assert_eq!(decoded.get_pixel(1, 1), &Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn test_scene_to_pixel_respects_display_size() {
        let pixels = RgbaImage::new(20, 20);
        let img = Image::from_rgba(Point::new(100.0, 100.0), &pixels)
            .unwrap()
            .with_size(10.0, 10.0);
        let p = img.scene_to_pixel(Point::new(105.0, 102.5));
        assert!((p.x - 10.0).abs() < 1e-9);
        assert!((p.y - 5.0).abs() < 1e-9);
        assert!((img.pixel_scale() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_bounds() {
        let img = Image::new(Point::new(10.0, 20.0), &[0u8; 10], 100, 50, ImageFormat::Png);
        let bounds = img.bounds();
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 70.0).abs() < f64::EPSILON);
    }
}
