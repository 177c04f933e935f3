//! Color string parsing and channel comparison.
//!
//! Settings carry colors as CSS-like strings. Everything that paints or compares
//! colors goes through [`Rgba`], which holds 0-255 color channels and a 0-1 alpha.

use image::Rgba as Pixel;
use peniko::Color;
use thiserror::Error;

/// Color parsing errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("Empty color string")]
    Empty,
    #[error("Invalid hex color: {0}")]
    InvalidHex(String),
    #[error("Invalid color function: {0}")]
    InvalidFunction(String),
    #[error("Unsupported color syntax: {0}")]
    Unsupported(String),
}

/// A parsed color: 0-255 channels and a 0-1 alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba { r: 0, g: 0, b: 0, a: 1.0 };
    pub const TRANSPARENT: Rgba = Rgba { r: 0, g: 0, b: 0, a: 0.0 };

    pub fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a: a.clamp(0.0, 1.0) }
    }

    /// Parse `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`, `rgb()`, `rgba()` or `transparent`.
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ColorError::Empty);
        }
        if input.eq_ignore_ascii_case("transparent") {
            return Ok(Self::TRANSPARENT);
        }
        if let Some(hex) = input.strip_prefix('#') {
            return parse_hex(hex);
        }

        let lower = input.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
        {
            let args = args
                .strip_suffix(')')
                .ok_or_else(|| ColorError::InvalidFunction(input.to_string()))?;
            return parse_function_args(args).ok_or_else(|| ColorError::InvalidFunction(input.to_string()));
        }

        Err(ColorError::Unsupported(input.to_string()))
    }

    /// Parse a color, falling back to opaque black.
    pub fn parse_or_black(input: &str) -> Self {
        match Self::parse(input) {
            Ok(color) => color,
            Err(e) => {
                log::warn!("Falling back to black: {}", e);
                Self::BLACK
            }
        }
    }

    /// Multiply alpha by an opacity factor (clamped to 0-1, NaN treated as opaque).
    pub fn with_opacity(self, opacity: f64) -> Self {
        let opacity = if opacity.is_nan() { 1.0 } else { opacity.clamp(0.0, 1.0) };
        Self { a: self.a * opacity, ..self }
    }

    /// The `rgba(r, g, b, a)` string handed to the raster context.
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }

    /// Alpha scaled to 0-255.
    pub fn alpha_u8(&self) -> u8 {
        (self.a * 255.0).round().clamp(0.0, 255.0) as u8
    }

    /// All four channels on a 0-255 scale.
    pub fn channels(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.alpha_u8()]
    }

    pub fn to_pixel(&self) -> Pixel<u8> {
        Pixel(self.channels())
    }

    /// Channel-wise comparison against another color, inclusive of `tolerance`.
    pub fn matches(&self, other: &Rgba, tolerance: u8) -> bool {
        within_tolerance(self.channels(), other.channels(), tolerance)
    }
}

impl From<Rgba> for Color {
    fn from(color: Rgba) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.alpha_u8())
    }
}

/// True when every channel differs by at most `tolerance`.
pub fn within_tolerance(a: [u8; 4], b: [u8; 4], tolerance: u8) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x.abs_diff(*y) <= tolerance)
}

fn parse_hex(hex: &str) -> Result<Rgba, ColorError> {
    let invalid = || ColorError::InvalidHex(format!("#{}", hex));
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);

    let channels = match hex.len() {
        3 => [nibble(0), nibble(1), nibble(2), Ok(255)],
        4 => [nibble(0), nibble(1), nibble(2), nibble(3)],
        6 => [byte(0), byte(2), byte(4), Ok(255)],
        8 => [byte(0), byte(2), byte(4), byte(6)],
        _ => return Err(invalid()),
    };

    let mut out = [0u8; 4];
    for (slot, value) in out.iter_mut().zip(channels) {
        *slot = value.map_err(|_| invalid())?;
    }
    Ok(Rgba::new(out[0], out[1], out[2], out[3] as f64 / 255.0))
}

fn parse_function_args(args: &str) -> Option<Rgba> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |s: &str| -> Option<u8> {
        let v: f64 = s.parse().ok()?;
        v.is_finite().then(|| v.round().clamp(0.0, 255.0) as u8)
    };
    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;
    let a = match parts.get(3) {
        Some(s) => {
            let v: f64 = s.parse().ok()?;
            if !v.is_finite() {
                return None;
            }
            v
        }
        None => 1.0,
    };
    Some(Rgba::new(r, g, b, a))
}
