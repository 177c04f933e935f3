//! Per-tool settings records.
//!
//! Settings are owned by the host and shared with the armed engine through
//! [`Live`] handles. Engines never copy a record; they read it on every event,
//! so a change made mid-drag applies from the next painted segment on.

use crate::brush::BrushKind;
use crate::color::Rgba;
use crate::raster::{DrawStyle, ShadowStyle};
use crate::shape_tool::ShapeKind;
use crate::shapes::{SerializableColor, ShapeStyle};
use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell};
use std::rc::Rc;

/// Fallback for missing or invalid widths and sizes.
const DEFAULT_WIDTH: f64 = 1.0;

/// Shared, externally mutated settings record.
#[derive(Debug, Default)]
pub struct Live<T>(Rc<RefCell<T>>);

impl<T> Clone for Live<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T> Live<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    pub fn read(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.0.borrow_mut());
    }
}

fn sanitize_width(width: f64, what: &str) -> f64 {
    if width.is_finite() && width >= 0.0 {
        width
    } else {
        log::warn!("Invalid {} {}, using {}", what, width, DEFAULT_WIDTH);
        DEFAULT_WIDTH
    }
}

fn sanitize_opacity(opacity: f64) -> f64 {
    if opacity.is_nan() { 1.0 } else { opacity.clamp(0.0, 1.0) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowSettings {
    pub blur: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub color: String,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            blur: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
            color: "#000000".to_string(),
        }
    }
}

impl ShadowSettings {
    pub fn style(&self) -> ShadowStyle {
        ShadowStyle {
            blur: if self.blur.is_finite() { self.blur.max(0.0) } else { 0.0 },
            offset: Vec2::new(self.offset_x, self.offset_y),
            color: Rgba::parse_or_black(&self.color),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushSettings {
    pub kind: BrushKind,
    pub color: String,
    pub width: f64,
    pub opacity: f64,
    pub shadow: Option<ShadowSettings>,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            kind: BrushKind::default(),
            color: "#000000".to_string(),
            width: DEFAULT_WIDTH,
            opacity: 1.0,
            shadow: None,
        }
    }
}

impl BrushSettings {
    /// Stroke width; non-finite or negative values read as 1.
    pub fn width(&self) -> f64 {
        sanitize_width(self.width, "brush width")
    }

    pub fn opacity(&self) -> f64 {
        sanitize_opacity(self.opacity)
    }

    /// Color with opacity folded into alpha.
    pub fn color(&self) -> Rgba {
        Rgba::parse_or_black(&self.color).with_opacity(self.opacity())
    }

    /// Overlay style for a new stroke.
    pub fn draw_style(&self) -> DrawStyle {
        DrawStyle {
            color: self.color(),
            width: self.width(),
            shadow: self.shadow.as_ref().map(ShadowSettings::style),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EraserMode {
    #[default]
    Object,
    Path,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EraserSettings {
    pub mode: EraserMode,
    /// Eraser diameter.
    pub size: f64,
}

impl Default for EraserSettings {
    fn default() -> Self {
        Self {
            mode: EraserMode::Object,
            size: 20.0,
        }
    }
}

impl EraserSettings {
    pub fn size(&self) -> f64 {
        sanitize_width(self.size, "eraser size")
    }

    pub fn radius(&self) -> f64 {
        self.size() / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeSettings {
    pub kind: ShapeKind,
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
}

impl Default for ShapeSettings {
    fn default() -> Self {
        Self {
            kind: ShapeKind::default(),
            fill: "transparent".to_string(),
            stroke: "#000000".to_string(),
            stroke_width: 2.0,
        }
    }
}

impl ShapeSettings {
    pub fn stroke_width(&self) -> f64 {
        sanitize_width(self.stroke_width, "shape stroke width")
    }

    /// Style for a new shape; a fully transparent fill means no fill.
    pub fn style(&self) -> ShapeStyle {
        let fill = Rgba::parse_or_black(&self.fill);
        ShapeStyle {
            stroke_color: Rgba::parse_or_black(&self.stroke).into(),
            stroke_width: self.stroke_width(),
            fill_color: (fill.alpha_u8() > 0).then(|| SerializableColor::from(fill)),
            opacity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillSettings {
    pub color: String,
    pub tolerance: u8,
}

impl Default for FillSettings {
    fn default() -> Self {
        Self {
            color: "#000000".to_string(),
            tolerance: 2,
        }
    }
}

impl FillSettings {
    pub fn color(&self) -> Rgba {
        Rgba::parse_or_black(&self.color)
    }
}

/// All tool settings, as loaded from a host configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsBundle {
    pub brush: BrushSettings,
    pub eraser: EraserSettings,
    pub shape: ShapeSettings,
    pub fill: FillSettings,
}

impl SettingsBundle {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn into_live(self) -> LiveSettings {
        LiveSettings {
            brush: Live::new(self.brush),
            eraser: Live::new(self.eraser),
            shape: Live::new(self.shape),
            fill: Live::new(self.fill),
        }
    }
}

/// Shared handles to every tool's settings.
#[derive(Debug, Clone, Default)]
pub struct LiveSettings {
    pub brush: Live<BrushSettings>,
    pub eraser: Live<EraserSettings>,
    pub shape: Live<ShapeSettings>,
    pub fill: Live<FillSettings>,
}
