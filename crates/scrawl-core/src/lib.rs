//! Scrawl Core Library
//!
//! Tool engine for a freehand drawing surface: brushes, region fill,
//! object and path erasers, shapes and panning over a persistent scene.

pub mod brush;
pub mod canvas;
pub mod color;
pub mod eraser;
pub mod fill;
pub mod geometry;
pub mod history;
pub mod input;
pub mod notify;
pub mod pan;
pub mod raster;
pub mod scene;
pub mod settings;
pub mod shape_tool;
pub mod shapes;
pub mod tasks;
pub mod tools;
pub mod viewport;

pub use brush::{Brush, BrushEngine, BrushKind, PngDecoder, RasterDecoder};
pub use canvas::Canvas;
pub use color::{ColorError, Rgba};
pub use eraser::{ClipEdit, ClippedObject, Clipper, EraserEngine, PathClipper};
pub use fill::{FillEngine, FillOutcome, FillRegion, flood_fill};
pub use history::{History, NoHistory, ResetSignal, SnapshotHistory};
pub use input::{Key, MouseButton, PointerEvent};
pub use notify::{LogNotifier, Notifier, QueuedNotifier};
pub use pan::{MiddleButtonPan, PanEngine};
pub use scene::{Scene, SceneObject};
pub use settings::{LiveSettings, SettingsBundle};
pub use shape_tool::{ShapeEngine, ShapeKind};
pub use tasks::{CommitError, PumpReport, TaskQueue};
pub use tools::{ToolController, ToolError, ToolKind, ToolSettings};
pub use viewport::Viewport;
