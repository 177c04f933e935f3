//! Brush engine.
//!
//! Every brush shares one lifecycle: a stroke starts on pointer-down, paints
//! into the transient [`Overlay`] on every move, and on pointer-up the
//! overlay is trimmed, cropped and committed as a raster object through the
//! task queue. Variants only differ in how a pointer move is rasterized.

mod commit;
mod ink;
mod jitter;
mod pattern;
mod ribbon;

pub use commit::{Placement, PngDecoder, RasterDecoder, commit_overlay};
pub use ink::{INK_AMOUNT, MARKER_INK_AMOUNT, SPLASH_THRESHOLD};
pub use jitter::ANCHOR_WINDOW;
pub use pattern::{PATTERN_TILE_SIZE, build_tile};
pub use ribbon::{RIBBON_FRAME_INTERVAL, RIBBON_PAINTERS, Ribbon};

use crate::geometry::distance;
use crate::input::{MouseButton, Pointer};
use crate::raster::{Overlay, Paint};
use crate::settings::{BrushSettings, Live};
use crate::tools::{Bindings, ToolContext, ToolEngine, reset_surface};
use image::RgbaImage;
use kurbo::Point;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Available brush algorithms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrushKind {
    #[default]
    Pencil,
    Crayon,
    Fur,
    Longfur,
    Web,
    Sketchy,
    Ink,
    Marker,
    Checkerboard,
    LinePattern,
    SquarePattern,
    DiamondPattern,
    Ribbon,
}

/// How a brush turns pointer movement into pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushFamily {
    /// One segment per move.
    Line,
    /// Primary segment plus random whiskers to nearby earlier points.
    Jitter,
    /// Width or splash dots driven by an ink amount.
    Ink,
    /// Strokes painted with a repeating tile.
    Pattern,
    /// Animated painters chasing the pointer.
    Kinetic,
}

impl BrushKind {
    pub const ALL: [BrushKind; 13] = [
        BrushKind::Pencil,
        BrushKind::Crayon,
        BrushKind::Fur,
        BrushKind::Longfur,
        BrushKind::Web,
        BrushKind::Sketchy,
        BrushKind::Ink,
        BrushKind::Marker,
        BrushKind::Checkerboard,
        BrushKind::LinePattern,
        BrushKind::SquarePattern,
        BrushKind::DiamondPattern,
        BrushKind::Ribbon,
    ];

    pub fn family(&self) -> BrushFamily {
        match self {
            BrushKind::Pencil => BrushFamily::Line,
            BrushKind::Crayon
            | BrushKind::Fur
            | BrushKind::Longfur
            | BrushKind::Web
            | BrushKind::Sketchy => BrushFamily::Jitter,
            BrushKind::Ink | BrushKind::Marker => BrushFamily::Ink,
            BrushKind::Checkerboard
            | BrushKind::LinePattern
            | BrushKind::SquarePattern
            | BrushKind::DiamondPattern => BrushFamily::Pattern,
            BrushKind::Ribbon => BrushFamily::Kinetic,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BrushKind::Pencil => "Pencil",
            BrushKind::Crayon => "Crayon",
            BrushKind::Fur => "Fur",
            BrushKind::Longfur => "Long fur",
            BrushKind::Web => "Web",
            BrushKind::Sketchy => "Sketchy",
            BrushKind::Ink => "Ink",
            BrushKind::Marker => "Marker",
            BrushKind::Checkerboard => "Checkerboard",
            BrushKind::LinePattern => "Lines",
            BrushKind::SquarePattern => "Squares",
            BrushKind::DiamondPattern => "Diamonds",
            BrushKind::Ribbon => "Ribbon",
        }
    }
}

/// Per-drag state of one brush.
#[derive(Debug, Clone, Default)]
pub struct StrokeSession {
    /// Sampled pointer positions, in order.
    pub points: Vec<Point>,
    /// Number of moves rasterized so far.
    pub segments: usize,
    /// Whether any pixel was painted.
    pub painted: bool,
}

impl StrokeSession {
    fn new(start: Point) -> Self {
        Self {
            points: vec![start],
            segments: 0,
            painted: false,
        }
    }
}

/// One brush instance: a kind plus its per-stroke state.
#[derive(Debug)]
pub struct Brush {
    kind: BrushKind,
    rng: StdRng,
    session: Option<StrokeSession>,
    tile: Option<RgbaImage>,
    ribbon: Option<Ribbon>,
}

impl Brush {
    pub fn new(kind: BrushKind) -> Self {
        Self::with_rng(kind, StdRng::from_rng(&mut rand::rng()))
    }

    /// Brush with reproducible jitter.
    pub fn with_seed(kind: BrushKind, seed: u64) -> Self {
        Self::with_rng(kind, StdRng::seed_from_u64(seed))
    }

    fn with_rng(kind: BrushKind, rng: StdRng) -> Self {
        Self {
            kind,
            rng,
            session: None,
            tile: None,
            ribbon: None,
        }
    }

    pub fn kind(&self) -> BrushKind {
        self.kind
    }

    pub fn session(&self) -> Option<&StrokeSession> {
        self.session.as_ref()
    }

    pub fn is_drawing(&self) -> bool {
        self.session.is_some()
    }

    pub fn ribbon(&self) -> Option<&Ribbon> {
        self.ribbon.as_ref()
    }

    /// Begin a stroke. Draw style is taken from the settings as they are now.
    pub fn on_stroke_start(&mut self, point: Point, settings: &BrushSettings, overlay: &mut Overlay) {
        let style = settings.draw_style();
        self.tile = None;
        self.ribbon = None;
        match self.kind.family() {
            BrushFamily::Pattern => {
                self.tile = Some(build_tile(self.kind, style.color, overlay.dpr()));
            }
            BrushFamily::Kinetic => {
                self.ribbon = Some(Ribbon::new(point, &mut self.rng));
            }
            BrushFamily::Line | BrushFamily::Jitter | BrushFamily::Ink => {}
        }
        overlay.set_style(style);
        self.session = Some(StrokeSession::new(point));
    }

    /// Paint the move into the overlay. Returns whether anything was drawn.
    pub fn on_stroke_move(&mut self, point: Point, settings: &BrushSettings, overlay: &mut Overlay) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let Some(&last) = session.points.last() else {
            return false;
        };
        if distance(last, point) < f64::EPSILON {
            return false;
        }

        overlay.set_style(settings.draw_style());
        let painted = match self.kind.family() {
            BrushFamily::Line => overlay.stroke_segment(last, point),
            BrushFamily::Jitter => jitter::paint(self.kind, &session.points, point, overlay, &mut self.rng),
            BrushFamily::Ink => ink::paint(self.kind, last, point, overlay, &mut self.rng),
            BrushFamily::Pattern => match &self.tile {
                Some(tile) => {
                    let width = overlay.style().width;
                    overlay.stroke_segment_with(last, point, width, Paint::Tile(tile))
                }
                None => false,
            },
            BrushFamily::Kinetic => {
                if let Some(ribbon) = self.ribbon.as_mut() {
                    ribbon.set_target(point);
                }
                false
            }
        };

        session.points.push(point);
        session.segments += 1;
        session.painted |= painted;
        painted
    }

    /// Advance animated brushes by one frame.
    pub fn tick(&mut self, settings: &BrushSettings, overlay: &mut Overlay) -> bool {
        let (Some(session), Some(ribbon)) = (self.session.as_mut(), self.ribbon.as_mut()) else {
            return false;
        };
        overlay.set_style(settings.draw_style());
        let painted = ribbon.step(overlay);
        session.painted |= painted;
        painted
    }

    /// Finish the stroke and queue its commit. Returns whether a commit was queued.
    pub fn on_stroke_end(&mut self, ctx: &mut ToolContext<'_>) -> bool {
        self.tile = None;
        self.ribbon = None;
        let Some(session) = self.session.take() else {
            return false;
        };
        if !session.painted {
            log::debug!("{:?} stroke painted nothing, skipping commit", self.kind);
            ctx.overlay.clear();
            return false;
        }
        commit_overlay(ctx.overlay, &ctx.scene.viewport, ctx.decoder, ctx.tasks)
    }

    /// Drop the stroke in progress without committing.
    pub fn cancel(&mut self) {
        self.session = None;
        self.tile = None;
        self.ribbon = None;
    }
}

/// The armed brush tool.
#[derive(Debug, Default)]
pub struct BrushEngine {
    settings: Option<Live<BrushSettings>>,
    brush: Option<Brush>,
    seed: Option<u64>,
}

impl BrushEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine whose brushes use reproducible jitter.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn enable(&mut self, settings: Live<BrushSettings>, ctx: &mut ToolContext<'_>) -> Bindings {
        reset_surface(ctx);
        ctx.scene.set_selection_enabled(false);
        ctx.scene.set_drawing_mode(true);
        log::info!("Brush armed ({})", settings.read().kind.display_name());
        self.settings = Some(settings);
        Bindings::POINTER.with_frame()
    }

    pub fn is_armed(&self) -> bool {
        self.settings.is_some()
    }

    pub fn brush(&self) -> Option<&Brush> {
        self.brush.as_ref()
    }

    fn brush_for(&mut self, kind: BrushKind) -> &mut Brush {
        if self.brush.as_ref().is_none_or(|brush| brush.kind() != kind) {
            self.brush = Some(match self.seed {
                Some(seed) => Brush::with_seed(kind, seed),
                None => Brush::new(kind),
            });
        }
        self.brush.get_or_insert_with(|| Brush::new(kind))
    }
}

impl ToolEngine for BrushEngine {
    fn disable(&mut self, ctx: &mut ToolContext<'_>) {
        if self.settings.take().is_none() {
            return;
        }
        if let Some(brush) = self.brush.as_mut() {
            if brush.is_drawing() {
                log::debug!("Brush disarmed mid-stroke, dropping stroke");
            }
            brush.cancel();
        }
        ctx.scene.set_drawing_mode(false);
    }

    fn pointer_down(&mut self, pointer: &Pointer, ctx: &mut ToolContext<'_>) {
        if pointer.button != MouseButton::Left {
            return;
        }
        let Some(settings) = self.settings.clone() else {
            return;
        };
        let settings = settings.read();
        let brush = self.brush_for(settings.kind);
        brush.on_stroke_start(pointer.screen, &settings, ctx.overlay);
    }

    fn pointer_move(&mut self, pointer: &Pointer, ctx: &mut ToolContext<'_>) {
        let (Some(settings), Some(brush)) = (&self.settings, self.brush.as_mut()) else {
            return;
        };
        brush.on_stroke_move(pointer.screen, &settings.read(), ctx.overlay);
    }

    fn pointer_up(&mut self, _pointer: &Pointer, ctx: &mut ToolContext<'_>) {
        if let Some(brush) = self.brush.as_mut() {
            brush.on_stroke_end(ctx);
        }
    }

    fn frame(&mut self, ctx: &mut ToolContext<'_>) {
        let (Some(settings), Some(brush)) = (&self.settings, self.brush.as_mut()) else {
            return;
        };
        brush.tick(&settings.read(), ctx.overlay);
    }
}
