//! Ribbon brush: a swarm of painters easing toward the pointer on a
//! damped spring, each leaving a line behind it every frame.

use crate::geometry::distance;
use crate::raster::Overlay;
use kurbo::{Point, Vec2};
use rand::Rng;
use std::time::Duration;

pub const RIBBON_PAINTERS: usize = 50;
/// Rate at which the host should call `Canvas::frame` while a ribbon stroke is live.
pub const RIBBON_FRAME_INTERVAL: Duration = Duration::from_millis(16);
const STIFFNESS: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct Painter {
    pub position: Point,
    pub velocity: Vec2,
    /// Per-painter damping in [0.6, 0.8).
    pub damping: f64,
}

#[derive(Debug, Clone)]
pub struct Ribbon {
    painters: Vec<Painter>,
    target: Point,
    frames: u64,
}

impl Ribbon {
    /// All painters start at rest on the stroke's first point.
    pub fn new(start: Point, rng: &mut impl Rng) -> Self {
        let painters = (0..RIBBON_PAINTERS)
            .map(|_| Painter {
                position: start,
                velocity: Vec2::ZERO,
                damping: rng.random::<f64>() * 0.2 + 0.6,
            })
            .collect();
        Self {
            painters,
            target: start,
            frames: 0,
        }
    }

    pub fn painters(&self) -> &[Painter] {
        &self.painters
    }

    pub fn target(&self) -> Point {
        self.target
    }

    pub fn set_target(&mut self, target: Point) {
        self.target = target;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advance every painter one frame; returns the (from, to) path each took.
    pub fn advance(&mut self) -> Vec<(Point, Point)> {
        self.frames += 1;
        let target = self.target;
        self.painters
            .iter_mut()
            .map(|painter| {
                let from = painter.position;
                painter.velocity = (painter.velocity + (from - target) * STIFFNESS) * painter.damping;
                painter.position = from - painter.velocity;
                (from, painter.position)
            })
            .collect()
    }

    /// One animation frame drawn into the overlay.
    pub(super) fn step(&mut self, overlay: &mut Overlay) -> bool {
        let mut painted = false;
        for (from, to) in self.advance() {
            if distance(from, to) < f64::EPSILON {
                continue;
            }
            painted |= overlay.stroke_segment(from, to);
        }
        painted
    }
}
