//! Scene graph: the persistent drawable objects plus the transient state
//! tools are allowed to put on it (indicator, interaction locks).

use crate::shapes::{ErasePath, SerializableColor, Shape, ShapeId};
use crate::viewport::Viewport;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A drawable object with its interaction capabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneObject {
    pub shape: Shape,
    pub selectable: bool,
    pub evented: bool,
    #[serde(default)]
    pub erasable: bool,
    /// Fill the object had before the last region fill.
    #[serde(default)]
    pub original_fill: Option<SerializableColor>,
    /// Erase strokes masking this object.
    #[serde(default)]
    pub erasures: Vec<ErasePath>,
}

impl SceneObject {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            selectable: true,
            evented: true,
            erasable: false,
            original_fill: None,
            erasures: Vec::new(),
        }
    }

    pub fn id(&self) -> ShapeId {
        self.shape.id()
    }

    pub fn center(&self) -> Point {
        self.shape.center()
    }

    pub fn width(&self) -> f64 {
        self.shape.width()
    }

    pub fn bounds(&self) -> Rect {
        self.shape.bounds()
    }
}

/// The eraser's pointer marker. Lives outside the object list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Indicator {
    pub center: Point,
    pub radius: f64,
}

/// Saved scene content for history.
///
/// Flags are recorded as they were before any tool locked them.
#[derive(Debug, Clone)]
pub struct SceneSnapshot {
    objects: HashMap<ShapeId, SceneObject>,
    z_order: Vec<ShapeId>,
}

impl SceneSnapshot {
    pub fn len(&self) -> usize {
        self.z_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z_order.is_empty()
    }
}

/// Ordered collection of drawable objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    objects: HashMap<ShapeId, SceneObject>,
    /// Back to front.
    z_order: Vec<ShapeId>,
    pub viewport: Viewport,
    #[serde(skip)]
    active_object: Option<ShapeId>,
    #[serde(skip, default = "default_true")]
    selection_enabled: bool,
    #[serde(skip)]
    drawing_mode: bool,
    #[serde(skip)]
    indicator: Option<Indicator>,
    /// Pre-lock (selectable, evented) per object while interaction is locked.
    #[serde(skip)]
    interaction_ledger: Option<HashMap<ShapeId, (bool, bool)>>,
    /// Pre-mark erasable flag per object while erasable marking is active.
    #[serde(skip)]
    erasable_ledger: Option<HashMap<ShapeId, bool>>,
    #[serde(skip)]
    render_requests: u64,
}

fn default_true() -> bool {
    true
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            z_order: Vec::new(),
            viewport: Viewport::default(),
            active_object: None,
            selection_enabled: true,
            drawing_mode: false,
            indicator: None,
            interaction_ledger: None,
            erasable_ledger: None,
            render_requests: 0,
        }
    }

    /// Add a shape on top of the scene with default flags.
    pub fn add_shape(&mut self, shape: Shape) -> ShapeId {
        self.add(SceneObject::new(shape))
    }

    /// Add an object on top. While a tool holds an interaction lock or
    /// erasable marking, the new object is brought under it too.
    pub fn add(&mut self, mut object: SceneObject) -> ShapeId {
        let id = object.id();
        if let Some(ledger) = self.interaction_ledger.as_mut() {
            ledger.insert(id, (object.selectable, object.evented));
            object.selectable = false;
            object.evented = false;
        }
        if let Some(ledger) = self.erasable_ledger.as_mut() {
            ledger.insert(id, object.erasable);
            object.erasable = true;
        }
        self.z_order.retain(|&other| other != id);
        self.z_order.push(id);
        self.objects.insert(id, object);
        id
    }

    pub fn remove(&mut self, id: ShapeId) -> Option<SceneObject> {
        self.z_order.retain(|&other| other != id);
        if self.active_object == Some(id) {
            self.active_object = None;
        }
        if let Some(ledger) = self.interaction_ledger.as_mut() {
            ledger.remove(&id);
        }
        if let Some(ledger) = self.erasable_ledger.as_mut() {
            ledger.remove(&id);
        }
        self.objects.remove(&id)
    }

    pub fn get(&self, id: ShapeId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Objects back to front. The indicator is never part of this list.
    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.z_order.iter().filter_map(|id| self.objects.get(id))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Top-most object under a scene point.
    pub fn top_object_at(&self, point: Point, tolerance: f64) -> Option<ShapeId> {
        self.z_order
            .iter()
            .rev()
            .copied()
            .find(|id| {
                self.objects
                    .get(id)
                    .is_some_and(|object| object.shape.hit_test(point, tolerance))
            })
    }

    /// Map a screen point to scene coordinates.
    pub fn to_local(&self, screen_point: Point) -> Point {
        self.viewport.to_scene(screen_point)
    }

    /// Request a repaint.
    pub fn render_all(&mut self) {
        self.render_requests += 1;
    }

    pub fn render_requests(&self) -> u64 {
        self.render_requests
    }

    pub fn set_active_object(&mut self, id: Option<ShapeId>) {
        self.active_object = id.filter(|id| self.objects.contains_key(id));
    }

    pub fn active_object(&self) -> Option<ShapeId> {
        self.active_object
    }

    pub fn selection_enabled(&self) -> bool {
        self.selection_enabled
    }

    /// Scene-level switch for rubber-band and click selection.
    pub fn set_selection_enabled(&mut self, enabled: bool) {
        self.selection_enabled = enabled;
        if !enabled {
            self.active_object = None;
        }
    }

    pub fn drawing_mode(&self) -> bool {
        self.drawing_mode
    }

    pub fn set_drawing_mode(&mut self, enabled: bool) {
        self.drawing_mode = enabled;
    }

    pub fn indicator(&self) -> Option<&Indicator> {
        self.indicator.as_ref()
    }

    pub fn indicator_mut(&mut self) -> Option<&mut Indicator> {
        self.indicator.as_mut()
    }

    pub fn set_indicator(&mut self, indicator: Indicator) {
        self.indicator = Some(indicator);
    }

    /// Remove the indicator if present. Returns whether one was removed.
    pub fn remove_indicator(&mut self) -> bool {
        self.indicator.take().is_some()
    }

    /// Make every object non-selectable and non-evented, remembering the
    /// original flags. Locking twice keeps the first originals.
    pub fn lock_interaction(&mut self) {
        if self.interaction_ledger.is_some() {
            return;
        }
        let mut ledger = HashMap::with_capacity(self.objects.len());
        for (id, object) in self.objects.iter_mut() {
            ledger.insert(*id, (object.selectable, object.evented));
            object.selectable = false;
            object.evented = false;
        }
        self.interaction_ledger = Some(ledger);
    }

    /// Restore the flags saved by [`Scene::lock_interaction`]. No-op when not locked.
    pub fn release_interaction(&mut self) {
        let Some(ledger) = self.interaction_ledger.take() else {
            return;
        };
        for (id, (selectable, evented)) in ledger {
            if let Some(object) = self.objects.get_mut(&id) {
                object.selectable = selectable;
                object.evented = evented;
            }
        }
    }

    /// Mark every object erasable, remembering the previous flag.
    pub fn mark_all_erasable(&mut self) {
        if self.erasable_ledger.is_some() {
            return;
        }
        let mut ledger = HashMap::with_capacity(self.objects.len());
        for (id, object) in self.objects.iter_mut() {
            ledger.insert(*id, object.erasable);
            object.erasable = true;
        }
        self.erasable_ledger = Some(ledger);
    }

    pub fn release_erasable(&mut self) {
        let Some(ledger) = self.erasable_ledger.take() else {
            return;
        };
        for (id, erasable) in ledger {
            if let Some(object) = self.objects.get_mut(&id) {
                object.erasable = erasable;
            }
        }
    }

    /// Capture the scene content with pre-lock flags.
    pub fn snapshot(&self) -> SceneSnapshot {
        let mut objects = self.objects.clone();
        if let Some(ledger) = &self.interaction_ledger {
            for (id, (selectable, evented)) in ledger {
                if let Some(object) = objects.get_mut(id) {
                    object.selectable = *selectable;
                    object.evented = *evented;
                }
            }
        }
        if let Some(ledger) = &self.erasable_ledger {
            for (id, erasable) in ledger {
                if let Some(object) = objects.get_mut(id) {
                    object.erasable = *erasable;
                }
            }
        }
        SceneSnapshot {
            objects,
            z_order: self.z_order.clone(),
        }
    }

    /// Replace the scene content. Active locks are re-applied to the
    /// restored objects.
    pub fn restore(&mut self, snapshot: SceneSnapshot) {
        let relock = self.interaction_ledger.take().is_some();
        let remark = self.erasable_ledger.take().is_some();

        self.objects = snapshot.objects;
        self.z_order = snapshot.z_order;
        if self.active_object.is_some_and(|id| !self.objects.contains_key(&id)) {
            self.active_object = None;
        }

        if relock {
            self.lock_interaction();
        }
        if remark {
            self.mark_all_erasable();
        }
        self.render_all();
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
