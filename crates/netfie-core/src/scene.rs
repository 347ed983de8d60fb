//! Scene: the ordered object collection on a fixed-size surface.

use crate::shapes::{Drawable, ObjectId, SerializableColor};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised when loading or saving a scene.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Invalid scene JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Object id {0} appears more than once")]
    DuplicateId(ObjectId),
    #[error("Scene dimensions must be non-zero, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// The part of a scene that history snapshots capture.
///
/// Surface dimensions are not part of it; resizing is not undoable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneState {
    pub background: SerializableColor,
    pub objects: Vec<Drawable>,
}

/// Objects in z-order (last is topmost) plus the surface they are drawn on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    width: u32,
    height: u32,
    background: SerializableColor,
    #[serde(default)]
    objects: Vec<Drawable>,
}

impl Scene {
    pub fn new(width: u32, height: u32, background: SerializableColor) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            background,
            objects: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resize the surface. Objects keep their positions.
    pub fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    pub fn background(&self) -> SerializableColor {
        self.background
    }

    pub fn set_background(&mut self, color: SerializableColor) {
        self.background = color;
    }

    /// Objects back to front.
    pub fn objects(&self) -> &[Drawable] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id() == id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&Drawable> {
        self.objects.iter().find(|o| o.id() == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Drawable> {
        self.objects.iter_mut().find(|o| o.id() == id)
    }

    /// Append on top. An object whose id is already taken is given a new one.
    pub fn add(&mut self, mut object: Drawable) -> ObjectId {
        if self.contains(object.id()) {
            log::warn!("Object id {} already in scene, assigning a new id", object.id());
            object.regenerate_id();
        }
        let id = object.id();
        self.objects.push(object);
        id
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<Drawable> {
        let index = self.index_of(id)?;
        Some(self.objects.remove(index))
    }

    /// Remove every object. The background is left as is.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Move to the topmost position. Returns true if the order changed.
    pub fn bring_to_front(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(index) if index + 1 < self.objects.len() => {
                let object = self.objects.remove(index);
                self.objects.push(object);
                true
            }
            _ => false,
        }
    }

    /// Move to the bottommost position. Returns true if the order changed.
    pub fn send_to_back(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(index) if index > 0 => {
                let object = self.objects.remove(index);
                self.objects.insert(0, object);
                true
            }
            _ => false,
        }
    }

    /// Move one layer towards the front.
    pub fn bring_forward(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(index) if index + 1 < self.objects.len() => {
                self.objects.swap(index, index + 1);
                true
            }
            _ => false,
        }
    }

    /// Move one layer towards the back.
    pub fn send_backward(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(index) if index > 0 => {
                self.objects.swap(index, index - 1);
                true
            }
            _ => false,
        }
    }

    /// Visible objects under `point`, front to back.
    pub fn objects_at_point(&self, point: Point, tolerance: f64) -> Vec<ObjectId> {
        self.objects
            .iter()
            .rev()
            .filter(|o| o.is_visible() && o.hit_test(point, tolerance))
            .map(Drawable::id)
            .collect()
    }

    /// Topmost visible object under `point`.
    pub fn object_at(&self, point: Point, tolerance: f64) -> Option<ObjectId> {
        self.objects
            .iter()
            .rev()
            .find(|o| o.is_visible() && o.hit_test(point, tolerance))
            .map(Drawable::id)
    }

    /// Bounding box of every object, if any.
    pub fn bounds(&self) -> Option<Rect> {
        self.objects
            .iter()
            .map(Drawable::bounds)
            .reduce(|acc, b| acc.union(b))
    }

    pub fn capture(&self) -> SceneState {
        SceneState {
            background: self.background,
            objects: self.objects.clone(),
        }
    }

    pub fn restore(&mut self, state: &SceneState) {
        self.background = state.background;
        self.objects.clone_from(&state.objects);
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize and validate a scene.
    ///
    /// Out-of-range style values are clamped; duplicate ids and zero-sized
    /// surfaces are rejected.
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        let mut scene: Scene = serde_json::from_str(json)?;
        if scene.width == 0 || scene.height == 0 {
            return Err(SceneError::InvalidDimensions {
                width: scene.width,
                height: scene.height,
            });
        }
        let mut seen: HashSet<Uuid> = HashSet::with_capacity(scene.objects.len());
        for object in &mut scene.objects {
            if !seen.insert(object.id()) {
                return Err(SceneError::DuplicateId(object.id()));
            }
            object.normalize();
        }
        Ok(scene)
    }
}
