//! The canvas editing session.

use crate::history::History;
use crate::media::{self, MediaError, MediaFile, MediaKind};
use crate::properties::{PropertyPanel, PropertyPatch};
use crate::scene::{Scene, SceneError};
use crate::shapes::{
    Circle, Drawable, Image, ObjectId, Path, Rectangle, SerializableColor, ShapePreset,
    ShapeStyle, ShapeTrait, Text, Triangle, hex_color, simplify_points,
};
use crate::surface::{RasterFormat, RasterOptions, RenderContext, RenderSurface, SurfaceError};
use crate::tools::{Brush, ToolKind, ToolManager};
use kurbo::{Point, SvgParseError, Vec2};
use serde::{Deserialize, Serialize};

/// Where toolbar-created objects are placed.
pub const DEFAULT_ORIGIN: Point = Point::new(100.0, 100.0);
/// Offset applied to duplicates.
pub const DUPLICATE_OFFSET: Vec2 = Vec2::new(10.0, 10.0);
/// Uploaded images are scaled down to fit this many pixels on their long side.
pub const MAX_IMAGE_DIMENSION: f64 = 500.0;
/// Prompt shown before clearing.
pub const CLEAR_PROMPT: &str =
    "Are you sure you want to clear the canvas? This action cannot be undone.";
/// Placeholder content of new text objects.
pub const DEFAULT_TEXT: &str = "Double click to edit";

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub width: u32,
    pub height: u32,
    /// Background fill, also the colour restored by clear and used by erase.
    #[serde(with = "hex_color")]
    pub background: SerializableColor,
    /// Maximum undo entries; `None` keeps everything.
    pub history_limit: Option<usize>,
    /// Extra pick radius in pixels for pointer selection.
    pub hit_tolerance: f64,
    /// Simplification tolerance for free-draw strokes; 0 keeps every sample.
    pub stroke_tolerance: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background: SerializableColor::white(),
            history_limit: None,
            hit_tolerance: 1.0,
            stroke_tolerance: 0.5,
        }
    }
}

impl SessionConfig {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_background(mut self, color: SerializableColor) -> Self {
        self.background = color;
        self
    }

    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_stroke_tolerance(mut self, tolerance: f64) -> Self {
        self.stroke_tolerance = tolerance.max(0.0);
        self
    }

    /// Load from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Common output sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanvasPreset {
    SocialMediaPost,
    InstagramPost,
    HdVideoCover,
    InstagramStory,
}

impl CanvasPreset {
    pub const ALL: [CanvasPreset; 4] = [
        CanvasPreset::SocialMediaPost,
        CanvasPreset::InstagramPost,
        CanvasPreset::HdVideoCover,
        CanvasPreset::InstagramStory,
    ];

    /// Smallest and largest custom side length.
    pub const MIN_SIDE: u32 = 100;
    pub const MAX_SIDE: u32 = 3000;

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            CanvasPreset::SocialMediaPost => (1200, 628),
            CanvasPreset::InstagramPost => (800, 800),
            CanvasPreset::HdVideoCover => (1280, 720),
            CanvasPreset::InstagramStory => (1080, 1920),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CanvasPreset::SocialMediaPost => "Social Media Post",
            CanvasPreset::InstagramPost => "Instagram Post",
            CanvasPreset::HdVideoCover => "HD Video Cover",
            CanvasPreset::InstagramStory => "Instagram Story",
        }
    }

    /// Clamp a user-entered size into the accepted range.
    pub fn clamp_custom(width: u32, height: u32) -> (u32, u32) {
        (
            width.clamp(Self::MIN_SIDE, Self::MAX_SIDE),
            height.clamp(Self::MIN_SIDE, Self::MAX_SIDE),
        )
    }
}

/// What to create with [`EditorSession::add_object`].
///
/// `style: None` takes the current property panel style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObjectSpec {
    Rectangle {
        position: Point,
        width: f64,
        height: f64,
        #[serde(default)]
        style: Option<ShapeStyle>,
    },
    Circle {
        /// Top-left corner of the bounding square.
        position: Point,
        radius: f64,
        #[serde(default)]
        style: Option<ShapeStyle>,
    },
    Triangle {
        position: Point,
        width: f64,
        height: f64,
        #[serde(default)]
        style: Option<ShapeStyle>,
    },
    /// Text with the panel's font settings.
    Text {
        position: Point,
        content: String,
        #[serde(default)]
        style: Option<ShapeStyle>,
    },
    /// An already built object, added as is.
    #[serde(skip)]
    Object(Drawable),
}

impl ObjectSpec {
    fn build(self, panel: &PropertyPanel) -> Drawable {
        match self {
            ObjectSpec::Rectangle { position, width, height, style } => Drawable::Rectangle(
                Rectangle::new(position, width, height).with_style(style.unwrap_or_else(|| panel.style())),
            ),
            ObjectSpec::Circle { position, radius, style } => Drawable::Circle(
                Circle::new(position, radius).with_style(style.unwrap_or_else(|| panel.style())),
            ),
            ObjectSpec::Triangle { position, width, height, style } => Drawable::Triangle(
                Triangle::new(position, width, height).with_style(style.unwrap_or_else(|| panel.style())),
            ),
            ObjectSpec::Text { position, content, style } => {
                let mut text = Text::new(position, content)
                    .with_font_size(panel.font_size())
                    .with_style(style.unwrap_or_else(|| panel.text_style()));
                text.font_family = panel.font_family().to_string();
                text.font_weight = panel.font_weight();
                text.font_style = panel.font_style();
                text.text_align = panel.text_align();
                Drawable::Text(text)
            }
            ObjectSpec::Object(object) => object,
        }
    }
}

/// One open editor: scene, selection, active tool, history and the surface
/// it renders to.
///
/// Every structural mutation records a history snapshot and re-renders.
/// Property edits and transforms do not record until
/// [`commit_modification`](Self::commit_modification) is called.
#[derive(Debug)]
pub struct EditorSession<S: RenderSurface> {
    config: SessionConfig,
    scene: Scene,
    selection: Option<ObjectId>,
    tools: ToolManager,
    panel: PropertyPanel,
    history: History,
    zoom: u32,
    surface: S,
}

impl<S: RenderSurface> EditorSession<S> {
    pub const ZOOM_MIN: u32 = 25;
    pub const ZOOM_MAX: u32 = 400;
    pub const ZOOM_STEP: u32 = 25;

    /// Mount a session on `surface`.
    pub fn new(config: SessionConfig, mut surface: S) -> Self {
        let scene = Scene::new(config.width, config.height, config.background);
        surface.resize(scene.width(), scene.height());
        let history = History::new(&scene).with_limit(config.history_limit);
        log::debug!("Session created ({}x{})", scene.width(), scene.height());
        let mut session = Self {
            config,
            scene,
            selection: None,
            tools: ToolManager::new(),
            panel: PropertyPanel::default(),
            history,
            zoom: 100,
            surface,
        };
        session.render();
        session
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Take the surface back, unmounting the session.
    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn panel(&self) -> &PropertyPanel {
        &self.panel
    }

    /// Controls for new objects and brushes. Edits here reach the selection
    /// only through [`apply_panel`](Self::apply_panel).
    pub fn panel_mut(&mut self) -> &mut PropertyPanel {
        &mut self.panel
    }

    pub fn selection(&self) -> Option<ObjectId> {
        self.selection
    }

    pub fn selected(&self) -> Option<&Drawable> {
        self.selection.and_then(|id| self.scene.get(id))
    }

    pub fn active_tool(&self) -> ToolKind {
        self.tools.current_tool()
    }

    /// Zoom in percent.
    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    // --- objects ---

    /// Build, append and select a new object.
    pub fn add_object(&mut self, spec: ObjectSpec) -> ObjectId {
        let object = spec.build(&self.panel);
        let kind = object.kind_name();
        let id = self.scene.add(object);
        log::debug!("Added {kind} {id}");
        self.set_selection(Some(id));
        self.record();
        self.render();
        id
    }

    pub fn add_rectangle(&mut self) -> ObjectId {
        self.add_object(ObjectSpec::Rectangle {
            position: DEFAULT_ORIGIN,
            width: 100.0,
            height: 100.0,
            style: None,
        })
    }

    pub fn add_circle(&mut self) -> ObjectId {
        self.add_object(ObjectSpec::Circle {
            position: DEFAULT_ORIGIN,
            radius: 50.0,
            style: None,
        })
    }

    pub fn add_triangle(&mut self) -> ObjectId {
        self.add_object(ObjectSpec::Triangle {
            position: DEFAULT_ORIGIN,
            width: 100.0,
            height: 100.0,
            style: None,
        })
    }

    pub fn add_text(&mut self) -> ObjectId {
        self.add_object(ObjectSpec::Text {
            position: DEFAULT_ORIGIN,
            content: DEFAULT_TEXT.to_string(),
            style: None,
        })
    }

    /// Add a shape-library outline with the panel style.
    pub fn add_preset(&mut self, preset: ShapePreset) -> Result<ObjectId, SvgParseError> {
        let path = preset.build(DEFAULT_ORIGIN, self.panel.style())?;
        Ok(self.add_object(ObjectSpec::Object(Drawable::Path(path))))
    }

    /// Add an uploaded image, scaled to fit and centred on the surface.
    ///
    /// Rejected files leave the session untouched.
    pub fn add_image(&mut self, file: &MediaFile) -> Result<ObjectId, MediaError> {
        media::validate(MediaKind::Image, file)?;
        let mut image = Image::decode(Point::ZERO, &file.bytes)
            .inspect_err(|e| log::warn!("Could not decode '{}': {e}", file.name))?
            .fit_within(MAX_IMAGE_DIMENSION);
        let bounds = image.bounds();
        image.placement.position = Point::new(
            (f64::from(self.scene.width()) - bounds.width()) / 2.0,
            (f64::from(self.scene.height()) - bounds.height()) / 2.0,
        );
        Ok(self.add_object(ObjectSpec::Object(Drawable::Image(image))))
    }

    /// Remove an object. Returns false, recording nothing, if it is absent.
    pub fn remove_object(&mut self, id: ObjectId) -> bool {
        if self.scene.remove(id).is_none() {
            return false;
        }
        if self.selection == Some(id) {
            self.selection = None;
        }
        log::debug!("Removed {id}");
        self.record();
        self.render();
        true
    }

    pub fn remove_selected(&mut self) -> bool {
        match self.selection {
            Some(id) => self.remove_object(id),
            None => {
                log::warn!("Delete requested with no selection");
                false
            }
        }
    }

    /// Copy an object with a new id, offset down-right, on top, selected.
    pub fn duplicate_object(&mut self, id: ObjectId) -> Option<ObjectId> {
        let mut copy = self.scene.get(id)?.clone();
        copy.regenerate_id();
        copy.translate(DUPLICATE_OFFSET);
        let new_id = self.scene.add(copy);
        log::debug!("Duplicated {id} as {new_id}");
        self.set_selection(Some(new_id));
        self.record();
        self.render();
        Some(new_id)
    }

    pub fn duplicate_selected(&mut self) -> Option<ObjectId> {
        match self.selection {
            Some(id) => self.duplicate_object(id),
            None => {
                log::warn!("Duplicate requested with no selection");
                None
            }
        }
    }

    pub fn bring_to_front(&mut self, id: ObjectId) -> bool {
        let changed = self.scene.bring_to_front(id);
        self.after_reorder(changed)
    }

    pub fn send_to_back(&mut self, id: ObjectId) -> bool {
        let changed = self.scene.send_to_back(id);
        self.after_reorder(changed)
    }

    pub fn bring_forward(&mut self, id: ObjectId) -> bool {
        let changed = self.scene.bring_forward(id);
        self.after_reorder(changed)
    }

    pub fn send_backward(&mut self, id: ObjectId) -> bool {
        let changed = self.scene.send_backward(id);
        self.after_reorder(changed)
    }

    fn after_reorder(&mut self, changed: bool) -> bool {
        if changed {
            self.record();
            self.render();
        }
        changed
    }

    /// Empty the scene after `confirm` accepts [`CLEAR_PROMPT`].
    pub fn clear(&mut self, confirm: impl FnOnce(&str) -> bool) -> bool {
        if !confirm(CLEAR_PROMPT) {
            return false;
        }
        self.scene.clear();
        self.scene.set_background(self.config.background);
        self.selection = None;
        self.tools.cancel();
        log::debug!("Canvas cleared");
        self.record();
        self.render();
        true
    }

    // --- selection and properties ---

    /// Select an object and load its attributes into the panel.
    pub fn select(&mut self, id: ObjectId) -> bool {
        if !self.scene.contains(id) {
            return false;
        }
        self.set_selection(Some(id));
        self.render();
        true
    }

    /// Select the topmost visible object under `point`, or clear the selection.
    pub fn select_at(&mut self, point: Point) -> Option<ObjectId> {
        let hit = self.scene.object_at(point, self.config.hit_tolerance);
        self.set_selection(hit);
        self.render();
        hit
    }

    pub fn clear_selection(&mut self) {
        self.set_selection(None);
        self.render();
    }

    fn set_selection(&mut self, id: Option<ObjectId>) {
        self.selection = id;
        if let Some(object) = id.and_then(|id| self.scene.get(id)) {
            self.panel.sync_from(object);
        }
    }

    /// Apply `patch` to the selection, limited to the attributes its variant
    /// exposes. Returns false when nothing is selected.
    pub fn update_selected_properties(&mut self, patch: &PropertyPatch) -> bool {
        let Some(object) = self.selection.and_then(|id| self.scene.get_mut(id)) else {
            return false;
        };
        object.apply_patch(patch);
        self.render();
        true
    }

    /// Edit panel controls; the controls that changed are applied to the
    /// selection at once. Returns true if the selection was updated.
    pub fn edit_panel(&mut self, edit: impl FnOnce(&mut PropertyPanel)) -> bool {
        let before = self.panel.clone();
        edit(&mut self.panel);
        let patch = self.panel.diff(&before);
        if patch.is_empty() {
            return false;
        }
        self.update_selected_properties(&patch)
    }

    /// Push every panel control to the selection.
    pub fn apply_panel(&mut self) -> bool {
        let patch = self.panel.patch();
        self.update_selected_properties(&patch)
    }

    /// Move the selection by `delta`. Recorded on the next commit.
    pub fn translate_selected(&mut self, delta: Vec2) -> bool {
        if !delta.is_finite() {
            return false;
        }
        self.modify_selected(|object| object.translate(delta))
    }

    /// Set the selection's rotation in degrees. Recorded on the next commit.
    pub fn rotate_selected(&mut self, degrees: f64) -> bool {
        if !degrees.is_finite() {
            return false;
        }
        self.modify_selected(|object| object.placement_mut().rotation = degrees)
    }

    /// Set the selection's scale factors. Recorded on the next commit.
    pub fn scale_selected(&mut self, scale_x: f64, scale_y: f64) -> bool {
        if !(scale_x.is_finite() && scale_y.is_finite()) {
            return false;
        }
        self.modify_selected(|object| {
            let placement = object.placement_mut();
            placement.scale_x = scale_x;
            placement.scale_y = scale_y;
        })
    }

    fn modify_selected(&mut self, f: impl FnOnce(&mut Drawable)) -> bool {
        let Some(object) = self.selection.and_then(|id| self.scene.get_mut(id)) else {
            return false;
        };
        f(object);
        self.render();
        true
    }

    /// End of an interactive modification: record the current state.
    pub fn commit_modification(&mut self) -> u64 {
        self.record()
    }

    // --- tools and pointer input ---

    pub fn set_active_tool(&mut self, tool: ToolKind) {
        if self.tools.current_tool() != tool {
            log::debug!("Tool {:?} -> {tool:?}", self.tools.current_tool());
        }
        self.tools.set_tool(tool);
    }

    pub fn pointer_down(&mut self, point: Point) {
        self.tools.begin(point);
    }

    pub fn pointer_move(&mut self, point: Point) {
        self.tools.update(point);
    }

    /// Finish a stroke. In drawing modes the samples become one path object
    /// and one history entry; the new stroke is not selected.
    pub fn pointer_up(&mut self, point: Point) -> Option<ObjectId> {
        let tool = self.tools.current_tool();
        let points = self.tools.end(point)?;
        let brush = Brush::for_tool(tool, &self.panel, self.scene.background())?;
        let points = simplify_points(&points, self.config.stroke_tolerance);
        let style = ShapeStyle::new(None, brush.color, brush.width, ShapeStyle::MAX_OPACITY);
        let stroke = Path::from_points(&points).with_style(style);
        let id = self.scene.add(Drawable::Path(stroke));
        log::debug!("Committed {tool:?} stroke {id} ({} points)", points.len());
        self.record();
        self.render();
        Some(id)
    }

    // --- history ---

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                log::debug!("Undo to r{}", snapshot.revision());
                self.scene.restore(snapshot.state());
                self.after_restore();
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                log::debug!("Redo to r{}", snapshot.revision());
                self.scene.restore(snapshot.state());
                self.after_restore();
                true
            }
            None => false,
        }
    }

    fn after_restore(&mut self) {
        let surviving = self.selection.filter(|id| self.scene.contains(*id));
        self.set_selection(surviving);
        self.tools.cancel();
        self.render();
    }

    fn record(&mut self) -> u64 {
        self.history.record(&self.scene)
    }

    // --- surface ---

    /// Resize the surface. Objects keep their positions and the change is
    /// not recorded in history.
    pub fn set_dimensions(&mut self, width: u32, height: u32) {
        self.scene.set_dimensions(width, height);
        self.surface.resize(self.scene.width(), self.scene.height());
        log::debug!("Resized to {}x{}", self.scene.width(), self.scene.height());
        self.render();
    }

    pub fn apply_canvas_preset(&mut self, preset: CanvasPreset) {
        let (width, height) = preset.dimensions();
        self.set_dimensions(width, height);
    }

    /// Resize to a user-entered size, clamped to the accepted range.
    pub fn set_custom_size(&mut self, width: u32, height: u32) {
        let (width, height) = CanvasPreset::clamp_custom(width, height);
        self.set_dimensions(width, height);
    }

    /// Set the view zoom. Values are clamped; export is unaffected.
    pub fn set_zoom(&mut self, percent: u32) -> u32 {
        self.zoom = percent.clamp(Self::ZOOM_MIN, Self::ZOOM_MAX);
        self.render();
        self.zoom
    }

    pub fn zoom_in(&mut self) -> u32 {
        self.set_zoom(self.zoom.saturating_add(Self::ZOOM_STEP))
    }

    pub fn zoom_out(&mut self) -> u32 {
        self.set_zoom(self.zoom.saturating_sub(Self::ZOOM_STEP))
    }

    /// Rasterize the scene at 1x scale and maximum quality.
    pub fn export_raster(&mut self, format: RasterFormat) -> Result<Vec<u8>, SurfaceError> {
        self.export_with(&RasterOptions::new(format))
    }

    pub fn export_with(&mut self, options: &RasterOptions) -> Result<Vec<u8>, SurfaceError> {
        let bytes = self.surface.rasterize(&self.scene, options)?;
        log::info!(
            "Exported {}x{} {:?} ({} bytes)",
            self.scene.width(),
            self.scene.height(),
            options.format,
            bytes.len()
        );
        Ok(bytes)
    }

    // --- documents ---

    pub fn to_json(&self) -> Result<String, SceneError> {
        self.scene.to_json()
    }

    /// Replace the scene with a saved one. History restarts from it.
    pub fn load_json(&mut self, json: &str) -> Result<(), SceneError> {
        let scene = Scene::from_json(json)?;
        self.scene = scene;
        self.selection = None;
        self.tools.cancel();
        self.history = History::new(&self.scene).with_limit(self.config.history_limit);
        self.surface.resize(self.scene.width(), self.scene.height());
        log::debug!("Loaded scene with {} objects", self.scene.len());
        self.render();
        Ok(())
    }

    fn render(&mut self) {
        let ctx = RenderContext::new(&self.scene)
            .with_selection(self.selection)
            .with_zoom(f64::from(self.zoom) / 100.0);
        if let Err(e) = self.surface.render(&ctx) {
            log::warn!("Render failed: {e}");
        }
    }
}
