//! Edit scripts: a JSON list of editor actions replayed against a session.
//!
//! ```json
//! {
//!   "steps": [
//!     { "op": "properties", "fill": "#ff0000", "opacity": 80 },
//!     { "op": "add_rectangle" },
//!     { "op": "move", "dx": 40, "dy": 0 },
//!     { "op": "commit" },
//!     { "op": "tool", "tool": "free_draw" },
//!     { "op": "stroke", "points": [{ "x": 10, "y": 10 }, { "x": 90, "y": 40 }] }
//!   ]
//! }
//! ```

use anyhow::{Context, Result, anyhow, bail};
use kurbo::{Point, Vec2};
use netfie_core::shapes::{FontStyle, FontWeight, ImageFormat, TextAlign};
use netfie_core::{
    CanvasPreset, EditorSession, MediaFile, ObjectSpec, PropertyPanel, RenderSurface,
    SerializableColor, ShapePreset, ToolKind,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// A parsed edit script.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditScript {
    #[serde(default)]
    pub steps: Vec<EditStep>,
}

impl EditScript {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid edit script")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        Self::from_json(&json)
    }
}

/// One editor action.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditStep {
    Add { object: ObjectSpec },
    AddRectangle,
    AddCircle,
    AddTriangle,
    AddText,
    AddPreset { preset: ShapePreset },
    /// Upload an image file. The MIME type is guessed from the extension
    /// unless given.
    AddImage {
        path: PathBuf,
        #[serde(default)]
        mime: Option<String>,
    },
    SelectAt { x: f64, y: f64 },
    ClearSelection,
    /// Edit panel controls; changes reach the selection, if any.
    Properties(PanelEdit),
    Move { dx: f64, dy: f64 },
    Rotate { degrees: f64 },
    Scale { x: f64, y: f64 },
    Commit,
    Duplicate,
    Delete,
    BringToFront,
    SendToBack,
    BringForward,
    SendBackward,
    Tool { tool: ToolKind },
    /// A full pointer gesture with the active tool.
    Stroke { points: Vec<Point> },
    Undo,
    Redo,
    /// Clear the canvas; the confirmation is implied.
    Clear,
    Resize { width: u32, height: u32 },
    CanvasPreset { preset: CanvasPreset },
    Zoom { percent: u32 },
}

/// Panel control values. Colors are hex strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PanelEdit {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    pub opacity: Option<u32>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub font_weight: Option<FontWeight>,
    pub font_style: Option<FontStyle>,
    pub text_align: Option<TextAlign>,
}

impl PanelEdit {
    /// Check every value before anything touches the panel.
    fn validate(&self) -> Result<ValidPanelEdit<'_>> {
        Ok(ValidPanelEdit {
            fill: self.fill.as_deref().map(parse_color).transpose()?,
            stroke: self.stroke.as_deref().map(parse_color).transpose()?,
            edit: self,
        })
    }
}

/// A [`PanelEdit`] with its colors parsed.
struct ValidPanelEdit<'a> {
    fill: Option<SerializableColor>,
    stroke: Option<SerializableColor>,
    edit: &'a PanelEdit,
}

impl ValidPanelEdit<'_> {
    fn apply(&self, panel: &mut PropertyPanel) {
        if let Some(fill) = self.fill {
            panel.set_fill_color(fill);
        }
        if let Some(stroke) = self.stroke {
            panel.set_stroke_color(stroke);
        }
        let edit = self.edit;
        if let Some(width) = edit.stroke_width {
            panel.set_stroke_width(width);
        }
        if let Some(opacity) = edit.opacity {
            panel.set_opacity(opacity);
        }
        if let Some(size) = edit.font_size {
            panel.set_font_size(size);
        }
        if let Some(family) = &edit.font_family {
            panel.set_font_family(family.as_str());
        }
        if let Some(weight) = edit.font_weight {
            panel.set_font_weight(weight);
        }
        if let Some(style) = edit.font_style {
            panel.set_font_style(style);
        }
        if let Some(align) = edit.text_align {
            panel.set_text_align(align);
        }
    }
}

fn parse_color(value: &str) -> Result<SerializableColor> {
    SerializableColor::from_hex(value).ok_or_else(|| anyhow!("invalid hex color '{value}'"))
}

/// Guess a MIME type from a file extension.
pub fn guess_mime(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if let Some(format) = ImageFormat::from_extension(&ext) {
        return format.mime_type().to_string();
    }
    let mime = match ext.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    };
    mime.to_string()
}

/// Replay `script` against `session`. Relative image paths resolve against
/// `base_dir`. Stops at the first failing step.
pub fn apply<S: RenderSurface>(
    session: &mut EditorSession<S>,
    script: &EditScript,
    base_dir: &Path,
) -> Result<()> {
    for (index, step) in script.steps.iter().enumerate() {
        apply_step(session, step, base_dir).with_context(|| format!("step {}", index + 1))?;
    }
    log::info!(
        "Applied {} steps, {} objects on the canvas",
        script.steps.len(),
        session.scene().len()
    );
    Ok(())
}

fn apply_step<S: RenderSurface>(
    session: &mut EditorSession<S>,
    step: &EditStep,
    base_dir: &Path,
) -> Result<()> {
    log::debug!("Step {step:?}");
    match step {
        EditStep::Add { object } => {
            session.add_object(object.clone());
        }
        EditStep::AddRectangle => {
            session.add_rectangle();
        }
        EditStep::AddCircle => {
            session.add_circle();
        }
        EditStep::AddTriangle => {
            session.add_triangle();
        }
        EditStep::AddText => {
            session.add_text();
        }
        EditStep::AddPreset { preset } => {
            session
                .add_preset(*preset)
                .with_context(|| format!("building {}", preset.name()))?;
        }
        EditStep::AddImage { path, mime } => {
            let path = base_dir.join(path);
            let bytes =
                std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            let mime = mime.clone().unwrap_or_else(|| guess_mime(&path));
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            session.add_image(&MediaFile::new(name, mime, bytes))?;
        }
        EditStep::SelectAt { x, y } => {
            if session.select_at(Point::new(*x, *y)).is_none() {
                log::warn!("Nothing at ({x}, {y})");
            }
        }
        EditStep::ClearSelection => session.clear_selection(),
        EditStep::Properties(edit) => {
            let edit = edit.validate()?;
            session.edit_panel(|panel| edit.apply(panel));
        }
        EditStep::Move { dx, dy } => {
            require_selection(session.translate_selected(Vec2::new(*dx, *dy)))?;
        }
        EditStep::Rotate { degrees } => {
            require_selection(session.rotate_selected(*degrees))?;
        }
        EditStep::Scale { x, y } => {
            require_selection(session.scale_selected(*x, *y))?;
        }
        EditStep::Commit => {
            session.commit_modification();
        }
        EditStep::Duplicate => {
            require_selection(session.duplicate_selected().is_some())?;
        }
        EditStep::Delete => {
            require_selection(session.remove_selected())?;
        }
        EditStep::BringToFront => reorder(session, EditorSession::bring_to_front)?,
        EditStep::SendToBack => reorder(session, EditorSession::send_to_back)?,
        EditStep::BringForward => reorder(session, EditorSession::bring_forward)?,
        EditStep::SendBackward => reorder(session, EditorSession::send_backward)?,
        EditStep::Tool { tool } => session.set_active_tool(*tool),
        EditStep::Stroke { points } => {
            let [first, rest @ ..] = points.as_slice() else {
                bail!("stroke needs at least one point");
            };
            session.pointer_down(*first);
            for point in rest {
                session.pointer_move(*point);
            }
            let last = rest.last().unwrap_or(first);
            if session.pointer_up(*last).is_none() && session.active_tool().draws() {
                log::warn!("Stroke produced no object");
            }
        }
        EditStep::Undo => {
            if !session.undo() {
                log::warn!("Nothing to undo");
            }
        }
        EditStep::Redo => {
            if !session.redo() {
                log::warn!("Nothing to redo");
            }
        }
        EditStep::Clear => {
            session.clear(|_| true);
        }
        EditStep::Resize { width, height } => session.set_custom_size(*width, *height),
        EditStep::CanvasPreset { preset } => session.apply_canvas_preset(*preset),
        EditStep::Zoom { percent } => {
            session.set_zoom(*percent);
        }
    }
    Ok(())
}

fn require_selection(applied: bool) -> Result<()> {
    if applied {
        Ok(())
    } else {
        bail!("no object selected")
    }
}

/// Layer the selection. An unchanged order is not an error.
fn reorder<S: RenderSurface>(
    session: &mut EditorSession<S>,
    op: fn(&mut EditorSession<S>, netfie_core::ObjectId) -> bool,
) -> Result<()> {
    let id = session.selection().ok_or_else(|| anyhow!("no object selected"))?;
    if !op(session, id) {
        log::debug!("Layer order unchanged");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use netfie_core::{NullSurface, SessionConfig};

    fn session() -> EditorSession<NullSurface> {
        EditorSession::new(SessionConfig::default(), NullSurface::new())
    }

    fn run(json: &str) -> Result<EditorSession<NullSurface>> {
        let mut session = session();
        apply(&mut session, &EditScript::from_json(json)?, Path::new("."))?;
        Ok(session)
    }

    #[test]
    fn test_parse_steps() {
        let script = EditScript::from_json(
            r##"{"steps": [
                {"op": "add_rectangle"},
                {"op": "add_preset", "preset": "speech_bubble"},
                {"op": "properties", "fill": "#00ff00", "opacity": 150},
                {"op": "add", "object": {"kind": "circle", "position": {"x": 5, "y": 5}, "radius": 10}},
                {"op": "tool", "tool": "erase"},
                {"op": "canvas_preset", "preset": "instagram_post"}
            ]}"##,
        )
        .unwrap();
        assert_eq!(script.steps.len(), 6);
        assert!(matches!(script.steps[1], EditStep::AddPreset { preset: ShapePreset::SpeechBubble }));
        assert!(matches!(&script.steps[2], EditStep::Properties(edit) if edit.opacity == Some(150)));
    }

    #[test]
    fn test_unknown_op_rejected() {
        assert!(EditScript::from_json(r#"{"steps": [{"op": "explode"}]}"#).is_err());
    }

    #[test]
    fn test_properties_then_add() {
        let session = run(
            r##"{"steps": [
                {"op": "properties", "fill": "#00ff00", "opacity": 150},
                {"op": "add_rectangle"}
            ]}"##,
        )
        .unwrap();
        let style = session.scene().objects()[0].style().clone();
        assert_eq!(style.fill_color, Some(SerializableColor::rgb(0, 255, 0)));
        assert_eq!(style.opacity(), 100);
    }

    #[test]
    fn test_move_requires_selection() {
        let err = run(r#"{"steps": [{"op": "move", "dx": 1, "dy": 1}]}"#).unwrap_err();
        assert!(format!("{err:#}").contains("no object selected"));
    }

    #[test]
    fn test_bad_color_reported() {
        assert!(run(r#"{"steps": [{"op": "properties", "fill": "red"}]}"#).is_err());
    }

    #[test]
    fn test_bad_color_leaves_panel_and_selection_untouched() {
        let mut session = session();
        session.add_rectangle();
        let style_before = session.selected().unwrap().style().clone();
        let panel_before = session.panel().clone();

        let script = EditScript::from_json(
            r##"{"steps": [{"op": "properties", "fill": "#00ff00", "stroke": "nope", "opacity": 20}]}"##,
        )
        .unwrap();
        assert!(apply(&mut session, &script, Path::new(".")).is_err());

        assert_eq!(session.selected().unwrap().style(), &style_before);
        assert_eq!(session.panel(), &panel_before);
    }

    #[test]
    fn test_stroke_and_undo() {
        let session = run(
            r#"{"steps": [
                {"op": "tool", "tool": "free_draw"},
                {"op": "stroke", "points": [{"x": 0, "y": 0}, {"x": 50, "y": 20}, {"x": 90, "y": 90}]},
                {"op": "undo"},
                {"op": "redo"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(session.scene().len(), 1);
        assert_eq!(session.scene().objects()[0].kind_name(), "path");
    }

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime(Path::new("a/photo.JPG")), "image/jpeg");
        assert_eq!(guess_mime(Path::new("clip.MP4")), "video/mp4");
        assert_eq!(guess_mime(Path::new("notes.txt")), "text/plain");
        assert_eq!(guess_mime(Path::new("blob")), "application/octet-stream");
    }
}
