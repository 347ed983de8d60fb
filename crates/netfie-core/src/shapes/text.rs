//! Text shape.

use super::{ObjectId, Placement, ShapeStyle, ShapeTrait};
use crate::properties::PropertyPatch;
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Font weight options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    /// CSS keyword.
    pub fn css(&self) -> &'static str {
        match self {
            FontWeight::Normal => "normal",
            FontWeight::Bold => "bold",
        }
    }
}

/// Font style options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

impl FontStyle {
    pub fn css(&self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
        }
    }
}

/// Horizontal alignment of lines inside the text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn css(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// A text shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ObjectId,
    pub placement: Placement,
    pub content: String,
    pub font_family: String,
    /// Font size in pixels.
    pub font_size: f64,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(default)]
    pub font_style: FontStyle,
    #[serde(default)]
    pub text_align: TextAlign,
    pub style: ShapeStyle,
}

impl Text {
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;
    pub const DEFAULT_FONT_FAMILY: &'static str = "Arial";
    /// Line box height as a multiple of the font size.
    pub const LINE_HEIGHT: f64 = 1.16;
    /// Average glyph advance as a multiple of the font size.
    const CHAR_WIDTH: f64 = 0.6;

    /// Create a new text shape.
    pub fn new(position: Point, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            placement: Placement::at(position),
            content: content.into(),
            font_family: Self::DEFAULT_FONT_FAMILY.to_string(),
            font_size: Self::DEFAULT_FONT_SIZE,
            font_weight: FontWeight::default(),
            font_style: FontStyle::default(),
            text_align: TextAlign::default(),
            style: ShapeStyle::default(),
        }
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size.max(1.0);
        self
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }

    pub(crate) fn apply_font_patch(&mut self, patch: &PropertyPatch) {
        if let Some(size) = patch.font_size {
            self.font_size = size.max(1.0);
        }
        if let Some(family) = &patch.font_family {
            self.font_family.clone_from(family);
        }
        if let Some(weight) = patch.font_weight {
            self.font_weight = weight;
        }
        if let Some(style) = patch.font_style {
            self.font_style = style;
        }
        if let Some(align) = patch.text_align {
            self.text_align = align;
        }
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> ObjectId {
        self.id
    }

    /// Approximate layout box; no font metrics are available here.
    fn local_size(&self) -> Size {
        let longest = self.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        let line_count = self.lines().count().max(1);
        Size::new(
            longest as f64 * self.font_size * Self::CHAR_WIDTH,
            line_count as f64 * self.font_size * Self::LINE_HEIGHT,
        )
    }

    fn local_path(&self) -> BezPath {
        Rect::from_origin_size(Point::ZERO, self.local_size()).to_path(0.1)
    }

    fn placement(&self) -> &Placement {
        &self.placement
    }

    fn placement_mut(&mut self) -> &mut Placement {
        &mut self.placement
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }
}
