//! Drawable objects placed on the editing surface.

mod circle;
mod image;
mod library;
mod path;
mod rectangle;
mod text;
mod triangle;

pub use circle::Circle;
pub use image::{Image, ImageDecodeError, ImageFormat};
pub use library::ShapePreset;
pub use path::{Path, simplify_points};
pub use rectangle::Rectangle;
pub use text::{FontStyle, FontWeight, Text, TextAlign};
pub use triangle::Triangle;

use crate::properties::PropertyPatch;
use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for drawable objects.
pub type ObjectId = Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
                Some(Self::rgb(r * 17, g * 17, b * 17))
            }
            6 => Some(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Some(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Serde adapter storing a [`SerializableColor`] as a hex string.
pub mod hex_color {
    use super::SerializableColor;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(color: &SerializableColor, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&color.to_hex())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<SerializableColor, D::Error> {
        let value = String::deserialize(d)?;
        SerializableColor::from_hex(&value)
            .ok_or_else(|| de::Error::custom(format!("invalid hex color '{value}'")))
    }
}

/// Style properties shared by every drawable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Fill color (None = no fill).
    pub fill_color: Option<SerializableColor>,
    /// Stroke color.
    pub stroke_color: SerializableColor,
    /// Stroke width, never negative.
    stroke_width: f64,
    /// Opacity in percent, 0..=100.
    opacity: u8,
}

impl ShapeStyle {
    pub const MAX_OPACITY: u8 = 100;

    pub fn new(
        fill_color: Option<SerializableColor>,
        stroke_color: SerializableColor,
        stroke_width: f64,
        opacity: u8,
    ) -> Self {
        let mut style = Self {
            fill_color,
            stroke_color,
            stroke_width: 0.0,
            opacity: Self::MAX_OPACITY,
        };
        style.set_stroke_width(stroke_width);
        style.set_opacity(opacity);
        style
    }

    pub fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    /// Negative and non-finite widths collapse to zero.
    pub fn set_stroke_width(&mut self, width: f64) {
        self.stroke_width = if width.is_finite() { width.max(0.0) } else { 0.0 };
    }

    pub fn opacity(&self) -> u8 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: u8) {
        self.opacity = opacity.min(Self::MAX_OPACITY);
    }

    /// Opacity as the 0.0..=1.0 fraction used at render time.
    pub fn opacity_fraction(&self) -> f64 {
        f64::from(self.opacity) / f64::from(Self::MAX_OPACITY)
    }

    /// Clamp fields that may have bypassed the setters (deserialized input).
    pub(crate) fn normalize(&mut self) {
        let width = self.stroke_width;
        self.set_stroke_width(width);
        let opacity = self.opacity;
        self.set_opacity(opacity);
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            fill_color: Some(SerializableColor::rgb(0x43, 0x38, 0xca)),
            stroke_color: SerializableColor::black(),
            stroke_width: 1.0,
            opacity: Self::MAX_OPACITY,
        }
    }
}

/// Position, scale, rotation and visibility of a drawable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Top-left corner of the unrotated object.
    pub position: Point,
    #[serde(default = "unit_scale")]
    pub scale_x: f64,
    #[serde(default = "unit_scale")]
    pub scale_y: f64,
    /// Rotation in degrees, clockwise, around the object centre.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "visible_default")]
    pub visible: bool,
}

fn unit_scale() -> f64 {
    1.0
}

fn visible_default() -> bool {
    true
}

impl Placement {
    pub fn at(position: Point) -> Self {
        Self {
            position,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            visible: true,
        }
    }

    pub fn with_scale(mut self, scale_x: f64, scale_y: f64) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    /// Local-to-world transform for an object of the given unscaled size.
    pub fn affine(&self, local_size: Size) -> Affine {
        let scaled = Size::new(local_size.width * self.scale_x, local_size.height * self.scale_y);
        let pivot = Point::new(scaled.width / 2.0, scaled.height / 2.0);
        Affine::translate(self.position.to_vec2())
            * Affine::rotate_about(self.rotation.to_radians(), pivot)
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::at(Point::ZERO)
    }
}

/// Common trait for all drawable variants.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> ObjectId;

    /// Unscaled size of the geometry in local coordinates.
    fn local_size(&self) -> Size;

    /// Geometry in local coordinates, origin at the top-left corner.
    fn local_path(&self) -> BezPath;

    fn placement(&self) -> &Placement;

    fn placement_mut(&mut self) -> &mut Placement;

    fn style(&self) -> &ShapeStyle;

    fn style_mut(&mut self) -> &mut ShapeStyle;

    /// Local-to-world transform.
    fn transform(&self) -> Affine {
        self.placement().affine(self.local_size())
    }

    /// Axis-aligned bounding box in world coordinates.
    fn bounds(&self) -> Rect {
        let local = Rect::from_origin_size(Point::ZERO, self.local_size());
        self.transform().transform_rect_bbox(local)
    }

    /// Bounding-box hit test, inflated by half the stroke and `tolerance`.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let pad = tolerance + self.style().stroke_width() / 2.0;
        self.bounds().inflate(pad, pad).contains(point)
    }
}

/// A drawable object: the tagged variant stored in a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Drawable {
    Rectangle(Rectangle),
    Circle(Circle),
    Triangle(Triangle),
    Path(Path),
    Text(Text),
    Image(Image),
}

macro_rules! dispatch {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            Drawable::Rectangle($s) => $body,
            Drawable::Circle($s) => $body,
            Drawable::Triangle($s) => $body,
            Drawable::Path($s) => $body,
            Drawable::Text($s) => $body,
            Drawable::Image($s) => $body,
        }
    };
}

impl Drawable {
    pub fn id(&self) -> ObjectId {
        dispatch!(self, s => s.id())
    }

    /// Short lowercase name of the variant.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Drawable::Rectangle(_) => "rectangle",
            Drawable::Circle(_) => "circle",
            Drawable::Triangle(_) => "triangle",
            Drawable::Path(_) => "path",
            Drawable::Text(_) => "text",
            Drawable::Image(_) => "image",
        }
    }

    pub fn bounds(&self) -> Rect {
        dispatch!(self, s => s.bounds())
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        dispatch!(self, s => s.hit_test(point, tolerance))
    }

    pub fn local_size(&self) -> Size {
        dispatch!(self, s => s.local_size())
    }

    pub fn local_path(&self) -> BezPath {
        dispatch!(self, s => s.local_path())
    }

    pub fn transform(&self) -> Affine {
        dispatch!(self, s => s.transform())
    }

    pub fn placement(&self) -> &Placement {
        dispatch!(self, s => s.placement())
    }

    pub fn placement_mut(&mut self) -> &mut Placement {
        dispatch!(self, s => s.placement_mut())
    }

    pub fn style(&self) -> &ShapeStyle {
        dispatch!(self, s => s.style())
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        dispatch!(self, s => s.style_mut())
    }

    pub fn position(&self) -> Point {
        self.placement().position
    }

    pub fn is_visible(&self) -> bool {
        self.placement().visible
    }

    /// Move by a delta in world coordinates.
    pub fn translate(&mut self, delta: Vec2) {
        let placement = self.placement_mut();
        placement.position += delta;
    }

    /// Give the object a fresh identity (used when duplicating).
    pub fn regenerate_id(&mut self) {
        let new_id = Uuid::new_v4();
        dispatch!(self, s => s.id = new_id)
    }

    /// Whether the fill attribute is meaningful for this variant.
    pub fn supports_fill(&self) -> bool {
        !matches!(self, Drawable::Image(_))
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Drawable::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Apply the attributes of `patch` this variant exposes; others are ignored.
    pub fn apply_patch(&mut self, patch: &PropertyPatch) {
        if let Some(opacity) = patch.opacity {
            self.style_mut().set_opacity(opacity);
        }
        if self.supports_fill() {
            if let Some(fill) = patch.fill {
                self.style_mut().fill_color = Some(fill);
            }
        }
        if let Some(stroke) = patch.stroke {
            self.style_mut().stroke_color = stroke;
        }
        if let Some(width) = patch.stroke_width {
            self.style_mut().set_stroke_width(width);
        }
        if let Drawable::Text(text) = self {
            text.apply_font_patch(patch);
        }
    }

    /// Clamp out-of-range values that came in through deserialization.
    pub(crate) fn normalize(&mut self) {
        self.style_mut().normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip_and_short_form() {
        let c = SerializableColor::from_hex("#4338ca").unwrap();
        assert_eq!(c, SerializableColor::rgb(0x43, 0x38, 0xca));
        assert_eq!(c.to_hex(), "#4338ca");
        assert_eq!(SerializableColor::from_hex("#fff"), Some(SerializableColor::white()));
        assert_eq!(
            SerializableColor::from_hex("#00000080").map(|c| c.a),
            Some(0x80)
        );
        assert_eq!(SerializableColor::from_hex("red"), None);
        assert_eq!(SerializableColor::from_hex("#12345"), None);
    }

    #[test]
    fn test_style_clamps() {
        let mut style = ShapeStyle::new(None, SerializableColor::black(), -4.0, 150);
        assert_eq!(style.stroke_width(), 0.0);
        assert_eq!(style.opacity(), 100);
        style.set_opacity(40);
        assert!((style.opacity_fraction() - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_placement_bounds_with_scale_and_rotation() {
        let rect = Rectangle::new(Point::new(100.0, 100.0), 100.0, 50.0);
        let mut shape = Drawable::Rectangle(rect);
        shape.placement_mut().scale_x = 2.0;
        let bounds = shape.bounds();
        assert!((bounds.width() - 200.0).abs() < 1e-9);
        assert!((bounds.height() - 50.0).abs() < 1e-9);

        shape.placement_mut().rotation = 90.0;
        let rotated = shape.bounds();
        assert!((rotated.width() - 50.0).abs() < 1e-9);
        assert!((rotated.height() - 200.0).abs() < 1e-9);
        // Rotation pivots on the centre, so the centre does not move.
        assert!((rotated.center().x - bounds.center().x).abs() < 1e-9);
        assert!((rotated.center().y - bounds.center().y).abs() < 1e-9);
    }

    #[test]
    fn test_patch_is_gated_by_variant() {
        let mut image = Drawable::Image(Image::from_parts(
            Point::ZERO,
            vec![0u8; 4],
            ImageFormat::Png,
            10,
            10,
        ));
        let fill = SerializableColor::rgb(1, 2, 3);
        let patch = PropertyPatch::default().with_fill(fill).with_opacity(50);
        image.apply_patch(&patch);
        assert_eq!(image.style().fill_color, None);
        assert_eq!(image.style().opacity(), 50);

        let mut rect = Drawable::Rectangle(Rectangle::new(Point::ZERO, 10.0, 10.0));
        rect.apply_patch(&patch.clone().with_font_size(48.0));
        assert_eq!(rect.style().fill_color, Some(fill));
        assert!(rect.as_text().is_none());
    }

    #[test]
    fn test_regenerate_id() {
        let mut shape = Drawable::Circle(Circle::new(Point::ZERO, 5.0));
        let before = shape.id();
        shape.regenerate_id();
        assert_ne!(before, shape.id());
    }
}
