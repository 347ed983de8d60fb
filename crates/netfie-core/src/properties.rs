//! Property panel state and the patches it sends to the selected object.

use crate::shapes::{Drawable, FontStyle, FontWeight, SerializableColor, ShapeStyle, Text, TextAlign};
use std::ops::RangeInclusive;

/// A partial update of object attributes. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyPatch {
    pub fill: Option<SerializableColor>,
    pub stroke: Option<SerializableColor>,
    pub stroke_width: Option<f64>,
    /// Opacity percent, 0..=100.
    pub opacity: Option<u8>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub font_weight: Option<FontWeight>,
    pub font_style: Option<FontStyle>,
    pub text_align: Option<TextAlign>,
}

impl PropertyPatch {
    pub fn with_fill(mut self, color: SerializableColor) -> Self {
        self.fill = Some(color);
        self
    }

    pub fn with_stroke(mut self, color: SerializableColor) -> Self {
        self.stroke = Some(color);
        self
    }

    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = Some(width);
        self
    }

    /// Values above 100 are clamped.
    pub fn with_opacity(mut self, opacity: u8) -> Self {
        self.opacity = Some(opacity.min(ShapeStyle::MAX_OPACITY));
        self
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    pub fn with_font_weight(mut self, weight: FontWeight) -> Self {
        self.font_weight = Some(weight);
        self
    }

    pub fn with_font_style(mut self, style: FontStyle) -> Self {
        self.font_style = Some(style);
        self
    }

    pub fn with_text_align(mut self, align: TextAlign) -> Self {
        self.text_align = Some(align);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Editor controls mirrored as plain state.
///
/// Every setter clamps to the range of its control, so values handed to the
/// session are always in range. [`PropertyPanel::sync_from`] copies the
/// attributes of a newly selected object back into the controls.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyPanel {
    fill_color: SerializableColor,
    stroke_color: SerializableColor,
    stroke_width: f64,
    opacity: u8,
    font_size: f64,
    font_family: String,
    font_weight: FontWeight,
    font_style: FontStyle,
    text_align: TextAlign,
}

impl PropertyPanel {
    pub const STROKE_WIDTH_RANGE: RangeInclusive<f64> = 1.0..=50.0;
    pub const FONT_SIZE_RANGE: RangeInclusive<f64> = 8.0..=100.0;
    pub const MAX_OPACITY: u8 = ShapeStyle::MAX_OPACITY;

    pub fn fill_color(&self) -> SerializableColor {
        self.fill_color
    }

    pub fn set_fill_color(&mut self, color: SerializableColor) {
        self.fill_color = color;
    }

    pub fn stroke_color(&self) -> SerializableColor {
        self.stroke_color
    }

    pub fn set_stroke_color(&mut self, color: SerializableColor) {
        self.stroke_color = color;
    }

    pub fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        self.stroke_width = clamp_range(width, &Self::STROKE_WIDTH_RANGE);
    }

    pub fn opacity(&self) -> u8 {
        self.opacity
    }

    /// Accepts any slider value; anything above 100 becomes 100.
    pub fn set_opacity(&mut self, opacity: u32) {
        self.opacity = opacity.min(u32::from(Self::MAX_OPACITY)) as u8;
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    pub fn set_font_size(&mut self, size: f64) {
        self.font_size = clamp_range(size, &Self::FONT_SIZE_RANGE);
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn set_font_family(&mut self, family: impl Into<String>) {
        self.font_family = family.into();
    }

    pub fn font_weight(&self) -> FontWeight {
        self.font_weight
    }

    pub fn set_font_weight(&mut self, weight: FontWeight) {
        self.font_weight = weight;
    }

    pub fn font_style(&self) -> FontStyle {
        self.font_style
    }

    pub fn set_font_style(&mut self, style: FontStyle) {
        self.font_style = style;
    }

    pub fn text_align(&self) -> TextAlign {
        self.text_align
    }

    pub fn set_text_align(&mut self, align: TextAlign) {
        self.text_align = align;
    }

    /// Style for a newly created shape.
    pub fn style(&self) -> ShapeStyle {
        ShapeStyle::new(
            Some(self.fill_color),
            self.stroke_color,
            self.stroke_width,
            self.opacity,
        )
    }

    /// Style for a newly created text object: a hairline outline.
    pub fn text_style(&self) -> ShapeStyle {
        let mut style = self.style();
        style.set_stroke_width(self.stroke_width / 10.0);
        style
    }

    /// Copy the attributes `object` exposes into the controls.
    ///
    /// Values outside a control's range are clamped in the panel only; the
    /// object keeps its own value until that control is edited.
    pub fn sync_from(&mut self, object: &Drawable) {
        let style = object.style();
        self.opacity = style.opacity();
        self.stroke_color = style.stroke_color;
        self.set_stroke_width(style.stroke_width());
        if object.supports_fill() {
            if let Some(fill) = style.fill_color {
                self.fill_color = fill;
            }
        }
        if let Some(text) = object.as_text() {
            self.set_font_size(text.font_size);
            self.font_family.clone_from(&text.font_family);
            self.font_weight = text.font_weight;
            self.font_style = text.font_style;
            self.text_align = text.text_align;
        }
    }

    /// Patch holding only the controls that differ from `before`.
    pub fn diff(&self, before: &PropertyPanel) -> PropertyPatch {
        fn changed<T: PartialEq + Clone>(now: &T, then: &T) -> Option<T> {
            (now != then).then(|| now.clone())
        }
        PropertyPatch {
            fill: changed(&self.fill_color, &before.fill_color),
            stroke: changed(&self.stroke_color, &before.stroke_color),
            stroke_width: changed(&self.stroke_width, &before.stroke_width),
            opacity: changed(&self.opacity, &before.opacity),
            font_size: changed(&self.font_size, &before.font_size),
            font_family: changed(&self.font_family, &before.font_family),
            font_weight: changed(&self.font_weight, &before.font_weight),
            font_style: changed(&self.font_style, &before.font_style),
            text_align: changed(&self.text_align, &before.text_align),
        }
    }

    /// Every control as a patch.
    pub fn patch(&self) -> PropertyPatch {
        PropertyPatch {
            fill: Some(self.fill_color),
            stroke: Some(self.stroke_color),
            stroke_width: Some(self.stroke_width),
            opacity: Some(self.opacity),
            font_size: Some(self.font_size),
            font_family: Some(self.font_family.clone()),
            font_weight: Some(self.font_weight),
            font_style: Some(self.font_style),
            text_align: Some(self.text_align),
        }
    }
}

impl Default for PropertyPanel {
    fn default() -> Self {
        let style = ShapeStyle::default();
        Self {
            fill_color: style.fill_color.unwrap_or(SerializableColor::black()),
            stroke_color: style.stroke_color,
            stroke_width: style.stroke_width(),
            opacity: style.opacity(),
            font_size: Text::DEFAULT_FONT_SIZE,
            font_family: Text::DEFAULT_FONT_FAMILY.to_string(),
            font_weight: FontWeight::default(),
            font_style: FontStyle::default(),
            text_align: TextAlign::default(),
        }
    }
}

/// Clamp into `range`; NaN falls back to the lower bound.
fn clamp_range(value: f64, range: &RangeInclusive<f64>) -> f64 {
    if value.is_nan() {
        return *range.start();
    }
    value.clamp(*range.start(), *range.end())
}
