//! Image shape for embedding raster images.

use super::{ObjectId, Placement, ShapeStyle, ShapeTrait};
use base64::{Engine, engine::general_purpose::STANDARD};
use image::GenericImageView;
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Image format for stored image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }

        None
    }
}

/// Errors raised while turning uploaded bytes into an image object.
#[derive(Debug, Error)]
pub enum ImageDecodeError {
    #[error("Unrecognized image format")]
    UnknownFormat,
    #[error("Image has zero width or height")]
    Empty,
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// A raster image placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub(crate) id: ObjectId,
    pub placement: Placement,
    /// Intrinsic width in pixels.
    pub source_width: u32,
    /// Intrinsic height in pixels.
    pub source_height: u32,
    pub format: ImageFormat,
    /// Encoded source bytes, base64 so snapshots stay plain JSON.
    pub data_base64: String,
    /// Stroke draws an optional border; fill is unused.
    pub style: ShapeStyle,
}

impl Image {
    /// Decode `data` to learn its format and intrinsic size.
    pub fn decode(position: Point, data: &[u8]) -> Result<Self, ImageDecodeError> {
        let format = ImageFormat::from_magic_bytes(data).ok_or(ImageDecodeError::UnknownFormat)?;
        let decoded = image::load_from_memory(data)?;
        let (width, height) = decoded.dimensions();
        if width == 0 || height == 0 {
            return Err(ImageDecodeError::Empty);
        }
        Ok(Self::from_parts(position, data.to_vec(), format, width, height))
    }

    /// Build from already-known metadata without decoding.
    pub fn from_parts(
        position: Point,
        data: Vec<u8>,
        format: ImageFormat,
        source_width: u32,
        source_height: u32,
    ) -> Self {
        let mut style = ShapeStyle::default();
        style.fill_color = None;
        style.set_stroke_width(0.0);
        Self {
            id: Uuid::new_v4(),
            placement: Placement::at(position),
            source_width,
            source_height,
            format,
            data_base64: STANDARD.encode(data),
            style,
        }
    }

    /// Uniformly scale down so neither side exceeds `max_dimension`.
    /// Images already within the limit keep a scale of 1.
    pub fn fit_within(mut self, max_dimension: f64) -> Self {
        let largest = f64::from(self.source_width.max(self.source_height));
        if largest > max_dimension && largest > 0.0 {
            let scale = max_dimension / largest;
            self.placement.scale_x = scale;
            self.placement.scale_y = scale;
        }
        self
    }

    /// Get the raw image data (decoded from base64).
    pub fn data(&self) -> Option<Vec<u8>> {
        STANDARD.decode(&self.data_base64).ok()
    }

    /// `data:` URI suitable for an SVG `href`.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.format.mime_type(), self.data_base64)
    }
}

impl ShapeTrait for Image {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn local_size(&self) -> Size {
        Size::new(f64::from(self.source_width), f64::from(self.source_height))
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
