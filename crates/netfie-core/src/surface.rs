//! Rendering surface abstraction.
//!
//! The session never draws by itself: it hands a [`RenderContext`] to an
//! injected [`RenderSurface`] after every change and asks the same surface to
//! rasterize the scene on export.

use crate::scene::Scene;
use crate::shapes::{ObjectId, SerializableColor};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Surface errors.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Encoding failed: {0}")]
    EncodeFailed(String),
    #[error("Invalid raster size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("Surface does not support {0}")]
    Unsupported(&'static str),
}

/// Encoded raster formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterFormat {
    #[default]
    Png,
    Jpeg,
}

impl RasterFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            RasterFormat::Png => "image/png",
            RasterFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            RasterFormat::Png => "png",
            RasterFormat::Jpeg => "jpg",
        }
    }
}

impl std::str::FromStr for RasterFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(RasterFormat::Png),
            "jpg" | "jpeg" => Ok(RasterFormat::Jpeg),
            other => Err(format!("unsupported raster format '{other}'")),
        }
    }
}

/// Rasterization parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    pub format: RasterFormat,
    /// Output pixels per scene unit.
    pub scale: f32,
    /// Lossy quality, 1..=100. Ignored by PNG.
    pub quality: u8,
}

impl RasterOptions {
    /// 1x scale at maximum quality.
    pub fn new(format: RasterFormat) -> Self {
        Self {
            format,
            scale: 1.0,
            quality: 100,
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    /// Output size in pixels for `scene`.
    pub fn pixel_size(&self, scene: &Scene) -> Result<(u32, u32), SurfaceError> {
        let width = (scene.width() as f32 * self.scale).round();
        let height = (scene.height() as f32 * self.scale).round();
        if !(width >= 1.0 && height >= 1.0) || width > u32::MAX as f32 || height > u32::MAX as f32 {
            return Err(SurfaceError::InvalidSize {
                width: width as u32,
                height: height as u32,
            });
        }
        Ok((width as u32, height as u32))
    }
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self::new(RasterFormat::Png)
    }
}

/// Context for a single render pass.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub scene: &'a Scene,
    /// Selected object, drawn with a highlight outline.
    pub selection: Option<ObjectId>,
    /// View zoom; 1.0 is 100%.
    pub zoom: f64,
    pub selection_color: SerializableColor,
}

impl<'a> RenderContext<'a> {
    pub fn new(scene: &'a Scene) -> Self {
        Self {
            scene,
            selection: None,
            zoom: 1.0,
            selection_color: SerializableColor::rgb(59, 130, 246),
        }
    }

    pub fn with_selection(mut self, selection: Option<ObjectId>) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_selection_color(mut self, color: SerializableColor) -> Self {
        self.selection_color = color;
        self
    }
}

/// A drawing backend the session renders through.
pub trait RenderSurface {
    /// Match the surface to new scene dimensions.
    fn resize(&mut self, width: u32, height: u32);

    /// Redraw the interactive view.
    fn render(&mut self, ctx: &RenderContext<'_>) -> Result<(), SurfaceError>;

    /// Encode `scene` as a standalone raster. Selection and zoom never apply.
    fn rasterize(&mut self, scene: &Scene, options: &RasterOptions) -> Result<Vec<u8>, SurfaceError>;
}

/// Surface that draws nothing. Useful for headless sessions and tests.
#[derive(Debug, Clone, Default)]
pub struct NullSurface {
    width: u32,
    height: u32,
    renders: usize,
}

impl NullSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of render passes received.
    pub fn renders(&self) -> usize {
        self.renders
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl RenderSurface for NullSurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn render(&mut self, _ctx: &RenderContext<'_>) -> Result<(), SurfaceError> {
        self.renders += 1;
        Ok(())
    }

    fn rasterize(&mut self, _scene: &Scene, _options: &RasterOptions) -> Result<Vec<u8>, SurfaceError> {
        Err(SurfaceError::Unsupported("rasterization"))
    }
}
