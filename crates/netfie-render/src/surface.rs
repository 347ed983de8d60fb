//! resvg-backed implementation of [`RenderSurface`].

use crate::raster::{encode_jpeg, encode_png, rasterize_svg};
use crate::svg::{scene_to_svg, view_to_svg};
use netfie_core::{RasterFormat, RasterOptions, RenderContext, RenderSurface, Scene, SurfaceError};
use std::sync::Arc;
use usvg::fontdb;

/// Renders the view to an SVG document and rasterizes exports with resvg.
pub struct SvgSurface {
    width: u32,
    height: u32,
    fonts: Arc<fontdb::Database>,
    /// Last rendered view.
    document: Option<String>,
    renders: usize,
}

impl SvgSurface {
    /// Create a surface with the system fonts loaded.
    pub fn new() -> Self {
        let mut fonts = fontdb::Database::new();
        fonts.load_system_fonts();
        log::debug!("Loaded {} font faces", fonts.len());
        Self::with_fonts(Arc::new(fonts))
    }

    /// Create a surface sharing an existing font database.
    pub fn with_fonts(fonts: Arc<fontdb::Database>) -> Self {
        Self {
            width: 0,
            height: 0,
            fonts,
            document: None,
            renders: 0,
        }
    }

    /// The most recently rendered view, if any.
    pub fn svg(&self) -> Option<&str> {
        self.document.as_deref()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn renders(&self) -> usize {
        self.renders
    }

    pub fn fonts(&self) -> &Arc<fontdb::Database> {
        &self.fonts
    }
}

impl Default for SvgSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SvgSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("font_faces", &self.fonts.len())
            .field("renders", &self.renders)
            .finish()
    }
}

impl RenderSurface for SvgSurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn render(&mut self, ctx: &RenderContext<'_>) -> Result<(), SurfaceError> {
        self.document = Some(view_to_svg(ctx));
        self.renders += 1;
        Ok(())
    }

    fn rasterize(&mut self, scene: &Scene, options: &RasterOptions) -> Result<Vec<u8>, SurfaceError> {
        let (width, height) = options.pixel_size(scene)?;
        let svg = scene_to_svg(scene, f64::from(options.scale));
        let pixmap = rasterize_svg(&svg, &self.fonts, width, height)?;

        let bytes = match options.format {
            RasterFormat::Png => encode_png(&pixmap)?,
            RasterFormat::Jpeg => encode_jpeg(&pixmap, scene.background(), options.quality)?,
        };
        log::debug!(
            "Rasterized {}x{} {} ({} bytes)",
            width,
            height,
            options.format.extension(),
            bytes.len()
        );
        Ok(bytes)
    }
}
