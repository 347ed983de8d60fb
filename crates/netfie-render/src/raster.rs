//! SVG rasterization and raster encoding.

use image::ImageEncoder;
use netfie_core::{SerializableColor, SurfaceError};
use std::sync::Arc;
use usvg::fontdb;

/// Parse `svg` and paint it onto a `width` x `height` pixmap.
pub fn rasterize_svg(
    svg: &str,
    fonts: &Arc<fontdb::Database>,
    width: u32,
    height: u32,
) -> Result<tiny_skia::Pixmap, SurfaceError> {
    let mut options = usvg::Options::default();
    options.fontdb = Arc::clone(fonts);
    let tree = usvg::Tree::from_str(svg, &options)
        .map_err(|e| SurfaceError::RenderFailed(format!("SVG parsing failed: {e}")))?;

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or(SurfaceError::InvalidSize { width, height })?;

    // The document is sized in output pixels; stretch if rounding differs.
    let size = tree.size();
    let transform = tiny_skia::Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());
    Ok(pixmap)
}

/// Encode a pixmap as 8-bit RGBA PNG.
pub fn encode_png(pixmap: &tiny_skia::Pixmap) -> Result<Vec<u8>, SurfaceError> {
    // tiny-skia stores premultiplied alpha; PNG wants straight alpha.
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }

    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, pixmap.width(), pixmap.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| SurfaceError::EncodeFailed(format!("PNG header: {e}")))?;
        writer
            .write_image_data(&rgba)
            .map_err(|e| SurfaceError::EncodeFailed(format!("PNG data: {e}")))?;
        writer
            .finish()
            .map_err(|e| SurfaceError::EncodeFailed(format!("PNG finish: {e}")))?;
    }
    Ok(png_data)
}

/// Encode a pixmap as JPEG, compositing any transparency over `background`.
pub fn encode_jpeg(
    pixmap: &tiny_skia::Pixmap,
    background: SerializableColor,
    quality: u8,
) -> Result<Vec<u8>, SurfaceError> {
    let (width, height) = (pixmap.width(), pixmap.height());
    let bg = [background.r, background.g, background.b];
    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for pixel in pixmap.pixels() {
        let inv = 255 - u16::from(pixel.alpha());
        for (channel, bg) in [pixel.red(), pixel.green(), pixel.blue()].into_iter().zip(bg) {
            // Premultiplied source over an opaque background.
            let value = u16::from(channel) + (u16::from(bg) * inv + 127) / 255;
            rgb.push(value.min(255) as u8);
        }
    }

    let mut buf = std::io::Cursor::new(Vec::new());
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
        .write_image(&rgb, width, height, image::ExtendedColorType::Rgb8)
        .map_err(|e| SurfaceError::EncodeFailed(format!("JPEG encoding failed: {e}")))?;
    Ok(buf.into_inner())
}
