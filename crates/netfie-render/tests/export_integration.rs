//! Integration tests for raster export through an editing session.

use netfie_core::{
    EditorSession, RasterFormat, RasterOptions, RenderSurface, SerializableColor, SessionConfig,
    ShapePreset,
};
use netfie_render::SvgSurface;
use std::sync::Arc;
use usvg::fontdb;

fn surface() -> SvgSurface {
    SvgSurface::with_fonts(Arc::new(fontdb::Database::new()))
}

fn session(width: u32, height: u32) -> EditorSession<SvgSurface> {
    let config = SessionConfig::default().with_size(width, height);
    EditorSession::new(config, surface())
}

fn decode_rgba(bytes: &[u8]) -> image::RgbaImage {
    image::load_from_memory(bytes).expect("decodable raster").to_rgba8()
}

// ==========================================================================
// PNG
// ==========================================================================

#[test]
fn test_png_matches_scene_dimensions() {
    let mut session = session(320, 240);
    session.add_rectangle();
    let png = session.export_raster(RasterFormat::Png).expect("export");

    assert_eq!(&png[0..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    assert_eq!(decode_rgba(&png).dimensions(), (320, 240));
}

#[test]
fn test_png_paints_objects_and_background() {
    let mut session = session(320, 240);
    session.add_rectangle();
    let png = session.export_raster(RasterFormat::Png).expect("export");
    let img = decode_rgba(&png);

    // Default rectangle spans 100..200 on both axes.
    assert_eq!(img.get_pixel(150, 150).0, [0x43, 0x38, 0xca, 255]);
    assert_eq!(img.get_pixel(10, 10).0, [255, 255, 255, 255]);
}

#[test]
fn test_export_ignores_selection_and_zoom() {
    let mut session = session(320, 240);
    session.add_rectangle();
    let selected = session.export_raster(RasterFormat::Png).expect("export");

    session.clear_selection();
    session.set_zoom(200);
    let plain = session.export_raster(RasterFormat::Png).expect("export");
    assert_eq!(selected, plain);
}

#[test]
fn test_scaled_export() {
    let mut session = session(200, 100);
    session.add_preset(ShapePreset::Star).expect("star parses");
    let options = RasterOptions::new(RasterFormat::Png).with_scale(0.5);
    let png = session.export_with(&options).expect("export");
    assert_eq!(decode_rgba(&png).dimensions(), (100, 50));
}

#[test]
fn test_hidden_and_removed_objects_not_exported() {
    let mut session = session(320, 240);
    let empty = session.export_raster(RasterFormat::Png).expect("export");

    let id = session.add_circle();
    assert!(session.remove_object(id));
    let after = session.export_raster(RasterFormat::Png).expect("export");
    assert_eq!(empty, after);
}

// ==========================================================================
// JPEG
// ==========================================================================

#[test]
fn test_jpeg_export_decodes() {
    let config = SessionConfig::default()
        .with_size(160, 120)
        .with_background(SerializableColor::rgb(200, 50, 50));
    let mut session = EditorSession::new(config, surface());
    let jpeg = session.export_raster(RasterFormat::Jpeg).expect("export");

    assert_eq!(&jpeg[0..3], &[0xFF, 0xD8, 0xFF]);
    let img = image::load_from_memory(&jpeg).expect("jpeg").to_rgb8();
    assert_eq!(img.dimensions(), (160, 120));
    let [r, g, b] = img.get_pixel(80, 60).0;
    assert!(r > 180 && g < 80 && b < 80, "unexpected colour {r},{g},{b}");
}

// ==========================================================================
// Interactive view
// ==========================================================================

#[test]
fn test_session_renders_view_after_mutation() {
    let mut session = session(320, 240);
    let before = session.surface().renders();
    session.add_rectangle();
    assert!(session.surface().renders() > before);

    let svg = session.surface().svg().expect("rendered view");
    assert!(svg.contains("stroke-dasharray"), "selection outline missing");

    session.set_dimensions(640, 480);
    assert_eq!(session.surface().size(), (640, 480));
}

#[test]
fn test_surface_used_directly() {
    let mut surface = surface();
    let scene = netfie_core::Scene::new(10, 10, SerializableColor::black());
    let png = surface
        .rasterize(&scene, &RasterOptions::default())
        .expect("rasterize");
    assert_eq!(decode_rgba(&png).get_pixel(5, 5).0, [0, 0, 0, 255]);
}
