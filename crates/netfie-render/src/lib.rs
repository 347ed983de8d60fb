//! Netfie Render Library
//!
//! SVG rendering surface for the Netfie editing session. The interactive
//! view and raster exports are both produced from an SVG document of the
//! scene; exports are rasterized with resvg and encoded as PNG or JPEG.

mod raster;
mod surface;
pub mod svg;

pub use raster::{encode_jpeg, encode_png, rasterize_svg};
pub use surface::SvgSurface;
pub use svg::{escape_xml, scene_to_svg, view_to_svg};
