//! Scene to SVG conversion.
//!
//! Every object becomes a group carrying its local-to-world matrix, with the
//! geometry written in local coordinates. The output is what the raster
//! pipeline parses, so it only uses features `usvg` understands.

use netfie_core::shapes::{Drawable, Image, SerializableColor, ShapeStyle, Text, TextAlign};
use netfie_core::{ObjectId, RenderContext, Scene};
use std::fmt::Write;

/// Selection outline drawn on top of the interactive view.
#[derive(Debug, Clone, Copy)]
struct Highlight {
    id: ObjectId,
    color: SerializableColor,
    /// Outline width in scene units.
    width: f64,
}

/// Standalone document for export: `scale` output pixels per scene unit.
pub fn scene_to_svg(scene: &Scene, scale: f64) -> String {
    let width = f64::from(scene.width()) * scale;
    let height = f64::from(scene.height()) * scale;
    document(scene, width.round(), height.round(), None)
}

/// Interactive view: zoomed, with the selection outlined.
pub fn view_to_svg(ctx: &RenderContext<'_>) -> String {
    let zoom = if ctx.zoom > 0.0 { ctx.zoom } else { 1.0 };
    let width = f64::from(ctx.scene.width()) * zoom;
    let height = f64::from(ctx.scene.height()) * zoom;
    let highlight = ctx.selection.map(|id| Highlight {
        id,
        color: ctx.selection_color,
        width: 2.0 / zoom,
    });
    document(ctx.scene, width.round(), height.round(), highlight)
}

fn document(scene: &Scene, out_w: f64, out_h: f64, highlight: Option<Highlight>) -> String {
    let mut svg = String::with_capacity(4096);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" \
         width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {} {}\">",
        scene.width(),
        scene.height(),
    );

    let _ = write!(
        svg,
        "<rect width=\"{}\" height=\"{}\"{}/>",
        scene.width(),
        scene.height(),
        paint("fill", Some(scene.background())),
    );

    for object in scene.objects().iter().filter(|o| o.is_visible()) {
        write_object(&mut svg, object);
    }

    if let Some(highlight) = highlight {
        if let Some(bounds) = scene.get(highlight.id).map(Drawable::bounds) {
            let _ = write!(
                svg,
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"none\"{} \
                 stroke-width=\"{}\" stroke-dasharray=\"4 2\"/>",
                bounds.x0,
                bounds.y0,
                bounds.width(),
                bounds.height(),
                paint("stroke", Some(highlight.color)),
                highlight.width,
            );
        }
    }

    svg.push_str("</svg>");
    svg
}

fn write_object(svg: &mut String, object: &Drawable) {
    // Normalize -0 so unrotated objects get a plain matrix.
    let [a, b, c, d, e, f] = object
        .transform()
        .as_coeffs()
        .map(|v| if v == 0.0 { 0.0 } else { v });
    let style = object.style();
    let _ = write!(svg, "<g transform=\"matrix({a} {b} {c} {d} {e} {f})\"");
    if style.opacity() < ShapeStyle::MAX_OPACITY {
        let _ = write!(svg, " opacity=\"{}\"", style.opacity_fraction());
    }
    svg.push('>');

    match object {
        Drawable::Rectangle(rect) => {
            let _ = write!(
                svg,
                "<rect width=\"{}\" height=\"{}\"{}/>",
                rect.width,
                rect.height,
                style_attrs(style),
            );
        }
        Drawable::Circle(circle) => {
            let r = circle.radius;
            let _ = write!(svg, "<circle cx=\"{r}\" cy=\"{r}\" r=\"{r}\"{}/>", style_attrs(style));
        }
        Drawable::Triangle(_) => {
            let _ = write!(
                svg,
                "<path d=\"{}\"{}/>",
                object.local_path().to_svg(),
                style_attrs(style),
            );
        }
        Drawable::Path(path) => {
            let _ = write!(
                svg,
                "<path d=\"{}\"{} stroke-linecap=\"round\" stroke-linejoin=\"round\"/>",
                path.svg_data(),
                style_attrs(style),
            );
        }
        Drawable::Text(text) => write_text(svg, text, object),
        Drawable::Image(image) => write_image(svg, image, style),
    }

    svg.push_str("</g>");
}

fn write_text(svg: &mut String, text: &Text, object: &Drawable) {
    let width = object.local_size().width;
    let (anchor, x) = match text.text_align {
        TextAlign::Left => ("start", 0.0),
        TextAlign::Center => ("middle", width / 2.0),
        TextAlign::Right => ("end", width),
    };
    let _ = write!(
        svg,
        "<text font-family=\"{}\" font-size=\"{}\" font-weight=\"{}\" font-style=\"{}\" \
         text-anchor=\"{anchor}\"{}>",
        escape_xml(&text.font_family),
        text.font_size,
        text.font_weight.css(),
        text.font_style.css(),
        style_attrs(&text.style),
    );
    for (i, line) in text.lines().enumerate() {
        let baseline = text.font_size * (i as f64 * Text::LINE_HEIGHT + 1.0);
        let _ = write!(
            svg,
            "<tspan x=\"{x}\" y=\"{baseline}\">{}</tspan>",
            escape_xml(line)
        );
    }
    svg.push_str("</text>");
}

fn write_image(svg: &mut String, image: &Image, style: &ShapeStyle) {
    let _ = write!(
        svg,
        "<image width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\" xlink:href=\"{}\"/>",
        image.source_width,
        image.source_height,
        image.data_uri(),
    );
    if style.stroke_width() > 0.0 {
        let _ = write!(
            svg,
            "<rect width=\"{}\" height=\"{}\" fill=\"none\"{}{}/>",
            image.source_width,
            image.source_height,
            paint("stroke", Some(style.stroke_color)),
            stroke_width(style),
        );
    }
}

/// Fill and stroke attributes for a style.
fn style_attrs(style: &ShapeStyle) -> String {
    let mut attrs = paint("fill", style.fill_color);
    if style.stroke_width() > 0.0 {
        attrs.push_str(&paint("stroke", Some(style.stroke_color)));
        attrs.push_str(&stroke_width(style));
    } else {
        attrs.push_str(" stroke=\"none\"");
    }
    attrs
}

fn stroke_width(style: &ShapeStyle) -> String {
    format!(" stroke-width=\"{}\"", style.stroke_width())
}

/// ` fill="#rrggbb"` plus `fill-opacity` when translucent, or ` fill="none"`.
fn paint(attr: &str, color: Option<SerializableColor>) -> String {
    match color {
        None => format!(" {attr}=\"none\""),
        Some(c) if c.a == 255 => {
            format!(" {attr}=\"#{:02x}{:02x}{:02x}\"", c.r, c.g, c.b)
        }
        Some(c) => format!(
            " {attr}=\"#{:02x}{:02x}{:02x}\" {attr}-opacity=\"{}\"",
            c.r,
            c.g,
            c.b,
            f64::from(c.a) / 255.0
        ),
    }
}

/// Escape special XML characters.
pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use netfie_core::shapes::{Circle, Path, Rectangle};

    fn scene() -> Scene {
        Scene::new(200, 100, SerializableColor::white())
    }

    #[test]
    fn test_document_frame() {
        let svg = scene_to_svg(&scene(), 2.0);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("width=\"400\" height=\"200\" viewBox=\"0 0 200 100\""));
        assert!(svg.contains("fill=\"#ffffff\""));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_rectangle_and_opacity() {
        let mut scene = scene();
        let mut rect = Rectangle::new(Point::new(10.0, 20.0), 30.0, 40.0);
        rect.style.set_opacity(50);
        scene.add(Drawable::Rectangle(rect));

        let svg = scene_to_svg(&scene, 1.0);
        assert!(svg.contains("matrix(1 0 0 1 10 20)"));
        assert!(svg.contains("opacity=\"0.5\""));
        assert!(svg.contains("<rect width=\"30\" height=\"40\" fill=\"#4338ca\" stroke=\"#000000\" stroke-width=\"1\"/>"));
    }

    #[test]
    fn test_hidden_objects_skipped() {
        let mut scene = scene();
        let mut circle = Circle::new(Point::ZERO, 5.0);
        circle.placement.visible = false;
        scene.add(Drawable::Circle(circle));
        assert!(!scene_to_svg(&scene, 1.0).contains("<circle"));
    }

    #[test]
    fn test_stroke_without_fill() {
        let mut scene = scene();
        let style = ShapeStyle::new(None, SerializableColor::rgb(255, 0, 0), 4.0, 100);
        let stroke = Path::from_points(&[Point::new(0.0, 0.0), Point::new(10.0, 10.0)]).with_style(style);
        scene.add(Drawable::Path(stroke));

        let svg = scene_to_svg(&scene, 1.0);
        assert!(svg.contains("fill=\"none\" stroke=\"#ff0000\" stroke-width=\"4\""));
        assert!(svg.contains("stroke-linecap=\"round\""));
    }

    #[test]
    fn test_text_is_escaped_and_split() {
        let mut scene = scene();
        let mut text = Text::new(Point::ZERO, "a < b\n\"c\" & d");
        text.text_align = TextAlign::Center;
        scene.add(Drawable::Text(text));

        let svg = scene_to_svg(&scene, 1.0);
        assert!(svg.contains("a &lt; b</tspan>"));
        assert!(svg.contains("&quot;c&quot; &amp; d</tspan>"));
        assert!(svg.contains("text-anchor=\"middle\""));
        assert_eq!(svg.matches("<tspan").count(), 2);
    }

    #[test]
    fn test_view_outlines_selection() {
        let mut scene = scene();
        let id = scene.add(Drawable::Rectangle(Rectangle::new(Point::ZERO, 10.0, 10.0)));

        let plain = view_to_svg(&RenderContext::new(&scene));
        assert!(!plain.contains("stroke-dasharray"));

        let ctx = RenderContext::new(&scene).with_selection(Some(id)).with_zoom(2.0);
        let svg = view_to_svg(&ctx);
        assert!(svg.contains("width=\"400\" height=\"200\""));
        assert!(svg.contains("stroke-dasharray"));
        assert!(svg.contains("stroke=\"#3b82f6\""));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("<a href='x'>&</a>"), "&lt;a href=&apos;x&apos;&gt;&amp;&lt;/a&gt;");
    }
}
