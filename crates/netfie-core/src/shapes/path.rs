//! Path shape: SVG path data or free-draw strokes.

use super::{ObjectId, Placement, ShapeStyle, ShapeTrait};
use kurbo::{Affine, BezPath, Point, Shape as KurboShape, Size, SvgParseError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A freeform path.
///
/// The stored geometry is normalized so that its bounding box starts at the
/// local origin; `placement.position` is where that corner lands on the
/// canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub(crate) id: ObjectId,
    pub placement: Placement,
    pub path: BezPath,
    pub style: ShapeStyle,
}

impl Path {
    /// Parse SVG path data (`M 0,0 L 10,10 z`). The path is placed at the origin.
    pub fn from_svg(data: &str) -> Result<Self, SvgParseError> {
        let path = BezPath::from_svg(data)?;
        let (path, _) = normalize(path);
        Ok(Self::from_normalized(path, Point::ZERO))
    }

    /// Build an open polyline stroke from pointer samples in world coordinates.
    pub fn from_points(points: &[Point]) -> Self {
        let mut path = BezPath::new();
        if let Some((first, rest)) = points.split_first() {
            path.move_to(*first);
            if rest.is_empty() {
                // A single tap still leaves a dot.
                path.line_to(*first);
            }
            for point in rest {
                path.line_to(*point);
            }
        }
        let (path, origin) = normalize(path);
        Self::from_normalized(path, origin)
    }

    fn from_normalized(path: BezPath, position: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            placement: Placement::at(position),
            path,
            style: ShapeStyle::default(),
        }
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.placement.position = position;
        self
    }

    pub fn with_scale(mut self, scale_x: f64, scale_y: f64) -> Self {
        self.placement.scale_x = scale_x;
        self.placement.scale_y = scale_y;
        self
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    /// SVG path data of the local geometry.
    pub fn svg_data(&self) -> String {
        self.path.to_svg()
    }
}

/// Shift `path` so its bounding box starts at the origin; returns the old corner.
fn normalize(mut path: BezPath) -> (BezPath, Point) {
    if path.elements().is_empty() {
        return (path, Point::ZERO);
    }
    let origin = path.bounding_box().origin();
    path.apply_affine(Affine::translate(-origin.to_vec2()));
    (path, origin)
}

/// Ramer-Douglas-Peucker simplification of a pointer trail.
pub fn simplify_points(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    // Find point with maximum distance from line between first and last
    let first = points[0];
    let last = points[points.len() - 1];

    let mut max_dist = 0.0;
    let mut max_index = 0;

    for (i, point) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let dist = perpendicular_distance(*point, first, last);
        if dist > max_dist {
            max_dist = dist;
            max_index = i;
        }
    }

    if max_dist > tolerance {
        let mut left = simplify_points(&points[..=max_index], tolerance);
        let right = simplify_points(&points[max_index..], tolerance);

        // Junction point appears in both halves.
        left.pop();
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

fn perpendicular_distance(point: Point, line_start: Point, line_end: Point) -> f64 {
    let dx = line_end.x - line_start.x;
    let dy = line_end.y - line_start.y;

    let line_len_sq = dx * dx + dy * dy;
    if line_len_sq < f64::EPSILON {
        return point.distance(line_start);
    }

    let area2 = ((point.x - line_start.x) * dy - (point.y - line_start.y) * dx).abs();
    area2 / line_len_sq.sqrt()
}

impl ShapeTrait for Path {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn local_size(&self) -> Size {
        if self.path.elements().is_empty() {
            return Size::ZERO;
        }
        self.path.bounding_box().size()
    }

    fn local_path(&self) -> BezPath {
        self.path.clone()
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_svg_is_normalized() {
        let path = Path::from_svg("M 10,20 L 110,20 L 110,70 z").unwrap();
        let size = path.local_size();
        assert!((size.width - 100.0).abs() < 1e-9);
        assert!((size.height - 50.0).abs() < 1e-9);
        assert_eq!(path.placement.position, Point::ZERO);
        assert!(path.path.bounding_box().origin().distance(Point::ZERO) < 1e-9);
    }

    #[test]
    fn test_from_points_keeps_world_position() {
        let stroke = Path::from_points(&[
            Point::new(30.0, 40.0),
            Point::new(60.0, 45.0),
            Point::new(50.0, 90.0),
        ]);
        let bounds = stroke.bounds();
        assert!((bounds.x0 - 30.0).abs() < 1e-9);
        assert!((bounds.y0 - 40.0).abs() < 1e-9);
        assert!((bounds.x1 - 60.0).abs() < 1e-9);
        assert!((bounds.y1 - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_point_stroke_is_a_dot() {
        let dot = Path::from_points(&[Point::new(5.0, 5.0)]);
        assert_eq!(dot.path.elements().len(), 2);
        assert_eq!(dot.placement.position, Point::new(5.0, 5.0));
    }

    #[test]
    fn test_invalid_svg() {
        assert!(Path::from_svg("M 10 Q").is_err());
    }

    #[test]
    fn test_simplify_collinear() {
        let points: Vec<Point> = (0..10).map(|i| Point::new(i as f64, 0.0)).collect();
        let simplified = simplify_points(&points, 0.5);
        assert_eq!(simplified, vec![Point::new(0.0, 0.0), Point::new(9.0, 0.0)]);
    }

    #[test]
    fn test_simplify_keeps_corners() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(10.0, 10.0),
        ];
        let simplified = simplify_points(&points, 0.5);
        assert_eq!(
            simplified,
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)]
        );
    }
}
