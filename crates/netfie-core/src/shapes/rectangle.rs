//! Rectangle shape.

use super::{ObjectId, Placement, ShapeStyle, ShapeTrait};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An axis-aligned rectangle (before rotation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) id: ObjectId,
    pub placement: Placement,
    /// Unscaled width.
    pub width: f64,
    /// Unscaled height.
    pub height: f64,
    pub style: ShapeStyle,
}

impl Rectangle {
    /// Create a new rectangle.
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            placement: Placement::at(position),
            width: width.max(0.0),
            height: height.max(0.0),
            style: ShapeStyle::default(),
        }
    }

    /// Create a rectangle from two corner points.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        let min_x = p1.x.min(p2.x);
        let min_y = p1.y.min(p2.y);
        let width = (p2.x - p1.x).abs();
        let height = (p2.y - p1.y).abs();

        Self::new(Point::new(min_x, min_y), width, height)
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }
}

impl ShapeTrait for Rectangle {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn local_size(&self) -> Size {
        Size::new(self.width, self.height)
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
