//! Circle shape.

use super::{ObjectId, Placement, ShapeStyle, ShapeTrait};
use kurbo::{BezPath, Circle as KurboCircle, Point, Shape as KurboShape, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A circle positioned by the top-left corner of its bounding square.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub(crate) id: ObjectId,
    pub placement: Placement,
    /// Unscaled radius.
    pub radius: f64,
    pub style: ShapeStyle,
}

impl Circle {
    /// Create a circle whose bounding square starts at `position`.
    pub fn new(position: Point, radius: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            placement: Placement::at(position),
            radius: radius.max(0.0),
            style: ShapeStyle::default(),
        }
    }

    /// Create a circle around a centre point.
    pub fn centered(center: Point, radius: f64) -> Self {
        Self::new(Point::new(center.x - radius, center.y - radius), radius)
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }
}

impl ShapeTrait for Circle {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn local_size(&self) -> Size {
        Size::new(self.radius * 2.0, self.radius * 2.0)
    }

    fn local_path(&self) -> BezPath {
        KurboCircle::new(Point::new(self.radius, self.radius), self.radius).to_path(0.1)
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
