//! Triangle shape.

use super::{ObjectId, Placement, ShapeStyle, ShapeTrait};
use kurbo::{BezPath, Point, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An isosceles triangle with its apex at the top centre of its box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub(crate) id: ObjectId,
    pub placement: Placement,
    pub width: f64,
    pub height: f64,
    pub style: ShapeStyle,
}

impl Triangle {
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            placement: Placement::at(position),
            width: width.max(0.0),
            height: height.max(0.0),
            style: ShapeStyle::default(),
        }
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    /// Apex, bottom-right, bottom-left in local coordinates.
    pub fn vertices(&self) -> [Point; 3] {
        [
            Point::new(self.width / 2.0, 0.0),
            Point::new(self.width, self.height),
            Point::new(0.0, self.height),
        ]
    }
}

impl ShapeTrait for Triangle {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn local_size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    fn local_path(&self) -> BezPath {
        let [apex, right, left] = self.vertices();
        let mut path = BezPath::new();
        path.move_to(apex);
        path.line_to(right);
        path.line_to(left);
        path.close_path();
        path
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
