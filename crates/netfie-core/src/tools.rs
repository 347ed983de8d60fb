//! Tool modes and pointer-stroke collection.

use crate::properties::PropertyPanel;
use crate::shapes::SerializableColor;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Pick and transform objects. Pointer input does not draw.
    #[default]
    Select,
    /// Paint strokes with the fill colour.
    FreeDraw,
    /// Paint strokes with the background colour.
    Erase,
}

impl ToolKind {
    /// Whether pointer drags produce strokes.
    pub fn draws(&self) -> bool {
        matches!(self, ToolKind::FreeDraw | ToolKind::Erase)
    }
}

/// State of a tool interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ToolState {
    #[default]
    Idle,
    /// A stroke is in progress.
    Active { start: Point, current: Point },
}

/// Colour and width of a drawing stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub color: SerializableColor,
    pub width: f64,
}

impl Brush {
    /// Brush for `tool` from the panel settings, or `None` for non-drawing tools.
    ///
    /// Erasing paints over content with the background colour at twice the
    /// stroke width; underlying objects are not modified.
    pub fn for_tool(
        tool: ToolKind,
        panel: &PropertyPanel,
        background: SerializableColor,
    ) -> Option<Self> {
        match tool {
            ToolKind::Select => None,
            ToolKind::FreeDraw => Some(Self {
                color: panel.fill_color(),
                width: panel.stroke_width(),
            }),
            ToolKind::Erase => Some(Self {
                color: background,
                width: panel.stroke_width() * 2.0,
            }),
        }
    }
}

/// Manages the current tool and its in-progress stroke.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    current_tool: ToolKind,
    state: ToolState,
    points: Vec<Point>,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_tool(&self) -> ToolKind {
        self.current_tool
    }

    pub fn state(&self) -> &ToolState {
        &self.state
    }

    /// Switch tool. Any stroke in progress is discarded.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.cancel();
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, ToolState::Active { .. })
    }

    /// Begin a stroke. Ignored by non-drawing tools.
    pub fn begin(&mut self, point: Point) {
        if !self.current_tool.draws() {
            return;
        }
        self.points.clear();
        self.points.push(point);
        self.state = ToolState::Active {
            start: point,
            current: point,
        };
    }

    /// Extend the stroke in progress.
    pub fn update(&mut self, point: Point) {
        if let ToolState::Active { current, .. } = &mut self.state {
            *current = point;
            if self.points.last() != Some(&point) {
                self.points.push(point);
            }
        }
    }

    /// Finish the stroke and hand back its samples.
    pub fn end(&mut self, point: Point) -> Option<Vec<Point>> {
        if !self.is_active() {
            return None;
        }
        self.update(point);
        self.state = ToolState::Idle;
        Some(std::mem::take(&mut self.points))
    }

    pub fn cancel(&mut self) {
        self.state = ToolState::Idle;
        self.points.clear();
    }

    /// Samples of the stroke in progress.
    pub fn points(&self) -> &[Point] {
        &self.points
    }
}
