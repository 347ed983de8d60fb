//! Built-in vector shapes offered by the shape library.

use super::{Path, ShapeStyle};
use kurbo::{Point, SvgParseError};
use serde::{Deserialize, Serialize};

/// A predefined outline from the shape library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapePreset {
    Heart,
    Star,
    ArrowRight,
    ArrowLeft,
    ArrowUp,
    ArrowDown,
    SpeechBubble,
}

impl ShapePreset {
    /// Every preset in library order.
    pub const ALL: [ShapePreset; 7] = [
        ShapePreset::Heart,
        ShapePreset::Star,
        ShapePreset::ArrowRight,
        ShapePreset::ArrowLeft,
        ShapePreset::ArrowUp,
        ShapePreset::ArrowDown,
        ShapePreset::SpeechBubble,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShapePreset::Heart => "heart",
            ShapePreset::Star => "star",
            ShapePreset::ArrowRight => "arrow_right",
            ShapePreset::ArrowLeft => "arrow_left",
            ShapePreset::ArrowUp => "arrow_up",
            ShapePreset::ArrowDown => "arrow_down",
            ShapePreset::SpeechBubble => "speech_bubble",
        }
    }

    /// SVG path data of the outline.
    pub fn path_data(&self) -> &'static str {
        match self {
            ShapePreset::Heart => concat!(
                "M 272.70141,238.71731 ",
                "C 206.46141,238.71731 152.70146,292.4773 152.70146,358.71731 ",
                "C 152.70146,493.47282 288.63461,528.80461 381.26391,662.02535 ",
                "C 468.83815,529.62199 609.82641,489.17075 609.82641,358.71731 ",
                "C 609.82641,292.47731 556.06651,238.7173 489.82641,238.71731 ",
                "C 441.77851,238.71731 400.42481,267.08774 381.26391,307.90481 ",
                "C 362.10311,267.08773 320.74941,238.7173 272.70141,238.71731 z"
            ),
            ShapePreset::Star => {
                "M 250,500 L 396,643 L 342,463 L 488,348 L 304,348 L 250,163 \
                 L 196,348 L 12,348 L 158,463 L 104,643 z"
            }
            ShapePreset::ArrowRight => {
                "M 0,50 L 100,50 L 100,25 L 150,75 L 100,125 L 100,100 L 0,100 z"
            }
            ShapePreset::ArrowLeft => {
                "M 150,50 L 50,50 L 50,25 L 0,75 L 50,125 L 50,100 L 150,100 z"
            }
            ShapePreset::ArrowUp => {
                "M 75,0 L 25,50 L 50,50 L 50,150 L 100,150 L 100,50 L 125,50 z"
            }
            ShapePreset::ArrowDown => {
                "M 75,150 L 125,100 L 100,100 L 100,0 L 50,0 L 50,100 L 25,100 z"
            }
            ShapePreset::SpeechBubble => {
                "M 75,0 A 75 75 0 1 0 75,150 A 75 75 0 1 0 75,0 z \
                 M 75,150 L 45,180 L 60,150"
            }
        }
    }

    /// Uniform scale applied when the preset is placed.
    pub fn scale(&self) -> f64 {
        match self {
            ShapePreset::Heart => 0.1,
            ShapePreset::Star => 0.2,
            ShapePreset::ArrowRight
            | ShapePreset::ArrowLeft
            | ShapePreset::ArrowUp
            | ShapePreset::ArrowDown
            | ShapePreset::SpeechBubble => 0.5,
        }
    }

    /// Build the outline as a scaled path at `position`.
    pub fn build(&self, position: Point, style: ShapeStyle) -> Result<Path, SvgParseError> {
        let scale = self.scale();
        Ok(Path::from_svg(self.path_data())?
            .with_position(position)
            .with_scale(scale, scale)
            .with_style(style))
    }
}

impl std::str::FromStr for ShapePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name() == s)
            .ok_or_else(|| format!("unknown shape preset '{s}'"))
    }
}
