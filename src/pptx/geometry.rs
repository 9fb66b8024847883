//! Preset geometry table.
//!
//! Maps DrawingML `prstGeom@prst` names to [`ShapeType`]. Names that are
//! not listed map to a rectangle; the original name is kept on the shape
//! so richer renderers can still use it.

use crate::model::{ArrowDirection, ShapeType};
use phf::phf_map;

use ArrowDirection as Dir;

static PRESET_SHAPES: phf::Map<&'static str, ShapeType> = phf_map! {
    // Basic shapes
    "rect" => ShapeType::Rectangle,
    "roundRect" => ShapeType::RoundedRectangle,
    "round1Rect" => ShapeType::RoundedRectangle,
    "round2SameRect" => ShapeType::RoundedRectangle,
    "round2DiagRect" => ShapeType::RoundedRectangle,
    "snip1Rect" => ShapeType::SnippedRectangle,
    "snip2SameRect" => ShapeType::SnippedRectangle,
    "snip2DiagRect" => ShapeType::SnippedRectangle,
    "snipRoundRect" => ShapeType::SnippedRectangle,
    "ellipse" => ShapeType::Ellipse,
    "triangle" => ShapeType::Triangle,
    "rtTriangle" => ShapeType::RightTriangle,
    "diamond" => ShapeType::Diamond,
    "parallelogram" => ShapeType::Parallelogram,
    "trapezoid" => ShapeType::Trapezoid,
    "pentagon" => ShapeType::Polygon { sides: 5 },
    "hexagon" => ShapeType::Polygon { sides: 6 },
    "heptagon" => ShapeType::Polygon { sides: 7 },
    "octagon" => ShapeType::Polygon { sides: 8 },
    "decagon" => ShapeType::Polygon { sides: 10 },
    "dodecagon" => ShapeType::Polygon { sides: 12 },

    // Lines
    "line" => ShapeType::Line,
    "straightConnector1" => ShapeType::Line,

    // Block arrows
    "rightArrow" => ShapeType::Arrow { direction: Dir::Right },
    "leftArrow" => ShapeType::Arrow { direction: Dir::Left },
    "upArrow" => ShapeType::Arrow { direction: Dir::Up },
    "downArrow" => ShapeType::Arrow { direction: Dir::Down },
    "leftRightArrow" => ShapeType::Arrow { direction: Dir::LeftRight },
    "upDownArrow" => ShapeType::Arrow { direction: Dir::UpDown },
    "quadArrow" => ShapeType::Arrow { direction: Dir::Quad },
    "bentArrow" => ShapeType::Arrow { direction: Dir::Bent },
    "bentUpArrow" => ShapeType::Arrow { direction: Dir::Bent },
    "uturnArrow" => ShapeType::Arrow { direction: Dir::UTurn },
    "curvedRightArrow" => ShapeType::Arrow { direction: Dir::Curved },
    "curvedLeftArrow" => ShapeType::Arrow { direction: Dir::Curved },
    "curvedUpArrow" => ShapeType::Arrow { direction: Dir::Curved },
    "curvedDownArrow" => ShapeType::Arrow { direction: Dir::Curved },
    "circularArrow" => ShapeType::Arrow { direction: Dir::Circular },
    "notchedRightArrow" => ShapeType::Arrow { direction: Dir::Right },
    "stripedRightArrow" => ShapeType::Arrow { direction: Dir::Right },
    "chevron" => ShapeType::Chevron,
    "homePlate" => ShapeType::HomePlate,

    // Stars
    "star4" => ShapeType::Star { points: 4 },
    "star5" => ShapeType::Star { points: 5 },
    "star6" => ShapeType::Star { points: 6 },
    "star7" => ShapeType::Star { points: 7 },
    "star8" => ShapeType::Star { points: 8 },
    "star10" => ShapeType::Star { points: 10 },
    "star12" => ShapeType::Star { points: 12 },
    "star16" => ShapeType::Star { points: 16 },
    "star24" => ShapeType::Star { points: 24 },
    "star32" => ShapeType::Star { points: 32 },

    // Decorative
    "heart" => ShapeType::Heart,
    "cloud" => ShapeType::Cloud,
    "moon" => ShapeType::Moon,
    "sun" => ShapeType::Sun,
    "smileyFace" => ShapeType::SmileyFace,
    "lightningBolt" => ShapeType::LightningBolt,
    "donut" => ShapeType::Donut,
    "noSmoking" => ShapeType::NoSymbol,
    "plus" => ShapeType::Plus,
    "mathPlus" => ShapeType::Plus,
    "cube" => ShapeType::Cube,
    "can" => ShapeType::Can,
    "frame" => ShapeType::Frame,
    "plaque" => ShapeType::Plaque,
    "bevel" => ShapeType::Bevel,
    "foldedCorner" => ShapeType::FoldedCorner,
    "teardrop" => ShapeType::Teardrop,
    "arc" => ShapeType::Arc,
    "pie" => ShapeType::Pie,
    "chord" => ShapeType::Chord,
    "blockArc" => ShapeType::BlockArc,
    "wave" => ShapeType::Wave,
    "doubleWave" => ShapeType::DoubleWave,
    "ribbon" => ShapeType::Ribbon,
    "ribbon2" => ShapeType::Ribbon,

    // Callouts, brackets
    "wedgeRectCallout" => ShapeType::Callout,
    "wedgeRoundRectCallout" => ShapeType::Callout,
    "wedgeEllipseCallout" => ShapeType::Callout,
    "cloudCallout" => ShapeType::Callout,
    "borderCallout1" => ShapeType::Callout,
    "leftBracket" => ShapeType::Bracket,
    "rightBracket" => ShapeType::Bracket,
    "bracketPair" => ShapeType::Bracket,
    "leftBrace" => ShapeType::Brace,
    "rightBrace" => ShapeType::Brace,
    "bracePair" => ShapeType::Brace,
};

/// Shape type for a preset geometry name, falling back to a rectangle.
pub fn shape_type_for_preset(preset: &str) -> ShapeType {
    if let Some(shape) = PRESET_SHAPES.get(preset) {
        return *shape;
    }
    // Whole families share a prefix
    if preset.starts_with("flowChart") {
        ShapeType::Flowchart
    } else if preset.starts_with("actionButton") {
        ShapeType::ActionButton
    } else if preset.starts_with("bentConnector") || preset.starts_with("curvedConnector") {
        ShapeType::Line
    } else {
        ShapeType::Rectangle
    }
}

/// Whether the preset is a straight line or connector.
pub fn is_line_preset(preset: &str) -> bool {
    shape_type_for_preset(preset) == ShapeType::Line
}
