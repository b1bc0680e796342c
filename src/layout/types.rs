use crate::label::MathLabel;
use crate::space::SpaceType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxKind {
    /// A robot's own state space, drawn solid.
    Space,
    /// A robot of the row below that no robot of this row simplifies; only
    /// its dashed outline is carried up.
    EmptyProjection,
}

/// Link from a box to the box it projects from in the row below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    pub bundle_id: u32,
    pub bundle_space: SpaceType,
    pub fiber: SpaceType,
}

#[derive(Debug, Clone)]
pub struct SpaceLayout {
    pub id: u32,
    pub space: SpaceType,
    pub kind: BoxKind,
    /// Index of the `<level>` in document order.
    pub level: usize,
    /// Row counted from the bottom of the diagram.
    pub row: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub projection: Option<Projection>,
}

impl SpaceLayout {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Space,
    Projection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stroke {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Fill>,
        stroke: Option<Stroke>,
    },
    Polygon {
        points: Vec<(f32, f32)>,
        fill: Fill,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub from: (f32, f32),
    pub to: (f32, f32),
    pub stroke: Stroke,
}

/// Left-aligned label; `y` is the text baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub x: f32,
    pub y: f32,
    pub label: MathLabel,
}

/// Drawing primitives in y-up diagram units. Patches paint first, then
/// lines, then text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub patches: Vec<Patch>,
    pub lines: Vec<Line>,
    pub texts: Vec<TextItem>,
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub spaces: Vec<SpaceLayout>,
    pub scene: Scene,
    pub rows: usize,
    pub row_step: f32,
    pub row_height: f32,
    pub width: f32,
    pub height: f32,
}
