use crate::ir::Hierarchy;
use crate::layout::{BoxKind, Layout};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub levels: usize,
    pub state_dimension: u64,
    pub width: f32,
    pub height: f32,
    pub row_step: f32,
    pub row_height: f32,
    pub spaces: Vec<SpaceDump>,
    pub patches: usize,
    pub lines: usize,
    pub labels: Vec<LabelDump>,
}

#[derive(Debug, Serialize)]
pub struct SpaceDump {
    pub id: u32,
    #[serde(rename = "type")]
    pub space: String,
    pub level: usize,
    pub row: usize,
    pub empty_projection: bool,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub bundle: Option<u32>,
    pub fiber: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LabelDump {
    pub latex: String,
    pub x: f32,
    pub y: f32,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout, hierarchy: &Hierarchy) -> Self {
        let spaces = layout
            .spaces
            .iter()
            .map(|space| SpaceDump {
                id: space.id,
                space: space.space.token(),
                level: space.level,
                row: space.row,
                empty_projection: space.kind == BoxKind::EmptyProjection,
                x: space.x,
                y: space.y,
                width: space.width,
                height: space.height,
                bundle: space.projection.map(|p| p.bundle_id),
                fiber: space.projection.map(|p| p.fiber.token()),
            })
            .collect();

        let labels = layout
            .scene
            .texts
            .iter()
            .map(|text| LabelDump {
                latex: text.label.latex(),
                x: text.x,
                y: text.y,
            })
            .collect();

        LayoutDump {
            levels: layout.rows,
            state_dimension: hierarchy.state_dimension(),
            width: layout.width,
            height: layout.height,
            row_step: layout.row_step,
            row_height: layout.row_height,
            spaces,
            patches: layout.scene.patches.len(),
            lines: layout.scene.lines.len(),
            labels,
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout, hierarchy: &Hierarchy) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, hierarchy);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
