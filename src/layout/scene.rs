use super::types::{BoxKind, Fill, Line, Patch, Scene, SpaceLayout, Stroke, TextItem};
use crate::config::LayoutConfig;

pub(super) fn build_scene(spaces: &[SpaceLayout], config: &LayoutConfig) -> Scene {
    let mut scene = Scene::default();
    for space in spaces {
        add_space(&mut scene, space, config);
    }
    scene
}

fn add_space(scene: &mut Scene, space: &SpaceLayout, config: &LayoutConfig) {
    let len = space.width;
    let height = space.height;
    let offset = config.label_offset_ratio * len;
    let baseline = space.y + config.label_y_ratio * height;
    let empty = space.kind == BoxKind::EmptyProjection;

    if let Some(projection) = space.projection {
        let full_len = projection.bundle_space.dimension() as f32 * config.column_step;
        let mut x1 = space.x;
        let mut x2 = x1 + len;
        let x3 = x1 + full_len;
        let y1 = space.y;
        let y2 = y1 - (config.row_step - height);
        let mut fiber_len = full_len - len;
        if empty {
            x2 = x1;
            fiber_len = len;
        }

        scene.patches.push(Patch::Rect {
            x: x2,
            y: y1,
            width: fiber_len,
            height,
            fill: None,
            stroke: Some(Stroke::Dashed),
        });

        if fiber_len > 0.0 {
            let ratio = if projection.fiber.is_group_led() {
                config.group_label_x_ratio
            } else {
                config.label_x_ratio
            };
            scene.texts.push(TextItem {
                x: x2 + ratio * fiber_len - offset,
                y: baseline,
                label: projection.fiber.label(),
            });
        }

        if empty {
            x1 = x2;
            x2 = x3;
        }
        for x in [x1, x2] {
            scene.lines.push(Line {
                from: (x, y1),
                to: (x, y2),
                stroke: Stroke::Dashed,
            });
        }
        scene.patches.push(Patch::Polygon {
            points: vec![(x1, y1), (x1, y2), (x2, y2), (x2, y1)],
            fill: Fill::Projection,
        });
    }

    if !empty {
        scene.patches.push(Patch::Rect {
            x: space.x,
            y: space.y,
            width: len,
            height,
            fill: Some(Fill::Space),
            stroke: Some(Stroke::Solid),
        });
        scene.texts.push(TextItem {
            x: space.x + config.label_x_ratio * len - offset,
            y: baseline,
            label: space.space.label(),
        });
    }
}
