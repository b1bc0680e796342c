mod scene;
pub(crate) mod types;
pub use types::*;
use scene::build_scene;

use crate::config::LayoutConfig;
use crate::ir::{Hierarchy, Level};
use crate::space::{FiberError, infer_fiber};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("hierarchy has no levels")]
    Empty,
    #[error(
        "robot {id} in level {level} simplifies robot {simplification_of}, which is not in the level below"
    )]
    UnknownSimplification {
        id: u32,
        simplification_of: u32,
        level: usize,
    },
    #[error("robot {id} in level {level}: {source}")]
    Fiber {
        id: u32,
        level: usize,
        #[source]
        source: FiberError,
    },
}

/// Stacks one row per level, finest level at the bottom, and builds the
/// scene for the whole diagram.
pub fn compute_layout(hierarchy: &Hierarchy, config: &LayoutConfig) -> Result<Layout, LayoutError> {
    if hierarchy.levels.is_empty() {
        return Err(LayoutError::Empty);
    }
    let row_height = config.row_height();
    let mut spaces: Vec<SpaceLayout> = Vec::new();
    let mut below: Vec<SpaceLayout> = Vec::new();
    let mut width = 0.0f32;

    for (row, (level_idx, level)) in hierarchy.levels.iter().enumerate().rev().enumerate() {
        let y = row as f32 * config.row_step;
        let (current, cursor) = place_row(level, level_idx, row, y, &below, config)?;

        width = current.iter().map(SpaceLayout::right).fold(width.max(cursor), f32::max);
        for space in &current {
            tracing::info!(
                level = level_idx,
                id = space.id,
                space = %space.space.label().plain(),
                simplification_of = ?space.projection.map(|p| p.bundle_id),
                "added space"
            );
        }
        spaces.extend(current.iter().cloned());
        below = current;
    }

    let rows = hierarchy.levels.len();
    let height = (rows - 1) as f32 * config.row_step + row_height;
    let scene = build_scene(&spaces, config);
    Ok(Layout {
        spaces,
        scene,
        rows,
        row_step: config.row_step,
        row_height,
        width,
        height,
    })
}

/// Places the robots of one level, then carries up every box of the row
/// below that nothing in this level simplifies. Only robot boxes can be
/// simplified; empty projections share ids with real robots and are always
/// carried. Returns the row and the final x cursor.
fn place_row(
    level: &Level,
    level_idx: usize,
    row: usize,
    y: f32,
    below: &[SpaceLayout],
    config: &LayoutConfig,
) -> Result<(Vec<SpaceLayout>, f32), LayoutError> {
    let height = config.row_height();
    let mut current = Vec::with_capacity(level.robots.len());
    let mut cursor = 0.0f32;

    for robot in &level.robots {
        let width = robot.space.dimension() as f32 * config.column_step;
        let mut space = SpaceLayout {
            id: robot.id,
            space: robot.space,
            kind: BoxKind::Space,
            level: level_idx,
            row,
            x: cursor,
            y,
            width,
            height,
            projection: None,
        };
        if let Some(bundle_id) = robot.simplification_of {
            let bundle = below
                .iter()
                .find(|b| b.kind == BoxKind::Space && b.id == bundle_id)
                .ok_or(
                LayoutError::UnknownSimplification {
                    id: robot.id,
                    simplification_of: bundle_id,
                    level: level_idx,
                },
            )?;
            let fiber =
                infer_fiber(robot.space, bundle.space).map_err(|source| LayoutError::Fiber {
                    id: robot.id,
                    level: level_idx,
                    source,
                })?;
            space.x = bundle.x;
            space.projection = Some(Projection {
                bundle_id,
                bundle_space: bundle.space,
                fiber,
            });
        }
        // The cursor advances from itself, not from a snapped x.
        cursor += width;
        current.push(space);
    }

    for bundle in below {
        if bundle.kind == BoxKind::Space && level.simplifies(bundle.id) {
            continue;
        }
        tracing::info!(id = bundle.id, level = level_idx, "robot projects to empty set");
        current.push(SpaceLayout {
            id: bundle.id,
            space: bundle.space,
            kind: BoxKind::EmptyProjection,
            level: level_idx,
            row,
            x: bundle.x,
            y,
            width: bundle.space.dimension() as f32 * config.column_step,
            height,
            projection: Some(Projection {
                bundle_id: bundle.id,
                bundle_space: bundle.space,
                fiber: bundle.space,
            }),
        });
    }

    Ok((current, cursor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Robot;
    use crate::space::SpaceType;

    fn level(robots: &[(u32, SpaceType, Option<u32>)]) -> Level {
        Level {
            robots: robots
                .iter()
                .map(|(id, space, simplification_of)| Robot {
                    id: *id,
                    space: *space,
                    simplification_of: *simplification_of,
                })
                .collect(),
        }
    }

    fn config() -> LayoutConfig {
        LayoutConfig {
            row_step: 20.0,
            column_step: 8.0,
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn empty_hierarchy_is_rejected() {
        let err = compute_layout(&Hierarchy::new(), &config()).unwrap_err();
        assert!(matches!(err, LayoutError::Empty));
    }

    #[test]
    fn single_level_is_a_row_of_solid_boxes() {
        let hierarchy = Hierarchy {
            levels: vec![level(&[(0, SpaceType::Se3, None), (1, SpaceType::Real(2), None)])],
        };
        let layout = compute_layout(&hierarchy, &config()).unwrap();
        assert_eq!(layout.spaces.len(), 2);
        assert_eq!(layout.spaces[0].x, 0.0);
        assert_eq!(layout.spaces[1].x, 48.0);
        assert_eq!(layout.width, 64.0);
        assert_eq!(layout.height, 10.0);
        assert!(layout.spaces.iter().all(|s| s.kind == BoxKind::Space));
    }

    #[test]
    fn simplification_snaps_to_bundle() {
        // Two drones; only the second keeps a coarse R3 abstraction.
        let hierarchy = Hierarchy {
            levels: vec![
                level(&[(0, SpaceType::Real(3), Some(1))]),
                level(&[(0, SpaceType::Se3, None), (1, SpaceType::Se3, None)]),
            ],
        };
        let layout = compute_layout(&hierarchy, &config()).unwrap();
        let top: Vec<&SpaceLayout> = layout.spaces.iter().filter(|s| s.row == 1).collect();
        assert_eq!(top.len(), 2);

        let coarse = top.iter().find(|s| s.kind == BoxKind::Space).unwrap();
        assert_eq!(coarse.x, 48.0);
        assert_eq!(coarse.y, 20.0);
        assert_eq!(coarse.level, 0);
        let projection = coarse.projection.unwrap();
        assert_eq!(projection.bundle_id, 1);
        assert_eq!(projection.fiber, SpaceType::So3);

        let empty = top
            .iter()
            .find(|s| s.kind == BoxKind::EmptyProjection)
            .unwrap();
        assert_eq!(empty.id, 0);
        assert_eq!(empty.x, 0.0);
        assert_eq!(empty.projection.unwrap().fiber, SpaceType::Se3);
        assert_eq!(layout.height, 30.0);
    }

    #[test]
    fn empty_projections_propagate_upward() {
        let hierarchy = Hierarchy {
            levels: vec![
                level(&[(5, SpaceType::Real(1), Some(4))]),
                level(&[(4, SpaceType::Real(2), Some(3))]),
                level(&[(3, SpaceType::Real(4), None), (9, SpaceType::Se2, None)]),
            ],
        };
        let layout = compute_layout(&hierarchy, &config()).unwrap();
        let carried: Vec<(usize, u32)> = layout
            .spaces
            .iter()
            .filter(|s| s.kind == BoxKind::EmptyProjection)
            .map(|s| (s.row, s.id))
            .collect();
        assert_eq!(carried, vec![(1, 9), (2, 9)]);
    }

    #[test]
    fn empty_projection_sharing_an_id_is_still_carried() {
        // The carried SE3 #0 and the R3 #0 meet in the middle row.
        let hierarchy = Hierarchy {
            levels: vec![
                level(&[(0, SpaceType::Real(1), Some(0))]),
                level(&[(0, SpaceType::Real(3), Some(1))]),
                level(&[(0, SpaceType::Se3, None), (1, SpaceType::Se3, None)]),
            ],
        };
        let layout = compute_layout(&hierarchy, &config()).unwrap();
        let carried: Vec<(usize, u32, SpaceType)> = layout
            .spaces
            .iter()
            .filter(|s| s.kind == BoxKind::EmptyProjection)
            .map(|s| (s.row, s.id, s.space))
            .collect();
        assert_eq!(
            carried,
            vec![(1, 0, SpaceType::Se3), (2, 0, SpaceType::Se3)]
        );

        let top = layout
            .spaces
            .iter()
            .find(|s| s.row == 2 && s.kind == BoxKind::Space)
            .unwrap();
        let projection = top.projection.unwrap();
        assert_eq!(projection.bundle_space, SpaceType::Real(3));
        assert_eq!(projection.fiber, SpaceType::Real(2));
        assert_eq!(top.x, 48.0);
    }

    #[test]
    fn unknown_simplification_is_an_error() {
        let hierarchy = Hierarchy {
            levels: vec![
                level(&[(0, SpaceType::Real(2), Some(7))]),
                level(&[(0, SpaceType::Se2, None)]),
            ],
        };
        let err = compute_layout(&hierarchy, &config()).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::UnknownSimplification {
                id: 0,
                simplification_of: 7,
                level: 0
            }
        ));
    }

    #[test]
    fn unsupported_fiber_is_an_error() {
        let hierarchy = Hierarchy {
            levels: vec![
                level(&[(0, SpaceType::Real(3), Some(0))]),
                level(&[(0, SpaceType::Se2, None)]),
            ],
        };
        let err = compute_layout(&hierarchy, &config()).unwrap_err();
        assert!(matches!(err, LayoutError::Fiber { id: 0, level: 0, .. }));
    }

    #[test]
    fn layout_is_reproducible() {
        let hierarchy = Hierarchy {
            levels: vec![
                level(&[(0, SpaceType::Se2, Some(0))]),
                level(&[(0, SpaceType::Se2Rn, None), (1, SpaceType::Se2Rn, None)]),
            ],
        };
        let a = compute_layout(&hierarchy, &config()).unwrap();
        let b = compute_layout(&hierarchy, &config()).unwrap();
        assert_eq!(a.scene, b.scene);
        assert_eq!(a.width, b.width);
    }
}
