use crate::ir::{Hierarchy, Level, Robot};
use crate::space::{SpaceError, SpaceType};
use roxmltree::{Document, Node, TextPos};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("no <hierarchy> element found")]
    MissingHierarchy,
    #[error("robot at {pos} has no `{attr}` attribute")]
    MissingAttribute { attr: &'static str, pos: TextPos },
    #[error("robot at {pos} has invalid `{attr}` value `{value}`")]
    InvalidInteger {
        attr: &'static str,
        value: String,
        pos: TextPos,
    },
    #[error("robot at {pos}: {source}")]
    Space {
        #[source]
        source: SpaceError,
        pos: TextPos,
    },
    #[error("robot id {id} appears twice in level {level}")]
    DuplicateRobot { id: u32, level: usize },
}

/// Parses a `<hierarchy>` document of `<level>` and `<robot>` elements.
pub fn parse_hierarchy(input: &str) -> Result<Hierarchy, ParseError> {
    let doc = Document::parse(input)?;
    let root = doc
        .descendants()
        .find(|node| node.has_tag_name("hierarchy"))
        .ok_or(ParseError::MissingHierarchy)?;

    let mut hierarchy = Hierarchy::new();
    for (level_idx, level_node) in root
        .descendants()
        .filter(|node| node.has_tag_name("level"))
        .enumerate()
    {
        let mut level = Level::default();
        for robot_node in level_node
            .descendants()
            .filter(|node| node.has_tag_name("robot"))
        {
            let robot = parse_robot(&doc, robot_node)?;
            if level.robot(robot.id).is_some() {
                return Err(ParseError::DuplicateRobot {
                    id: robot.id,
                    level: level_idx,
                });
            }
            level.robots.push(robot);
        }
        tracing::debug!(level = level_idx, robots = level.robots.len(), "parsed level");
        hierarchy.levels.push(level);
    }
    Ok(hierarchy)
}

fn parse_robot(doc: &Document<'_>, node: Node<'_, '_>) -> Result<Robot, ParseError> {
    let pos = doc.text_pos_at(node.range().start);
    let id_raw = node
        .attribute("id")
        .ok_or(ParseError::MissingAttribute { attr: "id", pos })?;
    let id = parse_integer("id", id_raw, pos)?;

    let type_raw = node
        .attribute("type")
        .ok_or(ParseError::MissingAttribute { attr: "type", pos })?;
    let space =
        SpaceType::from_token(type_raw).map_err(|source| ParseError::Space { source, pos })?;

    let simplification_of = match node.attribute("simplification_of_id") {
        Some(raw) if !raw.trim().is_empty() => {
            Some(parse_integer("simplification_of_id", raw, pos)?)
        }
        _ => None,
    };

    Ok(Robot {
        id,
        space,
        simplification_of,
    })
}

fn parse_integer(attr: &'static str, raw: &str, pos: TextPos) -> Result<u32, ParseError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| ParseError::InvalidInteger {
            attr,
            value: raw.to_string(),
            pos,
        })
}
