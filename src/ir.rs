use crate::space::SpaceType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Robot {
    pub id: u32,
    pub space: SpaceType,
    /// Id of the robot in the next finer level that this robot simplifies.
    pub simplification_of: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Level {
    pub robots: Vec<Robot>,
}

/// Levels in document order: coarsest first, finest last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hierarchy {
    pub levels: Vec<Level>,
}

impl Level {
    pub fn robot(&self, id: u32) -> Option<&Robot> {
        self.robots.iter().find(|robot| robot.id == id)
    }

    /// Whether any robot of this level simplifies the robot `id` below it.
    pub fn simplifies(&self, id: u32) -> bool {
        self.robots
            .iter()
            .any(|robot| robot.simplification_of == Some(id))
    }

    /// Summed in `u64`: a level can hold several `R{n}` with n near `u32::MAX`.
    pub fn total_dimension(&self) -> u64 {
        self.robots
            .iter()
            .map(|robot| u64::from(robot.space.dimension()))
            .sum()
    }
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Combined dimension of the finest level, the full state space.
    pub fn state_dimension(&self) -> u64 {
        self.levels.last().map(Level::total_dimension).unwrap_or(0)
    }
}
