use std::fmt;

pub const STARTING_LIVES: u32 = 3;

/// Lives, points and level number of a session. Survives level changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    lives: u32,
    points: u64,
    level: u32,
}

impl Default for Score {
    fn default() -> Self {
        Self {
            lives: STARTING_LIVES,
            points: 0,
            level: 1,
        }
    }
}

impl Score {
    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Sum of the values of eaten fruits and ghost bonuses.
    pub fn points(&self) -> u64 {
        self.points
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Returns the lives left.
    pub(crate) fn lose_life(&mut self) -> u32 {
        debug_assert!(self.lives > 0, "no life left to lose");
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }

    pub(crate) fn add_points(&mut self, points: u32) {
        self.points += u64::from(points);
    }

    pub(crate) fn change_level(&mut self) {
        self.level += 1;
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Level {}  Points {}  Lives {}",
            self.level, self.points, self.lives
        )
    }
}
