use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use log::{error, info};

use crate::level::Level;
use crate::parser::load_level;

/// Hands out levels 1, 2, 3, ... in order, without rewinding.
pub trait LevelSource {
    /// Whether another level can be taken.
    fn has_next(&self) -> bool;

    /// Takes the next level, or `None` when the session cannot continue.
    fn next_level(&mut self) -> Option<Level>;
}

/// Levels stored as files `level1`, `level2`, ... in one directory.
#[derive(Debug, Clone)]
pub struct LevelDirectory {
    dir: PathBuf,
    current: u32,
}

impl LevelDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            current: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of the last level handed out, 0 before the first.
    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn level_path(&self, number: u32) -> PathBuf {
        self.dir.join(format!("level{number}"))
    }
}

impl LevelSource for LevelDirectory {
    fn has_next(&self) -> bool {
        self.level_path(self.current + 1).is_file()
    }

    /// A level file that fails to load is logged and replaced with
    /// [`Level::empty`] while more levels remain, so one broken file does not
    /// end the session.
    fn next_level(&mut self) -> Option<Level> {
        if !self.has_next() {
            return None;
        }
        self.current += 1;
        match load_level(&self.level_path(self.current)) {
            Ok(level) => {
                info!("loaded level {} ({1}x{1})", self.current, level.size());
                Some(level)
            }
            Err(err) => {
                error!("error while loading level {}: {err}", self.current);
                self.has_next().then(Level::empty)
            }
        }
    }
}

/// Levels already in memory.
#[derive(Debug, Clone, Default)]
pub struct LevelList {
    levels: VecDeque<Level>,
}

impl LevelList {
    pub fn new(levels: impl IntoIterator<Item = Level>) -> Self {
        Self {
            levels: levels.into_iter().collect(),
        }
    }
}

impl LevelSource for LevelList {
    fn has_next(&self) -> bool {
        !self.levels.is_empty()
    }

    fn next_level(&mut self) -> Option<Level> {
        self.levels.pop_front()
    }
}
