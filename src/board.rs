use std::collections::{btree_map, BTreeMap, HashSet};

use crate::level::{Fruit, Level, Pos};

/// Mutable state of the level being played: where everyone is, which
/// fruits are gone and how long the power lasts.
///
/// Rebuilt from the [`Level`] every time a level starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    player: Option<Pos>,
    ghosts: BTreeMap<String, Pos>,
    eaten: HashSet<Pos>,
    fruits_left: usize,
    power_remaining: u32,
    player_start: Option<Pos>,
    ghost_starts: BTreeMap<String, Pos>,
}

impl BoardState {
    pub fn new(level: &Level) -> Self {
        let ghost_starts: BTreeMap<String, Pos> = level
            .ghost_starts()
            .map(|(name, pos)| (name.to_string(), pos))
            .collect();
        Self {
            player: level.player_start(),
            ghosts: ghost_starts.clone(),
            eaten: HashSet::new(),
            fruits_left: level.fruit_cells().count(),
            power_remaining: 0,
            player_start: level.player_start(),
            ghost_starts,
        }
    }

    /// `None` only on the empty fallback level.
    pub fn player(&self) -> Option<Pos> {
        self.player
    }

    pub fn ghosts(&self) -> &BTreeMap<String, Pos> {
        &self.ghosts
    }

    /// Name of a ghost standing on `pos`, the first by name if several are.
    pub fn ghost_at(&self, pos: Pos) -> Option<&str> {
        self.ghosts
            .iter()
            .find(|(_, at)| **at == pos)
            .map(|(name, _)| name.as_str())
    }

    pub fn is_eaten(&self, pos: Pos) -> bool {
        self.eaten.contains(&pos)
    }

    pub fn fruits_left(&self) -> usize {
        self.fruits_left
    }

    pub fn power_remaining(&self) -> u32 {
        self.power_remaining
    }

    pub fn power_active(&self) -> bool {
        self.power_remaining > 0
    }

    pub(crate) fn set_player(&mut self, pos: Pos) {
        self.player = Some(pos);
    }

    /// Eats the fruit at `pos` if one is still there.
    pub(crate) fn eat<'l>(&mut self, level: &'l Level, pos: Pos) -> Option<&'l Fruit> {
        let fruit = level.fruit_at(pos)?;
        if !self.eaten.insert(pos) {
            return None;
        }
        self.fruits_left -= 1;
        Some(fruit)
    }

    pub(crate) fn start_power(&mut self, ticks: u32) {
        self.power_remaining = ticks;
    }

    pub(crate) fn tick_power(&mut self) {
        self.power_remaining = self.power_remaining.saturating_sub(1);
    }

    pub(crate) fn clear_power(&mut self) {
        self.power_remaining = 0;
    }

    pub(crate) fn ghosts_mut(&mut self) -> btree_map::IterMut<'_, String, Pos> {
        self.ghosts.iter_mut()
    }

    /// Sends one ghost back to its starting cell.
    pub(crate) fn reset_ghost(&mut self, name: &str) {
        let start = self.ghost_starts.get(name);
        if let (Some(pos), Some(start)) = (self.ghosts.get_mut(name), start) {
            *pos = *start;
        }
    }

    /// Puts the player and every ghost back on their starting cells.
    pub(crate) fn reset_positions(&mut self) {
        self.player = self.player_start;
        self.ghosts = self.ghost_starts.clone();
    }
}

/// Read-only view of one board cell, for presentation.
#[derive(Debug, Clone, Copy)]
pub struct Cell<'a> {
    level: &'a Level,
    board: &'a BoardState,
    pos: Pos,
}

impl<'a> Cell<'a> {
    /// # Panics
    ///
    /// Panics if `pos` is outside the board.
    pub(crate) fn new(level: &'a Level, board: &'a BoardState, pos: Pos) -> Self {
        assert!(
            pos.x < level.size() && pos.y < level.size(),
            "cell {pos} is outside the {0}x{0} board",
            level.size()
        );
        Self { level, board, pos }
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn is_wall(&self) -> bool {
        self.level.is_wall(self.pos)
    }

    pub fn has_player(&self) -> bool {
        self.board.player() == Some(self.pos)
    }

    pub fn ghost(&self) -> Option<&'a str> {
        self.board.ghost_at(self.pos)
    }

    /// Name of the fruit still lying here.
    pub fn fruit(&self) -> Option<&'a str> {
        if self.board.is_eaten(self.pos) {
            return None;
        }
        self.level.fruit_at(self.pos).map(|fruit| fruit.name.as_str())
    }
}
