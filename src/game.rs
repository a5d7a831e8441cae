use std::collections::BTreeMap;
use std::time::Duration;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::board::{BoardState, Cell};
use crate::config::LevelConfig;
use crate::error::PlayError;
use crate::ghost::{distance_map, next_ghost_dir, step};
use crate::level::{Level, Pos};
use crate::score::Score;
use crate::source::LevelSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    /// No lives left.
    GameOver,
    /// The last level was cleared, or no further level could be loaded.
    AllLevelsComplete,
}

/// What a successful [`Game::play`] step led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Moved,
    /// A ghost caught the player; positions were reset.
    LifeLost,
    /// Every fruit was eaten and the next level is loaded.
    LevelComplete,
    GameOver,
    AllLevelsComplete,
}

/// The game engine: pulls levels from a [`LevelSource`] and advances the
/// board one [`Game::play`] call at a time.
#[derive(Debug)]
pub struct Game<S> {
    source: S,
    level: Level,
    config: LevelConfig,
    board: BoardState,
    score: Score,
    phase: Phase,
    rng: StdRng,
}

impl<S: LevelSource> Game<S> {
    /// Starts a session on the first level of `source`. A source without
    /// any level yields a game that is already finished.
    pub fn new(source: S) -> Self {
        let level = Level::empty();
        let config = LevelConfig::from_level(&level, 1);
        let mut game = Self {
            source,
            board: BoardState::new(&level),
            rng: StdRng::seed_from_u64(config.seed),
            level,
            config,
            score: Score::default(),
            phase: Phase::AllLevelsComplete,
        };
        game.load_next_level();
        game
    }

    /// Moves the player by `(dx, dy)`, then the ghosts, and settles
    /// collisions and level completion.
    ///
    /// `dx` and `dy` must be in `-1..=1` and at most one of them non-zero.
    /// A move into a wall or off the board leaves the player in place.
    pub fn play(&mut self, dx: i32, dy: i32) -> Result<Outcome, PlayError> {
        if self.phase != Phase::Playing {
            return Err(PlayError::Finished);
        }
        if !(-1..=1).contains(&dx) || !(-1..=1).contains(&dy) || (dx != 0 && dy != 0) {
            return Err(PlayError::InvalidMove { dx, dy });
        }

        let ghosts_before = self.board.ghosts().clone();

        let moved = self.move_player(dx, dy);
        if moved {
            self.eat_fruit();
        }
        self.board.tick_power();
        self.move_ghosts();

        let mut outcome = Outcome::Moved;
        let caught = self.caught_ghosts(&ghosts_before, moved);
        if !caught.is_empty() {
            if self.board.power_active() {
                for name in &caught {
                    debug!("{name} caught, +{} points", self.config.ghost_bonus);
                    self.score.add_points(self.config.ghost_bonus);
                    self.board.reset_ghost(name);
                }
            } else {
                let lives = self.score.lose_life();
                debug!("caught by {}, {lives} lives left", caught[0]);
                if lives == 0 {
                    info!("game over with {} points", self.score.points());
                    self.phase = Phase::GameOver;
                    return Ok(Outcome::GameOver);
                }
                self.board.reset_positions();
                self.board.clear_power();
                outcome = Outcome::LifeLost;
            }
        }

        if self.board.fruits_left() == 0 {
            return Ok(self.complete_level());
        }
        Ok(outcome)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Lives are exhausted or there is no level left to play.
    pub fn is_finished(&self) -> bool {
        self.phase != Phase::Playing
    }

    pub fn has_super_power(&self) -> bool {
        self.board.power_active()
    }

    pub fn power_remaining(&self) -> u32 {
        self.board.power_remaining()
    }

    /// Rows (and columns) of the current board.
    pub fn size(&self) -> usize {
        self.level.size()
    }

    /// Shortest interval the caller should leave between two `play` calls.
    pub fn wait(&self) -> Duration {
        self.config.wait
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    /// View of the cell at column `x`, row `y`.
    ///
    /// # Panics
    ///
    /// Panics unless `x < size()` and `y < size()`.
    pub fn cell(&self, x: usize, y: usize) -> Cell<'_> {
        Cell::new(&self.level, &self.board, Pos::new(x, y))
    }

    fn load_next_level(&mut self) -> bool {
        let Some(level) = self.source.next_level() else {
            self.phase = Phase::AllLevelsComplete;
            return false;
        };
        self.config = LevelConfig::from_level(&level, self.score.level());
        self.board = BoardState::new(&level);
        self.rng = StdRng::seed_from_u64(self.config.seed);
        self.level = level;
        self.phase = Phase::Playing;
        info!(
            "level {} started: {} fruits, {} ghosts",
            self.score.level(),
            self.board.fruits_left(),
            self.board.ghosts().len()
        );
        true
    }

    /// `true` if the player changed cell.
    fn move_player(&mut self, dx: i32, dy: i32) -> bool {
        if (dx, dy) == (0, 0) {
            return false;
        }
        let Some(next) = self
            .board
            .player()
            .and_then(|pos| pos.offset(dx, dy, self.level.size()))
        else {
            return false;
        };
        if self.level.is_wall(next) {
            return false;
        }
        self.board.set_player(next);
        true
    }

    fn eat_fruit(&mut self) {
        let Some(pos) = self.board.player() else {
            return;
        };
        let Some(fruit) = self.board.eat(&self.level, pos) else {
            return;
        };
        debug!("{} eaten at {pos}, +{}", fruit.name, fruit.value);
        self.score.add_points(fruit.value);
        if self.config.power_fruit == Some(fruit.key) {
            self.board.start_power(self.config.power_ticks);
        }
    }

    fn move_ghosts(&mut self) {
        let Some(player) = self.board.player() else {
            return;
        };
        let dist = distance_map(&self.level, player);
        let flee = self.board.power_active();
        let level = &self.level;
        let rng = &mut self.rng;
        for (_, pos) in self.board.ghosts_mut() {
            let next = next_ghost_dir(level, *pos, &dist, flee, rng)
                .and_then(|dir| step(level, *pos, dir));
            if let Some(next) = next {
                *pos = next;
            }
        }
    }

    /// Ghosts that end the step on the player's cell, plus, when the player
    /// moved, ghosts whose cell the player walked into before they moved
    /// (this covers swapping cells).
    fn caught_ghosts(&self, ghosts_before: &BTreeMap<String, Pos>, moved: bool) -> Vec<String> {
        let Some(player) = self.board.player() else {
            return Vec::new();
        };
        self.board
            .ghosts()
            .iter()
            .filter(|(name, pos)| {
                **pos == player || (moved && ghosts_before.get(name.as_str()) == Some(&player))
            })
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn complete_level(&mut self) -> Outcome {
        info!("level {} complete", self.score.level());
        self.score.change_level();
        if self.load_next_level() {
            Outcome::LevelComplete
        } else {
            info!("all levels complete with {} points", self.score.points());
            Outcome::AllLevelsComplete
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_level;
    use crate::source::LevelList;

    fn game(text: &str) -> Game<LevelList> {
        Game::new(LevelList::new([parse_level(text).unwrap()]))
    }

    #[test]
    fn empty_source_is_finished_from_the_start() {
        let mut game = Game::new(LevelList::default());
        assert!(game.is_finished());
        assert_eq!(game.phase(), Phase::AllLevelsComplete);
        assert_eq!(game.play(1, 0), Err(PlayError::Finished));
    }

    #[test]
    fn diagonal_and_long_moves_are_rejected() {
        let mut game = game("# b\n...\n.F.\n...\n# e\npacman,0,0\n# f\nF,cherry,10\n# p\n");
        for (dx, dy) in [(1, 1), (-1, 1), (2, 0), (0, -2)] {
            assert_eq!(game.play(dx, dy), Err(PlayError::InvalidMove { dx, dy }));
        }
        assert_eq!(game.board().player(), Some(Pos::new(0, 0)));
    }

    #[test]
    fn standing_still_is_a_valid_step() {
        let mut game = game("# b\n...\n.F.\n...\n# e\npacman,0,0\n# f\nF,cherry,10\n# p\n");
        assert_eq!(game.play(0, 0), Ok(Outcome::Moved));
        assert_eq!(game.board().player(), Some(Pos::new(0, 0)));
    }

    #[test]
    fn level_without_fruit_completes_on_first_step() {
        let mut game = Game::new(LevelList::new([Level::empty()]));
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.size(), 0);
        assert_eq!(game.play(0, 1), Ok(Outcome::AllLevelsComplete));
        assert_eq!(game.score().level(), 2);
        assert!(game.is_finished());
    }

    #[test]
    fn wait_comes_from_level_properties() {
        let game = game("# b\n.F\n..\n# e\npacman,0,0\n# f\nF,cherry,10\n# p\nwait=40\n");
        assert_eq!(game.wait(), Duration::from_millis(40));
    }
}
