//! Grid maze chase game: level files, board state and the turn-based engine.
//!
//! A [`Game`] pulls [`Level`]s from a [`LevelSource`] (usually a
//! [`LevelDirectory`] of `level1`, `level2`, ... files) and advances one
//! [`Game::play`] call at a time. Presentation reads the board through
//! [`Game::cell`] and [`Game::score`].

pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod ghost;
pub mod level;
pub mod logging;
pub mod parser;
pub mod score;
pub mod source;

pub use board::{BoardState, Cell};
pub use config::LevelConfig;
pub use error::{LevelError, ParseError, PlayError};
pub use game::{Game, Outcome, Phase};
pub use ghost::Dir;
pub use level::{Element, ElementKind, Fruit, Level, Pos};
pub use parser::{load_level, parse_level};
pub use score::Score;
pub use source::{LevelDirectory, LevelList, LevelSource};
