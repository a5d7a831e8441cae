use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::level::{Level, Pos};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }
}

/// The neighbour of `pos` in `dir` if it is on the board and not a wall.
pub fn step(level: &Level, pos: Pos, dir: Dir) -> Option<Pos> {
    let (dx, dy) = dir.delta();
    pos.offset(dx, dy, level.size())
        .filter(|next| !level.is_wall(*next))
}

/// Breadth-first walking distance from `start` to every cell, `-1` where
/// unreachable. Indexed `[y][x]`.
pub fn distance_map(level: &Level, start: Pos) -> Vec<Vec<i32>> {
    let size = level.size();
    let mut dist = vec![vec![-1; size]; size];
    let mut q = VecDeque::new();
    dist[start.y][start.x] = 0;
    q.push_back(start);

    while let Some(pos) = q.pop_front() {
        let base = dist[pos.y][pos.x];
        for dir in Dir::ALL {
            let Some(next) = step(level, pos, dir) else {
                continue;
            };
            if dist[next.y][next.x] == -1 {
                dist[next.y][next.x] = base + 1;
                q.push_back(next);
            }
        }
    }
    dist
}

/// Picks the direction a ghost at `pos` moves in.
///
/// Chasing ghosts take the step that brings them closest to the player,
/// fleeing ghosts the one that takes them farthest away. Equal candidates
/// are decided by `rng`. `None` when no neighbour is passable, or when
/// chasing and no neighbour can reach the player.
pub fn next_ghost_dir(
    level: &Level,
    pos: Pos,
    dist: &[Vec<i32>],
    flee: bool,
    rng: &mut impl Rng,
) -> Option<Dir> {
    let mut options = Vec::new();
    let mut best: Option<i32> = None;
    for dir in Dir::ALL {
        let Some(next) = step(level, pos, dir) else {
            continue;
        };
        let d = match (dist[next.y][next.x], flee) {
            (-1, false) => continue,
            (-1, true) => i32::MAX,
            (d, _) => d,
        };
        let better = match best {
            None => true,
            Some(b) if flee => d > b,
            Some(b) => d < b,
        };
        if better {
            best = Some(d);
            options.clear();
            options.push(dir);
        } else if best == Some(d) {
            options.push(dir);
        }
    }
    options.choose(rng).copied()
}
