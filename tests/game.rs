use std::fs;
use std::path::Path;

use pacman_game::{
    parse_level, Game, Level, LevelDirectory, LevelList, LevelSource, Outcome, Phase, PlayError,
    Pos,
};
use rstest::rstest;

const ONE_FRUIT: &str = "\
# board
...
.F.
...
# elements
pacman,0,0
# fruits
F,cherry,10
# properties
";

/// A corridor on the top row; the fruit in the corner is out of reach so the
/// level never completes.
const CORRIDOR: &str = "\
# board
.....
wwwww
wwwww
wwwww
wwwwF
# elements
pacman,0,0
blinky,4,0
# fruits
F,cherry,10
o,supergum,50
# properties
power.duration=5
ghost.bonus=200
";

fn level(text: &str) -> Level {
    parse_level(text).unwrap()
}

fn game(levels: &[&str]) -> Game<LevelList> {
    Game::new(LevelList::new(levels.iter().map(|text| level(text))))
}

#[test]
fn eating_the_only_fruit_finishes_the_level() {
    let mut game = game(&[ONE_FRUIT]);

    assert_eq!(game.play(1, 0), Ok(Outcome::Moved));
    assert!(game.cell(1, 0).has_player());
    assert_eq!(game.cell(1, 1).fruit(), Some("cherry"));

    assert_eq!(game.play(0, 1), Ok(Outcome::AllLevelsComplete));
    assert_eq!(game.score().points(), 10);
    assert_eq!(game.score().level(), 2);
    assert!(game.is_finished());
    assert_eq!(game.play(0, 1), Err(PlayError::Finished));
}

#[test]
fn next_level_starts_from_its_own_elements() {
    let second = "# b\n....\n....\n..F.\n....\n# e\npacman,3,3\nblinky,0,0\n# f\nF,apple,5\n# p\n";
    let mut game = game(&[ONE_FRUIT, second]);

    game.play(1, 0).unwrap();
    assert_eq!(game.play(0, 1), Ok(Outcome::LevelComplete));

    assert_eq!(game.phase(), Phase::Playing);
    assert_eq!(game.score().level(), 2);
    assert_eq!(game.score().points(), 10);
    assert_eq!(game.score().lives(), 3);
    assert_eq!(game.size(), 4);
    assert_eq!(game.board().player(), Some(Pos::new(3, 3)));
    assert_eq!(game.cell(0, 0).ghost(), Some("blinky"));
    assert_eq!(game.cell(2, 2).fruit(), Some("apple"));
}

#[rstest]
#[case::off_the_left_edge(0, 0, -1, 0)]
#[case::off_the_top_edge(0, 0, 0, -1)]
#[case::off_the_right_edge(2, 2, 1, 0)]
#[case::off_the_bottom_edge(2, 2, 0, 1)]
#[case::into_a_wall(1, 0, 0, 1)]
fn blocked_moves_leave_the_player_in_place(
    #[case] x: usize,
    #[case] y: usize,
    #[case] dx: i32,
    #[case] dy: i32,
) {
    let text = format!(
        "# b\n...\n.w.\n..F\n# e\npacman,{x},{y}\n# f\nF,cherry,10\no,plum,20\n# p\n"
    );
    let mut game = game(&[text.as_str()]);
    assert_eq!(game.play(dx, dy), Ok(Outcome::Moved));
    assert_eq!(game.board().player(), Some(Pos::new(x, y)));
    assert_eq!(game.score().points(), 0);
}

#[test]
fn fruit_under_a_standing_player_stays() {
    let mut game = game(&["# b\n..\n.F\n# e\npacman,1,1\n# f\nF,cherry,10\n# p\n"]);
    assert_eq!(game.play(0, 0), Ok(Outcome::Moved));
    assert_eq!(game.score().points(), 0);
    assert_eq!(game.cell(1, 1).fruit(), Some("cherry"));

    game.play(-1, 0).unwrap();
    assert_eq!(game.play(1, 0), Ok(Outcome::AllLevelsComplete));
    assert_eq!(game.score().points(), 10);
}

#[test]
fn ghost_collision_costs_one_life_and_resets() {
    let mut game = game(&[CORRIDOR]);

    // blinky walks from (4,0) to (3,0), then meets the player on (2,0).
    assert_eq!(game.play(1, 0), Ok(Outcome::Moved));
    assert_eq!(game.cell(3, 0).ghost(), Some("blinky"));
    assert_eq!(game.play(1, 0), Ok(Outcome::LifeLost));

    assert_eq!(game.score().lives(), 2);
    assert_eq!(game.board().player(), Some(Pos::new(0, 0)));
    assert_eq!(game.board().ghosts()["blinky"], Pos::new(4, 0));
    assert_eq!(game.phase(), Phase::Playing);
}

#[test]
fn losing_the_last_life_ends_the_game() {
    let mut game = game(&[CORRIDOR]);
    let mut outcomes = Vec::new();
    for _ in 0..3 {
        game.play(1, 0).unwrap();
        outcomes.push(game.play(1, 0).unwrap());
    }
    assert_eq!(
        outcomes,
        vec![Outcome::LifeLost, Outcome::LifeLost, Outcome::GameOver]
    );
    assert_eq!(game.score().lives(), 0);
    assert_eq!(game.phase(), Phase::GameOver);
    assert!(game.is_finished());
    assert_eq!(game.play(0, 0), Err(PlayError::Finished));
}

#[test]
fn walking_into_a_ghost_is_a_collision() {
    let text = "# b\n...\nwww\nwwF\n# e\npacman,0,0\ninky,1,0\n# f\nF,cherry,10\n# p\n";
    let mut game = game(&[text]);
    assert_eq!(game.play(1, 0), Ok(Outcome::LifeLost));
    assert_eq!(game.score().lives(), 2);
}

#[test]
fn ghost_leaving_a_standing_player_is_no_collision() {
    let text = "# b\n...\nwww\nwwF\n# e\npacman,0,0\nblinky,0,0\n# f\nF,cherry,10\n# p\n";
    let mut game = game(&[text]);

    assert_eq!(game.play(0, 0), Ok(Outcome::Moved));
    assert_eq!(game.score().lives(), 3);
    assert_eq!(game.board().ghosts()["blinky"], Pos::new(1, 0));

    // Coming back onto the player still counts.
    assert_eq!(game.play(0, 0), Ok(Outcome::LifeLost));
    assert_eq!(game.score().lives(), 2);
}

#[test]
fn ghost_sent_home_under_the_player_is_caught_once() {
    let text = CORRIDOR
        .replace(".....", ".o...")
        .replace("blinky,4,0", "blinky,3,0")
        .replace("power.duration=5", "power.duration=20");
    let mut game = game(&[text.as_str()]);

    game.play(1, 0).unwrap();
    game.play(1, 0).unwrap();
    assert_eq!(game.board().ghosts()["blinky"], Pos::new(3, 0));

    // Walking into the ghost catches it and sends it home, which is the
    // player's own cell.
    assert_eq!(game.play(1, 0), Ok(Outcome::Moved));
    assert_eq!(game.score().points(), 250);
    assert_eq!(game.board().ghosts()["blinky"], Pos::new(3, 0));

    // It runs off while the player stands still.
    assert_eq!(game.play(0, 0), Ok(Outcome::Moved));
    assert_eq!(game.score().points(), 250);
    assert_ne!(game.board().ghosts()["blinky"], Pos::new(3, 0));
    assert_eq!(game.score().lives(), 3);
}

/// Two ghosts in dead ends on either side of the cell above the player, so
/// both have to step onto it.
#[rstest]
#[case::without_power("w...w", Outcome::LifeLost, 2, 0)]
#[case::with_power("w.o.w", Outcome::Moved, 3, 450)]
fn two_ghosts_on_the_player_in_one_step(
    #[case] top_row: &str,
    #[case] outcome: Outcome,
    #[case] lives: u32,
    #[case] points: u64,
) {
    let text = format!(
        "# b\n{top_row}\nww.ww\nww.ww\nwwwww\nwwwwF\n# e\npacman,2,1\nblinky,1,0\npinky,3,0\n\
         # f\nF,cherry,10\no,supergum,50\n# p\npower.duration=10\nghost.bonus=200\n"
    );
    let mut game = game(&[text.as_str()]);

    assert_eq!(game.play(0, -1), Ok(outcome));
    assert_eq!(game.score().lives(), lives);
    assert_eq!(game.score().points(), points);
    assert_eq!(game.board().ghosts()["blinky"], Pos::new(1, 0));
    assert_eq!(game.board().ghosts()["pinky"], Pos::new(3, 0));
}

#[test]
fn power_fruit_turns_the_chase_around() {
    let text = CORRIDOR.replace(".....", ".o...");
    let mut game = game(&[text.as_str()]);

    // Eat the power fruit; the power is counted down once in the same step.
    assert_eq!(game.play(1, 0), Ok(Outcome::Moved));
    assert_eq!(game.score().points(), 50);
    assert!(game.has_super_power());
    assert_eq!(game.power_remaining(), 4);
    assert_eq!(game.board().ghosts()["blinky"], Pos::new(3, 0));

    // The frightened ghost backs off to the end of the corridor.
    game.play(1, 0).unwrap();
    assert_eq!(game.board().ghosts()["blinky"], Pos::new(4, 0));

    // Cornered, it has to come forward and gets caught.
    assert_eq!(game.play(1, 0), Ok(Outcome::Moved));
    assert_eq!(game.score().points(), 250);
    assert_eq!(game.score().lives(), 3);
    assert_eq!(game.board().ghosts()["blinky"], Pos::new(4, 0));
    assert_eq!(game.power_remaining(), 2);

    // Walk away until the power runs out, then the ghost hunts again.
    game.play(0, 0).unwrap();
    game.play(-1, 0).unwrap();
    assert!(!game.has_super_power());
    assert_eq!(game.play(0, 0), Ok(Outcome::LifeLost));
    assert_eq!(game.score().lives(), 2);
    assert!(game.score().points() >= 250);
}

#[test]
fn corrupt_level_in_the_middle_becomes_an_empty_level() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("level1"), ONE_FRUIT).unwrap();
    fs::write(dir.path().join("level2"), "# b\n..\n.\n").unwrap();
    fs::write(dir.path().join("level3"), ONE_FRUIT).unwrap();

    let mut source = LevelDirectory::new(dir.path());
    assert_eq!(source.next_level().map(|l| l.size()), Some(3));
    assert_eq!(source.next_level(), Some(Level::empty()));
    assert_eq!(source.next_level().map(|l| l.size()), Some(3));
}

#[test]
fn corrupt_last_level_ends_the_session() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("level1"), ONE_FRUIT).unwrap();
    fs::write(dir.path().join("level2"), "# b\nfruit,x,y\n").unwrap();

    let mut game = Game::new(LevelDirectory::new(dir.path()));
    game.play(1, 0).unwrap();
    assert_eq!(game.play(0, 1), Ok(Outcome::AllLevelsComplete));
    assert!(game.is_finished());
}

#[test]
fn empty_fallback_level_is_skipped_on_the_next_step() {
    let mut game = Game::new(LevelList::new([
        level(ONE_FRUIT),
        Level::empty(),
        level(ONE_FRUIT),
    ]));
    game.play(1, 0).unwrap();
    assert_eq!(game.play(0, 1), Ok(Outcome::LevelComplete));
    assert_eq!(game.size(), 0);
    assert_eq!(game.play(0, 0), Ok(Outcome::LevelComplete));
    assert_eq!(game.score().level(), 3);
    assert_eq!(game.size(), 3);
}

#[test]
fn ghosts_stay_on_the_floor_and_replays_match() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("levels");
    let moves = [(1, 0), (0, 1), (-1, 0), (0, -1), (0, 0)];

    let run = || {
        let mut game = Game::new(LevelDirectory::new(&dir));
        let mut trace = Vec::new();
        for i in 0..300 {
            let (dx, dy) = moves[(i / 7) % moves.len()];
            if game.play(dx, dy).is_err() {
                break;
            }
            let size = game.size();
            for pos in game.board().ghosts().values().chain(game.board().player().iter()) {
                assert!(pos.x < size && pos.y < size, "{pos} is off the board");
                assert!(!game.level().is_wall(*pos), "{pos} is a wall");
            }
            trace.push((game.board().clone(), game.score().clone()));
        }
        trace
    };

    assert_eq!(run(), run());
}
