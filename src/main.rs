mod tui;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgAction, Parser};
use crossterm::cursor::{Hide, Show};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use log::error;
use pacman_game::{load_level, logging, Game, LevelDirectory};

/// Eat every fruit, avoid the ghosts.
#[derive(Parser, Debug)]
#[command(name = "pacman", version, about)]
struct Args {
    /// Directory holding the level files `level1`, `level2`, ...
    #[arg(default_value = "levels")]
    levels: PathBuf,

    /// More log output: `-v` for info, `-vv` for debug (RUST_LOG wins).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Append log records to this file instead of stderr.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Parse every level, print it back and exit.
    #[arg(long)]
    check: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(err) = logging::init(args.verbose, args.log_file.as_deref()) {
        eprintln!("cannot open log file: {err}");
        return ExitCode::FAILURE;
    }

    if !args.levels.is_dir() {
        error!("{} is not a directory", args.levels.display());
        return ExitCode::FAILURE;
    }

    let result = if args.check {
        check_levels(&args.levels)
    } else {
        play(&args.levels)
    };
    match result {
        Ok(code) => code,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn play(dir: &Path) -> io::Result<ExitCode> {
    let mut game = Game::new(LevelDirectory::new(dir));
    if game.is_finished() {
        error!("no level1 file in {}", dir.display());
        return Ok(ExitCode::FAILURE);
    }

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = tui::run(&mut stdout, &mut game, read_tick_override());

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result?;

    writeln!(stdout, "{}", game.score())?;
    Ok(ExitCode::SUCCESS)
}

/// Prints every level of `dir` in file format, stopping at the first one
/// that does not load.
fn check_levels(dir: &Path) -> io::Result<ExitCode> {
    let source = LevelDirectory::new(dir);
    let mut stdout = io::stdout().lock();
    let mut number = 1;
    while source.level_path(number).is_file() {
        match load_level(&source.level_path(number)) {
            Ok(level) => {
                writeln!(stdout, "==== level {number}")?;
                write!(stdout, "{level}")?;
            }
            Err(err) => {
                error!("{err}");
                return Ok(ExitCode::FAILURE);
            }
        }
        number += 1;
    }
    if number == 1 {
        error!("no level1 file in {}", dir.display());
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn read_tick_override() -> Option<Duration> {
    std::env::var("PACMAN_TICK_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .map(Duration::from_millis)
}
