use std::io::{self, Stdout, Write};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{style, Color, Print, PrintStyledContent, Stylize};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{queue, QueueableCommand};
use log::warn;
use pacman_game::{Dir, Game, LevelSource, Phase};
use unicode_width::UnicodeWidthStr;

const CELL_W: usize = 2;
const RENDER_FPS: u64 = 120;
const INPUT_HOLD_MS: u64 = 160;

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Ghost,
    Frightened,
    Wall,
    Empty,
    Fruit,
    Power,
}

impl Glyph {
    fn text(self) -> &'static str {
        match self {
            Glyph::Player => "😃",
            Glyph::Ghost => "👻",
            Glyph::Frightened => "😱",
            Glyph::Wall => "██",
            Glyph::Empty => "",
            Glyph::Fruit => "·",
            Glyph::Power => "●",
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
struct Drawn {
    glyph: Glyph,
    color: Color,
}

const BLANK: Drawn = Drawn {
    glyph: Glyph::Empty,
    color: Color::Reset,
};

/// Terminal renderer that only redraws cells that changed since the last frame.
struct Renderer {
    last: Vec<Drawn>,
    size: usize,
    last_hud: String,
    needs_full: bool,
    layout: Option<Layout>,
}

impl Renderer {
    fn new() -> Self {
        Self {
            last: Vec::new(),
            size: 0,
            last_hud: String::new(),
            needs_full: true,
            layout: None,
        }
    }

    fn fit(&mut self, size: usize) {
        if size != self.size || self.last.len() != size * size {
            self.size = size;
            self.last = vec![BLANK; size * size];
            self.needs_full = true;
        }
    }
}

/// Most recent direction key, held for a short while so a key repeat
/// gap does not stop the player.
#[derive(Default)]
struct Input {
    last_seen: [Option<Instant>; 4],
    last_pressed: Option<Dir>,
}

impl Input {
    /// Drains pending key events. Returns `false` when the player quits.
    fn poll(&mut self) -> io::Result<bool> {
        while event::poll(Duration::from_millis(0))? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                continue;
            }
            let dir = match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(false),
                KeyCode::Char('k') | KeyCode::Up => Dir::Up,
                KeyCode::Char('j') | KeyCode::Down => Dir::Down,
                KeyCode::Char('h') | KeyCode::Left => Dir::Left,
                KeyCode::Char('l') | KeyCode::Right => Dir::Right,
                _ => continue,
            };
            self.last_seen[idx_for_dir(dir)] = Some(Instant::now());
            self.last_pressed = Some(dir);
        }
        Ok(true)
    }

    fn active_dir(&self) -> Option<Dir> {
        let now = Instant::now();
        let hold = Duration::from_millis(INPUT_HOLD_MS);
        if let Some(dir) = self.last_pressed {
            if let Some(t) = self.last_seen[idx_for_dir(dir)] {
                if now.duration_since(t) <= hold {
                    return Some(dir);
                }
            }
        }
        Dir::ALL
            .iter()
            .zip(self.last_seen.iter())
            .filter_map(|(dir, seen)| seen.map(|t| (*dir, t)))
            .filter(|(_, t)| now.duration_since(*t) <= hold)
            .max_by_key(|(_, t)| *t)
            .map(|(dir, _)| dir)
    }
}

fn idx_for_dir(dir: Dir) -> usize {
    match dir {
        Dir::Up => 0,
        Dir::Down => 1,
        Dir::Left => 2,
        Dir::Right => 3,
    }
}

/// Runs the game until it finishes or the player quits. `tick` overrides
/// the level's own wait between steps.
pub fn run<S: LevelSource>(
    stdout: &mut Stdout,
    game: &mut Game<S>,
    tick: Option<Duration>,
) -> io::Result<()> {
    let mut renderer = Renderer::new();
    let mut input = Input::default();
    let mut last_tick = Instant::now();
    let frame_time = Duration::from_micros(1_000_000 / RENDER_FPS);

    stdout.queue(Clear(ClearType::All))?;
    loop {
        let frame_start = Instant::now();
        if !input.poll()? {
            return Ok(());
        }

        if last_tick.elapsed() >= tick.unwrap_or_else(|| game.wait()) {
            last_tick = Instant::now();
            let (dx, dy) = input.active_dir().map_or((0, 0), Dir::delta);
            if let Err(err) = game.play(dx, dy) {
                warn!("step rejected: {err}");
            }
            render(stdout, game, &mut renderer)?;
            if game.is_finished() {
                return render_game_over(stdout, game);
            }
        } else {
            render(stdout, game, &mut renderer)?;
        }

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

/// Where the board sits on screen: the HUD goes on `top`, the first board
/// row on `top + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    left: u16,
    top: u16,
}

impl Layout {
    /// Centres a `size`-cell board in the current terminal.
    fn centred(size: usize) -> io::Result<Result<Layout, String>> {
        Ok(Layout::fit(size, terminal::size()?))
    }

    /// `Err` carries the notice shown when the board does not fit.
    fn fit(size: usize, (term_w, term_h): (u16, u16)) -> Result<Layout, String> {
        let needed_w = (size * CELL_W) as u16;
        let needed_h = size as u16 + 2;
        if term_w < needed_w || term_h < needed_h {
            return Err(format!(
                "Terminal too small: the board needs {needed_w}x{needed_h}, have {term_w}x{term_h}."
            ));
        }
        Ok(Layout {
            left: (term_w - needed_w) / 2,
            top: (term_h - needed_h) / 2,
        })
    }

    fn cell(self, x: usize, y: usize) -> (u16, u16) {
        (self.left + (x * CELL_W) as u16, self.top + 1 + y as u16)
    }
}

fn render<S: LevelSource>(
    stdout: &mut Stdout,
    game: &Game<S>,
    renderer: &mut Renderer,
) -> io::Result<()> {
    let size = game.size();
    renderer.fit(size);
    let layout = match Layout::centred(size)? {
        Ok(layout) => layout,
        Err(message) => {
            queue!(stdout, Clear(ClearType::All), MoveTo(0, 0), Print(message))?;
            renderer.needs_full = true;
            return stdout.flush();
        }
    };
    if renderer.layout != Some(layout) {
        renderer.layout = Some(layout);
        renderer.needs_full = true;
    }
    if renderer.needs_full {
        stdout.queue(Clear(ClearType::All))?;
    }

    let hud = format!("{}  Power: {}  (q to quit)", game.score(), game.power_remaining());
    if renderer.needs_full || hud != renderer.last_hud {
        queue!(
            stdout,
            MoveTo(0, layout.top),
            Clear(ClearType::CurrentLine),
            MoveTo(layout.left, layout.top),
            PrintStyledContent(style(hud.as_str()).with(Color::White)),
        )?;
        renderer.last_hud = hud;
    }

    for idx in 0..size * size {
        let (x, y) = (idx % size, idx / size);
        let drawn = drawn_for(game, x, y);
        if renderer.needs_full || drawn != renderer.last[idx] {
            renderer.last[idx] = drawn;
            draw_cell(stdout, layout.cell(x, y), drawn)?;
        }
    }
    renderer.needs_full = false;

    stdout.flush()
}

fn drawn_for<S: LevelSource>(game: &Game<S>, x: usize, y: usize) -> Drawn {
    let cell = game.cell(x, y);
    let (glyph, color) = if cell.has_player() {
        (Glyph::Player, Color::Yellow)
    } else if cell.ghost().is_some() && game.has_super_power() {
        (Glyph::Frightened, Color::Blue)
    } else if cell.ghost().is_some() {
        (Glyph::Ghost, Color::Red)
    } else if cell.is_wall() {
        (Glyph::Wall, Color::Blue)
    } else {
        let power_name = game
            .config()
            .power_fruit
            .and_then(|key| game.level().catalog().get(&key))
            .map(|fruit| fruit.name.as_str());
        match cell.fruit() {
            Some(name) if Some(name) == power_name => (Glyph::Power, Color::Magenta),
            Some(_) => (Glyph::Fruit, Color::White),
            None => return BLANK,
        }
    };
    Drawn { glyph, color }
}

/// Prints one glyph at `(col, row)`, padded to the cell width.
fn draw_cell(stdout: &mut Stdout, (col, row): (u16, u16), drawn: Drawn) -> io::Result<()> {
    let text = drawn.glyph.text();
    let pad = CELL_W.saturating_sub(text.width());
    queue!(
        stdout,
        MoveTo(col, row),
        PrintStyledContent(style(format!("{text}{}", " ".repeat(pad))).with(drawn.color)),
    )
}

/// Just below the board, or below the size notice when the board does not fit.
fn banner_position(layout: Result<Layout, String>, size: usize) -> (u16, u16) {
    match layout {
        Ok(layout) => layout.cell(0, size),
        Err(_) => (0, 1),
    }
}

fn render_game_over<S: LevelSource>(stdout: &mut Stdout, game: &Game<S>) -> io::Result<()> {
    let banner = match game.phase() {
        Phase::AllLevelsComplete => "ALL LEVELS COMPLETE",
        _ => "GAME OVER",
    };
    // The terminal may have been resized since the last frame.
    let at = banner_position(Layout::centred(game.size())?, game.size());
    queue!(
        stdout,
        MoveTo(at.0, at.1),
        Print(format!(
            "{banner} - Final Score: {} (press q to quit)",
            game.score().points()
        )),
    )?;
    stdout.flush()?;
    loop {
        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press
                && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
            {
                return Ok(());
            }
        }
    }
}
