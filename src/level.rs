use std::collections::BTreeMap;
use std::fmt;

/// Board character marking a wall cell.
pub const WALL: char = 'w';

/// Element name that places the player rather than a ghost.
pub const PLAYER_NAME: &str = "pacman";

/// A board cell, `x` is the column and `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// The cell `(x + dx, y + dy)` if it lies on a `size` x `size` board.
    pub fn offset(self, dx: i32, dy: i32, size: usize) -> Option<Pos> {
        let nx = self.x as isize + dx as isize;
        let ny = self.y as isize + dy as isize;
        if nx < 0 || ny < 0 {
            return None;
        }
        let (nx, ny) = (nx as usize, ny as usize);
        if nx >= size || ny >= size {
            return None;
        }
        Some(Pos { x: nx, y: ny })
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A catalog entry: what a board key stands for and what it is worth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fruit {
    pub key: char,
    pub name: String,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementKind {
    Player,
    Ghost(String),
}

/// Starting cell of the player or of one ghost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub kind: ElementKind,
    pub position: Pos,
}

impl Element {
    /// Element name as written in a level file.
    pub fn name(&self) -> &str {
        match &self.kind {
            ElementKind::Player => PLAYER_NAME,
            ElementKind::Ghost(name) => name,
        }
    }
}

/// One immutable level: a square board, its fruit catalog, the starting
/// elements and free-form properties.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Level {
    rows: Vec<Vec<char>>,
    catalog: BTreeMap<char, Fruit>,
    elements: Vec<Element>,
    properties: BTreeMap<String, String>,
}

impl Level {
    pub(crate) fn new(
        rows: Vec<Vec<char>>,
        catalog: BTreeMap<char, Fruit>,
        elements: Vec<Element>,
        properties: BTreeMap<String, String>,
    ) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == rows.len()));
        Self {
            rows,
            catalog,
            elements,
            properties,
        }
    }

    /// Zero-sized level with nothing on it, used in place of a level file
    /// that could not be loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn is_wall(&self, pos: Pos) -> bool {
        self.key_at(pos) == WALL
    }

    /// Raw board character at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is outside the board.
    pub fn key_at(&self, pos: Pos) -> char {
        assert!(
            pos.x < self.size() && pos.y < self.size(),
            "cell {pos} is outside the {0}x{0} board",
            self.size()
        );
        self.rows[pos.y][pos.x]
    }

    /// Fruit initially placed at `pos`, if the cell's key is in the catalog.
    pub fn fruit_at(&self, pos: Pos) -> Option<&Fruit> {
        let key = self.key_at(pos);
        if key == WALL {
            return None;
        }
        self.catalog.get(&key)
    }

    pub fn catalog(&self) -> &BTreeMap<char, Fruit> {
        &self.catalog
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn player_start(&self) -> Option<Pos> {
        self.elements
            .iter()
            .find(|e| e.kind == ElementKind::Player)
            .map(|e| e.position)
    }

    /// Ghost names with their starting cells, in file order.
    pub fn ghost_starts(&self) -> impl Iterator<Item = (&str, Pos)> {
        self.elements.iter().filter_map(|e| match &e.kind {
            ElementKind::Ghost(name) => Some((name.as_str(), e.position)),
            ElementKind::Player => None,
        })
    }

    /// Every cell holding a fruit at the start of the level.
    pub fn fruit_cells(&self) -> impl Iterator<Item = Pos> + '_ {
        let size = self.size();
        (0..size)
            .flat_map(move |y| (0..size).map(move |x| Pos { x, y }))
            .filter(|pos| self.fruit_at(*pos).is_some())
    }
}

/// Writes the level back in the four-section file format.
impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# board")?;
        for row in &self.rows {
            writeln!(f, "{}", row.iter().collect::<String>())?;
        }
        writeln!(f, "# elements")?;
        for element in &self.elements {
            writeln!(
                f,
                "{},{},{}",
                element.name(),
                element.position.x,
                element.position.y
            )?;
        }
        writeln!(f, "# fruits")?;
        for fruit in self.catalog.values() {
            writeln!(f, "{},{},{}", fruit.key, fruit.name, fruit.value)?;
        }
        writeln!(f, "# properties")?;
        for (key, value) in &self.properties {
            writeln!(f, "{key}={value}")?;
        }
        Ok(())
    }
}
