//! Level file reader.
//!
//! A level file has four sections, each opened by a line starting with `#`:
//!
//! ```text
//! # board
//! www
//! wFw
//! w.w
//! # elements
//! pacman,1,2
//! # fruits
//! F,cherry,10
//! # properties
//! power.duration=20
//! ```
//!
//! Blank lines are ignored everywhere; line numbers in errors count every
//! physical line of the file.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{LevelError, ParseError};
use crate::level::{Element, ElementKind, Fruit, Level, Pos, PLAYER_NAME, WALL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Section {
    Preamble,
    Board,
    Elements,
    Fruits,
    Properties,
}

impl Section {
    fn next(self) -> Option<Section> {
        match self {
            Section::Preamble => Some(Section::Board),
            Section::Board => Some(Section::Elements),
            Section::Elements => Some(Section::Fruits),
            Section::Fruits => Some(Section::Properties),
            Section::Properties => None,
        }
    }
}

/// Reads and parses the level file at `path`.
pub fn load_level(path: &Path) -> Result<Level, LevelError> {
    let text = fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_level(&text).map_err(|source| LevelError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses a complete level description.
pub fn parse_level(text: &str) -> Result<Level, ParseError> {
    let mut section = Section::Preamble;
    let mut rows: Vec<(usize, Vec<char>)> = Vec::new();
    let mut elements: Vec<(usize, Element)> = Vec::new();
    let mut catalog = BTreeMap::new();
    let mut properties = BTreeMap::new();
    let mut elements_header = None;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with('#') {
            section = section.next().ok_or_else(|| {
                ParseError::new(line_no, "unexpected section header after the properties")
            })?;
            if section == Section::Elements {
                elements_header = Some(line_no);
            }
            continue;
        }
        match section {
            Section::Preamble => {
                return Err(ParseError::new(
                    line_no,
                    format!("the line \"{line}\" comes before the first section header"),
                ));
            }
            Section::Board => rows.push((line_no, line.chars().collect())),
            Section::Elements => elements.push((line_no, parse_element(line.trim(), line_no)?)),
            Section::Fruits => {
                let fruit = parse_fruit(line.trim(), line_no)?;
                match catalog.entry(fruit.key) {
                    Entry::Occupied(_) => {
                        return Err(ParseError::new(
                            line_no,
                            format!("the fruit key '{}' is already defined", fruit.key),
                        ));
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(fruit);
                    }
                }
            }
            Section::Properties => {
                let (key, value) = parse_property(line.trim(), line_no)?;
                properties.insert(key, value);
            }
        }
    }

    let size = rows.len();
    for (line_no, row) in &rows {
        if row.len() != size {
            return Err(ParseError::new(
                *line_no,
                format!(
                    "the line \"{}\" contains {} characters, should be {}",
                    row.iter().collect::<String>(),
                    row.len(),
                    size
                ),
            ));
        }
    }
    let rows: Vec<Vec<char>> = rows.into_iter().map(|(_, row)| row).collect();
    check_elements(&rows, &elements)?;
    if size > 0 && !elements.iter().any(|(_, e)| e.kind == ElementKind::Player) {
        let line_no = elements_header.unwrap_or_else(|| text.lines().count());
        return Err(ParseError::new(line_no, "the level has no pacman element"));
    }

    Ok(Level::new(
        rows,
        catalog,
        elements.into_iter().map(|(_, element)| element).collect(),
        properties,
    ))
}

fn split_fields(
    line: &str,
    line_no: usize,
    separator: char,
    expected: usize,
) -> Result<Vec<&str>, ParseError> {
    let fields: Vec<&str> = line.split(separator).map(str::trim).collect();
    if fields.len() != expected {
        return Err(ParseError::new(
            line_no,
            format!(
                "the line \"{line}\" contains {} fields, should be {expected}",
                fields.len()
            ),
        ));
    }
    Ok(fields)
}

/// `name,x,y`
fn parse_element(line: &str, line_no: usize) -> Result<Element, ParseError> {
    let fields = split_fields(line, line_no, ',', 3)?;
    let name = fields[0];
    if name.is_empty() {
        return Err(ParseError::new(
            line_no,
            format!("the line \"{line}\" contains an empty name"),
        ));
    }
    let x = parse_coordinate(fields[1], line, line_no)?;
    let y = parse_coordinate(fields[2], line, line_no)?;

    let kind = if name == PLAYER_NAME {
        ElementKind::Player
    } else {
        ElementKind::Ghost(name.to_string())
    };
    Ok(Element {
        kind,
        position: Pos::new(x, y),
    })
}

fn parse_coordinate(field: &str, line: &str, line_no: usize) -> Result<usize, ParseError> {
    let value: i64 = field.parse().map_err(|_| {
        ParseError::new(
            line_no,
            format!("the line \"{line}\" contains an invalid coordinate: \"{field}\""),
        )
    })?;
    usize::try_from(value).map_err(|_| {
        ParseError::new(
            line_no,
            format!(
                "the line \"{line}\" contains an invalid value: {value}, x and y should be greater or equal to 0"
            ),
        )
    })
}

/// `key,name,value`
fn parse_fruit(line: &str, line_no: usize) -> Result<Fruit, ParseError> {
    let fields = split_fields(line, line_no, ',', 3)?;
    let mut key_chars = fields[0].chars();
    let key = match (key_chars.next(), key_chars.next()) {
        (Some(key), None) if key != WALL => key,
        (Some(WALL), None) => {
            return Err(ParseError::new(
                line_no,
                format!("the line \"{line}\" uses the wall character '{WALL}' as a fruit key"),
            ));
        }
        _ => {
            return Err(ParseError::new(
                line_no,
                format!("the line \"{line}\" should start with a single character key"),
            ));
        }
    };
    let name = fields[1];
    if name.is_empty() {
        return Err(ParseError::new(
            line_no,
            format!("the line \"{line}\" contains an empty name"),
        ));
    }
    let value: i64 = fields[2].parse().map_err(|_| {
        ParseError::new(
            line_no,
            format!("the line \"{line}\" contains an invalid value: \"{}\"", fields[2]),
        )
    })?;
    if value <= 0 {
        return Err(ParseError::new(
            line_no,
            format!("the line \"{line}\" contains an invalid value: {value}, should be greater than 0"),
        ));
    }
    let value = u32::try_from(value).map_err(|_| {
        ParseError::new(
            line_no,
            format!("the line \"{line}\" contains a value too large: {value}"),
        )
    })?;
    Ok(Fruit {
        key,
        name: name.to_string(),
        value,
    })
}

/// `key=value`
fn parse_property(line: &str, line_no: usize) -> Result<(String, String), ParseError> {
    let fields = split_fields(line, line_no, '=', 2)?;
    if fields[0].is_empty() {
        return Err(ParseError::new(
            line_no,
            format!("the line \"{line}\" contains an empty property name"),
        ));
    }
    Ok((fields[0].to_string(), fields[1].to_string()))
}

/// Elements must start on a floor cell; there is at most one player and
/// ghost names are unique.
fn check_elements(
    rows: &[Vec<char>],
    elements: &[(usize, Element)],
) -> Result<(), ParseError> {
    let size = rows.len();
    let mut player_seen = false;
    let mut ghost_names = Vec::new();
    for (line_no, element) in elements {
        let Pos { x, y } = element.position;
        if x >= size || y >= size {
            return Err(ParseError::new(
                *line_no,
                format!(
                    "{} starts at {} outside the {size}x{size} board",
                    element.name(),
                    element.position
                ),
            ));
        }
        if rows[y][x] == WALL {
            return Err(ParseError::new(
                *line_no,
                format!("{} starts on a wall at {}", element.name(), element.position),
            ));
        }
        match &element.kind {
            ElementKind::Player if player_seen => {
                return Err(ParseError::new(*line_no, "pacman is placed more than once"));
            }
            ElementKind::Player => player_seen = true,
            ElementKind::Ghost(name) => {
                if ghost_names.contains(&name.as_str()) {
                    return Err(ParseError::new(
                        *line_no,
                        format!("the ghost \"{name}\" is placed more than once"),
                    ));
                }
                ghost_names.push(name.as_str());
            }
        }
    }
    Ok(())
}
