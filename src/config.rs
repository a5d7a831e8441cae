use std::str::FromStr;
use std::time::Duration;

use log::warn;

use crate::level::Level;

pub const DEFAULT_POWER_TICKS: u32 = 30;
pub const DEFAULT_GHOST_BONUS: u32 = 200;
pub const DEFAULT_WAIT_MS: u64 = 150;

/// Fruit names recognised as the power fruit when `power.fruit` is not set.
const POWER_FRUIT_NAMES: [&str; 3] = ["supergum", "super gum", "power"];

/// Tuning values read from a level's properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelConfig {
    /// Catalog key of the fruit that grants the power, if any.
    pub power_fruit: Option<char>,
    /// Number of `play` steps the power lasts.
    pub power_ticks: u32,
    /// Points for catching a ghost while the power is active.
    pub ghost_bonus: u32,
    /// Minimum delay between two `play` calls.
    pub wait: Duration,
    /// Seed for ghost tie-breaking.
    pub seed: u64,
}

impl LevelConfig {
    /// Reads the properties of `level`, which is level number `number` of the
    /// session. Missing or invalid values fall back to defaults.
    pub fn from_level(level: &Level, number: u32) -> Self {
        Self {
            power_fruit: power_fruit(level),
            power_ticks: positive(level, "power.duration").unwrap_or(DEFAULT_POWER_TICKS),
            ghost_bonus: property(level, "ghost.bonus").unwrap_or(DEFAULT_GHOST_BONUS),
            wait: Duration::from_millis(positive(level, "wait").unwrap_or(DEFAULT_WAIT_MS)),
            seed: property(level, "seed").unwrap_or(u64::from(number)),
        }
    }
}

fn property<T: FromStr>(level: &Level, key: &str) -> Option<T> {
    let raw = level.property(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring property {key}={raw}: not a valid number");
            None
        }
    }
}

fn positive<T: FromStr + PartialEq + Default>(level: &Level, key: &str) -> Option<T> {
    let value = property(level, key)?;
    if value == T::default() {
        warn!("ignoring property {key}=0: must be greater than 0");
        return None;
    }
    Some(value)
}

fn power_fruit(level: &Level) -> Option<char> {
    if let Some(raw) = level.property("power.fruit") {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(key), None) if level.catalog().contains_key(&key) => return Some(key),
            _ => warn!("ignoring property power.fruit={raw}: not a fruit key of this level"),
        }
    }
    level
        .catalog()
        .values()
        .find(|fruit| {
            let name = fruit.name.to_lowercase();
            POWER_FRUIT_NAMES.contains(&name.as_str())
        })
        .map(|fruit| fruit.key)
}
