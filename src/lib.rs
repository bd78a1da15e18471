//! Grid snake with three difficulty levels, a background obstacle mutator
//! and a JSON score history.

pub mod board;
pub mod config;
pub mod game;
pub mod menu;
pub mod obstacles;
pub mod snake;
pub mod store;
pub mod term;

use std::fmt;

/// A cell on the game grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    /// No obstacles, the snake wraps around the edges.
    Easy = 1,
    /// The grid border is lined with obstacles.
    Medium = 2,
    /// Obstacles are relocated every few seconds.
    Hard = 3,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Easy, Level::Medium, Level::Hard];

    pub fn from_number(n: i64) -> Option<Level> {
        match n {
            1 => Some(Level::Easy),
            2 => Some(Level::Medium),
            3 => Some(Level::Hard),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        self as u8
    }

    /// Name used in menus and as the key of the score store.
    pub fn name(self) -> &'static str {
        match self {
            Level::Easy => "Easy",
            Level::Medium => "Medium",
            Level::Hard => "Hard",
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::Easy
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
