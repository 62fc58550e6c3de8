//! The school map: a 5x5 grid of corridors with one room per opponent.
//!
//! Rows grow southwards and columns eastwards. The player starts in the
//! middle. Each room fires its encounter once and is then retired.

use clash_core::LocationId;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::str::FromStr;

pub const GRID_SIZE: usize = 5;

const START: (usize, usize) = (2, 2);

const ROOMS: [((usize, usize), char); 7] = [
    ((0, 0), 'J'),
    ((0, 4), 'R'),
    ((2, 0), 'H'),
    ((2, 4), 'V'),
    ((4, 0), 'D'),
    ((4, 4), 'M'),
    ((3, 3), 'L'),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "n" | "north" | "up" => Ok(Direction::North),
            "s" | "south" | "down" => Ok(Direction::South),
            "e" | "east" | "right" => Ok(Direction::East),
            "w" | "west" | "left" => Ok(Direction::West),
            other => Err(format!("unknown direction '{other}' (use n, s, e or w)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Room {
    pub code: char,
    pub location: LocationId,
}

#[derive(Debug, Clone)]
pub struct SchoolMap {
    rooms: BTreeMap<(usize, usize), Room>,
    position: (usize, usize),
}

impl Default for SchoolMap {
    fn default() -> Self {
        Self::new()
    }
}

impl SchoolMap {
    pub fn new() -> Self {
        let rooms = ROOMS
            .iter()
            .map(|&(cell, code)| {
                (
                    cell,
                    Room {
                        code,
                        location: LocationId::new(),
                    },
                )
            })
            .collect();
        Self {
            rooms,
            position: START,
        }
    }

    pub fn position(&self) -> (usize, usize) {
        self.position
    }

    /// Move one cell. Walking into the edge leaves the player in place.
    ///
    /// Returns the room on the new cell, if there is one.
    pub fn step(&mut self, direction: Direction) -> Option<Room> {
        let (row, col) = self.position;
        self.position = match direction {
            Direction::North => (row.saturating_sub(1), col),
            Direction::South => ((row + 1).min(GRID_SIZE - 1), col),
            Direction::West => (row, col.saturating_sub(1)),
            Direction::East => (row, (col + 1).min(GRID_SIZE - 1)),
        };
        self.rooms.get(&self.position).copied()
    }

    /// Draw the grid. Retired rooms render as empty corridor.
    pub fn render(&self, is_consumed: impl Fn(LocationId) -> bool) -> String {
        let mut out = String::new();
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                let cell = if self.position == (row, col) {
                    'P'
                } else {
                    match self.rooms.get(&(row, col)) {
                        Some(room) if !is_consumed(room.location) => room.code,
                        _ => ' ',
                    }
                };
                let _ = write!(out, "[{cell}]");
            }
            out.push('\n');
        }
        out
    }
}
