//! Square board geometry and move notation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Row labels, one letter per row (A = 0)
const ROW_LABELS: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Column labels, one hex digit per column (0 = 0)
const COL_LABELS: &[u8; 16] = b"0123456789abcdef";

/// Characters accepted between the two halves of a typed move
const SEPARATORS: &[char] = &[' ', ',', '.', ':', ';', '-', '_'];

/// Largest row count the notation can address
pub const MAX_ROWS: i8 = 26;

/// Largest column count the notation can address
pub const MAX_COLS: i8 = 16;

/// Board cell coordinate (row, col)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: i8,
    pub col: i8,
}

impl Coord {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    /// Check if this coordinate lies on a `dim x dim` board
    pub fn is_valid(&self, dim: u8) -> bool {
        let dim = dim as i8;
        self.row >= 0 && self.row < dim && self.col >= 0 && self.col < dim
    }

    /// The four orthogonal neighbours: up, left, down, right.
    ///
    /// Neighbours may fall off the board; callers filter with [`Coord::is_valid`].
    pub fn iter_adjacent(&self) -> impl Iterator<Item = Coord> {
        let Coord { row, col } = *self;
        [
            Coord::new(row - 1, col),
            Coord::new(row, col - 1),
            Coord::new(row + 1, col),
            Coord::new(row, col + 1),
        ]
        .into_iter()
    }

    /// Every cell of the square box of radius `dist` centred here, centre included
    pub fn iter_range(&self, dist: i8) -> impl Iterator<Item = Coord> {
        let Coord { row, col } = *self;
        (row - dist..=row + dist)
            .flat_map(move |r| (col - dist..=col + dist).map(move |c| Coord::new(r, c)))
    }

    /// Whether `other` is one of the four orthogonal neighbours
    pub fn is_adjacent(&self, other: Coord) -> bool {
        self.iter_adjacent().any(|c| c == other)
    }

    /// Manhattan distance between two cells
    pub fn distance_to(&self, other: Coord) -> i32 {
        (self.row as i32 - other.row as i32).abs() + (self.col as i32 - other.col as i32).abs()
    }

    /// Parse two-character notation such as `D2`.
    ///
    /// The row letter and column digit are case-insensitive. Returns `None`
    /// for any other length or for characters outside the addressable range.
    pub fn parse(s: &str) -> Option<Coord> {
        let s = strip_separators(s);
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        Self::from_bytes(bytes[0], bytes[1])
    }

    fn from_bytes(row: u8, col: u8) -> Option<Coord> {
        let row = ROW_LABELS
            .iter()
            .position(|&b| b == row.to_ascii_uppercase())?;
        let col = COL_LABELS
            .iter()
            .position(|&b| b == col.to_ascii_lowercase())?;
        Some(Coord::new(row as i8, col as i8))
    }

    fn row_label(&self) -> char {
        usize::try_from(self.row)
            .ok()
            .and_then(|i| ROW_LABELS.get(i))
            .map_or('?', |&b| b as char)
    }

    fn col_label(&self) -> char {
        usize::try_from(self.col)
            .ok()
            .and_then(|i| COL_LABELS.get(i))
            .map_or('?', |&b| b as char)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row_label(), self.col_label())
    }
}

/// Column header label for a board rendering
pub(crate) fn col_label(col: i8) -> char {
    Coord::new(0, col).col_label()
}

/// Row label for a board rendering
pub(crate) fn row_label(row: i8) -> char {
    Coord::new(row, 0).row_label()
}

fn strip_separators(s: &str) -> String {
    s.trim().chars().filter(|c| !SEPARATORS.contains(c)).collect()
}

/// A move: source and destination cell.
///
/// `src == dst` targets the unit itself (self-destruct).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub src: Coord,
    pub dst: Coord,
}

impl Move {
    pub const fn new(src: Coord, dst: Coord) -> Self {
        Self { src, dst }
    }

    /// Parse a typed move such as `D2 D3`, `d2-d3` or `D2D3`
    pub fn parse(s: &str) -> Option<Move> {
        let s = strip_separators(s);
        let bytes = s.as_bytes();
        if bytes.len() != 4 {
            return None;
        }
        let src = Coord::from_bytes(bytes[0], bytes[1])?;
        let dst = Coord::from_bytes(bytes[2], bytes[3])?;
        Some(Move::new(src, dst))
    }

    pub fn is_self_target(&self) -> bool {
        self.src == self.dst
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.src, self.dst)
    }
}
