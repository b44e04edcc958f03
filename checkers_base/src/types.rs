use std::fmt::{self, Display};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum SquareParseError {
    #[error("unexpected row char {0:?}")]
    UnexpectedRowChar(char),
    #[error("unexpected column char {0:?}")]
    UnexpectedColChar(char),
    #[error("invalid string length")]
    BadLength,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CellParseError {
    #[error("unexpected cell char {0:?}")]
    UnexpectedChar(char),
    #[error("invalid string length")]
    BadLength,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlayerParseError {
    #[error("unexpected player char {0:?}")]
    UnexpectedChar(char),
    #[error("invalid string length")]
    BadLength,
}

/// One of the two sides
///
/// Player one starts on rows 6 to 8 and moves towards row 1; player two starts on rows 1 to 3
/// and moves towards row 8.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Player {
    One = 0,
    Two = 1,
}

impl Player {
    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    /// Returns the human-facing player number, i.e. `1` or `2`
    pub const fn number(&self) -> u8 {
        *self as u8 + 1
    }

    pub const fn inv(&self) -> Player {
        match *self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        [Player::One, Player::Two].into_iter()
    }

    pub fn as_char(&self) -> char {
        (b'0' + self.number()) as char
    }

    pub fn from_char(c: char) -> Option<Player> {
        match c {
            '1' => Some(Player::One),
            '2' => Some(Player::Two),
            _ => None,
        }
    }
}

impl Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Player {
    type Err = PlayerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 1 {
            return Err(PlayerParseError::BadLength);
        }
        let ch = s.as_bytes()[0] as char;
        Player::from_char(ch).ok_or(PlayerParseError::UnexpectedChar(ch))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Piece {
    Man,
    King,
}

/// Contents of a single playable square
#[derive(Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(Player, Piece),
}

impl Cell {
    pub const EMPTY: Cell = Cell::Empty;
    pub const COUNT: usize = 5;

    pub const fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub const fn is_occupied(&self) -> bool {
        !self.is_empty()
    }

    pub const fn from_parts(p: Player, piece: Piece) -> Cell {
        Cell::Occupied(p, piece)
    }

    pub const fn player(&self) -> Option<Player> {
        match *self {
            Cell::Empty => None,
            Cell::Occupied(p, _) => Some(p),
        }
    }

    pub const fn piece(&self) -> Option<Piece> {
        match *self {
            Cell::Empty => None,
            Cell::Occupied(_, piece) => Some(piece),
        }
    }

    pub const fn is_king(&self) -> bool {
        matches!(self, Cell::Occupied(_, Piece::King))
    }

    /// Returns the cell code used by the serialized board: `0` is empty, `1` and `2` are men of
    /// player one and two, `3` and `4` are their kings
    pub const fn index(&self) -> usize {
        match *self {
            Cell::Empty => 0,
            Cell::Occupied(p, Piece::Man) => 1 + p.index(),
            Cell::Occupied(p, Piece::King) => 3 + p.index(),
        }
    }

    pub const fn from_index(val: usize) -> Cell {
        match val {
            0 => Cell::Empty,
            1 => Cell::Occupied(Player::One, Piece::Man),
            2 => Cell::Occupied(Player::Two, Piece::Man),
            3 => Cell::Occupied(Player::One, Piece::King),
            4 => Cell::Occupied(Player::Two, Piece::King),
            _ => panic!("cell index must be between 0 and 4"),
        }
    }

    pub fn try_from_index(val: usize) -> Option<Cell> {
        (val < Self::COUNT).then(|| Self::from_index(val))
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        (0..Self::COUNT).map(Self::from_index)
    }

    pub fn as_char(&self) -> char {
        (b'0' + self.index() as u8) as char
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0'..='4' => Some(Self::from_index((c as u8 - b'0') as usize)),
            _ => None,
        }
    }

    /// Returns the character used for human-readable board diagrams
    pub fn as_pretty_char(&self) -> char {
        match *self {
            Cell::Empty => '.',
            Cell::Occupied(Player::One, Piece::Man) => 'b',
            Cell::Occupied(Player::Two, Piece::Man) => 'r',
            Cell::Occupied(Player::One, Piece::King) => 'B',
            Cell::Occupied(Player::Two, Piece::King) => 'R',
        }
    }

    pub fn as_utf8_char(&self) -> char {
        match *self {
            Cell::Empty => '.',
            Cell::Occupied(Player::One, Piece::Man) => '⛂',
            Cell::Occupied(Player::Two, Piece::Man) => '⛀',
            Cell::Occupied(Player::One, Piece::King) => '⛃',
            Cell::Occupied(Player::Two, Piece::King) => '⛁',
        }
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Cell({})", self.as_pretty_char())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Cell {
    type Err = CellParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 1 {
            return Err(CellParseError::BadLength);
        }
        let ch = s.as_bytes()[0] as char;
        Cell::from_char(ch).ok_or(CellParseError::UnexpectedChar(ch))
    }
}

/// Displacement between two squares, in rows and columns
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Delta {
    pub row: i8,
    pub col: i8,
}

impl Delta {
    pub const fn new(row: i8, col: i8) -> Delta {
        Delta { row, col }
    }

    pub const fn scaled(self, n: i8) -> Delta {
        Delta {
            row: self.row * n,
            col: self.col * n,
        }
    }

    pub const fn is_diagonal(&self) -> bool {
        self.row != 0 && self.row.abs() == self.col.abs()
    }
}

/// The four diagonal unit vectors, in move generation order
pub const DIAGONALS: [Delta; 4] = [
    Delta::new(-1, -1),
    Delta::new(-1, 1),
    Delta::new(1, -1),
    Delta::new(1, 1),
];

/// Square on the 8x8 grid
///
/// Rows and columns are numbered from 1 to 8. Only squares with odd `row + col` are playable;
/// the 32 playable squares are numbered from 0 to 31 in row-major order.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    pub const PLAYABLE: usize = 32;

    pub const fn new(row: u8, col: u8) -> Square {
        assert!(
            row >= 1 && row <= 8 && col >= 1 && col <= 8,
            "row and column must be between 1 and 8"
        );
        Square { row, col }
    }

    pub const fn try_new(row: i32, col: i32) -> Option<Square> {
        if row < 1 || row > 8 || col < 1 || col > 8 {
            return None;
        }
        Some(Square {
            row: row as u8,
            col: col as u8,
        })
    }

    pub const fn row(&self) -> u8 {
        self.row
    }

    pub const fn col(&self) -> u8 {
        self.col
    }

    pub const fn is_playable(&self) -> bool {
        (self.row + self.col) % 2 == 1
    }

    pub const fn playable_index(&self) -> Option<usize> {
        if !self.is_playable() {
            return None;
        }
        Some((self.row as usize - 1) * 4 + (self.col as usize - 1) / 2)
    }

    /// Returns the index of the playable square
    ///
    /// # Panics
    ///
    /// The function panics if the square is not playable.
    pub const fn index(&self) -> usize {
        match self.playable_index() {
            Some(idx) => idx,
            None => panic!("square is not playable"),
        }
    }

    pub const fn from_index(val: usize) -> Square {
        assert!(val < Self::PLAYABLE, "playable index must be between 0 and 31");
        let row = val / 4 + 1;
        let col = 2 * (val % 4) + 1 + (row % 2);
        Square {
            row: row as u8,
            col: col as u8,
        }
    }

    pub const fn translate(self, delta: Delta) -> Option<Square> {
        Self::try_new(
            self.row as i32 + delta.row as i32,
            self.col as i32 + delta.col as i32,
        )
    }

    pub const fn delta_to(self, other: Square) -> Delta {
        Delta {
            row: other.row as i8 - self.row as i8,
            col: other.col as i8 - self.col as i8,
        }
    }

    /// Returns the square halfway between `self` and `other`, if it lies exactly on the grid
    pub const fn midpoint(self, other: Square) -> Option<Square> {
        let (rs, cs) = (self.row + other.row, self.col + other.col);
        if rs % 2 != 0 || cs % 2 != 0 {
            return None;
        }
        Some(Square {
            row: rs / 2,
            col: cs / 2,
        })
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        (1..=8).flat_map(|row| (1..=8).map(move |col| Square { row, col }))
    }

    pub fn iter_playable() -> impl Iterator<Item = Self> {
        (0..Self::PLAYABLE).map(Self::from_index)
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Square({}, {})", self.row, self.col)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.row, self.col)
    }
}

impl FromStr for Square {
    type Err = SquareParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 2 {
            return Err(SquareParseError::BadLength);
        }
        let bytes = s.as_bytes();
        let (row_ch, col_ch) = (bytes[0] as char, bytes[1] as char);
        let row = match row_ch {
            '1'..='8' => row_ch as u8 - b'0',
            _ => return Err(SquareParseError::UnexpectedRowChar(row_ch)),
        };
        let col = match col_ch {
            '1'..='8' => col_ch as u8 - b'0',
            _ => return Err(SquareParseError::UnexpectedColChar(col_ch)),
        };
        Ok(Square::new(row, col))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum WinReason {
    /// The losing side had no legal moves on its turn
    NoMoves,
    /// The losing side had no pieces left
    NoPieces,
    Resign,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DrawReason {
    /// Too many consecutive moves without a capture while material stayed close
    QuietMoves,
    /// The game was stopped without a winner
    Abandoned,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Outcome {
    Win { side: Player, reason: WinReason },
    Draw(DrawReason),
}

impl Outcome {
    pub fn win(side: Player, reason: WinReason) -> Outcome {
        Outcome::Win { side, reason }
    }

    pub fn winner(&self) -> Option<Player> {
        match *self {
            Outcome::Win { side, .. } => Some(side),
            Outcome::Draw(_) => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        matches!(self, Outcome::Draw(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match *self {
            Outcome::Win { side, reason } => {
                let why = match reason {
                    WinReason::NoMoves => "opponent has no moves",
                    WinReason::NoPieces => "opponent has no pieces",
                    WinReason::Resign => "opponent resigns",
                };
                write!(f, "player {} wins ({})", side.number(), why)
            }
            Outcome::Draw(DrawReason::QuietMoves) => write!(f, "draw (no captures)"),
            Outcome::Draw(DrawReason::Abandoned) => write!(f, "draw (abandoned)"),
        }
    }
}
