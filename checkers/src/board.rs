//! Board and related things

use crate::bitboard::Bitboard;
use crate::codec::{self, CodecError};
use crate::generic;
use crate::geometry;
use crate::movegen::{self, MoveList};
use crate::moves::Make;
use crate::types::{self, Cell, Outcome, Piece, Player, Square, WinReason};

use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use thiserror::Error;

/// Maximum number of pieces of one player
pub const MAX_PIECES: u32 = 12;

/// Board validation error
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    /// Too many pieces of given player
    ///
    /// No more than 12 pieces of each player is allowed.
    #[error("too many pieces of player {0}")]
    TooManyPieces(Player),
    /// There is a man on the row where it must have been crowned
    #[error("uncrowned man at {0}")]
    UnpromotedMan(Square),
    /// The piece which must continue jumping doesn't exist or has no jumps
    #[error("invalid jumping piece at {0}")]
    InvalidJumper(Square),
}

/// Error parsing [`RawBoard`] from string
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum RawParseError {
    /// String contains non-ASCII characters
    #[error("non-ASCII data in board")]
    NonAscii,
    /// String length is neither 32 nor 33
    #[error("bad board length {0}")]
    BadLength(usize),
    /// Error parsing move side
    #[error("bad move side: {0}")]
    Side(#[from] types::PlayerParseError),
    /// Error parsing board cells
    #[error("bad cells: {0}")]
    Cells(#[from] CodecError),
}

/// Error parsing [`Board`] from string
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ParseError {
    /// Board cannot be parsed
    #[error("cannot parse board: {0}")]
    Raw(#[from] RawParseError),
    /// Board was parsed, but it's invalid
    #[error("invalid position: {0}")]
    Valid(#[from] ValidateError),
}

/// Number of pieces of a single player
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PieceCounts {
    /// All pieces, including kings
    pub pieces: u8,
    /// Kings only
    pub kings: u8,
}

/// Raw checkers board
///
/// Raw board contains all the necessary information about the position. But, unlike [`Board`],
/// it is not validated and may contain an invalid position.
///
/// Raw board can be used to build or edit the position programmatically. After changing the necessary
/// fields, it must be converted to [`Board`] via [`Board::try_from()`].
///
/// # Example
///
/// ```
/// # use owlcheckers::{RawBoard, Board, Cell, Piece, Player, Square};
/// #
/// let mut raw = RawBoard::empty();
/// raw.put(Square::new(5, 4), Cell::from_parts(Player::Two, Piece::Man));
/// raw.put(Square::new(4, 5), Cell::from_parts(Player::One, Piece::King));
/// raw.side = Player::Two;
///
/// let board: Board = raw.try_into().unwrap();
/// assert_eq!(board.to_string(), "200000000000000300200000000000000");
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RawBoard {
    /// Contents of the playable squares
    ///
    /// The indices in this array are the playable indices of squares. You might probably want to use
    /// the functions like [`RawBoard::get()`] or [`RawBoard::put()`] instead of indexing this array
    /// directly.
    pub cells: [Cell; Square::PLAYABLE],
    /// Side to move
    pub side: Player,
    /// Number of consecutive moves without a capture
    pub draw_counter: u16,
    /// Piece which captured on the previous move and must capture again
    ///
    /// If it is not `None`, the side to move is in the middle of a multi-jump and may only jump
    /// further with this piece.
    pub jumper: Option<Square>,
}

impl RawBoard {
    /// Returns an empty `RawBoard`
    ///
    /// Does the same as [`RawBoard::default()`], except that this function is `const`.
    #[inline]
    pub const fn empty() -> RawBoard {
        RawBoard {
            cells: [Cell::EMPTY; Square::PLAYABLE],
            side: Player::One,
            draw_counter: 0,
            jumper: None,
        }
    }

    /// Returns a board with the initial position
    ///
    /// Player two occupies rows 1 to 3, player one occupies rows 6 to 8, and player one moves first.
    pub fn initial() -> RawBoard {
        let mut res = RawBoard::empty();
        for player in Player::iter() {
            let (lo, hi) = geometry::home_rows(player);
            for sq in Bitboard::rows(lo, hi) {
                res.put(sq, Cell::from_parts(player, Piece::Man));
            }
        }
        res
    }

    /// Restores the board from its packed representation
    ///
    /// The packed value doesn't contain the side to move, so it must be given explicitly.
    pub fn from_packed(value: u128, side: Player) -> Result<RawBoard, CodecError> {
        Ok(RawBoard {
            cells: codec::unpack_cells(value)?,
            side,
            draw_counter: 0,
            jumper: None,
        })
    }

    /// Returns the contents of the square `sq`
    ///
    /// # Panics
    ///
    /// The function panics if `sq` is not playable.
    #[inline]
    pub fn get(&self, sq: Square) -> Cell {
        self.cells[sq.index()]
    }

    /// Puts `cell` to the square `sq`
    ///
    /// # Panics
    ///
    /// The function panics if `sq` is not playable.
    #[inline]
    pub fn put(&mut self, sq: Square, cell: Cell) {
        self.cells[sq.index()] = cell;
    }

    /// Counts the pieces of player `p` by scanning the board
    pub fn count(&self, p: Player) -> PieceCounts {
        let mut res = PieceCounts::default();
        for cell in &self.cells {
            if cell.player() == Some(p) {
                res.pieces += 1;
                if cell.is_king() {
                    res.kings += 1;
                }
            }
        }
        res
    }

    /// Packs the cells into an integer
    ///
    /// See [`codec`] for the details about the format.
    #[inline]
    pub fn pack(&self) -> u128 {
        codec::pack_cells(&self.cells)
    }

    /// Serializes the cells into a string of 32 digits
    #[inline]
    pub fn as_digits(&self) -> String {
        codec::serialize(self)
    }

    /// Wraps the board to allow pretty-printing with the given style `Style`
    ///
    /// The resulting wrapper implements [`fmt::Display`], so can be used with
    /// `write!()`, `println!()`, or `ToString::to_string`.
    ///
    /// Rows are printed from 1 to 8, so player two is at the top.
    #[inline]
    pub fn pretty(&self, style: PrettyStyle) -> Pretty<'_> {
        Pretty { raw: self, style }
    }
}

impl Default for RawBoard {
    #[inline]
    fn default() -> RawBoard {
        RawBoard::empty()
    }
}

/// Board that contains a valid position
///
/// It contains a [`RawBoard`] alongside with occupancy bitboards and piece counts, which are updated
/// incrementally on every move. The cached values always equal the ones obtained by scanning the
/// cells.
///
/// Cloning the board produces a fully independent copy, so it can be used to try moves without
/// touching the board it was cloned from.
#[derive(Debug, Clone)]
pub struct Board {
    pub(crate) r: RawBoard,
    pub(crate) colors: [Bitboard; 2],
    pub(crate) kings: Bitboard,
    pub(crate) counts: [PieceCounts; 2],
}

impl Board {
    fn from_raw_unchecked(raw: RawBoard) -> Board {
        let mut colors = [Bitboard::EMPTY; 2];
        let mut kings = Bitboard::EMPTY;
        for (idx, cell) in raw.cells.iter().enumerate() {
            if let Some(player) = cell.player() {
                let sq = Square::from_index(idx);
                colors[player.index()].set(sq);
                if cell.is_king() {
                    kings.set(sq);
                }
            }
        }
        let counts = [Player::One, Player::Two].map(|p| PieceCounts {
            pieces: colors[p.index()].len() as u8,
            kings: (colors[p.index()] & kings).len() as u8,
        });
        Board {
            r: raw,
            colors,
            kings,
            counts,
        }
    }

    /// Returns a board with the initial position
    pub fn initial() -> Board {
        Board::from_raw_unchecked(RawBoard::initial())
    }

    /// Restores the board from its packed representation
    pub fn from_packed(value: u128, side: Player) -> Result<Board, ParseError> {
        Ok(RawBoard::from_packed(value, side)
            .map_err(RawParseError::from)?
            .try_into()?)
    }

    /// Returns a view over the raw board
    #[inline]
    pub fn raw(&self) -> &RawBoard {
        &self.r
    }

    /// Returns the contents of the square `sq`
    #[inline]
    pub fn get(&self, sq: Square) -> Cell {
        self.r.get(sq)
    }

    /// Returns side to move
    #[inline]
    pub fn side(&self) -> Player {
        self.r.side
    }

    /// Returns the number of consecutive moves without a capture
    #[inline]
    pub fn draw_counter(&self) -> u16 {
        self.r.draw_counter
    }

    /// Returns the piece that must continue jumping, if any
    #[inline]
    pub fn jumper(&self) -> Option<Square> {
        self.r.jumper
    }

    /// Returns the bitboard over all the pieces of player `p`
    #[inline]
    pub fn color(&self, p: Player) -> Bitboard {
        self.colors[p.index()]
    }

    /// Returns the bitboard over all the kings of both players
    #[inline]
    pub fn kings(&self) -> Bitboard {
        self.kings
    }

    /// Returns the bitboard over all the occupied squares
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.colors[0] | self.colors[1]
    }

    /// Returns the piece counts of player `p`
    ///
    /// This function is quite fast, as it doesn't compute anything and just returns the
    /// stored value.
    #[inline]
    pub fn counts(&self, p: Player) -> PieceCounts {
        self.counts[p.index()]
    }

    #[inline]
    pub fn piece_count(&self, p: Player) -> u8 {
        self.counts[p.index()].pieces
    }

    #[inline]
    pub fn king_count(&self, p: Player) -> u8 {
        self.counts[p.index()].kings
    }

    /// Convenience alias for [`moves::Make::make`](crate::moves::Make::make)
    pub fn make_move<M: Make>(&self, m: M) -> Result<Self, M::Err> {
        m.make(self)
    }

    /// Returns all the legal moves for the side to move
    #[inline]
    pub fn legal_moves(&self) -> MoveList {
        movegen::legal_moves(self)
    }

    /// Returns `true` if the current side has at least one legal move
    #[inline]
    pub fn has_legal_moves(&self) -> bool {
        movegen::has_legal_moves(self)
    }

    /// Calculates the current outcome on the board
    ///
    /// The side to move loses if it has no pieces or no legal moves. Draws are not detected here,
    /// as the thresholds are a game policy. See [`DrawPolicy`](crate::chain::DrawPolicy).
    pub fn calc_outcome(&self) -> Option<Outcome> {
        let side = self.r.side;
        if self.piece_count(side) == 0 {
            return Some(Outcome::win(side.inv(), WinReason::NoPieces));
        }
        if !self.has_legal_moves() {
            return Some(Outcome::win(side.inv(), WinReason::NoMoves));
        }
        None
    }

    /// Packs the cells into an integer
    #[inline]
    pub fn pack(&self) -> u128 {
        self.r.pack()
    }

    /// Serializes the cells into a string of 32 digits
    #[inline]
    pub fn as_digits(&self) -> String {
        self.r.as_digits()
    }

    /// Wraps the board to allow pretty-printing with the given style `Style`
    ///
    /// See docs for [`RawBoard::pretty()`] for more usage details.
    #[inline]
    pub fn pretty(&self, style: PrettyStyle) -> Pretty<'_> {
        self.r.pretty(style)
    }
}

impl PartialEq for Board {
    #[inline]
    fn eq(&self, other: &Board) -> bool {
        self.r == other.r
    }
}

impl Eq for Board {}

impl Hash for Board {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.r.hash(state)
    }
}

fn do_validate<C: generic::Side>(b: &Board) -> Result<(), ValidateError> {
    if let Some(sq) = b.r.jumper {
        if !sq.is_playable()
            || b.get(sq).player() != Some(C::PLAYER)
            || !movegen::has_jumps_from(b, sq)
        {
            return Err(ValidateError::InvalidJumper(sq));
        }
    }
    Ok(())
}

impl TryFrom<RawBoard> for Board {
    type Error = ValidateError;

    fn try_from(raw: RawBoard) -> Result<Board, ValidateError> {
        let res = Board::from_raw_unchecked(raw);

        // Check TooManyPieces
        for player in Player::iter() {
            if res.color(player).len() > MAX_PIECES {
                return Err(ValidateError::TooManyPieces(player));
            }
        }

        // Check UnpromotedMan
        for player in Player::iter() {
            let row = geometry::promotion_row(player);
            let men = res.color(player) & !res.kings & Bitboard::rows(row, row);
            if let Some(sq) = men.into_iter().next() {
                return Err(ValidateError::UnpromotedMan(sq));
            }
        }

        // Check InvalidJumper
        match raw.side {
            Player::One => do_validate::<generic::One>(&res)?,
            Player::Two => do_validate::<generic::Two>(&res)?,
        };

        Ok(res)
    }
}

impl TryFrom<&RawBoard> for Board {
    type Error = ValidateError;

    fn try_from(raw: &RawBoard) -> Result<Board, ValidateError> {
        (*raw).try_into()
    }
}

impl FromStr for RawBoard {
    type Err = RawParseError;

    /// Parses the board from 32 digits, optionally prefixed with the side to move
    ///
    /// If the prefix is absent, player one is to move.
    fn from_str(s: &str) -> Result<RawBoard, Self::Err> {
        if !s.is_ascii() {
            return Err(RawParseError::NonAscii);
        }
        let (side, cells) = match s.len() {
            32 => (Player::One, s),
            33 => (Player::from_str(&s[..1])?, &s[1..]),
            len => return Err(RawParseError::BadLength(len)),
        };
        Ok(RawBoard {
            cells: codec::parse_cells(cells)?,
            side,
            draw_counter: 0,
            jumper: None,
        })
    }
}

impl FromStr for Board {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Board, Self::Err> {
        Ok(RawBoard::from_str(s)?.try_into()?)
    }
}

impl Display for RawBoard {
    /// Formats the board as 33 characters: the side to move followed by 32 cell digits
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.side)?;
        for cell in &self.cells {
            write!(f, "{}", cell)?;
        }
        Ok(())
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        self.r.fmt(f)
    }
}

/// Style for [`RawBoard::pretty()`] and [`Board::pretty()`]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PrettyStyle {
    /// Print pieces and frames as ASCII characters
    Ascii,
    /// Print pieces and frames as fancy Unicode characters
    Utf8,
}

/// Wrapper to pretty-print the board
///
/// See docs for [`RawBoard::pretty()`] for more details.
pub struct Pretty<'a> {
    raw: &'a RawBoard,
    style: PrettyStyle,
}

trait StyleTable {
    const HORZ_FRAME: char;
    const VERT_FRAME: char;
    const ANGLE_FRAME: char;
    const ONE_INDICATOR: char;
    const TWO_INDICATOR: char;

    fn cell(c: Cell) -> char;

    fn indicator(p: Player) -> char {
        match p {
            Player::One => Self::ONE_INDICATOR,
            Player::Two => Self::TWO_INDICATOR,
        }
    }

    fn fmt(r: &RawBoard, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for row in 1..=8 {
            write!(f, "{}{}", row, Self::VERT_FRAME)?;
            for col in 1..=8 {
                let sq = Square::new(row, col);
                match sq.is_playable() {
                    true => write!(f, "{}", Self::cell(r.get(sq)))?,
                    false => write!(f, " ")?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "{}{}", Self::HORZ_FRAME, Self::ANGLE_FRAME)?;
        for _ in 1..=8 {
            write!(f, "{}", Self::HORZ_FRAME)?;
        }
        writeln!(f)?;
        write!(f, "{}{}", Self::indicator(r.side), Self::VERT_FRAME)?;
        for col in 1..=8 {
            write!(f, "{}", col)?;
        }
        writeln!(f)?;
        Ok(())
    }
}

struct AsciiStyleTable;
struct Utf8StyleTable;

impl StyleTable for AsciiStyleTable {
    const HORZ_FRAME: char = '-';
    const VERT_FRAME: char = '|';
    const ANGLE_FRAME: char = '+';
    const ONE_INDICATOR: char = 'b';
    const TWO_INDICATOR: char = 'r';

    fn cell(c: Cell) -> char {
        c.as_pretty_char()
    }
}

impl StyleTable for Utf8StyleTable {
    const HORZ_FRAME: char = '─';
    const VERT_FRAME: char = '│';
    const ANGLE_FRAME: char = '┼';
    const ONE_INDICATOR: char = '●';
    const TWO_INDICATOR: char = '○';

    fn cell(c: Cell) -> char {
        c.as_utf8_char()
    }
}

impl<'a> Display for Pretty<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.style {
            PrettyStyle::Ascii => AsciiStyleTable::fmt(self.raw, f),
            PrettyStyle::Utf8 => Utf8StyleTable::fmt(self.raw, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Piece, WinReason};

    const INITIAL: &str = "122222222222200000000111111111111";

    #[test]
    fn test_initial() {
        assert_eq!(RawBoard::initial().to_string(), INITIAL);
        assert_eq!(Board::initial().to_string(), INITIAL);
        assert_eq!(RawBoard::from_str(INITIAL), Ok(RawBoard::initial()));
        assert_eq!(Board::from_str(&INITIAL[1..]), Ok(Board::initial()));

        let b = Board::initial();
        for p in Player::iter() {
            assert_eq!(b.piece_count(p), 12);
            assert_eq!(b.king_count(p), 0);
            assert_eq!(b.counts(p), b.raw().count(p));
        }
        assert_eq!(
            b.get(Square::new(6, 1)),
            Cell::from_parts(Player::One, Piece::Man)
        );
        assert_eq!(
            b.get(Square::new(3, 8)),
            Cell::from_parts(Player::Two, Piece::Man)
        );
        assert!(b.get(Square::new(4, 3)).is_empty());
        assert_eq!(b.calc_outcome(), None);
    }

    #[test]
    fn test_side_prefix() {
        assert_eq!(
            Board::from_str("322222222222200000000111111111111"),
            Err(ParseError::Raw(RawParseError::Side(
                types::PlayerParseError::UnexpectedChar('3')
            )))
        );
        let b = Board::from_str("200000000000000300200000000000000").unwrap();
        assert_eq!(b.side(), Player::Two);
        assert_eq!(
            b.get(Square::new(4, 5)),
            Cell::from_parts(Player::One, Piece::King)
        );
        assert_eq!(
            b.get(Square::new(5, 4)),
            Cell::from_parts(Player::Two, Piece::Man)
        );
        assert_eq!(b.king_count(Player::One), 1);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            RawBoard::from_str("1234"),
            Err(RawParseError::BadLength(4))
        );
        assert_eq!(
            RawBoard::from_str("52222222222220000000011111111111"),
            Err(RawParseError::Cells(CodecError::BadCell { pos: 0, digit: 5 }))
        );
        assert_eq!(
            RawBoard::from_str("1222222222222000000001111111111\u{e9}"),
            Err(RawParseError::NonAscii)
        );
        assert_eq!(
            RawBoard::from_str("122222222222200000000111111111119"),
            Err(RawParseError::Cells(CodecError::BadDigit { pos: 31, ch: '9' }))
        );
    }

    #[test]
    fn test_validate() {
        let mut raw = RawBoard::empty();
        for idx in 0..13 {
            raw.cells[idx + 8] = Cell::from_parts(Player::Two, Piece::Man);
        }
        assert_eq!(
            Board::try_from(raw),
            Err(ValidateError::TooManyPieces(Player::Two))
        );

        let mut raw = RawBoard::empty();
        raw.put(Square::new(1, 4), Cell::from_parts(Player::One, Piece::Man));
        assert_eq!(
            Board::try_from(raw),
            Err(ValidateError::UnpromotedMan(Square::new(1, 4)))
        );
        raw.put(Square::new(1, 4), Cell::from_parts(Player::One, Piece::King));
        assert!(Board::try_from(raw).is_ok());

        let mut raw = RawBoard::empty();
        raw.put(Square::new(5, 4), Cell::from_parts(Player::One, Piece::Man));
        raw.jumper = Some(Square::new(5, 4));
        assert_eq!(
            Board::try_from(raw),
            Err(ValidateError::InvalidJumper(Square::new(5, 4)))
        );
        raw.put(Square::new(4, 5), Cell::from_parts(Player::Two, Piece::Man));
        assert!(Board::try_from(raw).is_ok());
        raw.side = Player::Two;
        assert_eq!(
            Board::try_from(raw),
            Err(ValidateError::InvalidJumper(Square::new(5, 4)))
        );
    }

    #[test]
    fn test_packed() {
        let b = Board::initial();
        let restored = Board::from_packed(b.pack(), Player::One).unwrap();
        assert_eq!(restored, b);
        assert_eq!(b.as_digits(), &INITIAL[1..]);
        assert_eq!(
            Board::from_packed(0o7, Player::One),
            Err(ParseError::Raw(RawParseError::Cells(CodecError::BadCell {
                pos: 0,
                digit: 7
            })))
        );
    }

    #[test]
    fn test_outcome() {
        let b = Board::from_str("100000000000000300200000000000000").unwrap();
        assert_eq!(b.calc_outcome(), None);

        let b = Board::from_str("200000000000000300000000000000000").unwrap();
        assert_eq!(
            b.calc_outcome(),
            Some(Outcome::win(Player::One, WinReason::NoPieces))
        );

        // Player one man on (8, 1) is blocked by two enemy men stacked in front of it
        let mut raw = RawBoard::empty();
        raw.put(Square::new(8, 1), Cell::from_parts(Player::One, Piece::Man));
        raw.put(Square::new(7, 2), Cell::from_parts(Player::Two, Piece::Man));
        raw.put(Square::new(6, 3), Cell::from_parts(Player::Two, Piece::Man));
        let b = Board::try_from(raw).unwrap();
        assert!(!b.has_legal_moves());
        assert_eq!(
            b.calc_outcome(),
            Some(Outcome::win(Player::Two, WinReason::NoMoves))
        );
    }

    #[test]
    fn test_pretty() {
        let b = Board::initial();
        let res = concat!(
            "1| r r r r\n",
            "2|r r r r \n",
            "3| r r r r\n",
            "4|. . . . \n",
            "5| . . . .\n",
            "6|b b b b \n",
            "7| b b b b\n",
            "8|b b b b \n",
            "-+--------\n",
            "b|12345678\n",
        );
        assert_eq!(b.pretty(PrettyStyle::Ascii).to_string(), res);
        assert!(b.pretty(PrettyStyle::Utf8).to_string().starts_with("1│ ⛀ ⛀ ⛀ ⛀\n"));
    }
}
