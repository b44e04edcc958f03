//! Compact board encodings
//!
//! A board is serialized as a string of 32 digits, one per playable square in row-major order:
//! `0` is an empty square, `1` and `2` are men of player one and two, `3` and `4` are their kings.
//!
//! Any string of radix-8 digits can be packed into an integer. The first character becomes the
//! least significant digit. Packing is lossless only together with the string length, as
//! trailing zero characters (i.e. leading zero digits of the number) do not affect the packed value.
//!
//! # Example
//!
//! ```
//! use owlcheckers::codec;
//!
//! let packed = codec::pack("0120").unwrap();
//! assert_eq!(packed, 0o210);
//! assert_eq!(codec::unpack(packed, 4).unwrap(), "0120");
//! assert_eq!(codec::unpack(packed, 3).unwrap(), "012");
//! ```

use crate::board::RawBoard;
use crate::types::{Cell, Square};

use thiserror::Error;

/// Number of digits in a serialized board
pub const DIGITS: usize = Square::PLAYABLE;

/// Maximum number of digits which fit into the packed representation
pub const MAX_DIGITS: usize = (u128::BITS / 3) as usize;

/// Error encoding or decoding a digit string
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum CodecError {
    /// Character is not a radix-8 digit
    #[error("bad digit {ch:?} at position {pos}")]
    BadDigit { pos: usize, ch: char },
    /// Digit is a valid radix-8 digit, but doesn't denote any cell
    #[error("bad cell code {digit} at position {pos}")]
    BadCell { pos: usize, digit: u8 },
    /// String is too long to be packed
    #[error("too many digits: {0}")]
    TooLong(usize),
    /// Serialized board has wrong number of digits
    #[error("expected 32 digits, got {0}")]
    BadLength(usize),
    /// Packed value doesn't fit into the requested number of digits
    #[error("packed value doesn't fit into {0} digits")]
    Overflow(usize),
}

/// Serializes the board into a string of 32 digits
///
/// Side to move and other state are not included.
pub fn serialize(b: &RawBoard) -> String {
    b.cells.iter().map(Cell::as_char).collect()
}

/// Packs a string of radix-8 digits into an integer
pub fn pack(s: &str) -> Result<u128, CodecError> {
    if s.len() > MAX_DIGITS {
        return Err(CodecError::TooLong(s.len()));
    }
    let mut value = 0_u128;
    for (pos, b) in s.bytes().enumerate().rev() {
        let digit = match b {
            b'0'..=b'7' => b - b'0',
            _ => return Err(CodecError::BadDigit { pos, ch: b as char }),
        };
        value = (value << 3) | digit as u128;
    }
    Ok(value)
}

/// Unpacks an integer into a string of exactly `len` radix-8 digits
pub fn unpack(mut value: u128, len: usize) -> Result<String, CodecError> {
    let mut res = String::with_capacity(len);
    for _ in 0..len {
        res.push((b'0' + (value & 7) as u8) as char);
        value >>= 3;
    }
    if value != 0 {
        return Err(CodecError::Overflow(len));
    }
    Ok(res)
}

/// Packs the board cells directly, without building the intermediate string
///
/// Equal to `pack(&serialize(b))`.
pub fn pack_cells(cells: &[Cell; DIGITS]) -> u128 {
    cells
        .iter()
        .rev()
        .fold(0_u128, |acc, cell| (acc << 3) | cell.index() as u128)
}

/// Restores the board cells from a packed value
pub fn unpack_cells(mut value: u128) -> Result<[Cell; DIGITS], CodecError> {
    let mut cells = [Cell::EMPTY; DIGITS];
    for (pos, cell) in cells.iter_mut().enumerate() {
        let digit = (value & 7) as u8;
        *cell = Cell::try_from_index(digit as usize).ok_or(CodecError::BadCell { pos, digit })?;
        value >>= 3;
    }
    if value != 0 {
        return Err(CodecError::Overflow(DIGITS));
    }
    Ok(cells)
}

/// Parses the cells from a string of 32 digits
pub fn parse_cells(s: &str) -> Result<[Cell; DIGITS], CodecError> {
    let len = s.chars().count();
    if len != DIGITS {
        return Err(CodecError::BadLength(len));
    }
    let mut cells = [Cell::EMPTY; DIGITS];
    for (pos, ch) in s.chars().enumerate() {
        cells[pos] = match ch {
            '0'..='4' => Cell::from_index((ch as u8 - b'0') as usize),
            '5'..='7' => {
                return Err(CodecError::BadCell {
                    pos,
                    digit: ch as u8 - b'0',
                })
            }
            _ => return Err(CodecError::BadDigit { pos, ch }),
        };
    }
    Ok(cells)
}
