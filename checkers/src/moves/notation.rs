//! Text notation for moves
//!
//! A move is written as two squares separated by `-` for a step or by `x` for a jump, where each
//! square is its row digit followed by its column digit. For example, `61-52` is a step from row 6,
//! column 1 and `54x36` is a jump from row 5, column 4 over the piece on `45`.

use super::base::{CreateError, Move, ValidateError};
use crate::board::Board;
use crate::types::{Square, SquareParseError};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error parsing the move text
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum RawParseError {
    /// Bad string length
    #[error("bad string length")]
    BadLength,
    /// Bad source square
    #[error("bad source: {0}")]
    BadSrc(SquareParseError),
    /// Bad destination square
    #[error("bad destination: {0}")]
    BadDst(SquareParseError),
    /// Separator is neither `-` nor `x`
    #[error("bad separator {0:?}")]
    BadSeparator(char),
    /// Step is written with `x` or jump is written with `-`
    #[error("separator doesn't match the move kind")]
    SeparatorMismatch,
}

/// Error parsing the text into a well-formed [`Move`]
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum BasicParseError {
    /// Error parsing move
    #[error("cannot parse move: {0}")]
    Parse(#[from] RawParseError),
    /// Error converting the parsed move into a well-formed move
    #[error("cannot create move: {0}")]
    Create(#[from] CreateError),
}

/// Error parsing the text into a legal [`Move`]
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ParseError {
    /// Error parsing move
    #[error("cannot parse move: {0}")]
    Parse(#[from] RawParseError),
    /// Error converting the parsed move into a well-formed move
    #[error("cannot create move: {0}")]
    Create(#[from] CreateError),
    /// Move is not legal
    #[error("invalid move: {0}")]
    Validate(#[from] ValidateError),
}

impl From<BasicParseError> for ParseError {
    fn from(e: BasicParseError) -> ParseError {
        match e {
            BasicParseError::Parse(e) => ParseError::Parse(e),
            BasicParseError::Create(e) => ParseError::Create(e),
        }
    }
}

fn parse_parts(s: &str) -> Result<(Square, Square, bool), RawParseError> {
    if s.len() != 5 || !s.is_ascii() {
        return Err(RawParseError::BadLength);
    }
    let src = Square::from_str(&s[0..2]).map_err(RawParseError::BadSrc)?;
    let dst = Square::from_str(&s[3..5]).map_err(RawParseError::BadDst)?;
    let is_jump = match s.as_bytes()[2] {
        b'-' => false,
        b'x' => true,
        b => return Err(RawParseError::BadSeparator(b as char)),
    };
    Ok((src, dst, is_jump))
}

impl Move {
    /// Parses a well-formed move from text
    ///
    /// The move is not checked for legality.
    pub fn from_text(s: &str) -> Result<Move, BasicParseError> {
        let (src, dst, is_jump) = parse_parts(s)?;
        let mv = Move::new(src, dst)?;
        if mv.is_jump() != is_jump {
            return Err(RawParseError::SeparatorMismatch.into());
        }
        Ok(mv)
    }

    /// Parses a move from text and checks that it's legal in position `b`
    pub fn from_text_legal(s: &str, b: &Board) -> Result<Move, ParseError> {
        let mv = Move::from_text(s)?;
        mv.validate(b)?;
        Ok(mv)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let sep = match self.is_jump() {
            true => 'x',
            false => '-',
        };
        write!(f, "{}{}{}", self.src(), sep, self.dst())
    }
}

impl FromStr for Move {
    type Err = BasicParseError;

    fn from_str(s: &str) -> Result<Move, Self::Err> {
        Move::from_text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        let mv = Move::new(Square::new(6, 1), Square::new(5, 2)).unwrap();
        assert_eq!(mv.to_string(), "61-52");
        assert_eq!(Move::from_str("61-52"), Ok(mv));

        let mv = Move::new(Square::new(5, 4), Square::new(3, 6)).unwrap();
        assert_eq!(mv.to_string(), "54x36");
        assert_eq!(Move::from_str("54x36"), Ok(mv));
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            Move::from_str("61-5"),
            Err(RawParseError::BadLength.into())
        );
        assert_eq!(
            Move::from_str("91-52"),
            Err(RawParseError::BadSrc(SquareParseError::UnexpectedRowChar('9')).into())
        );
        assert_eq!(
            Move::from_str("61-50"),
            Err(RawParseError::BadDst(SquareParseError::UnexpectedColChar('0')).into())
        );
        assert_eq!(
            Move::from_str("61:52"),
            Err(RawParseError::BadSeparator(':').into())
        );
        assert_eq!(
            Move::from_str("61x52"),
            Err(RawParseError::SeparatorMismatch.into())
        );
        assert_eq!(
            Move::from_str("61-62"),
            Err(CreateError::NotWellFormed.into())
        );
    }

    #[test]
    fn test_legal() {
        let b = Board::initial();
        assert!(Move::from_text_legal("61-52", &b).is_ok());
        assert_eq!(
            Move::from_text_legal("32-41", &b),
            Err(ValidateError::WrongSide(Square::new(3, 2)).into())
        );
        assert_eq!(
            Move::from_text_legal("61x43", &b),
            Err(ValidateError::NothingToJump.into())
        );
    }
}
