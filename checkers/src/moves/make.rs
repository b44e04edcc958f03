use super::base::{self, Move, RawUndo, ValidateError};
use super::notation;
use crate::board::Board;

/// Something that can be applied to the board as a move
pub trait Make {
    type Err;

    /// Applies the move to `board` in place
    ///
    /// On success, returns the applied move and the record to undo it with
    /// [`unmake_move_unchecked()`](super::unmake_move_unchecked). On error, `board` is left unchanged.
    fn make_raw(&self, board: &mut Board) -> Result<(Move, RawUndo), Self::Err>;

    /// Applies the move to a copy of `board` and returns the copy
    fn make(&self, board: &Board) -> Result<Board, Self::Err> {
        let mut cloned = board.clone();
        let _ = self.make_raw(&mut cloned)?;
        Ok(cloned)
    }
}

impl Make for Move {
    type Err = ValidateError;

    #[inline]
    fn make_raw(&self, board: &mut Board) -> Result<(Move, RawUndo), Self::Err> {
        self.validate(board)?;
        Ok((*self, base::make_move_unchecked(board, *self)))
    }

    #[inline]
    fn make(&self, board: &Board) -> Result<Board, Self::Err> {
        self.validate(board)?;
        let mut cloned = board.clone();
        let _ = base::make_move_unchecked(&mut cloned, *self);
        Ok(cloned)
    }
}

/// Move given in text notation
///
/// See [`notation`] for the format.
pub struct Text<S: AsRef<str>>(pub S);

impl<S: AsRef<str>> Make for Text<S> {
    type Err = notation::ParseError;

    #[inline]
    fn make_raw(&self, board: &mut Board) -> Result<(Move, RawUndo), Self::Err> {
        let mv = Move::from_text_legal(self.0.as_ref(), board)?;
        Ok((mv, base::make_move_unchecked(board, mv)))
    }
}
