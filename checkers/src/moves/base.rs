use crate::board::Board;
use crate::types::{Cell, Delta, Piece, Player, Square};
use crate::generic::{self, Side};
use crate::{geometry, movegen};

use std::fmt;

use thiserror::Error;

/// Checkers move
///
/// A move is a pair of squares. A step moves the piece one square diagonally, a jump moves it
/// two squares diagonally over an opponent's piece, which is captured. A multi-jump is represented
/// as a sequence of jumps made by the same side.
///
/// # Well-formedness
///
/// The move is considered well-formed if both squares are playable and the move goes diagonally
/// by one or two squares. Moves created via [`Move::new()`] are always well-formed. A move created
/// via [`Move::from_squares()`] may be not well-formed, and such a move is never legal.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Move {
    src: Square,
    dst: Square,
}

/// Error indicating that move is illegal
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    /// Move is not a diagonal step or jump between playable squares
    #[error("move is not well-formed")]
    NotWellFormed,
    /// Source square is empty
    #[error("no piece at {0}")]
    NoPiece(Square),
    /// Source square contains opponent's piece
    #[error("piece at {0} belongs to the opponent")]
    WrongSide(Square),
    /// Destination square is occupied
    #[error("square {0} is occupied")]
    Occupied(Square),
    /// Man tries to move backwards
    #[error("man cannot move backwards")]
    BackwardMan,
    /// Jump over an empty square
    #[error("nothing to jump over")]
    NothingToJump,
    /// Jump over a piece of the same side
    #[error("cannot jump over own piece")]
    JumpOwnPiece,
    /// Simple move while a jump is available
    #[error("jump is required")]
    JumpRequired,
    /// Multi-jump must be continued with the piece on this square
    #[error("must continue jumping from {0}")]
    MustContinue(Square),
}

/// Error creating move
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum CreateError {
    /// Move is not well-formed
    #[error("move is not well-formed")]
    NotWellFormed,
}

impl Move {
    /// Creates a move from its squares without checking it for well-formedness
    #[inline]
    pub const fn from_squares(src: Square, dst: Square) -> Move {
        Move { src, dst }
    }

    /// Creates a new move and validates it for well-formedness
    pub fn new(src: Square, dst: Square) -> Result<Move, CreateError> {
        let mv = Move { src, dst };
        mv.is_well_formed()
            .then_some(mv)
            .ok_or(CreateError::NotWellFormed)
    }

    #[inline]
    pub const fn src(&self) -> Square {
        self.src
    }

    #[inline]
    pub const fn dst(&self) -> Square {
        self.dst
    }

    #[inline]
    pub const fn delta(&self) -> Delta {
        self.src.delta_to(self.dst)
    }

    /// Returns `true` if the move is a jump, i.e. it goes two rows away
    #[inline]
    pub const fn is_jump(&self) -> bool {
        self.delta().row.abs() == 2
    }

    /// Returns the square of the captured piece if the move is a jump
    #[inline]
    pub fn midpoint(&self) -> Option<Square> {
        match self.is_jump() {
            true => self.src.midpoint(self.dst),
            false => None,
        }
    }

    /// Returns the player whose forward direction this move goes in
    #[inline]
    pub fn direction(&self) -> Player {
        match self.delta().row.signum() == geometry::forward_delta(Player::One) {
            true => Player::One,
            false => Player::Two,
        }
    }

    /// Returns `true` if the move is well-formed
    pub fn is_well_formed(&self) -> bool {
        let delta = self.delta();
        self.src.is_playable()
            && self.dst.is_playable()
            && delta.is_diagonal()
            && matches!(delta.row.abs(), 1 | 2)
    }

    /// Validates whether this move is legal from position `b`
    ///
    /// The move is legal if and only if it is contained in [`movegen::legal_moves()`]. If the move
    /// is illegal, the error explains why.
    pub fn validate(&self, b: &Board) -> Result<(), ValidateError> {
        match b.r.side {
            Player::One => do_validate::<generic::One>(b, *self),
            Player::Two => do_validate::<generic::Two>(b, *self),
        }
    }

    /// Returns `true` if the move is legal
    #[inline]
    pub fn is_legal(&self, b: &Board) -> bool {
        self.validate(b).is_ok()
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Move({})", self)
    }
}

fn do_validate<C: Side>(b: &Board, mv: Move) -> Result<(), ValidateError> {
    if !mv.is_well_formed() {
        return Err(ValidateError::NotWellFormed);
    }
    let src_cell = b.get(mv.src);
    match src_cell.player() {
        None => return Err(ValidateError::NoPiece(mv.src)),
        Some(p) if p != C::PLAYER => return Err(ValidateError::WrongSide(mv.src)),
        _ => {}
    }
    if let Some(jumper) = b.r.jumper {
        if jumper != mv.src || !mv.is_jump() {
            return Err(ValidateError::MustContinue(jumper));
        }
    }
    if b.get(mv.dst).is_occupied() {
        return Err(ValidateError::Occupied(mv.dst));
    }
    if !src_cell.is_king() && mv.direction() != C::PLAYER {
        return Err(ValidateError::BackwardMan);
    }
    match mv.midpoint() {
        Some(mid) => match b.get(mid).player() {
            None => Err(ValidateError::NothingToJump),
            Some(p) if p == C::PLAYER => Err(ValidateError::JumpOwnPiece),
            Some(_) => Ok(()),
        },
        None => match movegen::has_jumps(b) {
            true => Err(ValidateError::JumpRequired),
            false => Ok(()),
        },
    }
}

/// Metadata necessary to undo the applied move
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RawUndo {
    captured: Cell,
    promoted: bool,
    draw_counter: u16,
    jumper: Option<Square>,
    side: Player,
}

impl RawUndo {
    /// Returns the captured piece, or [`Cell::EMPTY`] if the move was not a jump
    #[inline]
    pub fn captured(&self) -> Cell {
        self.captured
    }

    /// Returns `true` if the move crowned the moving man
    #[inline]
    pub fn promoted(&self) -> bool {
        self.promoted
    }
}

fn do_make_move<C: Side>(b: &mut Board, mv: Move) -> RawUndo {
    let mut undo = RawUndo {
        captured: Cell::EMPTY,
        promoted: false,
        draw_counter: b.r.draw_counter,
        jumper: b.r.jumper,
        side: C::PLAYER,
    };
    let me = C::PLAYER.index();
    let opp = C::Inv::PLAYER.index();

    // Move the piece
    let src_cell = b.r.get(mv.src);
    let promoted = !src_cell.is_king() && geometry::is_promotion_square(C::PLAYER, mv.dst);
    let dst_cell = match promoted {
        true => Cell::from_parts(C::PLAYER, Piece::King),
        false => src_cell,
    };
    b.r.put(mv.src, Cell::EMPTY);
    b.r.put(mv.dst, dst_cell);
    b.colors[me].unset(mv.src);
    b.colors[me].set(mv.dst);
    if src_cell.is_king() {
        b.kings.unset(mv.src);
    }
    if dst_cell.is_king() {
        b.kings.set(mv.dst);
    }
    if promoted {
        b.counts[me].kings += 1;
        undo.promoted = true;
    }

    let mid = match mv.midpoint() {
        Some(mid) => mid,
        None => {
            b.r.draw_counter = b.r.draw_counter.saturating_add(1);
            b.r.jumper = None;
            b.r.side = C::Inv::PLAYER;
            return undo;
        }
    };

    // Capture
    let captured = b.r.get(mid);
    b.r.put(mid, Cell::EMPTY);
    b.colors[opp].unset(mid);
    b.counts[opp].pieces -= 1;
    if captured.is_king() {
        b.kings.unset(mid);
        b.counts[opp].kings -= 1;
    }
    undo.captured = captured;
    b.r.draw_counter = 0;

    // Crowning ends the turn, otherwise the same piece keeps jumping while it can
    if !promoted && movegen::has_jumps_from(b, mv.dst) {
        b.r.jumper = Some(mv.dst);
    } else {
        b.r.jumper = None;
        b.r.side = C::Inv::PLAYER;
    }
    undo
}

fn do_unmake_move<C: Side>(b: &mut Board, mv: Move, u: RawUndo) {
    let me = C::PLAYER.index();
    let opp = C::Inv::PLAYER.index();

    let dst_cell = b.r.get(mv.dst);
    let src_cell = match u.promoted {
        true => Cell::from_parts(C::PLAYER, Piece::Man),
        false => dst_cell,
    };
    b.r.put(mv.dst, Cell::EMPTY);
    b.r.put(mv.src, src_cell);
    b.colors[me].unset(mv.dst);
    b.colors[me].set(mv.src);
    if dst_cell.is_king() {
        b.kings.unset(mv.dst);
    }
    if src_cell.is_king() {
        b.kings.set(mv.src);
    }
    if u.promoted {
        b.counts[me].kings -= 1;
    }

    if let Some(mid) = mv.midpoint() {
        b.r.put(mid, u.captured);
        b.colors[opp].set(mid);
        b.counts[opp].pieces += 1;
        if u.captured.is_king() {
            b.kings.set(mid);
            b.counts[opp].kings += 1;
        }
    }

    b.r.side = u.side;
    b.r.jumper = u.jumper;
    b.r.draw_counter = u.draw_counter;
}

/// Makes the move `mv` on the board `b` without checking it
///
/// The move must be legal. Otherwise, the board may become inconsistent, i.e. the cached bitboards
/// and counts may stop matching the cells. Use [`Make::make_raw()`](super::Make::make_raw) if you
/// need the checks.
///
/// The returned value can be passed to [`unmake_move_unchecked()`] to roll the move back.
pub fn make_move_unchecked(b: &mut Board, mv: Move) -> RawUndo {
    match b.r.side {
        Player::One => do_make_move::<generic::One>(b, mv),
        Player::Two => do_make_move::<generic::Two>(b, mv),
    }
}

/// Unmakes the move `mv` on the board `b`
///
/// You may invoke this function only on the position obtained right after the corresponding call
/// to [`make_move_unchecked()`] or [`Make::make_raw()`](super::Make::make_raw), with the undo
/// record returned by it.
pub fn unmake_move_unchecked(b: &mut Board, mv: Move, u: RawUndo) {
    match u.side {
        Player::One => do_unmake_move::<generic::One>(b, mv, u),
        Player::Two => do_unmake_move::<generic::Two>(b, mv, u),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::RawBoard;
    use crate::moves::make::Make;
    use crate::types::Piece;

    fn sq(row: u8, col: u8) -> Square {
        Square::new(row, col)
    }

    fn mv(src: (u8, u8), dst: (u8, u8)) -> Move {
        Move::from_squares(sq(src.0, src.1), sq(dst.0, dst.1))
    }

    fn capture_board() -> Board {
        let mut raw = RawBoard::empty();
        raw.put(sq(5, 4), Cell::from_parts(Player::Two, Piece::King));
        raw.put(sq(4, 5), Cell::from_parts(Player::One, Piece::Man));
        raw.put(sq(7, 2), Cell::from_parts(Player::One, Piece::Man));
        raw.side = Player::Two;
        raw.draw_counter = 7;
        raw.try_into().unwrap()
    }

    #[test]
    fn test_properties() {
        let step = mv((6, 1), (5, 2));
        assert!(step.is_well_formed());
        assert!(!step.is_jump());
        assert_eq!(step.midpoint(), None);
        assert_eq!(step.direction(), Player::One);

        let jump = mv((5, 4), (3, 6));
        assert!(jump.is_jump());
        assert_eq!(jump.midpoint(), Some(sq(4, 5)));
        assert_eq!(jump.direction(), Player::One);
        assert_eq!(mv((3, 6), (5, 4)).direction(), Player::Two);

        assert!(!mv((6, 1), (6, 3)).is_well_formed());
        assert!(!mv((6, 1), (3, 4)).is_well_formed());
        assert!(!mv((6, 2), (5, 3)).is_well_formed());
        assert!(!mv((6, 1), (6, 1)).is_well_formed());
        assert_eq!(
            Move::new(sq(6, 1), sq(4, 1)),
            Err(CreateError::NotWellFormed)
        );
    }

    #[test]
    fn test_initial() {
        let b = Board::initial();
        assert_eq!(mv((6, 1), (5, 2)).validate(&b), Ok(()));
        assert_eq!(
            mv((6, 1), (4, 3)).validate(&b),
            Err(ValidateError::NothingToJump)
        );
        assert_eq!(
            mv((3, 2), (4, 1)).validate(&b),
            Err(ValidateError::WrongSide(sq(3, 2)))
        );
        assert_eq!(
            mv((5, 2), (4, 1)).validate(&b),
            Err(ValidateError::NoPiece(sq(5, 2)))
        );
        assert_eq!(
            mv((7, 2), (6, 1)).validate(&b),
            Err(ValidateError::Occupied(sq(6, 1)))
        );
        assert_eq!(
            mv((6, 1), (6, 2)).validate(&b),
            Err(ValidateError::NotWellFormed)
        );

        let before = b.clone();
        assert_eq!(
            b.make_move(mv((3, 2), (4, 1))),
            Err(ValidateError::WrongSide(sq(3, 2)))
        );
        assert_eq!(b, before);
    }

    #[test]
    fn test_capture() {
        let b = capture_board();
        let jump = mv((5, 4), (3, 6));
        assert_eq!(jump.validate(&b), Ok(()));
        assert_eq!(
            mv((5, 4), (4, 3)).validate(&b),
            Err(ValidateError::JumpRequired)
        );

        let after = b.make_move(jump).unwrap();
        assert!(after.get(sq(4, 5)).is_empty());
        assert!(after.get(sq(5, 4)).is_empty());
        assert_eq!(
            after.get(sq(3, 6)),
            Cell::from_parts(Player::Two, Piece::King)
        );
        assert_eq!(after.piece_count(Player::One), 1);
        assert_eq!(after.draw_counter(), 0);
        assert_eq!(after.side(), Player::One);
        assert_eq!(after.jumper(), None);
    }

    #[test]
    fn test_backward_man() {
        let mut raw = *capture_board().raw();
        raw.put(sq(5, 4), Cell::from_parts(Player::Two, Piece::Man));
        let b: Board = raw.try_into().unwrap();
        assert_eq!(
            mv((5, 4), (3, 6)).validate(&b),
            Err(ValidateError::BackwardMan)
        );
        assert!(b.legal_moves().iter().all(|m| !m.is_jump()));
    }

    #[test]
    fn test_jump_own_piece() {
        let mut raw = RawBoard::empty();
        raw.put(sq(8, 1), Cell::from_parts(Player::One, Piece::Man));
        raw.put(sq(7, 2), Cell::from_parts(Player::One, Piece::Man));
        raw.put(sq(1, 2), Cell::from_parts(Player::Two, Piece::Man));
        let b: Board = raw.try_into().unwrap();
        assert_eq!(
            mv((8, 1), (6, 3)).validate(&b),
            Err(ValidateError::JumpOwnPiece)
        );
        assert_eq!(mv((7, 2), (6, 3)).validate(&b), Ok(()));
    }

    #[test]
    fn test_promote() {
        let mut raw = RawBoard::empty();
        raw.put(sq(2, 3), Cell::from_parts(Player::One, Piece::Man));
        raw.put(sq(7, 2), Cell::from_parts(Player::Two, Piece::Man));
        let b: Board = raw.try_into().unwrap();
        assert_eq!(b.king_count(Player::One), 0);

        let after = b.make_move(mv((2, 3), (1, 4))).unwrap();
        assert!(after.get(sq(1, 4)).is_king());
        assert_eq!(after.king_count(Player::One), 1);
        assert_eq!(after.counts(Player::One), after.raw().count(Player::One));
    }

    #[test]
    fn test_multi_jump() {
        // Player one man on (7, 2) can capture (6, 3) and then (4, 5)
        let mut raw = RawBoard::empty();
        raw.put(sq(7, 2), Cell::from_parts(Player::One, Piece::Man));
        raw.put(sq(6, 3), Cell::from_parts(Player::Two, Piece::Man));
        raw.put(sq(4, 5), Cell::from_parts(Player::Two, Piece::Man));
        raw.put(sq(8, 7), Cell::from_parts(Player::One, Piece::Man));
        let b: Board = raw.try_into().unwrap();

        let b = b.make_move(mv((7, 2), (5, 4))).unwrap();
        assert_eq!(b.side(), Player::One);
        assert_eq!(b.jumper(), Some(sq(5, 4)));
        assert_eq!(
            mv((8, 7), (7, 6)).validate(&b),
            Err(ValidateError::MustContinue(sq(5, 4)))
        );

        let b = b.make_move(mv((5, 4), (3, 6))).unwrap();
        assert_eq!(b.side(), Player::Two);
        assert_eq!(b.jumper(), None);
        assert_eq!(b.piece_count(Player::Two), 0);
    }

    #[test]
    fn test_crowning_ends_turn() {
        // After crowning on (1, 4), the new king could capture (2, 5), but the turn passes
        let mut raw = RawBoard::empty();
        raw.put(sq(3, 2), Cell::from_parts(Player::One, Piece::Man));
        raw.put(sq(2, 3), Cell::from_parts(Player::Two, Piece::Man));
        raw.put(sq(2, 5), Cell::from_parts(Player::Two, Piece::Man));
        let b: Board = raw.try_into().unwrap();

        let b = b.make_move(mv((3, 2), (1, 4))).unwrap();
        assert!(b.get(sq(1, 4)).is_king());
        assert_eq!(b.side(), Player::Two);
        assert_eq!(b.jumper(), None);
    }

    #[test]
    fn test_undo() {
        let mut b = capture_board();
        let before = b.clone();
        let jump = mv((5, 4), (3, 6));
        let u = make_move_unchecked(&mut b, jump);
        assert_eq!(u.captured(), Cell::from_parts(Player::One, Piece::Man));
        unmake_move_unchecked(&mut b, jump, u);
        assert_eq!(b, before);
        assert_eq!(b.colors, before.colors);
        assert_eq!(b.kings, before.kings);
        assert_eq!(b.counts, before.counts);

        let mut raw = RawBoard::empty();
        raw.put(sq(2, 3), Cell::from_parts(Player::One, Piece::Man));
        raw.put(sq(7, 2), Cell::from_parts(Player::Two, Piece::Man));
        let mut b: Board = raw.try_into().unwrap();
        let before = b.clone();
        let (m, u) = mv((2, 3), (1, 4)).make_raw(&mut b).unwrap();
        assert!(u.promoted());
        unmake_move_unchecked(&mut b, m, u);
        assert_eq!(b, before);
        assert_eq!(b.kings, before.kings);
        assert_eq!(b.counts, before.counts);
    }
}
