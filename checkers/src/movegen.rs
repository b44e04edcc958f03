//! Legal move generation
//!
//! Jumps are mandatory: if the side to move has any jump, only jumps are generated. While the side
//! is in the middle of a multi-jump, only the jumps of the jumping piece are generated.
//!
//! Moves are generated in a fixed order: by the playable index of the source square, then by
//! direction as listed in [`DIAGONALS`](crate::types::DIAGONALS).

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::generic::{self, Side};
use crate::moves::Move;
use crate::tables;
use crate::types::{Player, Square};

use std::convert::Infallible;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::slice;

use arrayvec::ArrayVec;

/// Upper bound on the number of moves in any position
///
/// Each of at most 12 pieces has at most 4 moves.
pub const MAX_MOVES: usize = 64;

pub(crate) trait MaybeMovePush {
    type Err;

    fn push(&mut self, m: Move) -> Result<(), Self::Err>;
}

/// List of moves without heap allocations
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct MoveList(ArrayVec<Move, MAX_MOVES>);

impl Deref for MoveList {
    type Target = ArrayVec<Move, MAX_MOVES>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for MoveList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a mut MoveList {
    type Item = &'a mut Move;
    type IntoIter = slice::IterMut<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter_mut()
    }
}

impl MoveList {
    pub fn new() -> MoveList {
        MoveList(ArrayVec::new())
    }
}

/// Destination for generated moves
pub trait MovePush {
    fn push(&mut self, m: Move);
}

impl<const N: usize> MovePush for ArrayVec<Move, N> {
    fn push(&mut self, m: Move) {
        self.push(m);
    }
}

impl MovePush for MoveList {
    fn push(&mut self, m: Move) {
        self.0.push(m);
    }
}

impl MovePush for Vec<Move> {
    fn push(&mut self, m: Move) {
        self.push(m);
    }
}

impl<T: MovePush> MaybeMovePush for T {
    type Err = Infallible;

    fn push(&mut self, m: Move) -> Result<(), Self::Err> {
        <Self as MovePush>::push(self, m);
        Ok(())
    }
}

struct ErrOnFirst;

impl MaybeMovePush for ErrOnFirst {
    type Err = ();

    fn push(&mut self, _mv: Move) -> Result<(), ()> {
        Err(())
    }
}

struct MoveGenImpl<'a, P, C> {
    board: &'a Board,
    dst: &'a mut P,
    movers: Bitboard,
    _c: PhantomData<C>,
}

impl<'a, P: MaybeMovePush, C: Side> MoveGenImpl<'a, P, C> {
    fn new(board: &'a Board, dst: &'a mut P, _c: C) -> Self {
        let movers = match board.r.jumper {
            Some(sq) => Bitboard::from_square(sq),
            None => board.color(C::PLAYER),
        };
        MoveGenImpl {
            board,
            dst,
            movers,
            _c: PhantomData,
        }
    }

    fn from_square(board: &'a Board, dst: &'a mut P, sq: Square, _c: C) -> Self {
        MoveGenImpl {
            board,
            dst,
            movers: Bitboard::from_square(sq) & board.color(C::PLAYER),
            _c: PhantomData,
        }
    }

    #[inline]
    fn dir_mask(&self, idx: usize) -> u8 {
        match self.board.kings.has_index(idx) {
            true => generic::KING_MASK,
            false => C::FORWARD_MASK,
        }
    }

    #[inline]
    fn add_move(&mut self, src: usize, dst: usize) -> Result<(), P::Err> {
        self.dst.push(Move::from_squares(
            Square::from_index(src),
            Square::from_index(dst),
        ))
    }

    fn gen_jumps(&mut self) -> Result<(), P::Err> {
        let enemy = self.board.color(C::Inv::PLAYER);
        let occupied = self.board.occupied();
        for src in self.movers.indices() {
            let mask = self.dir_mask(src);
            for dir in 0..4 {
                if mask & (1 << dir) == 0 {
                    continue;
                }
                if let Some((mid, dst)) = tables::jump(src, dir) {
                    if enemy.has_index(mid) && !occupied.has_index(dst) {
                        self.add_move(src, dst)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn gen_simple(&mut self) -> Result<(), P::Err> {
        if self.board.r.jumper.is_some() {
            return Ok(());
        }
        let occupied = self.board.occupied();
        for src in self.movers.indices() {
            let mask = self.dir_mask(src);
            for dir in 0..4 {
                if mask & (1 << dir) == 0 {
                    continue;
                }
                if let Some(dst) = tables::step(src, dir) {
                    if !occupied.has_index(dst) {
                        self.add_move(src, dst)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn gen_all(&mut self) -> Result<(), P::Err> {
        if has_jumps(self.board) {
            self.gen_jumps()
        } else {
            self.gen_simple()
        }
    }
}

/// Move generators which ignore the forced jump rule
///
/// These functions return candidate moves of one kind only. For example, [`gen_simple()`] returns
/// the steps even if the side has a jump, so the resulting moves may be illegal. Use them when
/// you need only part of the moves, e.g. to count the threats in a position.
pub mod candidates {
    use super::{MoveGenImpl, MoveList, MovePush};
    use crate::{board::Board, generic, types::Player};

    macro_rules! do_impl {
        ($($(#[$attr:meta])* $name:ident; $(#[$attr_into:meta])* $name_into:ident;)*) => {
            $(
                $(#[$attr_into])*
                pub fn $name_into<P: MovePush>(b: &Board, dst: &mut P) {
                    let _ = match b.r.side {
                        Player::One => MoveGenImpl::new(b, dst, generic::One).$name(),
                        Player::Two => MoveGenImpl::new(b, dst, generic::Two).$name(),
                    };
                }

                $(#[$attr])*
                pub fn $name(b: &Board) -> MoveList {
                    let mut res = MoveList::new();
                    $name_into(b, &mut res);
                    res
                }
            )*
        }
    }

    do_impl! {
        /// Generates all the jumps for the side to move
        gen_jumps;
        /// Generates all the jumps for the side to move into `dst`
        gen_jumps_into;

        /// Generates all the steps for the side to move
        gen_simple;
        /// Generates all the steps for the side to move into `dst`
        gen_simple_into;
    }
}

/// Generates all the legal moves into `dst`
pub fn gen_all_into<P: MovePush>(b: &Board, dst: &mut P) {
    let _ = match b.r.side {
        Player::One => MoveGenImpl::new(b, dst, generic::One).gen_all(),
        Player::Two => MoveGenImpl::new(b, dst, generic::Two).gen_all(),
    };
}

/// Returns all the legal moves
pub fn legal_moves(b: &Board) -> MoveList {
    let mut res = MoveList::new();
    gen_all_into(b, &mut res);
    res
}

/// Returns `true` if the side to move has at least one legal move
pub fn has_legal_moves(b: &Board) -> bool {
    let mut p = ErrOnFirst;
    (match b.r.side {
        Player::One => MoveGenImpl::new(b, &mut p, generic::One).gen_all(),
        Player::Two => MoveGenImpl::new(b, &mut p, generic::Two).gen_all(),
    })
    .is_err()
}

/// Returns `true` if the side to move has at least one jump
pub fn has_jumps(b: &Board) -> bool {
    let mut p = ErrOnFirst;
    (match b.r.side {
        Player::One => MoveGenImpl::new(b, &mut p, generic::One).gen_jumps(),
        Player::Two => MoveGenImpl::new(b, &mut p, generic::Two).gen_jumps(),
    })
    .is_err()
}

/// Returns `true` if the piece on `sq` belongs to the side to move and can jump
///
/// The jumper recorded on the board is ignored here.
pub fn has_jumps_from(b: &Board, sq: Square) -> bool {
    if !sq.is_playable() {
        return false;
    }
    let mut p = ErrOnFirst;
    (match b.r.side {
        Player::One => MoveGenImpl::from_square(b, &mut p, sq, generic::One).gen_jumps(),
        Player::Two => MoveGenImpl::from_square(b, &mut p, sq, generic::Two).gen_jumps(),
    })
    .is_err()
}

/// Returns all the legal moves of the piece on `sq`
pub fn moves_from(b: &Board, sq: Square) -> MoveList {
    let mut res = legal_moves(b);
    res.retain(|mv| mv.src() == sq);
    res
}
