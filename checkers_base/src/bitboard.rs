use crate::types::Square;
use derive_more::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};
use std::fmt;

/// Set of playable squares, one bit per playable index
#[derive(
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    BitAnd,
    BitAndAssign,
    BitOr,
    BitOrAssign,
    BitXor,
    BitXorAssign,
    Not,
)]
pub struct Bitboard(u32);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);
    pub const FULL: Bitboard = Bitboard(u32::MAX);

    pub const fn from_raw(val: u32) -> Bitboard {
        Bitboard(val)
    }

    pub const fn from_index(idx: usize) -> Bitboard {
        Bitboard(1_u32 << idx)
    }

    pub const fn from_square(sq: Square) -> Bitboard {
        Self::from_index(sq.index())
    }

    /// Returns the squares of all rows between `lo` and `hi` inclusive
    pub const fn rows(lo: u8, hi: u8) -> Bitboard {
        let mut res = 0_u32;
        let mut row = lo;
        while row <= hi {
            res |= 0xf << ((row as u32 - 1) * 4);
            row += 1;
        }
        Bitboard(res)
    }

    pub const fn with(self, sq: Square) -> Bitboard {
        Bitboard(self.0 | (1_u32 << sq.index()))
    }

    pub const fn without(self, sq: Square) -> Bitboard {
        Bitboard(self.0 & !(1_u32 << sq.index()))
    }

    pub fn set(&mut self, sq: Square) {
        *self = self.with(sq);
    }

    pub fn unset(&mut self, sq: Square) {
        *self = self.without(sq);
    }

    pub const fn has(&self, sq: Square) -> bool {
        self.has_index(sq.index())
    }

    pub const fn has_index(&self, idx: usize) -> bool {
        ((self.0 >> idx) & 1) != 0
    }

    pub const fn as_raw(&self) -> u32 {
        self.0
    }

    pub const fn len(&self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_nonempty(&self) -> bool {
        self.0 != 0
    }

    pub fn indices(self) -> impl Iterator<Item = usize> {
        Iter(self.0).map(|sq| sq.index())
    }
}

impl From<Bitboard> for u32 {
    fn from(b: Bitboard) -> u32 {
        b.0
    }
}

impl From<u32> for Bitboard {
    fn from(u: u32) -> Bitboard {
        Bitboard(u)
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Bitboard({})", self)
    }
}

impl fmt::Display for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for row in 0..8 {
            if row != 0 {
                write!(f, "/")?;
            }
            write!(f, "{:04b}", ((self.0 >> (row * 4)) & 0xf).reverse_bits() >> 28)?;
        }
        Ok(())
    }
}

pub struct Iter(u32);

impl Iterator for Iter {
    type Item = Square;

    fn next(&mut self) -> Option<Square> {
        if self.0 == 0 {
            return None;
        }
        let bit = self.0.trailing_zeros();
        self.0 &= self.0.wrapping_sub(1_u32);
        Some(Square::from_index(bit as usize))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.0.count_ones() as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for Iter {}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = Iter;

    fn into_iter(self) -> Iter {
        Iter(self.0)
    }
}
