use crate::{geometry, types};

pub trait Side {
    const PLAYER: types::Player;
    /// Bit mask of diagonals along which a man may move
    const FORWARD_MASK: u8;
    type Inv: Side;
}

pub struct One;
pub struct Two;

const fn dir_mask(dirs: [usize; 2]) -> u8 {
    (1 << dirs[0]) | (1 << dirs[1])
}

impl Side for One {
    const PLAYER: types::Player = types::Player::One;
    const FORWARD_MASK: u8 = dir_mask(geometry::forward_dirs(types::Player::One));
    type Inv = Two;
}

impl Side for Two {
    const PLAYER: types::Player = types::Player::Two;
    const FORWARD_MASK: u8 = dir_mask(geometry::forward_dirs(types::Player::Two));
    type Inv = One;
}

pub const KING_MASK: u8 = 0b1111;
