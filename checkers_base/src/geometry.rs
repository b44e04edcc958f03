use crate::types::{Player, Square, DIAGONALS};

/// Row displacement of a forward step for the given player
pub const fn forward_delta(p: Player) -> i8 {
    match p {
        Player::One => -1,
        Player::Two => 1,
    }
}

/// Indices into [`DIAGONALS`] along which a man of the given player may move
pub const fn forward_dirs(p: Player) -> [usize; 2] {
    match p {
        Player::One => [0, 1],
        Player::Two => [2, 3],
    }
}

/// Row on which a man of the given player is crowned
pub const fn promotion_row(p: Player) -> u8 {
    match p {
        Player::One => 1,
        Player::Two => 8,
    }
}

/// Rows occupied by the given player in the starting layout
pub const fn home_rows(p: Player) -> (u8, u8) {
    match p {
        Player::One => (6, 8),
        Player::Two => (1, 3),
    }
}

pub const fn is_forward_dir(p: Player, dir: usize) -> bool {
    DIAGONALS[dir].row == forward_delta(p)
}

pub fn is_promotion_square(p: Player, sq: Square) -> bool {
    sq.row() == promotion_row(p)
}
