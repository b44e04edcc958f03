//! # Owlcheckers
//!
//! Checkers (English draughts) engine on the standard 8x8 board. Only the 32 playable squares are
//! addressed.
//!
//! The crate contains:
//!
//! - board representation with incrementally maintained piece counts ([`Board`], [`RawBoard`])
//! - compact digit-string and packed-integer board encoding ([`codec`])
//! - legal move generation with forced jumps and multi-jump chains ([`movegen`])
//! - move validation and execution with exact undo ([`moves`])
//! - game record with draw policy and repetition tracking ([`MoveChain`])
//! - heuristic move selection ([`eval`]), game statistics and logs ([`stats`]), and a turn loop
//!   driving two controllers ([`game`])
//!
//! # Example
//!
//! ```
//! use owlcheckers::{Board, Move, Player, Square};
//!
//! let b = Board::initial();
//! assert_eq!(b.side(), Player::One);
//!
//! let mv = Move::new(Square::new(6, 1), Square::new(5, 2)).unwrap();
//! let b = b.make_move(mv).unwrap();
//! assert_eq!(b.side(), Player::Two);
//! assert_eq!(b.draw_counter(), 1);
//! ```

pub mod board;
pub mod chain;
pub mod codec;
pub mod eval;
pub mod game;
pub mod metrics;
pub mod movegen;
pub mod moves;
pub mod stats;

mod generic;
mod tables;

pub use owlcheckers_base::{bitboard, geometry, types};

pub use bitboard::Bitboard;
pub use board::{Board, RawBoard};
pub use chain::{DrawPolicy, MoveChain};
pub use movegen::MoveList;
pub use moves::{Make, Move};
pub use types::{Cell, Delta, DrawReason, Outcome, Piece, Player, Square, WinReason};
