//! Moves and related things

mod base;
mod make;

pub mod notation;

pub use base::*;
pub use make::*;
