//! # Base types for owlcheckers
//!
//! This is an auxiliary crate for `owlcheckers`, which contains some core stuff. It was split from the main
//! crate, so everything declared here can be used in the build script for `owlcheckers`.
//!
//! Normally you don't want to use this crate directly. Use `owlcheckers` instead.

pub mod bitboard;
pub mod geometry;
pub mod types;
