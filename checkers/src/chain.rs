//! Game record with draw policy and repetition tracking

use crate::board::Board;
use crate::moves::{self, notation, Make, Move, RawUndo, Text, ValidateError};
use crate::types::{DrawReason, Outcome, Player};

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot parse move #{}: {}", .pos + 1, .source)]
pub struct TextParseError {
    pub pos: usize,
    pub source: notation::ParseError,
}

/// Thresholds for declaring a draw
///
/// The game is drawn when there were at least `max_quiet_moves` consecutive moves without a
/// capture, and the players' piece counts differ by no more than `max_piece_diff`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawPolicy {
    pub max_quiet_moves: u16,
    pub max_piece_diff: u8,
}

impl DrawPolicy {
    pub const DEFAULT: DrawPolicy = DrawPolicy {
        max_quiet_moves: 40,
        max_piece_diff: 2,
    };

    /// Returns `true` if the position on `b` is a draw under this policy
    pub fn is_draw(&self, b: &Board) -> bool {
        let diff = b.piece_count(Player::One).abs_diff(b.piece_count(Player::Two));
        b.draw_counter() >= self.max_quiet_moves && diff <= self.max_piece_diff
    }
}

impl Default for DrawPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Key of a reached position: side to move and packed cells
pub type PositionKey = (Player, u128);

#[inline]
pub fn position_key(b: &Board) -> PositionKey {
    (b.side(), b.pack())
}

/// Counter of reached positions
pub trait Repeat: Default {
    fn push(&mut self, b: &Board);
    fn pop(&mut self, b: &Board);
    fn repeat_count(&self, b: &Board) -> usize;
}

#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct HashRepeat(HashMap<PositionKey, usize>);

impl HashRepeat {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Repeat for HashRepeat {
    fn push(&mut self, b: &Board) {
        self.0
            .entry(position_key(b))
            .and_modify(|x| *x += 1)
            .or_insert(1);
    }

    fn pop(&mut self, b: &Board) {
        let key = position_key(b);
        if let Some(r) = self.0.get_mut(&key) {
            *r -= 1;
            if *r == 0 {
                self.0.remove(&key);
            }
        }
    }

    fn repeat_count(&self, b: &Board) -> usize {
        *self.0.get(&position_key(b)).unwrap_or(&0)
    }
}

pub type MoveChain = BaseMoveChain<HashRepeat>;

/// Sequence of moves from the starting position, together with the current board
///
/// The chain remembers every position reached during the game, so the players can avoid
/// repeating them. It also owns the [`DrawPolicy`] and the game outcome once it's known.
#[derive(Debug, Clone)]
pub struct BaseMoveChain<R: Repeat> {
    board: Board,
    repeat: R,
    stack: Vec<(Move, RawUndo)>,
    keys: Vec<PositionKey>,
    policy: DrawPolicy,
    outcome: Option<Outcome>,
}

impl<R: Repeat> BaseMoveChain<R> {
    pub fn new(b: Board) -> Self {
        Self::with_policy(b, DrawPolicy::default())
    }

    pub fn with_policy(b: Board, policy: DrawPolicy) -> Self {
        let mut res = BaseMoveChain {
            keys: vec![position_key(&b)],
            board: b,
            repeat: R::default(),
            stack: Vec::new(),
            policy,
            outcome: None,
        };
        res.repeat.push(&res.board);
        res
    }

    pub fn new_initial() -> Self {
        Self::new(Board::initial())
    }

    pub fn from_text_list(b: Board, list: &str) -> Result<Self, TextParseError> {
        let mut res = BaseMoveChain::new(b);
        res.push_text_list(list)?;
        Ok(res)
    }

    /// Returns the current position
    pub fn last(&self) -> &Board {
        &self.board
    }

    /// Returns the position the chain started from
    pub fn first(&self) -> Board {
        let mut b = self.board.clone();
        for &(mv, u) in self.stack.iter().rev() {
            moves::unmake_move_unchecked(&mut b, mv, u);
        }
        b
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Move> + '_ {
        self.stack.iter().map(|(m, _)| *m)
    }

    pub fn get(&self, idx: usize) -> Move {
        self.stack[idx].0
    }

    pub fn policy(&self) -> &DrawPolicy {
        &self.policy
    }

    /// Returns `true` if the position `b` was already reached in this game
    pub fn seen(&self, b: &Board) -> bool {
        self.repeat.repeat_count(b) != 0
    }

    /// Returns the keys of all the reached positions, in order, starting from the initial one
    pub fn keys(&self) -> &[PositionKey] {
        &self.keys
    }

    /// Returns the packed keys of the reached positions where `side` was to move
    pub fn history(&self, side: Player) -> impl Iterator<Item = u128> + '_ {
        self.keys
            .iter()
            .filter(move |(s, _)| *s == side)
            .map(|(_, k)| *k)
    }

    pub fn outcome(&self) -> &Option<Outcome> {
        &self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn clear_outcome(&mut self) {
        self.outcome = None;
    }

    pub fn set_outcome(&mut self, outcome: Outcome) {
        assert!(!self.is_finished());
        self.outcome = Some(outcome);
    }

    /// Calculates the outcome of the current position, including draws by [`DrawPolicy`]
    pub fn calc_outcome(&self) -> Option<Outcome> {
        if let Some(outcome) = self.board.calc_outcome() {
            return Some(outcome);
        }
        if self.policy.is_draw(&self.board) {
            return Some(Outcome::Draw(DrawReason::QuietMoves));
        }
        None
    }

    /// Calculates the outcome and sets it if the game is over
    pub fn set_auto_outcome(&mut self) -> Option<Outcome> {
        assert!(!self.is_finished());
        if let Some(outcome) = self.calc_outcome() {
            debug!(%outcome, moves = self.len(), "game is over");
            self.set_outcome(outcome);
        }
        self.outcome
    }

    fn do_finish_push(&mut self, mv: Move, u: RawUndo) {
        self.repeat.push(&self.board);
        self.keys.push(position_key(&self.board));
        self.stack.push((mv, u));
    }

    pub fn push(&mut self, mv: Move) -> Result<(), ValidateError> {
        assert!(!self.is_finished());
        let (mv, u) = mv.make_raw(&mut self.board).map_err(|e| {
            debug!(%mv, error = %e, "move rejected");
            e
        })?;
        self.do_finish_push(mv, u);
        Ok(())
    }

    pub fn push_text(&mut self, s: &str) -> Result<(), notation::ParseError> {
        assert!(!self.is_finished());
        let (mv, u) = Text(s).make_raw(&mut self.board)?;
        self.do_finish_push(mv, u);
        Ok(())
    }

    pub fn push_text_list(&mut self, list: &str) -> Result<(), TextParseError> {
        for (pos, token) in list.split_ascii_whitespace().enumerate() {
            self.push_text(token)
                .map_err(|source| TextParseError { pos, source })?;
        }
        Ok(())
    }

    /// Rolls back the last move
    ///
    /// The outcome is cleared, as it may not hold for the previous position.
    pub fn pop(&mut self) -> Option<Move> {
        let (m, u) = self.stack.pop()?;
        self.repeat.pop(&self.board);
        self.keys.pop();
        moves::unmake_move_unchecked(&mut self.board, m, u);
        self.outcome = None;
        Some(m)
    }

    /// Returns the wrapper which formats the moves as a space-separated list
    pub fn text_list(&self) -> TextList<'_, R> {
        TextList(self)
    }
}

impl<R: Repeat + Eq> PartialEq<Self> for BaseMoveChain<R> {
    fn eq(&self, other: &Self) -> bool {
        if self.board != other.board
            || self.repeat != other.repeat
            || self.stack.len() != other.stack.len()
        {
            return false;
        }
        self.stack
            .iter()
            .zip(other.stack.iter())
            .all(|((m1, _), (m2, _))| m1 == m2)
    }
}

impl<R: Repeat + Eq> Eq for BaseMoveChain<R> {}

pub struct TextList<'a, R: Repeat>(&'a BaseMoveChain<R>);

impl<'a, R: Repeat> fmt::Display for TextList<'a, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for (i, m) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", m)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::RawBoard;
    use crate::types::{Cell, Piece, Square, WinReason};

    #[test]
    fn test_push_pop() {
        let mut chain = MoveChain::new_initial();
        chain.push_text_list("61-52 34-43 52x34").unwrap();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.text_list().to_string(), "61-52 34-43 52x34");
        assert_eq!(chain.keys().len(), 4);
        assert_eq!(chain.last().piece_count(Player::Two), 11);

        let last = chain.last().clone();
        assert!(chain.seen(&last));
        assert_eq!(chain.pop().map(|m| m.to_string()), Some("52x34".to_string()));
        assert!(!chain.seen(&last));
        assert_eq!(chain.keys().len(), 3);
        assert_eq!(chain.first(), Board::initial());

        let other = MoveChain::from_text_list(Board::initial(), "61-52 34-43").unwrap();
        assert_eq!(chain, other);
    }

    #[test]
    fn test_bad_list() {
        let mut chain = MoveChain::new_initial();
        let err = chain.push_text_list("61-52 63-54").unwrap_err();
        assert_eq!(err.pos, 1);
        assert!(matches!(
            err.source,
            notation::ParseError::Validate(ValidateError::WrongSide(_))
        ));
        assert_eq!(chain.len(), 1);
        assert_eq!(
            err.to_string(),
            "cannot parse move #2: invalid move: piece at 63 belongs to the opponent"
        );
    }

    #[test]
    fn test_history() {
        let mut chain = MoveChain::new_initial();
        chain.push_text_list("61-52 34-43").unwrap();
        let ones: Vec<_> = chain.history(Player::One).collect();
        let twos: Vec<_> = chain.history(Player::Two).collect();
        assert_eq!(ones.len(), 2);
        assert_eq!(twos.len(), 1);
        assert_eq!(ones[0], Board::initial().pack());
        assert_eq!(ones[1], chain.last().pack());
    }

    #[test]
    fn test_draw_policy() {
        let mut raw = RawBoard::empty();
        raw.put(Square::new(8, 1), Cell::from_parts(Player::One, Piece::King));
        raw.put(Square::new(1, 8), Cell::from_parts(Player::Two, Piece::King));
        raw.draw_counter = 39;
        let b: Board = raw.try_into().unwrap();
        assert!(!DrawPolicy::default().is_draw(&b));

        let mut chain = MoveChain::new(b);
        assert_eq!(chain.calc_outcome(), None);
        chain.push_text("81-72").unwrap();
        assert_eq!(
            chain.set_auto_outcome(),
            Some(Outcome::Draw(DrawReason::QuietMoves))
        );
        assert!(chain.is_finished());
        chain.pop();
        assert!(!chain.is_finished());

        let strict = DrawPolicy {
            max_quiet_moves: 40,
            max_piece_diff: 0,
        };
        raw.put(Square::new(1, 6), Cell::from_parts(Player::Two, Piece::King));
        raw.draw_counter = 50;
        let b: Board = raw.try_into().unwrap();
        assert!(!strict.is_draw(&b));
        assert!(DrawPolicy::default().is_draw(&b));
    }

    #[test]
    fn test_win() {
        let mut raw = RawBoard::empty();
        raw.put(Square::new(5, 4), Cell::from_parts(Player::Two, Piece::King));
        raw.put(Square::new(4, 5), Cell::from_parts(Player::One, Piece::Man));
        raw.side = Player::Two;
        let mut chain = MoveChain::new(raw.try_into().unwrap());
        chain.push_text("54x36").unwrap();
        assert_eq!(
            chain.set_auto_outcome(),
            Some(Outcome::win(Player::Two, WinReason::NoPieces))
        );
    }

    #[test]
    fn test_policy_serde() {
        let policy: DrawPolicy = serde_json::from_str(r#"{"max_quiet_moves": 10}"#).unwrap();
        assert_eq!(policy.max_quiet_moves, 10);
        assert_eq!(policy.max_piece_diff, 2);
    }
}
