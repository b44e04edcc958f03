//! Heuristic move selection
//!
//! The [`Evaluator`] tries every legal move on a copy of the board, describes the result with
//! [`MoveFeatures`] and lets a [`Scorer`] rate it. Among the best-rated moves, one is chosen at
//! random. Moves which lead to a position already reached in the game are skipped, so the
//! computer player doesn't walk in circles.

use crate::chain::MoveChain;
use crate::metrics::{Metrics, Stopwatch};
use crate::moves::{self, Move};
use crate::movegen;
use crate::types::Square;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Description of a single candidate move and the position it leads to
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MoveFeatures {
    /// Number of legal moves before the move
    pub moves_available: usize,
    /// Number of the move in the game, starting from 1
    pub move_num: usize,
    pub self_pieces: u8,
    pub opp_pieces: u8,
    pub self_kings: u8,
    pub opp_kings: u8,
    /// Number of legal replies in the resulting position
    pub resulting_moves: usize,
    /// The move crowns the moving man
    pub makes_king: bool,
    /// The move captures a king
    pub takes_king: bool,
    /// The move captures a piece
    pub captures: bool,
    /// The same piece must continue jumping after the move
    pub continues: bool,
    /// Number of own pieces which the opponent can capture in reply
    pub threatened: usize,
    /// Number of own kings which the opponent can capture in reply
    pub king_threats: usize,
    /// Number of capturing replies
    pub threats: usize,
    /// The opponent is left without moves
    pub wins: bool,
}

/// Rates the candidate moves; the larger the better
pub trait Scorer {
    fn score(&self, f: &MoveFeatures) -> f64;
}

/// Tunable coefficients of [`DefaultScorer`]
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub base: f64,
    pub makes_king: f64,
    pub takes_king: f64,
    pub threatened: f64,
    pub threats: f64,
    pub resulting_moves: f64,
    pub continues: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Weights {
            base: 5.0,
            makes_king: 1.5,
            takes_king: 1.5,
            threatened: 0.25,
            threats: 0.25,
            resulting_moves: 0.5,
            continues: 2.0,
        }
    }
}

/// Default scoring function
///
/// Starts from the base score, rewards crowning and capturing kings, and punishes the moves
/// after which the opponent can capture. If the move is safe, fewer replies for the opponent
/// are preferred. Winning moves are always rated the highest.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct DefaultScorer {
    pub weights: Weights,
}

impl Scorer for DefaultScorer {
    fn score(&self, f: &MoveFeatures) -> f64 {
        let w = &self.weights;
        if f.wins {
            return f64::MAX;
        }
        let mut score = w.base;
        if f.makes_king {
            score *= w.makes_king;
        }
        if f.takes_king {
            score *= w.takes_king;
        }
        if f.continues {
            return score * w.continues;
        }
        if f.threatened != 0 {
            score = score * w.threatened / f.threatened as f64;
        }
        if f.threats != 0 {
            score = score * w.threats / f.threats as f64;
        }
        if f.resulting_moves != 0 && f.threats == 0 {
            score = score / w.resulting_moves / f.resulting_moves as f64;
        }
        score
    }
}

/// Computes the features of the legal move `mv` played in the last position of `chain`
///
/// `moves_available` is the number of legal moves in that position. Returns `None` if the move
/// leads to a position which was already reached.
pub fn features(chain: &MoveChain, mv: Move, moves_available: usize) -> Option<MoveFeatures> {
    let b = chain.last();
    let me = b.side();
    let opp = me.inv();

    let mut result = b.clone();
    let u = moves::make_move_unchecked(&mut result, mv);
    if chain.seen(&result) {
        return None;
    }

    let continues = result.side() == me;
    let replies = movegen::legal_moves(&result);
    let mut f = MoveFeatures {
        moves_available,
        move_num: chain.len() + 1,
        self_pieces: b.piece_count(me),
        opp_pieces: b.piece_count(opp),
        self_kings: b.king_count(me),
        opp_kings: b.king_count(opp),
        resulting_moves: replies.len(),
        makes_king: u.promoted(),
        takes_king: u.captured().is_king(),
        captures: u.captured().is_occupied(),
        continues,
        wins: !continues && replies.is_empty(),
        ..MoveFeatures::default()
    };

    if !continues && replies.first().map_or(false, Move::is_jump) {
        let mut seen: Vec<Square> = Vec::new();
        for reply in &replies {
            let mid = match reply.midpoint() {
                Some(mid) => mid,
                None => continue,
            };
            if !seen.contains(&mid) {
                seen.push(mid);
                if result.get(mid).is_king() {
                    f.king_threats += 1;
                }
            }
        }
        f.threatened = seen.len();
        f.threats = replies.len();
    }
    Some(f)
}

/// Computer player which picks moves by their score
pub struct Evaluator<S: Scorer = DefaultScorer> {
    scorer: S,
    rng: Xoshiro256PlusPlus,
}

impl Evaluator<DefaultScorer> {
    /// Creates the evaluator with the default scorer
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_scorer(DefaultScorer::default(), seed)
    }
}

impl<S: Scorer> Evaluator<S> {
    /// Creates the evaluator with the custom scorer
    ///
    /// If `seed` is `None`, the random generator is seeded from the system entropy source.
    pub fn with_scorer(scorer: S, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };
        Evaluator { scorer, rng }
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Rates all the legal moves in the last position of `chain`
    ///
    /// The moves leading to already reached positions are not included.
    pub fn rate(&self, chain: &MoveChain, metrics: &mut dyn Metrics) -> Vec<(Move, f64)> {
        let mut res = Vec::new();
        let legal = movegen::legal_moves(chain.last());
        for mv in &legal {
            let watch = Stopwatch::start("eval_move");
            let rated = features(chain, *mv, legal.len()).map(|f| self.scorer.score(&f));
            watch.stop(metrics);
            if let Some(score) = rated {
                res.push((*mv, score));
            }
        }
        res
    }

    /// Picks the move to play in the last position of `chain`
    ///
    /// Returns `None` only if there are no legal moves. If every legal move repeats a position,
    /// the first legal move is returned.
    pub fn pick(&mut self, chain: &MoveChain, metrics: &mut dyn Metrics) -> Option<Move> {
        let watch = Stopwatch::start("pick_move");
        let rated = self.rate(chain, metrics);
        let best = rated
            .iter()
            .map(|(_, score)| *score)
            .fold(f64::NEG_INFINITY, f64::max);
        let candidates: Vec<Move> = rated
            .iter()
            .filter(|(_, score)| *score == best)
            .map(|(mv, _)| *mv)
            .collect();
        let res = match candidates.choose(&mut self.rng) {
            Some(mv) => Some(*mv),
            None => {
                debug!("no unique moves left");
                movegen::legal_moves(chain.last()).first().copied()
            }
        };
        if let Some(mv) = res {
            debug!(%mv, score = best, candidates = candidates.len(), "picked move");
        }
        watch.stop(metrics);
        res
    }
}
