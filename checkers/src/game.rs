//! Game session: configuration, player input and the turn loop

use crate::board::Board;
use crate::chain::{DrawPolicy, MoveChain};
use crate::eval::{DefaultScorer, Evaluator, Weights};
use crate::metrics::Metrics;
use crate::moves::{notation, Move, ValidateError};
use crate::stats::{GameLog, Statistics, StatsError, Store, StoreError};
use crate::types::{DrawReason, Outcome, Player, Square, WinReason};

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Clicked destination which means "quit the game"
pub const QUIT_CLICK: (u8, u8) = (9, 8);
/// Clicked destination which means "start a new game"
pub const RESET_CLICK: (u8, u8) = (9, 1);

/// Who makes the moves for a player
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Control {
    Human,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub name: String,
    pub control: Control,
}

/// Error loading [`GameConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] io::Error),
    #[error("cannot parse config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Settings for player one and player two
    pub players: [PlayerConfig; 2],
    pub draw: DrawPolicy,
    /// Seed for the computer player; taken from the system entropy source if absent
    pub ai_seed: Option<u64>,
    pub ai_weights: Weights,
    /// File to keep the position statistics in
    pub stats_path: Option<PathBuf>,
    /// File to keep the game logs in
    pub log_path: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            players: [
                PlayerConfig {
                    name: "Black".to_string(),
                    control: Control::Human,
                },
                PlayerConfig {
                    name: "Red".to_string(),
                    control: Control::Ai,
                },
            ],
            draw: DrawPolicy::default(),
            ai_seed: None,
            ai_weights: Weights::default(),
            stats_path: None,
            log_path: None,
        }
    }
}

impl GameConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Loads the config, falling back to the defaults if it cannot be loaded
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                info!(path = %path.display(), "loaded config");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot load config, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path.as_ref(), serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn player(&self, p: Player) -> &PlayerConfig {
        &self.players[p.index()]
    }
}

/// Error converting clicks into [`Input`]
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ClickError {
    #[error("click at ({0}, {1}) is outside the board")]
    OutsideBoard(u8, u8),
}

/// Error parsing [`Input`]
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum InputParseError {
    #[error("bad move: {0}")]
    Move(#[from] notation::BasicParseError),
}

/// Action chosen by a player on their turn
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Input {
    Move(Move),
    Quit,
    Reset,
    Resign,
}

impl Input {
    /// Converts a pair of clicked `(row, col)` squares into input
    ///
    /// The destinations [`QUIT_CLICK`] and [`RESET_CLICK`] lie outside the board and stand for
    /// the corresponding buttons.
    pub fn from_clicks(src: (u8, u8), dst: (u8, u8)) -> Result<Input, ClickError> {
        if dst == QUIT_CLICK {
            return Ok(Input::Quit);
        }
        if dst == RESET_CLICK {
            return Ok(Input::Reset);
        }
        let to_square = |(row, col): (u8, u8)| {
            Square::try_new(row as i32, col as i32).ok_or(ClickError::OutsideBoard(row, col))
        };
        Ok(Input::Move(Move::from_squares(to_square(src)?, to_square(dst)?)))
    }
}

impl FromStr for Input {
    type Err = InputParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "q" | "quit" => Ok(Input::Quit),
            "r" | "reset" => Ok(Input::Reset),
            "resign" => Ok(Input::Resign),
            s => Ok(Input::Move(Move::from_text(s)?)),
        }
    }
}

/// Source of moves for one player
pub trait Controller {
    /// Returns the action for the last position of `chain`
    fn next_input(&mut self, chain: &MoveChain, metrics: &mut dyn Metrics) -> Input;

    /// Called when the move returned from [`Controller::next_input()`] is illegal
    fn rejected(&mut self, _mv: Move, _err: &ValidateError) {}
}

/// Computer player
pub struct AiController {
    eval: Evaluator<DefaultScorer>,
}

impl AiController {
    pub fn new(eval: Evaluator<DefaultScorer>) -> Self {
        AiController { eval }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        let scorer = DefaultScorer {
            weights: config.ai_weights,
        };
        Self::new(Evaluator::with_scorer(scorer, config.ai_seed))
    }
}

impl Controller for AiController {
    fn next_input(&mut self, chain: &MoveChain, metrics: &mut dyn Metrics) -> Input {
        match self.eval.pick(chain, metrics) {
            Some(mv) => Input::Move(mv),
            None => Input::Resign,
        }
    }
}

/// Result of a single [`Session::step()`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Moved(Move),
    Rejected(Move, ValidateError),
    Reset,
    Quit,
    Finished(Outcome),
}

/// How the session ended
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    Finished(Outcome),
    Quit,
}

/// Error saving the game results
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("cannot record statistics: {0}")]
    Stats(#[from] StatsError),
    #[error("cannot record game log: {0}")]
    Log(#[from] StoreError),
}

/// Game between two controllers
pub struct Session<M: Metrics> {
    chain: MoveChain,
    names: [String; 2],
    controllers: [Box<dyn Controller>; 2],
    metrics: M,
}

impl<M: Metrics> Session<M> {
    /// Creates the session from the initial position
    ///
    /// `controllers` are the controllers for player one and player two.
    pub fn new(config: &GameConfig, controllers: [Box<dyn Controller>; 2], metrics: M) -> Self {
        Self::from_board(config, Board::initial(), controllers, metrics)
    }

    /// Creates the session starting from the position `b`
    pub fn from_board(
        config: &GameConfig,
        b: Board,
        controllers: [Box<dyn Controller>; 2],
        metrics: M,
    ) -> Self {
        Session {
            chain: MoveChain::with_policy(b, config.draw),
            names: [
                config.players[0].name.clone(),
                config.players[1].name.clone(),
            ],
            controllers,
            metrics,
        }
    }

    pub fn chain(&self) -> &MoveChain {
        &self.chain
    }

    pub fn metrics(&self) -> &M {
        &self.metrics
    }

    pub fn into_metrics(self) -> M {
        self.metrics
    }

    pub fn name(&self, p: Player) -> &str {
        &self.names[p.index()]
    }

    /// Makes a single turn
    pub fn step(&mut self) -> Step {
        if let Some(outcome) = self.chain.outcome() {
            return Step::Finished(*outcome);
        }
        if let Some(outcome) = self.chain.set_auto_outcome() {
            info!(result = %self.describe(&outcome), moves = self.chain.len(), "game over");
            return Step::Finished(outcome);
        }

        let side = self.chain.last().side();
        let input = self.controllers[side.index()].next_input(&self.chain, &mut self.metrics);
        match input {
            Input::Quit => {
                info!(player = self.name(side), "game abandoned");
                self.chain.set_outcome(Outcome::Draw(DrawReason::Abandoned));
                Step::Quit
            }
            Input::Reset => {
                info!(player = self.name(side), "game reset");
                self.chain = MoveChain::with_policy(Board::initial(), *self.chain.policy());
                Step::Reset
            }
            Input::Resign => {
                let outcome = Outcome::win(side.inv(), WinReason::Resign);
                self.chain.set_outcome(outcome);
                info!(result = %self.describe(&outcome), "game over");
                Step::Finished(outcome)
            }
            Input::Move(mv) => match self.chain.push(mv) {
                Ok(()) => Step::Moved(mv),
                Err(e) => {
                    debug!(player = self.name(side), %mv, error = %e, "illegal move");
                    self.controllers[side.index()].rejected(mv, &e);
                    Step::Rejected(mv, e)
                }
            },
        }
    }

    /// Runs the turn loop until the game is over or a player quits
    pub fn play(&mut self) -> SessionEnd {
        info!(
            one = self.name(Player::One),
            two = self.name(Player::Two),
            "game started"
        );
        loop {
            match self.step() {
                Step::Finished(outcome) => return SessionEnd::Finished(outcome),
                Step::Quit => return SessionEnd::Quit,
                Step::Moved(_) | Step::Rejected(..) | Step::Reset => {}
            }
        }
    }

    /// Records the statistics and the log of the finished game
    ///
    /// Does nothing if the game is not finished. Abandoned games are logged, but don't count in
    /// the statistics.
    pub fn save<S: Store, L: Store>(
        &self,
        stats: &mut Statistics<S>,
        log: &mut GameLog<L>,
    ) -> Result<(), SaveError> {
        match self.chain.outcome() {
            None => return Ok(()),
            Some(Outcome::Draw(DrawReason::Abandoned)) => {}
            Some(_) => {
                stats.record_chain(&self.chain)?;
            }
        }
        log.record(&self.chain)?;
        Ok(())
    }

    /// Returns the human-readable description of `outcome` with the player names
    pub fn describe(&self, outcome: &Outcome) -> String {
        match outcome.winner() {
            Some(p) => format!("{} wins in {} moves", self.name(p), self.chain.len()),
            None => format!("{} after {} moves", outcome, self.chain.len()),
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Control::Human => write!(f, "human"),
            Control::Ai => write!(f, "computer"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::RawBoard;
    use crate::metrics::{NullMetrics, TimingMetrics};
    use crate::stats::MemoryStore;
    use crate::types::{Cell, Piece};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    struct Scripted {
        inputs: VecDeque<Input>,
        rejected: Arc<Mutex<Vec<Move>>>,
    }

    impl Scripted {
        fn new(inputs: &[&str]) -> Self {
            Scripted {
                inputs: inputs.iter().map(|s| s.parse().unwrap()).collect(),
                rejected: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl Controller for Scripted {
        fn next_input(&mut self, _chain: &MoveChain, _metrics: &mut dyn Metrics) -> Input {
            self.inputs.pop_front().unwrap_or(Input::Quit)
        }

        fn rejected(&mut self, mv: Move, _err: &ValidateError) {
            self.rejected.lock().unwrap().push(mv);
        }
    }

    fn ai_config(seed: u64) -> GameConfig {
        let mut config = GameConfig::default();
        config.players[0].control = Control::Ai;
        config.ai_seed = Some(seed);
        config.draw = DrawPolicy {
            max_quiet_moves: 40,
            max_piece_diff: 12,
        };
        config
    }

    #[test]
    fn test_clicks() {
        assert_eq!(Input::from_clicks((6, 1), QUIT_CLICK), Ok(Input::Quit));
        assert_eq!(Input::from_clicks((6, 1), (9, 1)), Ok(Input::Reset));
        assert_eq!(
            Input::from_clicks((6, 1), (5, 2)),
            Ok(Input::Move(Move::from_squares(
                Square::new(6, 1),
                Square::new(5, 2)
            )))
        );
        assert_eq!(
            Input::from_clicks((6, 1), (9, 5)),
            Err(ClickError::OutsideBoard(9, 5))
        );
    }

    #[test]
    fn test_parse_input() {
        assert_eq!(Input::from_str("q"), Ok(Input::Quit));
        assert_eq!(Input::from_str(" reset\n"), Ok(Input::Reset));
        assert_eq!(Input::from_str("resign"), Ok(Input::Resign));
        assert!(matches!(Input::from_str("61-52"), Ok(Input::Move(_))));
        assert!(Input::from_str("hello").is_err());
    }

    #[test]
    fn test_config() {
        let config = GameConfig::default();
        assert_eq!(config.player(Player::One).name, "Black");
        assert_eq!(config.player(Player::Two).control, Control::Ai);

        let config: GameConfig = serde_json::from_str(
            r#"{"players": [{"name": "A", "control": "ai"}, {"name": "B", "control": "human"}],
                "draw": {"max_quiet_moves": 20}, "ai_seed": 5}"#,
        )
        .unwrap();
        assert_eq!(config.players[0].control, Control::Ai);
        assert_eq!(config.draw.max_quiet_moves, 20);
        assert_eq!(config.draw.max_piece_diff, 2);
        assert_eq!(config.ai_seed, Some(5));
        assert_eq!(config.ai_weights, Weights::default());

        let missing = GameConfig::load_or_default("/nonexistent/owlcheckers.json");
        assert_eq!(missing, GameConfig::default());
    }

    #[test]
    fn test_rejected_then_quit() {
        let human = Scripted::new(&["61-52", "63-54", "q"]);
        let rejected = human.rejected.clone();
        let controllers: [Box<dyn Controller>; 2] = [
            Box::new(human),
            Box::new(Scripted::new(&["34-43"])),
        ];
        let mut session = Session::new(&GameConfig::default(), controllers, NullMetrics);

        assert_eq!(session.step(), Step::Moved("61-52".parse().unwrap()));
        assert_eq!(session.step(), Step::Moved("34-43".parse().unwrap()));
        assert_eq!(
            session.step(),
            Step::Rejected("63-54".parse().unwrap(), ValidateError::JumpRequired)
        );
        assert_eq!(session.play(), SessionEnd::Quit);
        assert_eq!(
            *rejected.lock().unwrap(),
            vec![Move::from_text("63-54").unwrap()]
        );
        assert_eq!(session.chain().len(), 2);
        assert_eq!(
            session.chain().outcome(),
            &Some(Outcome::Draw(DrawReason::Abandoned))
        );

        let mut stats = Statistics::new(MemoryStore::new());
        let mut log = GameLog::new(MemoryStore::new());
        session.save(&mut stats, &mut log).unwrap();
        assert!(stats.store().is_empty());
        assert_eq!(log.store().len(), 1);
    }

    #[test]
    fn test_reset_and_resign() {
        let controllers: [Box<dyn Controller>; 2] = [
            Box::new(Scripted::new(&["61-52", "resign"])),
            Box::new(Scripted::new(&["r"])),
        ];
        let mut config = GameConfig::default();
        config.draw.max_quiet_moves = 10;
        let mut session = Session::new(&config, controllers, NullMetrics);
        assert!(matches!(session.step(), Step::Moved(_)));
        assert_eq!(session.step(), Step::Reset);
        assert_eq!(session.chain().len(), 0);
        assert_eq!(session.chain().policy(), &config.draw);
        let expected = Outcome::win(Player::Two, WinReason::Resign);
        assert_eq!(session.play(), SessionEnd::Finished(expected));
        assert_eq!(session.describe(&expected), "Red wins in 0 moves");
    }

    #[test]
    fn test_ai_game() {
        let config = ai_config(11);
        let controllers: [Box<dyn Controller>; 2] = [
            Box::new(AiController::from_config(&config)),
            Box::new(AiController::from_config(&ai_config(12))),
        ];
        let mut session = Session::new(&config, controllers, TimingMetrics::new());
        let outcome = match session.play() {
            SessionEnd::Finished(outcome) => outcome,
            SessionEnd::Quit => panic!("computer players never quit"),
        };
        assert_eq!(session.chain().outcome(), &Some(outcome));
        assert!(session.metrics().get("pick_move").unwrap().calls >= session.chain().len() as u64);

        let mut stats = Statistics::new(MemoryStore::new());
        let mut log = GameLog::new(MemoryStore::new());
        session.save(&mut stats, &mut log).unwrap();
        assert_eq!(log.store().len(), 1);
        let initial = Board::initial().pack();
        let rec = stats.lookup(initial).unwrap().unwrap();
        assert_eq!(rec.seen, 1);
        if let Some(winner) = outcome.winner() {
            assert_eq!(rec.wins(winner), 1);
        }
    }

    #[test]
    fn test_quiet_draw() {
        let mut raw = RawBoard::empty();
        raw.put(Square::new(8, 1), Cell::from_parts(Player::One, Piece::King));
        raw.put(Square::new(1, 2), Cell::from_parts(Player::Two, Piece::King));
        raw.draw_counter = 40;
        let controllers: [Box<dyn Controller>; 2] = [
            Box::new(Scripted::new(&[])),
            Box::new(Scripted::new(&[])),
        ];
        let mut session = Session::from_board(
            &GameConfig::default(),
            raw.try_into().unwrap(),
            controllers,
            NullMetrics,
        );
        assert_eq!(
            session.play(),
            SessionEnd::Finished(Outcome::Draw(DrawReason::QuietMoves))
        );
    }
}
