// Simple command-line application to play checkers against the computer
//
// Usage: simple_cli [CONFIG.json]
//
// Enter moves like `61-52` or `52x34`, `resign` to give up, `r` to restart and `q` to quit.
// Set `RUST_LOG=debug` to see what the computer player thinks.

use owlcheckers::{
    board::PrettyStyle,
    game::{AiController, Control, Controller, GameConfig, Input, Session, SessionEnd},
    metrics::{Metrics, TimingMetrics},
    moves::ValidateError,
    stats::{GameLog, JsonStore, Statistics},
    Move, MoveChain,
};
use std::env;
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

struct Human {
    name: String,
}

impl Controller for Human {
    fn next_input(&mut self, chain: &MoveChain, _metrics: &mut dyn Metrics) -> Input {
        let b = chain.last();
        println!("{}", b.pretty(PrettyStyle::Utf8));
        if let Some(sq) = b.jumper() {
            println!("Continue jumping from {}", sq);
        }
        let stdin = io::stdin();
        loop {
            print!("{} move ({}): ", self.name, chain.len() + 1);
            io::stdout().flush().unwrap();
            let mut s = String::new();
            if stdin.lock().read_line(&mut s).unwrap() == 0 {
                return Input::Quit;
            }
            match s.parse() {
                Ok(input) => return input,
                Err(e) => println!("Bad input: {}", e),
            }
        }
    }

    fn rejected(&mut self, mv: Move, err: &ValidateError) {
        println!("Illegal move {}: {}", mv, err);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match env::args().nth(1) {
        Some(path) => GameConfig::load_or_default(path),
        None => GameConfig::default(),
    };
    for (i, p) in config.players.iter().enumerate() {
        println!("Player {}: {} ({})", i + 1, p.name, p.control);
    }

    let controllers: [Box<dyn Controller>; 2] = [0, 1].map(|i| -> Box<dyn Controller> {
        let p = &config.players[i];
        match p.control {
            Control::Human => Box::new(Human {
                name: p.name.clone(),
            }),
            Control::Ai => Box::new(AiController::from_config(&config)),
        }
    });
    let mut session = Session::new(&config, controllers, TimingMetrics::new());

    match session.play() {
        SessionEnd::Finished(outcome) => {
            println!("{}", session.chain().last().pretty(PrettyStyle::Utf8));
            println!("Game over: {}", session.describe(&outcome));
        }
        SessionEnd::Quit => println!("Game abandoned"),
    }
    println!("Moves: {}", session.chain().text_list());

    if let (Some(stats_path), Some(log_path)) = (&config.stats_path, &config.log_path) {
        let stores = JsonStore::open(stats_path).and_then(|s| Ok((s, JsonStore::open(log_path)?)));
        match stores {
            Ok((stats, log)) => {
                let mut stats = Statistics::new(stats);
                let mut log = GameLog::new(log);
                if let Err(e) = session.save(&mut stats, &mut log) {
                    println!("Cannot save the game: {}", e);
                }
            }
            Err(e) => println!("Cannot open the stores: {}", e),
        }
    }

    println!();
    println!("{}", session.metrics().report());
}
