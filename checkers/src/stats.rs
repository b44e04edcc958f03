//! Game statistics and game logs
//!
//! Both are kept in a string key-value [`Store`]. Statistics map each reached position, keyed by
//! the decimal form of its packed cells, to a [`StatsRecord`]. Game logs map the UTC time of the
//! game end to the list of played moves.

use crate::chain::MoveChain;
use crate::types::{Outcome, Player};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::io;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};

/// Error accessing the store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// String key-value storage
///
/// Only a single writer is supported.
pub trait Store {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&mut self, key: &str, value: String) -> Result<(), StoreError>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes all the pending changes
    fn flush(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// In-memory store
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryStore(BTreeMap<String, String>);

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.0.insert(key.to_string(), value);
        Ok(())
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

/// Store backed by a JSON file with a single object
///
/// The whole file is read on [`JsonStore::open()`] and rewritten on [`Store::flush()`].
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    data: BTreeMap<String, String>,
    dirty: bool,
}

impl JsonStore {
    /// Opens the store at `path`, or creates an empty one if the file doesn't exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let data = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "store not found, creating new");
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(JsonStore {
            path,
            data,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for JsonStore {
    fn get(&self, key: &str) -> Option<String> {
        self.data.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.data.insert(key.to_string(), value);
        self.dirty = true;
        Ok(())
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.data)?)?;
        self.dirty = false;
        debug!(path = %self.path.display(), entries = self.data.len(), "store flushed");
        Ok(())
    }
}

/// Error parsing [`StatsRecord`]
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum StatsParseError {
    #[error("expected 3 comma-separated fields, got {0}")]
    BadFieldCount(usize),
    #[error("bad number: {0}")]
    BadNumber(#[from] ParseIntError),
}

/// Statistics of a single position
///
/// The text form is `seen,p1_wins,p2_wins`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct StatsRecord {
    /// Number of games in which the position was reached
    pub seen: u64,
    /// Number of such games won by each player
    pub wins: [u64; 2],
}

impl StatsRecord {
    pub fn wins(&self, p: Player) -> u64 {
        self.wins[p.index()]
    }
}

impl fmt::Display for StatsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{},{},{}", self.seen, self.wins[0], self.wins[1])
    }
}

impl FromStr for StatsRecord {
    type Err = StatsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(',').collect();
        if fields.len() != 3 {
            return Err(StatsParseError::BadFieldCount(fields.len()));
        }
        Ok(StatsRecord {
            seen: fields[0].trim().parse()?,
            wins: [fields[1].trim().parse()?, fields[2].trim().parse()?],
        })
    }
}

/// Error updating statistics
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("bad record for key {key}: {source}")]
    BadRecord {
        key: String,
        source: StatsParseError,
    },
}

/// Statistics over the positions reached in finished games
pub struct Statistics<S> {
    store: S,
}

impl<S: Store> Statistics<S> {
    pub fn new(store: S) -> Self {
        Statistics { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Returns the statistics of the position with packed cells `key`
    pub fn lookup(&self, key: u128) -> Result<Option<StatsRecord>, StatsError> {
        let key = key.to_string();
        match self.store.get(&key) {
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|source| StatsError::BadRecord { key, source }),
            None => Ok(None),
        }
    }

    /// Records the game which reached the positions `keys` and ended with `outcome`
    ///
    /// Every distinct position counts once. Returns the number of positions seen for the
    /// first time.
    pub fn record(
        &mut self,
        keys: impl IntoIterator<Item = u128>,
        outcome: &Outcome,
    ) -> Result<usize, StatsError> {
        let keys: BTreeSet<u128> = keys.into_iter().collect();
        let winner = outcome.winner();
        let mut new_keys = 0;
        for key in &keys {
            let mut rec = match self.lookup(*key)? {
                Some(rec) => rec,
                None => {
                    new_keys += 1;
                    StatsRecord::default()
                }
            };
            rec.seen += 1;
            if let Some(p) = winner {
                rec.wins[p.index()] += 1;
            }
            self.store.put(&key.to_string(), rec.to_string())?;
        }
        self.store.flush()?;
        info!(
            positions = keys.len(),
            new = new_keys,
            total = self.store.len(),
            "statistics recorded"
        );
        Ok(new_keys)
    }

    /// Records the finished game from `chain`
    pub fn record_chain(&mut self, chain: &MoveChain) -> Result<usize, StatsError> {
        match chain.outcome() {
            Some(outcome) => self.record(chain.keys().iter().map(|(_, k)| *k), outcome),
            None => Ok(0),
        }
    }
}

/// Log of played games
pub struct GameLog<S> {
    store: S,
}

/// Format of the game log keys
pub const LOG_KEY_FORMAT: &str = "%c";

impl<S: Store> GameLog<S> {
    pub fn new(store: S) -> Self {
        GameLog { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Records the moves of `chain` with the current time as the key
    pub fn record(&mut self, chain: &MoveChain) -> Result<String, StoreError> {
        self.record_at(chain, Utc::now())
    }

    /// Records the moves of `chain` with `time` as the key
    ///
    /// Returns the key.
    pub fn record_at(
        &mut self,
        chain: &MoveChain,
        time: DateTime<Utc>,
    ) -> Result<String, StoreError> {
        let key = time.format(LOG_KEY_FORMAT).to_string();
        let moves: Vec<String> = chain.iter().map(|m| m.to_string()).collect();
        self.store.put(&key, serde_json::to_string(&moves)?)?;
        self.store.flush()?;
        info!(game = %key, moves = moves.len(), "game logged");
        Ok(key)
    }

    /// Returns the moves of the game logged under `key`
    pub fn get(&self, key: &str) -> Result<Option<Vec<String>>, StoreError> {
        match self.store.get(key) {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }
}
