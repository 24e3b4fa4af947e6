//! Persisted high score: one integer, loaded once, saved on a new record.

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use bevy::prelude::*;

pub trait HighScoreStore: Send + Sync + 'static {
    fn load(&self) -> Result<u32>;
    fn save(&mut self, score: u32) -> Result<()>;
}

/// Plain text file holding the score in decimal. A missing file reads as 0.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }
}

impl HighScoreStore for FileStore {
    fn load(&self) -> Result<u32> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("reading high score from {}", self.path.display())
                })
            }
        };
        contents.trim().parse().with_context(|| {
            format!("parsing high score in {}", self.path.display())
        })
    }

    fn save(&mut self, score: u32) -> Result<()> {
        fs::write(&self.path, format!("{score}\n")).with_context(|| {
            format!("writing high score to {}", self.path.display())
        })
    }
}

/// Keeps the score for the lifetime of the process only.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    score: u32,
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> Result<u32> {
        Ok(self.score)
    }

    fn save(&mut self, score: u32) -> Result<()> {
        self.score = score;
        Ok(())
    }
}

#[derive(Resource)]
pub struct HighScore {
    best: u32,
    store: Box<dyn HighScoreStore>,
}

impl Default for HighScore {
    fn default() -> Self {
        HighScore::load(MemoryStore::default())
    }
}

impl HighScore {
    /// A store that cannot be read counts as a high score of 0.
    pub fn load(store: impl HighScoreStore) -> Self {
        let best = store.load().unwrap_or_else(|e| {
            warn!("high score unavailable: {e:#}");
            0
        });
        HighScore {
            best,
            store: Box::new(store),
        }
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    /// Record a final score. Returns `true` for a new record, which is saved
    /// right away.
    pub fn submit(&mut self, score: u32) -> bool {
        if score <= self.best {
            return false;
        }
        self.best = score;
        if let Err(e) = self.store.save(score) {
            warn!("could not save high score: {e:#}");
        }
        true
    }
}
