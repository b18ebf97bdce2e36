//! High-score storage.

use std::fs;
use std::path::{Path, PathBuf};

use bevy_ecs::resource::Resource;
use tracing::{debug, warn};

use crate::error::GameResult;

/// Stores the single best score across sessions.
pub trait HighScoreStore: Send + Sync {
    fn get(&self) -> u32;
    fn set(&mut self, score: u32) -> GameResult<()>;
}

/// Owns the store the session reads the high score from and writes it back to.
#[derive(Resource)]
pub struct HighScoreStorage(pub Box<dyn HighScoreStore>);

/// Keeps the high score for the lifetime of the process only.
#[derive(Debug, Default, Clone)]
pub struct MemoryHighScore(pub u32);

impl HighScoreStore for MemoryHighScore {
    fn get(&self) -> u32 {
        self.0
    }

    fn set(&mut self, score: u32) -> GameResult<()> {
        self.0 = score;
        Ok(())
    }
}

/// Keeps the high score as a decimal number in a text file.
///
/// The file is read once on creation. A missing or unreadable file counts as a high score of 0.
#[derive(Debug, Clone)]
pub struct FileHighScore {
    path: PathBuf,
    cached: u32,
}

impl FileHighScore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cached = match fs::read_to_string(&path) {
            Ok(contents) => match contents.trim().parse::<u32>() {
                Ok(score) => {
                    debug!(path = %path.display(), score, "Loaded high score");
                    score
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "High score file is malformed, starting from 0");
                    0
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read high score, starting from 0");
                0
            }
        };
        Self { path, cached }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for FileHighScore {
    fn get(&self) -> u32 {
        self.cached
    }

    fn set(&mut self, score: u32) -> GameResult<()> {
        fs::write(&self.path, score.to_string())?;
        self.cached = score;
        debug!(path = %self.path.display(), score, "Saved high score");
        Ok(())
    }
}
