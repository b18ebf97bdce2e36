use std::path::PathBuf;
use std::time::Duration;

use figment::{providers::Env, Figment};
use serde::Deserialize;

use crate::constants::{CELL_SIZE, LOGIC_RATE, RENDER_RATE};
use crate::error::{GameError, GameResult};

/// Session configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Edge length of one maze cell, in pixels
    pub tile_size: f32,
    /// Logic ticks per second
    pub logic_rate: u32,
    /// Frames per second of the headless driver
    pub render_rate: u32,
    /// Largest backlog of ticks run in one update; anything beyond is dropped
    pub max_catch_up_ticks: u32,
    /// Where the high score is kept - if None, it only lives in memory
    pub high_score_path: Option<PathBuf>,
    /// Wall-clock limit for the headless driver - if None, it runs until the game ends
    pub max_runtime_seconds: Option<u64>,
    /// Whether the headless driver steers the player at random
    pub autopilot: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tile_size: CELL_SIZE as f32,
            logic_rate: LOGIC_RATE,
            render_rate: RENDER_RATE,
            max_catch_up_ticks: default_max_catch_up_ticks(),
            high_score_path: None,
            max_runtime_seconds: None,
            autopilot: true,
        }
    }
}

impl Config {
    /// Simulated time covered by one logic tick.
    pub fn logic_timestep(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.logic_rate))
    }

    pub fn frame_time(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.render_rate))
    }

    pub fn max_runtime(&self) -> Option<Duration> {
        self.max_runtime_seconds.map(Duration::from_secs)
    }
}

/// Raw configuration loaded directly from the environment.
/// This is an intermediate representation that gets validated and converted to Config
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default = "default_tile_size")]
    tile_size: f32,
    #[serde(default = "default_logic_rate")]
    logic_rate: u32,
    #[serde(default = "default_render_rate")]
    render_rate: u32,
    #[serde(default = "default_max_catch_up_ticks")]
    max_catch_up_ticks: u32,
    high_score_path: Option<PathBuf>,
    max_runtime_seconds: Option<u64>,
    #[serde(default = "default_autopilot")]
    autopilot: bool,
}

impl TryFrom<RawConfig> for Config {
    type Error = GameError;

    fn try_from(raw: RawConfig) -> GameResult<Self> {
        if !(raw.tile_size.is_finite() && raw.tile_size > 0.0) {
            return Err(GameError::Config(format!("TILE_SIZE must be positive, got {}", raw.tile_size)));
        }
        if raw.logic_rate == 0 {
            return Err(GameError::Config("LOGIC_RATE must be at least 1".to_string()));
        }
        if raw.render_rate == 0 {
            return Err(GameError::Config("RENDER_RATE must be at least 1".to_string()));
        }
        if raw.max_catch_up_ticks == 0 {
            return Err(GameError::Config("MAX_CATCH_UP_TICKS must be at least 1".to_string()));
        }

        Ok(Config {
            tile_size: raw.tile_size,
            logic_rate: raw.logic_rate,
            render_rate: raw.render_rate,
            max_catch_up_ticks: raw.max_catch_up_ticks,
            high_score_path: raw.high_score_path,
            max_runtime_seconds: raw.max_runtime_seconds,
            autopilot: raw.autopilot,
        })
    }
}

fn default_tile_size() -> f32 {
    CELL_SIZE as f32
}

fn default_logic_rate() -> u32 {
    LOGIC_RATE
}

fn default_render_rate() -> u32 {
    RENDER_RATE
}

fn default_max_catch_up_ticks() -> u32 {
    120
}

fn default_autopilot() -> bool {
    true
}

/// Extracts and validates a configuration from any figment.
pub fn load_from(figment: Figment) -> GameResult<Config> {
    let raw: RawConfig = figment
        .extract()
        .map_err(|e| GameError::Config(format!("Failed to load config: {e}")))?;
    Config::try_from(raw)
}

/// Loads the configuration from `PACMAN_`-prefixed environment variables.
pub fn load_config() -> GameResult<Config> {
    load_from(Figment::new().merge(Env::prefixed("PACMAN_")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = load_from(Figment::new()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_rejects_zero_logic_rate() {
        let result = load_from(Figment::new().merge(("logic_rate", 0)));
        assert!(matches!(result, Err(GameError::Config(_))));
    }

    #[test]
    fn test_timestep() {
        assert_eq!(Config::default().logic_timestep(), Duration::from_nanos(8_333_333));
    }
}
