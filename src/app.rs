use std::time::{Duration, Instant};

use anyhow::Result;
use rand::rngs::ThreadRng;
use rand::Rng;
use tracing::{debug, event, info, Level};

use crate::audio::TracingSound;
use crate::config::Config;
use crate::events::GameCommand;
use crate::game::Game;
use crate::map::direction::DIRECTIONS;
use crate::persistence::{FileHighScore, HighScoreStore, MemoryHighScore};
use crate::systems::TracingRenderer;

/// How often the autopilot picks a new heading.
const STEER_INTERVAL: Duration = Duration::from_millis(400);

fn sleep(value: Duration) {
    spin_sleep::sleep(value);
}

/// Headless driver: feeds wall-clock time to a [`Game`], presents frames to a logging renderer and,
/// with the autopilot on, steers the player at random.
pub struct App {
    game: Game,
    renderer: TracingRenderer,
    rng: ThreadRng,
    frame_time: Duration,
    max_runtime: Option<Duration>,
    autopilot: bool,
    started: Instant,
    last_tick: Instant,
    next_steer: Instant,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let store: Box<dyn HighScoreStore> = match &config.high_score_path {
            Some(path) => Box::new(FileHighScore::open(path)),
            None => Box::new(MemoryHighScore::default()),
        };
        let game = Game::new(config, Box::new(TracingSound::default()), store)?;

        let now = Instant::now();
        Ok(Self {
            game,
            renderer: TracingRenderer::default(),
            rng: rand::rng(),
            frame_time: config.frame_time(),
            max_runtime: config.max_runtime(),
            autopilot: config.autopilot,
            started: now,
            last_tick: now,
            next_steer: now,
        })
    }

    /// Runs one frame. Returns false once the session is over.
    pub fn run(&mut self) -> bool {
        let start = Instant::now();

        if let Some(limit) = self.max_runtime {
            if start.duration_since(self.started) >= limit && !self.game.is_finished() {
                info!(limit = ?limit, "Runtime limit reached");
                self.game.command(GameCommand::Exit);
            }
        }

        if self.autopilot && start >= self.next_steer {
            let direction = DIRECTIONS[self.rng.random_range(0..DIRECTIONS.len())];
            debug!(direction = direction.as_ref(), "Autopilot steering");
            self.game.command(GameCommand::SetDesiredHeading(direction));
            self.next_steer = start + STEER_INTERVAL;
        }

        let dt = self.frame_delta(start);
        self.game.update(dt);
        self.game.present(&mut self.renderer);

        if self.game.is_finished() {
            return false;
        }

        if start.elapsed() < self.frame_time {
            let time = self.frame_time.saturating_sub(start.elapsed());
            if time != Duration::ZERO {
                sleep(time);
            }
        } else {
            event!(
                Level::WARN,
                "Game loop behind schedule by: {:?}",
                start.elapsed() - self.frame_time
            );
        }

        true
    }

    /// Time since the previous frame started. Each instant is counted by exactly one frame.
    fn frame_delta(&mut self, now: Instant) -> Duration {
        let dt = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
        dt
    }

    /// Persists the high score and hands back the final score.
    pub fn finish(mut self) -> Result<u32> {
        self.game.shutdown()?;
        info!(frames = self.renderer.frames, ticks = self.game.ticks(), "Session finished");
        Ok(self.game.score())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_frame_deltas_cover_wall_clock_once() {
        let config = Config {
            autopilot: false,
            ..Config::default()
        };
        let mut app = App::new(&config).unwrap();
        let origin = app.last_tick;

        let first = app.frame_delta(origin + Duration::from_millis(10));
        let second = app.frame_delta(origin + Duration::from_millis(25));
        assert_eq!(first, Duration::from_millis(10));
        assert_eq!(second, Duration::from_millis(15));
        assert_eq!(first + second, Duration::from_millis(25));
    }
}
