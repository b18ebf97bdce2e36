//! This module contains the session object that owns the simulation.

use std::time::Duration;

use bevy_ecs::event::{EventReader, Events};
use bevy_ecs::schedule::{IntoScheduleConfigs, Schedule};
use bevy_ecs::system::ResMut;
use bevy_ecs::world::{Mut, World};
use strum::IntoEnumIterator;
use tracing::{debug, error, info, trace, warn};

use crate::audio::{Clip, SoundService};
use crate::config::Config;
use crate::error::{GameError, GameResult};
use crate::events::{GameCommand, GameEvent};
use crate::formatter;
use crate::map::builder::Maze;
use crate::map::grid;
use crate::persistence::{HighScoreStorage, HighScoreStore};
use crate::systems::{
    audio_system, ghost_collision_system, ghost_movement_system, maze_pickups, pickup_collision_system, player_control_system,
    player_movement_system, player_spawn, present_frame, stage_system, Actor, AudioEvent, AudioResource, AudioState, DeltaTime,
    FlankingReference, Frozen, GameStage, Ghost, GhostState, GlobalState, HighScore, Level, MazeStyle, PhaseAction,
    PhaseTimers, Pickup, PlayerControlled, PlayerLives, PlayerMotion, ProximityScan, Renderer, RoundState, ScoreResource,
};

/// Core session state built on the Bevy ECS architecture.
///
/// The `World` holds the maze, the actors, the pickups and every gameplay resource, while the
/// `Schedule` runs one logic tick in a fixed order. Real time is fed in through [`Game::update`],
/// which consumes it in whole ticks of a fixed length.
pub struct Game {
    pub world: World,
    pub schedule: Schedule,
    timestep: Duration,
    accumulator: Duration,
    max_catch_up_ticks: u32,
    paused: bool,
    ticks: u64,
}

impl Game {
    /// Builds the world, spawns every actor and pickup, and queues the opening ready countdown.
    ///
    /// # Errors
    ///
    /// Returns `GameError` when the maze cannot be built from the configured tile size.
    pub fn new(config: &Config, sound: Box<dyn SoundService>, store: Box<dyn HighScoreStore>) -> GameResult<Game> {
        info!("Starting game initialization");
        let maze = Maze::standard(config.tile_size)?;
        let tile = maze.tile_size();
        let timestep = config.logic_timestep();

        let mut world = World::default();
        world.init_resource::<Events<GameEvent>>();
        world.init_resource::<Events<AudioEvent>>();
        world.init_resource::<Events<GameError>>();

        let mut timers = PhaseTimers::default();
        timers.registry.schedule(Duration::ZERO, PhaseAction::NewGame);

        world.insert_resource(RoundState::new(maze.dot_count()));
        world.insert_resource(HighScore(store.get()));
        world.insert_resource(HighScoreStorage(store));
        world.insert_resource(AudioResource(sound));
        world.insert_resource(AudioState::default());
        world.insert_resource(timers);
        world.insert_resource(GameStage::default());
        world.insert_resource(GlobalState::default());
        world.insert_resource(ScoreResource::default());
        world.insert_resource(PlayerLives::default());
        world.insert_resource(Level::default());
        world.insert_resource(DeltaTime(timestep));
        world.insert_resource(MazeStyle::default());
        world.insert_resource(ProximityScan::default());

        Self::spawn_actors(&mut world, tile);
        Self::spawn_pickups(&mut world, &maze);
        world.insert_resource(maze);

        let mut schedule = Schedule::default();
        Self::configure_schedule(&mut schedule);

        info!(timestep = ?timestep, max_catch_up_ticks = config.max_catch_up_ticks, "Game initialized");
        Ok(Game {
            world,
            schedule,
            timestep,
            accumulator: Duration::ZERO,
            max_catch_up_ticks: config.max_catch_up_ticks,
            paused: false,
            ticks: 0,
        })
    }

    fn spawn_actors(world: &mut World, tile: f32) {
        let player = world
            .spawn((PlayerControlled, player_spawn(tile), PlayerMotion::default(), Frozen))
            .id();
        trace!(entity = ?player, "Spawned player");

        let mut blinky = None;
        let mut inky = None;
        for ghost in Ghost::iter() {
            let actor = Actor::new(grid::to_pixel(ghost.spawn(), tile), ghost.starting_direction());
            let entity = world.spawn((ghost, actor, GhostState::new(ghost), Frozen)).id();
            trace!(ghost = ghost.as_ref(), ?entity, "Spawned pursuer");
            match ghost {
                Ghost::Blinky => blinky = Some(entity),
                Ghost::Inky => inky = Some(entity),
                _ => {}
            }
        }

        if let (Some(blinky), Some(inky)) = (blinky, inky) {
            world.entity_mut(inky).insert(FlankingReference(blinky));
        }
    }

    fn spawn_pickups(world: &mut World, maze: &Maze) {
        let pickups = maze_pickups(maze);
        info!(count = pickups.len(), "Spawning pickups");
        world.spawn_batch(pickups);
        world.spawn(Pickup::fruit(1));
    }

    fn configure_schedule(schedule: &mut Schedule) {
        schedule.add_systems(
            (
                player_control_system,
                player_movement_system,
                pickup_collision_system,
                ghost_collision_system,
                stage_system,
                ghost_movement_system,
                audio_system,
                error_log_system,
                event_maintenance_system,
            )
                .chain(),
        );
    }

    /// Forwards an external command.
    ///
    /// Pause and exit act on the session directly so they work while the schedule is stopped.
    pub fn command(&mut self, command: GameCommand) {
        match command {
            GameCommand::TogglePause => self.toggle_pause(),
            GameCommand::Exit => {
                info!("Exit requested");
                self.world.resource_mut::<GlobalState>().exit = true;
            }
            GameCommand::SetDesiredHeading(_) => {
                self.world.send_event(GameEvent::Command(command));
            }
        }
    }

    /// Pauses or resumes the session. Pausing is refused outside of regular play.
    pub fn toggle_pause(&mut self) {
        if !self.paused && !self.world.resource::<GameStage>().allows_pause() {
            debug!(stage = self.world.resource::<GameStage>().as_ref(), "Pause refused");
            return;
        }
        self.paused = !self.paused;

        let events: &[AudioEvent] = if self.paused {
            self.world.resource_mut::<PhaseTimers>().registry.pause_all();
            &[AudioEvent::Play(Clip::Pause), AudioEvent::StopAmbience, AudioEvent::PauseBeat]
        } else {
            self.world.resource_mut::<PhaseTimers>().registry.resume_all();
            &[AudioEvent::Play(Clip::Pause), AudioEvent::ResumeAmbience]
        };
        self.world.resource_scope(|world, mut audio: Mut<AudioResource>| {
            let mut state = world.resource_mut::<AudioState>();
            for event in events {
                audio.apply(&mut state, *event);
            }
        });
        info!(paused = self.paused, "{}", if self.paused { "Paused" } else { "Unpaused" });
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Feeds `elapsed` real time in and runs as many whole ticks as it covers.
    ///
    /// A backlog longer than the catch-up limit is dropped instead of being replayed. Returns the
    /// number of ticks run.
    pub fn update(&mut self, elapsed: Duration) -> u32 {
        if self.paused {
            return 0;
        }
        self.accumulator += elapsed;

        let mut ticks = 0;
        while self.accumulator >= self.timestep {
            self.accumulator -= self.timestep;
            self.tick();
            ticks += 1;

            if ticks >= self.max_catch_up_ticks {
                warn!(
                    discarded = ?self.accumulator,
                    ticks,
                    "Simulation fell too far behind, discarding backlog"
                );
                self.accumulator = Duration::ZERO;
                break;
            }
        }
        ticks
    }

    /// Runs exactly one logic tick.
    pub fn tick(&mut self) {
        self.world.insert_resource(DeltaTime(self.timestep));
        self.schedule.run(&mut self.world);
        self.ticks += 1;
        formatter::increment_tick();
    }

    /// Fraction of a tick accumulated but not yet simulated, in `[0, 1)`.
    pub fn interpolation(&self) -> f32 {
        (self.accumulator.as_secs_f64() / self.timestep.as_secs_f64()) as f32
    }

    /// Draws the current state, blending each actor between its last two tick positions.
    pub fn present(&mut self, renderer: &mut dyn Renderer) {
        let alpha = self.interpolation();
        present_frame(&mut self.world, alpha, renderer);
    }

    /// Whether the session asked to end, either by command or after the game-over sequence.
    pub fn is_finished(&self) -> bool {
        self.world.resource::<GlobalState>().exit
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Simulated time since the session started.
    pub fn elapsed(&self) -> Duration {
        self.world.resource::<PhaseTimers>().registry.elapsed()
    }

    pub fn score(&self) -> u32 {
        self.world.resource::<ScoreResource>().0
    }

    pub fn high_score(&self) -> u32 {
        self.world.resource::<HighScore>().0
    }

    pub fn stage(&self) -> GameStage {
        *self.world.resource::<GameStage>()
    }

    /// Writes the high score back to its store.
    pub fn shutdown(&mut self) -> GameResult<()> {
        let score = self.high_score();
        self.world.resource_mut::<HighScoreStorage>().0.set(score)?;
        info!(score, "High score saved");
        Ok(())
    }
}

/// Reports errors raised by systems during the tick.
fn error_log_system(mut errors: EventReader<GameError>) {
    for e in errors.read() {
        match e {
            GameError::LogicInvariant { .. } | GameError::Io(_) => warn!(error = %e, "Recovered from error"),
            _ => error!(error = %e, "System error"),
        }
    }
}

/// Swaps the event buffers once per tick so each event lives for two ticks.
fn event_maintenance_system(
    mut game_events: ResMut<Events<GameEvent>>,
    mut audio_events: ResMut<Events<AudioEvent>>,
    mut errors: ResMut<Events<GameError>>,
) {
    game_events.update();
    audio_events.update();
    errors.update();
}
