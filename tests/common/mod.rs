#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bevy_ecs::{entity::Entity, event::Events, query::With, world::World};
use glam::Vec2;
use pacman_core::{
    audio::{Clip, SoundService},
    config::Config,
    error::{GameError, GameResult},
    events::GameEvent,
    game::Game,
    map::{builder::Maze, direction::Direction, grid},
    persistence::{HighScoreStore, MemoryHighScore},
    systems::{Actor, DeltaTime, Frozen, GameStage, Ghost, GhostState, Level, PlayerControlled, PlayerMotion},
};

/// A small open room: walls all around a 3x3 floor.
pub const ROOM: [&str; 5] = ["#####", "#...#", "#...#", "#...#", "#####"];

pub const TILE: f32 = 8.0;

/// Sound backend that records every call so tests can inspect it.
#[derive(Clone, Default)]
pub struct RecordingSound {
    pub played: Arc<Mutex<Vec<Clip>>>,
    pub ambience: Arc<Mutex<Option<Clip>>>,
}

impl SoundService for RecordingSound {
    fn play(&mut self, clip: Clip) {
        self.played.lock().unwrap().push(clip);
    }

    fn loop_ambience(&mut self, clip: Clip) {
        *self.ambience.lock().unwrap() = Some(clip);
    }

    fn stop_ambience(&mut self) {
        *self.ambience.lock().unwrap() = None;
    }
}

/// High-score store whose value stays readable after the session takes ownership of it.
#[derive(Clone, Default)]
pub struct SharedHighScore(pub Arc<Mutex<u32>>);

impl HighScoreStore for SharedHighScore {
    fn get(&self) -> u32 {
        *self.0.lock().unwrap()
    }

    fn set(&mut self, score: u32) -> GameResult<()> {
        *self.0.lock().unwrap() = score;
        Ok(())
    }
}

pub fn new_game() -> Game {
    Game::new(
        &Config::default(),
        Box::new(RecordingSound::default()),
        Box::new(MemoryHighScore::default()),
    )
    .unwrap()
}

pub fn new_game_with(sound: RecordingSound, store: SharedHighScore) -> Game {
    Game::new(&Config::default(), Box::new(sound), Box::new(store)).unwrap()
}

pub fn run_ticks(game: &mut Game, ticks: u32) {
    for _ in 0..ticks {
        game.tick();
    }
}

/// Ticks until the simulated clock reaches `target`.
pub fn run_until(game: &mut Game, target: Duration) {
    while game.elapsed() < target {
        game.tick();
    }
}

/// Ticks for `duration` of simulated time from now.
pub fn run_for(game: &mut Game, duration: Duration) {
    let target = game.elapsed() + duration;
    run_until(game, target);
}

/// Ticks until the opening countdown has finished and the round is under way.
pub fn start_playing(game: &mut Game) {
    for _ in 0..1000 {
        if game.stage() == GameStage::Playing {
            return;
        }
        game.tick();
    }
    panic!("round never started, stage is {:?}", game.stage());
}

/// Pins the player in place so nothing it does interrupts the phase timers.
pub fn freeze_player(game: &mut Game) {
    let player = player_entity(&mut game.world);
    game.world.entity_mut(player).insert(Frozen);
}

pub fn player_entity(world: &mut World) -> Entity {
    world
        .query_filtered::<Entity, With<PlayerControlled>>()
        .iter(world)
        .next()
        .unwrap()
}

pub fn player_actor(world: &mut World) -> Actor {
    *world
        .query_filtered::<&Actor, With<PlayerControlled>>()
        .iter(world)
        .next()
        .unwrap()
}

pub fn player_motion(world: &mut World) -> PlayerMotion {
    *world
        .query_filtered::<&PlayerMotion, With<PlayerControlled>>()
        .iter(world)
        .next()
        .unwrap()
}

pub fn ghost_entity(world: &mut World, ghost: Ghost) -> Entity {
    world
        .query::<(Entity, &Ghost)>()
        .iter(world)
        .find(|(_, g)| **g == ghost)
        .map(|(entity, _)| entity)
        .unwrap()
}

pub fn ghost(world: &mut World, ghost: Ghost) -> (Actor, GhostState) {
    world
        .query::<(&Ghost, &Actor, &GhostState)>()
        .iter(world)
        .find(|(g, ..)| **g == ghost)
        .map(|(_, actor, state)| (*actor, *state))
        .unwrap()
}

/// A bare world with the resources the movement systems read.
pub fn create_test_world(maze: Maze) -> World {
    let mut world = World::new();
    world.insert_resource(maze);
    world.insert_resource(DeltaTime(Duration::from_nanos(8_333_333)));
    world.insert_resource(Level::default());
    world.init_resource::<Events<GameEvent>>();
    world.init_resource::<Events<GameError>>();
    world
}

pub fn room() -> Maze {
    Maze::new(&ROOM, &[], TILE).unwrap()
}

/// Spawns a bare player (no Frozen marker) at a grid position.
pub fn spawn_test_player(world: &mut World, cell: Vec2, direction: Direction) -> Entity {
    world
        .spawn((PlayerControlled, Actor::new(grid::to_pixel(cell, TILE), direction), PlayerMotion::default()))
        .id()
}

pub fn spawn_test_ghost(world: &mut World, ghost: Ghost, cell: Vec2, direction: Direction, state: GhostState) -> Entity {
    world
        .spawn((ghost, Actor::new(grid::to_pixel(cell, TILE), direction), state))
        .id()
}
