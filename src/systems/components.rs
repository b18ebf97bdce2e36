use std::time::Duration;

use bevy_ecs::{component::Component, entity::Entity, resource::Resource};
use glam::Vec2;
use strum_macros::{AsRefStr, EnumIter};

use crate::constants::scoring;
use crate::map::direction::Direction;

/// A tag component for the entity controlled by the player.
#[derive(Default, Component)]
pub struct PlayerControlled;

/// The four pursuers. Blinky leads; Inky reads Blinky's position for its flanking target.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Ghost {
    Blinky,
    Pinky,
    Inky,
    Clyde,
}

/// Position and heading of a moving actor, in pixels.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Actor {
    pub position: Vec2,
    /// Position at the start of the latest logic tick, read only for render interpolation.
    pub old_position: Vec2,
    pub direction: Direction,
}

impl Actor {
    pub fn new(position: Vec2, direction: Direction) -> Self {
        Self {
            position,
            old_position: position,
            direction,
        }
    }

    /// Moves the actor without leaving an interpolation trail.
    pub fn teleport(&mut self, position: Vec2, direction: Direction) {
        self.position = position;
        self.old_position = position;
        self.direction = direction;
    }
}

/// Player-only movement state.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerMotion {
    /// Heading requested by input, applied at the next decision point.
    pub desired: Direction,
    /// Cleared when the player runs into a wall; set again by the next heading command.
    pub moving: bool,
}

impl Default for PlayerMotion {
    fn default() -> Self {
        Self {
            desired: Direction::Left,
            moving: false,
        }
    }
}

/// The behaviour a pursuer currently follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum PursuerMode {
    Scatter,
    Chase,
    Frightened,
    Eaten,
    Idle,
    Leaving,
}

/// The externally driven half of the scatter/chase clock.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    #[default]
    Scatter,
    Chase,
}

impl From<Phase> for PursuerMode {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Scatter => PursuerMode::Scatter,
            Phase::Chase => PursuerMode::Chase,
        }
    }
}

/// Progress through the pen choreography.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenRoutine {
    /// Bouncing inside the pen, waiting for release.
    Confined,
    /// Released and walking to the gate.
    Released,
    /// In the maze.
    Outside,
}

/// Base speed tier of a pursuer. Only Blinky ever leaves `Slow`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Aggression {
    #[default]
    Slow,
    Medium,
    Fast,
}

impl Aggression {
    pub fn escalate(self) -> Self {
        match self {
            Aggression::Slow => Aggression::Medium,
            Aggression::Medium | Aggression::Fast => Aggression::Fast,
        }
    }

    /// Past the first threshold the lead pursuer ignores scatter and keeps hunting.
    pub fn is_aggressive(self) -> bool {
        self > Aggression::Slow
    }
}

/// Per-pursuer AI state.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct GhostState {
    pub mode: PursuerMode,
    /// The scatter/chase value that applies whenever the pursuer is not frightened, eaten or penned.
    pub phase: Phase,
    pub pen: PenRoutine,
    pub aggression: Aggression,
    /// Set during the eat-pursuer freeze. Eaten pursuers keep moving.
    pub paused: bool,
    pub allow_collision: bool,
    /// Alternates while a frightened episode is running out.
    pub flash: bool,
}

/// Read-only link from the flanking pursuer to the lead pursuer it reflects around.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlankingReference(pub Entity);

/// Marker for entities that skip logic updates entirely.
#[derive(Component, Debug, Default)]
pub struct Frozen;

/// Marker for entities that are not drawn.
#[derive(Component, Debug, Default)]
pub struct Hidden;

/// Session-level flags.
#[derive(Resource, Debug, Default)]
pub struct GlobalState {
    /// Set when the session should end (explicit exit or the game-over sequence finishing).
    pub exit: bool,
}

#[derive(Resource, Debug, Default)]
pub struct ScoreResource(pub u32);

/// Best score seen so far, loaded from the high-score store at startup.
#[derive(Resource, Debug, Default)]
pub struct HighScore(pub u32);

/// A resource to store the number of spare lives.
#[derive(Resource, Debug)]
pub struct PlayerLives(pub u8);

impl Default for PlayerLives {
    fn default() -> Self {
        Self(scoring::STARTING_LIVES)
    }
}

/// The current level, starting at 1.
#[derive(Resource, Debug)]
pub struct Level(pub u32);

impl Default for Level {
    fn default() -> Self {
        Self(1)
    }
}

/// Simulated time covered by one logic tick.
#[derive(Resource, Debug, Clone, Copy)]
pub struct DeltaTime(pub Duration);

impl DeltaTime {
    pub fn millis(&self) -> f32 {
        self.0.as_secs_f32() * 1000.0
    }
}
