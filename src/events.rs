use bevy_ecs::prelude::*;

use crate::map::direction::Direction;
use crate::systems::components::Ghost;

/// Requests coming from outside the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameCommand {
    Exit,
    SetDesiredHeading(Direction),
    TogglePause,
}

/// What a batch of points was awarded for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointsKind {
    Dot,
    PowerPellet,
    Fruit,
    Ghost,
}

/// Gameplay events raised by collision and movement, drained by the orchestrator once per tick.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Command(GameCommand),
    /// A dot or power pellet was consumed.
    DotEaten,
    PowerUp,
    EatGhost { ghost: Ghost },
    /// An eaten pursuer reached the pen centre and recovered.
    RestoreGhost { ghost: Ghost },
    DeathSequence,
    AwardPoints { amount: u32, kind: PointsKind },
    /// A released pursuer stepped out of the pen.
    ReleaseGhost { ghost: Ghost },
}

impl From<GameCommand> for GameEvent {
    fn from(command: GameCommand) -> Self {
        GameEvent::Command(command)
    }
}
