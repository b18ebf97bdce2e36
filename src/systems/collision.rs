use bevy_ecs::{
    event::EventWriter,
    query::{Has, With, Without},
    system::{Query, Res},
};
use glam::Vec2;
use tracing::debug;

use crate::{
    error::GameError,
    events::GameEvent,
    map::{builder::Maze, grid},
    systems::components::{Actor, Frozen, Ghost, GhostState, PlayerControlled, PursuerMode},
};

/// Whether a pursuer at `ghost` touches the player at `player`, both in grid coordinates.
pub fn touches(ghost: Vec2, player: Vec2) -> bool {
    ghost.distance(player) < 1.0
}

/// Resolves contact between the player and the pursuers.
///
/// A frightened pursuer is eaten on the spot so it stops counting as a threat this tick; any other
/// live pursuer kills the player. At most one contact is reported per tick, since either outcome
/// freezes the rest of the field.
pub fn ghost_collision_system(
    maze: Res<Maze>,
    player: Query<(&Actor, Has<Frozen>), With<PlayerControlled>>,
    mut ghosts: Query<(&Ghost, &Actor, &mut GhostState, Has<Frozen>), Without<PlayerControlled>>,
    mut events: EventWriter<GameEvent>,
    mut errors: EventWriter<GameError>,
) {
    let tile = maze.tile_size();
    let (player, player_frozen) = match player.single() {
        Ok(player) => player,
        Err(e) => {
            errors.write(GameError::InvalidState(format!(
                "No/multiple entities queried for player, could not test pursuer contact: {e}"
            )));
            return;
        }
    };
    if player_frozen {
        return;
    }
    let player_grid = grid::to_grid(player.position, tile);

    for (ghost, actor, mut state, frozen) in ghosts.iter_mut() {
        if frozen || state.is_eaten() || !state.allow_collision {
            continue;
        }
        if !touches(grid::to_grid(actor.position, tile), player_grid) {
            continue;
        }

        if state.is_frightened() {
            debug!(ghost = ghost.as_ref(), "Frightened pursuer eaten");
            state.mode = PursuerMode::Eaten;
            state.flash = false;
            events.write(GameEvent::EatGhost { ghost: *ghost });
        } else {
            debug!(ghost = ghost.as_ref(), mode = state.mode.as_ref(), "Player caught");
            events.write(GameEvent::DeathSequence);
        }
        return;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_distance_is_strict() {
        assert!(touches(Vec2::new(5.0, 5.0), Vec2::new(5.5, 5.5)));
        assert!(!touches(Vec2::new(5.0, 5.0), Vec2::new(6.0, 5.0)));
    }
}
