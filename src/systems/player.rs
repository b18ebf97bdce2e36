use bevy_ecs::{
    event::{EventReader, EventWriter},
    query::{Has, With},
    system::{Query, Res},
};
use glam::Vec2;
use tracing::{trace, warn};

use crate::{
    constants::speed,
    error::GameError,
    events::{GameCommand, GameEvent},
    map::{builder::Maze, direction::Direction, grid},
    systems::{
        components::{Actor, DeltaTime, Frozen, PlayerControlled, PlayerMotion},
        stage::GameStage,
    },
};

/// Player speed in pixels per millisecond.
pub fn player_speed(tile_size: f32) -> f32 {
    tile_size * speed::PLAYER_TILES_PER_SECOND / 1000.0
}

/// Computes the player's next position for one step of `distance` pixels.
///
/// At a decision point the desired heading wins if it is open, then the current heading, and the
/// player stops if both are blocked. Between decision points only an immediate reversal is allowed,
/// and a step that would leave the current cell is cut short at its boundary.
pub fn step_player(maze: &Maze, actor: &mut Actor, motion: &mut PlayerMotion, distance: f32) -> Vec2 {
    let tile = maze.tile_size();
    let grid_position = grid::to_grid(actor.position, tile);

    let desired = actor.position + grid::velocity_vector(motion.desired, distance);
    let alternate = actor.position + grid::velocity_vector(actor.direction, distance);

    if grid::is_aligned(actor.position, actor.direction, tile) {
        if !maze.is_wall(grid::to_grid(desired, tile), motion.desired) {
            actor.direction = motion.desired;
            return desired;
        }
        if maze.is_wall(grid::to_grid(alternate, tile), actor.direction) {
            motion.moving = false;
            return actor.position;
        }
        return alternate;
    }

    if motion.desired == actor.direction.opposite() {
        actor.direction = motion.desired;
        return desired;
    }

    if grid::crosses_cell_boundary(grid_position, grid::to_grid(alternate, tile)) {
        return grid::snap(grid_position, actor.direction, tile);
    }
    alternate
}

/// Applies heading commands.
pub fn player_control_system(
    mut events: EventReader<GameEvent>,
    stage: Res<GameStage>,
    mut players: Query<&mut PlayerMotion, With<PlayerControlled>>,
    mut errors: EventWriter<GameError>,
) {
    for event in events.read() {
        let GameEvent::Command(command) = event else {
            continue;
        };
        match command {
            GameCommand::SetDesiredHeading(direction) => {
                if !stage.accepts_input() {
                    continue;
                }
                match players.single_mut() {
                    Ok(mut motion) => {
                        trace!(direction = direction.as_ref(), "Desired heading changed");
                        motion.desired = *direction;
                        if stage.allows_movement() {
                            motion.moving = true;
                        }
                    }
                    Err(e) => {
                        errors.write(GameError::InvalidState(format!(
                            "No/multiple entities queried for player system: {e}"
                        )));
                    }
                }
            }
            // Both take effect while the schedule is stopped, so the session handles them.
            GameCommand::Exit | GameCommand::TogglePause => {}
        }
    }
}

/// Moves the player one tick, then applies the tunnel warp.
///
/// A position overlapping a wall should never happen; if it does, the player is put back where it
/// was and the tick carries on.
pub fn player_movement_system(
    maze: Res<Maze>,
    delta_time: Res<DeltaTime>,
    mut players: Query<(&mut Actor, &mut PlayerMotion, Has<Frozen>), With<PlayerControlled>>,
    mut errors: EventWriter<GameError>,
) {
    let tile = maze.tile_size();
    let distance = player_speed(tile) * delta_time.millis();

    for (mut actor, mut motion, frozen) in players.iter_mut() {
        actor.old_position = actor.position;
        if frozen || !motion.moving {
            continue;
        }

        let mut next = step_player(&maze, &mut actor, &mut motion, distance);
        if let Some(warped) = grid::warp(next, tile, maze.width()) {
            trace!(row = grid::to_grid(next, tile).y, "Player warped through the tunnel");
            next = warped;
        }

        let next_grid = grid::to_grid(next, tile);
        if maze.overlaps_wall(next_grid) {
            warn!(grid = ?next_grid, direction = ?actor.direction, "Player computed inside a wall, clamping");
            errors.write(GameError::LogicInvariant {
                actor: "player".to_string(),
                grid: next_grid,
            });
            continue;
        }
        actor.position = next;
    }
}

/// Spawn point of the player in pixels.
pub fn player_spawn(tile_size: f32) -> Actor {
    Actor::new(
        grid::to_pixel(crate::constants::positions::PLAYER, tile_size),
        Direction::Left,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn maze() -> Maze {
        Maze::standard(8.0).unwrap()
    }

    #[test]
    fn test_player_speed() {
        assert_eq!(player_speed(8.0), 0.088);
    }

    #[test]
    fn test_turn_taken_at_decision_point() {
        let maze = maze();
        // (6, 23) is a junction with an open corridor upwards.
        let mut actor = Actor::new(grid::to_pixel(Vec2::new(6.0, 23.0), 8.0), Direction::Left);
        let mut motion = PlayerMotion {
            desired: Direction::Up,
            moving: true,
        };
        let next = step_player(&maze, &mut actor, &mut motion, 1.0);
        assert_eq!(actor.direction, Direction::Up);
        assert_eq!(next, actor.position - Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_blocked_both_ways_stops() {
        let maze = maze();
        // Wall to the left of (1, 1) and above it.
        let mut actor = Actor::new(grid::to_pixel(Vec2::new(1.0, 1.0), 8.0), Direction::Left);
        let mut motion = PlayerMotion {
            desired: Direction::Up,
            moving: true,
        };
        let next = step_player(&maze, &mut actor, &mut motion, 1.0);
        assert_eq!(next, actor.position);
        assert!(!motion.moving);
    }

    #[test]
    fn test_reversal_mid_cell() {
        let maze = maze();
        let mut actor = Actor::new(grid::to_pixel(Vec2::new(13.5, 23.0), 8.0), Direction::Left);
        let mut motion = PlayerMotion {
            desired: Direction::Right,
            moving: true,
        };
        step_player(&maze, &mut actor, &mut motion, 1.0);
        assert_eq!(actor.direction, Direction::Right);
    }

    #[test]
    fn test_snaps_at_cell_boundary() {
        let maze = maze();
        let mut actor = Actor::new(grid::to_pixel(Vec2::new(13.1, 23.0), 8.0), Direction::Left);
        let mut motion = PlayerMotion {
            desired: Direction::Left,
            moving: true,
        };
        let next = step_player(&maze, &mut actor, &mut motion, 2.0);
        assert_eq!(next, grid::to_pixel(Vec2::new(13.0, 23.0), 8.0));
    }
}
