use bevy_ecs::system::RunSystemOnce;
use glam::Vec2;
use pacman_core::{
    map::{builder::Maze, direction::Direction, grid},
    systems::{player_movement_system, Actor, PlayerControlled, PlayerMotion},
};
use pretty_assertions::assert_eq;

mod common;

#[test]
fn test_player_warps_through_tunnel() {
    let mut world = common::create_test_world(Maze::standard(common::TILE).unwrap());
    world.spawn((
        PlayerControlled,
        Actor::new(grid::to_pixel(Vec2::new(-0.7, 14.0), common::TILE), Direction::Left),
        PlayerMotion {
            desired: Direction::Left,
            moving: true,
        },
    ));

    world.run_system_once(player_movement_system).unwrap();

    let actor = common::player_actor(&mut world);
    assert_eq!(actor.position, grid::to_pixel(Vec2::new(27.25, 14.0), common::TILE));
    assert_eq!(actor.direction, Direction::Left);
}

#[test]
fn test_stationary_player_does_not_move() {
    let mut world = common::create_test_world(Maze::standard(common::TILE).unwrap());
    let start = grid::to_pixel(Vec2::new(6.0, 5.0), common::TILE);
    world.spawn((PlayerControlled, Actor::new(start, Direction::Left), PlayerMotion::default()));

    world.run_system_once(player_movement_system).unwrap();

    let actor = common::player_actor(&mut world);
    assert_eq!(actor.position, start);
    assert_eq!(actor.old_position, start);
}

#[test]
fn test_player_turns_at_junction() {
    let mut world = common::create_test_world(Maze::standard(common::TILE).unwrap());
    let start = grid::to_pixel(Vec2::new(6.0, 5.0), common::TILE);
    world.spawn((
        PlayerControlled,
        Actor::new(start, Direction::Left),
        PlayerMotion {
            desired: Direction::Down,
            moving: true,
        },
    ));

    world.run_system_once(player_movement_system).unwrap();

    let actor = common::player_actor(&mut world);
    assert_eq!(actor.direction, Direction::Down);
    assert_eq!(actor.position.x, start.x);
    assert!(actor.position.y > start.y);
}
