use bevy_ecs::{event::Events, system::RunSystemOnce, world::World};
use glam::Vec2;
use pacman_core::{
    events::{GameEvent, PointsKind},
    map::{builder::Maze, direction::Direction},
    systems::{pickup_collision_system, Frozen, Pickup, PickupKind, ProximityScan},
};
use pretty_assertions::assert_eq;

mod common;

fn world_with_player_at(cell: Vec2) -> World {
    let mut world = common::create_test_world(Maze::standard(common::TILE).unwrap());
    world.init_resource::<ProximityScan>();
    common::spawn_test_player(&mut world, cell, Direction::Left);
    world
}

fn drain_events(world: &mut World) -> Vec<GameEvent> {
    world.resource_mut::<Events<GameEvent>>().drain().collect()
}

#[test]
fn test_dot_under_player_is_consumed() {
    let mut world = world_with_player_at(Vec2::new(6.0, 23.0));
    let under = world.spawn(Pickup::new(PickupKind::Dot, Vec2::new(6.0, 23.0), 10)).id();
    let further = world.spawn(Pickup::new(PickupKind::Dot, Vec2::new(9.0, 23.0), 10)).id();

    world.run_system_once(pickup_collision_system).unwrap();

    assert!(world.get::<Pickup>(under).unwrap().consumed);
    assert!(!world.get::<Pickup>(further).unwrap().consumed);
    assert!(world.get::<Pickup>(further).unwrap().near);
    assert_eq!(
        drain_events(&mut world),
        vec![
            GameEvent::AwardPoints {
                amount: 10,
                kind: PointsKind::Dot
            },
            GameEvent::DotEaten
        ]
    );
}

#[test]
fn test_power_pellet_raises_power_up() {
    let mut world = world_with_player_at(Vec2::new(1.0, 23.0));
    world.spawn(Pickup::new(PickupKind::PowerPellet, Vec2::new(1.0, 23.0), 50));

    world.run_system_once(pickup_collision_system).unwrap();

    assert_eq!(
        drain_events(&mut world),
        vec![
            GameEvent::AwardPoints {
                amount: 50,
                kind: PointsKind::PowerPellet
            },
            GameEvent::DotEaten,
            GameEvent::PowerUp
        ]
    );
}

#[test]
fn test_consumed_pickup_is_not_counted_twice() {
    let mut world = world_with_player_at(Vec2::new(6.0, 23.0));
    world.spawn(Pickup::new(PickupKind::Dot, Vec2::new(6.0, 23.0), 10));

    world.run_system_once(pickup_collision_system).unwrap();
    drain_events(&mut world);
    world.run_system_once(pickup_collision_system).unwrap();

    assert_eq!(drain_events(&mut world), vec![]);
}

#[test]
fn test_frozen_player_collects_nothing() {
    let mut world = world_with_player_at(Vec2::new(6.0, 23.0));
    let player = common::player_entity(&mut world);
    world.entity_mut(player).insert(Frozen);
    let dot = world.spawn(Pickup::new(PickupKind::Dot, Vec2::new(6.0, 23.0), 10)).id();

    world.run_system_once(pickup_collision_system).unwrap();

    assert!(!world.get::<Pickup>(dot).unwrap().consumed);
    assert_eq!(drain_events(&mut world), vec![]);
}

#[test]
fn test_far_pickups_are_skipped_until_rescan() {
    let mut world = world_with_player_at(Vec2::new(6.0, 23.0));
    let far = world.spawn(Pickup::new(PickupKind::Dot, Vec2::new(26.0, 1.0), 10)).id();

    world.run_system_once(pickup_collision_system).unwrap();
    assert!(!world.get::<Pickup>(far).unwrap().near);
    assert!(world.resource::<ProximityScan>().until_rescan > std::time::Duration::ZERO);
}
