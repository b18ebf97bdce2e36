use std::time::Duration;

use bevy_ecs::{
    component::Component,
    event::EventWriter,
    query::{Has, With},
    resource::Resource,
    system::{Query, Res, ResMut},
};
use glam::Vec2;
use strum_macros::AsRefStr;
use tracing::{debug, trace};

use crate::{
    constants::{positions, scoring, timing, MapTile},
    error::GameError,
    events::{GameEvent, PointsKind},
    map::builder::Maze,
    systems::{
        components::{Actor, DeltaTime, Frozen, PlayerControlled},
        player::player_speed,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum PickupKind {
    Dot,
    PowerPellet,
    Fruit,
}

impl PickupKind {
    pub fn points_kind(&self) -> PointsKind {
        match self {
            PickupKind::Dot => PointsKind::Dot,
            PickupKind::PowerPellet => PointsKind::PowerPellet,
            PickupKind::Fruit => PointsKind::Fruit,
        }
    }
}

/// An axis-aligned square in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub origin: Vec2,
    pub size: f32,
}

impl Hitbox {
    pub fn overlaps(&self, other: &Hitbox) -> bool {
        self.origin.x < other.origin.x + other.size
            && self.origin.x + self.size > other.origin.x
            && self.origin.y < other.origin.y + other.size
            && self.origin.y + self.size > other.origin.y
    }
}

/// Hitbox of the player: one tile, centred on the actor.
pub fn player_hitbox(position: Vec2, tile_size: f32) -> Hitbox {
    Hitbox {
        origin: position + Vec2::splat(tile_size / 2.0),
        size: tile_size,
    }
}

/// A collectible item sitting on the maze.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Pickup {
    pub kind: PickupKind,
    /// Column and row of the item. The fruit sits between two columns.
    pub cell: Vec2,
    pub value: u32,
    /// Set once eaten; cleared only when the level resets or the fruit is re-armed.
    pub consumed: bool,
    /// Whether the player was close enough at the last proximity scan.
    pub near: bool,
}

impl Pickup {
    pub fn new(kind: PickupKind, cell: Vec2, value: u32) -> Self {
        Self {
            kind,
            cell,
            value,
            consumed: false,
            near: false,
        }
    }

    /// The bonus fruit starts out hidden until a dot threshold arms it.
    pub fn fruit(level: u32) -> Self {
        Self {
            consumed: true,
            ..Self::new(PickupKind::Fruit, positions::FRUIT, scoring::fruit_points(level))
        }
    }

    /// The collision box, in pixels.
    pub fn hitbox(&self, tile_size: f32) -> Hitbox {
        let column = self.cell.x * tile_size;
        let row = self.cell.y * tile_size;
        match self.kind {
            PickupKind::Dot => Hitbox {
                origin: Vec2::new(column + tile_size * 3.0 / 8.0, row + tile_size * 3.0 / 8.0),
                size: tile_size / 4.0,
            },
            PickupKind::PowerPellet => Hitbox {
                origin: Vec2::new(column, row),
                size: tile_size,
            },
            PickupKind::Fruit => Hitbox {
                origin: Vec2::new(column - tile_size / 2.0, row - tile_size / 2.0),
                size: tile_size * 2.0,
            },
        }
    }

    pub fn center(&self, tile_size: f32) -> Vec2 {
        self.cell * tile_size
    }
}

/// Builds the dot and power pellet pickups for every item tile of the maze.
pub fn maze_pickups(maze: &Maze) -> Vec<Pickup> {
    maze.pickups()
        .filter_map(|(cell, tile)| {
            let cell = cell.as_vec2();
            match tile {
                MapTile::Dot => Some(Pickup::new(PickupKind::Dot, cell, scoring::DOT)),
                MapTile::PowerPellet => Some(Pickup::new(PickupKind::PowerPellet, cell, scoring::POWER_PELLET)),
                _ => None,
            }
        })
        .collect()
}

/// Countdown to the next proximity scan.
#[derive(Resource, Debug, Default)]
pub struct ProximityScan {
    pub until_rescan: Duration,
}

impl ProximityScan {
    /// Forces a scan on the next tick.
    pub fn invalidate(&mut self) {
        self.until_rescan = Duration::ZERO;
    }
}

/// Tests the player against nearby uneaten pickups.
///
/// Only pickups flagged by the periodic proximity scan are tested. Each pickup is consumed at most
/// once and raises its points, plus the dot and power-up events for dots and power pellets.
pub fn pickup_collision_system(
    maze: Res<Maze>,
    delta_time: Res<DeltaTime>,
    mut scan: ResMut<ProximityScan>,
    player: Query<(&Actor, Has<Frozen>), With<PlayerControlled>>,
    mut pickups: Query<&mut Pickup>,
    mut events: EventWriter<GameEvent>,
    mut errors: EventWriter<GameError>,
) {
    let tile = maze.tile_size();
    let (player, frozen) = match player.single() {
        Ok(player) => player,
        Err(e) => {
            errors.write(GameError::InvalidState(format!(
                "No/multiple entities queried for player, could not test pickups: {e}"
            )));
            return;
        }
    };

    if scan.until_rescan <= delta_time.0 {
        let reach = player_speed(tile) * timing::PROXIMITY_REACH_MS;
        let player_center = player.position + Vec2::splat(tile);
        let mut nearby = 0;
        for mut pickup in pickups.iter_mut() {
            if pickup.consumed {
                continue;
            }
            pickup.near = pickup.center(tile).distance(player_center) <= reach;
            nearby += usize::from(pickup.near);
        }
        trace!(nearby, "Pickup proximity rescanned");
        scan.until_rescan = timing::PROXIMITY_RESCAN;
    } else {
        scan.until_rescan -= delta_time.0;
    }

    if frozen {
        return;
    }

    let hitbox = player_hitbox(player.position, tile);
    for mut pickup in pickups.iter_mut() {
        if pickup.consumed || !pickup.near || !pickup.hitbox(tile).overlaps(&hitbox) {
            continue;
        }
        pickup.consumed = true;
        debug!(kind = pickup.kind.as_ref(), cell = ?pickup.cell, value = pickup.value, "Pickup consumed");

        events.write(GameEvent::AwardPoints {
            amount: pickup.value,
            kind: pickup.kind.points_kind(),
        });
        match pickup.kind {
            PickupKind::Dot => {
                events.write(GameEvent::DotEaten);
            }
            PickupKind::PowerPellet => {
                events.write(GameEvent::DotEaten);
                events.write(GameEvent::PowerUp);
            }
            PickupKind::Fruit => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::grid;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dot_hitbox_is_inset() {
        let dot = Pickup::new(PickupKind::Dot, Vec2::new(1.0, 1.0), scoring::DOT);
        assert_eq!(
            dot.hitbox(8.0),
            Hitbox {
                origin: Vec2::new(11.0, 11.0),
                size: 2.0
            }
        );
    }

    #[test]
    fn test_player_on_cell_overlaps_its_dot() {
        let tile = 8.0;
        let dot = Pickup::new(PickupKind::Dot, Vec2::new(6.0, 23.0), scoring::DOT);
        let on_cell = player_hitbox(grid::to_pixel(Vec2::new(6.0, 23.0), tile), tile);
        let next_cell = player_hitbox(grid::to_pixel(Vec2::new(7.0, 23.0), tile), tile);
        assert!(dot.hitbox(tile).overlaps(&on_cell));
        assert!(!dot.hitbox(tile).overlaps(&next_cell));
    }

    #[test]
    fn test_maze_pickups() {
        let maze = Maze::standard(8.0).unwrap();
        let pickups = maze_pickups(&maze);
        assert_eq!(pickups.len(), 244);
        assert_eq!(pickups.iter().filter(|p| p.kind == PickupKind::PowerPellet).count(), 4);
    }

    #[test]
    fn test_fruit_starts_consumed() {
        let fruit = Pickup::fruit(3);
        assert!(fruit.consumed);
        assert_eq!(fruit.value, 500);
    }
}
