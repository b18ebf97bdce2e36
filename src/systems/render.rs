//! Presentation of the simulation state.
//!
//! Rendering never runs inside the logic schedule. Between ticks the session walks the world and
//! hands every visible actor to a [`Renderer`], blending each one from where it stood at the start
//! of the latest tick towards where it stands now.

use bevy_ecs::{query::Without, resource::Resource, world::World};
use glam::Vec2;
use strum_macros::AsRefStr;
use tracing::trace;

use crate::constants::{CELL_SIZE, STUTTER_DISTANCE};
use crate::map::builder::Maze;
use crate::map::direction::Direction;
use crate::systems::components::{Actor, Ghost, GhostState, Hidden, PursuerMode};
use crate::systems::item::{Pickup, PickupKind};

/// Which actor a sprite belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorId {
    Player,
    Ghost(Ghost),
}

/// What a sprite should look like this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteState {
    pub direction: Direction,
    /// Pursuer mode, `None` for the player.
    pub mode: Option<PursuerMode>,
    /// Frightened pursuers alternate colour near the end of the episode.
    pub flash: bool,
}

/// How the maze itself is drawn.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum MazeStyle {
    #[default]
    Normal,
    /// The alternate colour shown while a cleared level flashes.
    Flash,
    /// Blacked out between rounds.
    Covered,
}

/// Drawing backend.
pub trait Renderer {
    /// Draws one actor at `pixel`, the top-left corner of its cell.
    fn present(&mut self, actor: ActorId, pixel: Vec2, sprite: SpriteState);

    fn present_maze(&mut self, _style: MazeStyle) {}

    fn present_pickup(&mut self, _kind: PickupKind, _pixel: Vec2) {}
}

/// Blends between two positions, or returns `None` when the jump is too large to be motion.
///
/// A tunnel warp moves an actor across the whole board in one tick; drawing it half-way would
/// flash it across the maze, so it is skipped for that frame.
pub fn interpolate(old: Vec2, new: Vec2, alpha: f32) -> Option<Vec2> {
    if old.distance(new) > STUTTER_DISTANCE {
        return None;
    }
    Some(old.lerp(new, alpha))
}

/// Hands every visible actor and pickup to `renderer`. Reads only.
pub fn present_frame(world: &mut World, alpha: f32, renderer: &mut dyn Renderer) {
    let style = world.get_resource::<MazeStyle>().copied().unwrap_or_default();
    renderer.present_maze(style);
    if style == MazeStyle::Covered {
        return;
    }

    let tile = world
        .get_resource::<Maze>()
        .map(|maze| maze.tile_size())
        .unwrap_or(CELL_SIZE as f32);

    let mut pickups = world.query_filtered::<&Pickup, Without<Hidden>>();
    for pickup in pickups.iter(world) {
        if !pickup.consumed {
            renderer.present_pickup(pickup.kind, pickup.cell * tile);
        }
    }

    let mut actors = world.query_filtered::<(&Actor, Option<&Ghost>, Option<&GhostState>), Without<Hidden>>();
    for (actor, ghost, state) in actors.iter(world) {
        let Some(pixel) = interpolate(actor.old_position, actor.position, alpha) else {
            trace!(old = ?actor.old_position, new = ?actor.position, "Skipping frame for warped actor");
            continue;
        };
        let id = match ghost {
            Some(ghost) => ActorId::Ghost(*ghost),
            None => ActorId::Player,
        };
        renderer.present(
            id,
            pixel,
            SpriteState {
                direction: actor.direction,
                mode: state.map(|state| state.mode),
                flash: state.is_some_and(|state| state.flash),
            },
        );
    }
}

/// A backend that logs each frame instead of drawing it.
#[derive(Debug, Default)]
pub struct TracingRenderer {
    pub frames: u64,
    pub sprites: u64,
}

impl Renderer for TracingRenderer {
    fn present(&mut self, actor: ActorId, pixel: Vec2, sprite: SpriteState) {
        self.sprites += 1;
        trace!(?actor, x = pixel.x, y = pixel.y, direction = sprite.direction.as_ref(), "Sprite");
    }

    fn present_maze(&mut self, style: MazeStyle) {
        self.frames += 1;
        trace!(frame = self.frames, style = style.as_ref(), "Frame");
    }
}
