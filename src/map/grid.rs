//! Conversions between pixel space and grid space.
//!
//! Pixel positions are `(left, top)` pairs stored as `Vec2 { x: left, y: top }`. Grid positions
//! use a 0.5 offset, so an actor whose pixel origin sits on a tile corner has a grid position on
//! a cell boundary: `grid = pixel / tile + 0.5`.

use glam::Vec2;

use crate::map::direction::Direction;

/// Converts a pixel position into grid coordinates.
pub fn to_grid(pixel: Vec2, tile_size: f32) -> Vec2 {
    pixel / tile_size + Vec2::splat(0.5)
}

/// Converts grid coordinates into a pixel position. Exact inverse of [`to_grid`].
pub fn to_pixel(grid: Vec2, tile_size: f32) -> Vec2 {
    (grid - Vec2::splat(0.5)) * tile_size
}

/// The displacement produced by moving `distance` in `direction`. Up and left are negative.
pub fn velocity_vector(direction: Direction, distance: f32) -> Vec2 {
    direction.as_vec2() * distance
}

/// True when moving from `old` to `new` changes the integer cell on either axis.
pub fn crosses_cell_boundary(old: Vec2, new: Vec2) -> bool {
    old.x.floor() != new.x.floor() || old.y.floor() != new.y.floor()
}

/// Rounds the axis of travel to its cell boundary and returns the matching pixel position.
pub fn snap(grid: Vec2, direction: Direction, tile_size: f32) -> Vec2 {
    let snapped = if direction.is_vertical() {
        Vec2::new(grid.x, direction.round(grid.y))
    } else {
        Vec2::new(direction.round(grid.x), grid.y)
    };
    to_pixel(snapped, tile_size)
}

/// Whether the pixel position sits exactly on the boundary for its heading, making it a decision point.
pub fn is_aligned(pixel: Vec2, direction: Direction, tile_size: f32) -> bool {
    pixel == snap(to_grid(pixel, tile_size), direction, tile_size)
}

/// Relocates an actor that ran out of one tunnel end to the other end of the same row.
///
/// Returns the new pixel position, or `None` if the actor has not left the board.
pub fn warp(pixel: Vec2, tile_size: f32, width: usize) -> Option<Vec2> {
    let grid = to_grid(pixel, tile_size);
    let width = width as f32;
    let x = if grid.x < -0.75 {
        width - 0.75
    } else if grid.x > width - 0.25 {
        -0.25
    } else {
        return None;
    };
    Some(to_pixel(Vec2::new(x, grid.y), tile_size))
}
