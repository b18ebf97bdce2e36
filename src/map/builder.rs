//! Maze construction and tile queries.

use bevy_ecs::resource::Resource;
use glam::{UVec2, Vec2};
use tracing::debug;

use crate::constants::{MapTile, RAW_BOARD, TUNNEL_ROWS};
use crate::error::{GameResult, MapError};
use crate::map::direction::Direction;
use crate::map::parser::MapTileParser;

/// The immutable maze the actors move through.
#[derive(Resource, Debug, Clone)]
pub struct Maze {
    /// Tile rows, indexed `[row][column]`.
    tiles: Vec<Vec<MapTile>>,
    /// Rows whose out-of-range columns are open, allowing the wraparound.
    tunnel_rows: Vec<usize>,
    tile_size: f32,
}

impl Maze {
    /// Builds a maze from a raw board layout.
    ///
    /// # Errors
    ///
    /// Fails when the layout cannot be parsed, when a tunnel row lies outside the board,
    /// or when the tile size is not a positive number.
    pub fn new(raw_board: &[&str], tunnel_rows: &[usize], tile_size: f32) -> GameResult<Maze> {
        let tiles = MapTileParser::parse_board(raw_board)?;

        if !(tile_size.is_finite() && tile_size > 0.0) {
            return Err(MapError::InvalidConfig(format!("tile size must be positive, got {tile_size}")).into());
        }
        if let Some(&row) = tunnel_rows.iter().find(|&&row| row >= tiles.len()) {
            return Err(MapError::TunnelOutOfRange(row).into());
        }

        let maze = Maze {
            tiles,
            tunnel_rows: tunnel_rows.to_vec(),
            tile_size,
        };
        debug!(
            width = maze.width(),
            height = maze.height(),
            dots = maze.dot_count(),
            tile_size,
            "Maze built"
        );
        Ok(maze)
    }

    /// Builds the reference 28x31 maze.
    pub fn standard(tile_size: f32) -> GameResult<Maze> {
        Self::new(&RAW_BOARD, &TUNNEL_ROWS, tile_size)
    }

    pub fn width(&self) -> usize {
        self.tiles[0].len()
    }

    pub fn height(&self) -> usize {
        self.tiles.len()
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn is_tunnel_row(&self, row: i64) -> bool {
        row >= 0 && self.tunnel_rows.contains(&(row as usize))
    }

    /// Returns the tile at the given cell, or `None` if it lies outside the board.
    pub fn tile(&self, column: i64, row: i64) -> Option<MapTile> {
        if column < 0 || row < 0 {
            return None;
        }
        self.tiles.get(row as usize)?.get(column as usize).copied()
    }

    /// Whether the cell blocks movement. Off-board cells are open only on tunnel rows.
    fn blocks(&self, column: i64, row: i64) -> bool {
        match self.tile(column, row) {
            Some(tile) => tile == MapTile::Wall,
            None => !self.is_tunnel_row(row),
        }
    }

    /// Checks whether a candidate grid position, reached by travelling in `direction`, lies in a wall.
    ///
    /// Both coordinates are rounded towards the direction of travel before indexing.
    pub fn is_wall(&self, grid: Vec2, direction: Direction) -> bool {
        let column = direction.round(grid.x) as i64;
        let row = direction.round(grid.y) as i64;
        self.blocks(column, row)
    }

    /// Whether a pursuer can step onto the cell at `grid`. Non-integral coordinates never name a cell.
    pub fn is_open(&self, grid: Vec2) -> bool {
        if grid.x.fract() != 0.0 || grid.y.fract() != 0.0 {
            return false;
        }
        matches!(self.tile(grid.x as i64, grid.y as i64), Some(tile) if tile != MapTile::Wall)
    }

    /// Whether an actor centred at `grid` overlaps a wall cell on either side of its position.
    pub fn overlaps_wall(&self, grid: Vec2) -> bool {
        let columns = [grid.x.floor() as i64, grid.x.ceil() as i64];
        let rows = [grid.y.floor() as i64, grid.y.ceil() as i64];
        rows.iter()
            .any(|&row| columns.iter().any(|&column| self.blocks(column, row)))
    }

    /// Every dot and power pellet on the board, as `(cell, tile)`.
    pub fn pickups(&self) -> impl Iterator<Item = (UVec2, MapTile)> + '_ {
        self.tiles.iter().enumerate().flat_map(|(row, tiles)| {
            tiles.iter().enumerate().filter_map(move |(column, &tile)| {
                matches!(tile, MapTile::Dot | MapTile::PowerPellet).then(|| (UVec2::new(column as u32, row as u32), tile))
            })
        })
    }

    /// The number of dots and power pellets a level starts with.
    pub fn dot_count(&self) -> u32 {
        self.pickups().count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_standard_dimensions() {
        let maze = Maze::standard(8.0).unwrap();
        assert_eq!(maze.width(), 28);
        assert_eq!(maze.height(), 31);
        assert_eq!(maze.dot_count(), 244);
    }

    #[test]
    fn test_off_board_open_only_on_tunnel_rows() {
        let maze = Maze::standard(8.0).unwrap();
        assert!(!maze.is_wall(Vec2::new(-0.5, 14.0), Direction::Left));
        assert!(!maze.is_wall(Vec2::new(28.2, 14.0), Direction::Right));
        assert!(maze.is_wall(Vec2::new(-0.5, 5.0), Direction::Left));
        assert!(maze.is_wall(Vec2::new(3.0, -0.5), Direction::Up));
    }

    #[test]
    fn test_is_open_requires_integral_cell() {
        let maze = Maze::standard(8.0).unwrap();
        assert!(maze.is_open(Vec2::new(1.0, 1.0)));
        assert!(!maze.is_open(Vec2::new(1.5, 1.0)));
        assert!(!maze.is_open(Vec2::new(0.0, 0.0)));
        assert!(!maze.is_open(Vec2::new(-1.0, 14.0)));
    }

    #[test]
    fn test_overlaps_wall() {
        let maze = Maze::standard(8.0).unwrap();
        assert!(!maze.overlaps_wall(Vec2::new(13.5, 23.0)));
        assert!(maze.overlaps_wall(Vec2::new(4.5, 23.0)));
    }

    #[test]
    fn test_invalid_tile_size() {
        assert!(matches!(Maze::standard(0.0), Err(GameError::Map(MapError::InvalidConfig(_)))));
    }

    #[test]
    fn test_tunnel_row_out_of_range() {
        let result = Maze::new(&["###", "#.#", "###"], &[7], 8.0);
        assert!(matches!(result, Err(GameError::Map(MapError::TunnelOutOfRange(7)))));
    }
}
