//! This module contains all the constants used in the simulation.

use std::time::Duration;

use glam::{UVec2, Vec2};

/// Default logic rate, in ticks per second.
pub const LOGIC_RATE: u32 = 120;
/// Default render rate, in frames per second.
pub const RENDER_RATE: u32 = 60;

/// The duration of a single logic tick at the default rate.
pub const LOGIC_TIME: Duration = Duration::from_nanos(1_000_000_000 / LOGIC_RATE as u64);
/// The duration of a single render frame at the default rate.
pub const LOOP_TIME: Duration = Duration::from_nanos(1_000_000_000 / RENDER_RATE as u64);

/// The size of each cell, in pixels.
pub const CELL_SIZE: u32 = 8;
/// The size of the game board, in cells.
pub const BOARD_CELL_SIZE: UVec2 = UVec2::new(28, 31);

/// Rows on which the maze is open past its horizontal edges.
pub const TUNNEL_ROWS: [usize; 1] = [14];

/// An enum representing the different types of tiles on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapTile {
    /// An empty tile.
    Empty,
    /// A wall tile.
    Wall,
    /// A regular pac-dot.
    Dot,
    /// A power pellet.
    PowerPellet,
    /// A tunnel tile.
    Tunnel,
}

/// The raw layout of the game board, as a 2D array of characters.
pub const RAW_BOARD: [&str; BOARD_CELL_SIZE.y as usize] = [
    "############################",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#o####.#####.##.#####.####o#",
    "#.####.#####.##.#####.####.#",
    "#..........................#",
    "#.####.##.########.##.####.#",
    "#.####.##.########.##.####.#",
    "#......##....##....##......#",
    "######.##### ## #####.######",
    "######.##### ## #####.######",
    "######.##          ##.######",
    "######.## ######## ##.######",
    "######.## #      # ##.######",
    "TTTTTT.   #      #   .TTTTTT",
    "######.## #      # ##.######",
    "######.## ######## ##.######",
    "######.##          ##.######",
    "######.## ######## ##.######",
    "######.## ######## ##.######",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#.####.#####.##.#####.####.#",
    "#o..##.......  .......##..o#",
    "###.##.##.########.##.##.###",
    "###.##.##.########.##.##.###",
    "#......##....##....##......#",
    "#.##########.##.##########.#",
    "#.##########.##.##########.#",
    "#..........................#",
    "############################",
];

/// Movement speeds, expressed relative to the player's base speed.
pub mod speed {
    /// Player speed in tiles per second.
    pub const PLAYER_TILES_PER_SECOND: f32 = 11.0;

    pub const SLOW: f32 = 0.75;
    pub const MEDIUM: f32 = 0.875;
    pub const FAST: f32 = 1.0;
    pub const FRIGHTENED: f32 = 0.5;
    /// Used inside the tunnel and the pen.
    pub const TRANSIT: f32 = 0.4;
    pub const EYES: f32 = 2.0;

    /// Added to the aggression ratios once per level.
    pub const LEVEL_BONUS: f32 = 0.01;
}

/// Phase durations for the orchestrator.
pub mod timing {
    use std::time::Duration;

    pub const READY_INITIAL: Duration = Duration::from_millis(4500);
    pub const READY_RESTART: Duration = Duration::from_millis(2000);

    pub const SCATTER: Duration = Duration::from_millis(7000);
    pub const CHASE: Duration = Duration::from_millis(20_000);

    /// Seconds of frightened time on level 1; one less per level after that.
    pub const FRIGHTENED_BASE_SECONDS: u64 = 7;
    pub const FLASH_INTERVAL: Duration = Duration::from_millis(250);
    /// Number of colour toggles before pursuers recover.
    pub const FLASH_COUNT: u8 = 9;

    /// Seconds between pursuer releases on level 1.
    pub const RELEASE_BASE_SECONDS: u64 = 8;
    /// Seconds shaved off the release delay per level.
    pub const RELEASE_STEP_SECONDS: u64 = 4;

    pub const EAT_GHOST_PAUSE: Duration = Duration::from_millis(1000);

    pub const DEATH_FREEZE: Duration = Duration::from_millis(750);
    pub const DEATH_ANIMATION: Duration = Duration::from_millis(2250);
    pub const DEATH_BLACKOUT: Duration = Duration::from_millis(500);
    pub const GAME_OVER_TEXT: Duration = Duration::from_millis(2250);
    pub const GAME_OVER_LINGER: Duration = Duration::from_millis(2500);

    pub const LEVEL_CLEAR_FREEZE: Duration = Duration::from_millis(2000);
    pub const LEVEL_FLASH_INTERVAL: Duration = Duration::from_millis(250);
    /// Number of maze style changes while the level-clear flash plays.
    pub const LEVEL_FLASH_STEPS: u8 = 6;
    pub const LEVEL_COVER: Duration = Duration::from_millis(500);

    pub const FRUIT_VISIBLE: Duration = Duration::from_millis(10_000);

    /// How often the set of pickups near the player is rebuilt.
    pub const PROXIMITY_RESCAN: Duration = Duration::from_millis(500);
    /// Pickups within this many milliseconds of player travel are collision-tested.
    pub const PROXIMITY_REACH_MS: f32 = 750.0;
}

/// Point values and life rules.
pub mod scoring {
    pub const DOT: u32 = 10;
    pub const POWER_PELLET: u32 = 50;
    /// Base of the ghost combo; the n-th ghost of a pellet is worth `GHOST_BASE * 2^n`.
    pub const GHOST_BASE: u32 = 100;
    pub const EXTRA_LIFE_AT: u32 = 10_000;
    pub const STARTING_LIVES: u8 = 2;

    /// Returns the value of the bonus fruit on the given level.
    pub fn fruit_points(level: u32) -> u32 {
        match level {
            0 | 1 => 100,
            2 => 300,
            3 => 500,
            4 => 700,
            5 => 1000,
            6 => 2000,
            7 => 3000,
            _ => 5000,
        }
    }
}

/// Remaining-dot thresholds that trigger orchestrator events.
pub mod dots {
    pub const FRUIT_THRESHOLDS: [u32; 2] = [174, 74];
    pub const AGGRESSION_THRESHOLDS: [u32; 2] = [40, 20];
    pub const SIREN_ONE_ABOVE: u32 = 40;
    pub const SIREN_TWO_ABOVE: u32 = 20;
}

/// Grid landmarks of the pen and tunnel.
pub mod pen {
    use glam::Vec2;

    /// Column the pen is entered and left through.
    pub const EXIT_COLUMN: f32 = 13.5;
    /// Row directly above the gate.
    pub const GATE_ROW: f32 = 11.0;
    pub const CENTER_ROW: f32 = 14.0;
    /// Where eaten pursuers head to.
    pub const ENTRANCE_TARGET: Vec2 = Vec2::new(13.5, 10.0);

    /// Vertical bounds of the idle bounce.
    pub const BOUNCE_TOP: f32 = 13.5;
    pub const BOUNCE_BOTTOM: f32 = 14.5;

    pub const TUNNEL_ROW: f32 = 14.0;
    pub const TUNNEL_LEFT_BELOW: f32 = 6.0;
    pub const TUNNEL_RIGHT_ABOVE: f32 = 21.0;
}

/// Spawn points in grid coordinates.
pub mod positions {
    use glam::Vec2;

    pub const PLAYER: Vec2 = Vec2::new(13.5, 23.0);
    pub const BLINKY: Vec2 = Vec2::new(13.5, 11.0);
    pub const PINKY: Vec2 = Vec2::new(13.5, 14.0);
    pub const INKY: Vec2 = Vec2::new(11.5, 14.0);
    pub const CLYDE: Vec2 = Vec2::new(15.5, 14.0);
    pub const FRUIT: Vec2 = Vec2::new(13.5, 17.0);
}

/// Interpolated jumps longer than this, in pixels, are treated as warps and not drawn.
pub const STUTTER_DISTANCE: f32 = 5.0;

/// The size of the board in pixels at the default tile size.
pub fn board_pixels() -> Vec2 {
    BOARD_CELL_SIZE.as_vec2() * CELL_SIZE as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_raw_board_is_rectangular() {
        for row in RAW_BOARD.iter() {
            assert_eq!(row.chars().count(), BOARD_CELL_SIZE.x as usize);
        }
    }

    #[test]
    fn test_raw_board_pickup_count() {
        let dots: usize = RAW_BOARD.iter().map(|row| row.matches('.').count()).sum();
        let pellets: usize = RAW_BOARD.iter().map(|row| row.matches('o').count()).sum();
        assert_eq!(dots, 240);
        assert_eq!(pellets, 4);
    }

    #[test]
    fn test_tunnel_row_is_open_at_edges() {
        for row in TUNNEL_ROWS {
            assert!(RAW_BOARD[row].starts_with('T'));
            assert!(RAW_BOARD[row].ends_with('T'));
        }
    }

    #[test]
    fn test_fruit_points() {
        assert_eq!(scoring::fruit_points(1), 100);
        assert_eq!(scoring::fruit_points(7), 3000);
        assert_eq!(scoring::fruit_points(8), 5000);
        assert_eq!(scoring::fruit_points(21), 5000);
    }

    #[test]
    fn test_board_pixels() {
        assert_eq!(board_pixels(), Vec2::new(224.0, 248.0));
    }
}
