//! Pursuer AI: per-pursuer targeting, greedy move selection, speed tiers and the mode state machine.

use bevy_ecs::{
    entity::Entity,
    event::EventWriter,
    query::{Has, With, Without},
    system::{Query, Res},
};
use glam::Vec2;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::constants::{pen, positions, speed};
use crate::error::GameError;
use crate::events::GameEvent;
use crate::map::builder::Maze;
use crate::map::direction::{Direction, DIRECTIONS};
use crate::map::grid;
use crate::systems::components::{
    Actor, Aggression, DeltaTime, FlankingReference, Frozen, Ghost, GhostState, Level, PenRoutine, Phase, PlayerControlled,
    PursuerMode,
};
use crate::systems::player::player_speed;

impl Ghost {
    /// The corner this pursuer heads for while scattering.
    pub fn scatter_corner(&self) -> Vec2 {
        match self {
            Ghost::Blinky => Vec2::new(27.0, 0.0),
            Ghost::Pinky => Vec2::new(0.0, 0.0),
            Ghost::Inky => Vec2::new(27.0, 30.0),
            Ghost::Clyde => Vec2::new(0.0, 30.0),
        }
    }

    /// Spawn point in grid coordinates.
    pub fn spawn(&self) -> Vec2 {
        match self {
            Ghost::Blinky => positions::BLINKY,
            Ghost::Pinky => positions::PINKY,
            Ghost::Inky => positions::INKY,
            Ghost::Clyde => positions::CLYDE,
        }
    }

    pub fn starting_direction(&self) -> Direction {
        match self {
            Ghost::Blinky => Direction::Left,
            Ghost::Pinky => Direction::Down,
            Ghost::Inky | Ghost::Clyde => Direction::Up,
        }
    }

    pub fn starts_in_pen(&self) -> bool {
        !matches!(self, Ghost::Blinky)
    }
}

impl GhostState {
    /// State at the start of a round.
    pub fn new(ghost: Ghost) -> Self {
        let (mode, pen) = if ghost.starts_in_pen() {
            (PursuerMode::Idle, PenRoutine::Confined)
        } else {
            (PursuerMode::Scatter, PenRoutine::Outside)
        };
        Self {
            mode,
            phase: Phase::Scatter,
            pen,
            aggression: Aggression::Slow,
            paused: false,
            allow_collision: true,
            flash: false,
        }
    }

    pub fn is_frightened(&self) -> bool {
        self.mode == PursuerMode::Frightened
    }

    pub fn is_eaten(&self) -> bool {
        self.mode == PursuerMode::Eaten
    }

    /// The mode that applies when nothing overrides the pursuer.
    fn resting_mode(&self) -> PursuerMode {
        match self.pen {
            PenRoutine::Confined => PursuerMode::Idle,
            PenRoutine::Released => PursuerMode::Leaving,
            PenRoutine::Outside => self.phase.into(),
        }
    }

    /// Applies a new scatter/chase phase, returning true if the pursuer has to turn around.
    ///
    /// An aggressive lead pursuer keeps its current mode; frightened, eaten and penned pursuers
    /// pick the phase up later.
    pub fn set_phase(&mut self, phase: Phase, in_pen: bool) -> bool {
        self.phase = phase;
        if matches!(self.mode, PursuerMode::Scatter | PursuerMode::Chase) && !self.aggression.is_aggressive() {
            self.mode = phase.into();
            return !in_pen;
        }
        false
    }

    /// Enters Frightened, returning true if the pursuer has to turn around.
    pub fn frighten(&mut self, in_pen: bool) -> bool {
        if self.is_eaten() {
            return false;
        }
        let reverse = !in_pen && !self.is_frightened();
        self.mode = PursuerMode::Frightened;
        self.flash = false;
        reverse
    }

    /// Leaves Frightened without turning around.
    pub fn calm(&mut self) {
        if self.is_frightened() {
            self.mode = self.resting_mode();
        }
        self.flash = false;
    }

    /// Starts the walk from the pen to the gate.
    pub fn release(&mut self) {
        self.pen = PenRoutine::Released;
        if self.mode == PursuerMode::Idle {
            self.mode = PursuerMode::Leaving;
        }
    }

    fn exit_pen(&mut self) {
        self.pen = PenRoutine::Outside;
        if matches!(self.mode, PursuerMode::Idle | PursuerMode::Leaving) {
            self.mode = self.phase.into();
        }
    }
}

/// Whether a grid position lies in one of the tunnel stretches of the middle row.
pub fn in_tunnel(grid: Vec2) -> bool {
    grid.y == pen::TUNNEL_ROW && (grid.x < pen::TUNNEL_LEFT_BELOW || grid.x > pen::TUNNEL_RIGHT_ABOVE)
}

/// Whether a grid position lies inside the pen.
pub fn in_pen(grid: Vec2) -> bool {
    grid.x > 9.0 && grid.x < 18.0 && grid.y > 11.0 && grid.y < 17.0
}

/// Pursuer speeds in pixels per millisecond for one level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostSpeeds {
    pub slow: f32,
    pub medium: f32,
    pub fast: f32,
    pub frightened: f32,
    pub transit: f32,
    pub eyes: f32,
}

impl GhostSpeeds {
    pub fn new(tile_size: f32, level: u32) -> Self {
        let base = player_speed(tile_size);
        let bonus = level as f32 * speed::LEVEL_BONUS;
        Self {
            slow: base * (speed::SLOW + bonus),
            medium: base * (speed::MEDIUM + bonus),
            fast: base * (speed::FAST + bonus),
            frightened: base * speed::FRIGHTENED,
            transit: base * speed::TRANSIT,
            eyes: base * speed::EYES,
        }
    }

    pub fn for_aggression(&self, aggression: Aggression) -> f32 {
        match aggression {
            Aggression::Slow => self.slow,
            Aggression::Medium => self.medium,
            Aggression::Fast => self.fast,
        }
    }

    /// Speed of a pursuer at `grid` given its state.
    pub fn velocity(&self, state: &GhostState, grid: Vec2) -> f32 {
        if state.is_eaten() {
            self.eyes
        } else if state.paused {
            0.0
        } else if in_tunnel(grid) || in_pen(grid) {
            self.transit
        } else if state.is_frightened() {
            self.frightened
        } else {
            self.for_aggression(state.aggression)
        }
    }
}

/// The cell `spaces` ahead of `origin` along `facing`.
pub fn ahead(origin: Vec2, facing: Direction, spaces: f32) -> Vec2 {
    origin + facing.as_vec2() * spaces
}

/// Picks the cell a pursuer steers towards.
///
/// `lead` is the lead pursuer's grid position, only read for the flanking calculation.
pub fn target(
    ghost: Ghost,
    state: &GhostState,
    own: Vec2,
    player: Vec2,
    facing: Direction,
    lead: Option<Vec2>,
) -> Vec2 {
    match state.mode {
        PursuerMode::Eaten => pen::ENTRANCE_TARGET,
        PursuerMode::Frightened => player,
        PursuerMode::Scatter => match ghost {
            // The aggressive lead pursuer never scatters.
            Ghost::Blinky if state.aggression.is_aggressive() => player,
            _ => ghost.scatter_corner(),
        },
        PursuerMode::Chase => match ghost {
            Ghost::Blinky => player,
            Ghost::Pinky => ahead(player, facing, 4.0),
            Ghost::Inky => {
                let pivot = ahead(player, facing, 2.0);
                match lead {
                    Some(lead) => pivot + (pivot - lead),
                    None => pivot,
                }
            }
            // Clyde gives up and heads home once close.
            Ghost::Clyde => {
                if own.distance(player) > 8.0 {
                    player
                } else {
                    ghost.scatter_corner()
                }
            }
        },
        PursuerMode::Idle | PursuerMode::Leaving => ghost.scatter_corner(),
    }
}

/// Headings that lead to an open neighbouring cell, excluding a reversal.
pub fn possible_moves(maze: &Maze, grid: Vec2, direction: Direction) -> SmallVec<[Direction; 4]> {
    DIRECTIONS
        .iter()
        .copied()
        .filter(|&candidate| candidate != direction.opposite() && maze.is_open(grid + candidate.as_vec2()))
        .collect()
}

/// Picks the move whose destination cell is closest to `target`, or farthest when `frightened`.
///
/// Ties go to the move enumerated first.
pub fn best_move(moves: &[Direction], grid: Vec2, target: Vec2, frightened: bool) -> Option<Direction> {
    let mut best = None;
    let mut best_distance = if frightened { 0.0 } else { f32::INFINITY };
    for &candidate in moves {
        let distance = (grid + candidate.as_vec2()).distance(target);
        let better = if frightened {
            distance > best_distance
        } else {
            distance < best_distance
        };
        if better {
            best = Some(candidate);
            best_distance = distance;
        }
    }
    best
}

/// Chooses the heading at a decision point. Dead ends keep the current heading.
pub fn choose_heading(maze: &Maze, grid: Vec2, direction: Direction, target: Vec2, frightened: bool) -> Direction {
    let moves = possible_moves(maze, grid, direction);
    match moves.len() {
        0 => direction,
        1 => moves[0],
        _ => best_move(&moves, grid, target, frightened).unwrap_or(direction),
    }
}

/// Pen choreography for confined and released pursuers. Walls are ignored inside the pen.
///
/// Returns true when the pursuer has just stepped out through the gate.
fn pen_movement(actor: &mut Actor, state: &mut GhostState, grid: Vec2, distance: f32, tile: f32) -> bool {
    let mut exited = false;

    if grid.y <= pen::BOUNCE_TOP {
        actor.direction = Direction::Down;
    } else if grid.y >= pen::BOUNCE_BOTTOM {
        actor.direction = Direction::Up;
    }

    if state.pen == PenRoutine::Released {
        if grid.x == pen::EXIT_COLUMN && grid.y > pen::GATE_ROW - 0.2 && grid.y < pen::GATE_ROW {
            actor.position.y = grid::to_pixel(Vec2::new(grid.x, pen::GATE_ROW), tile).y;
            actor.direction = Direction::Left;
            state.exit_pen();
            exited = true;
        } else if grid.x > pen::EXIT_COLUMN - 0.1 && grid.x < pen::EXIT_COLUMN + 0.1 {
            actor.position.x = grid::to_pixel(Vec2::new(pen::EXIT_COLUMN, grid.y), tile).x;
            actor.direction = Direction::Up;
        } else if grid.y > pen::CENTER_ROW - 0.1 && grid.y < pen::CENTER_ROW + 0.1 {
            actor.position.y = grid::to_pixel(Vec2::new(grid.x, pen::CENTER_ROW), tile).y;
            actor.direction = if grid.x < pen::EXIT_COLUMN {
                Direction::Right
            } else {
                Direction::Left
            };
        }
    }

    actor.position += grid::velocity_vector(actor.direction, distance);
    exited
}

/// Door handling for pursuers crossing the pen boundary mid-cell.
///
/// Returns the grid position to measure boundary crossings against and whether the pursuer
/// just recovered at the pen centre.
fn pen_door(actor: &mut Actor, state: &mut GhostState, grid: Vec2, tile: f32) -> (Vec2, bool) {
    let mut adjusted = grid;
    let mut restored = false;
    let eaten = state.is_eaten();

    if eaten && grid.y == pen::GATE_ROW && grid.x > pen::EXIT_COLUMN - 0.1 && grid.x < pen::EXIT_COLUMN + 0.1 {
        actor.direction = Direction::Down;
        adjusted.x = pen::EXIT_COLUMN;
        actor.position = grid::snap(adjusted, actor.direction, tile);
    }

    if eaten && grid.x == pen::EXIT_COLUMN && grid.y > pen::CENTER_ROW - 0.2 && grid.y < pen::CENTER_ROW + 0.2 {
        actor.direction = Direction::Up;
        adjusted.y = pen::CENTER_ROW;
        actor.position = grid::snap(adjusted, actor.direction, tile);
        state.mode = state.phase.into();
        restored = true;
    }

    if !state.is_eaten() && grid.x == pen::EXIT_COLUMN && grid.y > pen::GATE_ROW - 0.2 && grid.y < pen::GATE_ROW {
        adjusted.y = pen::GATE_ROW;
        actor.position = grid::snap(adjusted, actor.direction, tile);
        actor.direction = Direction::Left;
    }

    (adjusted, restored)
}

/// Moves every pursuer for one tick: pen choreography, decisions at cell boundaries, straight
/// travel between them, then the tunnel warp.
#[allow(clippy::type_complexity)]
pub fn ghost_movement_system(
    maze: Res<Maze>,
    delta_time: Res<DeltaTime>,
    level: Res<Level>,
    player: Query<&Actor, With<PlayerControlled>>,
    mut ghosts: Query<
        (Entity, &Ghost, &mut Actor, &mut GhostState, Option<&FlankingReference>, Has<Frozen>),
        Without<PlayerControlled>,
    >,
    mut events: EventWriter<GameEvent>,
    mut errors: EventWriter<GameError>,
) {
    let tile = maze.tile_size();
    let player = match player.single() {
        Ok(actor) => *actor,
        Err(e) => {
            errors.write(GameError::InvalidState(format!(
                "No/multiple entities queried for player, could not steer pursuers: {e}"
            )));
            return;
        }
    };
    let player_grid = grid::to_grid(player.position, tile);
    let speeds = GhostSpeeds::new(tile, level.0);

    // Positions are read before anyone moves so the flanking target does not depend on query order.
    let snapshot: SmallVec<[(Entity, Vec2); 4]> = ghosts.iter().map(|(entity, _, actor, ..)| (entity, actor.position)).collect();

    for (_, ghost, mut actor, mut state, flanking, frozen) in ghosts.iter_mut() {
        actor.old_position = actor.position;
        if frozen {
            continue;
        }

        let grid_position = grid::to_grid(actor.position, tile);
        let distance = speeds.velocity(&state, grid_position) * delta_time.millis();

        if state.pen != PenRoutine::Outside {
            if pen_movement(&mut actor, &mut state, grid_position, distance, tile) {
                debug!(ghost = ghost.as_ref(), mode = state.mode.as_ref(), "Pursuer left the pen");
                events.write(GameEvent::ReleaseGhost { ghost: *ghost });
            }
        } else if actor.position == grid::snap(grid_position, actor.direction, tile) {
            let lead = flanking.and_then(|reference| {
                snapshot
                    .iter()
                    .find(|(entity, _)| *entity == reference.0)
                    .map(|(_, position)| grid::to_grid(*position, tile))
            });
            let goal = target(*ghost, &state, grid_position, player_grid, player.direction, lead);
            let heading = choose_heading(&maze, grid_position, actor.direction, goal, state.is_frightened());
            if heading != actor.direction {
                trace!(ghost = ghost.as_ref(), from = ?actor.direction, to = ?heading, target = ?goal, "Pursuer turned");
            }
            actor.direction = heading;
            actor.position += grid::velocity_vector(heading, distance);
        } else {
            let (adjusted, restored) = pen_door(&mut actor, &mut state, grid_position, tile);
            if restored {
                debug!(ghost = ghost.as_ref(), "Pursuer restored at the pen centre");
                events.write(GameEvent::RestoreGhost { ghost: *ghost });
            }

            let desired = actor.position + grid::velocity_vector(actor.direction, distance);
            actor.position = if grid::crosses_cell_boundary(adjusted, grid::to_grid(desired, tile)) {
                grid::snap(adjusted, actor.direction, tile)
            } else {
                desired
            };
        }

        if let Some(warped) = grid::warp(actor.position, tile, maze.width()) {
            trace!(ghost = ghost.as_ref(), "Pursuer warped through the tunnel");
            actor.position = warped;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_frighten_reverses_outside_pen_only() {
        let mut state = GhostState::new(Ghost::Blinky);
        assert!(state.frighten(false));
        assert_eq!(state.mode, PursuerMode::Frightened);
        // Already frightened: no second reversal.
        assert!(!state.frighten(false));

        let mut penned = GhostState::new(Ghost::Pinky);
        assert!(!penned.frighten(true));
        assert_eq!(penned.mode, PursuerMode::Frightened);
    }

    #[test]
    fn test_eaten_ignores_power_pellet() {
        let mut state = GhostState::new(Ghost::Blinky);
        state.mode = PursuerMode::Eaten;
        assert!(!state.frighten(false));
        assert_eq!(state.mode, PursuerMode::Eaten);
    }

    #[test]
    fn test_calm_returns_to_resting_mode() {
        let mut state = GhostState::new(Ghost::Inky);
        state.frighten(true);
        state.calm();
        assert_eq!(state.mode, PursuerMode::Idle);

        let mut outside = GhostState::new(Ghost::Blinky);
        outside.set_phase(Phase::Chase, false);
        outside.frighten(false);
        outside.calm();
        assert_eq!(outside.mode, PursuerMode::Chase);
    }

    #[test]
    fn test_set_phase_skips_aggressive_lead() {
        let mut state = GhostState::new(Ghost::Blinky);
        state.aggression = state.aggression.escalate();
        assert!(!state.set_phase(Phase::Chase, false));
        assert_eq!(state.mode, PursuerMode::Scatter);
        assert_eq!(state.phase, Phase::Chase);
    }

    #[test]
    fn test_release_and_exit() {
        let mut state = GhostState::new(Ghost::Clyde);
        state.release();
        assert_eq!(state.mode, PursuerMode::Leaving);
        state.exit_pen();
        assert_eq!(state.mode, PursuerMode::Scatter);
        assert_eq!(state.pen, PenRoutine::Outside);
    }

    #[test]
    fn test_zones() {
        assert!(in_tunnel(Vec2::new(3.0, 14.0)));
        assert!(!in_tunnel(Vec2::new(6.0, 14.0)));
        assert!(in_pen(Vec2::new(13.5, 14.0)));
        assert!(!in_pen(Vec2::new(13.5, 11.0)));
    }

    #[test]
    fn test_speed_priority() {
        let speeds = GhostSpeeds::new(8.0, 1);
        let mut state = GhostState::new(Ghost::Blinky);
        assert_eq!(speeds.velocity(&state, Vec2::new(3.0, 14.0)), speeds.transit);
        state.paused = true;
        assert_eq!(speeds.velocity(&state, Vec2::new(1.0, 1.0)), 0.0);
        state.mode = PursuerMode::Eaten;
        assert_eq!(speeds.velocity(&state, Vec2::new(1.0, 1.0)), speeds.eyes);
    }
}
