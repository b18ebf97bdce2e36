use glam::Vec2;
use strum_macros::{AsRefStr, EnumIter};

/// A heading on the grid. Screen space: y grows downwards.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    #[default]
    Left,
    Right,
}

/// Enumeration order used whenever several headings are considered; ties go to the earlier entry.
pub const DIRECTIONS: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

impl Direction {
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Whether this heading moves along the y axis.
    pub fn is_vertical(&self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// Whether this heading moves towards smaller coordinates.
    pub fn is_negative(&self) -> bool {
        matches!(self, Direction::Up | Direction::Left)
    }

    /// Rounds a coordinate towards the direction of travel: floor for up/left, ceil for down/right.
    pub fn round(&self, value: f32) -> f32 {
        if self.is_negative() {
            value.floor()
        } else {
            value.ceil()
        }
    }

    pub fn as_vec2(&self) -> Vec2 {
        (*self).into()
    }
}

impl From<Direction> for Vec2 {
    fn from(dir: Direction) -> Self {
        match dir {
            Direction::Up => -Vec2::Y,
            Direction::Down => Vec2::Y,
            Direction::Left => -Vec2::X,
            Direction::Right => Vec2::X,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_direction_opposite() {
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert_eq!(Direction::Down.opposite(), Direction::Up);
        assert_eq!(Direction::Left.opposite(), Direction::Right);
        assert_eq!(Direction::Right.opposite(), Direction::Left);
    }

    #[test]
    fn test_direction_as_vec2() {
        assert_eq!(Direction::Up.as_vec2(), Vec2::new(0.0, -1.0));
        assert_eq!(Direction::Down.as_vec2(), Vec2::new(0.0, 1.0));
        assert_eq!(Direction::Left.as_vec2(), Vec2::new(-1.0, 0.0));
        assert_eq!(Direction::Right.as_vec2(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_direction_round() {
        assert_eq!(Direction::Up.round(3.5), 3.0);
        assert_eq!(Direction::Left.round(3.5), 3.0);
        assert_eq!(Direction::Down.round(3.5), 4.0);
        assert_eq!(Direction::Right.round(3.5), 4.0);
        // Integral values are already on the boundary.
        assert_eq!(Direction::Left.round(3.0), 3.0);
        assert_eq!(Direction::Right.round(3.0), 3.0);
    }

    #[test]
    fn test_direction_names() {
        assert_eq!(Direction::Up.as_ref(), "up");
        assert_eq!(Direction::Right.as_ref(), "right");
    }
}
