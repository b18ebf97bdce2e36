//! Map parsing functionality for converting raw board layouts into structured data.

use crate::constants::MapTile;
use crate::error::ParseError;

/// Parser for converting raw board layouts into tile rows.
pub struct MapTileParser;

impl MapTileParser {
    /// Parses a single character into a map tile.
    ///
    /// # Arguments
    ///
    /// * `c` - The character to parse
    ///
    /// # Returns
    ///
    /// The parsed map tile, or an error if the character is unknown.
    pub fn parse_character(c: char) -> Result<MapTile, ParseError> {
        match c {
            '#' => Ok(MapTile::Wall),
            '.' => Ok(MapTile::Dot),
            'o' => Ok(MapTile::PowerPellet),
            ' ' => Ok(MapTile::Empty),
            'T' => Ok(MapTile::Tunnel),
            _ => Err(ParseError::UnknownCharacter(c)),
        }
    }

    /// Parses a raw board layout into rows of tiles, indexed `[row][column]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the board is empty, contains unknown characters, or if any
    /// row differs in width from the first one.
    pub fn parse_board(raw_board: &[&str]) -> Result<Vec<Vec<MapTile>>, ParseError> {
        let expected = raw_board.first().map(|row| row.chars().count()).ok_or(ParseError::Empty)?;
        if expected == 0 {
            return Err(ParseError::Empty);
        }

        raw_board
            .iter()
            .enumerate()
            .map(|(row, line)| {
                let found = line.chars().count();
                if found != expected {
                    return Err(ParseError::NotRectangular { row, found, expected });
                }
                line.chars().map(Self::parse_character).collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{BOARD_CELL_SIZE, RAW_BOARD};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_character() {
        assert_eq!(MapTileParser::parse_character('#'), Ok(MapTile::Wall));
        assert_eq!(MapTileParser::parse_character('.'), Ok(MapTile::Dot));
        assert_eq!(MapTileParser::parse_character('o'), Ok(MapTile::PowerPellet));
        assert_eq!(MapTileParser::parse_character(' '), Ok(MapTile::Empty));
        assert_eq!(MapTileParser::parse_character('T'), Ok(MapTile::Tunnel));
        assert_eq!(MapTileParser::parse_character('Z'), Err(ParseError::UnknownCharacter('Z')));
    }

    #[test]
    fn test_parse_board() {
        let tiles = MapTileParser::parse_board(&RAW_BOARD).unwrap();
        assert_eq!(tiles.len(), BOARD_CELL_SIZE.y as usize);
        assert_eq!(tiles[0].len(), BOARD_CELL_SIZE.x as usize);
        assert_eq!(tiles[3][1], MapTile::PowerPellet);
        assert_eq!(tiles[14][0], MapTile::Tunnel);
    }

    #[test]
    fn test_parse_board_invalid_character() {
        let mut invalid_board = RAW_BOARD;
        invalid_board[0] = "###########################Z";

        let result = MapTileParser::parse_board(&invalid_board);
        assert_eq!(result, Err(ParseError::UnknownCharacter('Z')));
    }

    #[test]
    fn test_parse_board_not_rectangular() {
        let board = ["####", "#..#", "###"];
        assert_eq!(
            MapTileParser::parse_board(&board),
            Err(ParseError::NotRectangular {
                row: 2,
                found: 3,
                expected: 4
            })
        );
    }

    #[test]
    fn test_parse_board_empty() {
        assert_eq!(MapTileParser::parse_board(&[]), Err(ParseError::Empty));
        assert_eq!(MapTileParser::parse_board(&[""]), Err(ParseError::Empty));
    }
}
