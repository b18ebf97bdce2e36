//! Centralized error types for the simulation.
//!
//! This module defines all error types used throughout the crate,
//! providing a consistent error handling approach.

use std::io;

use bevy_ecs::event::Event;
use glam::Vec2;

/// Main error type for the simulation.
///
/// This is the primary error type that should be used in public APIs.
/// It can represent any error that can occur while building or running a session.
#[derive(thiserror::Error, Debug, Event)]
pub enum GameError {
    #[error("Map parsing error: {0}")]
    MapParse(#[from] ParseError),

    #[error("Map error: {0}")]
    Map(#[from] MapError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// An actor was computed to occupy a wall cell. Recovered by clamping, never fatal.
    #[error("Logic invariant violated: {actor} entered a wall at {grid}")]
    LogicInvariant { actor: String, grid: Vec2 },
}

/// Error type for map parsing operations.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown character in board: {0}")]
    UnknownCharacter(char),
    #[error("Board row {row} has {found} cells, expected {expected}")]
    NotRectangular { row: usize, found: usize, expected: usize },
    #[error("Board is empty")]
    Empty,
}

/// Errors related to map queries.
#[derive(thiserror::Error, Debug)]
pub enum MapError {
    #[error("Tunnel row {0} is outside the board")]
    TunnelOutOfRange(usize),

    #[error("Invalid map configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for simulation operations.
pub type GameResult<T> = Result<T, GameError>;
