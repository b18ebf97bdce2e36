//! This module defines the maze and the grid kernel actors move on.

pub mod builder;
pub mod direction;
pub mod grid;
pub mod parser;
