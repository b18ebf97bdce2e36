//! Headless Pac-Man simulation core.

pub mod app;
pub mod audio;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod formatter;
pub mod game;
pub mod map;
pub mod persistence;
pub mod systems;
pub mod timer;
