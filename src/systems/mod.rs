//! The Entity-Component-System (ECS) module.
//!
//! This module contains all the ECS-related logic, including components, systems,
//! and resources.

pub mod audio;
pub mod collision;
pub mod components;
pub mod ghost;
pub mod item;
pub mod player;
pub mod render;
pub mod stage;

pub use self::audio::*;
pub use self::collision::*;
pub use self::components::*;
pub use self::ghost::*;
pub use self::item::*;
pub use self::player::*;
pub use self::render::*;
pub use self::stage::*;
