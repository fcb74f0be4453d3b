//! # NPC Registry
//!
//! The "who is who" crate - character definitions, conversation rosters, and the
//! character database used to resolve in-game NPCs to their profiles.
//! This crate holds game data only and does not contain any prompt logic.

pub mod character_db;
pub mod entities;
pub mod error;
pub mod game;

pub use character_db::*;
pub use entities::*;
pub use error::*;
pub use game::*;
