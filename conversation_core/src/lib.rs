//! # Conversation Core
//!
//! Tracks the live state of an NPC conversation and turns it into a system
//! prompt for the language model.
//!
//! ## Core Components
//!
//! - **context**: The roster of participants, location, time and pending narrative events
//! - **trust**: Natural-language trust tiers derived from relationship rank and history
//! - **prompt**: Template filling that sheds optional sections until a token budget is met
//! - **memory**: Interfaces to past conversation logs and their summaries
//!
//! ## Design Philosophy
//!
//! - **Event-Driven**: The context reacts to game updates and never polls the game
//! - **Never Fails Mid-Conversation**: Every render and lookup has a fallback branch
//! - **Decoupled**: Tokenizers and memory stores are injected behind narrow traits

pub mod config;
pub mod context;
pub mod error;
pub mod memory;
pub mod prompt;
pub mod telemetry;
pub mod trust;

pub use config::*;
pub use context::*;
pub use error::*;
pub use memory::*;
pub use prompt::*;
pub use trust::*;
