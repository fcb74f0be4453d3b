//! Entity definitions for conversation participants.

mod character;
mod roster;

pub use character::*;
pub use roster::*;

use serde::{Deserialize, Serialize};

/// Gender as reported by the game engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Gender {
    /// Decode the engine's integer gender code (0 = male, 1 = female).
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Gender::Male,
            1 => Gender::Female,
            _ => Gender::Unknown,
        }
    }

    /// Lowercase noun used in generated descriptions.
    pub fn noun(&self) -> &'static str {
        match self {
            Gender::Male => "man",
            Gender::Female => "woman",
            Gender::Unknown => "person",
        }
    }

    /// Capitalised prefix used by the engine's voice type names (e.g. "MaleNord").
    pub fn voice_prefix(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Unknown => "",
        }
    }

    /// Pronouns matching this gender. Unknown falls back to they/them.
    pub fn pronouns(&self) -> Pronouns {
        match self {
            Gender::Male => Pronouns::new("he", "him", "his"),
            Gender::Female => Pronouns::new("she", "her", "her"),
            Gender::Unknown => Pronouns::new("they", "them", "their"),
        }
    }
}

/// Personal pronouns used when generating narrative text about a character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pronouns {
    pub subject: String,
    pub object: String,
    pub possessive: String,
}

impl Pronouns {
    pub fn new(
        subject: impl Into<String>,
        object: impl Into<String>,
        possessive: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            object: object.into(),
            possessive: possessive.into(),
        }
    }
}

impl Default for Pronouns {
    fn default() -> Self {
        Gender::Unknown.pronouns()
    }
}
