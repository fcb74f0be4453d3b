//! Character database - maps noisy in-game identifiers to character profiles.
//!
//! The database is a CSV table loaded once at startup. Resolution runs a fixed
//! cascade of match strategies, most specific first:
//! 1. **Name + full id + race**
//! 2. **Name + full id**
//! 3. **Name + partial id + race**
//! 4. **Name + partial id**
//! 5. **Name + race**
//! 6. **Name**
//! 7. **Full id**
//! 8. **Partial id**
//! 9. **Generic**: no row matches, a profile is synthesised instead

mod generic;
mod resolver;
mod table;

pub use generic::*;
pub use resolver::*;
pub use table::*;

use serde::{Deserialize, Serialize};

use crate::entities::Gender;

/// The profile fields a conversation needs for a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CharacterRecord {
    pub name: String,
    pub bio: String,
    pub voice_model: String,
    pub advanced_voice_model: String,
    pub voice_folder: String,

    /// Set when the record was read from a table row.
    pub base_id: Option<String>,
    pub race: Option<String>,
}

/// Identifiers the game reports for an NPC that is about to join a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterQuery {
    /// Hex form id, possibly with leading zeros or in a short form.
    pub character_id: String,
    pub character_name: String,
    /// Engine race descriptor, e.g. `<NordRace (00013746)>`.
    pub race: String,
    /// Engine gender code.
    pub gender: i32,
    pub ingame_voice_model: String,
}

impl CharacterQuery {
    pub fn new(
        character_id: impl Into<String>,
        character_name: impl Into<String>,
        race: impl Into<String>,
        gender: i32,
        ingame_voice_model: impl Into<String>,
    ) -> Self {
        Self {
            character_id: character_id.into(),
            character_name: character_name.into(),
            race: race.into(),
            gender,
            ingame_voice_model: ingame_voice_model.into(),
        }
    }
}

/// Synthesises a profile for an NPC that has no row in the database.
pub trait UnnamedNpcLoader {
    fn load_unnamed_npc(
        &self,
        name: &str,
        race: &str,
        gender: Gender,
        ingame_voice_model: &str,
    ) -> CharacterRecord;
}

impl<F> UnnamedNpcLoader for F
where
    F: Fn(&str, &str, Gender, &str) -> CharacterRecord,
{
    fn load_unnamed_npc(
        &self,
        name: &str,
        race: &str,
        gender: Gender,
        ingame_voice_model: &str,
    ) -> CharacterRecord {
        self(name, race, gender, ingame_voice_model)
    }
}

/// Extract the race name from an engine race descriptor.
///
/// The race is the text between the first `<` and the following `Race `
/// marker, so `<NordRace (00013746)>` yields `Nord`. A descriptor without `<`
/// is taken as the race itself.
pub fn extract_race(descriptor: &str) -> String {
    let Some((_, rest)) = descriptor.split_once('<') else {
        return descriptor.trim().to_string();
    };
    match rest.split_once("Race ") {
        Some((race, _)) => race.trim().to_string(),
        None => rest.trim_end_matches('>').trim().to_string(),
    }
}
