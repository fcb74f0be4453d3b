//! Character definitions.

use serde::{Deserialize, Serialize};

use super::{Gender, Pronouns};
use crate::character_db::CharacterRecord;

/// Relationship rank the game assigns to a romantic partner.
pub const LOVER_RANK: i32 = 4;

/// A participant of a conversation, as last reported by the game.
///
/// Two characters are the same participant when their names match; all other
/// fields are a snapshot that the game refreshes every tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub race: String,
    pub gender: Gender,
    pub pronouns: Pronouns,

    // Transient state, diffed between updates
    /// Disposition towards the player: negative is hostile, 4 is a romantic partner.
    pub relationship_rank: i32,
    pub is_in_combat: bool,
    pub is_enemy: bool,

    pub is_player_character: bool,
    pub bio: String,

    // Profile data sourced from the character database
    pub base_id: Option<String>,
    pub ref_id: Option<String>,
    pub voice_model: String,
    pub advanced_voice_model: String,
    pub voice_folder: String,
    /// Whether the profile was synthesised rather than found in the database.
    pub is_generic_npc: bool,
}

impl Character {
    /// Create a new character with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            race: String::new(),
            gender: Gender::Unknown,
            pronouns: Pronouns::default(),
            relationship_rank: 0,
            is_in_combat: false,
            is_enemy: false,
            is_player_character: false,
            bio: String::new(),
            base_id: None,
            ref_id: None,
            voice_model: String::new(),
            advanced_voice_model: String::new(),
            voice_folder: String::new(),
            is_generic_npc: false,
        }
    }

    /// Create the player character.
    pub fn player(name: impl Into<String>) -> Self {
        Self::new(name).as_player()
    }

    /// Build a character from a resolved database record.
    pub fn from_record(record: &CharacterRecord, is_generic_npc: bool) -> Self {
        let mut character = Self::new(record.name.clone()).with_bio(record.bio.clone());
        character.race = record.race.clone().unwrap_or_default();
        character.base_id = record.base_id.clone();
        character.voice_model = record.voice_model.clone();
        character.advanced_voice_model = record.advanced_voice_model.clone();
        character.voice_folder = record.voice_folder.clone();
        character.is_generic_npc = is_generic_npc;
        character
    }

    /// Set the gender and the matching default pronouns.
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self.pronouns = gender.pronouns();
        self
    }

    /// Override the pronouns.
    pub fn with_pronouns(mut self, pronouns: Pronouns) -> Self {
        self.pronouns = pronouns;
        self
    }

    /// Set the biography.
    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = bio.into();
        self
    }

    /// Set the relationship rank.
    pub fn with_relationship_rank(mut self, rank: i32) -> Self {
        self.relationship_rank = rank;
        self
    }

    /// Set the combat flag.
    pub fn with_combat(mut self, in_combat: bool) -> Self {
        self.is_in_combat = in_combat;
        self
    }

    /// Set the hostility flag.
    pub fn with_enemy(mut self, is_enemy: bool) -> Self {
        self.is_enemy = is_enemy;
        self
    }

    /// Mark this character as the player.
    pub fn as_player(mut self) -> Self {
        self.is_player_character = true;
        self
    }

    /// Check whether both snapshots describe the same participant.
    pub fn is_same_character(&self, other: &Character) -> bool {
        self.name == other.name
    }
}
