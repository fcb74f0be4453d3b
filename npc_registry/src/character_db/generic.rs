//! Profiles for NPCs missing from the character table.

use super::{CharacterRecord, UnnamedNpcLoader};
use crate::entities::Gender;
use crate::game::GameKind;

/// Builds a plausible profile from what the game reports about an unnamed NPC.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericNpcSynthesizer {
    game: GameKind,
}

impl GenericNpcSynthesizer {
    pub fn new(game: GameKind) -> Self {
        Self { game }
    }

    /// Voice model for an NPC. The engine's voice type wins; otherwise the
    /// engine naming scheme `<Gender><Race>` is used (e.g. `MaleNord`).
    fn voice_model(&self, race: &str, gender: Gender, ingame_voice_model: &str) -> String {
        let voice = ingame_voice_model.trim();
        if !voice.is_empty() {
            return voice.to_string();
        }
        let race: String = race.split_whitespace().collect();
        format!("{}{}", gender.voice_prefix(), race)
    }

    fn bio(&self, name: &str, race: &str, gender: Gender) -> String {
        let description = if race.is_empty() {
            gender.noun().to_string()
        } else {
            format!("{} {}", race, gender.noun())
        };
        let article = match description.chars().next() {
            Some(c) if "AEIOUaeiou".contains(c) => "an",
            _ => "a",
        };
        format!(
            "{} is {} {} living in {}.",
            name,
            article,
            description,
            self.game.default_location()
        )
    }
}

impl UnnamedNpcLoader for GenericNpcSynthesizer {
    fn load_unnamed_npc(
        &self,
        name: &str,
        race: &str,
        gender: Gender,
        ingame_voice_model: &str,
    ) -> CharacterRecord {
        let voice_model = self.voice_model(race, gender, ingame_voice_model);
        CharacterRecord {
            name: name.to_string(),
            bio: self.bio(name, race, gender),
            voice_folder: voice_model.clone(),
            voice_model,
            advanced_voice_model: String::new(),
            base_id: None,
            race: (!race.is_empty()).then(|| race.to_string()),
        }
    }
}
