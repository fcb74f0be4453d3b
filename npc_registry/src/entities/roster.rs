//! The ordered set of characters taking part in a conversation.

use serde::{Deserialize, Serialize};

use super::Character;

/// An ordered, name-keyed collection of characters.
///
/// Holds at most one character per name and remembers which character was
/// added most recently.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CharacterRoster {
    characters: Vec<Character>,
    last_added: Option<String>,
}

impl CharacterRoster {
    /// Create a new empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of characters in the roster.
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Check if a character with the same name is present.
    pub fn contains(&self, character: &Character) -> bool {
        self.contains_name(&character.name)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Add a character. Returns `false` and leaves the roster untouched when a
    /// character with the same name is already present.
    pub fn add(&mut self, character: Character) -> bool {
        if self.contains(&character) {
            return false;
        }
        self.last_added = Some(character.name.clone());
        self.characters.push(character);
        true
    }

    /// Replace the stored snapshot of a character, keeping its position.
    ///
    /// Returns the previous snapshot, or `None` if the character is not present.
    pub fn replace(&mut self, character: Character) -> Option<Character> {
        let index = self.position(&character.name)?;
        Some(std::mem::replace(&mut self.characters[index], character))
    }

    /// Remove a character by name.
    pub fn remove(&mut self, name: &str) -> Option<Character> {
        let index = self.position(name)?;
        if self.last_added.as_deref() == Some(name) {
            self.last_added = None;
        }
        Some(self.characters.remove(index))
    }

    /// Get a character by name.
    pub fn get(&self, name: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.name == name)
    }

    /// Get the player character, if the player takes part.
    pub fn player(&self) -> Option<&Character> {
        self.characters.iter().find(|c| c.is_player_character)
    }

    /// The character that was added most recently and is still present.
    pub fn last_added(&self) -> Option<&Character> {
        self.last_added.as_deref().and_then(|name| self.get(name))
    }

    /// Names of all characters in insertion order.
    pub fn names(&self) -> Vec<String> {
        self.characters.iter().map(|c| c.name.clone()).collect()
    }

    /// Iterate over the characters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter()
    }

    /// A copy of this roster without the player character.
    pub fn excluding_player(&self) -> CharacterRoster {
        let mut roster = CharacterRoster::new();
        for character in self.characters.iter().filter(|c| !c.is_player_character) {
            roster.add(character.clone());
        }
        roster
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.characters.iter().position(|c| c.name == name)
    }
}

impl FromIterator<Character> for CharacterRoster {
    fn from_iter<T: IntoIterator<Item = Character>>(iter: T) -> Self {
        let mut roster = CharacterRoster::new();
        for character in iter {
            roster.add(character);
        }
        roster
    }
}

impl<'a> IntoIterator for &'a CharacterRoster {
    type Item = &'a Character;
    type IntoIter = std::slice::Iter<'a, Character>;

    fn into_iter(self) -> Self::IntoIter {
        self.characters.iter()
    }
}
