//! Cascading resolution of an in-game NPC to a character table row.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{
    extract_race, CharacterQuery, CharacterRecord, CharacterRow, CharacterTable,
    GenericNpcSynthesizer, UnnamedNpcLoader,
};
use crate::entities::Gender;
use crate::game::GameKind;

/// Number of trailing id digits that make up a full form id.
pub const FULL_ID_LEN: usize = 6;

/// Trailing id lengths tried, in order, when the full id does not match.
pub const PARTIAL_ID_LENS: [usize; 3] = [5, 4, 3];

/// The strategy that produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchTier {
    NameFullIdRace,
    NameFullId,
    NamePartialIdRace,
    NamePartialId,
    NameRace,
    Name,
    Id,
    PartialId,
    Generic,
}

impl MatchTier {
    /// Table strategies in the order they are tried.
    ///
    /// A full id anywhere in the table beats a partial id on an earlier row.
    pub const CASCADE: [MatchTier; 8] = [
        MatchTier::NameFullIdRace,
        MatchTier::NameFullId,
        MatchTier::NamePartialIdRace,
        MatchTier::NamePartialId,
        MatchTier::NameRace,
        MatchTier::Name,
        MatchTier::Id,
        MatchTier::PartialId,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            MatchTier::NameFullIdRace => "name, full id and race",
            MatchTier::NameFullId => "name and full id",
            MatchTier::NamePartialIdRace => "name, partial id and race",
            MatchTier::NamePartialId => "name and partial id",
            MatchTier::NameRace => "name and race",
            MatchTier::Name => "name only",
            MatchTier::Id => "full id only",
            MatchTier::PartialId => "partial id only",
            MatchTier::Generic => "generic npc",
        }
    }

    fn matches(&self, row: &CharacterRow, keys: &MatchKeys) -> bool {
        match self {
            MatchTier::NameFullIdRace => keys.name(row) && keys.full_id(row) && keys.race(row),
            MatchTier::NameFullId => keys.name(row) && keys.full_id(row),
            MatchTier::NamePartialIdRace => {
                keys.name(row) && keys.partial_id(row) && keys.race(row)
            }
            MatchTier::NamePartialId => keys.name(row) && keys.partial_id(row),
            MatchTier::NameRace => keys.name(row) && keys.race(row),
            MatchTier::Name => keys.name(row),
            MatchTier::Id => keys.full_id(row),
            MatchTier::PartialId => keys.partial_id(row),
            MatchTier::Generic => false,
        }
    }
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Outcome of a resolution: the profile and whether it was synthesised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCharacter {
    pub record: CharacterRecord,
    pub is_generic: bool,
    pub tier: MatchTier,
}

/// Normalised, lowercased keys of a query.
struct MatchKeys {
    name: String,
    race: String,
    full_id: String,
    /// Trailing id length and key of the first partial length matching any row.
    partial_id: Option<(usize, String)>,
}

impl MatchKeys {
    fn new(query: &CharacterQuery, race: &str, rows: &[CharacterRow]) -> Self {
        let full_id = strip_id(&trailing(&query.character_id, FULL_ID_LEN));
        let partial_id = PARTIAL_ID_LENS.iter().find_map(|&len| {
            let key = strip_id(&trailing(&query.character_id, len));
            if key.is_empty() {
                return None;
            }
            rows.iter()
                .any(|row| strip_id(&trailing(&row.base_id, len)) == key)
                .then_some((len, key))
        });

        Self {
            name: query.character_name.to_lowercase(),
            race: race.to_lowercase(),
            full_id,
            partial_id,
        }
    }

    fn name(&self, row: &CharacterRow) -> bool {
        row.name.to_lowercase() == self.name
    }

    fn race(&self, row: &CharacterRow) -> bool {
        row.race.to_lowercase() == self.race
    }

    fn full_id(&self, row: &CharacterRow) -> bool {
        !self.full_id.is_empty() && strip_id(&row.base_id) == self.full_id
    }

    fn partial_id(&self, row: &CharacterRow) -> bool {
        match &self.partial_id {
            Some((len, key)) => strip_id(&trailing(&row.base_id, *len)) == *key,
            None => false,
        }
    }
}

/// The last `len` characters of an id, or the whole id when it is shorter.
fn trailing(id: &str, len: usize) -> String {
    let count = id.chars().count();
    id.chars().skip(count.saturating_sub(len)).collect()
}

/// Lowercase an id and strip its leading zeros.
fn strip_id(id: &str) -> String {
    id.trim().trim_start_matches('0').to_lowercase()
}

/// Resolves in-game NPCs against the character table.
pub struct CharacterResolver<L = GenericNpcSynthesizer> {
    table: Arc<CharacterTable>,
    loader: L,
}

impl CharacterResolver<GenericNpcSynthesizer> {
    /// Create a resolver that synthesises unmatched NPCs for the given game.
    pub fn for_game(table: Arc<CharacterTable>, game: GameKind) -> Self {
        Self::new(table, GenericNpcSynthesizer::new(game))
    }
}

impl<L: UnnamedNpcLoader> CharacterResolver<L> {
    pub fn new(table: Arc<CharacterTable>, loader: L) -> Self {
        Self { table, loader }
    }

    /// The table this resolver searches.
    pub fn table(&self) -> &CharacterTable {
        &self.table
    }

    /// Find the profile of an NPC.
    ///
    /// The first table strategy with any matching row wins, and within a
    /// strategy the first row in file order is taken. When nothing matches,
    /// a generic profile is synthesised, so resolution always succeeds.
    pub fn find_character_info(&self, query: &CharacterQuery) -> ResolvedCharacter {
        let race = extract_race(&query.race);
        let rows = self.table.rows();
        let keys = MatchKeys::new(query, &race, rows);

        for tier in MatchTier::CASCADE {
            tracing::debug!(name = %query.character_name, "Trying to match {}", tier);
            if let Some(row) = rows.iter().find(|row| tier.matches(row, &keys)) {
                tracing::debug!(
                    name = %query.character_name,
                    base_id = %row.base_id,
                    "Matched character on {}",
                    tier
                );
                return ResolvedCharacter {
                    record: row.to_record(),
                    is_generic: false,
                    tier,
                };
            }
        }

        tracing::info!(
            "Could not find {} in the character table. Loading as a generic NPC.",
            query.character_name
        );
        let record = self.loader.load_unnamed_npc(
            &query.character_name,
            &race,
            Gender::from_code(query.gender),
            &query.ingame_voice_model,
        );
        ResolvedCharacter {
            record,
            is_generic: true,
            tier: MatchTier::Generic,
        }
    }
}
