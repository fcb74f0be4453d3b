//! Conversation Context - who is here, where, when, and what just happened.
//!
//! The context is updated from two directions:
//! 1. **Participants**: the game reports the current roster; the context diffs it
//!    against the stored one and narrates joins, departures and state changes
//! 2. **Surroundings**: location, clock and custom values arrive with each game update
//!
//! Narrative events accumulate until the caller flushes them explicitly, so
//! several consumers can read the same batch.

mod values;

pub use values::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use npc_registry::{Character, CharacterRoster, GameKind, TimeGroup};

use crate::config::DialogueConfig;
use crate::memory::ConversationMemory;
use crate::prompt::{render_within_budget, PromptBudget, PromptValues, ReductionLadder};
use crate::trust::{trust_tier, TrustTier};

/// Hour of the day a conversation starts at before the game reports the time.
pub const DEFAULT_INGAME_HOUR: u8 = 12;

/// How the player is referred to when not taking part in the conversation.
pub const UNNAMED_PLAYER: &str = "the player";

/// Unique identifier for a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub Uuid);

impl ConversationId {
    /// Create a new random conversation ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The state the game reports once per update cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameUpdate {
    pub location: String,
    /// Hour of the in-game clock (0-23).
    pub time: u8,
    /// Narrative events the game wants the characters to know about.
    pub events: Vec<String>,
    pub custom_values: CustomValues,
}

impl GameUpdate {
    pub fn new(location: impl Into<String>, time: u8) -> Self {
        Self {
            location: location.into(),
            time,
            events: Vec::new(),
            custom_values: CustomValues::new(),
        }
    }

    /// Add a narrative event.
    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.events.push(event.into());
        self
    }

    /// Attach the custom values of this cycle.
    pub fn with_custom_values(mut self, values: CustomValues) -> Self {
        self.custom_values = values;
        self
    }
}

/// Join items as natural language: `A`, `A and B`, `A, B and C`.
///
/// An empty list yields an empty string.
pub fn format_listing<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [init @ .., last] => {
            let init: Vec<&str> = init.iter().map(|s| s.as_ref()).collect();
            format!("{} and {}", init.join(", "), last.as_ref())
        }
    }
}

/// The live state of one conversation.
pub struct ConversationContext {
    id: ConversationId,
    game: GameKind,
    language: String,
    token_limit_fraction: f64,
    ladder: ReductionLadder,

    memory: Box<dyn ConversationMemory>,
    budget: Box<dyn PromptBudget>,

    characters: CharacterRoster,
    location: String,
    ingame_time: u8,
    prev_game_time: Option<(u8, TimeGroup)>,
    ingame_events: Vec<String>,
    custom_values: CustomValues,
    have_actors_changed: bool,
}

impl ConversationContext {
    /// Create an empty conversation.
    pub fn new(
        config: &DialogueConfig,
        memory: Box<dyn ConversationMemory>,
        budget: Box<dyn PromptBudget>,
    ) -> Self {
        Self {
            id: ConversationId::new(),
            game: config.game,
            language: config.language.clone(),
            token_limit_fraction: config.token_limit_fraction,
            ladder: ReductionLadder::new(config.reduction_order.clone()),
            memory,
            budget,
            characters: CharacterRoster::new(),
            location: config.game.default_location().to_string(),
            ingame_time: DEFAULT_INGAME_HOUR,
            prev_game_time: None,
            ingame_events: Vec::new(),
            custom_values: CustomValues::new(),
            have_actors_changed: false,
        }
    }

    pub fn id(&self) -> ConversationId {
        self.id
    }

    pub fn game(&self) -> GameKind {
        self.game
    }

    /// Everyone currently in the conversation.
    pub fn characters(&self) -> &CharacterRoster {
        &self.characters
    }

    pub fn characters_excluding_player(&self) -> CharacterRoster {
        self.characters.excluding_player()
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn ingame_time(&self) -> u8 {
        self.ingame_time
    }

    pub fn time_group(&self) -> TimeGroup {
        TimeGroup::from_hour(self.ingame_time)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Whether anyone joined or left since the flag was last reset.
    pub fn have_actors_changed(&self) -> bool {
        self.have_actors_changed
    }

    pub fn set_actors_changed(&mut self, value: bool) {
        self.have_actors_changed = value;
    }

    /// Custom values of the latest game update.
    pub fn custom_values(&self) -> &CustomValues {
        &self.custom_values
    }

    pub fn custom_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.custom_values.get(key)
    }

    /// Narrative events collected since the last flush.
    pub fn ingame_events(&self) -> &[String] {
        &self.ingame_events
    }

    /// Flush the pending narrative events.
    pub fn clear_context_ingame_events(&mut self) {
        self.ingame_events.clear();
    }

    /// Bring the roster in line with the characters the game reports.
    ///
    /// Newcomers are added, known characters have their state changes
    /// narrated and their snapshot refreshed, and anyone missing from
    /// `new_characters` leaves the conversation.
    pub fn add_or_update_characters(&mut self, new_characters: &CharacterRoster) {
        for npc in new_characters {
            if self.characters.contains(npc) {
                self.update_ingame_events_on_npc_change(npc);
                self.characters.replace(npc.clone());
            } else {
                tracing::debug!(conversation = %self.id, name = %npc.name, "Character joined");
                self.characters.add(npc.clone());
                self.have_actors_changed = true;
            }
        }

        let departed: Vec<String> = self
            .characters
            .iter()
            .filter(|c| !new_characters.contains(c))
            .map(|c| c.name.clone())
            .collect();
        for name in departed {
            self.remove_character_by_name(&name);
        }
    }

    /// Remove a character from the conversation, if present.
    pub fn remove_character(&mut self, npc: &Character) {
        self.remove_character_by_name(&npc.name);
    }

    fn remove_character_by_name(&mut self, name: &str) {
        if self.characters.remove(name).is_some() {
            tracing::debug!(conversation = %self.id, name, "Character left");
            self.ingame_events.push(format!("{} has left the conversation", name));
            self.have_actors_changed = true;
        }
    }

    /// Apply one cycle of game state.
    ///
    /// Location and time changes are narrated; the custom values replace the
    /// previous snapshot entirely.
    pub fn update_context(&mut self, update: GameUpdate) {
        let GameUpdate {
            location,
            time,
            events,
            custom_values,
        } = update;

        self.ingame_events.extend(events);
        self.custom_values = custom_values;

        if location != self.location {
            self.ingame_events.push(format!(
                "The location has changed from {} to {}.",
                self.location, location
            ));
            self.location = location;
        }

        self.ingame_time = time;
        let current_time = (time, TimeGroup::from_hour(time));
        if self.prev_game_time != Some(current_time) {
            self.prev_game_time = Some(current_time);
            self.ingame_events
                .push(format!("The time is {} {}.", current_time.0, current_time.1));
        }
    }

    /// Trust of an NPC towards the player.
    ///
    /// Counts every logged conversation with the NPC, including ones the
    /// player did not take part in.
    pub fn get_trust(&self, npc: &Character) -> TrustTier {
        let prior_exchanges = self.memory.load_conversation_log(npc).len();
        trust_tier(npc.relationship_rank, prior_exchanges)
    }

    /// Name of the player for narrative text.
    fn player_name(&self) -> String {
        self.characters
            .player()
            .map(|p| p.name.clone())
            .unwrap_or_else(|| UNNAMED_PLAYER.to_string())
    }

    fn update_ingame_events_on_npc_change(&mut self, npc: &Character) {
        let Some(current) = self.characters.get(&npc.name) else {
            return;
        };
        let mut events = Vec::new();

        if current.is_in_combat != npc.is_in_combat {
            if npc.is_in_combat {
                events.push(format!("{} is now in combat!", npc.name));
            } else {
                events.push(format!("{} is no longer in combat!", npc.name));
            }
        }

        if !npc.is_player_character {
            let player_name = self.player_name();

            if current.is_enemy != npc.is_enemy {
                if npc.is_enemy {
                    events.push(format!(
                        "{} is attacking {}. This is either because {} is an enemy or {} has attacked {} first.",
                        npc.name,
                        player_name,
                        npc.pronouns.subject,
                        player_name,
                        npc.pronouns.object
                    ));
                } else {
                    events.push(format!("{} is no longer attacking {}.", npc.name, player_name));
                }
            }

            if current.relationship_rank != npc.relationship_rank {
                let trust = self.get_trust(npc);
                events.push(format!(
                    "{} is now {} to {}.",
                    player_name,
                    trust.with_article(),
                    npc.name
                ));
            }
        }

        self.ingame_events.extend(events);
    }

    fn character_names_as_text(&self, include_player: bool) -> String {
        let names = if include_player {
            self.characters.names()
        } else {
            self.characters.excluding_player().names()
        };
        format_listing(&names)
    }

    /// Biographies of the NPCs. A lone participant's bio stands alone,
    /// otherwise each bio is prefixed with its owner's name.
    fn bios_text(&self) -> String {
        let alone = self.characters.len() == 1;
        self.characters
            .iter()
            .filter(|c| !c.is_player_character)
            .map(|c| {
                if alone {
                    c.bio.clone()
                } else {
                    format!("{}: {}", c.name, c.bio)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn trusts_text(&self) -> String {
        let relationships: Vec<String> = self
            .characters
            .iter()
            .filter(|c| !c.is_player_character)
            .map(|npc| format!("{} to {}", self.get_trust(npc).with_article(), npc.name))
            .collect();
        format_listing(&relationships)
    }

    /// Everything a prompt template can reference, computed from the current state.
    pub fn prompt_values(&self) -> PromptValues {
        let npcs = self.characters.excluding_player();
        PromptValues {
            player_name: self.player_name(),
            name: self
                .characters
                .last_added()
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            names: self.character_names_as_text(false),
            names_w_player: self.character_names_as_text(true),
            bios: self.bios_text(),
            trust: self.trusts_text(),
            location: self.location.clone(),
            time: self.ingame_time,
            time_group: self.time_group().phrase().to_string(),
            language: self.language.clone(),
            conversation_summaries: self.memory.prompt_text(&npcs),
        }
    }

    /// Fill a system prompt template from the current state.
    ///
    /// Optional sections are dropped in ladder order until the prompt fits the
    /// token budget. If even the barest rendering is too long, the unfilled
    /// template is returned.
    pub fn generate_system_message(&self, template: &str) -> String {
        let values = self.prompt_values();
        let rendered = render_within_budget(
            template,
            &values,
            &self.ladder,
            self.budget.as_ref(),
            self.token_limit_fraction,
        );

        if !rendered.fits {
            tracing::warn!(
                conversation = %self.id,
                "Prompt is too long even without optional sections, sending the unfilled template"
            );
        }
        tracing::info!(
            conversation = %self.id,
            tokens = self.budget.count_tokens(&rendered.text),
            omitted = ?rendered.omitted,
            "Prompt sent to LLM: {}",
            rendered.text.trim()
        );
        rendered.text
    }
}

impl std::fmt::Debug for ConversationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationContext")
            .field("id", &self.id)
            .field("game", &self.game)
            .field("characters", &self.characters.names())
            .field("location", &self.location)
            .field("ingame_time", &self.ingame_time)
            .field("ingame_events", &self.ingame_events)
            .field("have_actors_changed", &self.have_actors_changed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryConversationMemory, LogEntry};
    use crate::prompt::{OptionalSection, PromptValues};
    use npc_registry::Gender;

    fn context_with(memory: InMemoryConversationMemory) -> ConversationContext {
        ConversationContext::new(
            &DialogueConfig::default(),
            Box::new(memory),
            Box::new(|_text: &str, _fraction: f64| false),
        )
    }

    fn context() -> ConversationContext {
        context_with(InMemoryConversationMemory::new())
    }

    fn roster(characters: Vec<Character>) -> CharacterRoster {
        characters.into_iter().collect()
    }

    fn lydia() -> Character {
        Character::new("Lydia")
            .with_gender(Gender::Female)
            .with_bio("Housecarl of Whiterun.")
    }

    #[test]
    fn test_format_listing() {
        let empty: [&str; 0] = [];
        assert_eq!(format_listing(&empty), "");
        assert_eq!(format_listing(&["A"]), "A");
        assert_eq!(format_listing(&["A", "B"]), "A and B");
        assert_eq!(format_listing(&["A", "B", "C"]), "A, B and C");
    }

    #[test]
    fn test_defaults_follow_game() {
        let context = context();
        assert_eq!(context.location(), "Skyrim");
        assert_eq!(context.ingame_time(), 12);

        let config = DialogueConfig {
            game: GameKind::Fallout4,
            ..Default::default()
        };
        let fallout = ConversationContext::new(
            &config,
            Box::new(InMemoryConversationMemory::new()),
            Box::new(|_text: &str, _fraction: f64| false),
        );
        assert_eq!(fallout.location(), "the Commonwealth");
    }

    #[test]
    fn test_adding_marks_actors_changed() {
        let mut context = context();
        context.add_or_update_characters(&roster(vec![lydia()]));

        assert_eq!(context.characters().len(), 1);
        assert!(context.have_actors_changed());
        assert!(context.ingame_events().is_empty());
    }

    #[test]
    fn test_readding_same_character_is_not_a_change() {
        let mut context = context();
        let characters = roster(vec![lydia()]);
        context.add_or_update_characters(&characters);
        context.set_actors_changed(false);

        context.add_or_update_characters(&characters);

        assert_eq!(context.characters().len(), 1);
        assert!(!context.have_actors_changed());
        assert!(context.ingame_events().is_empty());
    }

    #[test]
    fn test_removal_event() {
        let mut context = context();
        context.add_or_update_characters(&roster(vec![lydia(), Character::new("Faendal")]));
        context.set_actors_changed(false);

        context.add_or_update_characters(&roster(vec![lydia()]));

        assert_eq!(context.ingame_events(), ["Faendal has left the conversation"]);
        assert!(context.have_actors_changed());
        assert!(!context.characters().contains_name("Faendal"));
    }

    #[test]
    fn test_explicit_removal() {
        let mut context = context();
        context.add_or_update_characters(&roster(vec![lydia()]));

        context.remove_character(&Character::new("Nobody"));
        assert!(context.ingame_events().is_empty());

        context.remove_character(&lydia());
        assert_eq!(context.ingame_events(), ["Lydia has left the conversation"]);
        assert!(context.characters().is_empty());
    }

    #[test]
    fn test_combat_transitions() {
        let mut context = context();
        context.add_or_update_characters(&roster(vec![lydia()]));

        context.add_or_update_characters(&roster(vec![lydia().with_combat(true)]));
        context.add_or_update_characters(&roster(vec![lydia().with_combat(true)]));
        context.add_or_update_characters(&roster(vec![lydia()]));

        assert_eq!(
            context.ingame_events(),
            ["Lydia is now in combat!", "Lydia is no longer in combat!"]
        );
    }

    #[test]
    fn test_hostility_without_player_uses_placeholder() {
        let mut context = context();
        context.add_or_update_characters(&roster(vec![lydia()]));
        context.add_or_update_characters(&roster(vec![lydia().with_enemy(true)]));

        assert_eq!(
            context.ingame_events(),
            ["Lydia is attacking the player. This is either because she is an enemy or the player has attacked her first."]
        );
    }

    #[test]
    fn test_hostility_names_player() {
        let mut context = context();
        let player = Character::player("Dovahkiin");
        context.add_or_update_characters(&roster(vec![player.clone(), lydia().with_enemy(true)]));
        context.add_or_update_characters(&roster(vec![player, lydia()]));

        assert_eq!(context.ingame_events(), ["Lydia is no longer attacking Dovahkiin."]);
    }

    #[test]
    fn test_player_state_changes_only_narrate_combat() {
        let mut context = context();
        let player = Character::player("Dovahkiin");
        context.add_or_update_characters(&roster(vec![player.clone()]));
        context.add_or_update_characters(&roster(vec![player
            .with_combat(true)
            .with_enemy(true)
            .with_relationship_rank(-1)]));

        assert_eq!(context.ingame_events(), ["Dovahkiin is now in combat!"]);
    }

    #[test]
    fn test_relationship_change_uses_trust_tier() {
        let mut memory = InMemoryConversationMemory::new();
        for _ in 0..3 {
            memory.record_conversation("Lydia", LogEntry::default());
        }
        let mut context = context_with(memory);
        let player = Character::player("Dovahkiin");
        context.add_or_update_characters(&roster(vec![
            player.clone(),
            lydia().with_relationship_rank(1),
        ]));

        context.add_or_update_characters(&roster(vec![player, lydia()]));

        assert_eq!(context.ingame_events(), ["Dovahkiin is now an acquaintance to Lydia."]);
        let stored = context.characters().get("Lydia").unwrap();
        assert_eq!(context.get_trust(stored), TrustTier::Acquaintance);
    }

    #[test]
    fn test_update_context_narrates_changes_once() {
        let mut context = context();

        context.update_context(GameUpdate::new("Whiterun", 9));
        assert_eq!(
            context.ingame_events(),
            [
                "The location has changed from Skyrim to Whiterun.",
                "The time is 9 in the morning."
            ]
        );

        context.clear_context_ingame_events();
        context.update_context(GameUpdate::new("Whiterun", 9));
        assert!(context.ingame_events().is_empty());
    }

    #[test]
    fn test_update_context_keeps_caller_events_first() {
        let mut context = context();
        context.update_context(GameUpdate::new("Skyrim", 12).with_event("A dragon appears!"));

        assert_eq!(
            context.ingame_events(),
            ["A dragon appears!", "The time is 12 in the afternoon."]
        );
    }

    #[test]
    fn test_hour_change_within_same_time_group() {
        let mut context = context();
        context.update_context(GameUpdate::new("Whiterun", 9));
        context.clear_context_ingame_events();

        context.update_context(GameUpdate::new("Whiterun", 10));

        assert_eq!(context.ingame_events(), ["The time is 10 in the morning."]);
        assert_eq!(context.ingame_time(), 10);
    }

    #[test]
    fn test_location_change_without_time_change() {
        let mut context = context();
        context.update_context(GameUpdate::new("Whiterun", 9));
        context.clear_context_ingame_events();

        context.update_context(GameUpdate::new("Dragonsreach", 9));

        assert_eq!(
            context.ingame_events(),
            ["The location has changed from Whiterun to Dragonsreach."]
        );
        assert_eq!(context.location(), "Dragonsreach");
    }

    #[test]
    fn test_custom_values_are_replaced() {
        let mut context = context();
        let first: CustomValues =
            vec![("weather", serde_json::json!("Rain"))].into_iter().collect();
        context.update_context(GameUpdate::new("Skyrim", 12).with_custom_values(first));
        assert_eq!(context.custom_values().get_str("weather"), Some("Rain"));

        context.update_context(GameUpdate::new("Skyrim", 12));
        assert!(context.custom_value("weather").is_none());
    }

    #[test]
    fn test_prompt_values() {
        let mut memory = InMemoryConversationMemory::new();
        memory.set_summary("Lydia", "She swore an oath.");
        let mut context = context_with(memory);
        context.add_or_update_characters(&roster(vec![
            Character::player("Dovahkiin"),
            lydia(),
            Character::new("Faendal").with_bio("An archer.").with_relationship_rank(-1),
        ]));
        context.update_context(GameUpdate::new("Riverwood", 22));

        let values = context.prompt_values();

        assert_eq!(values.player_name, "Dovahkiin");
        assert_eq!(values.name, "Faendal");
        assert_eq!(values.names, "Lydia and Faendal");
        assert_eq!(values.names_w_player, "Dovahkiin, Lydia and Faendal");
        assert_eq!(values.bios, "Lydia: Housecarl of Whiterun.\nFaendal: An archer.");
        assert_eq!(values.trust, "a stranger to Lydia and an enemy to Faendal");
        assert_eq!(values.time_group, "at night");
        assert_eq!(
            values.conversation_summaries,
            "Below is a summary of past conversations with Lydia:\nShe swore an oath."
        );
    }

    #[test]
    fn test_single_npc_bio_is_bare() {
        let mut context = context();
        context.add_or_update_characters(&roster(vec![lydia()]));

        let values = context.prompt_values();
        assert_eq!(values.bios, "Housecarl of Whiterun.");
        assert_eq!(values.player_name, "the player");
    }

    #[test]
    fn test_generate_system_message_drops_bios_last() {
        let mut memory = InMemoryConversationMemory::new();
        memory.set_summary("Lydia", "She swore an oath.");
        let template = "You are {name}. {bios} {conversation_summaries} Speak {language}.";

        let mut probe = context_with(memory.clone());
        probe.add_or_update_characters(&roster(vec![lydia()]));
        let bios_only = probe
            .prompt_values()
            .render(template, &[OptionalSection::ConversationSummaries]);

        let limit = bios_only.len();
        let mut context = ConversationContext::new(
            &DialogueConfig::default(),
            Box::new(memory),
            Box::new(move |text: &str, _fraction: f64| text.len() > limit),
        );
        context.add_or_update_characters(&roster(vec![lydia()]));

        let message = context.generate_system_message(template);
        assert_eq!(message, bios_only);
        assert_eq!(message, "You are Lydia. Housecarl of Whiterun.  Speak English.");
    }

    #[test]
    fn test_generate_system_message_falls_back_to_template() {
        let mut context = ConversationContext::new(
            &DialogueConfig::default(),
            Box::new(InMemoryConversationMemory::new()),
            Box::new(|_text: &str, _fraction: f64| true),
        );
        context.add_or_update_characters(&roster(vec![lydia()]));

        let template = "You are {name}.";
        assert_eq!(context.generate_system_message(template), template);
    }

    #[test]
    fn test_prompt_values_without_characters() {
        let values: PromptValues = context().prompt_values();
        assert_eq!(values.name, "");
        assert_eq!(values.names, "");
        assert_eq!(values.trust, "");
    }
}
