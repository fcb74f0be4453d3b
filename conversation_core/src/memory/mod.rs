//! Memory of past conversations.
//!
//! The conversation context needs two things from memory:
//! - **Summaries**: rolling text summarising earlier conversations, placed in the prompt
//! - **Logs**: the list of past conversations with an NPC, used to derive trust

mod file;

pub use file::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use npc_registry::{Character, CharacterRoster};

/// A single line of a logged conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedMessage {
    pub role: String,
    pub content: String,
}

impl LoggedMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// One past conversation an NPC took part in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct LogEntry {
    pub messages: Vec<LoggedMessage>,
}

impl LogEntry {
    pub fn new(messages: Vec<LoggedMessage>) -> Self {
        Self { messages }
    }
}

/// Access to past conversations.
pub trait ConversationMemory {
    /// Summary text for the prompt, covering every character in `npcs`.
    fn prompt_text(&self, npcs: &CharacterRoster) -> String;

    /// All logged past conversations of `npc`.
    ///
    /// This includes conversations the player only overheard, such as
    /// NPC-to-NPC exchanges, so it overstates how well the NPC knows the player.
    fn load_conversation_log(&self, npc: &Character) -> Vec<LogEntry>;
}

/// Combine per-character summaries into the prompt's summary section.
///
/// Characters without a summary are skipped.
pub fn format_summaries<F>(npcs: &CharacterRoster, summary_of: F) -> String
where
    F: Fn(&Character) -> Option<String>,
{
    npcs.iter()
        .filter_map(|npc| {
            summary_of(npc)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .map(|s| {
                    format!(
                        "Below is a summary of past conversations with {}:\n{}",
                        npc.name, s
                    )
                })
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Conversation memory held in process, keyed by character name.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationMemory {
    logs: HashMap<String, Vec<LogEntry>>,
    summaries: HashMap<String, String>,
}

impl InMemoryConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished conversation for a character.
    pub fn record_conversation(&mut self, name: impl Into<String>, entry: LogEntry) {
        self.logs.entry(name.into()).or_default().push(entry);
    }

    /// Replace the summary of a character.
    pub fn set_summary(&mut self, name: impl Into<String>, summary: impl Into<String>) {
        self.summaries.insert(name.into(), summary.into());
    }
}

impl ConversationMemory for InMemoryConversationMemory {
    fn prompt_text(&self, npcs: &CharacterRoster) -> String {
        format_summaries(npcs, |npc| self.summaries.get(&npc.name).cloned())
    }

    fn load_conversation_log(&self, npc: &Character) -> Vec<LogEntry> {
        self.logs.get(&npc.name).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_logs() {
        let mut memory = InMemoryConversationMemory::new();
        let entry = LogEntry::new(vec![LoggedMessage::new("user", "Hello")]);
        memory.record_conversation("Lydia", entry);
        memory.record_conversation("Lydia", LogEntry::default());

        assert_eq!(memory.load_conversation_log(&Character::new("Lydia")).len(), 2);
        assert!(memory.load_conversation_log(&Character::new("Faendal")).is_empty());
    }

    #[test]
    fn test_prompt_text_skips_missing_summaries() {
        let mut memory = InMemoryConversationMemory::new();
        memory.set_summary("Lydia", "We cleared Bleak Falls Barrow.");
        memory.set_summary("Camilla", "  ");

        let npcs: CharacterRoster = vec![
            Character::new("Lydia"),
            Character::new("Faendal"),
            Character::new("Camilla"),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            memory.prompt_text(&npcs),
            "Below is a summary of past conversations with Lydia:\nWe cleared Bleak Falls Barrow."
        );
    }

    #[test]
    fn test_log_entry_json_shape() {
        let json = r#"[
            {"role": "user", "content": "Hi"},
            {"role": "assistant", "content": "Greetings."}
        ]"#;
        let entry: LogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.messages.len(), 2);
        assert_eq!(entry.messages[1].content, "Greetings.");
    }
}
