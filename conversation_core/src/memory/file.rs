//! Conversation memory stored as files, one folder per character.
//!
//! Layout under the root folder:
//! - `<name>/<name>.json`: JSON array of past conversations
//! - `<name>/<name>_summary_1.txt`: latest summary

use std::path::{Path, PathBuf};

use npc_registry::{Character, CharacterRoster};

use super::{format_summaries, ConversationMemory, LogEntry};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct FileConversationMemory {
    root: PathBuf,
}

impl FileConversationMemory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a character's conversation log.
    pub fn log_path(&self, name: &str) -> PathBuf {
        self.root.join(name).join(format!("{}.json", name))
    }

    /// Path of a character's latest summary.
    pub fn summary_path(&self, name: &str) -> PathBuf {
        self.root.join(name).join(format!("{}_summary_1.txt", name))
    }

    /// Read a character's log. A missing file is an empty log.
    pub fn read_log(&self, name: &str) -> Result<Vec<LogEntry>> {
        let path = self.log_path(name);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let text = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Append a finished conversation to a character's log.
    pub fn append_conversation(&self, name: &str, entry: LogEntry) -> Result<()> {
        let mut log = self.read_log(name)?;
        log.push(entry);

        let path = self.log_path(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, serde_json::to_string_pretty(&log)?)?;
        Ok(())
    }

    /// Replace a character's summary.
    pub fn write_summary(&self, name: &str, summary: &str) -> Result<()> {
        let path = self.summary_path(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, summary)?;
        Ok(())
    }

    fn read_summary(&self, name: &str) -> Option<String> {
        std::fs::read_to_string(self.summary_path(name)).ok()
    }
}

impl ConversationMemory for FileConversationMemory {
    fn prompt_text(&self, npcs: &CharacterRoster) -> String {
        format_summaries(npcs, |npc| self.read_summary(&npc.name))
    }

    fn load_conversation_log(&self, npc: &Character) -> Vec<LogEntry> {
        match self.read_log(&npc.name) {
            Ok(log) => log,
            Err(e) => {
                tracing::warn!(name = %npc.name, "Unable to read conversation log: {}", e);
                Vec::new()
            }
        }
    }
}
