//! Configuration for conversations.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use npc_registry::{CharacterTable, GameKind};

use crate::error::{ConversationError, Result};
use crate::prompt::OptionalSection;

/// Fraction of the model's context window the system prompt may use.
pub const DEFAULT_TOKEN_LIMIT_FRACTION: f64 = 0.45;

/// Main configuration, usually read from a TOML file.
///
/// ```toml
/// game = "Fallout4"
/// language = "English"
/// context_window = 8192
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Game the conversations take place in
    pub game: GameKind,

    /// Language the model should answer in
    pub language: String,

    /// Share of the context window available to the system prompt (0.0-1.0]
    pub token_limit_fraction: f64,

    /// Context window of the model in tokens
    pub context_window: usize,

    /// Optional prompt sections, in the order they are dropped when over budget
    pub reduction_order: Vec<OptionalSection>,

    /// Character database; defaults to the game's bundled table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_table: Option<PathBuf>,

    /// Root folder of per-character conversation logs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_folder: Option<PathBuf>,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            game: GameKind::default(),
            language: "English".to_string(),
            token_limit_fraction: DEFAULT_TOKEN_LIMIT_FRACTION,
            context_window: 4096,
            reduction_order: vec![OptionalSection::ConversationSummaries, OptionalSection::Bios],
            character_table: None,
            conversation_folder: None,
        }
    }
}

impl DialogueConfig {
    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: DialogueConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ConversationError::Config(format!(
                "Failed to read configuration file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&text)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.token_limit_fraction > 0.0 && self.token_limit_fraction <= 1.0) {
            return Err(ConversationError::Config(format!(
                "token_limit_fraction must be in (0, 1], got {}",
                self.token_limit_fraction
            )));
        }
        if self.context_window == 0 {
            return Err(ConversationError::Config(
                "context_window must be greater than 0".to_string(),
            ));
        }
        if self.language.trim().is_empty() {
            return Err(ConversationError::Config("language must not be empty".to_string()));
        }
        Ok(())
    }

    /// Path of the character database.
    pub fn character_table_path(&self) -> PathBuf {
        self.character_table.clone().unwrap_or_else(|| {
            PathBuf::from("data")
                .join(self.game.data_folder())
                .join(self.game.character_table_file())
        })
    }

    /// Load the character database for the configured game.
    pub fn load_character_table(&self) -> Result<CharacterTable> {
        Ok(CharacterTable::load(self.character_table_path(), self.game)?)
    }

    /// Path of the conversation log folder.
    pub fn conversation_folder_path(&self) -> PathBuf {
        self.conversation_folder.clone().unwrap_or_else(|| {
            PathBuf::from("data")
                .join(self.game.data_folder())
                .join("conversations")
        })
    }
}
