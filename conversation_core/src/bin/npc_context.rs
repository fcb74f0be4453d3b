//! Resolve an NPC against the character table and print the system prompt
//! a conversation with them would start with.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use conversation_core::{
    telemetry, ContextWindowBudget, ConversationContext, DialogueConfig, FileConversationMemory,
    GameUpdate, DEFAULT_INGAME_HOUR,
};
use npc_registry::{
    Character, CharacterQuery, CharacterResolver, CharacterRoster, CharacterTable, Gender,
};

#[derive(Parser, Debug)]
#[command(name = "npc_context")]
#[command(about = "Print the system prompt for a conversation with an NPC", long_about = None)]
#[command(version)]
struct Args {
    /// Dialogue config file (TOML)
    config: PathBuf,
    /// Prompt template file
    template: PathBuf,
    /// In-game form id of the NPC
    id: String,
    /// In-game name of the NPC
    name: String,
    /// Engine race string, e.g. "<NordRace (00013746)>"
    race: String,
    /// Engine gender code (0 male, 1 female)
    #[arg(allow_negative_numbers = true)]
    gender: i32,
    /// Engine voice type of the NPC
    voice_model: Option<String>,
    /// Location of the scene, defaults to the game's default location
    #[arg(long)]
    location: Option<String>,
    /// In-game hour of the scene
    #[arg(long, default_value_t = DEFAULT_INGAME_HOUR)]
    hour: u8,
}

fn main() -> ExitCode {
    telemetry::init(telemetry::DEFAULT_FILTER);

    let args = Args::parse();

    let config = match DialogueConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let template = match std::fs::read_to_string(&args.template) {
        Ok(template) => template,
        Err(e) => {
            tracing::error!(
                "Unable to read prompt template {}: {}",
                args.template.display(),
                e
            );
            return ExitCode::FAILURE;
        }
    };

    let table = Arc::new(CharacterTable::load_or_exit(
        config.character_table_path(),
        config.game,
    ));
    let resolver = CharacterResolver::for_game(table, config.game);

    let query = CharacterQuery::new(
        args.id.as_str(),
        args.name.as_str(),
        args.race.as_str(),
        args.gender,
        args.voice_model.as_deref().unwrap_or_default(),
    );
    let resolved = resolver.find_character_info(&query);
    tracing::info!(
        name = %resolved.record.name,
        generic = resolved.is_generic,
        "Resolved character on {}",
        resolved.tier
    );

    let mut context = ConversationContext::new(
        &config,
        Box::new(FileConversationMemory::new(config.conversation_folder_path())),
        Box::new(ContextWindowBudget::new(config.context_window)),
    );
    let npc = Character::from_record(&resolved.record, resolved.is_generic)
        .with_gender(Gender::from_code(args.gender));
    let roster: CharacterRoster = vec![npc].into_iter().collect();
    context.add_or_update_characters(&roster);

    let location = args
        .location
        .unwrap_or_else(|| config.game.default_location().to_string());
    context.update_context(GameUpdate::new(location, args.hour));

    println!("{}", context.generate_system_message(&template));
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_positionals_and_defaults() {
        let args = Args::try_parse_from([
            "npc_context",
            "dialogue.toml",
            "prompt.txt",
            "0x00012AB",
            "Lydia",
            "<NordRace (00013746)>",
            "1",
        ])
        .unwrap();

        assert_eq!(args.name, "Lydia");
        assert_eq!(args.gender, 1);
        assert!(args.voice_model.is_none());
        assert_eq!(args.hour, DEFAULT_INGAME_HOUR);
    }

    #[test]
    fn test_args_accept_negative_gender_and_options() {
        let args = Args::try_parse_from([
            "npc_context",
            "dialogue.toml",
            "prompt.txt",
            "FFFFFF",
            "Bandit",
            "<RedguardRace (00013748)>",
            "-1",
            "MaleBrute",
            "--location",
            "Riverwood",
            "--hour",
            "21",
        ])
        .unwrap();

        assert_eq!(args.gender, -1);
        assert_eq!(args.voice_model.as_deref(), Some("MaleBrute"));
        assert_eq!(args.location.as_deref(), Some("Riverwood"));
        assert_eq!(args.hour, 21);
    }

    #[test]
    fn test_args_require_gender() {
        let result = Args::try_parse_from(["npc_context", "a.toml", "b.txt", "1", "Lydia", "Nord"]);
        assert!(result.is_err());
    }
}
