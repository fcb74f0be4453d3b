//! Prompt rendering under a token budget.
//!
//! A system prompt is rendered from a template in a series of attempts:
//! 1. **Full**: every placeholder filled
//! 2. **Reduced**: optional sections blanked one by one, in ladder order
//! 3. **Fallback**: the unfilled template, when even the barest rendering is too long
//!
//! The first attempt the [`PromptBudget`] accepts is used.

mod budget;
mod template;

pub use budget::*;
pub use template::*;

use serde::{Deserialize, Serialize};

/// Prompt content that may be dropped to fit the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionalSection {
    /// `{bio}` / `{bios}`
    Bios,
    /// `{conversation_summary}` / `{conversation_summaries}`
    ConversationSummaries,
}

/// The order in which optional sections are removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionLadder {
    removals: Vec<OptionalSection>,
}

impl Default for ReductionLadder {
    /// Summaries go first, then bios.
    fn default() -> Self {
        Self::new(vec![OptionalSection::ConversationSummaries, OptionalSection::Bios])
    }
}

impl ReductionLadder {
    /// Create a ladder. Repeated sections are ignored after their first step.
    pub fn new(removals: Vec<OptionalSection>) -> Self {
        let mut unique = Vec::with_capacity(removals.len());
        for section in removals {
            if !unique.contains(&section) {
                unique.push(section);
            }
        }
        Self { removals: unique }
    }

    /// The sections omitted by each attempt: nothing first, then one more
    /// section per step. A ladder of `n` removals yields `n + 1` attempts.
    pub fn attempts(&self) -> Vec<Vec<OptionalSection>> {
        (0..=self.removals.len())
            .map(|step| self.removals[..step].to_vec())
            .collect()
    }

    pub fn removals(&self) -> &[OptionalSection] {
        &self.removals
    }
}

/// Every value a prompt template can reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptValues {
    pub player_name: String,
    /// Name of the character that joined most recently.
    pub name: String,
    pub names: String,
    pub names_w_player: String,
    pub bios: String,
    pub trust: String,
    pub location: String,
    pub time: u8,
    pub time_group: String,
    pub language: String,
    pub conversation_summaries: String,
}

impl PromptValues {
    /// Value of a placeholder, with `omitted` sections rendered empty.
    pub fn lookup(&self, placeholder: &str, omitted: &[OptionalSection]) -> Option<String> {
        let value = match placeholder {
            "player_name" => self.player_name.clone(),
            "name" => self.name.clone(),
            "names" => self.names.clone(),
            "names_w_player" => self.names_w_player.clone(),
            "bio" | "bios" => self.optional(OptionalSection::Bios, &self.bios, omitted),
            "trust" => self.trust.clone(),
            "location" => self.location.clone(),
            "time" => self.time.to_string(),
            "time_group" => self.time_group.clone(),
            "language" => self.language.clone(),
            "conversation_summary" | "conversation_summaries" => self.optional(
                OptionalSection::ConversationSummaries,
                &self.conversation_summaries,
                omitted,
            ),
            _ => return None,
        };
        Some(value)
    }

    /// Render `template` with `omitted` sections left empty.
    pub fn render(&self, template: &str, omitted: &[OptionalSection]) -> String {
        fill_template(template, |placeholder| self.lookup(placeholder, omitted))
    }

    fn optional(
        &self,
        section: OptionalSection,
        value: &str,
        omitted: &[OptionalSection],
    ) -> String {
        if omitted.contains(&section) {
            String::new()
        } else {
            value.to_string()
        }
    }
}

/// Render `template` with the first ladder attempt that fits `budget`.
///
/// Returns the unfilled template when no attempt fits.
pub fn render_within_budget(
    template: &str,
    values: &PromptValues,
    ladder: &ReductionLadder,
    budget: &dyn PromptBudget,
    token_limit_fraction: f64,
) -> RenderedPrompt {
    for omitted in ladder.attempts() {
        let text = values.render(template, &omitted);
        if !budget.is_too_long(&text, token_limit_fraction) {
            return RenderedPrompt {
                text,
                omitted,
                fits: true,
            };
        }
        tracing::debug!(?omitted, "Prompt over budget, dropping the next optional section");
    }

    RenderedPrompt {
        text: template.to_string(),
        omitted: ladder.removals().to_vec(),
        fits: false,
    }
}

/// A rendered system prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedPrompt {
    pub text: String,
    /// Optional sections left out of `text`.
    pub omitted: Vec<OptionalSection>,
    /// `false` when `text` is the unfilled fallback template.
    pub fits: bool,
}
