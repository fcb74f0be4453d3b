//! Token budget checks for rendered prompts.

/// Decides whether a rendered prompt is too long for the model.
///
/// Implementations wrap a model's tokenizer; the conversation context only
/// ever asks this question and never counts tokens itself.
pub trait PromptBudget {
    /// Whether `text` exceeds `fraction` of the model's context window.
    fn is_too_long(&self, text: &str, fraction: f64) -> bool;

    /// Token count of `text`, used for logging.
    ///
    /// Defaults to a rough estimate of four characters per token.
    fn count_tokens(&self, text: &str) -> usize {
        estimate_tokens(text)
    }
}

impl<F> PromptBudget for F
where
    F: Fn(&str, f64) -> bool,
{
    fn is_too_long(&self, text: &str, fraction: f64) -> bool {
        self(text, fraction)
    }
}

/// Rough token estimate: one token per four characters, rounded up.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Budget against a fixed context window using the character estimate.
#[derive(Debug, Clone, Copy)]
pub struct ContextWindowBudget {
    pub context_window: usize,
}

impl ContextWindowBudget {
    pub fn new(context_window: usize) -> Self {
        Self { context_window }
    }
}

impl PromptBudget for ContextWindowBudget {
    fn is_too_long(&self, text: &str, fraction: f64) -> bool {
        let limit = self.context_window as f64 * fraction;
        self.count_tokens(text) as f64 > limit
    }
}
