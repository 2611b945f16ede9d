//! Language model boundary for SQL generation.

use crate::error::Result;

/// A chat-completion backend that turns a prompt into text.
///
/// Implementations wrap a specific provider (DeepSeek, OpenAI, a local model)
/// behind a blocking interface. The pipeline passes a fixed system prompt and
/// the assembled user prompt, and expects the raw completion text back.
///
/// # Example
///
/// ```rust,ignore
/// use t2s_rag::Completion;
///
/// let sql = backend.complete(SYSTEM_PROMPT, &prompt)?;
/// ```
pub trait Completion: Send + Sync {
    /// Produce a completion for `prompt` under the given `system` instruction.
    fn complete(&self, system: &str, prompt: &str) -> Result<String>;

    /// Short backend name used in logs.
    fn name(&self) -> &str {
        "completion"
    }
}
