//! Questions asked of the admin before a mutation.
//!
//! The workflow never talks to a terminal or a browser. It asks through a
//! [`Prompt`], and the surface decides how to get the answer: the CLI reads
//! stdin, the gateway replays answers sent in the request body.

use async_trait::async_trait;
use parking_lot::Mutex;

/// Source of admin answers.
#[async_trait]
pub trait Prompt: Send + Sync {
    /// Ask a yes/no question. `false` means declined.
    async fn confirm(&self, question: &str) -> bool;

    /// Ask for free text. `None` means the admin cancelled.
    async fn reason(&self, question: &str) -> Option<String>;
}

/// A prompt with answers fixed up front.
///
/// It also records the questions it was asked, in order.
#[derive(Debug, Default)]
pub struct PresetPrompt {
    confirmed: bool,
    reason: Option<String>,
    asked: Mutex<Vec<String>>,
}

impl PresetPrompt {
    /// Answer every confirmation with `confirmed` and every reason with `reason`.
    #[must_use]
    pub fn new(confirmed: bool, reason: Option<String>) -> Self {
        Self {
            confirmed,
            reason,
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Confirm everything, with no reason.
    #[must_use]
    pub fn confirming() -> Self {
        Self::new(true, None)
    }

    /// Decline every confirmation.
    #[must_use]
    pub fn declining() -> Self {
        Self::new(false, None)
    }

    /// Confirm everything and give `reason` when asked.
    #[must_use]
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self::new(true, Some(reason.into()))
    }

    /// Questions asked so far.
    #[must_use]
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().clone()
    }
}

#[async_trait]
impl Prompt for PresetPrompt {
    async fn confirm(&self, question: &str) -> bool {
        self.asked.lock().push(question.to_string());
        self.confirmed
    }

    async fn reason(&self, question: &str) -> Option<String> {
        self.asked.lock().push(question.to_string());
        self.reason.clone()
    }
}

/// Normalize a reason answer: cancelled, empty, and whitespace-only all mean
/// no reason.
#[must_use]
pub fn usable_reason(answer: Option<String>) -> Option<String> {
    answer
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn preset_prompt_records_questions() {
        let prompt = PresetPrompt::with_reason("wrong document");
        assert_eq!(
            prompt.reason("Why?").await.as_deref(),
            Some("wrong document")
        );
        assert!(prompt.confirm("Sure?").await);
        assert_eq!(prompt.asked(), vec!["Why?", "Sure?"]);
    }

    #[test]
    fn blank_reasons_are_unusable() {
        assert_eq!(usable_reason(None), None);
        assert_eq!(usable_reason(Some(String::new())), None);
        assert_eq!(usable_reason(Some("  \n".to_string())), None);
        assert_eq!(
            usable_reason(Some(" spam ".to_string())).as_deref(),
            Some("spam")
        );
    }
}
