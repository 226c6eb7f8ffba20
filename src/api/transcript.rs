//! Role-tagged conversation history sent to the completion service.

use serde::Serialize;
use std::fmt;

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

/// A single message in a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// An append-only list of turns.
///
/// Appending consumes the transcript and hands back the extended one, so a
/// stage always produces a new value instead of editing shared history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transcript holding only the user's question.
    pub fn from_question(question: impl Into<String>) -> Self {
        Self::new().with_user(question)
    }

    #[must_use]
    pub fn with_turn(mut self, turn: Turn) -> Self {
        self.turns.push(turn);
        self
    }

    #[must_use]
    pub fn with_user(self, text: impl Into<String>) -> Self {
        self.with_turn(Turn::user(text))
    }

    #[must_use]
    pub fn with_assistant(self, text: impl Into<String>) -> Self {
        self.with_turn(Turn::assistant(text))
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Total characters across all turns.
    pub fn char_count(&self) -> usize {
        self.turns.iter().map(|t| t.text.chars().count()).sum()
    }
}
