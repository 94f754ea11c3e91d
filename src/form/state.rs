use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Request lifecycle of the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No request for the latest sequence number is outstanding
    #[default]
    Idle,
    /// The latest issued request has not completed yet
    AwaitingResponse,
}

/// What the answer panel shows.
///
/// Exactly one of the latest answer or the latest failure message is shown
/// at a time, which the enum enforces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum AnswerText {
    /// Nothing to show: initial state, or the service returned no answer
    #[default]
    Empty,
    /// Answer returned by the service
    Answer(String),
    /// User-facing failure message
    Failed(String),
}

impl AnswerText {
    /// Returns the text to render, empty for [`AnswerText::Empty`].
    ///
    /// # Examples
    ///
    /// ```
    /// use askform::form::AnswerText;
    ///
    /// assert_eq!(AnswerText::Empty.as_str(), "");
    /// assert_eq!(AnswerText::Answer("Team A".into()).as_str(), "Team A");
    /// ```
    pub fn as_str(&self) -> &str {
        match self {
            AnswerText::Empty => "",
            AnswerText::Answer(text) | AnswerText::Failed(text) => text,
        }
    }

    /// Returns `true` if this is a failure message.
    pub fn is_failure(&self) -> bool {
        matches!(self, AnswerText::Failed(_))
    }
}

/// Everything needed to render the form.
///
/// Created empty on load and never persisted. All changes go through
/// [`crate::form::update`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub(super) question: String,
    pub(super) answer: AnswerText,
    pub(super) phase: Phase,
    /// Sequence number of the most recently issued request, 0 before the first submit
    pub(super) latest_seq: u64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub(super) answered_at: Option<OffsetDateTime>,
    /// Intermediate updates streamed for the latest request
    pub(super) progress: Vec<String>,
}

impl ViewState {
    /// Creates the initial, empty view state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the question text as currently typed.
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Returns the answer panel content.
    pub fn answer(&self) -> &AnswerText {
        &self.answer
    }

    /// Returns the current request phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns `true` while the latest request is outstanding.
    pub fn is_awaiting(&self) -> bool {
        self.phase == Phase::AwaitingResponse
    }

    /// Returns the sequence number of the last issued request.
    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// Returns when the displayed answer was applied.
    pub fn answered_at(&self) -> Option<OffsetDateTime> {
        self.answered_at
    }

    /// Returns progress lines streamed for the latest request.
    pub fn progress(&self) -> &[String] {
        &self.progress
    }
}
