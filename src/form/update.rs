use time::OffsetDateTime;

use super::state::{AnswerText, Phase, ViewState};

/// Result of a completed request, as seen by the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The service replied; `None` when the reply carried no answer
    Answered(Option<String>),
    /// The request failed; carries the user-facing failure message
    Failed(String),
}

/// Inputs to [`update`].
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Replace the question text with the given value
    SetQuestion(String),
    /// Submit the current question
    Submit,
    /// Intermediate update for request `seq`
    Progress { seq: u64, line: String },
    /// Request `seq` finished
    Completed {
        seq: u64,
        outcome: Outcome,
        received_at: OffsetDateTime,
    },
}

/// Side effects requested by [`update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send `question` to the answer service, tagged with `seq`
    SendQuery { seq: u64, question: String },
}

/// Applies `message` to `state`, returning the new state and any effect to run.
///
/// Each submit gets the next sequence number. Progress and completions whose
/// sequence number is not the latest issued one are dropped, so the answer
/// shown always belongs to the most recent submit regardless of the order
/// in which responses arrive.
///
/// # Examples
///
/// ```
/// use askform::form::{Effect, Message, ViewState, update};
///
/// let (state, _) = update(ViewState::new(), Message::SetQuestion("Who won?".into()));
/// let (state, effect) = update(state, Message::Submit);
///
/// assert!(state.is_awaiting());
/// assert_eq!(
///     effect,
///     Some(Effect::SendQuery { seq: 1, question: "Who won?".into() })
/// );
/// ```
pub fn update(mut state: ViewState, message: Message) -> (ViewState, Option<Effect>) {
    match message {
        Message::SetQuestion(text) => {
            state.question = text;
            (state, None)
        }
        Message::Submit => {
            state.latest_seq += 1;
            state.phase = Phase::AwaitingResponse;
            state.progress.clear();
            let effect = Effect::SendQuery {
                seq: state.latest_seq,
                question: state.question.clone(),
            };
            tracing::debug!(seq = state.latest_seq, "query submitted");
            (state, Some(effect))
        }
        Message::Progress { seq, line } => {
            if seq == state.latest_seq && state.phase == Phase::AwaitingResponse {
                state.progress.push(line);
            } else {
                tracing::debug!(seq, latest = state.latest_seq, "dropping stale progress");
            }
            (state, None)
        }
        Message::Completed {
            seq,
            outcome,
            received_at,
        } => {
            if seq != state.latest_seq {
                tracing::debug!(seq, latest = state.latest_seq, "dropping stale response");
                return (state, None);
            }
            state.answer = match outcome {
                Outcome::Answered(Some(text)) => AnswerText::Answer(text),
                Outcome::Answered(None) => AnswerText::Empty,
                Outcome::Failed(message) => AnswerText::Failed(message),
            };
            state.answered_at = Some(received_at);
            state.phase = Phase::Idle;
            (state, None)
        }
    }
}
