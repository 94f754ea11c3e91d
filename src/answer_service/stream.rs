//! Event-stream replies from the multi-team backend.
//!
//! The backend emits `data: <json>` events separated by blank lines. The last
//! event may arrive without a trailing blank line.

use std::io::BufRead;

use serde::de::Error as _;
use serde_json::Value;

use super::client::AnswerError;

/// Team keys the backend uses for intermediate messages.
const TEAM_KEYS: [&str; 2] = ["research_team", "writing_team"];

/// One decoded event from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// `{"answer": "..."}`
    Answer(String),
    /// `{"research_team": "..."}` or `{"writing_team": "..."}`
    Team { team: String, content: String },
    /// Any other shape, e.g. supervisor routing decisions
    Other,
}

impl StreamEvent {
    /// Classifies a decoded event. An `answer` that is neither a string nor
    /// null is an error, as it is in a plain JSON reply.
    fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        match value.get("answer") {
            None | Some(Value::Null) => {}
            Some(Value::String(answer)) => return Ok(StreamEvent::Answer(answer.clone())),
            Some(other) => {
                return Err(serde_json::Error::custom(format!(
                    "expected `answer` to be a string, got {other}"
                )));
            }
        }
        for team in TEAM_KEYS {
            if let Some(content) = value.get(team).and_then(Value::as_str) {
                return Ok(StreamEvent::Team {
                    team: team.to_string(),
                    content: content.to_string(),
                });
            }
        }
        Ok(StreamEvent::Other)
    }
}

/// Reads an event stream to the end and returns the final answer.
///
/// Each team message is passed to `on_progress` as `"<team>: <content>"`.
/// The result is the last `answer` event, else the last team message, else
/// `None`. `status` is only used to annotate errors.
///
/// # Errors
///
/// Returns `AnswerError::Stream` if reading fails and
/// `AnswerError::InvalidBody` if an event is not valid JSON or carries a
/// non-string `answer`.
pub fn read_events<R: BufRead>(
    reader: R,
    status: u16,
    on_progress: &mut dyn FnMut(String),
) -> Result<Option<String>, AnswerError> {
    let mut answer: Option<String> = None;
    let mut last_team_message: Option<String> = None;
    let mut data = String::new();

    let mut dispatch = |data: &mut String| -> Result<(), AnswerError> {
        if data.is_empty() {
            return Ok(());
        }
        let value: Value = serde_json::from_str(data)
            .map_err(|source| AnswerError::InvalidBody { status, source })?;
        data.clear();

        let event = StreamEvent::from_value(&value)
            .map_err(|source| AnswerError::InvalidBody { status, source })?;
        match event {
            StreamEvent::Answer(text) => answer = Some(text),
            StreamEvent::Team { team, content } => {
                on_progress(format!("{team}: {content}"));
                last_team_message = Some(content);
            }
            StreamEvent::Other => tracing::debug!(event = %value, "ignoring stream event"),
        }
        Ok(())
    };

    for line in reader.lines() {
        let line = line.map_err(AnswerError::Stream)?;
        if line.trim().is_empty() {
            dispatch(&mut data)?;
        } else if let Some(payload) = line.strip_prefix("data:") {
            if !data.is_empty() {
                data.push('\n');
            }
            data.push_str(payload.strip_prefix(' ').unwrap_or(payload));
        }
        // Comments, `event:` and `id:` fields carry nothing we display
    }
    dispatch(&mut data)?;

    Ok(answer.or(last_team_message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(input: &str) -> (Result<Option<String>, AnswerError>, Vec<String>) {
        let mut progress = Vec::new();
        let result = read_events(input.as_bytes(), 200, &mut |line: String| progress.push(line));
        (result, progress)
    }

    #[test]
    fn team_messages_are_reported_as_progress() {
        let input = concat!(
            "data: {\"supervisor\": {\"next\": \"research_team\"}}\n\n",
            "data: {\"research_team\": \"Found three sources\"}\n\n",
            "data: {\"writing_team\": \"Draft written\"}\n\n",
        );
        let (result, progress) = read(input);

        assert_eq!(
            progress,
            vec![
                "research_team: Found three sources".to_string(),
                "writing_team: Draft written".to_string(),
            ]
        );
        assert_eq!(result.unwrap().as_deref(), Some("Draft written"));
    }

    #[test]
    fn last_answer_event_wins_over_team_messages() {
        let input = concat!(
            "data: {\"research_team\": \"notes\"}\n\n",
            "data: {\"answer\": \"first\"}\n\n",
            "data: {\"answer\": \"final\"}\n\n",
            "data: {\"writing_team\": \"later draft\"}\n\n",
        );
        let (result, _) = read(input);
        assert_eq!(result.unwrap().as_deref(), Some("final"));
    }

    #[test]
    fn trailing_event_without_blank_line_is_dispatched() {
        let (result, _) = read("data: {\"answer\": \"recursion limit reached\"}");
        assert_eq!(result.unwrap().as_deref(), Some("recursion limit reached"));
    }

    #[test]
    fn multi_line_data_is_joined() {
        let input = "data: {\"answer\":\ndata:  \"joined\"}\n\n";
        let (result, _) = read(input);
        assert_eq!(result.unwrap().as_deref(), Some("joined"));
    }

    #[test]
    fn stream_without_answer_or_team_message_is_none() {
        let input = ": keep-alive\n\nevent: ping\ndata: {\"supervisor\": {}}\n\n";
        let (result, progress) = read(input);
        assert_eq!(result.unwrap(), None);
        assert!(progress.is_empty());
    }

    #[test]
    fn malformed_event_is_invalid_body() {
        let (result, _) = read("data: not json\n\n");
        assert!(matches!(
            result,
            Err(AnswerError::InvalidBody { status: 200, .. })
        ));
    }

    #[test]
    fn non_string_answer_event_is_invalid_body() {
        let input = concat!(
            "data: {\"research_team\": \"notes\"}\n\n",
            "data: {\"answer\": 42}\n\n",
        );
        let (result, progress) = read(input);

        assert_eq!(progress, vec!["research_team: notes".to_string()]);
        assert!(matches!(
            result,
            Err(AnswerError::InvalidBody { status: 200, .. })
        ));
    }

    #[test]
    fn null_answer_event_is_not_an_answer() {
        let input = concat!(
            "data: {\"answer\": null}\n\n",
            "data: {\"writing_team\": \"draft\"}\n\n",
        );
        let (result, _) = read(input);
        assert_eq!(result.unwrap().as_deref(), Some("draft"));
    }

    #[test]
    fn classifies_event_shapes() {
        let answer = serde_json::json!({ "answer": "x" });
        let team = serde_json::json!({ "research_team": "y" });
        let other = serde_json::json!({ "supervisor": { "next": "FINISH" } });

        let bad_answer = serde_json::json!({ "answer": { "text": "x" } });

        assert_eq!(StreamEvent::from_value(&answer).unwrap(), StreamEvent::Answer("x".into()));
        assert_eq!(
            StreamEvent::from_value(&team).unwrap(),
            StreamEvent::Team {
                team: "research_team".into(),
                content: "y".into()
            }
        );
        assert_eq!(StreamEvent::from_value(&other).unwrap(), StreamEvent::Other);
        assert!(StreamEvent::from_value(&bad_answer).is_err());
    }
}
