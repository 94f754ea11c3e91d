/// HTTP client for the answer-providing service.
///
/// This module provides a blocking client for `POST /api/query`, the
/// `AnswerService` trait used by the controller (and mocked in tests), and
/// parsing for both plain JSON and event-stream replies.
mod client;
mod stream;

pub use client::{
    AnswerClient, AnswerClientBuilder, AnswerError, AnswerService, DEFAULT_API_URL, QUERY_PATH,
    parse_answer,
};
pub use stream::{StreamEvent, read_events};
