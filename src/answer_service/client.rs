/// Answer service HTTP client implementation.
///
/// This module provides `AnswerClient` for making synchronous requests to the
/// answer service, along with the error type and builder for configuration.
use std::io::BufReader;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::Error as _;
use serde_json::Value;
use thiserror::Error;

use super::stream;

/// Base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// Path of the query endpoint, relative to the base URL.
pub const QUERY_PATH: &str = "/api/query";

/// Errors that can occur when querying the answer service.
#[derive(Debug, Error)]
pub enum AnswerError {
    /// Network-related errors (connection refused, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// The body (or a streamed event) was not the expected JSON
    #[error("Invalid response body (status {status}): {source}")]
    InvalidBody {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    /// Reading an event stream failed midway
    #[error("Stream read error: {0}")]
    Stream(#[source] std::io::Error),

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl AnswerError {
    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            AnswerError::Timeout(error)
        } else {
            AnswerError::Network(error)
        }
    }
}

/// Trait for answer service operations.
///
/// Enables mocking in unit tests; the controller only talks to this trait.
pub trait AnswerService: Send + Sync {
    /// Sends `question` and returns the answer, `None` when the reply has none.
    fn ask(&self, question: &str) -> Result<Option<String>, AnswerError>;

    /// Like [`AnswerService::ask`], reporting intermediate updates to `on_progress`.
    ///
    /// The default implementation reports nothing.
    fn ask_streaming(
        &self,
        question: &str,
        on_progress: &mut dyn FnMut(String),
    ) -> Result<Option<String>, AnswerError> {
        let _ = on_progress;
        self.ask(question)
    }
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    question: &'a str,
}

/// Extracts the `answer` field from a JSON reply body.
///
/// A JSON object without `answer` (or with `"answer": null`) yields `Ok(None)`.
/// Anything that is not a JSON object, or an `answer` that is not a string,
/// is an error.
///
/// # Examples
///
/// ```
/// use askform::answer_service::parse_answer;
///
/// assert_eq!(parse_answer(r#"{"answer":"Team A"}"#).unwrap(), Some("Team A".to_string()));
/// assert_eq!(parse_answer(r#"{"other":1}"#).unwrap(), None);
/// assert!(parse_answer("<html>").is_err());
/// ```
pub fn parse_answer(body: &str) -> Result<Option<String>, serde_json::Error> {
    let Value::Object(mut fields) = serde_json::from_str::<Value>(body)? else {
        return Err(serde_json::Error::custom("expected a JSON object"));
    };

    match fields.remove("answer") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(answer)) => Ok(Some(answer)),
        Some(other) => Err(serde_json::Error::custom(format!(
            "expected `answer` to be a string, got {other}"
        ))),
    }
}

/// Builder for constructing `AnswerClient` instances.
///
/// # Examples
///
/// ```
/// use askform::answer_service::AnswerClientBuilder;
///
/// let client = AnswerClientBuilder::new()
///     .base_url("http://127.0.0.1:5000")
///     .build()
///     .expect("Failed to create client");
/// assert_eq!(client.endpoint(), "http://127.0.0.1:5000/api/query");
/// ```
#[derive(Debug, Default)]
pub struct AnswerClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl AnswerClientBuilder {
    /// Creates a new `AnswerClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL of the answer service (e.g., "http://127.0.0.1:5000").
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets an overall request timeout. Requests never time out by default.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the `AnswerClient` with the configured settings.
    ///
    /// Falls back to [`DEFAULT_API_URL`] when no base URL was set.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::InvalidUrl` if the base URL does not parse or
    /// is not an `http`/`https` URL.
    pub fn build(self) -> Result<AnswerClient, AnswerError> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let url = reqwest::Url::parse(&base_url)
            .map_err(|e| AnswerError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AnswerError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                base_url
            )));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(AnswerError::Network)?;

        Ok(AnswerClient {
            client,
            endpoint: format!("{base_url}{QUERY_PATH}"),
        })
    }
}

/// Synchronous HTTP client for the answer service.
///
/// Sends one request per call; there is no retry. Construct it with
/// `AnswerClientBuilder`.
#[derive(Debug, Clone)]
pub struct AnswerClient {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl AnswerClient {
    /// Returns the full URL of the query endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl AnswerService for AnswerClient {
    fn ask(&self, question: &str) -> Result<Option<String>, AnswerError> {
        self.ask_streaming(question, &mut |_: String| {})
    }

    fn ask_streaming(
        &self,
        question: &str,
        on_progress: &mut dyn FnMut(String),
    ) -> Result<Option<String>, AnswerError> {
        tracing::debug!(endpoint = %self.endpoint, "sending query");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&QueryRequest { question })
            .send()
            .map_err(AnswerError::from_reqwest)?;

        // Status codes get no special handling: the body decides the outcome.
        let status = response.status().as_u16();
        let is_event_stream = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("text/event-stream"));

        if is_event_stream {
            tracing::debug!(status, "reading event stream");
            return stream::read_events(BufReader::new(response), status, on_progress);
        }

        let body = response.text().map_err(AnswerError::from_reqwest)?;
        parse_answer(&body).map_err(|source| AnswerError::InvalidBody { status, source })
    }
}
