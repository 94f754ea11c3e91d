pub mod answer_service;
pub mod config;
pub mod controller;
pub mod form;
pub mod logging;
pub mod tui;

pub use answer_service::{AnswerClient, AnswerClientBuilder, AnswerError, AnswerService};
pub use config::{Locale, Settings, SettingsBuilder};
pub use controller::Controller;
pub use form::{AnswerText, Phase, ViewState};
