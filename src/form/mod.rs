//! View state and update logic for the question form.
//!
//! The form is modelled as a serializable [`ViewState`] that changes only
//! through [`update`]. Side effects (outbound requests) are returned as
//! [`Effect`] values for the caller to execute.

mod state;
mod update;

pub use state::{AnswerText, Phase, ViewState};
pub use update::{Effect, Message, Outcome, update};
