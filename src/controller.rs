//! Runtime that drives the form.
//!
//! The controller owns the [`ViewState`] and is its only writer. Requests run
//! on worker threads and report back over a channel; the owner drains that
//! channel with [`Controller::poll`] (from the TUI tick) or blocks on
//! [`Controller::wait_idle`].

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use time::OffsetDateTime;

use crate::answer_service::AnswerService;
use crate::form::{Effect, Message, Outcome, ViewState, update};

/// Owns the view state and executes the effects `update` asks for.
pub struct Controller<S: AnswerService + ?Sized + 'static> {
    state: ViewState,
    service: Arc<S>,
    failure_message: String,
    sender: Sender<Message>,
    receiver: Receiver<Message>,
}

impl<S: AnswerService + ?Sized + 'static> Controller<S> {
    /// Creates a controller with an empty form.
    ///
    /// `failure_message` is what the answer panel shows when a request fails.
    pub fn new(service: Arc<S>, failure_message: impl Into<String>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            state: ViewState::new(),
            service,
            failure_message: failure_message.into(),
            sender,
            receiver,
        }
    }

    /// Returns the current view state.
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Replaces the question text.
    pub fn set_question(&mut self, text: impl Into<String>) {
        self.dispatch(Message::SetQuestion(text.into()));
    }

    /// Submits the current question and returns its sequence number.
    pub fn submit(&mut self) -> u64 {
        self.dispatch(Message::Submit);
        self.state.latest_seq()
    }

    /// Runs `message` through `update` and executes the resulting effect.
    pub fn dispatch(&mut self, message: Message) {
        let state = std::mem::take(&mut self.state);
        let (state, effect) = update(state, message);
        self.state = state;

        if let Some(effect) = effect {
            self.execute(effect);
        }
    }

    /// Applies all completions that have arrived so far without blocking.
    ///
    /// Returns `true` if any message was applied.
    pub fn poll(&mut self) -> bool {
        let mut applied = false;
        while let Ok(message) = self.receiver.try_recv() {
            self.dispatch(message);
            applied = true;
        }
        applied
    }

    /// Blocks until the latest request has completed.
    ///
    /// Returns `false` if `timeout` elapsed first. With `None` it waits as
    /// long as the request takes. Every worker reports a completion, even one
    /// whose service panicked, so `None` cannot wait on a dead worker.
    pub fn wait_idle(&mut self, timeout: Option<Duration>) -> bool {
        let deadline = timeout.map(|timeout| Instant::now() + timeout);

        while self.state.is_awaiting() {
            let message = match deadline {
                None => match self.receiver.recv() {
                    Ok(message) => message,
                    Err(_) => return false,
                },
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    match self.receiver.recv_timeout(remaining) {
                        Ok(message) => message,
                        Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {
                            return false;
                        }
                    }
                }
            };
            self.dispatch(message);
        }
        true
    }

    fn execute(&self, effect: Effect) {
        match effect {
            Effect::SendQuery { seq, question } => {
                let service = Arc::clone(&self.service);
                let sender = self.sender.clone();
                let failure_message = self.failure_message.clone();

                thread::spawn(move || {
                    let progress_sender = sender.clone();
                    let result = panic::catch_unwind(AssertUnwindSafe(|| {
                        service.ask_streaming(&question, &mut |line: String| {
                            let _ = progress_sender.send(Message::Progress { seq, line });
                        })
                    }));

                    let outcome = match result {
                        Ok(Ok(answer)) => Outcome::Answered(answer),
                        Ok(Err(error)) => {
                            tracing::warn!(seq, %error, "query failed");
                            Outcome::Failed(failure_message)
                        }
                        Err(_) => {
                            tracing::error!(seq, "query worker panicked");
                            Outcome::Failed(failure_message)
                        }
                    };

                    // The receiver is gone only if the controller was dropped
                    let _ = sender.send(Message::Completed {
                        seq,
                        outcome,
                        received_at: OffsetDateTime::now_utc(),
                    });
                });
            }
        }
    }
}
