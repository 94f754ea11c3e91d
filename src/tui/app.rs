use crate::answer_service::AnswerService;
use crate::controller::Controller;
use crate::form::ViewState;

/// Application state for the TUI.
///
/// Wraps the form controller and keeps the purely presentational bits
/// (answer panel scroll offset) next to it.
pub struct App {
    controller: Controller<dyn AnswerService>,
    /// Scroll offset for the answer panel
    answer_scroll: u16,
}

impl App {
    /// Creates a new App around `controller`.
    pub fn new(controller: Controller<dyn AnswerService>) -> Self {
        Self {
            controller,
            answer_scroll: 0,
        }
    }

    /// Returns the form's view state.
    pub fn state(&self) -> &ViewState {
        self.controller.state()
    }

    /// Returns the question as currently typed.
    pub fn question(&self) -> &str {
        self.controller.state().question()
    }

    /// Appends a character to the question.
    pub fn push_question_char(&mut self, c: char) {
        let mut text = self.question().to_string();
        text.push(c);
        self.controller.set_question(text);
    }

    /// Removes the last character of the question.
    pub fn pop_question_char(&mut self) {
        let mut text = self.question().to_string();
        text.pop();
        self.controller.set_question(text);
    }

    /// Clears the question.
    pub fn clear_question(&mut self) {
        self.controller.set_question(String::new());
    }

    /// Submits the current question and resets the answer scroll.
    pub fn submit(&mut self) {
        let seq = self.controller.submit();
        tracing::info!(seq, "question submitted from form");
        self.answer_scroll = 0;
    }

    /// Applies completed requests. Returns `true` if the state changed.
    pub fn tick(&mut self) -> bool {
        self.controller.poll()
    }

    /// Returns the current answer panel scroll offset.
    pub fn answer_scroll(&self) -> u16 {
        self.answer_scroll
    }

    /// Scrolls the answer panel down by the specified amount.
    pub fn scroll_answer_down(&mut self, amount: u16) {
        self.answer_scroll = self.answer_scroll.saturating_add(amount);
    }

    /// Scrolls the answer panel up by the specified amount.
    pub fn scroll_answer_up(&mut self, amount: u16) {
        self.answer_scroll = self.answer_scroll.saturating_sub(amount);
    }

    #[cfg(test)]
    pub(crate) fn controller_mut(&mut self) -> &mut Controller<dyn AnswerService> {
        &mut self.controller
    }
}
