//! Keyboard event handling for the TUI.
//!
//! Maps crossterm keyboard events to form messages. The question input has
//! focus at all times, so printable characters always edit the question.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::app::App;

/// Handles a keyboard event and updates the app state accordingly.
///
/// Returns `true` if the application should quit, `false` otherwise.
///
/// # Event Handling
///
/// - `Esc` / `Ctrl+C`: Quit
/// - `Enter`: Submit the question
/// - `Backspace`: Delete the last character
/// - `Ctrl+U`: Clear the question
/// - `Up` / `Down`: Scroll the answer panel
/// - Any other character: Append to the question
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => return true,
        KeyCode::Char('c') if ctrl => return true,
        KeyCode::Char('u') if ctrl => app.clear_question(),
        KeyCode::Enter => app.submit(),
        KeyCode::Backspace => app.pop_question_char(),
        KeyCode::Up => app.scroll_answer_up(1),
        KeyCode::Down => app.scroll_answer_down(1),
        KeyCode::Char(c) if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
            app.push_question_char(c);
        }
        _ => {}
    }

    false
}
