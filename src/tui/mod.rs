//! Terminal User Interface module for askform.
//!
//! Provides the question form using ratatui for rendering and crossterm for
//! terminal management.

use std::io;
use std::panic;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self as crossterm_event, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::answer_service::{AnswerClientBuilder, AnswerService};
use crate::config::Settings;
use crate::controller::Controller;

mod app;
pub mod event;
mod ui;

pub use app::App;

/// How long to wait for input before checking for completed requests.
const TICK: Duration = Duration::from_millis(100);

/// Initializes the terminal for TUI rendering.
///
/// Switches stdin to raw mode so keys arrive one at a time, and moves to
/// the alternate screen so the shell's scrollback is untouched while the
/// form is open.
///
/// # Errors
///
/// Returns an error if raw mode or the alternate screen cannot be entered.
fn init_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("failed to create terminal")?;
    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// Leaves raw mode and the alternate screen and shows the cursor again.
/// Must run before the TUI exits, on error paths too, or the user's shell
/// is left without echo.
///
/// # Errors
///
/// Returns an error if any of the terminal commands fail.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

/// Terminal restoration for the panic hook.
///
/// Works on raw stdout since the hook has no access to the `Terminal`.
/// Errors are ignored: the process is already unwinding.
fn restore_terminal_panic() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Installs a panic hook that restores the terminal first.
///
/// Covers panics on the UI thread anywhere, not only inside the event loop,
/// so the panic message prints on a usable screen. The previous hook still
/// runs afterwards. Panics in request workers never reach the UI thread;
/// the controller turns them into the failure message.
fn init_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal_panic();
        original_hook(panic_info);
    }));
}

/// Runs the main event loop for the TUI.
///
/// Each pass applies completed requests, redraws the form, then waits up to
/// one tick for a key. Waiting is bounded so answers appear even while the
/// user is idle. Exits on Esc or Ctrl+C.
///
/// # Errors
///
/// Returns an error if event polling, rendering, or terminal operations fail.
/// Terminal state is always restored, even on error.
pub fn run_event_loop(app: &mut App) -> Result<()> {
    let mut terminal = init_terminal()?;

    // The loop runs in its own function so every exit path comes back here
    let result = run_event_loop_internal(app, &mut terminal);

    // Always restore terminal state
    if let Err(e) = restore_terminal(&mut terminal) {
        tracing::error!(error = %e, "failed to restore terminal");
        eprintln!("Error restoring terminal: {e}");
    }

    result
}

/// Internal event loop implementation.
///
/// Separated from `run_event_loop` so restoration happens in the outer
/// function whether this returns normally or with an error.
fn run_event_loop_internal(
    app: &mut App,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<()> {
    loop {
        // Completions first, so the frame shows the newest answer
        app.tick();

        terminal.draw(|frame| {
            ui::draw(frame, app);
        })?;

        if crossterm_event::poll(TICK)? && apply_terminal_event(app, crossterm_event::read()?) {
            break;
        }
    }

    Ok(())
}

/// Applies one terminal event to the form.
///
/// Returns `true` when the form should close. Resize, mouse and focus events
/// need nothing beyond the redraw on the next pass.
fn apply_terminal_event(app: &mut App, terminal_event: Event) -> bool {
    match terminal_event {
        Event::Key(key) => event::handle_key_event(app, key),
        _ => false,
    }
}

/// Entry point for the TUI application.
///
/// Builds the answer client from `settings` and runs the form until the
/// user quits.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the terminal fails.
pub fn run(settings: &Settings) -> Result<()> {
    init_panic_hook();

    let client = AnswerClientBuilder::new()
        .base_url(&settings.api_url)
        .timeout(settings.timeout)
        .build()
        .context("Failed to create answer client")?;
    tracing::info!(endpoint = client.endpoint(), "starting form");

    let service: Arc<dyn AnswerService> = Arc::new(client);
    let controller = Controller::new(service, settings.locale.failure_message());
    let mut app = App::new(controller);

    run_event_loop(&mut app).context("TUI event loop failed")?;

    tracing::info!("form closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app::test_support::echo_app;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn key_events_edit_the_form() {
        let mut app = echo_app();

        assert!(!apply_terminal_event(&mut app, key(KeyCode::Char('h'))));
        assert!(!apply_terminal_event(&mut app, key(KeyCode::Char('i'))));
        assert_eq!(app.question(), "hi");
    }

    #[test]
    fn non_key_events_keep_the_form_open() {
        let mut app = echo_app();
        app.push_question_char('x');

        assert!(!apply_terminal_event(&mut app, Event::Resize(80, 24)));
        assert!(!apply_terminal_event(&mut app, Event::FocusLost));
        assert_eq!(app.question(), "x");
    }

    #[test]
    fn escape_closes_the_form() {
        let mut app = echo_app();
        assert!(apply_terminal_event(&mut app, key(KeyCode::Esc)));
    }
}
