//! UI rendering functions for the TUI.
//!
//! Draws the form: a title, the question input, the answer panel and a
//! shortcut bar.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use time::{format_description::FormatItem, macros::format_description};

use super::app::App;
use crate::form::AnswerText;

const TITLE: &str = "Ask a Question";
const PLACEHOLDER: &str = "What player at the Bears ex...";
const ANSWERED_AT_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour]:[minute]:[second] UTC");

/// Main rendering function for the TUI.
///
/// # Arguments
///
/// * `frame` - The ratatui Frame to render into
/// * `app` - The application state
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Length(3), // Question input
            Constraint::Min(0),    // Answer panel
            Constraint::Length(1), // Shortcut bar
        ])
        .split(frame.area());

    let title = Paragraph::new(Line::from(Span::styled(
        TITLE,
        Style::default().add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(title, chunks[0]);

    render_question_input(frame, app, chunks[1]);
    render_answer(frame, app, chunks[2]);
    render_shortcut_bar(frame, chunks[3]);
}

/// Renders the question input with a cursor, or the placeholder when empty.
fn render_question_input(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Question")
        .border_style(Style::default().fg(Color::Cyan));

    let line = if app.question().is_empty() {
        Line::from(vec![
            Span::raw("█"),
            Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray)),
        ])
    } else {
        Line::from(vec![Span::raw(app.question()), Span::raw("█")])
    };

    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Builds the answer panel title, including when the answer arrived.
fn answer_title(app: &App) -> String {
    let state = app.state();
    if state.is_awaiting() {
        return "Response (waiting...)".to_string();
    }
    match state.answered_at() {
        Some(at) => match at.format(ANSWERED_AT_FORMAT) {
            Ok(time) => format!("Response ({time})"),
            Err(_) => "Response".to_string(),
        },
        None => "Response".to_string(),
    }
}

/// Builds the answer panel body.
///
/// While awaiting, shows streamed progress lines. Answers are rendered as
/// markdown; failures in red.
fn answer_text(app: &App) -> Text<'_> {
    let state = app.state();

    if state.is_awaiting() {
        let mut text = Text::default();
        text.lines.push(Line::from(Span::styled(
            "Waiting for response...",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
        for line in state.progress() {
            text.lines.push(Line::from(Span::styled(
                line.as_str(),
                Style::default().fg(Color::DarkGray),
            )));
        }
        return text;
    }

    match state.answer() {
        AnswerText::Empty => Text::default(),
        AnswerText::Answer(answer) => tui_markdown::from_str(answer),
        AnswerText::Failed(message) => Text::from(Line::from(Span::styled(
            message.as_str(),
            Style::default().fg(Color::Red),
        ))),
    }
}

/// Renders the answer panel.
fn render_answer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(answer_title(app));

    let paragraph = Paragraph::new(answer_text(app))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.answer_scroll(), 0));

    frame.render_widget(paragraph, area);
}

/// Renders the shortcut bar at the bottom of the screen.
fn render_shortcut_bar(frame: &mut Frame, area: Rect) {
    let key_style = Style::default().fg(Color::Cyan);
    let sep_style = Style::default().fg(Color::DarkGray);

    let spans = vec![
        Span::styled("Enter", key_style),
        Span::raw(": submit"),
        Span::styled(" | ", sep_style),
        Span::styled("Ctrl+U", key_style),
        Span::raw(": clear"),
        Span::styled(" | ", sep_style),
        Span::styled("Up/Down", key_style),
        Span::raw(": scroll"),
        Span::styled(" | ", sep_style),
        Span::styled("Esc", key_style),
        Span::raw(": quit"),
    ];

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
