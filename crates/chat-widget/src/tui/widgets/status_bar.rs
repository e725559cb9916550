// Status bar widget: endpoint, message count, request status.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::conversation::{Entry, Role};
use crate::tui::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [app name] | [endpoint host] | [message count] | [status]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (dot, dot_color, status_text) = status_indicator(state.input_enabled);
    let separator = || Span::styled(" | ", Style::default().fg(Color::Gray));

    let spans = vec![
        Span::styled(
            " chat-widget",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        separator(),
        Span::styled(endpoint_label(&state.endpoint), Style::default().fg(Color::White)),
        separator(),
        Span::styled(
            format!("{} messages", message_count(&state.thread)),
            Style::default().fg(Color::White),
        ),
        separator(),
        Span::styled(format!("{dot} "), Style::default().fg(dot_color)),
        Span::styled(status_text, Style::default().fg(Color::White)),
    ];

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Status dot, its color, and label for the request state.
pub fn status_indicator(input_enabled: bool) -> (&'static str, Color, &'static str) {
    if input_enabled {
        ("●", Color::Green, "ready")
    } else {
        ("●", Color::Yellow, "waiting for reply")
    }
}

/// Host part of the endpoint URL, or the raw string if it does not parse.
pub fn endpoint_label(endpoint: &str) -> String {
    match reqwest::Url::parse(endpoint) {
        Ok(url) => match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            _ => endpoint.to_string(),
        },
        Err(_) => endpoint.to_string(),
    }
}

/// User and assistant turns in the thread. The greeting and notices are not
/// counted.
pub fn message_count(thread: &[Entry]) -> usize {
    thread
        .iter()
        .filter(|e| !e.is_notice() && e.role() != Role::System)
        .count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
