// Thread widget: the conversation, one labelled block per entry.
//
// Follows the bottom of the thread unless the user has scrolled back.
// While a request is pending, an animated typing indicator is shown as the
// last entry.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::conversation::{Entry, Role};
use crate::tui::markup::{self, Segment};
use crate::tui::ViewState;

const TEXT_INDENT: &str = "  ";
const CODE_INDENT: &str = "  │ ";

/// Render the thread into the given area.
///
/// `scroll_back` is clamped to the top of the thread here, since only the
/// renderer knows how many wrapped lines there are.
pub fn render(frame: &mut Frame, area: Rect, state: &mut ViewState) {
    let width = area.width.saturating_sub(2) as usize; // subtract border
    let lines = build_lines(&state.thread, state.is_pending(), state.tick, width);

    let inner_height = area.height.saturating_sub(2) as usize;
    state.scroll_back = state.scroll_back.min(max_scroll_back(lines.len(), inner_height));
    let top = scroll_top(lines.len(), inner_height, state.scroll_back);

    let title = if state.scroll_back > 0 {
        "Conversation (scrolled, End for latest)"
    } else {
        "Conversation"
    };

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((u16::try_from(top).unwrap_or(u16::MAX), 0));
    frame.render_widget(paragraph, area);
}

/// How far the view can scroll back before the first line is at the top.
pub fn max_scroll_back(total_lines: usize, visible: usize) -> usize {
    total_lines.saturating_sub(visible)
}

/// First visible line given the content length, the visible height, and how
/// far the user has scrolled back from the bottom.
pub fn scroll_top(total_lines: usize, visible: usize, scroll_back: usize) -> usize {
    max_scroll_back(total_lines, visible).saturating_sub(scroll_back)
}

/// Build every display line for the thread, wrapped to `width` columns.
pub fn build_lines(entries: &[Entry], pending: bool, tick: u64, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for entry in entries {
        let (label, style) = entry_label(entry);
        lines.push(Line::from(Span::styled(label, style.add_modifier(Modifier::BOLD))));
        push_body(&mut lines, entry.content(), width, body_style(entry));
        lines.push(Line::default());
    }

    if pending {
        let (label, style) = role_label(Role::Assistant);
        lines.push(Line::from(Span::styled(label, style.add_modifier(Modifier::BOLD))));
        lines.push(Line::from(Span::styled(
            format!("{TEXT_INDENT}{}", typing_indicator(tick)),
            Style::default().fg(Color::DarkGray),
        )));
    }

    lines
}

fn push_body(lines: &mut Vec<Line<'static>>, content: &str, width: usize, style: Style) {
    let code_style = Style::default().fg(Color::Cyan);
    for segment in markup::parse(content) {
        match segment {
            Segment::Text(text) => {
                let text = text.trim_matches('\n');
                if text.is_empty() {
                    continue;
                }
                for raw in text.split('\n') {
                    for wrapped in markup::wrap(raw, width.saturating_sub(TEXT_INDENT.len())) {
                        lines.push(Line::from(Span::styled(
                            format!("{TEXT_INDENT}{wrapped}"),
                            style,
                        )));
                    }
                }
            }
            Segment::Code(code) => {
                let indent_width = CODE_INDENT.chars().count();
                for raw in code.split('\n') {
                    for wrapped in markup::wrap(raw, width.saturating_sub(indent_width)) {
                        lines.push(Line::from(vec![
                            Span::styled(CODE_INDENT, Style::default().fg(Color::DarkGray)),
                            Span::styled(wrapped, code_style),
                        ]));
                    }
                }
            }
        }
    }
}

/// Header label and color for a role.
pub fn role_label(role: Role) -> (&'static str, Style) {
    match role {
        Role::User => ("You", Style::default().fg(Color::Green)),
        Role::Assistant => ("Assistant", Style::default().fg(Color::Blue)),
        Role::System => ("System", Style::default().fg(Color::Yellow)),
    }
}

fn entry_label(entry: &Entry) -> (&'static str, Style) {
    match entry {
        Entry::Notice(_) => ("System", Style::default().fg(Color::Red)),
        Entry::Turn(turn) => role_label(turn.role),
    }
}

fn body_style(entry: &Entry) -> Style {
    match entry {
        Entry::Notice(_) => Style::default().fg(Color::Red),
        Entry::Turn(turn) if turn.role == Role::System => Style::default().fg(Color::Gray),
        Entry::Turn(_) => Style::default(),
    }
}

/// Three dots with one lit, advancing every 10 render ticks.
pub fn typing_indicator(tick: u64) -> &'static str {
    const FRAMES: [&str; 3] = ["● ∙ ∙", "∙ ● ∙", "∙ ∙ ●"];
    FRAMES[((tick / 10) % 3) as usize]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
