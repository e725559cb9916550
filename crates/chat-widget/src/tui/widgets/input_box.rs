// Input box widget: the message being composed.
//
// Dimmed with a "waiting" title while a request is in flight. Shows the last
// lines of the buffer when it is taller than the box.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::tui::ViewState;

const PLACEHOLDER: &str = "Type a message...";

/// Render the input box and, when enabled, place the cursor at the end of
/// the text.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (title, border_style) = if state.input_enabled {
        ("Message", Style::default().fg(Color::White))
    } else {
        ("Waiting for reply...", Style::default().fg(Color::DarkGray))
    };

    let inner_height = area.height.saturating_sub(2) as usize;
    let inner_width = area.width.saturating_sub(2);
    let buffer_lines: Vec<&str> = state.input.split('\n').collect();
    let first_visible = buffer_lines.len().saturating_sub(inner_height.max(1));

    let lines: Vec<Line> = if state.input.is_empty() && state.input_enabled {
        vec![Line::from(Span::styled(
            PLACEHOLDER,
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        let text_style = if state.input_enabled {
            Style::default()
        } else {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
        };
        buffer_lines[first_visible..]
            .iter()
            .map(|l| Line::from(Span::styled(l.to_string(), text_style)))
            .collect()
    };

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(border_style),
    );
    frame.render_widget(paragraph, area);

    if state.input_enabled && inner_width > 0 && inner_height > 0 {
        let (col, row) = cursor_offset(&buffer_lines[first_visible..], inner_width);
        frame.set_cursor_position((area.x + 1 + col, area.y + 1 + row));
    }
}

/// Cursor column/row within the box's inner area for the visible lines.
/// The column is the display width of the last line, clamped to the last
/// inner column.
pub fn cursor_offset(visible_lines: &[&str], inner_width: u16) -> (u16, u16) {
    let row = visible_lines.len().saturating_sub(1);
    let col = visible_lines
        .last()
        .map(|l| Span::raw(*l).width())
        .unwrap_or(0);
    let max_col = inner_width.saturating_sub(1) as usize;
    (
        col.min(max_col) as u16,
        u16::try_from(row).unwrap_or(u16::MAX),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered_rows(state: &ViewState, width: u16, height: u16) -> Vec<String> {
        let backend = ratatui::backend::TestBackend::new(width, height);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), state))
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        (0..height)
            .map(|y| (0..width).map(|x| buffer[(x, y)].symbol().to_string()).collect())
            .collect()
    }

    #[test]
    fn cursor_offset_at_end_of_last_line() {
        assert_eq!(cursor_offset(&["hello"], 20), (5, 0));
        assert_eq!(cursor_offset(&["one", "three"], 20), (5, 1));
        assert_eq!(cursor_offset(&[""], 20), (0, 0));
    }

    #[test]
    fn cursor_offset_counts_display_columns() {
        assert_eq!(cursor_offset(&["你好"], 20), (4, 0));
        assert_eq!(cursor_offset(&["ok", "é一"], 20), (3, 1));
    }

    #[test]
    fn cursor_lands_after_wide_chars() {
        let backend = ratatui::backend::TestBackend::new(20, 3);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.input = "你好".into();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
        // Border column + two double-width chars.
        assert_eq!(
            terminal.get_cursor_position().unwrap(),
            ratatui::layout::Position::new(5, 1)
        );
    }

    #[test]
    fn cursor_offset_clamps_to_width() {
        assert_eq!(cursor_offset(&["a very long line of text"], 10), (9, 0));
    }

    #[test]
    fn empty_enabled_box_shows_placeholder() {
        let state = ViewState::default();
        let rows = rendered_rows(&state, 40, 3);
        assert!(rows[0].contains("Message"));
        assert!(rows[1].contains(PLACEHOLDER));
    }

    #[test]
    fn disabled_box_shows_waiting_title() {
        let mut state = ViewState::default();
        state.input_enabled = false;
        let rows = rendered_rows(&state, 40, 3);
        assert!(rows[0].contains("Waiting for reply..."));
        assert!(!rows[1].contains(PLACEHOLDER));
    }

    #[test]
    fn tall_buffer_shows_last_lines() {
        let mut state = ViewState::default();
        state.input = "l1\nl2\nl3\nl4".into();
        let rows = rendered_rows(&state, 20, 4); // two inner rows
        assert!(rows[1].contains("l3"));
        assert!(rows[2].contains("l4"));
    }
}
