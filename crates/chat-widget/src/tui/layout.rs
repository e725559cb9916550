// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Thread (fill)                                     |
// |                                                   |
// +--------------------------------------------------+
// | Input Box (3..=10 rows, grows with its content)   |
// +--------------------------------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Smallest input box height: one text row plus borders.
pub const MIN_INPUT_HEIGHT: u16 = 3;
/// Largest input box height before its content scrolls.
pub const MAX_INPUT_HEIGHT: u16 = 10;

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: endpoint, turn count, request status.
    pub status_bar: Rect,
    /// The conversation thread.
    pub thread: Rect,
    /// Text entry.
    pub input: Rect,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

/// Height of the input box for a buffer with `line_count` lines.
pub fn input_height(line_count: usize) -> u16 {
    let rows = u16::try_from(line_count).unwrap_or(u16::MAX).max(1);
    rows.saturating_add(2)
        .clamp(MIN_INPUT_HEIGHT, MAX_INPUT_HEIGHT)
}

/// Build the layout. The input box takes `input_height` rows and the thread
/// gets whatever is left.
pub fn build_layout(area: Rect, input_height: u16) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),            // status bar
            Constraint::Min(3),               // thread
            Constraint::Length(input_height), // input box
            Constraint::Length(1),            // help bar
        ])
        .split(area);

    AppLayout {
        status_bar: vertical[0],
        thread: vertical[1],
        input: vertical[2],
        help_bar: vertical[3],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
