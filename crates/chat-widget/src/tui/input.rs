// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages for the app
// loop, or into local ViewState edits (typing, scrolling).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::ViewState;
use crate::protocol::UserCommand;

/// Lines moved per PageUp/PageDown.
const PAGE_SIZE: usize = 10;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key should be forwarded to the app
/// loop (submit, quit). Returns `None` when it was handled locally.
///
/// Quit and scrolling work at all times. Editing and submitting are ignored
/// while input is disabled.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Windows reports both Press and Release; only act on Press.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);

    match key_event.code {
        KeyCode::Char('c') if ctrl => return Some(UserCommand::Quit),
        KeyCode::Esc => return Some(UserCommand::Quit),
        KeyCode::Up => {
            scroll_up(view_state, 1);
            return None;
        }
        KeyCode::Down => {
            scroll_down(view_state, 1);
            return None;
        }
        KeyCode::PageUp => {
            scroll_up(view_state, PAGE_SIZE);
            return None;
        }
        KeyCode::PageDown => {
            scroll_down(view_state, PAGE_SIZE);
            return None;
        }
        KeyCode::End => {
            view_state.scroll_back = 0;
            return None;
        }
        _ => {}
    }

    if !view_state.input_enabled {
        return None;
    }

    match key_event.code {
        KeyCode::Enter
            if key_event
                .modifiers
                .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
        {
            view_state.input.push('\n');
            None
        }
        KeyCode::Enter => submit(view_state),
        // Ctrl+J arrives as a plain newline on terminals without Shift+Enter.
        KeyCode::Char('j') if ctrl => {
            view_state.input.push('\n');
            None
        }
        KeyCode::Char('u') if ctrl => {
            view_state.input.clear();
            None
        }
        KeyCode::Backspace => {
            view_state.input.pop();
            None
        }
        KeyCode::Char(c) if !ctrl => {
            view_state.input.push(c);
            None
        }
        _ => None,
    }
}

/// Take the input as a submission. Blank input is left untouched and nothing
/// is sent.
///
/// Input is disabled locally right away; the app loop's `InputEnabled(true)`
/// turns it back on once the reply or notice is in.
fn submit(view_state: &mut ViewState) -> Option<UserCommand> {
    let text = view_state.input.trim();
    if text.is_empty() {
        return None;
    }
    let text = text.to_string();
    view_state.input.clear();
    view_state.input_enabled = false;
    Some(UserCommand::Submit(text))
}

fn scroll_up(view_state: &mut ViewState, lines: usize) {
    view_state.scroll_back = view_state.scroll_back.saturating_add(lines);
}

fn scroll_down(view_state: &mut ViewState, lines: usize) {
    view_state.scroll_back = view_state.scroll_back.saturating_sub(lines);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
