// Terminal UI: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors the thread and the input-enabled
// flag. The app loop pushes `UiUpdate` messages over an mpsc channel; the TUI
// applies them to `ViewState` and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod markup;
pub mod widgets;

use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::conversation::Entry;
use crate::protocol::{UiUpdate, UserCommand};

use layout::{build_layout, input_height, AppLayout};

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state that mirrors the session for rendering.
pub struct ViewState {
    /// Every entry the app has appended, in order.
    pub thread: Vec<Entry>,
    /// Text currently in the input box.
    pub input: String,
    /// Whether the input box accepts edits and submission.
    pub input_enabled: bool,
    /// Lines scrolled up from the bottom of the thread. 0 follows the tail.
    pub scroll_back: usize,
    /// Endpoint URL, shown in the status bar.
    pub endpoint: String,
    /// Render tick counter, drives the typing indicator animation.
    pub tick: u64,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            thread: Vec::new(),
            input: String::new(),
            input_enabled: true,
            scroll_back: 0,
            endpoint: String::new(),
            tick: 0,
        }
    }
}

impl ViewState {
    pub fn new(endpoint: impl Into<String>) -> Self {
        ViewState {
            endpoint: endpoint.into(),
            ..ViewState::default()
        }
    }

    /// A request is in flight whenever input is disabled.
    pub fn is_pending(&self) -> bool {
        !self.input_enabled
    }

    /// Number of lines in the input buffer (at least 1).
    pub fn input_line_count(&self) -> usize {
        self.input.split('\n').count()
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::EntryAppended(entry) => {
            state.thread.push(entry);
            // New entries always bring the thread back to the bottom.
            state.scroll_back = 0;
        }
        UiUpdate::InputEnabled(enabled) => {
            state.input_enabled = enabled;
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete frame. The thread widget may clamp `scroll_back`.
fn render_frame(frame: &mut Frame, state: &mut ViewState) {
    let layout = build_layout(frame.area(), input_height(state.input_line_count()));

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::thread::render(frame, layout.thread, state);
    widgets::input_box::render(frame, layout.input, state);
    render_help_bar(frame, &layout);
}

fn render_help_bar(frame: &mut Frame, layout: &AppLayout) {
    let text = " Enter:Send | Alt+Enter:Newline | Ctrl+U:Clear | PgUp/PgDn:Scroll | End:Latest | Esc:Quit";
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        text,
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, layout.help_bar);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// 1. Initializes the terminal (raw mode, alternate screen).
/// 2. Installs a panic hook that restores the terminal.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    mut view_state: ViewState,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result = loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    // Channel closed: app is shutting down
                    None => break Ok(()),
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break Ok(());
                            }
                        }
                    }
                    // Mouse, resize, focus, paste: the next tick redraws.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(anyhow::Error::from(e).context("terminal input error")),
                    None => break Ok(()),
                }
            }

            _ = render_tick.tick() => {
                view_state.tick = view_state.tick.wrapping_add(1);
                if let Err(e) = terminal.draw(|frame| render_frame(frame, &mut view_state)) {
                    break Err(anyhow::Error::from(e).context("failed to draw frame"));
                }
            }
        }
    };

    ratatui::restore();

    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
