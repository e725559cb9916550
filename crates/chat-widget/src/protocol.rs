// Message types passed between the TUI, the app loop, and request tasks.

use crate::client::ClientError;
use crate::conversation::Entry;

/// Commands sent from the TUI to the app loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Submit the text currently in the input box.
    Submit(String),
    Quit,
}

/// Updates pushed from the app loop to the TUI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiUpdate {
    /// A new entry was appended to the thread.
    EntryAppended(Entry),
    /// Input controls toggled. `false` while a request is in flight.
    InputEnabled(bool),
}

/// Result of an outbound request, delivered back to the app loop.
#[derive(Debug)]
pub enum BackendEvent {
    Reply(String),
    Failed(ClientError),
}
