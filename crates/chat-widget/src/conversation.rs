// Conversation model: roles, turns, and the append-only thread.
//
// The thread is what the user sees. Turns are also sent upstream as the
// request history; notices are shown but never sent.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Role / Turn
// ---------------------------------------------------------------------------

/// Who is speaking in a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Lowercase wire name, also used as the thread label.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// A single item in the rendered thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Part of the conversation history sent upstream.
    Turn(Turn),
    /// Error notice shown with the system role. Never sent upstream.
    Notice(String),
}

impl Entry {
    pub fn role(&self) -> Role {
        match self {
            Entry::Turn(turn) => turn.role,
            Entry::Notice(_) => Role::System,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Entry::Turn(turn) => &turn.content,
            Entry::Notice(text) => text,
        }
    }

    pub fn is_notice(&self) -> bool {
        matches!(self, Entry::Notice(_))
    }
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

/// Ordered, append-only thread for one session.
///
/// Always starts with exactly one system turn (the greeting). Entries are
/// only ever appended; nothing is reordered or edited in place.
#[derive(Debug, Clone)]
pub struct Conversation {
    entries: Vec<Entry>,
}

impl Conversation {
    /// Start a conversation seeded with the system greeting.
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            entries: vec![Entry::Turn(Turn::new(Role::System, greeting))],
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> &Entry {
        self.push(Entry::Turn(Turn::new(Role::User, content)))
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) -> &Entry {
        self.push(Entry::Turn(Turn::new(Role::Assistant, content)))
    }

    pub fn push_notice(&mut self, content: impl Into<String>) -> &Entry {
        self.push(Entry::Notice(content.into()))
    }

    fn push(&mut self, entry: Entry) -> &Entry {
        self.entries.push(entry);
        // Just pushed, so the vec is non-empty.
        &self.entries[self.entries.len() - 1]
    }

    /// Every entry in insertion order, notices included.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// The turns sent upstream, in insertion order. Notices are skipped.
    pub fn history(&self) -> Vec<Turn> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                Entry::Turn(turn) => Some(turn.clone()),
                Entry::Notice(_) => None,
            })
            .collect()
    }

    /// Role of each entry in order. Notices report `Role::System`.
    pub fn roles(&self) -> Vec<Role> {
        self.entries.iter().map(Entry::role).collect()
    }

    pub fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
