// Application state and orchestration logic.
//
// The app loop owns the conversation. It takes user commands from the TUI,
// runs at most one endpoint request at a time, and pushes every change to
// the thread (and every input enable/disable) to the TUI as a `UiUpdate`.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, info};

use crate::client::{ChatBackend, ClientError};
use crate::config::Config;
use crate::conversation::{Conversation, Entry};
use crate::protocol::{BackendEvent, UiUpdate, UserCommand};

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// What happened to a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Empty or whitespace-only text. Nothing appended, nothing sent.
    Ignored,
    /// A request is already in flight; input is disabled.
    Busy,
    /// The user turn was appended and a request is now in flight.
    Sent,
}

/// Handles for the two tasks behind one in-flight request.
pub struct InFlight {
    /// The endpoint call itself.
    pub request: AbortHandle,
    /// Awaits `request` and reports its outcome on the backend channel.
    pub reporter: JoinHandle<()>,
}

impl InFlight {
    fn abort(&self) {
        self.reporter.abort();
        self.request.abort();
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete session state.
pub struct AppState {
    pub conversation: Conversation,
    /// Shown in the thread whenever a request fails.
    pub error_notice: String,
    /// Mirrors the TUI's input controls. `false` exactly while a request is
    /// in flight.
    pub input_enabled: bool,
    /// Endpoint client, shared with the spawned request task.
    pub backend: Arc<dyn ChatBackend>,
    /// Sender the request task reports its result on.
    pub backend_tx: mpsc::Sender<BackendEvent>,
    pub current_request: Option<InFlight>,
}

impl AppState {
    pub fn new(
        config: &Config,
        backend: Arc<dyn ChatBackend>,
        backend_tx: mpsc::Sender<BackendEvent>,
    ) -> Self {
        Self {
            conversation: Conversation::new(config.conversation.greeting.clone()),
            error_notice: config.conversation.error_notice.clone(),
            input_enabled: true,
            backend,
            backend_tx,
            current_request: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.input_enabled
    }

    /// Handle a submission from the input box.
    ///
    /// On `Sent`, the TUI has been told about the new user turn and that
    /// input is disabled, and the request task is running.
    pub async fn submit(&mut self, text: &str, ui_tx: &mpsc::Sender<UiUpdate>) -> SubmitOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SubmitOutcome::Ignored;
        }
        if self.is_pending() {
            debug!("Submission rejected: request already in flight");
            return SubmitOutcome::Busy;
        }

        let entry = self.conversation.push_user(text).clone();
        let _ = ui_tx.send(UiUpdate::EntryAppended(entry)).await;

        self.input_enabled = false;
        let _ = ui_tx.send(UiUpdate::InputEnabled(false)).await;

        self.spawn_request();
        SubmitOutcome::Sent
    }

    /// Spawn the request for the current history.
    ///
    /// The request itself runs in an inner task; the outer task always
    /// reports back, turning a panic or abort of the inner task into
    /// `BackendEvent::Failed` so the input is re-enabled no matter what.
    fn spawn_request(&mut self) {
        let history = self.conversation.history();
        let backend = Arc::clone(&self.backend);
        let tx = self.backend_tx.clone();

        info!("Sending conversation with {} turns", history.len());

        let request = tokio::spawn(async move { backend.complete(&history).await });
        let request_abort = request.abort_handle();

        let reporter = tokio::spawn(async move {
            let event = match request.await {
                Ok(Ok(reply)) => BackendEvent::Reply(reply),
                Ok(Err(e)) => BackendEvent::Failed(e),
                Err(join_err) => BackendEvent::Failed(ClientError::Aborted(join_err.to_string())),
            };
            let _ = tx.send(event).await;
        });

        self.current_request = Some(InFlight {
            request: request_abort,
            reporter,
        });
    }

    /// Apply the result of the in-flight request and re-enable input.
    pub async fn finish_request(&mut self, event: BackendEvent, ui_tx: &mpsc::Sender<UiUpdate>) {
        if !self.is_pending() {
            debug!("Discarding backend event with no request in flight");
            return;
        }

        let entry: Entry = match event {
            BackendEvent::Reply(text) => {
                info!("Reply received ({} chars)", text.len());
                self.conversation.push_assistant(text).clone()
            }
            BackendEvent::Failed(err) => {
                error!("Chat request failed: {err}");
                self.conversation.push_notice(self.error_notice.clone()).clone()
            }
        };
        let _ = ui_tx.send(UiUpdate::EntryAppended(entry)).await;

        self.current_request = None;
        self.input_enabled = true;
        let _ = ui_tx.send(UiUpdate::InputEnabled(true)).await;
    }

    /// Abort the in-flight request, if any. Both the endpoint call and its
    /// reporter are stopped, so the HTTP request does not outlive the session.
    pub fn cancel_request(&mut self) {
        if let Some(in_flight) = self.current_request.take() {
            debug!("Aborting in-flight request");
            in_flight.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the application event loop.
///
/// Sends the opening thread and input state to the TUI, then listens on:
/// 1. User commands from the TUI
/// 2. Results from the request task
///
/// Returns on `UserCommand::Quit` or when the command channel closes.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    mut backend_rx: mpsc::Receiver<BackendEvent>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    for entry in state.conversation.entries() {
        let _ = ui_tx.send(UiUpdate::EntryAppended(entry.clone())).await;
    }
    let _ = ui_tx.send(UiUpdate::InputEnabled(state.input_enabled)).await;

    // Stop polling the backend channel once it closes so select! never spins.
    let mut backend_open = true;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Submit(text)) => {
                        state.submit(&text, &ui_tx).await;
                    }
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            event = backend_rx.recv(), if backend_open => {
                match event {
                    Some(event) => state.finish_request(event, &ui_tx).await,
                    None => {
                        info!("Backend channel closed");
                        backend_open = false;
                    }
                }
            }
        }
    }

    state.cancel_request();
    info!("Application event loop exiting");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
