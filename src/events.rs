//! Console event channel shared by cards and the surrounding page

use tokio::sync::broadcast;

/// Events emitted while operating the console
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleEvent {
    /// A launch request was accepted by the server
    LaunchCompleted {
        model_uid: String,
        model_name: String,
    },
    /// A custom registration was removed
    RegistrationDeleted { model_name: String },
    /// A user-facing error message
    Error { message: String },
}

/// Broadcast fan-out for console events
///
/// Cards push into it, the surrounding page subscribes. Sending with no
/// subscribers is fine; events are simply dropped.
#[derive(Clone)]
pub struct ConsoleEvents {
    tx: broadcast::Sender<ConsoleEvent>,
}

impl ConsoleEvents {
    pub fn new() -> Self {
        // Capacity of 100 should be plenty for one page of cards
        let (tx, _) = broadcast::channel(100);
        Self { tx }
    }

    /// Subscribe to console events
    pub fn subscribe(&self) -> broadcast::Receiver<ConsoleEvent> {
        self.tx.subscribe()
    }

    /// Surface a user-facing error message
    pub fn report_error(&self, message: impl Into<String>) {
        let _ = self.tx.send(ConsoleEvent::Error {
            message: message.into(),
        });
    }

    pub(crate) fn emit(&self, event: ConsoleEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for ConsoleEvents {
    fn default() -> Self {
        Self::new()
    }
}
