use std::sync::Arc;

use jiff::Timestamp;
use tokio::sync::broadcast;
use tracing::{Level, event};

use crate::credential::CredentialStore;

const EVENT_CAPACITY: usize = 16;

/// Signals the host application reacts to, typically by routing to its sign-in entry point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Expired { at: Timestamp },
    LoggedOut { at: Timestamp },
}

/// Clears the credential and tells subscribers the session is gone.
///
/// Repeated calls are harmless: the store is already empty and each call only
/// emits one more event.
#[derive(Clone)]
pub struct SessionTeardown {
    store: Arc<dyn CredentialStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionTeardown {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { store, events }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn invoke(&self) {
        self.tear_down(SessionEvent::Expired {
            at: Timestamp::now(),
        });
    }

    pub fn logout(&self) {
        self.tear_down(SessionEvent::LoggedOut {
            at: Timestamp::now(),
        });
    }

    fn tear_down(&self, signal: SessionEvent) {
        self.store.clear();
        // no subscribers is fine
        let receivers = self.events.send(signal.clone()).unwrap_or(0);
        event!(
            Level::INFO,
            signal = ?signal,
            receivers,
            "session.teardown"
        );
    }
}
