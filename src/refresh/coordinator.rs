use std::mem;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;
use tracing::debug;

use crate::credential::{Credential, CredentialStore};
use crate::errors::RefreshFailure;
use crate::session::SessionTeardown;
use crate::telemetry::refresh::RefreshTelemetry;

use super::RefreshEndpoint;

type Outcome = Result<Credential, RefreshFailure>;
type Waiter = oneshot::Sender<Outcome>;

enum RefreshState {
    Idle,
    Refreshing { waiters: Vec<Waiter> },
}

/// Snapshot of the coordinator state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshStatus {
    Idle,
    Refreshing { waiters: usize },
}

struct Inner<E> {
    state: Mutex<RefreshState>,
    endpoint: E,
    store: Arc<dyn CredentialStore>,
    teardown: SessionTeardown,
}

/// Serializes credential renewal: one refresh call in flight, every caller
/// blocked on it gets the same outcome.
///
/// Clones share state; build one per session and hand clones to every client.
pub struct RefreshCoordinator<E> {
    inner: Arc<Inner<E>>,
}

impl<E> Clone for RefreshCoordinator<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: RefreshEndpoint> RefreshCoordinator<E> {
    pub fn new(endpoint: E, store: Arc<dyn CredentialStore>, teardown: SessionTeardown) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(RefreshState::Idle),
                endpoint,
                store,
                teardown,
            }),
        }
    }

    pub fn status(&self) -> RefreshStatus {
        match &*self.inner.lock_state() {
            RefreshState::Idle => RefreshStatus::Idle,
            RefreshState::Refreshing { waiters } => RefreshStatus::Refreshing {
                waiters: waiters.len(),
            },
        }
    }

    /// Waits for the outcome of the current refresh cycle, starting one if none is running.
    ///
    /// Must be called from within a tokio runtime: the refresh call runs on its own task
    /// so it settles even if this caller goes away.
    pub async fn await_fresh_credential(&self) -> Result<Credential, RefreshFailure> {
        let (tx, rx) = oneshot::channel();
        let start_cycle = {
            let mut state = self.inner.lock_state();
            match &mut *state {
                RefreshState::Refreshing { waiters } => {
                    waiters.push(tx);
                    debug!(waiters = waiters.len(), "refresh.enqueued");
                    false
                }
                RefreshState::Idle => {
                    *state = RefreshState::Refreshing { waiters: vec![tx] };
                    true
                }
            }
        };
        if start_cycle {
            let cycle = PendingCycle {
                inner: Arc::clone(&self.inner),
                telemetry: RefreshTelemetry::new(),
                settled: false,
            };
            tokio::spawn(cycle.run());
        }
        rx.await.unwrap_or(Err(RefreshFailure::Interrupted))
    }
}

impl<E> Inner<E> {
    fn lock_state(&self) -> std::sync::MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take_waiters(&self) -> Vec<Waiter> {
        match mem::replace(&mut *self.lock_state(), RefreshState::Idle) {
            RefreshState::Refreshing { waiters } => waiters,
            RefreshState::Idle => Vec::new(),
        }
    }
}

/// The single in-flight refresh. Settles on drop if `run` never got to.
struct PendingCycle<E> {
    inner: Arc<Inner<E>>,
    telemetry: RefreshTelemetry,
    settled: bool,
}

impl<E: RefreshEndpoint> PendingCycle<E> {
    async fn run(mut self) {
        self.telemetry.emit_start();
        let outcome = self.inner.endpoint.refresh().await;
        self.settle(outcome);
    }
}

impl<E> PendingCycle<E> {
    fn settle(&mut self, outcome: Outcome) {
        match &outcome {
            Ok(credential) => {
                // store first so a caller arriving after Idle reads the new token
                self.inner.store.set(credential.clone());
                let waiters = self.inner.take_waiters();
                self.telemetry.emit_success(waiters.len());
                for waiter in waiters {
                    let _ = waiter.send(outcome.clone());
                }
            }
            Err(failure) => {
                let waiters = self.inner.take_waiters();
                self.telemetry.emit_failure(failure, waiters.len());
                self.inner.teardown.invoke();
                for waiter in waiters {
                    let _ = waiter.send(outcome.clone());
                }
            }
        }
        // only after the waiters are answered; a panic above leaves this to `drop`
        self.settled = true;
    }
}

impl<E> Drop for PendingCycle<E> {
    fn drop(&mut self) {
        if !self.settled {
            self.settle(Err(RefreshFailure::Interrupted));
        }
    }
}
