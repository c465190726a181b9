use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use tokio::sync::Notify;
use tracing::subscriber::{DefaultGuard, set_default};
use tracing_subscriber::{Registry, fmt, layer::SubscriberExt};

use crate::credential::{Credential, CredentialStore, InMemoryCredentialStore};
use crate::refresh::{HttpRefreshEndpoint, RefreshCoordinator, RefreshStatus};
use crate::session::SessionTeardown;
use crate::transport::{OutgoingRequest, Response, Transport};
use crate::{AuthenticatedClient, Config, Error};

pub const BASE_URL: &str = "http://backend.test";

/// In-process backend: accepts exactly one bearer token and serves `/refresh`
/// from a canned reply, optionally held until the test opens the gate.
pub struct ScriptedTransport {
    accepted: String,
    refresh_reply: (StatusCode, String),
    refresh_gate: Option<Notify>,
    refresh_calls: AtomicUsize,
    seen: Mutex<Vec<OutgoingRequest>>,
}

impl ScriptedTransport {
    pub fn new(accepted: &str, refresh_status: StatusCode, refresh_body: &str) -> Self {
        Self {
            accepted: format!("Bearer {accepted}"),
            refresh_reply: (refresh_status, refresh_body.to_string()),
            refresh_gate: None,
            refresh_calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn gated(mut self) -> Self {
        self.refresh_gate = Some(Notify::new());
        self
    }

    pub fn open_gate(&self) {
        if let Some(gate) = &self.refresh_gate {
            gate.notify_one();
        }
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Authorization header of every non-refresh request, in send order.
    pub fn bearer_log(&self, path: &str) -> Vec<Option<String>> {
        let url = format!("{BASE_URL}{path}");
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|req| req.url == url)
            .map(|req| {
                req.headers
                    .get(AUTHORIZATION)
                    .map(|v| v.to_str().unwrap().to_string())
            })
            .collect()
    }

    pub fn total_sent(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<Response, Error> {
        if request.url.ends_with("/unreachable") {
            return Err(Error::Network("connection refused".into()));
        }
        let is_refresh = request.url == format!("{BASE_URL}/refresh");
        let authorized = request
            .headers
            .get(AUTHORIZATION)
            .is_some_and(|v| v.as_bytes() == self.accepted.as_bytes());
        let missing = request.url.ends_with("/missing");
        self.seen.lock().unwrap().push(request);

        if is_refresh {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.refresh_gate {
                gate.notified().await;
            }
            let (status, body) = &self.refresh_reply;
            return Ok(Response::new(*status, body.clone()));
        }
        if !authorized {
            return Ok(Response::new(StatusCode::UNAUTHORIZED, "expired"));
        }
        if missing {
            return Ok(Response::new(StatusCode::NOT_FOUND, "no such resource"));
        }
        Ok(Response::new(StatusCode::OK, r#"{"ok":true}"#))
    }
}

pub fn client_with(
    transport: Arc<ScriptedTransport>,
    initial: Option<&str>,
) -> AuthenticatedClient<ScriptedTransport> {
    let config = Config::from_values(BASE_URL);
    let store: Arc<dyn CredentialStore> = match initial {
        Some(token) => Arc::new(InMemoryCredentialStore::with_credential(Credential::new(
            token,
        ))),
        None => Arc::new(InMemoryCredentialStore::new()),
    };
    let teardown = SessionTeardown::new(Arc::clone(&store));
    let endpoint = HttpRefreshEndpoint::new(Arc::clone(&transport), &config);
    let coordinator = RefreshCoordinator::new(endpoint, Arc::clone(&store), teardown.clone());
    AuthenticatedClient::from_parts(config, transport, store, teardown, coordinator)
}

pub async fn wait_for_waiters(client: &AuthenticatedClient<ScriptedTransport>, n: usize) {
    while client.coordinator().status() != (RefreshStatus::Refreshing { waiters: n }) {
        tokio::task::yield_now().await;
    }
}

struct VecWriter {
    lines: Arc<Mutex<Vec<String>>>,
}

impl std::io::Write for VecWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut guard = self.lines.lock().unwrap();
        guard.push(String::from_utf8_lossy(buf).into_owned());
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn make_subscriber(lines: Arc<Mutex<Vec<String>>>) -> impl tracing::Subscriber + Send + Sync {
    let writer_lines = lines.clone();
    Registry::default().with(
        fmt::Layer::default()
            .with_writer(move || VecWriter {
                lines: writer_lines.clone(),
            })
            .with_target(false)
            .with_level(true)
            .with_ansi(false),
    )
}

pub fn capture_logs() -> (Arc<Mutex<Vec<String>>>, DefaultGuard) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let guard = set_default(make_subscriber(lines.clone()));
    (lines, guard)
}

pub fn snapshot_logs(lines: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    lines.lock().unwrap().clone()
}
