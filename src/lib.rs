mod client;
pub mod config;
pub mod credential;
pub mod errors;
pub mod refresh;
pub mod request;
pub mod session;
pub mod telemetry;
pub mod transport;

pub use client::AuthenticatedClient;
pub use config::Config;
pub use credential::{Credential, CredentialStore, InMemoryCredentialStore};
pub use errors::{Error, RefreshFailure};
pub use refresh::{HttpRefreshEndpoint, RefreshCoordinator, RefreshEndpoint, RefreshStatus};
pub use request::{MultipartForm, Request, RequestBody};
pub use session::{SessionEvent, SessionTeardown};
pub use transport::{OutgoingRequest, ReqwestTransport, Response, Transport};

#[cfg(test)]
mod tests;
