use std::sync::Arc;

use reqwest::StatusCode;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::{
    AuthenticatedClient,
    config::Config,
    credential::{Credential, CredentialStore, InMemoryCredentialStore},
    errors::Error,
    refresh::{HttpRefreshEndpoint, RefreshCoordinator, RefreshEndpoint},
    request::{Request, decorate},
    session::{SessionEvent, SessionTeardown},
    transport::{Response, Transport},
};

fn is_auth_failure(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

impl<T: Transport> AuthenticatedClient<T> {
    /// Create a client wired to the backend's refresh endpoint with an empty
    /// in-memory credential store.
    pub fn new(config: Config, transport: T) -> Result<Self, Error> {
        config.validate()?;
        let transport = Arc::new(transport);
        let store: Arc<dyn CredentialStore> = Arc::new(InMemoryCredentialStore::new());
        let teardown = SessionTeardown::new(Arc::clone(&store));
        let endpoint = HttpRefreshEndpoint::new(Arc::clone(&transport), &config);
        let coordinator =
            RefreshCoordinator::new(endpoint, Arc::clone(&store), teardown.clone());
        Ok(Self::from_parts(
            config,
            transport,
            store,
            teardown,
            coordinator,
        ))
    }
}

impl<T: Transport, E: RefreshEndpoint> AuthenticatedClient<T, E> {
    /// Assemble a client from collaborators shared with other clients of the same session.
    pub fn from_parts(
        config: Config,
        transport: Arc<T>,
        store: Arc<dyn CredentialStore>,
        teardown: SessionTeardown,
        coordinator: RefreshCoordinator<E>,
    ) -> Self {
        Self {
            config,
            transport,
            store,
            teardown,
            coordinator,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn coordinator(&self) -> &RefreshCoordinator<E> {
        &self.coordinator
    }

    pub fn teardown(&self) -> &SessionTeardown {
        &self.teardown
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.teardown.subscribe()
    }

    pub fn credential(&self) -> Option<Credential> {
        self.store.get()
    }

    /// Store a credential obtained from a sign-in flow.
    pub fn sign_in(&self, credential: Credential) {
        self.store.set(credential);
    }

    /// Send `request`, refreshing the credential and retrying once on 401/403.
    ///
    /// Network errors and non-auth statuses are returned untouched. The retried
    /// response is returned as-is, even when it is another auth failure.
    pub async fn request(&self, request: &Request) -> Result<Response, Error> {
        let credential = self.store.get();
        let first = self
            .transport
            .send(decorate(request, &self.config, credential.as_ref()))
            .await
            .inspect_err(|err| {
                error!(
                    method = %request.method,
                    path = %request.path,
                    error = %err,
                    "request.network_error"
                );
            })?;
        if !is_auth_failure(first.status()) {
            return Ok(first);
        }

        warn!(
            method = %request.method,
            path = %request.path,
            status = %first.status(),
            "request.auth_failure"
        );
        let fresh = self.coordinator.await_fresh_credential().await?;
        let retried = self
            .transport
            .send(decorate(request, &self.config, Some(&fresh)))
            .await?;
        debug!(
            method = %request.method,
            path = %request.path,
            status = %retried.status(),
            "request.retry"
        );
        Ok(retried)
    }

    pub async fn get(&self, path: &str) -> Result<Response, Error> {
        self.request(&Request::get(path)).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, Error> {
        self.request(&Request::post(path).json(body)?).await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, Error> {
        self.request(&Request::put(path).json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<Response, Error> {
        self.request(&Request::delete(path)).await
    }

    /// Tell the backend the session is over, then clear it locally whatever the outcome.
    pub async fn logout(&self) {
        let request = Request::post(self.config.logout_path.as_str());
        match self.request(&request).await {
            Ok(resp) if resp.is_success() => info!("logout acknowledged"),
            Ok(resp) => warn!(status = %resp.status(), "logout rejected; clearing locally"),
            Err(err) => warn!(error = %err, "logout failed; clearing locally"),
        }
        self.teardown.logout();
    }
}
