use std::sync::Arc;

use crate::config::Config;
use crate::credential::CredentialStore;
use crate::refresh::{HttpRefreshEndpoint, RefreshCoordinator};
use crate::session::SessionTeardown;

mod impls;

/// Entry point for every authenticated call made by feature code.
///
/// Decorates with the current credential, sends, and on 401/403 waits on the shared
/// [`RefreshCoordinator`] before retrying exactly once.
pub struct AuthenticatedClient<T, E = HttpRefreshEndpoint<T>> {
    config: Config,
    transport: Arc<T>,
    store: Arc<dyn CredentialStore>,
    teardown: SessionTeardown,
    coordinator: RefreshCoordinator<E>,
}

impl<T, E> Clone for AuthenticatedClient<T, E> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            transport: Arc::clone(&self.transport),
            store: Arc::clone(&self.store),
            teardown: self.teardown.clone(),
            coordinator: self.coordinator.clone(),
        }
    }
}
