use std::future::Future;
use std::sync::Arc;

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::warn;

use crate::config::Config;
use crate::credential::Credential;
use crate::errors::RefreshFailure;
use crate::request::RequestBody;
use crate::transport::{OutgoingRequest, Transport};

/// Source of a new bearer credential.
pub trait RefreshEndpoint: Send + Sync + 'static {
    fn refresh(&self) -> impl Future<Output = Result<Credential, RefreshFailure>> + Send;
}

/// POSTs to the backend's refresh route.
///
/// The request carries no bearer header; the backend authenticates it with the
/// persistent cookie held by the transport.
pub struct HttpRefreshEndpoint<T> {
    transport: Arc<T>,
    url: String,
    token_field: String,
}

impl<T: Transport> HttpRefreshEndpoint<T> {
    pub fn new(transport: Arc<T>, config: &Config) -> Self {
        Self {
            transport,
            url: config.refresh_url(),
            token_field: config.token_field.clone(),
        }
    }

    fn request(&self) -> OutgoingRequest {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        OutgoingRequest {
            method: Method::POST,
            url: self.url.clone(),
            headers,
            body: RequestBody::Empty,
        }
    }
}

impl<T: Transport> RefreshEndpoint for HttpRefreshEndpoint<T> {
    async fn refresh(&self) -> Result<Credential, RefreshFailure> {
        let resp = self
            .transport
            .send(self.request())
            .await
            .map_err(|err| RefreshFailure::Network(err.to_string()))?;
        if !resp.is_success() {
            warn!(status = %resp.status(), url = %self.url, "refresh.rejected");
            return Err(RefreshFailure::Rejected(resp.status()));
        }
        let payload: serde_json::Value = resp
            .json()
            .map_err(|err| RefreshFailure::Malformed(err.to_string()))?;
        payload
            .get(&self.token_field)
            .and_then(serde_json::Value::as_str)
            .map(Credential::new)
            .filter(Credential::is_usable)
            .ok_or(RefreshFailure::MissingToken)
    }
}
