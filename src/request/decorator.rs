use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};

use crate::config::Config;
use crate::credential::Credential;
use crate::transport::OutgoingRequest;

use super::{Request, RequestBody};

/// Turns a logical request into the wire request for the current credential.
///
/// Caller headers override the JSON default; the bearer header always wins.
pub fn decorate(
    request: &Request,
    config: &Config,
    credential: Option<&Credential>,
) -> OutgoingRequest {
    let mut headers = HeaderMap::new();
    if !request.body.owns_content_type() {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    headers.extend(request.headers.clone());
    if let RequestBody::Binary {
        content_type: Some(mime),
        ..
    } = &request.body
        && let Ok(value) = HeaderValue::from_str(mime)
    {
        headers.entry(CONTENT_TYPE).or_insert(value);
    }
    if let Some(credential) = credential.filter(|c| c.is_usable())
        && let Ok(mut value) = HeaderValue::from_str(&credential.bearer())
    {
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    OutgoingRequest {
        method: request.method.clone(),
        url: config.endpoint_url(&request.path),
        headers,
        body: request.body.clone(),
    }
}
