use reqwest::Client;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::config::Config;
use crate::errors::Error;
use crate::request::{MultipartForm, RequestBody};

use super::{OutgoingRequest, Response, Transport};

const USER_AGENT: &str = "session-fetch-rust/0.1.0";

/// reqwest-backed transport. The cookie store carries the HTTP-only refresh cookie.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .user_agent(config.user_agent.as_deref().unwrap_or(USER_AGENT));
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

fn multipart_form(form: MultipartForm) -> Result<Form, Error> {
    let mut out = Form::new();
    for part in form.parts {
        let mut piece = Part::bytes(part.data);
        if let Some(file_name) = part.file_name {
            piece = piece.file_name(file_name);
        }
        if let Some(mime) = part.mime {
            piece = piece.mime_str(&mime).map_err(|_| {
                Error::Config(format!("Invalid mime type '{mime}' for part '{}'", part.name))
            })?;
        }
        out = out.part(part.name, piece);
    }
    Ok(out)
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<Response, Error> {
        let OutgoingRequest {
            method,
            url,
            headers,
            body,
        } = request;
        debug!(method = %method, url = %url, "transport.send");
        let builder = self.client.request(method, &url).headers(headers);
        let builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Text(text) => builder.body(text),
            RequestBody::Json(bytes) => builder.body(bytes),
            RequestBody::Binary { bytes, .. } => builder.body(bytes),
            RequestBody::Multipart(form) => builder.multipart(multipart_form(form)?),
        };
        let resp = builder.send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?;
        Ok(Response::new(status, body.to_vec()).with_headers(headers))
    }
}
