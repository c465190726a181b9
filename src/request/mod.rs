mod decorator;

pub use decorator::decorate;

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName};
use serde::Serialize;

use crate::errors::Error;

/// One named part of a multipart upload.
#[derive(Clone, Debug)]
pub struct FormPart {
    pub name: String,
    pub file_name: Option<String>,
    pub mime: Option<String>,
    pub data: Vec<u8>,
}

/// Multipart payload kept as plain data so it can be sent again on retry.
#[derive(Clone, Debug, Default)]
pub struct MultipartForm {
    pub parts: Vec<FormPart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            file_name: None,
            mime: None,
            data: value.into().into_bytes(),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            file_name: Some(file_name.into()),
            mime: Some(mime.into()),
            data,
        });
        self
    }
}

#[derive(Clone, Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Text(String),
    Json(Vec<u8>),
    Binary {
        bytes: Vec<u8>,
        content_type: Option<String>,
    },
    Multipart(MultipartForm),
}

impl RequestBody {
    /// Binary and multipart payloads carry their own content type.
    pub fn owns_content_type(&self) -> bool {
        matches!(self, RequestBody::Binary { .. } | RequestBody::Multipart(_))
    }
}

/// A request as feature code describes it: relative path, no auth.
#[derive(Clone, Debug)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn header<K: IntoHeaderName>(mut self, key: K, value: HeaderValue) -> Self {
        self.headers.insert(key, value);
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, Error> {
        self.body = RequestBody::Json(serde_json::to_vec(body)?);
        Ok(self)
    }

    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = RequestBody::Text(body.into());
        self
    }

    pub fn binary(mut self, bytes: Vec<u8>, content_type: Option<String>) -> Self {
        self.body = RequestBody::Binary {
            bytes,
            content_type,
        };
        self
    }

    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }
}
