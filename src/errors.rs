use std::fmt;

use reqwest::StatusCode;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Json(serde_json::Error),
    Reqwest(reqwest::Error),
    Network(String),
    Http(StatusCode, String),
    Config(String),
    Refresh(RefreshFailure),
}

impl Error {
    /// True when the request never produced an HTTP response.
    pub fn is_network(&self) -> bool {
        match self {
            Error::Reqwest(err) => !err.is_builder(),
            Error::Network(_) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "io error: {err}"),
            Error::Json(err) => write!(f, "json error: {err}"),
            Error::Reqwest(err) => write!(f, "network error: {err}"),
            Error::Network(msg) => write!(f, "network error: {msg}"),
            Error::Http(status, body) => write!(f, "http error: {status} {body}"),
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::Refresh(failure) => write!(f, "session refresh failed: {failure}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Reqwest(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Reqwest(err)
    }
}

impl From<RefreshFailure> for Error {
    fn from(failure: RefreshFailure) -> Self {
        Error::Refresh(failure)
    }
}

/// Terminal outcome of a refresh cycle, shared by every waiter of that cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshFailure {
    Rejected(StatusCode),
    MissingToken,
    Malformed(String),
    Network(String),
    Interrupted,
}

impl fmt::Display for RefreshFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshFailure::Rejected(status) => write!(f, "refresh endpoint returned {status}"),
            RefreshFailure::MissingToken => write!(f, "refresh response carried no token"),
            RefreshFailure::Malformed(msg) => write!(f, "refresh response unreadable: {msg}"),
            RefreshFailure::Network(msg) => write!(f, "refresh endpoint unreachable: {msg}"),
            RefreshFailure::Interrupted => write!(f, "refresh cycle ended without an outcome"),
        }
    }
}

impl std::error::Error for RefreshFailure {}
