use std::fmt::Display;

use anyhow::{anyhow, Context, Result};
use thiserror::Error;

use crate::io::HttpResponse;
use crate::method::Method;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error(
        "Invalid operation. The cache store can not be initialized more than once. \
         To clear the cache use reset"
    )]
    AlreadyInitialized,
    #[error("Network failure: remote responded with status {}", .0.status)]
    NetworkFailure(HttpResponse),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Cache miss: no {method} entry cached for {url}")]
    CacheMiss { method: Method, url: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Unknown HTTP method: {0}")]
    UnknownMethod(String),
    #[error("Unknown cache policy: {0}")]
    UnknownPolicy(String),
    #[error("Unknown success data handler: {0}")]
    UnknownHandler(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub trait AddContext<T, E>: Context<T, E> {
    fn err_context<C: Display + Send + Sync + 'static>(self, msg: C) -> Result<T, anyhow::Error>
    where
        Self: Sized,
    {
        self.with_context(|| msg.to_string())
    }
}

impl<U, T, E> AddContext<T, E> for U where U: Context<T, E> {}

pub fn gen<T: AsRef<str>>(msg: T) -> anyhow::Error {
    anyhow!(msg.as_ref().to_string())
}

/// Returns the raw response carried by a `NetworkFailure`, if that is what
/// the error is.
pub fn failed_response(err: &anyhow::Error) -> Option<&HttpResponse> {
    match err.downcast_ref::<FetchError>() {
        Some(FetchError::NetworkFailure(response)) => Some(response),
        _ => None,
    }
}
