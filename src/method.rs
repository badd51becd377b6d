use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// HTTP methods a request can be dispatched with. Each one owns its own
/// bucket in the cache store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Method {
    #[default]
    GET,
    HEAD,
    POST,
    CONNECT,
    TRACE,
    TRACK,
    DELETE,
    OPTIONS,
    PUT,
}

impl Method {
    pub const ALL: [Method; 9] = [
        Method::GET,
        Method::HEAD,
        Method::POST,
        Method::CONNECT,
        Method::TRACE,
        Method::TRACK,
        Method::DELETE,
        Method::OPTIONS,
        Method::PUT,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::CONNECT => "CONNECT",
            Method::TRACE => "TRACE",
            Method::TRACK => "TRACK",
            Method::DELETE => "DELETE",
            Method::OPTIONS => "OPTIONS",
            Method::PUT => "PUT",
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| FetchError::UnknownMethod(s.to_string()))
    }
}
