//! Values stored in the cache and the handlers that produce them from a
//! response body.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FetchError;
use crate::io::HttpResponse;
use crate::Result;

/// Binary body together with the content type the remote announced.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// A parsed response body as it lives in the cache store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Payload {
    Text(String),
    Json(Value),
    Binary(Vec<u8>),
    Blob(Blob),
}

impl Payload {
    /// Empty payloads are treated as if nothing had been cached: empty text
    /// and JSON `null`, `false`, `0` or `""`. JSON objects and arrays,
    /// binary data and blobs are never empty, even with no contents.
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Text(text) => text.is_empty(),
            Payload::Json(value) => match value {
                Value::Null => true,
                Value::Bool(flag) => !flag,
                Value::Number(number) => number.as_f64().is_some_and(|n| n == 0.0),
                Value::String(s) => s.is_empty(),
                Value::Array(_) | Value::Object(_) => false,
            },
            Payload::Binary(_) | Payload::Blob(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Payload::Binary(data) => Some(data),
            Payload::Blob(blob) => Some(&blob.data),
            _ => None,
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

/// How a successful response body is parsed before it is saved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SuccessDataHandler {
    #[default]
    Text,
    Json,
    ArrayBuffer,
    Blob,
}

impl SuccessDataHandler {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuccessDataHandler::Text => "text",
            SuccessDataHandler::Json => "json",
            SuccessDataHandler::ArrayBuffer => "arrayBuffer",
            SuccessDataHandler::Blob => "blob",
        }
    }

    /// Parses the buffered body of `response`. The response itself is left
    /// untouched so the caller can still read it.
    pub fn parse(&self, response: &HttpResponse) -> Result<Payload> {
        let payload = match self {
            SuccessDataHandler::Text => Payload::Text(response.text()),
            SuccessDataHandler::Json => Payload::Json(response.json()?),
            SuccessDataHandler::ArrayBuffer => Payload::Binary(response.array_buffer()),
            SuccessDataHandler::Blob => Payload::Blob(response.blob()),
        };
        Ok(payload)
    }
}

impl Display for SuccessDataHandler {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SuccessDataHandler {
    type Err = FetchError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "text" => Ok(SuccessDataHandler::Text),
            "json" => Ok(SuccessDataHandler::Json),
            "arrayBuffer" | "binary" => Ok(SuccessDataHandler::ArrayBuffer),
            "blob" => Ok(SuccessDataHandler::Blob),
            other => Err(FetchError::UnknownHandler(other.to_string())),
        }
    }
}
