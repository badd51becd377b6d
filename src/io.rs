use crate::{
    error::FetchError,
    http::{Headers, RequestOptions},
    payload::Blob,
    Result,
};

/// The network boundary. Implementors take a URL and the transport options
/// (method already injected) and return the fully buffered response. They
/// can do real HTTP calls against a remote server or mock the responses for
/// testing purposes.
///
/// Non-success statuses are returned as `Ok` responses; deciding what a
/// failure is belongs to the caller. `Err` is reserved for requests that
/// could not complete at all.
pub trait Transport {
    fn send(&self, url: &str, options: &RequestOptions) -> Result<HttpResponse>;
}

/// Adapts lower level HTTP outputs to a common response. The body is read
/// in full at the transport boundary, so cloning the response duplicates
/// the body and every reader gets its own copy.
#[derive(Clone, Debug, PartialEq, Builder)]
pub struct HttpResponse {
    #[builder(default = "200")]
    pub status: u16,
    #[builder(default)]
    pub headers: Headers,
    #[builder(setter(into), default)]
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn builder() -> HttpResponseBuilder {
        HttpResponseBuilder::default()
    }

    /// True for any 2xx status.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|s| s.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Body decoded as UTF-8. Invalid sequences are replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> Result<serde_json::Value> {
        serde_json::from_slice(&self.body).map_err(|err| FetchError::Parse(err.to_string()).into())
    }

    pub fn array_buffer(&self) -> Vec<u8> {
        self.body.clone()
    }

    pub fn blob(&self) -> Blob {
        Blob {
            content_type: self.content_type().map(|s| s.to_string()),
            data: self.body.clone(),
        }
    }
}

impl HttpResponseBuilder {
    pub fn header(&mut self, key: &str, value: &str) -> &mut Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .set(key, value);
        self
    }
}
