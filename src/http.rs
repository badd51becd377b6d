use crate::cache::{self, Cache, CacheStore};
use crate::config::ConfigProperties;
use crate::error::FetchError;
use crate::io::{HttpResponse, Transport};
use crate::method::Method;
use crate::payload::{Payload, SuccessDataHandler};
use crate::policy::CachePolicy;
use crate::Result;
use crate::{log_debug, log_info};
use serde::Serialize;
use std::collections::{hash_map, HashMap};
use std::sync::Arc;

pub mod network;

pub use network::NetworkTransport;

/// Request headers. Names are stored lowercased, so lookups are case
/// insensitive.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Headers(HashMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Headers(HashMap::new())
    }

    pub fn set<K: AsRef<str>, V: Into<String>>(&mut self, key: K, value: V) {
        self.0.insert(key.as_ref().to_lowercase(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.0.get(&key.to_lowercase())
    }

    /// Copies all headers of `other` into self. Headers in `other` win.
    pub fn extend(&mut self, other: &Headers) {
        for (key, value) in other.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Transport options handed over to the network transport.
#[derive(Builder, Clone, Debug, Default, PartialEq)]
#[builder(default)]
pub struct RequestOptions {
    #[builder(setter(strip_option))]
    method: Option<Method>,
    headers: Headers,
    #[builder(setter(into, strip_option))]
    body: Option<Vec<u8>>,
}

impl RequestOptions {
    pub fn builder() -> RequestOptionsBuilder {
        RequestOptionsBuilder::default()
    }

    /// Copy of the options with `method` injected. The given method always
    /// replaces whatever the options carried.
    pub fn with_method(&self, method: Method) -> Self {
        RequestOptions {
            method: Some(method),
            ..self.clone()
        }
    }

    /// Serializes `data` as the JSON request body.
    pub fn with_json<S: Serialize>(mut self, data: &S) -> Result<Self> {
        let body = serde_json::to_vec(data).map_err(|err| FetchError::Parse(err.to_string()))?;
        self.headers.set("content-type", "application/json");
        self.body = Some(body);
        Ok(self)
    }

    pub fn set_header(&mut self, key: &str, value: &str) {
        self.headers.set(key, value);
    }

    pub fn method(&self) -> Method {
        self.method.unwrap_or_default()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

impl RequestOptionsBuilder {
    pub fn header(&mut self, key: &str, value: &str) -> &mut Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .set(key, value);
        self
    }
}

/// Per request caching options. Unset fields fall back to the configured
/// defaults.
#[derive(Builder, Clone, Copy, Debug, Default, PartialEq)]
#[builder(default)]
pub struct FetchOptions {
    #[builder(setter(strip_option))]
    pub cache_policy: Option<CachePolicy>,
    #[builder(setter(strip_option))]
    pub success_data_handler: Option<SuccessDataHandler>,
}

impl FetchOptions {
    pub fn builder() -> FetchOptionsBuilder {
        FetchOptionsBuilder::default()
    }

    pub fn new(cache_policy: CachePolicy) -> Self {
        FetchOptions {
            cache_policy: Some(cache_policy),
            success_data_handler: None,
        }
    }

    pub fn with_handler(mut self, handler: SuccessDataHandler) -> Self {
        self.success_data_handler = Some(handler);
        self
    }
}

/// Outcome of a dispatch: either the raw network response, unconsumed, or
/// the payload previously saved in the cache.
#[derive(Clone, Debug, PartialEq)]
pub enum Fetched {
    Network(HttpResponse),
    Cached(Payload),
}

impl Fetched {
    pub fn is_cached(&self) -> bool {
        matches!(self, Fetched::Cached(_))
    }

    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            Fetched::Network(response) => Some(response),
            Fetched::Cached(_) => None,
        }
    }

    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Fetched::Cached(payload) => Some(payload),
            Fetched::Network(_) => None,
        }
    }
}

/// Policy driven dispatcher. Every request is checked against its cache
/// policy to decide between the network transport and the cache store.
/// Successful network responses are parsed with the selected handler and
/// saved when the policy allows it.
pub struct Client<T, C> {
    transport: T,
    cache: C,
    config: Arc<dyn ConfigProperties>,
}

impl<T, C> Client<T, C> {
    pub fn new(transport: T, cache: C, config: Arc<dyn ConfigProperties>) -> Self {
        Client {
            transport,
            cache,
            config,
        }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn config(&self) -> &dyn ConfigProperties {
        self.config.as_ref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Configured default headers go first, the caller's own headers on top
    /// and the method last.
    fn request_options(&self, method: Method, options: Option<RequestOptions>) -> RequestOptions {
        let mut options = options.unwrap_or_default();
        if let Some(defaults) = self.config.default_headers() {
            let mut headers = defaults.clone();
            headers.extend(&options.headers);
            options.headers = headers;
        }
        options.with_method(method)
    }
}

impl Client<NetworkTransport, Arc<CacheStore>> {
    /// Client that talks to the network and shares the process wide cache
    /// store.
    pub fn with_config(config: Arc<dyn ConfigProperties>) -> Self {
        let transport = NetworkTransport::new(config.as_ref());
        Client::new(transport, cache::instance(), config)
    }
}

impl<T: Transport, C: Cache> Client<T, C> {
    pub fn fetch(
        &self,
        method: Method,
        url: &str,
        options: Option<RequestOptions>,
        custom: Option<FetchOptions>,
    ) -> Result<Fetched> {
        let custom = custom.unwrap_or_default();
        let cache_policy = custom
            .cache_policy
            .unwrap_or_else(|| self.config.default_cache_policy());
        let handler = custom
            .success_data_handler
            .unwrap_or_else(|| self.config.default_success_data_handler());

        let cached = if cache_policy.reads_cache() {
            self.cache.read(method, url)
        } else {
            None
        };
        if !cache_policy.should_call_network(cached.is_some()) {
            return match cached {
                Some(payload) => {
                    log_debug!("Cache hit: {} {} ({})", method, url, cache_policy);
                    Ok(Fetched::Cached(payload))
                }
                None => {
                    log_debug!("Cache miss: {} {} ({})", method, url, cache_policy);
                    Err(FetchError::CacheMiss {
                        method,
                        url: url.to_string(),
                    }
                    .into())
                }
            };
        }

        log_debug!("Network request: {} {} ({})", method, url, cache_policy);
        let options = self.request_options(method, options);
        let response = self.transport.send(url, &options)?;
        if !response.is_ok() {
            log_info!(
                "{} {} failed with status {}",
                method,
                url,
                response.status
            );
            return Err(FetchError::NetworkFailure(response).into());
        }
        if cache_policy.stores_result() {
            let payload = handler.parse(&response)?;
            log_debug!("Saving {} {} as {}", method, url, handler);
            self.cache.save(method, url, payload);
        }
        Ok(Fetched::Network(response))
    }
}

macro_rules! method_entry_points {
    ($($name:ident => $method:ident),* $(,)?) => {
        impl<T: Transport, C: Cache> Client<T, C> {
            $(
                #[doc = concat!("Dispatches a `", stringify!($method), "` request.")]
                pub fn $name(
                    &self,
                    url: &str,
                    options: Option<RequestOptions>,
                    custom: Option<FetchOptions>,
                ) -> Result<Fetched> {
                    self.fetch(Method::$method, url, options, custom)
                }
            )*
        }
    };
}

method_entry_points! {
    get => GET,
    head => HEAD,
    post => POST,
    connect => CONNECT,
    trace => TRACE,
    track => TRACK,
    delete => DELETE,
    options => OPTIONS,
    put => PUT,
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::{
        cache::CacheStore,
        payload::Blob,
        test::utils::{ConfigMock, MockTransport},
    };
    use serde_json::json;

    fn ok_response(body: &str) -> HttpResponse {
        HttpResponse::builder()
            .status(200)
            .body(body)
            .build()
            .unwrap()
    }

    fn client<'a>(
        transport: MockTransport,
        cache: &'a CacheStore,
    ) -> Client<MockTransport, &'a CacheStore> {
        Client::new(transport, cache, Arc::new(ConfigMock::default()))
    }

    #[test]
    fn test_defaults_network_only_and_text() {
        let cache = CacheStore::new();
        let client = client(MockTransport::new(vec![ok_response("text-value")]), &cache);
        let fetched = client.post("url-value", None, None).unwrap();
        assert_eq!(Some(&ok_response("text-value")), fetched.response());
        assert_eq!(
            Some(Payload::from("text-value")),
            cache.read(Method::POST, "url-value")
        );
        assert_eq!(1, *client.transport().run_count());
    }

    #[test]
    fn test_method_is_merged_into_transport_options() {
        let cache = CacheStore::new();
        let client = client(MockTransport::new(vec![ok_response("x")]), &cache);
        client.post("http://x", None, None).unwrap();
        let expected = RequestOptions::builder()
            .method(Method::POST)
            .build()
            .unwrap();
        assert_eq!(vec![expected], *client.transport().options());
        assert_eq!(vec!["http://x".to_string()], *client.transport().urls());
    }

    #[test]
    fn test_method_always_wins_over_caller_options() {
        let cache = CacheStore::new();
        let client = client(MockTransport::new(vec![ok_response("x")]), &cache);
        let options = RequestOptions::builder()
            .method(Method::GET)
            .header("accept", "text/plain")
            .body("payload")
            .build()
            .unwrap();
        client.put("http://x", Some(options), None).unwrap();
        let sent_options = client.transport().options();
        let sent = &sent_options[0];
        assert_eq!(Method::PUT, sent.method());
        assert_eq!(Some("text/plain"), sent.headers().get("Accept").map(|s| s.as_str()));
        assert_eq!(Some(&b"payload"[..]), sent.body());
    }

    #[test]
    fn test_cache_first_empty_store_fetches_and_saves_json() {
        let cache = CacheStore::new();
        let client = client(
            MockTransport::new(vec![ok_response(r#"{"id": 4}"#)]),
            &cache,
        );
        let custom = FetchOptions::new(CachePolicy::CacheFirst).with_handler(SuccessDataHandler::Json);
        let fetched = client.post("http://x", None, Some(custom)).unwrap();

        assert!(!fetched.is_cached());
        assert_eq!(r#"{"id": 4}"#, fetched.response().unwrap().text());
        assert_eq!(
            Some(Payload::Json(json!({"id": 4}))),
            cache.read(Method::POST, "http://x")
        );
        assert_eq!(1, *client.transport().run_count());

        // Same call again is served from the store.
        let fetched = client.post("http://x", None, Some(custom)).unwrap();
        assert_eq!(Fetched::Cached(Payload::Json(json!({"id": 4}))), fetched);
        assert_eq!(1, *client.transport().run_count());
    }

    #[test]
    fn test_cache_first_with_entry_does_not_call_network() {
        let cache = CacheStore::new();
        cache.save(Method::POST, "url-value", Payload::from("cache value"));
        let client = client(MockTransport::new(vec![]), &cache);
        let fetched = client
            .post("url-value", None, Some(FetchOptions::new(CachePolicy::CacheFirst)))
            .unwrap();
        assert_eq!(Fetched::Cached(Payload::from("cache value")), fetched);
        assert_eq!(0, *client.transport().run_count());
    }

    #[test]
    fn test_cache_first_keys_by_method() {
        let cache = CacheStore::new();
        cache.save(Method::GET, "http://x", Payload::from("get value"));
        let client = client(MockTransport::new(vec![ok_response("post value")]), &cache);
        let fetched = client
            .post("http://x", None, Some(FetchOptions::new(CachePolicy::CacheFirst)))
            .unwrap();
        assert!(!fetched.is_cached());
        assert_eq!(1, *client.transport().run_count());
        assert_eq!(
            Some(Payload::from("get value")),
            cache.read(Method::GET, "http://x")
        );
    }

    #[test]
    fn test_cache_first_empty_entry_counts_as_miss() {
        let cache = CacheStore::new();
        cache.save(Method::GET, "http://x", Payload::from(""));
        let client = client(MockTransport::new(vec![ok_response("fresh")]), &cache);
        let fetched = client
            .get("http://x", None, Some(FetchOptions::new(CachePolicy::CacheFirst)))
            .unwrap();
        assert!(!fetched.is_cached());
        assert_eq!(
            Some(Payload::from("fresh")),
            cache.read(Method::GET, "http://x")
        );
    }

    #[test]
    fn test_network_only_fetches_even_if_cached() {
        let cache = CacheStore::new();
        cache.save(Method::POST, "url-value", Payload::from("old"));
        let client = client(MockTransport::new(vec![ok_response("new")]), &cache);
        let fetched = client
            .post("url-value", None, Some(FetchOptions::new(CachePolicy::NetworkOnly)))
            .unwrap();
        assert!(!fetched.is_cached());
        assert_eq!(1, *client.transport().run_count());
        assert_eq!(
            Some(Payload::from("new")),
            cache.read(Method::POST, "url-value")
        );
    }

    #[test]
    fn test_no_cache_fetches_and_never_saves() {
        let cache = CacheStore::new();
        cache.save(Method::POST, "cached", Payload::from("old"));
        let client = client(
            MockTransport::new(vec![ok_response("new"), ok_response("new")]),
            &cache,
        );
        let custom = Some(FetchOptions::new(CachePolicy::NoCache));
        client.post("cached", None, custom).unwrap();
        client.post("not-cached", None, custom).unwrap();
        assert_eq!(2, *client.transport().run_count());
        assert_eq!(Some(Payload::from("old")), cache.read(Method::POST, "cached"));
        assert!(!cache.exists(Method::POST, "not-cached"));
    }

    #[test]
    fn test_cache_only_hit_and_miss_never_call_network() {
        let cache = CacheStore::new();
        cache.save(Method::GET, "hit", Payload::from("cached"));
        let client = client(MockTransport::new(vec![ok_response("unused")]), &cache);
        let custom = Some(FetchOptions::new(CachePolicy::CacheOnly));

        let fetched = client.get("hit", None, custom).unwrap();
        assert_eq!(Fetched::Cached(Payload::from("cached")), fetched);

        let err = client.get("miss", None, custom).unwrap_err();
        match err.downcast_ref::<FetchError>() {
            Some(FetchError::CacheMiss { method, url }) => {
                assert_eq!(Method::GET, *method);
                assert_eq!("miss", url);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(0, *client.transport().run_count());
    }

    #[test]
    fn test_failing_response_is_error_and_not_cached() {
        let cache = CacheStore::new();
        let failed = HttpResponse::builder()
            .status(500)
            .body("Internal Server Error")
            .build()
            .unwrap();
        let client = client(MockTransport::new(vec![failed.clone()]), &cache);
        let err = client
            .get("http://x", None, Some(FetchOptions::new(CachePolicy::CacheFirst)))
            .unwrap_err();
        assert_eq!(Some(&failed), crate::error::failed_response(&err));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_transport_error_propagates_without_cache_interaction() {
        let cache = CacheStore::new();
        let client = client(
            MockTransport::new(vec![]).with_error("Connection refused"),
            &cache,
        );
        let err = client.get("http://x", None, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FetchError>(),
            Some(FetchError::Transport(msg)) if msg.contains("Connection refused")
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_parse_failure_leaves_store_unchanged() {
        let cache = CacheStore::new();
        let client = client(MockTransport::new(vec![ok_response("not json")]), &cache);
        let custom = FetchOptions::new(CachePolicy::NetworkOnly).with_handler(SuccessDataHandler::Json);
        let err = client.get("http://x", None, Some(custom)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FetchError>(),
            Some(FetchError::Parse(_))
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_blob_handler_keeps_content_type() {
        let cache = CacheStore::new();
        let response = HttpResponse::builder()
            .status(200)
            .header("Content-Type", "image/png")
            .body(vec![137, 80, 78, 71])
            .build()
            .unwrap();
        let client = client(MockTransport::new(vec![response]), &cache);
        let custom = FetchOptions::new(CachePolicy::NetworkOnly).with_handler(SuccessDataHandler::Blob);
        client.get("http://x/logo.png", None, Some(custom)).unwrap();
        assert_eq!(
            Some(Payload::Blob(Blob {
                content_type: Some("image/png".to_string()),
                data: vec![137, 80, 78, 71],
            })),
            cache.read(Method::GET, "http://x/logo.png")
        );
    }

    #[test]
    fn test_configured_defaults_are_applied() {
        let cache = CacheStore::new();
        cache.save(Method::GET, "http://x", Payload::Json(json!([1, 2])));
        let mut headers = Headers::new();
        headers.set("Accept", "application/json");
        headers.set("X-Client", "fetchcache");
        let config = ConfigMock::default()
            .with_policy(CachePolicy::CacheFirst)
            .with_handler(SuccessDataHandler::Json)
            .with_headers(headers);
        let client = Client::new(
            MockTransport::new(vec![ok_response(r#"{"ok": true}"#)]),
            &cache,
            Arc::new(config),
        );

        // Default policy is cache-first, so the cached entry is served.
        let fetched = client.get("http://x", None, None).unwrap();
        assert_eq!(Fetched::Cached(Payload::Json(json!([1, 2]))), fetched);

        // Caller headers win over configured ones.
        let options = RequestOptions::builder()
            .header("accept", "text/plain")
            .build()
            .unwrap();
        client.get("http://y", Some(options), None).unwrap();
        let sent_options = client.transport().options();
        let sent = &sent_options[0];
        assert_eq!("text/plain", sent.headers().get("accept").unwrap());
        assert_eq!("fetchcache", sent.headers().get("x-client").unwrap());
        assert_eq!(
            Some(Payload::Json(json!({"ok": true}))),
            cache.read(Method::GET, "http://y")
        );
    }

    #[test]
    fn test_entry_points_use_their_method() {
        let cache = CacheStore::new();
        let responses = (0..Method::ALL.len()).map(|_| ok_response("v")).collect();
        let client = client(MockTransport::new(responses), &cache);
        let url = "http://hello.world";
        client.get(url, None, None).unwrap();
        client.head(url, None, None).unwrap();
        client.post(url, None, None).unwrap();
        client.connect(url, None, None).unwrap();
        client.trace(url, None, None).unwrap();
        client.track(url, None, None).unwrap();
        client.delete(url, None, None).unwrap();
        client.options(url, None, None).unwrap();
        client.put(url, None, None).unwrap();
        let methods: Vec<Method> = client
            .transport()
            .options()
            .iter()
            .map(|options| options.method())
            .collect();
        assert_eq!(Method::ALL.to_vec(), methods);
        for method in Method::ALL {
            assert!(cache.exists(method, url));
        }
    }

    #[test]
    fn test_with_json_sets_body_and_content_type() {
        let options = RequestOptions::default()
            .with_json(&json!({"title": "new"}))
            .unwrap();
        assert_eq!(
            Some("application/json"),
            options.headers().get("Content-Type").map(|s| s.as_str())
        );
        assert_eq!(Some(&br#"{"title":"new"}"#[..]), options.body());
    }

    #[test]
    fn test_headers_extend_overrides() {
        let mut base = Headers::new();
        base.set("Accept", "*/*");
        base.set("User-Agent", "a");
        let mut other = Headers::new();
        other.set("accept", "application/json");
        base.extend(&other);
        assert_eq!(2, base.len());
        assert_eq!("application/json", base.get("ACCEPT").unwrap());
    }

    #[test]
    fn test_headers_store_lowercased_names() {
        let mut headers = Headers::new();
        headers.set("Content-Type", "text/plain");
        let names: Vec<&str> = headers.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(vec!["content-type"], names);
        assert_eq!("text/plain", headers.get("CONTENT-TYPE").unwrap());
    }
}
