//! Config file parsing and validation.

use crate::defaults::DEFAULT_USER_AGENT;
use crate::error::{AddContext, FetchError};
use crate::http::Headers;
use crate::payload::SuccessDataHandler;
use crate::policy::CachePolicy;
use crate::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Defaults the dispatcher falls back to when a request does not say
/// otherwise.
pub trait ConfigProperties: Send + Sync {
    fn default_cache_policy(&self) -> CachePolicy {
        CachePolicy::default()
    }
    fn default_success_data_handler(&self) -> SuccessDataHandler {
        SuccessDataHandler::default()
    }
    /// Headers sent with every request. Request headers take precedence.
    fn default_headers(&self) -> Option<&Headers> {
        None
    }
    fn user_agent(&self) -> &str {
        DEFAULT_USER_AGENT
    }
    fn timeout(&self) -> Option<Duration> {
        None
    }
}

#[derive(Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    defaults: DefaultsSection,
    #[serde(default)]
    headers: HashMap<String, String>,
}

#[derive(Default, Deserialize)]
struct DefaultsSection {
    cache_policy: Option<String>,
    success_data_handler: Option<String>,
    user_agent: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct Config {
    cache_policy: CachePolicy,
    success_data_handler: SuccessDataHandler,
    headers: Headers,
    user_agent: String,
    timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cache_policy: CachePolicy::default(),
            success_data_handler: SuccessDataHandler::default(),
            headers: Headers::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }
}

impl Config {
    /// Reads a TOML config. Every key is optional:
    ///
    /// ```toml
    /// [defaults]
    /// cache_policy = "cache-first"
    /// success_data_handler = "json"
    /// user_agent = "my-app/1.0"
    /// timeout_seconds = 30
    ///
    /// [headers]
    /// accept = "application/json"
    /// ```
    pub fn new<T: Read>(mut reader: T) -> Result<Self> {
        let mut config_data = String::new();
        reader.read_to_string(&mut config_data)?;
        let file: ConfigFile = toml::from_str(&config_data)
            .map_err(|err| FetchError::Configuration(err.to_string()))?;

        let defaults = file.defaults;
        let cache_policy = match defaults.cache_policy {
            Some(policy) => policy
                .parse::<CachePolicy>()
                .map_err(|err: FetchError| FetchError::Configuration(err.to_string()))?,
            None => CachePolicy::default(),
        };
        let success_data_handler = match defaults.success_data_handler {
            Some(handler) => handler
                .parse::<SuccessDataHandler>()
                .map_err(|err: FetchError| FetchError::Configuration(err.to_string()))?,
            None => SuccessDataHandler::default(),
        };
        let headers = file
            .headers
            .iter()
            .fold(Headers::new(), |mut headers, (key, value)| {
                headers.set(key, value.as_str());
                headers
            });
        let timeout = match defaults.timeout_seconds {
            Some(0) => {
                return Err(FetchError::Configuration(
                    "timeout_seconds must be greater than 0".to_string(),
                )
                .into())
            }
            Some(seconds) => Some(Duration::from_secs(seconds)),
            None => None,
        };

        Ok(Config {
            cache_policy,
            success_data_handler,
            headers,
            user_agent: defaults
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            timeout,
        })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .err_context(format!("Unable to open config file {}", path.display()))?;
        Config::new(file)
    }
}

impl ConfigProperties for Config {
    fn default_cache_policy(&self) -> CachePolicy {
        self.cache_policy
    }

    fn default_success_data_handler(&self) -> SuccessDataHandler {
        self.success_data_handler
    }

    fn default_headers(&self) -> Option<&Headers> {
        if self.headers.is_empty() {
            return None;
        }
        Some(&self.headers)
    }

    fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}
