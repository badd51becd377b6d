use ureq::Agent;

use crate::config::ConfigProperties;
use crate::error::FetchError;
use crate::http::{Headers, RequestOptions};
use crate::io::{HttpResponse, Transport};
use crate::{log_debug, Result};

/// Blocking transport backed by a ureq `Agent`. Connections are pooled by
/// the agent across requests.
pub struct NetworkTransport {
    agent: Agent,
}

impl NetworkTransport {
    pub fn new(config: &dyn ConfigProperties) -> Self {
        let agent: Agent = Agent::config_builder()
            // 4xx/5xx come back as responses; the dispatcher decides what a
            // failure is.
            .http_status_as_error(false)
            // TRACK is not a registered method.
            .allow_non_standard_methods(true)
            .user_agent(config.user_agent())
            .timeout_global(config.timeout())
            .build()
            .into();
        NetworkTransport { agent }
    }

    fn request(&self, url: &str, options: &RequestOptions) -> ureq::http::request::Builder {
        let builder = ureq::http::Request::builder()
            .method(options.method().as_str())
            .uri(url);
        options
            .headers()
            .iter()
            .fold(builder, |req, (key, value)| req.header(key.as_str(), value.as_str()))
    }
}

impl Transport for NetworkTransport {
    fn send(&self, url: &str, options: &RequestOptions) -> Result<HttpResponse> {
        let builder = self.request(url, options);
        log_debug!("Sending {} {}", options.method(), url);
        let result = match options.body() {
            Some(body) => {
                let request = builder
                    .body(body.to_vec())
                    .map_err(|err| FetchError::Transport(format!("{url}: {err}")))?;
                self.agent.run(request)
            }
            None => {
                let request = builder
                    .body(())
                    .map_err(|err| FetchError::Transport(format!("{url}: {err}")))?;
                self.agent.run(request)
            }
        };
        match result {
            Ok(mut response) => {
                let status = response.status().as_u16();
                // Grab headers before the body is drained.
                let headers =
                    response
                        .headers()
                        .iter()
                        .fold(Headers::new(), |mut headers, (name, value)| {
                            headers.set(name.as_str(), value.to_str().unwrap_or_default());
                            headers
                        });
                // No size cap on bodies; ureq defaults to 10 MiB.
                let body = response
                    .body_mut()
                    .with_config()
                    .limit(u64::MAX)
                    .read_to_vec()
                    .map_err(|err| FetchError::Transport(format!("{url}: {err}")))?;
                let response = HttpResponse::builder()
                    .status(status)
                    .headers(headers)
                    .body(body)
                    .build()?;
                Ok(response)
            }
            Err(err) => Err(FetchError::Transport(format!("{url}: {err}")).into()),
        }
    }
}
