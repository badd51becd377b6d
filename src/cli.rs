use std::path::PathBuf;

use clap::Parser;

use crate::{
    error,
    http::{FetchOptions, RequestOptions},
    method::Method,
    payload::SuccessDataHandler,
    policy::CachePolicy,
    Result,
};

#[derive(Parser)]
#[command(
    name = "fc",
    version,
    about = "Fetch URLs through a policy driven response cache",
    long_about = "Fetch URLs through a policy driven response cache. URLs are \
                  dispatched in order and share one in-memory cache for the \
                  lifetime of the process, so repeating a URL under the \
                  cache-first policy is served from the cache."
)]
struct Args {
    /// URLs to fetch, in order
    #[clap(required = true)]
    pub urls: Vec<String>,
    /// HTTP method
    #[clap(long, short = 'X', default_value = "GET")]
    pub method: Method,
    /// Cache policy: cache-first, cache-only, network-only or no-cache.
    /// Defaults to the configured policy.
    #[clap(long, short)]
    pub policy: Option<CachePolicy>,
    /// How response bodies are parsed before caching: text, json,
    /// arrayBuffer or blob. Defaults to the configured handler.
    #[clap(long)]
    pub handler: Option<SuccessDataHandler>,
    /// Request header as 'Name: value'. Can be repeated
    #[clap(long = "header", short = 'H')]
    pub headers: Vec<String>,
    /// Request body
    #[clap(long, short)]
    pub data: Option<String>,
    /// Path to the TOML config file
    #[clap(long, short)]
    pub config: Option<PathBuf>,
    /// Print the whole cache store as JSON once all URLs are fetched
    #[clap(long)]
    pub dump_cache: bool,
    /// Verbose mode. Logs cache decisions and requests
    #[clap(long, short)]
    pub verbose: bool,
}

pub struct CliArgs {
    pub urls: Vec<String>,
    pub method: Method,
    pub request: RequestOptions,
    pub fetch: FetchOptions,
    pub config: Option<PathBuf>,
    pub dump_cache: bool,
    pub verbose: bool,
}

impl CliArgs {
    fn from_args(args: Args) -> Result<Self> {
        let mut request = RequestOptions::default();
        for header in &args.headers {
            let (key, value) = parse_header(header)?;
            request.set_header(key, value);
        }
        if let Some(data) = args.data {
            request = RequestOptions::builder()
                .headers(request.headers().clone())
                .body(data)
                .build()?;
        }
        Ok(CliArgs {
            urls: args.urls,
            method: args.method,
            request,
            fetch: FetchOptions {
                cache_policy: args.policy,
                success_data_handler: args.handler,
            },
            config: args.config,
            dump_cache: args.dump_cache,
            verbose: args.verbose,
        })
    }
}

/// Splits a `Name: value` header argument.
fn parse_header(header: &str) -> Result<(&str, &str)> {
    match header.split_once(':') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value.trim())),
        _ => Err(error::gen(format!(
            "Invalid header '{header}', expected 'Name: value'"
        ))),
    }
}

pub fn parse_cli() -> Result<CliArgs> {
    CliArgs::from_args(Args::parse())
}
