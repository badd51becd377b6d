pub mod cache;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod display;
pub mod error;
pub mod http;
pub mod io;
pub mod logging;
pub mod method;
pub mod payload;
pub mod policy;
pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate derive_builder;

pub use cache::{Cache, CacheStore};
pub use http::{Client, FetchOptions, Fetched, RequestOptions};
pub use method::Method;
pub use payload::{Payload, SuccessDataHandler};
pub use policy::CachePolicy;
