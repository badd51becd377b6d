// User agent sent on every request unless the config overrides it.
pub const DEFAULT_USER_AGENT: &str = concat!("fetchcache/", env!("CARGO_PKG_VERSION"));

// Config file location relative to $HOME, read by the `fc` binary when no
// --config is given.
pub const CONFIG_PATH: &str = ".config/fetchcache/config.toml";
