// The library never installs a logger. The `fc` binary wires up env_logger
// when running verbose.

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => (
        {
            ::log::info!(target: "fetchcache", $($arg)*);
        }
    );
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => (
        {
            ::log::debug!(target: "fetchcache", $($arg)*);
        }
    );
}
