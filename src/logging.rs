use env_logger::{Builder, Env};

/// Initializes the global logger.
///
/// Filtering is controlled via `RUST_LOG`; the default is `warn` so
/// stderr stays quiet under the alternate screen unless asked.
///
/// `try_init` only fails if a logger was already set.  Ignore that
/// case so tests can call `init` multiple times without panicking.
pub fn init() {
    let env = Env::default().default_filter_or("warn");
    let _ = Builder::from_env(env).try_init();
}
