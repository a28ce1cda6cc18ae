//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize logging with a default filter (e.g. `"info"`, `"render_core=debug"`)
///
/// `RUST_LOG` still takes precedence when set. Calling this twice is harmless; the
/// second initialisation attempt is ignored.
pub fn init_with_level(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already initialised, keeping existing configuration");
    }
}

/// Route log output through the test harness capture
#[cfg(test)]
pub fn init_for_tests() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Trace)
        .try_init();
}
