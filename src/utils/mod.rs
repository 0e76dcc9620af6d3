pub mod build_info;
pub mod persistence;

use std::{env, path::PathBuf, sync::Once};

use dirs::home_dir;

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIR_NAME: &str = ".spend_tracker";

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = "spend_tracker=info".parse() {
            filter = filter.add_directive(directive);
        }

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

/// Returns the application data directory, defaulting to `~/.spend_tracker`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("SPEND_TRACKER_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}
