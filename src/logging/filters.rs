use tracing_subscriber::EnvFilter;

use crate::logging::config::LoggingConfig;

/// Фильтр событий: `RUST_LOG`, если задан, иначе уровень из конфигурации.
pub fn build_filter_from_config(config: &LoggingConfig) -> EnvFilter {
    match EnvFilter::try_from_default_env() {
        Ok(env_filter) => env_filter,
        Err(_) => match EnvFilter::try_new(&config.level) {
            Ok(filter) => filter,
            Err(e) => {
                eprintln!(
                    "Invalid log filter directive from config ('{}'): {}; falling back to 'info'",
                    config.level, e
                );
                EnvFilter::new("info")
            }
        },
    }
}
