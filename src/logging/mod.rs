pub mod config;
mod filters;
mod formatter;
pub mod handle;
pub mod sinks;

pub use config::{LogFormat, LoggingConfig};
pub use handle::LoggingHandle;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    layer::{Layer as LayerTrait, SubscriberExt},
    registry::Registry,
    util::{SubscriberInitExt, TryInitError},
};

/// Ошибки инициализации логирования.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter directive: {0}")]
    InvalidLevel(String),

    #[error("failed to prepare log directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("global subscriber already set: {0}")]
    Init(#[from] TryInitError),
}

type BoxedLayer = Box<dyn LayerTrait<Registry> + Send + Sync>;

/// Собирает subscriber без установки его глобальным.
pub fn build_subscriber(
    config: &LoggingConfig
) -> Result<(impl tracing::Subscriber + Send + Sync + 'static, Option<WorkerGuard>), LoggingError> {
    config.validate()?;

    let mut layers: Vec<BoxedLayer> = vec![sinks::console::layer_with_config(config)];
    let file_guard = if config.file_enabled {
        let (file_layer, guard) = sinks::file::layer_with_config(config)?;
        layers.push(file_layer);
        Some(guard)
    } else {
        None
    };

    let subscriber = tracing_subscriber::registry()
        .with(layers)
        .with(filters::build_filter_from_config(config));

    Ok((subscriber, file_guard))
}

/// Инициализация логирования с конфигурацией.
pub fn init_logging(config: LoggingConfig) -> Result<LoggingHandle, LoggingError> {
    let (subscriber, file_guard) = build_subscriber(&config)?;
    subscriber.try_init()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_level = %config.level,
        format = ?config.format,
        file_enabled = config.file_enabled,
        "Logging system initialized"
    );

    Ok(LoggingHandle::new(file_guard))
}
