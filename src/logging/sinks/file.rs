use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling::daily};
use tracing_subscriber::{fmt, layer::Layer as LayerTrait, registry::LookupSpan};

use crate::logging::{config::LoggingConfig, LoggingError};

/// Файловый layer с ежедневной ротацией и неблокирующей записью.
///
/// `WorkerGuard` нужно держать живым, пока требуется запись в файл.
pub fn layer_with_config<S>(
    config: &LoggingConfig
) -> Result<(Box<dyn LayerTrait<S> + Send + Sync>, WorkerGuard), LoggingError>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    config.ensure_log_dir()?;

    let file_appender = daily(&config.log_dir, &config.file_name);
    let (writer, guard) = non_blocking(file_appender);

    let layer = fmt::layer()
        .with_ansi(false)
        .with_target(config.with_target)
        .with_writer(writer)
        .boxed();

    Ok((layer, guard))
}
