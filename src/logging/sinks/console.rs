use tracing_subscriber::{layer::Layer as LayerTrait, registry::LookupSpan};

use crate::logging::{config::LoggingConfig, formatter};

/// Console layer с конфигурацией.
pub fn layer_with_config<S>(config: &LoggingConfig) -> Box<dyn LayerTrait<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    formatter::build_formatter_from_config(config)
}

#[cfg(test)]
mod tests {
    use tracing::info;
    use tracing_subscriber::{prelude::*, registry::Registry};

    use super::*;
    use crate::logging::config::LogFormat;

    /// Тест проверяет, что layer строится и логирует без паники для каждого
    /// формата.
    #[test]
    fn test_layer_with_config_all_formats() {
        for format in [LogFormat::Compact, LogFormat::Pretty, LogFormat::Json] {
            let cfg = LoggingConfig {
                format,
                with_ansi: false,
                ..Default::default()
            };
            let subscriber = Registry::default().with(layer_with_config::<Registry>(&cfg));

            tracing::subscriber::with_default(subscriber, || {
                info!(?format, "console layer smoke test");
            });
        }
    }
}
