use std::{path::Path, time::Duration};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::{LoggingConfig, SpoutError, SpoutResult};

/// Префикс переменных окружения, например `LOGSPOUT_IDLE_INTERVAL_MS`.
pub const ENV_PREFIX: &str = "LOGSPOUT";

/// Конфигурация моста.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpoutConfig {
    /// Корень имён каналов, шаблон подписки: `channel_root + "*"`.
    pub channel_root: String,
    /// Явный шаблон подписки вместо `channel_root + "*"`.
    pub pattern: Option<String>,
    /// Простой потребителя при пустой очереди.
    pub idle_interval_ms: u64,
    pub logging: LoggingConfig,
}

impl Default for SpoutConfig {
    fn default() -> Self {
        Self {
            channel_root: "log.".to_string(),
            pattern: None,
            idle_interval_ms: 100,
            logging: LoggingConfig::default(),
        }
    }
}

impl SpoutConfig {
    /// Значения по умолчанию, переопределённые переменными окружения
    /// `LOGSPOUT_*` (вложенные ключи через `__`).
    pub fn load() -> SpoutResult<Self> {
        Self::build(None)
    }

    /// Как [`SpoutConfig::load`], но сначала читает файл (toml/yaml/json по
    /// расширению). Переменные окружения имеют приоритет над файлом.
    pub fn load_from_file(path: impl AsRef<Path>) -> SpoutResult<Self> {
        Self::build(Some(path.as_ref()))
    }

    fn build(file: Option<&Path>) -> SpoutResult<Self> {
        let mut builder =
            Config::builder().add_source(Config::try_from(&SpoutConfig::default())?);
        if let Some(path) = file {
            builder = builder.add_source(File::from(path));
        }
        let cfg = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: SpoutConfig = cfg.try_deserialize()?;
        settings.subscription_pattern()?;
        Ok(settings)
    }

    /// Итоговый шаблон подписки.
    pub fn subscription_pattern(&self) -> SpoutResult<String> {
        let pattern = match &self.pattern {
            Some(pattern) => pattern.clone(),
            None => format!("{}*", self.channel_root),
        };
        if pattern.trim().is_empty() {
            return Err(SpoutError::InvalidConfig(
                "subscription pattern must not be empty".to_string(),
            ));
        }
        Ok(pattern)
    }

    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }
}
