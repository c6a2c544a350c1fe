use std::{fs, io, path::PathBuf};

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use super::LoggingError;

/// Формат вывода событий в консоль.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

/// Конфигурация логирования.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Директива фильтра (`info`, `logspout=debug,warn`, ...).
    /// `RUST_LOG` имеет приоритет.
    pub level: String,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub with_target: bool,
    pub with_thread_ids: bool,
    /// Дублировать события в файл с ежедневной ротацией.
    pub file_enabled: bool,
    pub log_dir: PathBuf,
    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            with_ansi: true,
            with_target: true,
            with_thread_ids: false,
            file_enabled: false,
            log_dir: PathBuf::from("logs"),
            file_name: "logspout.log".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Проверяет, что директива фильтра разбирается.
    pub fn validate(&self) -> Result<(), LoggingError> {
        EnvFilter::try_new(&self.level)
            .map(|_| ())
            .map_err(|e| LoggingError::InvalidLevel(format!("{}: {e}", self.level)))
    }

    /// Создаёт каталог логов, если файловый вывод включён.
    pub fn ensure_log_dir(&self) -> io::Result<()> {
        if self.file_enabled {
            fs::create_dir_all(&self.log_dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = LoggingConfig::default();

        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.format, LogFormat::Compact);
        assert!(!cfg.file_enabled);
    }

    #[test]
    fn test_invalid_level_rejected() {
        let cfg = LoggingConfig {
            level: "logspout=[".to_string(),
            ..Default::default()
        };

        assert!(matches!(cfg.validate(), Err(LoggingError::InvalidLevel(_))));
    }

    #[test]
    fn test_ensure_log_dir_only_when_enabled() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = LoggingConfig {
            log_dir: tmp.path().join("nested"),
            ..Default::default()
        };

        cfg.ensure_log_dir().unwrap();
        assert!(!cfg.log_dir.exists());

        cfg.file_enabled = true;
        cfg.ensure_log_dir().unwrap();
        assert!(cfg.log_dir.is_dir());
    }

    #[test]
    fn test_format_deserialize_lowercase() {
        let format: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, LogFormat::Json);
    }
}
