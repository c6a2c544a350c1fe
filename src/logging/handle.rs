use tracing_appender::non_blocking::WorkerGuard;

/// Handle для управления lifecycle логирования.
///
/// Держит guard файлового вывода: пока handle жив, фоновый писатель
/// сбрасывает события в файл.
pub struct LoggingHandle {
    file_guard: Option<WorkerGuard>,
}

impl LoggingHandle {
    pub fn new(file_guard: Option<WorkerGuard>) -> Self {
        Self { file_guard }
    }

    pub fn has_file_sink(&self) -> bool {
        self.file_guard.is_some()
    }

    /// Сбрасывает буферы файлового вывода и завершает фоновый писатель.
    pub fn shutdown(mut self) {
        if let Some(guard) = self.file_guard.take() {
            tracing::debug!("flushing file log sink");
            drop(guard);
        }
    }
}
