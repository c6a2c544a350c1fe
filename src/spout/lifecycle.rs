use std::fmt;

/// Состояние жизненного цикла моста.
///
/// `UNINITIALIZED → STARTING → RUNNING → STOPPING → STOPPED`. Состояние
/// `STOPPED` терминально: повторное открытие не поддерживается.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Uninitialized,
    Starting,
    Running,
    Stopping,
    Stopped,
}

impl LifecycleState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "UNINITIALIZED",
            Self::Starting => "STARTING",
            Self::Running => "RUNNING",
            Self::Stopping => "STOPPING",
            Self::Stopped => "STOPPED",
        }
    }

    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
