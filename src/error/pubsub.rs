use thiserror::Error;
use tokio::sync::broadcast;

/// Ошибка при получении сообщений из подписки брокера.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecvError {
    #[error("channel is closed")]
    Closed,

    #[error("receiver lagged behind by {0} messages")]
    Lagged(u64),
}

// === Преобразования ===

impl From<broadcast::error::RecvError> for RecvError {
    fn from(err: broadcast::error::RecvError) -> Self {
        match err {
            broadcast::error::RecvError::Closed => RecvError::Closed,
            broadcast::error::RecvError::Lagged(n) => RecvError::Lagged(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recv_error_display() {
        assert_eq!(RecvError::Closed.to_string(), "channel is closed");
        assert_eq!(
            RecvError::Lagged(10).to_string(),
            "receiver lagged behind by 10 messages"
        );
    }

    #[test]
    fn test_broadcast_conversion() {
        let converted: RecvError = broadcast::error::RecvError::Lagged(3).into();
        assert_eq!(converted, RecvError::Lagged(3));
    }
}
