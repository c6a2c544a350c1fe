use thiserror::Error;

/// Ошибки транспортного уровня pub/sub: пул соединений и подписка.
///
/// Ядро не повторяет операции при этих ошибках: политика повторов
/// принадлежит внешнему владельцу жизненного цикла.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection pool exhausted ({max} connections in use)")]
    PoolExhausted { max: usize },

    #[error("transport unreachable: {0}")]
    Unreachable(String),

    #[error("invalid glob pattern for subscription: {0}")]
    InvalidPattern(String),

    #[error("subscription rejected by transport: {0}")]
    Rejected(String),

    #[error("transport channel is closed")]
    Closed,
}

impl From<globset::Error> for TransportError {
    fn from(err: globset::Error) -> Self {
        TransportError::InvalidPattern(err.to_string())
    }
}
