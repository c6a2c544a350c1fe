use thiserror::Error;

use super::TransportError;
use crate::spout::LifecycleState;

pub type SpoutResult<T> = Result<T, SpoutError>;

/// Ошибки моста между подпиской и опрашивающим потребителем.
#[derive(Debug, Error)]
pub enum SpoutError {
    // ==== Subscription Worker ====
    #[error("failed to acquire connection: {0}")]
    ConnectionAcquisition(#[source] TransportError),

    #[error("subscription failed: {0}")]
    Subscription(#[source] TransportError),

    #[error("subscription worker panicked: {0}")]
    WorkerPanicked(String),

    // ==== Lifecycle ====
    #[error("invalid lifecycle transition: expected {expected}, found {actual}")]
    InvalidState {
        expected: LifecycleState,
        actual: LifecycleState,
    },

    #[error("spout is not running (state: {0})")]
    NotRunning(LifecycleState),

    #[error("no tokio runtime available to spawn the subscription worker")]
    NoRuntime,

    // ==== Configuration ====
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_spout_error_display() {
        let err = SpoutError::ConnectionAcquisition(TransportError::PoolExhausted { max: 1 });
        assert_eq!(
            err.to_string(),
            "failed to acquire connection: connection pool exhausted (1 connections in use)"
        );

        let err = SpoutError::NotRunning(LifecycleState::Stopped);
        assert_eq!(err.to_string(), "spout is not running (state: STOPPED)");
    }

    #[test]
    fn test_transport_error_is_source() {
        let err = SpoutError::Subscription(TransportError::Rejected("ACL".into()));
        let source = err.source().expect("source must be preserved");
        assert_eq!(source.to_string(), "subscription rejected by transport: ACL");
    }
}
