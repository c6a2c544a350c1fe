pub mod pubsub;
pub mod spout;
pub mod transport;

// Публичный экспорт всех типов ошибок, чтобы упростить доступ к ним
// из внешнего кода.
pub use pubsub::RecvError;
pub use spout::{SpoutError, SpoutResult};
pub use transport::TransportError;
