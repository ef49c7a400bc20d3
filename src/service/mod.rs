//! C11 — network service: UDP discovery and TCP decoder, thread-per-
//! connection, modeled on the teacher's `socket_service::SocketService`.

pub mod decoder;
pub mod discovery;

pub use decoder::DecoderListener;
pub use discovery::DiscoveryResponder;
