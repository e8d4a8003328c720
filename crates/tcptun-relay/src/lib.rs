//! Packet relay between a tunnel device and a framed byte stream.
//!
//! [`RelaySession`] is a single-threaded loop: it waits until the device, the
//! stream or its [`ShutdownSignal`] is readable, then moves at most one whole
//! packet per ready handle. Device packets are framed onto the stream with
//! `tcptun-frame`; frames read from the stream are written to the device as
//! individual packets.
//!
//! The session ends cleanly when the peer closes the stream (between or inside
//! a frame) or shutdown is requested, and with a [`RelayError`] on any other
//! I/O failure.
//!
//! With the `async` feature, [`relay_async`] offers the same semantics on top
//! of tokio.

#[cfg(feature = "async")]
mod async_relay;
mod config;
mod error;
mod poll;
mod session;
mod shutdown;
mod stats;

#[cfg(feature = "async")]
pub use async_relay::relay_async;
pub use config::RelayConfig;
pub use error::{Direction, Handle, RelayError, Result};
pub use session::{RelayHandle, RelaySession};
pub use shutdown::ShutdownSignal;
pub use stats::{RelayOutcome, RelayStats, TerminationReason};

#[cfg(feature = "async")]
pub use tokio_util::sync::CancellationToken;
