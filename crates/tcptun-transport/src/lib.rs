//! Device and stream setup for tcptun.
//!
//! Provides the two handles the relay engine moves data between:
//! - a TUN/TAP device (Linux), where one read or write is one packet
//! - a connected TCP stream, obtained by listening or connecting per [`Role`]
//!
//! This is the lowest layer of tcptun. The relay only sees these handles through
//! `Read + Write + AsFd`.

pub mod error;
pub mod stream;
pub mod tcp;

#[cfg(target_os = "linux")]
pub mod tun;

pub use error::{Result, TransportError};
pub use stream::TunnelStream;
pub use tcp::{establish, resolve, Role, TcpEndpoint, DEFAULT_PORT};

#[cfg(target_os = "linux")]
pub use tun::{DeviceMode, TunDevice};
