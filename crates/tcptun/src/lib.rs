//! Tunnel TUN/TAP traffic over a single TCP connection.
//!
//! tcptun links a local tunnel device to exactly one remote peer. Each packet the
//! device produces is sent over TCP with a 2-byte big-endian length prefix; each
//! frame received is written back to the device as one packet.
//!
//! # Crate Structure
//!
//! - [`transport`]: device and TCP stream setup
//! - [`frame`]: length-prefixed packet framing
//! - [`relay`]: the loop that moves packets between device and stream

/// Re-export transport types.
pub mod transport {
    pub use tcptun_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use tcptun_frame::*;
}

/// Re-export relay types.
pub mod relay {
    pub use tcptun_relay::*;
}
