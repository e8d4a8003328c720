//! Length-prefixed packet framing for tcptun.
//!
//! Every packet read from the tunnel device travels over the TCP stream as:
//! - a 2-byte big-endian payload length
//! - exactly that many payload bytes
//!
//! No partial reads or partial frames reach user code: [`FrameReader`] only
//! returns whole packets and [`FrameWriter`] only returns once a whole frame is
//! on the wire.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub mod tokio_codec;

pub use codec::{
    decode_frame, decode_length, encode, encode_into, LENGTH_PREFIX_SIZE, MAX_PACKET_SIZE,
};
pub use error::{FrameError, Result};
pub use reader::{read_until_full, Fill, FrameReader};
pub use writer::{write_frame, FrameWriter};

#[cfg(feature = "async")]
pub use tokio_codec::TunnelCodec;
