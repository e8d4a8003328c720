use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: a single big-endian `u16` payload length.
pub const LENGTH_PREFIX_SIZE: usize = 2;

/// Largest packet the length prefix can describe.
pub const MAX_PACKET_SIZE: usize = u16::MAX as usize;

/// Encode one packet into a standalone frame.
///
/// Wire format:
/// ```text
/// ┌───────────────┬──────────────────┐
/// │ Length (2B BE)│ Payload           │
/// │               │ (Length bytes)    │
/// └───────────────┴──────────────────┘
/// ```
///
/// There is no magic, version or checksum; integrity and ordering come from the
/// underlying stream.
pub fn encode(packet: &[u8]) -> Result<Bytes> {
    let mut dst = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + packet.len());
    encode_into(packet, &mut dst)?;
    Ok(dst.freeze())
}

/// Append the frame for `packet` to `dst`.
///
/// `dst` is left untouched if the packet is too large.
pub fn encode_into(packet: &[u8], dst: &mut BytesMut) -> Result<()> {
    if packet.len() > MAX_PACKET_SIZE {
        return Err(FrameError::PacketTooLarge {
            size: packet.len(),
            max: MAX_PACKET_SIZE,
        });
    }
    dst.reserve(LENGTH_PREFIX_SIZE + packet.len());
    dst.put_u16(packet.len() as u16);
    dst.put_slice(packet);
    Ok(())
}

/// Interpret a length prefix. Every value is valid.
pub fn decode_length(prefix: [u8; LENGTH_PREFIX_SIZE]) -> u16 {
    u16::from_be_bytes(prefix)
}

/// Decode one frame from an accumulation buffer.
///
/// Returns `None` until the buffer holds a complete frame; a complete frame is
/// consumed from the buffer and its payload returned.
pub fn decode_frame(src: &mut BytesMut) -> Option<Bytes> {
    if src.len() < LENGTH_PREFIX_SIZE {
        return None;
    }

    let len = decode_length([src[0], src[1]]) as usize;
    if src.len() < LENGTH_PREFIX_SIZE + len {
        src.reserve(LENGTH_PREFIX_SIZE + len - src.len());
        return None;
    }

    src.advance(LENGTH_PREFIX_SIZE);
    Some(src.split_to(len).freeze())
}
