//! `tokio_util::codec` adapter for the tunnel wire format.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_frame, encode_into, LENGTH_PREFIX_SIZE};
use crate::error::{FrameError, Result};

/// Length-prefixed packet codec.
///
/// Decoding yields packet payloads; end of input with a partial frame buffered
/// is reported as [`FrameError::Truncated`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TunnelCodec;

impl TunnelCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for TunnelCodec {
    type Item = Bytes;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        Ok(decode_frame(src))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        if let Some(packet) = decode_frame(src) {
            return Ok(Some(packet));
        }
        if src.is_empty() {
            return Ok(None);
        }

        let expected = if src.len() < LENGTH_PREFIX_SIZE {
            LENGTH_PREFIX_SIZE
        } else {
            LENGTH_PREFIX_SIZE + u16::from_be_bytes([src[0], src[1]]) as usize
        };
        Err(FrameError::Truncated {
            expected,
            received: src.len(),
        })
    }
}

impl Encoder<&[u8]> for TunnelCodec {
    type Error = FrameError;

    fn encode(&mut self, packet: &[u8], dst: &mut BytesMut) -> Result<()> {
        encode_into(packet, dst)
    }
}

impl Encoder<Bytes> for TunnelCodec {
    type Error = FrameError;

    fn encode(&mut self, packet: Bytes, dst: &mut BytesMut) -> Result<()> {
        encode_into(&packet, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_matches_wire_scenario() {
        let mut codec = TunnelCodec::new();
        let mut dst = BytesMut::new();

        codec.encode(&[0x01u8, 0x02, 0x03][..], &mut dst).unwrap();

        assert_eq!(dst.as_ref(), &[0x00, 0x03, 0x01, 0x02, 0x03]);
    }

    #[test]
    fn decode_waits_for_complete_frame() {
        let mut codec = TunnelCodec::new();
        let mut src = BytesMut::new();

        src.extend_from_slice(&[0x00]);
        assert!(codec.decode(&mut src).unwrap().is_none());
        src.extend_from_slice(&[0x02, 0xAA]);
        assert!(codec.decode(&mut src).unwrap().is_none());
        src.extend_from_slice(&[0xBB]);

        let packet = codec.decode(&mut src).unwrap().unwrap();
        assert_eq!(packet.as_ref(), &[0xAA, 0xBB]);
        assert!(src.is_empty());
    }

    #[test]
    fn decode_eof_on_empty_buffer_is_clean() {
        let mut codec = TunnelCodec::new();
        let mut src = BytesMut::new();
        assert!(codec.decode_eof(&mut src).unwrap().is_none());
    }

    #[test]
    fn decode_eof_with_partial_frame_is_truncated() {
        let mut codec = TunnelCodec::new();
        let mut src = BytesMut::from(&[0x00, 0x04, 0x01][..]);

        let err = codec.decode_eof(&mut src).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Truncated {
                expected: 6,
                received: 3
            }
        ));
    }

    #[test]
    fn bytes_encoder_rejects_oversized_packet() {
        let mut codec = TunnelCodec::new();
        let mut dst = BytesMut::new();
        let packet = Bytes::from(vec![0u8; 70_000]);

        let err = codec.encode(packet, &mut dst).unwrap_err();
        assert!(matches!(err, FrameError::PacketTooLarge { .. }));
    }
}
