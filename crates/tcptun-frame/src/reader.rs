use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::codec::{decode_length, LENGTH_PREFIX_SIZE, MAX_PACKET_SIZE};
use crate::error::{FrameError, Result};

/// Result of [`read_until_full`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// The buffer was filled completely.
    Complete,
    /// The stream ended after `received` bytes, before the buffer was full.
    Closed { received: usize },
}

/// Fill `buf` from `reader`, tolerating short reads.
///
/// Keeps issuing single reads into the unfilled remainder until the buffer is
/// full or a read returns 0. Interrupted reads are retried; every other error is
/// returned as is.
pub fn read_until_full<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
) -> std::io::Result<Fill> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Ok(Fill::Closed { received: filled }),
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(Fill::Complete)
}

/// Reads complete frames from any `Read` stream.
///
/// Handles partial reads internally; callers always get whole packets. A frame
/// is never surfaced until its last payload byte has arrived.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: Read> FrameReader<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(MAX_PACKET_SIZE),
        }
    }

    /// Read the next frame and return its payload (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when the stream ends before
    /// any byte of a length prefix, and `Err(FrameError::Truncated)` when it
    /// ends anywhere inside a frame.
    pub fn read_frame(&mut self) -> Result<Bytes> {
        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        match read_until_full(&mut self.inner, &mut prefix)? {
            Fill::Complete => {}
            Fill::Closed { received: 0 } => return Err(FrameError::ConnectionClosed),
            Fill::Closed { received } => {
                trace!(received, "stream closed inside length prefix");
                return Err(FrameError::Truncated {
                    expected: LENGTH_PREFIX_SIZE,
                    received,
                });
            }
        }

        let len = decode_length(prefix) as usize;
        self.buf.clear();
        self.buf.resize(len, 0);

        match read_until_full(&mut self.inner, &mut self.buf[..])? {
            Fill::Complete => Ok(self.buf.split_to(len).freeze()),
            Fill::Closed { received } => {
                trace!(expected = len, received, "stream closed inside payload");
                Err(FrameError::Truncated {
                    expected: LENGTH_PREFIX_SIZE + len,
                    received: LENGTH_PREFIX_SIZE + received,
                })
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::codec::encode;

    #[test]
    fn read_single_frame() {
        let wire = encode(b"hello").unwrap();

        let mut reader = FrameReader::new(Cursor::new(wire.to_vec()));
        let packet = reader.read_frame().unwrap();

        assert_eq!(packet.as_ref(), b"hello");
    }

    #[test]
    fn read_frames_in_order() {
        let mut wire = Vec::new();
        for packet in [&b"A"[..], b"BB", b"CCC"] {
            wire.extend_from_slice(&encode(packet).unwrap());
        }

        let mut reader = FrameReader::new(Cursor::new(wire));

        assert_eq!(reader.read_frame().unwrap().as_ref(), b"A");
        assert_eq!(reader.read_frame().unwrap().as_ref(), b"BB");
        assert_eq!(reader.read_frame().unwrap().as_ref(), b"CCC");
        assert!(matches!(
            reader.read_frame().unwrap_err(),
            FrameError::ConnectionClosed
        ));
    }

    #[test]
    fn read_zero_length_frame() {
        let mut reader = FrameReader::new(Cursor::new(vec![0x00, 0x00]));
        let packet = reader.read_frame().unwrap();
        assert!(packet.is_empty());
    }

    #[test]
    fn read_maximum_size_frame() {
        let payload = vec![0xAB; MAX_PACKET_SIZE];
        let wire = encode(&payload).unwrap();

        let mut reader = FrameReader::new(Cursor::new(wire.to_vec()));
        let packet = reader.read_frame().unwrap();

        assert_eq!(packet.as_ref(), payload.as_slice());
    }

    #[test]
    fn partial_read_handling() {
        let payload: Vec<u8> = (0..=255u8).collect();
        let wire = encode(&payload).unwrap();

        let byte_reader = ByteByByteReader {
            bytes: wire.to_vec(),
            pos: 0,
        };
        let mut reader = FrameReader::new(byte_reader);

        let packet = reader.read_frame().unwrap();
        assert_eq!(packet.as_ref(), payload.as_slice());
    }

    #[test]
    fn fragmented_and_whole_delivery_agree() {
        let payload = b"fragmented payload".to_vec();
        let wire = encode(&payload).unwrap().to_vec();

        let whole = FrameReader::new(Cursor::new(wire.clone()))
            .read_frame()
            .unwrap();

        for chunk in [1usize, 2, 3, 7] {
            let mut reader = FrameReader::new(ChunkedReader {
                bytes: wire.clone(),
                pos: 0,
                chunk,
            });
            assert_eq!(reader.read_frame().unwrap(), whole);
        }
    }

    #[test]
    fn connection_closed_cleanly() {
        let mut reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
        assert!(err.is_closed());
    }

    #[test]
    fn connection_closed_inside_prefix() {
        let mut reader = FrameReader::new(Cursor::new(vec![0x00]));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(
            err,
            FrameError::Truncated {
                expected: 2,
                received: 1
            }
        ));
    }

    #[test]
    fn connection_closed_mid_payload() {
        let mut partial = vec![0x00, 0x10];
        partial.extend_from_slice(b"only-part");

        let mut reader = FrameReader::new(Cursor::new(partial));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(
            err,
            FrameError::Truncated {
                expected: 18,
                received: 11
            }
        ));
        assert!(err.is_closed());
    }

    #[test]
    fn would_block_is_an_error() {
        let reader = FailFirstThenData {
            kind: ErrorKind::WouldBlock,
            failed: false,
            bytes: encode(b"ok").unwrap().to_vec(),
            pos: 0,
        };
        let mut framed = FrameReader::new(reader);
        let err = framed.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::WouldBlock));
    }

    #[test]
    fn interrupted_read_retries() {
        let reader = FailFirstThenData {
            kind: ErrorKind::Interrupted,
            failed: false,
            bytes: encode(b"ok").unwrap().to_vec(),
            pos: 0,
        };
        let mut framed = FrameReader::new(reader);
        let packet = framed.read_frame().unwrap();
        assert_eq!(packet.as_ref(), b"ok");
    }

    #[test]
    fn read_until_full_reports_received_count() {
        let mut src = Cursor::new(vec![1u8, 2, 3]);
        let mut buf = [0u8; 5];
        let fill = read_until_full(&mut src, &mut buf).unwrap();
        assert_eq!(fill, Fill::Closed { received: 3 });
        assert_eq!(&buf[..3], &[1, 2, 3]);
    }

    #[test]
    fn read_until_full_empty_target_is_complete() {
        let mut src = Cursor::new(Vec::<u8>::new());
        let fill = read_until_full(&mut src, &mut []).unwrap();
        assert_eq!(fill, Fill::Complete);
    }

    #[test]
    fn roundtrip_over_socket_pair() {
        use std::io::Write;

        let (mut left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut reader = FrameReader::new(right);

        left.write_all(&encode(b"ping").unwrap()).unwrap();
        let packet = reader.read_frame().unwrap();

        assert_eq!(packet.as_ref(), b"ping");
    }

    #[test]
    fn accessors_and_into_inner() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut reader = FrameReader::new(cursor);

        let _ = reader.get_ref();
        let _ = reader.get_mut();
        let _inner = reader.into_inner();
    }

    #[derive(Debug)]
    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }

            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct ChunkedReader {
        bytes: Vec<u8>,
        pos: usize,
        chunk: usize,
    }

    impl Read for ChunkedReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = self
                .chunk
                .min(buf.len())
                .min(self.bytes.len() - self.pos);
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    struct FailFirstThenData {
        kind: ErrorKind,
        failed: bool,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for FailFirstThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.failed {
                self.failed = true;
                return Err(std::io::Error::from(self.kind));
            }
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            let remaining = self.bytes.len() - self.pos;
            let n = remaining.min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }
}
