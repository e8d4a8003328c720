use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{encode_into, LENGTH_PREFIX_SIZE, MAX_PACKET_SIZE};
use crate::error::{FrameError, Result};

/// Writes complete frames to any `Write` stream.
///
/// A frame is always written out in full before `write_packet` returns, so the
/// bytes of two frames never interleave on the wire.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: Write> FrameWriter<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(LENGTH_PREFIX_SIZE + MAX_PACKET_SIZE),
        }
    }

    /// Frame `packet` and write the whole frame (blocking).
    ///
    /// Short writes are continued and interrupted writes retried until every
    /// byte is out; any other error aborts the frame.
    pub fn write_packet(&mut self, packet: &[u8]) -> Result<()> {
        write_frame(&mut self.inner, &mut self.buf, packet)
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        flush(&mut self.inner)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

/// Frame `packet` into `scratch` and write the whole frame to `writer`.
///
/// For callers that cannot hand ownership of the stream to a [`FrameWriter`],
/// e.g. because a [`FrameReader`](crate::FrameReader) already owns it.
pub fn write_frame<W: Write + ?Sized>(
    writer: &mut W,
    scratch: &mut BytesMut,
    packet: &[u8],
) -> Result<()> {
    scratch.clear();
    encode_into(packet, scratch)?;

    write_all(writer, scratch)?;
    flush(writer)
}

fn flush<W: Write + ?Sized>(writer: &mut W) -> Result<()> {
    loop {
        match writer.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
}

fn write_all<W: Write + ?Sized>(writer: &mut W, bytes: &[u8]) -> Result<()> {
    let mut offset = 0usize;
    while offset < bytes.len() {
        match writer.write(&bytes[offset..]) {
            Ok(0) => {
                return Err(FrameError::Io(std::io::Error::new(
                    ErrorKind::WriteZero,
                    "stream accepted no bytes",
                )))
            }
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    Ok(())
}
