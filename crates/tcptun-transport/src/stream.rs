use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, RawFd};

use crate::error::Result;

/// A connected, reliable byte stream to the remote peer (`Read + Write + AsFd`).
///
/// In production this wraps the TCP connection. A Unix stream variant exists so
/// the same type can be driven over a local socket pair.
pub struct TunnelStream {
    inner: TunnelStreamInner,
}

enum TunnelStreamInner {
    Tcp(TcpStream),
    Unix(std::os::unix::net::UnixStream),
}

impl Read for TunnelStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            TunnelStreamInner::Tcp(stream) => stream.read(buf),
            TunnelStreamInner::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for TunnelStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            TunnelStreamInner::Tcp(stream) => stream.write(buf),
            TunnelStreamInner::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            TunnelStreamInner::Tcp(stream) => stream.flush(),
            TunnelStreamInner::Unix(stream) => stream.flush(),
        }
    }
}

impl AsFd for TunnelStream {
    fn as_fd(&self) -> BorrowedFd<'_> {
        match &self.inner {
            TunnelStreamInner::Tcp(stream) => stream.as_fd(),
            TunnelStreamInner::Unix(stream) => stream.as_fd(),
        }
    }
}

impl AsRawFd for TunnelStream {
    fn as_raw_fd(&self) -> RawFd {
        self.as_fd().as_raw_fd()
    }
}

impl From<TcpStream> for TunnelStream {
    fn from(stream: TcpStream) -> Self {
        Self::from_tcp(stream)
    }
}

impl From<std::os::unix::net::UnixStream> for TunnelStream {
    fn from(stream: std::os::unix::net::UnixStream) -> Self {
        Self::from_unix(stream)
    }
}

impl TunnelStream {
    /// Wrap a connected TCP stream.
    pub fn from_tcp(stream: TcpStream) -> Self {
        Self {
            inner: TunnelStreamInner::Tcp(stream),
        }
    }

    /// Wrap a connected Unix stream.
    pub fn from_unix(stream: std::os::unix::net::UnixStream) -> Self {
        Self {
            inner: TunnelStreamInner::Unix(stream),
        }
    }

    /// Disable Nagle's algorithm so single frames are not held back.
    ///
    /// No-op for non-TCP streams.
    pub fn set_nodelay(&self, nodelay: bool) -> Result<()> {
        match &self.inner {
            TunnelStreamInner::Tcp(stream) => stream.set_nodelay(nodelay).map_err(Into::into),
            TunnelStreamInner::Unix(_) => Ok(()),
        }
    }

    /// Address of the remote peer, if the stream is a TCP connection.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        match &self.inner {
            TunnelStreamInner::Tcp(stream) => stream.peer_addr().ok(),
            TunnelStreamInner::Unix(_) => None,
        }
    }

    /// Try to clone this stream (creates a new file descriptor).
    pub fn try_clone(&self) -> Result<Self> {
        match &self.inner {
            TunnelStreamInner::Tcp(stream) => Ok(Self::from_tcp(stream.try_clone()?)),
            TunnelStreamInner::Unix(stream) => Ok(Self::from_unix(stream.try_clone()?)),
        }
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        match &self.inner {
            TunnelStreamInner::Tcp(_) => "tcp",
            TunnelStreamInner::Unix(_) => "unix",
        }
    }
}

impl std::fmt::Debug for TunnelStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TunnelStream")
            .field("type", &self.transport_name())
            .field("peer", &self.peer_addr())
            .finish()
    }
}
