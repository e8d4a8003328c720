use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::TunnelStream;

/// Default TCP port shared by both sides of the tunnel.
pub const DEFAULT_PORT: u16 = 55555;

/// Which side of the TCP handshake this process plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Bind, listen and accept exactly one peer.
    Listener,
    /// Actively connect to a listening peer.
    Connector,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Listener => "listener",
            Role::Connector => "connector",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// TCP endpoint for the listening side.
///
/// Only the first accepted connection is of interest to the tunnel; the listener
/// is dropped once the peer is linked.
pub struct TcpEndpoint {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TcpEndpoint {
    /// Bind and listen on `addr`.
    ///
    /// The standard library enables `SO_REUSEADDR` on Unix listeners, so a
    /// restarted server does not trip over sockets lingering in `TIME_WAIT`.
    pub fn listen(addr: SocketAddr) -> Result<Self> {
        let listener =
            TcpListener::bind(addr).map_err(|source| TransportError::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;

        info!(%local_addr, "listening for tunnel peer");

        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Listen on all IPv4 interfaces at `port`.
    pub fn listen_any(port: u16) -> Result<Self> {
        Self::listen(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<(TunnelStream, SocketAddr)> {
        let (stream, peer) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(%peer, "accepted connection");
        let stream = TunnelStream::from_tcp(stream);
        stream.set_nodelay(true)?;
        Ok((stream, peer))
    }

    /// Connect to a listening peer (blocking).
    pub fn connect(addr: SocketAddr) -> Result<TunnelStream> {
        let stream =
            TcpStream::connect(addr).map_err(|source| TransportError::Connect { addr, source })?;
        debug!(%addr, "connected to tunnel peer");
        let stream = TunnelStream::from_tcp(stream);
        stream.set_nodelay(true)?;
        Ok(stream)
    }

    /// The address this endpoint is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        "tcp"
    }
}

/// Resolve `host` and `port` to the first matching socket address.
pub fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    let resolve_err = |source| TransportError::Resolve {
        host: host.to_string(),
        port,
        source,
    };

    (host, port)
        .to_socket_addrs()
        .map_err(resolve_err)?
        .next()
        .ok_or_else(|| {
            resolve_err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no addresses found",
            ))
        })
}

/// Obtain the connected stream for `role`.
///
/// As [`Role::Listener`], `addr` is the local bind address and the call blocks
/// until one peer connects. As [`Role::Connector`], `addr` is the peer.
pub fn establish(role: Role, addr: SocketAddr) -> Result<TunnelStream> {
    match role {
        Role::Listener => {
            let endpoint = TcpEndpoint::listen(addr)?;
            let (stream, peer) = endpoint.accept()?;
            info!(%peer, "peer connected");
            Ok(stream)
        }
        Role::Connector => {
            let stream = TcpEndpoint::connect(addr)?;
            info!(peer = %addr, "connected to peer");
            Ok(stream)
        }
    }
}
