use std::net::SocketAddr;

/// Errors that can occur while setting up the device or the TCP stream.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open or allocate the tunnel device.
    #[error("failed to open tunnel device {name:?}: {source}")]
    DeviceOpen {
        name: String,
        source: std::io::Error,
    },

    /// Failed to configure an already open tunnel device.
    #[error("failed to configure tunnel device {name}: {source}")]
    DeviceConfig {
        name: String,
        source: std::io::Error,
    },

    /// The interface name does not fit the kernel's name field.
    #[error("interface name too long ({len} bytes, max {max}): {name}")]
    InterfaceNameTooLong { name: String, len: usize, max: usize },

    /// The requested MTU would let the device produce units that cannot be framed.
    #[error("mtu {mtu} out of range (max {max} for this device mode)")]
    MtuOutOfRange { mtu: u32, max: u32 },

    /// Failed to resolve the peer address.
    #[error("failed to resolve {host}:{port}: {source}")]
    Resolve {
        host: String,
        port: u16,
        source: std::io::Error,
    },

    /// Failed to bind to the specified address.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Failed to connect to the specified address.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Failed to accept an incoming connection.
    #[error("failed to accept connection: {0}")]
    Accept(std::io::Error),

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// The underlying I/O error, if this error wraps one.
    pub fn io_source(&self) -> Option<&std::io::Error> {
        match self {
            TransportError::DeviceOpen { source, .. }
            | TransportError::DeviceConfig { source, .. }
            | TransportError::Resolve { source, .. }
            | TransportError::Bind { source, .. }
            | TransportError::Connect { source, .. } => Some(source),
            TransportError::Accept(source) | TransportError::Io(source) => Some(source),
            TransportError::InterfaceNameTooLong { .. } | TransportError::MtuOutOfRange { .. } => {
                None
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
