use tcptun_frame::FrameError;

/// Direction of a transfer through the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Packet read from the device, framed onto the stream.
    DeviceToStream,
    /// Frame read from the stream, written to the device.
    StreamToDevice,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::DeviceToStream => f.write_str("device->stream"),
            Direction::StreamToDevice => f.write_str("stream->device"),
        }
    }
}

/// Which of the two handles an operation was performed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    Device,
    Stream,
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Handle::Device => f.write_str("device"),
            Handle::Stream => f.write_str("stream"),
        }
    }
}

/// Errors that end a relay session abnormally.
///
/// A clean or mid-frame peer disconnect is not an error; see
/// [`TerminationReason`](crate::TerminationReason).
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The session was configured with values it cannot honor.
    #[error("invalid relay config: {0}")]
    InvalidConfig(String),

    /// Waiting for readiness failed for a reason other than interruption.
    #[error("readiness wait failed: {0}")]
    Wait(std::io::Error),

    /// A read or write on one of the handles failed.
    #[error("{direction} transfer failed on {handle}: {source}")]
    Transfer {
        direction: Direction,
        handle: Handle,
        #[source]
        source: FrameError,
    },

    /// The device accepted only part of a packet.
    #[error("short device write ({written} of {expected} bytes)")]
    ShortDeviceWrite { written: usize, expected: usize },

    /// The shutdown signal could not be created.
    #[error("shutdown signal setup failed: {0}")]
    Signal(std::io::Error),
}

impl RelayError {
    pub(crate) fn transfer(
        direction: Direction,
        handle: Handle,
        source: impl Into<FrameError>,
    ) -> Self {
        RelayError::Transfer {
            direction,
            handle,
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
