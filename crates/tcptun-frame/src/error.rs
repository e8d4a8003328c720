/// Errors that can occur while framing packets onto the stream or reading them back.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The packet cannot be represented by the 16-bit length prefix.
    #[error("packet too large ({size} bytes, max {max})")]
    PacketTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the stream cleanly, before any byte of a length prefix.
    #[error("connection closed")]
    ConnectionClosed,

    /// The peer closed the stream part-way through a frame.
    #[error("connection closed mid-frame ({received} of {expected} bytes)")]
    Truncated { expected: usize, received: usize },
}

impl FrameError {
    /// True when the stream simply ended, cleanly or mid-frame.
    ///
    /// Both cases end a relay session normally rather than as a failure.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            FrameError::ConnectionClosed | FrameError::Truncated { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
