/// Per-direction transfer counters for one session.
///
/// Observability only; counts never influence relay behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Packets read from the device and written to the stream.
    pub device_to_stream: u64,
    /// Packets read from the stream and written to the device.
    pub stream_to_device: u64,
    /// Payload bytes moved device -> stream (length prefixes excluded).
    pub bytes_device_to_stream: u64,
    /// Payload bytes moved stream -> device.
    pub bytes_stream_to_device: u64,
}

impl RelayStats {
    pub fn record_device_to_stream(&mut self, size: usize) {
        self.device_to_stream += 1;
        self.bytes_device_to_stream += size as u64;
    }

    pub fn record_stream_to_device(&mut self, size: usize) {
        self.stream_to_device += 1;
        self.bytes_stream_to_device += size as u64;
    }
}

/// Why a session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// The peer closed the stream between frames.
    PeerClosed,
    /// The peer closed the stream part-way through a frame; the partial frame
    /// was discarded.
    PeerClosedMidFrame,
    /// The device handle reported end of input (async relay only).
    DeviceClosed,
    /// Shutdown was requested through the session's shutdown signal.
    Shutdown,
}

impl TerminationReason {
    pub fn as_str(self) -> &'static str {
        match self {
            TerminationReason::PeerClosed => "peer_closed",
            TerminationReason::PeerClosedMidFrame => "peer_closed_mid_frame",
            TerminationReason::DeviceClosed => "device_closed",
            TerminationReason::Shutdown => "shutdown",
        }
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a finished session reports to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayOutcome {
    pub reason: TerminationReason,
    pub stats: RelayStats,
}
