use std::io::{ErrorKind, Read, Write};
use std::os::fd::AsFd;

use bytes::BytesMut;
use tcptun_frame::{write_frame, FrameError, FrameReader, LENGTH_PREFIX_SIZE};
use tracing::{debug, info, warn};

use crate::config::RelayConfig;
use crate::error::{Direction, Handle, RelayError, Result};
use crate::poll::wait_readable;
use crate::shutdown::ShutdownSignal;
use crate::stats::{RelayOutcome, RelayStats, TerminationReason};

/// A handle the relay can wait on, read from and write to.
///
/// Both the device and the stream are driven through this one capability, so
/// the loop itself does not care which is which. What differs is the contract
/// the caller guarantees: one device read is one whole packet, while stream
/// reads may be arbitrarily short.
pub trait RelayHandle: Read + Write + AsFd {}

impl<T: Read + Write + AsFd> RelayHandle for T {}

/// One linked tunnel: a device, a stream, and the loop that moves packets
/// between them.
///
/// The session exclusively owns both handles; they are closed when [`run`]
/// returns, whatever the outcome.
///
/// [`run`]: RelaySession::run
pub struct RelaySession<D, S> {
    device: D,
    stream: FrameReader<S>,
    config: RelayConfig,
    shutdown: ShutdownSignal,
    packet_buf: Vec<u8>,
    frame_buf: BytesMut,
    stats: RelayStats,
}

impl<D: RelayHandle, S: RelayHandle> RelaySession<D, S> {
    /// Create a session with its own shutdown signal.
    pub fn new(device: D, stream: S, config: RelayConfig) -> Result<Self> {
        Self::with_shutdown(device, stream, config, ShutdownSignal::new()?)
    }

    /// Create a session observing an existing shutdown signal.
    pub fn with_shutdown(
        device: D,
        stream: S,
        config: RelayConfig,
        shutdown: ShutdownSignal,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            device,
            stream: FrameReader::new(stream),
            packet_buf: vec![0u8; config.max_packet_size],
            frame_buf: BytesMut::with_capacity(LENGTH_PREFIX_SIZE + config.max_packet_size),
            config,
            shutdown,
            stats: RelayStats::default(),
        })
    }

    /// Handle for requesting shutdown from another thread.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Counters so far.
    pub fn stats(&self) -> RelayStats {
        self.stats
    }

    /// Relay until the peer disconnects, shutdown is requested, or a transfer
    /// fails.
    ///
    /// Each iteration blocks until the device, the stream or the shutdown signal
    /// is readable, then performs at most one whole transfer per ready handle.
    /// Shutdown is only observed between iterations, never inside a transfer.
    pub fn run(mut self) -> Result<RelayOutcome> {
        info!("relay session started");

        let result = self.run_loop();
        match &result {
            Ok(reason) => info!(
                %reason,
                device_to_stream = self.stats.device_to_stream,
                stream_to_device = self.stats.stream_to_device,
                "relay session finished"
            ),
            Err(err) => warn!(
                error = %err,
                device_to_stream = self.stats.device_to_stream,
                stream_to_device = self.stats.stream_to_device,
                "relay session failed"
            ),
        }

        result.map(|reason| RelayOutcome {
            reason,
            stats: self.stats,
        })
    }

    fn run_loop(&mut self) -> Result<TerminationReason> {
        loop {
            if self.shutdown.is_triggered() {
                return Ok(TerminationReason::Shutdown);
            }

            let ready = match wait_readable(
                self.device.as_fd(),
                self.stream.get_ref().as_fd(),
                self.shutdown.wake_fd(),
            ) {
                Ok(ready) => ready,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(RelayError::Wait(err)),
            };

            if ready.device {
                self.device_to_stream()?;
            }

            if ready.stream {
                if let Some(reason) = self.stream_to_device()? {
                    return Ok(reason);
                }
            }
        }
    }

    /// Move one packet from the device to the stream.
    fn device_to_stream(&mut self) -> Result<()> {
        let direction = Direction::DeviceToStream;

        let n = loop {
            match self.device.read(&mut self.packet_buf) {
                Ok(n) => break n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(RelayError::transfer(direction, Handle::Device, err)),
            }
        };

        write_frame(
            self.stream.get_mut(),
            &mut self.frame_buf,
            &self.packet_buf[..n],
        )
        .map_err(|err| RelayError::transfer(direction, Handle::Stream, err))?;

        self.stats.record_device_to_stream(n);
        if self.config.debug_packets {
            debug!(
                seq = self.stats.device_to_stream,
                bytes = n,
                "device -> stream"
            );
        }
        Ok(())
    }

    /// Move one frame from the stream to the device.
    ///
    /// Returns the termination reason when the stream has ended.
    fn stream_to_device(&mut self) -> Result<Option<TerminationReason>> {
        let direction = Direction::StreamToDevice;

        let packet = match self.stream.read_frame() {
            Ok(packet) => packet,
            Err(FrameError::ConnectionClosed) => {
                debug!("peer closed stream");
                return Ok(Some(TerminationReason::PeerClosed));
            }
            Err(FrameError::Truncated { expected, received }) => {
                debug!(expected, received, "peer closed stream mid-frame");
                return Ok(Some(TerminationReason::PeerClosedMidFrame));
            }
            Err(err) => return Err(RelayError::transfer(direction, Handle::Stream, err)),
        };

        let written = loop {
            match self.device.write(&packet) {
                Ok(n) => break n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(RelayError::transfer(direction, Handle::Device, err)),
            }
        };
        if written != packet.len() {
            return Err(RelayError::ShortDeviceWrite {
                written,
                expected: packet.len(),
            });
        }

        self.stats.record_stream_to_device(packet.len());
        if self.config.debug_packets {
            debug!(
                seq = self.stats.stream_to_device,
                bytes = packet.len(),
                "stream -> device"
            );
        }
        Ok(None)
    }
}
