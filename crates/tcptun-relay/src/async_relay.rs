//! Task-based relay for callers that already run a tokio runtime.
//!
//! Each direction is its own future. Cancellation is only observed while a
//! direction is idle, so a frame that has started to move is always finished.

use bytes::BytesMut;
use tcptun_frame::{FrameError, TunnelCodec, LENGTH_PREFIX_SIZE};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{Decoder, Encoder};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::RelayConfig;
use crate::error::{Direction, Handle, RelayError, Result};
use crate::stats::{RelayOutcome, RelayStats, TerminationReason};

/// Relay packets between `device` and `stream` until either side ends or
/// `cancel` fires.
///
/// `device` must yield exactly one packet per read. When one direction ends
/// the other is cancelled and awaited, so the outcome always carries both
/// directions' counters.
pub async fn relay_async<D, S>(
    device: D,
    stream: S,
    config: RelayConfig,
    cancel: CancellationToken,
) -> Result<RelayOutcome>
where
    D: AsyncRead + AsyncWrite + Unpin,
    S: AsyncRead + AsyncWrite + Unpin,
{
    config.validate()?;
    info!("async relay session started");

    let (device_rx, device_tx) = tokio::io::split(device);
    let (stream_rx, stream_tx) = tokio::io::split(stream);
    let session = cancel.child_token();

    let mut outbound = RelayStats::default();
    let mut inbound = RelayStats::default();

    let (out_result, in_result) = tokio::join!(
        async {
            let result =
                device_to_stream(device_rx, stream_tx, &config, &session, &mut outbound).await;
            session.cancel();
            result
        },
        async {
            let result =
                stream_to_device(stream_rx, device_tx, &config, &session, &mut inbound).await;
            session.cancel();
            result
        },
    );

    let stats = RelayStats {
        device_to_stream: outbound.device_to_stream,
        bytes_device_to_stream: outbound.bytes_device_to_stream,
        stream_to_device: inbound.stream_to_device,
        bytes_stream_to_device: inbound.bytes_stream_to_device,
    };

    let reason = match (out_result, in_result) {
        (Err(err), _) | (_, Err(err)) => {
            warn!(
                error = %err,
                device_to_stream = stats.device_to_stream,
                stream_to_device = stats.stream_to_device,
                "async relay session failed"
            );
            return Err(err);
        }
        // The direction that finished on its own names the reason; the other
        // one merely observed the cancellation it triggered.
        (Ok(TerminationReason::Shutdown), Ok(reason)) => reason,
        (Ok(reason), _) => reason,
    };

    info!(
        %reason,
        device_to_stream = stats.device_to_stream,
        stream_to_device = stats.stream_to_device,
        "async relay session finished"
    );
    Ok(RelayOutcome { reason, stats })
}

async fn device_to_stream<R, W>(
    mut device: R,
    mut stream: W,
    config: &RelayConfig,
    cancel: &CancellationToken,
    stats: &mut RelayStats,
) -> Result<TerminationReason>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let direction = Direction::DeviceToStream;
    let mut codec = TunnelCodec::new();
    let mut packet = vec![0u8; config.max_packet_size];
    let mut frame = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + config.max_packet_size);

    loop {
        let n = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(TerminationReason::Shutdown),
            read = device.read(&mut packet) => {
                read.map_err(|err| RelayError::transfer(direction, Handle::Device, err))?
            }
        };
        if n == 0 {
            debug!("device reached end of input");
            return Ok(TerminationReason::DeviceClosed);
        }

        frame.clear();
        codec
            .encode(&packet[..n], &mut frame)
            .map_err(|err| RelayError::transfer(direction, Handle::Stream, err))?;
        stream
            .write_all(&frame)
            .await
            .map_err(|err| RelayError::transfer(direction, Handle::Stream, err))?;
        stream
            .flush()
            .await
            .map_err(|err| RelayError::transfer(direction, Handle::Stream, err))?;

        stats.record_device_to_stream(n);
        if config.debug_packets {
            debug!(seq = stats.device_to_stream, bytes = n, "device -> stream");
        }
    }
}

async fn stream_to_device<R, W>(
    mut stream: R,
    mut device: W,
    config: &RelayConfig,
    cancel: &CancellationToken,
    stats: &mut RelayStats,
) -> Result<TerminationReason>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let direction = Direction::StreamToDevice;
    let mut codec = TunnelCodec::new();
    let mut inbuf = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + config.max_packet_size);

    loop {
        let decoded = codec
            .decode(&mut inbuf)
            .map_err(|err| RelayError::transfer(direction, Handle::Stream, err))?;

        if let Some(packet) = decoded {
            let written = device
                .write(&packet)
                .await
                .map_err(|err| RelayError::transfer(direction, Handle::Device, err))?;
            if written != packet.len() {
                return Err(RelayError::ShortDeviceWrite {
                    written,
                    expected: packet.len(),
                });
            }
            device
                .flush()
                .await
                .map_err(|err| RelayError::transfer(direction, Handle::Device, err))?;

            stats.record_stream_to_device(packet.len());
            if config.debug_packets {
                debug!(
                    seq = stats.stream_to_device,
                    bytes = packet.len(),
                    "stream -> device"
                );
            }
            continue;
        }

        let read = if inbuf.is_empty() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(TerminationReason::Shutdown),
                read = stream.read_buf(&mut inbuf) => read,
            }
        } else {
            stream.read_buf(&mut inbuf).await
        };
        let n = read.map_err(|err| RelayError::transfer(direction, Handle::Stream, err))?;

        if n == 0 {
            return match codec.decode_eof(&mut inbuf) {
                Ok(_) => {
                    debug!("peer closed stream");
                    Ok(TerminationReason::PeerClosed)
                }
                Err(FrameError::Truncated { expected, received }) => {
                    debug!(expected, received, "peer closed stream mid-frame");
                    Ok(TerminationReason::PeerClosedMidFrame)
                }
                Err(err) => Err(RelayError::transfer(direction, Handle::Stream, err)),
            };
        }
    }
}
