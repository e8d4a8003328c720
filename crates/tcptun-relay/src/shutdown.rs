use std::io::Write;
use std::os::fd::{AsFd, BorrowedFd};
use std::os::unix::net::UnixStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{RelayError, Result};

/// Cooperative shutdown request for a relay session.
///
/// Cloning yields another handle to the same signal. `trigger` sets a flag that
/// the relay checks at the top of every iteration and writes to a self-pipe so
/// a readiness wait blocked with no traffic wakes up to see it.
#[derive(Clone, Debug)]
pub struct ShutdownSignal {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    requested: AtomicBool,
    wake_tx: UnixStream,
    wake_rx: UnixStream,
}

impl ShutdownSignal {
    pub fn new() -> Result<Self> {
        let (wake_tx, wake_rx) = UnixStream::pair().map_err(RelayError::Signal)?;
        // A full pipe already guarantees a pending wake-up; never block the caller.
        wake_tx.set_nonblocking(true).map_err(RelayError::Signal)?;

        Ok(Self {
            inner: Arc::new(Inner {
                requested: AtomicBool::new(false),
                wake_tx,
                wake_rx,
            }),
        })
    }

    /// Request shutdown. Safe to call from any thread, any number of times.
    pub fn trigger(&self) {
        self.inner.requested.store(true, Ordering::SeqCst);
        let _ = (&self.inner.wake_tx).write(&[1]);
    }

    pub fn is_triggered(&self) -> bool {
        self.inner.requested.load(Ordering::SeqCst)
    }

    /// Descriptor that becomes readable once the signal has been triggered.
    pub(crate) fn wake_fd(&self) -> BorrowedFd<'_> {
        self.inner.wake_rx.as_fd()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_untriggered() {
        let signal = ShutdownSignal::new().unwrap();
        assert!(!signal.is_triggered());
    }

    #[test]
    fn trigger_is_visible_through_clones() {
        let signal = ShutdownSignal::new().unwrap();
        let remote = signal.clone();

        remote.trigger();
        remote.trigger();

        assert!(signal.is_triggered());
    }

    #[test]
    fn trigger_makes_wake_fd_readable() {
        let signal = ShutdownSignal::new().unwrap();
        signal.trigger();

        let mut probe = [0u8; 1];
        let n = std::io::Read::read(&mut &signal.inner.wake_rx, &mut probe).unwrap();
        assert_eq!(n, 1);
    }
}
