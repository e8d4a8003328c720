use std::io;
use std::os::fd::{AsRawFd, BorrowedFd};

/// Conditions that make a handle worth servicing. Error and hang-up states are
/// included so the following read surfaces them instead of the wait spinning.
const READY_MASK: libc::c_short = libc::POLLIN | libc::POLLHUP | libc::POLLERR | libc::POLLNVAL;

/// Which of the watched descriptors are ready.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Readiness {
    pub device: bool,
    pub stream: bool,
    pub shutdown: bool,
}

/// Block until at least one descriptor is readable. No timeout.
///
/// `EINTR` is returned to the caller as `ErrorKind::Interrupted`.
pub(crate) fn wait_readable(
    device: BorrowedFd<'_>,
    stream: BorrowedFd<'_>,
    shutdown: BorrowedFd<'_>,
) -> io::Result<Readiness> {
    let mut fds = [device, stream, shutdown].map(|fd| libc::pollfd {
        fd: fd.as_raw_fd(),
        events: libc::POLLIN,
        revents: 0,
    });

    // SAFETY: `fds` is a valid, initialized array of `pollfd` whose length is
    // passed alongside it; the borrowed descriptors outlive the call.
    let rc = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, -1) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }

    let ready = |pfd: &libc::pollfd| pfd.revents & READY_MASK != 0;
    Ok(Readiness {
        device: ready(&fds[0]),
        stream: ready(&fds[1]),
        shutdown: ready(&fds[2]),
    })
}
