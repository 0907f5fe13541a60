//! Reading raw input bytes with a timeout.
//!
//! Bytes are handed back exactly as the device delivered them. Decoding
//! keys or escape sequences is left to the caller.

use nix::errno::Errno;
use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
use rustix::termios::isatty;
use std::os::fd::AsFd;
use std::time::Duration;

use crate::error::{DeviceError, Operation};

/// Whether `fd` refers to a terminal device.
#[must_use]
pub fn is_terminal(fd: impl AsFd) -> bool {
    isatty(fd)
}

/// Waits up to `timeout` for `fd` to become readable, then reads once.
///
/// `None` waits indefinitely. Returns the number of bytes read, which is 0
/// when the wait timed out, was interrupted by a signal, or the read would
/// have blocked. A 0 is also what end of file looks like.
///
/// # Errors
///
/// Returns [`DeviceError`] if polling or reading fails for any other reason.
pub fn read_timeout(
    fd: impl AsFd,
    buf: &mut [u8],
    timeout: Option<Duration>,
) -> Result<usize, DeviceError> {
    let fd = fd.as_fd();
    let timeout = match timeout {
        None => PollTimeout::NONE,
        Some(duration) => PollTimeout::try_from(duration).unwrap_or(PollTimeout::MAX),
    };

    let mut fds = [PollFd::new(fd, PollFlags::POLLIN)];
    match poll(&mut fds, timeout) {
        Ok(0) | Err(Errno::EINTR) => return Ok(0),
        Ok(_) => {}
        Err(e) => return Err(DeviceError::new(Operation::Poll, e)),
    }

    match rustix::io::read(fd, buf) {
        Ok(n) => Ok(n),
        Err(e) if e == rustix::io::Errno::AGAIN || e == rustix::io::Errno::INTR => Ok(0),
        Err(e) => Err(DeviceError::from_rustix(Operation::Read, e)),
    }
}
