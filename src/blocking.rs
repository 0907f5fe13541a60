//! Non-blocking toggling of file descriptors.

use nix::fcntl::{FcntlArg, OFlag, fcntl};
use std::os::fd::{AsFd, AsRawFd};
use tracing::trace;

use crate::error::{DeviceError, Operation};

fn status_flags(fd: impl AsFd) -> Result<OFlag, DeviceError> {
    let flags = fcntl(fd, FcntlArg::F_GETFL)
        .map_err(|e| DeviceError::new(Operation::ReadStatusFlags, e))?;
    Ok(OFlag::from_bits_retain(flags))
}

/// Sets or clears `O_NONBLOCK` on `fd`.
///
/// Every other status bit is written back exactly as it was read.
///
/// # Errors
///
/// Returns [`DeviceError`] if the status flags cannot be read or written.
pub fn set_nonblocking(fd: impl AsFd, enable: bool) -> Result<(), DeviceError> {
    let fd = fd.as_fd();
    let flags = status_flags(fd)?;

    let mut new_flags = flags;
    new_flags.set(OFlag::O_NONBLOCK, enable);

    fcntl(fd, FcntlArg::F_SETFL(new_flags))
        .map_err(|e| DeviceError::new(Operation::WriteStatusFlags, e))?;
    trace!("fd {} nonblocking={enable}", fd.as_raw_fd());
    Ok(())
}

/// Whether `O_NONBLOCK` is set on `fd`.
///
/// # Errors
///
/// Returns [`DeviceError`] if the status flags cannot be read.
pub fn is_nonblocking(fd: impl AsFd) -> Result<bool, DeviceError> {
    Ok(status_flags(fd)?.contains(OFlag::O_NONBLOCK))
}
