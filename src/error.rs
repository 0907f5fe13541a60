//! Error type shared by every device operation.
//!
//! All failures are reported as a single [`DeviceError`] that records which
//! operation failed and the error code the operating system returned.

use nix::errno::Errno;
use std::fmt;
use std::io;

/// The device operation that produced a [`DeviceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Reading the terminal attribute record (`tcgetattr`).
    ReadAttributes,
    /// Applying a terminal attribute record (`tcsetattr`).
    WriteAttributes,
    /// Querying the character-cell geometry (`TIOCGWINSZ`).
    QueryWindowSize,
    /// Reading the descriptor status flags (`F_GETFL`).
    ReadStatusFlags,
    /// Writing the descriptor status flags (`F_SETFL`).
    WriteStatusFlags,
    /// Waiting for the descriptor to become readable.
    Poll,
    /// Reading bytes from the descriptor.
    Read,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ReadAttributes => "reading terminal attributes",
            Self::WriteAttributes => "applying terminal attributes",
            Self::QueryWindowSize => "querying window size",
            Self::ReadStatusFlags => "reading descriptor flags",
            Self::WriteStatusFlags => "writing descriptor flags",
            Self::Poll => "polling descriptor",
            Self::Read => "reading descriptor",
        })
    }
}

/// A terminal device operation failed.
///
/// Carries the underlying OS error code. Failures are never fatal to the
/// crate: calling the same operation again is always allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{operation} failed: {errno}")]
pub struct DeviceError {
    operation: Operation,
    errno: Errno,
}

impl DeviceError {
    /// Builds an error from an operation and an OS error code.
    #[must_use]
    pub fn new(operation: Operation, errno: Errno) -> Self {
        Self { operation, errno }
    }

    /// Builds an error from an [`io::Error`], keeping its raw OS code.
    ///
    /// Errors without an OS code map to [`Errno::UnknownErrno`].
    #[must_use]
    pub fn from_io(operation: Operation, err: &io::Error) -> Self {
        Self::new(operation, Errno::from_raw(err.raw_os_error().unwrap_or(0)))
    }

    pub(crate) fn from_rustix(operation: Operation, err: rustix::io::Errno) -> Self {
        Self::new(operation, Errno::from_raw(err.raw_os_error()))
    }

    /// The operation that failed.
    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// The OS error code.
    #[must_use]
    pub fn errno(&self) -> Errno {
        self.errno
    }
}

impl From<DeviceError> for io::Error {
    fn from(err: DeviceError) -> Self {
        io::Error::from_raw_os_error(err.errno as i32)
    }
}
