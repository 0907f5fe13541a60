//! Window geometry queries.

use nix::errno::Errno;
use rustix::termios::tcgetwinsize;
use std::os::fd::AsFd;

use crate::error::{DeviceError, Operation};

/// Character-cell geometry reported by a terminal driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowSize {
    /// Number of columns, always positive.
    pub columns: u16,
    /// Number of rows, always positive.
    pub rows: u16,
    /// Width in pixels, 0 when the driver does not know it.
    pub pixel_width: u16,
    /// Height in pixels, 0 when the driver does not know it.
    pub pixel_height: u16,
}

impl From<WindowSize> for (u16, u16) {
    fn from(size: WindowSize) -> Self {
        (size.columns, size.rows)
    }
}

/// Queries the full window size of `fd`, pixel fields included.
///
/// Every call asks the driver again; nothing is cached.
///
/// # Errors
///
/// Returns [`DeviceError`] when `fd` is not a terminal, or when the driver
/// reports a zero column or row count (reported as `ENOTTY`).
pub fn window_size(fd: impl AsFd) -> Result<WindowSize, DeviceError> {
    let ws = tcgetwinsize(fd).map_err(|e| DeviceError::from_rustix(Operation::QueryWindowSize, e))?;

    if ws.ws_col == 0 || ws.ws_row == 0 {
        return Err(DeviceError::new(Operation::QueryWindowSize, Errno::ENOTTY));
    }

    Ok(WindowSize {
        columns: ws.ws_col,
        rows: ws.ws_row,
        pixel_width: ws.ws_xpixel,
        pixel_height: ws.ws_ypixel,
    })
}

/// Queries the `(columns, rows)` of `fd`.
///
/// # Errors
///
/// Same as [`window_size`].
pub fn get_window_size(fd: impl AsFd) -> Result<(u16, u16), DeviceError> {
    window_size(fd).map(Into::into)
}
