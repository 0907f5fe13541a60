//! Terminal attribute control.
//!
//! This module provides:
//! - Opening the controlling terminal device (`/dev/tty`)
//! - Switching a terminal into raw mode while remembering its original state
//! - Restoring that original state, as many times as needed

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::os::fd::{AsFd, AsRawFd};
use termios::{TCSANOW, Termios, tcsetattr};
use tracing::debug;

use crate::error::{DeviceError, Operation};
use crate::profile::RawModeProfile;

/// Opens the terminal device for direct access.
///
/// This function opens `/dev/tty` with both read and write permissions,
/// which allows direct communication with the terminal regardless of
/// how stdin/stdout are redirected. The mode operations never call it;
/// it exists for callers that do not already hold a terminal descriptor.
///
/// # Errors
///
/// Returns an error if `/dev/tty` cannot be opened, typically because the
/// process has no controlling terminal.
pub fn open_terminal_device() -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .open("/dev/tty")
        .context("Failed to open /dev/tty")
}

/// Reads the current attribute record of `fd`.
///
/// # Errors
///
/// Returns [`DeviceError`] if `fd` is not a terminal or cannot be queried.
pub fn read_attributes(fd: impl AsFd) -> Result<Termios, DeviceError> {
    Termios::from_fd(fd.as_fd().as_raw_fd())
        .map_err(|e| DeviceError::from_io(Operation::ReadAttributes, &e))
}

fn write_attributes(fd: impl AsFd, action: i32, attrs: &Termios) -> Result<(), DeviceError> {
    tcsetattr(fd.as_fd().as_raw_fd(), action, attrs)
        .map_err(|e| DeviceError::from_io(Operation::WriteAttributes, &e))
}

/// Switches a terminal into raw mode and puts it back the way it was.
///
/// The controller keeps a single snapshot, the *baseline*, of the attribute
/// record it saw the first time [`enable_raw_mode`](Self::enable_raw_mode)
/// succeeded in reading the device. The baseline is never replaced or
/// cleared afterwards, so [`restore_mode`](Self::restore_mode) always puts
/// back the state from before the first switch.
///
/// One controller is meant to serve one device. It does not check which
/// device it is handed; [`RawModeGuard`](crate::RawModeGuard) binds a
/// controller to a single descriptor.
///
/// If something else already left the device in an unusual state before the
/// first call, that state is what gets captured and later restored.
///
/// A controller is not synchronized: share it across threads only behind a
/// lock.
#[derive(Debug, Clone, Default)]
pub struct TerminalModeController {
    profile: RawModeProfile,
    baseline: Option<Termios>,
}

impl TerminalModeController {
    /// A controller that applies [`RawModeProfile::raw`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A controller that applies `profile` instead of the default raw profile.
    #[must_use]
    pub fn with_profile(profile: RawModeProfile) -> Self {
        Self {
            profile,
            baseline: None,
        }
    }

    /// The profile applied by [`enable_raw_mode`](Self::enable_raw_mode).
    #[must_use]
    pub fn profile(&self) -> &RawModeProfile {
        &self.profile
    }

    /// The attribute record captured before the first switch, if any.
    #[must_use]
    pub fn baseline(&self) -> Option<&Termios> {
        self.baseline.as_ref()
    }

    /// Whether a baseline has been captured.
    #[must_use]
    pub fn is_captured(&self) -> bool {
        self.baseline.is_some()
    }

    /// Puts `fd` into raw mode.
    ///
    /// The first successful read of the device's attributes is stored as the
    /// baseline before anything is changed. The profile is then applied to
    /// the device's *current* attributes. If applying fails the baseline
    /// stays captured.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] if the attributes cannot be read (nothing is
    /// captured in that case) or the transformed record cannot be applied.
    pub fn enable_raw_mode(&mut self, fd: impl AsFd) -> Result<(), DeviceError> {
        let fd = fd.as_fd();
        let current = read_attributes(fd)?;

        if self.baseline.is_none() {
            debug!("capturing terminal baseline for fd {}", fd.as_raw_fd());
            self.baseline = Some(current);
        }

        let mut raw = current;
        self.profile.apply_to(&mut raw);
        write_attributes(fd, self.profile.apply_timing().action(), &raw)?;

        debug!(
            "raw profile applied to fd {}: {:?}",
            fd.as_raw_fd(),
            self.profile.disabled_layers().collect::<Vec<_>>()
        );
        Ok(())
    }

    /// Applies the baseline back to `fd`.
    ///
    /// Succeeds without touching the device when no baseline was captured.
    /// The baseline is kept, so restoring again is harmless.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] if the baseline cannot be applied, for
    /// instance because the device went away.
    pub fn restore_mode(&self, fd: impl AsFd) -> Result<(), DeviceError> {
        let Some(baseline) = &self.baseline else {
            return Ok(());
        };

        let fd = fd.as_fd();
        write_attributes(fd, TCSANOW, baseline)?;
        debug!("terminal baseline restored on fd {}", fd.as_raw_fd());
        Ok(())
    }
}
