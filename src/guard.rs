//! RAII guard that keeps a terminal in raw mode for the guard's lifetime.

use std::marker::PhantomData;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd};
use termios::Termios;
use tracing::warn;

use crate::error::DeviceError;
use crate::profile::RawModeProfile;
use crate::terminal::TerminalModeController;

/// Raw mode bound to one borrowed terminal descriptor.
///
/// Entering the guard switches the device into raw mode; dropping it,
/// whether by normal return, `?` or panic unwinding, applies the captured
/// baseline again. Errors during drop are logged and otherwise ignored.
///
/// The guard is neither `Send` nor `Sync`.
///
/// # Examples
///
/// ```no_run
/// use ttymode::{RawModeGuard, open_terminal_device};
///
/// let tty = open_terminal_device()?;
/// {
///     let _raw = RawModeGuard::enter(&tty)?;
///     // read keystrokes...
/// }
/// // terminal restored here
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug)]
pub struct RawModeGuard<'fd> {
    fd: BorrowedFd<'fd>,
    controller: TerminalModeController,
    _marker: PhantomData<*const ()>,
}

impl<'fd> RawModeGuard<'fd> {
    /// Enters raw mode on `fd` with [`RawModeProfile::raw`].
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] if the device attributes cannot be read or
    /// the raw profile cannot be applied. When reading succeeded but
    /// applying failed, the device is put back before returning.
    pub fn enter<F: AsFd + ?Sized>(fd: &'fd F) -> Result<Self, DeviceError> {
        Self::enter_with(fd, RawModeProfile::raw())
    }

    /// Enters raw mode on `fd` with a custom profile.
    ///
    /// # Errors
    ///
    /// Same as [`enter`](Self::enter).
    pub fn enter_with<F: AsFd + ?Sized>(
        fd: &'fd F,
        profile: RawModeProfile,
    ) -> Result<Self, DeviceError> {
        let mut guard = Self {
            fd: fd.as_fd(),
            controller: TerminalModeController::with_profile(profile),
            _marker: PhantomData,
        };
        // On failure the guard drops here and restores whatever was captured.
        guard.controller.enable_raw_mode(guard.fd)?;
        Ok(guard)
    }

    /// Applies the raw profile again, keeping the original baseline.
    ///
    /// Useful after a child process or another library changed the
    /// device's attributes.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] if the device cannot be read or written.
    pub fn reapply(&mut self) -> Result<(), DeviceError> {
        self.controller.enable_raw_mode(self.fd)
    }

    /// Restores the original attributes without giving up the guard.
    ///
    /// The guard restores again on drop.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] if the baseline cannot be applied.
    pub fn restore(&self) -> Result<(), DeviceError> {
        self.controller.restore_mode(self.fd)
    }

    /// The attributes the device had before the guard was entered.
    #[must_use]
    pub fn baseline(&self) -> Option<&Termios> {
        self.controller.baseline()
    }

    /// The profile in effect.
    #[must_use]
    pub fn profile(&self) -> &RawModeProfile {
        self.controller.profile()
    }

    /// The descriptor this guard controls.
    #[must_use]
    pub fn fd(&self) -> BorrowedFd<'fd> {
        self.fd
    }
}

impl Drop for RawModeGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.controller.restore_mode(self.fd) {
            warn!("failed to restore terminal on fd {}: {e}", self.fd.as_raw_fd());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::read_attributes;
    use crate::test_support::open_pty;
    use anyhow::Result;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use termios::{ECHO, ICANON};

    #[test]
    fn test_drop_restores_original_attributes() -> Result<()> {
        let pty = open_pty(None)?;
        let original = read_attributes(&pty.slave)?;

        {
            let guard = RawModeGuard::enter(&pty.slave)?;
            assert_eq!(guard.baseline(), Some(&original));
            assert_eq!(read_attributes(&pty.slave)?.c_lflag & ICANON, 0);
        }

        assert_eq!(read_attributes(&pty.slave)?, original);
        Ok(())
    }

    #[test]
    fn test_unwind_restores_original_attributes() -> Result<()> {
        let pty = open_pty(None)?;
        let original = read_attributes(&pty.slave)?;

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let _guard = RawModeGuard::enter(&pty.slave).expect("enter raw mode");
            panic!("boom");
        }));

        assert!(outcome.is_err());
        assert_eq!(read_attributes(&pty.slave)?, original);
        Ok(())
    }

    #[test]
    fn test_reapply_keeps_baseline() -> Result<()> {
        let pty = open_pty(None)?;
        let original = read_attributes(&pty.slave)?;

        let mut guard = RawModeGuard::enter(&pty.slave)?;
        guard.restore()?;
        assert_eq!(read_attributes(&pty.slave)?, original);

        guard.reapply()?;
        assert_eq!(read_attributes(&pty.slave)?.c_lflag & ECHO, 0);
        assert_eq!(guard.baseline(), Some(&original));

        drop(guard);
        assert_eq!(read_attributes(&pty.slave)?, original);
        Ok(())
    }

    #[test]
    fn test_independent_guards_on_two_devices() -> Result<()> {
        let first = open_pty(None)?;
        let second = open_pty(None)?;
        let first_original = read_attributes(&first.slave)?;
        let second_original = read_attributes(&second.slave)?;

        let first_guard = RawModeGuard::enter(&first.slave)?;
        let second_guard = RawModeGuard::enter_with(&second.slave, RawModeProfile::cbreak())?;
        assert_eq!(second_guard.profile(), &RawModeProfile::cbreak());
        assert_eq!(second_guard.fd().as_raw_fd(), second.slave.as_raw_fd());

        drop(first_guard);
        assert_eq!(read_attributes(&first.slave)?, first_original);
        assert_eq!(read_attributes(&second.slave)?.c_lflag & ICANON, 0);

        drop(second_guard);
        assert_eq!(read_attributes(&second.slave)?, second_original);
        Ok(())
    }

    #[test]
    fn test_enter_on_non_terminal_fails() -> Result<()> {
        let file = tempfile::tempfile()?;
        assert!(RawModeGuard::enter(&file).is_err());
        Ok(())
    }
}
