//! Terminal mode control: raw mode, window size and non-blocking descriptors.
//!
//! The crate never opens or closes terminal descriptors on its own behalf;
//! every operation borrows one through [`AsFd`](std::os::fd::AsFd).
//!
//! - [`TerminalModeController`] switches a device into raw mode and restores
//!   the attributes it had before the first switch.
//! - [`RawModeGuard`] does the same for the lifetime of a scope.
//! - [`get_window_size`] reports the device's columns and rows.
//! - [`set_nonblocking`] toggles `O_NONBLOCK` on any descriptor.
//!
//! Every failure is a [`DeviceError`] carrying the OS error code.

mod blocking;
mod error;
mod geometry;
mod guard;
mod input;
mod logs;
mod profile;
mod terminal;
#[cfg(test)]
mod test_support;

pub use blocking::{is_nonblocking, set_nonblocking};
pub use error::{DeviceError, Operation};
pub use geometry::{WindowSize, get_window_size, window_size};
pub use guard::RawModeGuard;
pub use input::{is_terminal, read_timeout};
pub use logs::init_logging;
pub use profile::{ApplyTiming, Layer, RawModeProfile, ReadTiming};
pub use terminal::{TerminalModeController, open_terminal_device, read_attributes};

/// The terminal attribute record type captured as a baseline.
pub use termios::Termios;
