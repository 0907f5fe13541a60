//! Pseudo-terminal fixtures for unit tests.

use anyhow::{Context, Result};
use nix::pty::{OpenptyResult, Winsize, openpty};
use std::fs::File;

/// Both ends of a freshly allocated pseudo-terminal.
pub(crate) struct Pty {
    pub(crate) master: File,
    pub(crate) slave: File,
}

/// Opens a pseudo-terminal pair, optionally with a `(columns, rows)` size.
pub(crate) fn open_pty(size: Option<(u16, u16)>) -> Result<Pty> {
    let winsize = size.map(|(columns, rows)| Winsize {
        ws_row: rows,
        ws_col: columns,
        ws_xpixel: 0,
        ws_ypixel: 0,
    });
    let OpenptyResult { master, slave } =
        openpty(winsize.as_ref(), None).context("Failed to allocate a pseudo-terminal")?;
    Ok(Pty {
        master: File::from(master),
        slave: File::from(slave),
    })
}
