//! Terminal mode diagnostic utility.
//!
//! Reports what the terminal driver says about a descriptor and lets you
//! watch raw keystrokes arrive.
//!
//! # Usage
//!
//! - `ttymode size` prints `COLSxROWS`, or `unknown` (exit code 2)
//! - `ttymode probe` prints terminal, size, non-blocking and canonical state
//! - `ttymode keys` switches `/dev/tty` to raw mode and prints each received
//!   byte in hex until `q` is pressed or input stays idle
//!
//! # Environment Variables
//!
//! - `DEBUG`: When set, enables debug output to stderr.
//! - `RUST_LOG`: Overrides `DEBUG` with a full `tracing` filter.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::process;
use std::time::{Duration, Instant};
use termios::ICANON;
use tracing::debug;
use ttymode::{
    RawModeGuard, RawModeProfile, get_window_size, init_logging, is_nonblocking, is_terminal,
    open_terminal_device, read_attributes, read_timeout,
};

/// Exit code used when the answer is unknown.
const EXIT_UNKNOWN: i32 = 2;

#[derive(Parser)]
#[command(version, about = "Inspect and exercise terminal modes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the terminal size of stdout as COLSxROWS
    Size,
    /// Describe the state of stdin
    Probe,
    /// Print raw input bytes from /dev/tty until `q` or an idle timeout
    Keys {
        /// Stop after this many milliseconds without input
        #[arg(long, default_value_t = 5000)]
        timeout_ms: u64,
        /// Only disable line buffering and echo
        #[arg(long)]
        cbreak: bool,
    },
}

fn size() -> i32 {
    match get_window_size(io::stdout()) {
        Ok((columns, rows)) => {
            println!("{columns}x{rows}");
            0
        }
        Err(e) => {
            debug!("size unavailable: {e}");
            println!("unknown");
            EXIT_UNKNOWN
        }
    }
}

fn probe() -> Result<i32> {
    let stdin = io::stdin();
    let terminal = is_terminal(&stdin);
    println!("terminal: {terminal}");

    match get_window_size(&stdin) {
        Ok((columns, rows)) => println!("size: {columns}x{rows}"),
        Err(_) => println!("size: unknown"),
    }

    let nonblocking = is_nonblocking(&stdin).context("Failed to read stdin flags")?;
    println!("nonblocking: {nonblocking}");

    if terminal {
        let attrs = read_attributes(&stdin).context("Failed to read stdin attributes")?;
        println!("canonical: {}", attrs.c_lflag & ICANON != 0);
    }
    Ok(0)
}

fn keys(timeout: Duration, cbreak: bool) -> Result<i32> {
    let tty = open_terminal_device()?;
    let profile = if cbreak {
        RawModeProfile::cbreak()
    } else {
        RawModeProfile::raw()
    };
    let _raw = RawModeGuard::enter_with(&tty, profile).context("Failed to enter raw mode")?;

    let mut out = io::stdout().lock();
    write!(out, "press q to quit\r\n")?;
    out.flush()?;

    let mut buf = [0u8; 64];
    let mut last_input = Instant::now();
    loop {
        let n = read_timeout(&tty, &mut buf, Some(Duration::from_millis(250)))
            .context("Failed to read from terminal")?;
        if n == 0 {
            if last_input.elapsed() >= timeout {
                write!(out, "idle timeout\r\n")?;
                break;
            }
            continue;
        }
        last_input = Instant::now();

        let hex: Vec<String> = buf[..n].iter().map(|b| format!("{b:02x}")).collect();
        write!(out, "{}\r\n", hex.join(" "))?;
        out.flush()?;

        if buf[..n].contains(&b'q') {
            break;
        }
    }
    out.flush()?;
    Ok(0)
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Size => Ok(size()),
        Command::Probe => probe(),
        Command::Keys { timeout_ms, cbreak } => keys(Duration::from_millis(timeout_ms), cbreak),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("ttymode: {e:#}");
            process::exit(1);
        }
    }
}
