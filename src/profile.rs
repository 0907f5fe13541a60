//! Raw mode profiles.
//!
//! A [`RawModeProfile`] names the terminal processing layers to switch off
//! when entering raw mode, independently of how a given platform lays those
//! layers out in its attribute record. Only [`RawModeProfile::apply_to`]
//! knows about termios bits.

use termios::{
    BRKINT, CS8, CSIZE, ECHO, ECHONL, ICANON, ICRNL, IEXTEN, IGNBRK, IGNCR, INLCR, ISIG, ISTRIP,
    IXON, OPOST, PARENB, PARMRK, TCSADRAIN, TCSAFLUSH, TCSANOW, Termios, VMIN, VTIME,
};

/// A terminal processing layer that a profile can disable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Line-buffered (canonical) input with line editing.
    Canonical,
    /// Echo of typed characters, including the lone newline echo.
    Echo,
    /// Signal-generating characters such as `^C` and `^Z`.
    Signals,
    /// Implementation-defined input processing such as `^V`.
    ExtendedInput,
    /// Carriage return and newline translation on input.
    InputTranslation,
    /// Software flow control on output (`^S` / `^Q`).
    FlowControl,
    /// Break condition handling and parity error marking.
    BreakHandling,
    /// Stripping of the eighth bit from input bytes.
    Stripping,
    /// Parity generation and checking; characters become 8 bits wide.
    Parity,
    /// Output post-processing such as newline to CRLF expansion.
    OutputProcessing,
}

impl Layer {
    /// Every layer, in the order they are applied.
    pub const ALL: [Layer; 10] = [
        Layer::Canonical,
        Layer::Echo,
        Layer::Signals,
        Layer::ExtendedInput,
        Layer::InputTranslation,
        Layer::FlowControl,
        Layer::BreakHandling,
        Layer::Stripping,
        Layer::Parity,
        Layer::OutputProcessing,
    ];

    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

/// How reads behave once canonical input is off (`VMIN` / `VTIME`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadTiming {
    /// Leave `VMIN` and `VTIME` as they are.
    Inherit,
    /// Block until at least `min_bytes` bytes are available.
    Blocking {
        /// Minimum number of bytes a read waits for.
        min_bytes: u8,
    },
    /// Return after `deciseconds` tenths of a second even with no input.
    Timeout {
        /// Read timeout in tenths of a second.
        deciseconds: u8,
    },
    /// Block for a single byte.
    #[default]
    SingleByte,
}

/// When a new attribute record takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplyTiming {
    /// Immediately (`TCSANOW`).
    #[default]
    Now,
    /// After pending output has been written (`TCSADRAIN`).
    Drain,
    /// After pending output has been written, discarding pending input
    /// (`TCSAFLUSH`).
    Flush,
}

impl ApplyTiming {
    pub(crate) fn action(self) -> i32 {
        match self {
            Self::Now => TCSANOW,
            Self::Drain => TCSADRAIN,
            Self::Flush => TCSAFLUSH,
        }
    }
}

/// A named description of what raw mode turns off.
///
/// # Examples
///
/// ```
/// use ttymode::{Layer, RawModeProfile};
///
/// let profile = RawModeProfile::raw().keep(Layer::OutputProcessing);
/// assert!(profile.disables(Layer::Echo));
/// assert!(!profile.disables(Layer::OutputProcessing));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawModeProfile {
    disabled: u16,
    read: ReadTiming,
    apply: ApplyTiming,
}

impl Default for RawModeProfile {
    fn default() -> Self {
        Self::raw()
    }
}

impl RawModeProfile {
    /// Every layer disabled, single byte blocking reads.
    ///
    /// Matches `cfmakeraw` with output post-processing cleared.
    #[must_use]
    pub fn raw() -> Self {
        Layer::ALL.iter().fold(Self::none(), |profile, &layer| profile.disable(layer))
    }

    /// Only line buffering and echo disabled; signals and output processing
    /// keep working and read timing is inherited.
    #[must_use]
    pub fn cbreak() -> Self {
        Self::none()
            .disable(Layer::Canonical)
            .disable(Layer::Echo)
            .with_read_timing(ReadTiming::Inherit)
    }

    /// No layer disabled.
    #[must_use]
    pub fn none() -> Self {
        Self {
            disabled: 0,
            read: ReadTiming::default(),
            apply: ApplyTiming::default(),
        }
    }

    /// Returns the profile with `layer` disabled.
    #[must_use]
    pub fn disable(mut self, layer: Layer) -> Self {
        self.disabled |= layer.bit();
        self
    }

    /// Returns the profile with `layer` left as the device has it.
    #[must_use]
    pub fn keep(mut self, layer: Layer) -> Self {
        self.disabled &= !layer.bit();
        self
    }

    /// Returns the profile with the given read timing.
    #[must_use]
    pub fn with_read_timing(mut self, read: ReadTiming) -> Self {
        self.read = read;
        self
    }

    /// Returns the profile with the given apply timing.
    #[must_use]
    pub fn with_apply_timing(mut self, apply: ApplyTiming) -> Self {
        self.apply = apply;
        self
    }

    /// Whether this profile turns `layer` off.
    #[must_use]
    pub fn disables(&self, layer: Layer) -> bool {
        self.disabled & layer.bit() != 0
    }

    /// The layers this profile turns off.
    pub fn disabled_layers(&self) -> impl Iterator<Item = Layer> + '_ {
        Layer::ALL
            .into_iter()
            .filter(move |&layer| self.disables(layer))
    }

    /// The read timing this profile installs.
    #[must_use]
    pub fn read_timing(&self) -> ReadTiming {
        self.read
    }

    /// When the transformed record takes effect.
    #[must_use]
    pub fn apply_timing(&self) -> ApplyTiming {
        self.apply
    }

    /// Rewrites `attrs` in place. Bits not owned by a disabled layer are
    /// left untouched.
    pub fn apply_to(&self, attrs: &mut Termios) {
        for layer in self.disabled_layers() {
            match layer {
                Layer::Canonical => attrs.c_lflag &= !ICANON,
                Layer::Echo => attrs.c_lflag &= !(ECHO | ECHONL),
                Layer::Signals => attrs.c_lflag &= !ISIG,
                Layer::ExtendedInput => attrs.c_lflag &= !IEXTEN,
                Layer::InputTranslation => attrs.c_iflag &= !(INLCR | IGNCR | ICRNL),
                Layer::FlowControl => attrs.c_iflag &= !IXON,
                Layer::BreakHandling => attrs.c_iflag &= !(IGNBRK | BRKINT | PARMRK),
                Layer::Stripping => attrs.c_iflag &= !ISTRIP,
                Layer::Parity => {
                    attrs.c_cflag &= !(CSIZE | PARENB);
                    attrs.c_cflag |= CS8;
                }
                Layer::OutputProcessing => attrs.c_oflag &= !OPOST,
            }
        }

        match self.read {
            ReadTiming::Inherit => {}
            ReadTiming::SingleByte => {
                attrs.c_cc[VMIN] = 1;
                attrs.c_cc[VTIME] = 0;
            }
            ReadTiming::Blocking { min_bytes } => {
                attrs.c_cc[VMIN] = min_bytes;
                attrs.c_cc[VTIME] = 0;
            }
            ReadTiming::Timeout { deciseconds } => {
                attrs.c_cc[VMIN] = 0;
                attrs.c_cc[VTIME] = deciseconds;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::open_pty;
    use anyhow::Result;
    use std::os::fd::AsRawFd;

    #[test]
    fn test_raw_disables_every_layer() {
        let profile = RawModeProfile::raw();
        assert_eq!(profile.disabled_layers().count(), Layer::ALL.len());
        assert_eq!(profile.read_timing(), ReadTiming::SingleByte);
        assert_eq!(profile.apply_timing(), ApplyTiming::Now);
        assert_eq!(RawModeProfile::default(), profile);
    }

    #[test]
    fn test_cbreak_layers() {
        let profile = RawModeProfile::cbreak();
        let layers: Vec<Layer> = profile.disabled_layers().collect();
        assert_eq!(layers, vec![Layer::Canonical, Layer::Echo]);
        assert_eq!(profile.read_timing(), ReadTiming::Inherit);
    }

    #[test]
    fn test_disable_and_keep() {
        let profile = RawModeProfile::none().disable(Layer::Signals);
        assert!(profile.disables(Layer::Signals));
        assert!(!profile.disables(Layer::Echo));

        let profile = profile.keep(Layer::Signals);
        assert_eq!(profile.disabled_layers().count(), 0);
    }

    #[test]
    fn test_apply_timing_actions() {
        assert_eq!(ApplyTiming::Now.action(), TCSANOW);
        assert_eq!(ApplyTiming::Drain.action(), TCSADRAIN);
        assert_eq!(ApplyTiming::Flush.action(), TCSAFLUSH);
    }

    #[test]
    fn test_raw_profile_clears_processing_bits() -> Result<()> {
        let pty = open_pty(None)?;
        let mut attrs = Termios::from_fd(pty.slave.as_raw_fd())?;
        RawModeProfile::raw().apply_to(&mut attrs);

        assert_eq!(attrs.c_lflag & (ICANON | ECHO | ECHONL | ISIG | IEXTEN), 0);
        assert_eq!(attrs.c_iflag & (INLCR | IGNCR | ICRNL | IXON | ISTRIP), 0);
        assert_eq!(attrs.c_iflag & (IGNBRK | BRKINT | PARMRK), 0);
        assert_eq!(attrs.c_oflag & OPOST, 0);
        assert_eq!(attrs.c_cflag & CSIZE, CS8);
        assert_eq!(attrs.c_cflag & PARENB, 0);
        assert_eq!(attrs.c_cc[VMIN], 1);
        assert_eq!(attrs.c_cc[VTIME], 0);
        Ok(())
    }

    #[test]
    fn test_cbreak_leaves_other_bits() -> Result<()> {
        let pty = open_pty(None)?;
        let before = Termios::from_fd(pty.slave.as_raw_fd())?;
        let mut attrs = before;
        RawModeProfile::cbreak().apply_to(&mut attrs);

        assert_eq!(attrs.c_lflag & (ICANON | ECHO), 0);
        assert_eq!(attrs.c_lflag & ISIG, before.c_lflag & ISIG);
        assert_eq!(attrs.c_iflag, before.c_iflag);
        assert_eq!(attrs.c_oflag, before.c_oflag);
        assert_eq!(attrs.c_cflag, before.c_cflag);
        assert_eq!(attrs.c_cc, before.c_cc);
        Ok(())
    }

    #[test]
    fn test_timeout_read_timing() -> Result<()> {
        let pty = open_pty(None)?;
        let mut attrs = Termios::from_fd(pty.slave.as_raw_fd())?;
        RawModeProfile::raw()
            .with_read_timing(ReadTiming::Timeout { deciseconds: 1 })
            .apply_to(&mut attrs);
        assert_eq!(attrs.c_cc[VMIN], 0);
        assert_eq!(attrs.c_cc[VTIME], 1);

        RawModeProfile::raw()
            .with_read_timing(ReadTiming::Blocking { min_bytes: 4 })
            .apply_to(&mut attrs);
        assert_eq!(attrs.c_cc[VMIN], 4);
        assert_eq!(attrs.c_cc[VTIME], 0);
        Ok(())
    }
}
