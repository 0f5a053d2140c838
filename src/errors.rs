//! Error taxonomy of the crate.

use nix::errno::Errno;

use crate::fixed_str::FixedStrError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure of a controller operation.
///
/// Variants that wrap an [`Errno`] carry the OS error captured at the
/// moment the native call failed. A failed operation leaves the handle
/// valid and reusable; only a failed open leaves nothing behind.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The controller device could not be opened.
    #[error("could not open GPIO controller {device}: {source}")]
    Open { device: String, source: Errno },

    /// Pin enumeration reported a negative count.
    #[error("could not list pins: {source}")]
    Enumeration { source: Errno },

    /// Reading or writing a pin's configuration failed. `op` names the
    /// requested mode or action.
    #[error("could not configure pin {pin} ({op}): {source}")]
    Config {
        pin: u32,
        op: &'static str,
        source: Errno,
    },

    /// Writing or toggling a pin's logic value failed.
    #[error("could not set pin {pin}: {source}")]
    Set { pin: u32, source: Errno },

    /// The native layer returned no valid logic level for the pin.
    #[error("could not read pin {pin}: {source}")]
    Read { pin: u32, source: Errno },

    /// A pin name crossing the FFI boundary was malformed.
    #[error("invalid pin name")]
    Name(#[from] FixedStrError),
}
