//! Top-level error type and the exit-code predicate (§7's
//! "Implementation shape").

use std::io;
use thiserror::Error;

/// Every failure the CLI can report, chained up from each layer crate.
#[derive(Debug, Error)]
pub enum CliError {
    /// A bad `-T`/`-C` argument, or no device could be located.
    #[error("{0}")]
    Configuration(String),
    /// Reading the ciphertext or writing the plaintext failed.
    #[error("I/O error on {path}: {source}")]
    Io { path: String, source: io::Error },
    /// The PIN was rejected; `tries_left` attempts remain before lockout.
    #[error("incorrect PIN, {tries_left} tries left")]
    WrongPin { tries_left: u8 },
    #[error(transparent)]
    Usb(#[from] pivdecrypt_usb::UsbError),
    #[error(transparent)]
    Ccid(#[from] pivdecrypt_ccid::CcidError),
    #[error(transparent)]
    Card(#[from] pivdecrypt_card::CardError),
}

impl CliError {
    /// Maps this error to the process exit code §6 specifies: 2 for a
    /// fatal I/O failure on the ciphertext/plaintext path, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Io { .. } => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
#[path = "tests/error.rs"]
mod tests;
