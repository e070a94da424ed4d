//! Error taxonomy for the CCID reader protocol engine.

use thiserror::Error;

/// Failures while driving a CCID reader (§7's Reader/Protocol categories).
#[derive(Debug, Error)]
pub enum CcidError {
    /// The reader's feature mask does not include APDU-exchange support.
    #[error("reader does not support APDU exchange")]
    ApduExchangeUnsupported,
    /// `dwProtocols` declares neither T=0 nor T=1 support.
    #[error("CCID device does not speak any protocol we understand")]
    NoSupportedProtocol,
    /// No voltage bit was set in the reader's voltage-support bitmap and
    /// auto-voltage is not available either.
    #[error("reader reports no supported ICC voltage")]
    NoSupportedVoltage,
    /// `ICC_POWER_ON` failed at every voltage this reader supports.
    #[error("power-on failed at every supported voltage")]
    PowerOnFailed,
    /// Six response packets were received with none matching and final.
    #[error("too many retries waiting for a matching CCID response")]
    TooManyRetries,
    /// A response carried a type other than the one the command expected.
    #[error("unexpected CCID response type {actual:#x}, expected {expected:#x}")]
    UnexpectedResponseType { expected: u8, actual: u8 },
    /// A response's `ctl[0]` error bits were set; `ctl[1]` is the card-error code.
    #[error("CCID command failed with error code {0:#x}")]
    CommandFailed(u8),
    /// The underlying transport's send or receive failed.
    #[error("CCID transport error: {0}")]
    Transport(String),
    /// A received packet was shorter than the 10-byte header, or its
    /// declared length ran past the bytes actually read.
    #[error("malformed CCID response packet")]
    MalformedResponse,
}
