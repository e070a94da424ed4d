//! Error taxonomy for the card service and its drivers (§7's Card,
//! PIN, and Cryptographic categories).

use thiserror::Error;

/// Failures raised by the card service, the APDU-chaining layer, or a
/// card driver.
#[derive(Debug, Error)]
pub enum CardError {
    /// No registered driver's ATR matched the card presented by the reader.
    #[error("no card driver registered for this ATR")]
    NoMatchingCard,
    /// The driver does not implement the requested capability.
    #[error("card driver does not support this operation")]
    OperationUnsupported,
    /// A PIN longer than 8 bytes was presented; YubiKey PIV PINs are
    /// padded to exactly 8 bytes and cannot exceed that.
    #[error("PIN is longer than 8 bytes")]
    PinTooLong,
    /// The card returned a status word other than success (or, for
    /// VERIFY, an expected wrong-PIN status).
    #[error("card reports status {0:#06x}")]
    StatusNotOk(u16),
    /// A response APDU was shorter than the trailing 2-byte status word.
    #[error("response APDU too short to carry a status word")]
    ResponseTooShort,
    /// GET-RESPONSE's reply length didn't match the length the card
    /// advertised in the preceding 0x61xx status word.
    #[error("card advertised {advertised} more bytes, GET RESPONSE returned {actual}")]
    ChainLengthMismatch { advertised: usize, actual: usize },
    /// A command APDU's data field exceeded the 255-byte `Lc` limit.
    #[error("APDU data field of {0} bytes exceeds the 255-byte limit")]
    ApduDataTooLong(usize),
    /// Ciphertext length didn't match a supported RSA key size (128 or
    /// 256 bytes).
    #[error("unexpected ciphertext length {0}, cannot determine key algorithm")]
    UnsupportedCiphertextLength(usize),
    /// The GENERAL AUTHENTICATE request body didn't fit the driver's
    /// scratch buffer.
    #[error("ciphertext too large to encode")]
    CiphertextTooLarge,
    /// A BER-TLV structure was truncated or carried an unexpected tag.
    #[error("malformed BER-TLV response")]
    MalformedBerTlv,
    /// The deciphered block didn't carry valid PKCS#1 v1.5 type-2 padding.
    #[error("invalid PKCS#1 padding in deciphered block")]
    InvalidPkcs1Padding,
    /// The underlying CCID reader or transport failed.
    #[error(transparent)]
    Ccid(#[from] pivdecrypt_ccid::CcidError),
}
