//! Card driver capability trait (§4.E). A driver implements whichever
//! operations its card supports; the rest keep their default behavior.

use crate::apdu::ApduTransport;
use crate::card::Card;
use crate::error::CardError;

/// Outcome of a successful VERIFY exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The PIN (or, for a `None` probe, the card's no-PIN-needed state)
    /// was accepted.
    Verified,
    /// The PIN was rejected; `tries_left` counts remaining attempts
    /// before the card locks out.
    WrongPin { tries_left: u8 },
}

/// A card driver: the operations a specific card family supports.
///
/// Mirrors the function-pointer contract of a C `ifd_card_driver_t`:
/// a capability a driver doesn't implement keeps its default here
/// rather than being `None` — `connect` defaults to success (nothing
/// extra to do), `verify` and `decipher` default to
/// [`CardError::OperationUnsupported`].
pub trait CardDriver<A: ApduTransport> {
    /// Perform whatever handshake the card needs after ATR (selecting
    /// an application, probing for PIN state, ...).
    fn connect(&self, _card: &mut Card<'_, A>) -> Result<(), CardError> {
        Ok(())
    }

    /// Verify a PIN, or (when `pin` is `None`) probe whether the card
    /// currently requires one at all.
    fn verify(
        &self,
        _card: &mut Card<'_, A>,
        _pin: Option<&[u8]>,
    ) -> Result<VerifyOutcome, CardError> {
        Err(CardError::OperationUnsupported)
    }

    /// Decrypt `ciphertext` under the card's private key and return
    /// the PKCS#1-unpadded plaintext.
    fn decipher(&self, _card: &mut Card<'_, A>, _ciphertext: &[u8]) -> Result<Vec<u8>, CardError> {
        Err(CardError::OperationUnsupported)
    }

    /// Apply a driver-specific `key=value` option (`-C` on the CLI).
    fn set_option(&self, _card: &mut Card<'_, A>, _key: &str, _value: &str) -> Result<(), CardError> {
        Err(CardError::OperationUnsupported)
    }
}
