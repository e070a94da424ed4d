//! PKCS#1 v1.5 type-2 padding removal.

use crate::error::CardError;

/// Strip `00 02 <random, no zero bytes> 00 <message>` padding and
/// return the message. The random padding bytes are never checked for
/// zero-freeness beyond the scan for the terminating `00`.
pub fn remove_type2_padding(data: &[u8]) -> Result<&[u8], CardError> {
    if data.len() < 2 || data[0] != 0x00 || data[1] != 0x02 {
        return Err(CardError::InvalidPkcs1Padding);
    }
    data[2..]
        .iter()
        .position(|&b| b == 0)
        .map(|i| &data[2 + i + 1..])
        .ok_or(CardError::InvalidPkcs1Padding)
}

#[cfg(test)]
#[path = "tests/pkcs1.rs"]
mod tests;
