//! Raw APDU transport abstraction and GET-RESPONSE chaining (§4.E).

use crate::error::CardError;
use pivdecrypt_ccid::{CcidReader, CcidTransport};

const INS_GET_RESPONSE: u8 = 0xc0;

/// Something that can carry one APDU to a card's slot and return its
/// reply, status word included.
///
/// Implemented for [`CcidReader`] in production; card-service tests
/// implement it directly over canned byte sequences.
pub trait ApduTransport {
    /// Transport-level error.
    type Error: std::fmt::Display;

    /// Send `apdu` to `slot` and return the raw reply (status word
    /// still appended).
    fn transfer(&mut self, slot: u8, apdu: &[u8]) -> Result<Vec<u8>, Self::Error>;
}

impl<T: CcidTransport> ApduTransport for CcidReader<T> {
    type Error = pivdecrypt_ccid::CcidError;

    fn transfer(&mut self, slot: u8, apdu: &[u8]) -> Result<Vec<u8>, Self::Error> {
        self.transfer_apdu(slot, apdu)
    }
}

/// Build a simple `CLA INS P1 P2 Lc <data>` command APDU (no `Le`).
pub fn build_apdu(cla: u8, ins: u8, p1: u8, p2: u8, data: &[u8]) -> Result<Vec<u8>, CardError> {
    if data.len() > 0xff {
        return Err(CardError::ApduDataTooLong(data.len()));
    }
    let mut apdu = Vec::with_capacity(5 + data.len());
    apdu.extend_from_slice(&[cla, ins, p1, p2, data.len() as u8]);
    apdu.extend_from_slice(data);
    Ok(apdu)
}

fn split_status_word<A: ApduTransport>(
    transport: &mut A,
    slot: u8,
    apdu: &[u8],
) -> Result<(Vec<u8>, u16), CardError> {
    let reply = transport
        .transfer(slot, apdu)
        .map_err(|e| CardError::Ccid(pivdecrypt_ccid::CcidError::Transport(e.to_string())))?;
    if reply.len() < 2 {
        return Err(CardError::ResponseTooShort);
    }
    let split = reply.len() - 2;
    let sw = ((reply[split] as u16) << 8) | reply[split + 1] as u16;
    Ok((reply[..split].to_vec(), sw))
}

/// Send `apdu` to `slot`, following `0x61 Lx` continuations with
/// GET-RESPONSE until the card signals completion, and return the
/// concatenated data plus the final status word.
pub fn xfer<A: ApduTransport>(
    transport: &mut A,
    slot: u8,
    apdu: &[u8],
) -> Result<(Vec<u8>, u16), CardError> {
    let (mut data, mut sw) = split_status_word(transport, slot, apdu)?;

    while sw & 0xff00 == 0x6100 {
        let lc = (sw & 0x00ff) as u8;
        let want = if lc == 0 { 0x100 } else { lc as usize };
        log::debug!("slot {slot} chaining GET-RESPONSE for {want} more bytes (SW {sw:04x})");

        // Lc here doubles as Le: it asks the card for `lc` more bytes,
        // no command data is sent.
        let get_response = vec![0x00, INS_GET_RESPONSE, 0x00, 0x00, lc];
        let (chunk, next_sw) = split_status_word(transport, slot, &get_response)?;
        if chunk.len() != want {
            return Err(CardError::ChainLengthMismatch {
                advertised: want,
                actual: chunk.len(),
            });
        }
        data.extend_from_slice(&chunk);
        sw = next_sw;
    }

    if sw != 0x9000 {
        log::debug!("slot {slot} APDU completed with SW {sw:04x}");
    }
    Ok((data, sw))
}

#[cfg(test)]
#[path = "tests/apdu.rs"]
mod tests;
