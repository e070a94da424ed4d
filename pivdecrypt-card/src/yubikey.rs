//! YubiKey PIV driver (§4.F): application select, PIN verify, and RSA
//! decipher via GENERAL AUTHENTICATE.

use crate::apdu::ApduTransport;
use crate::bertlv;
use crate::card::{Card, CardRegistry};
use crate::driver::{CardDriver, VerifyOutcome};
use crate::error::CardError;
use crate::pkcs1;

const INS_VERIFY: u8 = 0x20;
const INS_AUTHENTICATE: u8 = 0x87;
const INS_SELECT_APPLICATION: u8 = 0xa4;

const SW_SUCCESS: u16 = 0x9000;

const ALGO_RSA1024: u8 = 0x06;
const ALGO_RSA2048: u8 = 0x07;

const PIV_AID: [u8; 5] = [0xa0, 0x00, 0x00, 0x03, 0x08];
const KEY_REFERENCE: u8 = 0x9a;

const PIN_LEN: usize = 8;

/// Variant tags for the four ATRs this driver answers to.
pub mod variant {
    pub const NEO_R3: u8 = 0;
    pub const YUBIKEY_4: u8 = 1;
    pub const YUBIKEY_5: u8 = 2;
    pub const YUBIKEY_5_P1: u8 = 3;
}

const ATR_NEO_R3: [u8; 22] = [
    0x3b, 0xfc, 0x13, 0x00, 0x00, 0x81, 0x31, 0xfe, 0x15, 0x59, 0x75, 0x62, 0x69, 0x6b, 0x65, 0x79,
    0x4e, 0x45, 0x4f, 0x72, 0x33, 0xe1,
];
const ATR_YUBIKEY_4: [u8; 18] = [
    0x3b, 0xf8, 0x13, 0x00, 0x00, 0x81, 0x31, 0xfe, 0x15, 0x59, 0x75, 0x62, 0x69, 0x6b, 0x65, 0x79,
    0x34, 0xd4,
];
const ATR_YUBIKEY_5: [u8; 23] = [
    0x3b, 0xfd, 0x13, 0x00, 0x00, 0x81, 0x31, 0xfe, 0x15, 0x80, 0x73, 0xc0, 0x21, 0xc0, 0x57, 0x59,
    0x75, 0x62, 0x69, 0x4b, 0x65, 0x79, 0x40,
];
const ATR_YUBIKEY_5_P1: [u8; 18] = [
    0x3b, 0xf8, 0x13, 0x00, 0x00, 0x81, 0x31, 0xfe, 0x15, 0x01, 0x59, 0x75, 0x62, 0x69, 0x4b, 0x65,
    0x79, 0xc1,
];

/// The PIV driver shared by every YubiKey variant; the variant tag
/// only distinguishes registrations, it doesn't change behavior.
pub struct YubiKeyDriver;

/// Register all four known YubiKey ATRs against [`YubiKeyDriver`].
pub fn register<A: ApduTransport>(registry: &mut CardRegistry<A>) {
    registry.register(
        ATR_NEO_R3.to_vec(),
        "YubiKey Neo R3",
        variant::NEO_R3,
        Box::new(YubiKeyDriver),
    );
    registry.register(
        ATR_YUBIKEY_4.to_vec(),
        "YubiKey 4",
        variant::YUBIKEY_4,
        Box::new(YubiKeyDriver),
    );
    registry.register(
        ATR_YUBIKEY_5.to_vec(),
        "YubiKey 5",
        variant::YUBIKEY_5,
        Box::new(YubiKeyDriver),
    );
    registry.register(
        ATR_YUBIKEY_5_P1.to_vec(),
        "YubiKey 5",
        variant::YUBIKEY_5_P1,
        Box::new(YubiKeyDriver),
    );
}

fn select_application<A: ApduTransport>(card: &mut Card<'_, A>) -> Result<(), CardError> {
    let (_, sw) = card.apdu(0x00, INS_SELECT_APPLICATION, 0x04, 0x00, &PIV_AID)?;
    if sw != SW_SUCCESS {
        return Err(CardError::StatusNotOk(sw));
    }
    Ok(())
}

fn pad_pin(pin: &[u8]) -> Result<[u8; PIN_LEN], CardError> {
    if pin.len() > PIN_LEN {
        return Err(CardError::PinTooLong);
    }
    let mut padded = [0xffu8; PIN_LEN];
    padded[..pin.len()].copy_from_slice(pin);
    Ok(padded)
}

impl<A: ApduTransport> CardDriver<A> for YubiKeyDriver {
    fn connect(&self, card: &mut Card<'_, A>) -> Result<(), CardError> {
        select_application(card)?;
        log::info!("selected PIV application");

        match self.verify(card, None) {
            Ok(VerifyOutcome::Verified) => card.pin_required = false,
            _ => log::debug!("card requires a PIN"),
        }
        Ok(())
    }

    fn verify(
        &self,
        card: &mut Card<'_, A>,
        pin: Option<&[u8]>,
    ) -> Result<VerifyOutcome, CardError> {
        let padded;
        let data: &[u8] = match pin {
            None => &[],
            Some(p) => {
                padded = pad_pin(p)?;
                &padded
            }
        };

        let (_, sw) = card.apdu(0x00, INS_VERIFY, 0x00, 0x80, data)?;
        if sw & 0xff00 == 0x6300 {
            return Ok(VerifyOutcome::WrongPin {
                tries_left: (sw & 0x000f) as u8,
            });
        }
        if sw != SW_SUCCESS {
            return Err(CardError::StatusNotOk(sw));
        }
        Ok(VerifyOutcome::Verified)
    }

    fn decipher(&self, card: &mut Card<'_, A>, ciphertext: &[u8]) -> Result<Vec<u8>, CardError> {
        let algorithm = match ciphertext.len() {
            128 => ALGO_RSA1024,
            256 => ALGO_RSA2048,
            n => return Err(CardError::UnsupportedCiphertextLength(n)),
        };

        let body = bertlv::encode_decipher_request(ciphertext)?;

        let mut offset = 0;
        let mut last_reply = None;
        while offset < body.len() {
            let remaining = body.len() - offset;
            let (len, cla) = if remaining > 0xff {
                (0xff, 0x10)
            } else {
                (remaining, 0x00)
            };
            let (reply, sw) = card.apdu(
                cla,
                INS_AUTHENTICATE,
                algorithm,
                KEY_REFERENCE,
                &body[offset..offset + len],
            )?;
            if sw != SW_SUCCESS {
                return Err(CardError::StatusNotOk(sw));
            }
            offset += len;
            last_reply = Some(reply);
        }

        let padded = bertlv::decode_decipher_response(&last_reply.ok_or(CardError::MalformedBerTlv)?)?;
        pkcs1::remove_type2_padding(&padded).map(|m| m.to_vec())
    }
}

#[cfg(test)]
#[path = "tests/yubikey.rs"]
mod tests;
