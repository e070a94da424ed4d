//! The card service: APDU transport abstraction, GET-RESPONSE chaining,
//! the card-driver registry, and the YubiKey PIV driver (§4.E, §4.F).

#![warn(missing_docs)]

pub mod apdu;
pub mod bertlv;
pub mod card;
pub mod driver;
pub mod error;
pub mod pkcs1;
pub mod yubikey;

pub use apdu::ApduTransport;
pub use card::{Card, CardEntry, CardRegistry};
pub use driver::{CardDriver, VerifyOutcome};
pub use error::CardError;
