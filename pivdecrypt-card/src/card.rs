//! The card service: an identified, connected card plus the registry
//! that maps an ATR to the driver that knows how to talk to it (§4.E).

use crate::apdu::{self, ApduTransport};
use crate::driver::CardDriver;
use crate::error::CardError;

/// A card presented to a reader slot, bound to the transport it was
/// discovered on.
pub struct Card<'a, A: ApduTransport> {
    transport: &'a mut A,
    slot: u8,
    /// The card's answer-to-reset.
    pub atr: Vec<u8>,
    /// The driver registration's display name (e.g. `"YubiKey 5"`).
    pub name: &'static str,
    /// The driver-specific variant tag (distinguishes cards that share
    /// one driver but need slightly different handling).
    pub variant: u8,
    /// Whether [`CardDriver::verify`] must still be called before
    /// [`CardDriver::decipher`] will succeed. Defaults to `true`;
    /// a driver's `connect` may clear it after probing the card.
    pub pin_required: bool,
}

impl<'a, A: ApduTransport> Card<'a, A> {
    fn new(transport: &'a mut A, slot: u8, atr: Vec<u8>, name: &'static str, variant: u8) -> Self {
        Card {
            transport,
            slot,
            atr,
            name,
            variant,
            pin_required: true,
        }
    }

    /// Send a command APDU and follow any GET-RESPONSE continuations,
    /// returning the reassembled data and the final status word.
    pub fn apdu(
        &mut self,
        cla: u8,
        ins: u8,
        p1: u8,
        p2: u8,
        data: &[u8],
    ) -> Result<(Vec<u8>, u16), CardError> {
        let command = apdu::build_apdu(cla, ins, p1, p2, data)?;
        apdu::xfer(self.transport, self.slot, &command)
    }
}

/// One entry in a [`CardRegistry`]: the ATR a card family presents,
/// its display name, and the driver that speaks its protocol.
pub struct CardEntry<A: ApduTransport> {
    atr: Vec<u8>,
    name: &'static str,
    variant: u8,
    driver: Box<dyn CardDriver<A>>,
}

impl<A: ApduTransport> CardEntry<A> {
    /// The display name registered for this card family.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The variant tag registered alongside this ATR.
    pub fn variant(&self) -> u8 {
        self.variant
    }

    /// The driver registered for this card family.
    pub fn driver(&self) -> &dyn CardDriver<A> {
        self.driver.as_ref()
    }

    /// Bind a [`Card`] to this entry's driver over `transport`.
    pub fn create_card<'a>(&self, transport: &'a mut A, slot: u8) -> Card<'a, A> {
        Card::new(transport, slot, self.atr.clone(), self.name, self.variant)
    }
}

/// An ordered table of ATR-to-driver registrations, built once at
/// startup and immutable thereafter. First exact match wins.
pub struct CardRegistry<A: ApduTransport> {
    entries: Vec<CardEntry<A>>,
}

impl<A: ApduTransport> Default for CardRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ApduTransport> CardRegistry<A> {
    /// An empty registry.
    pub fn new() -> Self {
        CardRegistry {
            entries: Vec::new(),
        }
    }

    /// Register a driver for cards presenting exactly `atr`.
    pub fn register(
        &mut self,
        atr: impl Into<Vec<u8>>,
        name: &'static str,
        variant: u8,
        driver: Box<dyn CardDriver<A>>,
    ) {
        self.entries.push(CardEntry {
            atr: atr.into(),
            name,
            variant,
            driver,
        });
    }

    /// Find the first registration whose ATR exactly matches `atr`.
    pub fn identify(&self, atr: &[u8]) -> Option<&CardEntry<A>> {
        self.entries.iter().find(|e| e.atr == atr)
    }
}

#[cfg(test)]
#[path = "tests/card.rs"]
mod tests;
