use super::*;
use std::collections::VecDeque;

struct FakeTransport {
    replies: VecDeque<Vec<u8>>,
}

impl ApduTransport for FakeTransport {
    type Error = std::convert::Infallible;

    fn transfer(&mut self, _slot: u8, _apdu: &[u8]) -> Result<Vec<u8>, Self::Error> {
        Ok(self.replies.pop_front().expect("test queued enough replies"))
    }
}

struct NullDriver;
impl CardDriver<FakeTransport> for NullDriver {}

#[test]
fn identify_matches_exact_atr_only() {
    let mut registry: CardRegistry<FakeTransport> = CardRegistry::new();
    registry.register(vec![0x3b, 0x00], "Card A", 0, Box::new(NullDriver));
    registry.register(vec![0x3b, 0x01], "Card B", 1, Box::new(NullDriver));

    let entry = registry.identify(&[0x3b, 0x01]).unwrap();
    assert_eq!(entry.name(), "Card B");
    assert_eq!(entry.variant(), 1);
    assert!(registry.identify(&[0x3b, 0x02]).is_none());
}

#[test]
fn unimplemented_driver_capabilities_use_documented_defaults() {
    let mut transport = FakeTransport {
        replies: VecDeque::new(),
    };
    let mut registry: CardRegistry<FakeTransport> = CardRegistry::new();
    registry.register(vec![0x3b, 0x00], "Card A", 0, Box::new(NullDriver));
    let entry = registry.identify(&[0x3b, 0x00]).unwrap();
    let mut card = entry.create_card(&mut transport, 0);

    assert!(entry.driver().connect(&mut card).is_ok());
    assert!(matches!(
        entry.driver().verify(&mut card, None),
        Err(CardError::OperationUnsupported)
    ));
    assert!(matches!(
        entry.driver().decipher(&mut card, &[0u8; 128]),
        Err(CardError::OperationUnsupported)
    ));
    assert!(matches!(
        entry.driver().set_option(&mut card, "k", "v"),
        Err(CardError::OperationUnsupported)
    ));
}

#[test]
fn card_apdu_strips_status_word_from_reply() {
    let mut transport = FakeTransport {
        replies: VecDeque::from(vec![vec![0x01, 0x02, 0x90, 0x00]]),
    };
    let mut registry: CardRegistry<FakeTransport> = CardRegistry::new();
    registry.register(vec![0x3b, 0x00], "Card A", 0, Box::new(NullDriver));
    let entry = registry.identify(&[0x3b, 0x00]).unwrap();
    let mut card = entry.create_card(&mut transport, 0);

    let (data, sw) = card.apdu(0x00, 0xa4, 0x04, 0x00, &[]).unwrap();
    assert_eq!(data, vec![0x01, 0x02]);
    assert_eq!(sw, 0x9000);
    assert!(card.pin_required);
}
