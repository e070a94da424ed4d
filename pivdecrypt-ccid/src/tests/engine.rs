use super::*;
use crate::wire::command_status;
use mockall::{mock, Sequence};
use pivdecrypt_usb::wire::{feature, protocol, CcidDescriptor};

mock! {
    pub Transport {}

    impl CcidTransport for Transport {
        type Error = std::convert::Infallible;

        fn send(&mut self, data: &[u8], timeout: Duration) -> Result<usize, std::convert::Infallible>;
        fn recv(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, std::convert::Infallible>;
    }
}

/// Accept any `send` call, any number of times; these tests only care about
/// what comes back on `recv`.
fn allow_any_send(t: &mut MockTransport) {
    t.expect_send().returning(|data, _| Ok(data.len()));
}

fn expect_recv_once(t: &mut MockTransport, seq: &mut Sequence, reply: Vec<u8>) {
    t.expect_recv()
        .times(1)
        .in_sequence(seq)
        .returning(move |buf, _| {
            buf[..reply.len()].copy_from_slice(&reply);
            Ok(reply.len())
        });
}

fn descriptor(voltages: u8, auto: bool) -> CcidDescriptor {
    CcidDescriptor {
        bVoltageSupport: voltages,
        dwMaxCCIDMessageLength: 271,
        dwFeatures: feature::APDU_EXCHANGE_MASK
            | if auto { feature::AUTO_VOLTAGE } else { 0 },
        dwProtocols: protocol::T0,
        ..Default::default()
    }
}

fn packet(msg_type: u8, slot: u8, seq: u8, ctl: [u8; 3], payload: &[u8]) -> Vec<u8> {
    let mut v = vec![msg_type];
    v.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    v.push(slot);
    v.push(seq);
    v.extend_from_slice(&ctl);
    v.extend_from_slice(payload);
    v
}

#[test]
fn sequence_advances_after_each_successful_transfer() {
    let mut transport = MockTransport::new();
    allow_any_send(&mut transport);
    let mut seq = Sequence::new();
    for n in 0..3 {
        expect_recv_once(
            &mut transport,
            &mut seq,
            packet(response::DATA, 0, n, [0, 0, 0], &[0x90, 0x00]),
        );
    }
    let desc = descriptor(0, true);
    let mut reader = CcidReader::new(transport, &desc).unwrap();
    for _ in 0..3 {
        reader.transfer_apdu(0, &[0x00, 0xA4]).unwrap();
    }
    assert_eq!(reader.next_seq(), 3);
}

#[test]
fn retry_succeeds_under_six_time_extensions() {
    let mut transport = MockTransport::new();
    allow_any_send(&mut transport);
    let mut seq = Sequence::new();
    for _ in 0..5 {
        expect_recv_once(
            &mut transport,
            &mut seq,
            packet(response::DATA, 0, 0, [command_status::TIME_EXTENSION, 0, 0], &[]),
        );
    }
    expect_recv_once(
        &mut transport,
        &mut seq,
        packet(response::DATA, 0, 0, [0, 0, 0], &[0x90, 0x00]),
    );
    let desc = descriptor(0, true);
    let mut reader = CcidReader::new(transport, &desc).unwrap();
    let result = reader.transfer_apdu(0, &[0x00]).unwrap();
    assert_eq!(result, vec![0x90, 0x00]);
}

#[test]
fn retry_fails_after_six_time_extensions() {
    let mut transport = MockTransport::new();
    allow_any_send(&mut transport);
    let mut seq = Sequence::new();
    for _ in 0..6 {
        expect_recv_once(
            &mut transport,
            &mut seq,
            packet(response::DATA, 0, 0, [command_status::TIME_EXTENSION, 0, 0], &[]),
        );
    }
    let desc = descriptor(0, true);
    let mut reader = CcidReader::new(transport, &desc).unwrap();
    let err = reader.transfer_apdu(0, &[0x00]).unwrap_err();
    assert!(matches!(err, CcidError::TooManyRetries));
}

#[test]
fn voltage_fallback_tries_single_bit_once() {
    // bitmap 0b010 == 3V only, auto_voltage unset.
    let mut transport = MockTransport::new();
    allow_any_send(&mut transport);
    let mut seq = Sequence::new();
    expect_recv_once(
        &mut transport,
        &mut seq,
        packet(response::DATA, 0, 0, [0, 0, 0], b"ATR".as_slice()),
    );
    let desc = descriptor(0b010, false);
    let mut reader = CcidReader::new(transport, &desc).unwrap();
    let atr = reader.power_on(0).unwrap();
    assert_eq!(atr, b"ATR");
}

#[test]
fn voltage_fallback_proceeds_through_all_three() {
    // bitmap 0b111, first two voltage attempts fail, third succeeds.
    let mut transport = MockTransport::new();
    allow_any_send(&mut transport);
    let mut seq = Sequence::new();
    expect_recv_once(&mut transport, &mut seq, packet(response::DATA, 0, 0, [0x01, 0x42, 0], &[]));
    expect_recv_once(&mut transport, &mut seq, packet(response::DATA, 0, 1, [0x01, 0x42, 0], &[]));
    expect_recv_once(
        &mut transport,
        &mut seq,
        packet(response::DATA, 0, 2, [0, 0, 0], b"ATR".as_slice()),
    );
    let desc = descriptor(0b111, false);
    let mut reader = CcidReader::new(transport, &desc).unwrap();
    let atr = reader.power_on(0).unwrap();
    assert_eq!(atr, b"ATR");
}

#[test]
fn apdu_exchange_unsupported_is_rejected_at_construction() {
    let transport = MockTransport::new();
    let desc = CcidDescriptor {
        dwFeatures: 0,
        ..Default::default()
    };
    let err = CcidReader::new(transport, &desc).unwrap_err();
    assert!(matches!(err, CcidError::ApduExchangeUnsupported));
}

#[test]
fn no_supported_protocol_is_rejected_at_construction() {
    let transport = MockTransport::new();
    let desc = CcidDescriptor {
        dwFeatures: feature::APDU_EXCHANGE_MASK,
        dwProtocols: 0,
        ..Default::default()
    };
    let err = CcidReader::new(transport, &desc).unwrap_err();
    assert!(matches!(err, CcidError::NoSupportedProtocol));
}

#[test]
fn slot_status_reports_card_absent() {
    let mut transport = MockTransport::new();
    allow_any_send(&mut transport);
    let mut seq = Sequence::new();
    expect_recv_once(&mut transport, &mut seq, packet(response::SLOT_STATUS, 0, 0, [0x02, 0, 0], &[]));
    let desc = descriptor(0, true);
    let mut reader = CcidReader::new(transport, &desc).unwrap();
    assert!(!reader.card_present(0).unwrap());
}
