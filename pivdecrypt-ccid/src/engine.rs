//! The CCID reader state machine: packet framing, sequencing, retries,
//! slot status, power-on voltage fallback, and APDU transfer (§4.D).

use crate::error::CcidError;
use crate::wire::{command, command_status, icc_status, response, voltage_index, HEADER_LEN};
use pivdecrypt_buffer::Buffer;
use pivdecrypt_usb::wire::{feature, protocol, voltage, CcidDescriptor};
use std::time::Duration;

/// A blocking, timeout-bounded bulk channel to a single CCID reader.
///
/// Implemented by [`pivdecrypt_usb::transport::UsbDevice`] in production;
/// tests exercise a `mockall` double instead.
pub trait CcidTransport {
    /// Transport-level error (I/O error, timeout, stall, ...).
    type Error: std::fmt::Display;

    /// Blocking bulk write of a whole CCID packet.
    fn send(&mut self, data: &[u8], timeout: Duration) -> Result<usize, Self::Error>;

    /// Blocking bulk read of up to `buf.len()` bytes.
    fn recv(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, Self::Error>;
}

const SEND_TIMEOUT: Duration = Duration::from_secs(10);
const RECV_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_RETRIES: u32 = 6;

/// A decoded CCID response packet: header fields plus a payload view.
#[derive(Debug, Clone)]
struct Response {
    msg_type: u8,
    slot: u8,
    seq: u8,
    ctl: [u8; 3],
    payload: Vec<u8>,
}

fn parse_response(bytes: &[u8]) -> Result<Response, CcidError> {
    if bytes.len() < HEADER_LEN {
        return Err(CcidError::MalformedResponse);
    }
    let mut buf = Buffer::from_vec(bytes.to_vec());
    let msg_type = buf.get_u8().ok_or(CcidError::MalformedResponse)?;
    let length = buf.get_u32le().ok_or(CcidError::MalformedResponse)? as usize;
    let slot = buf.get_u8().ok_or(CcidError::MalformedResponse)?;
    let seq = buf.get_u8().ok_or(CcidError::MalformedResponse)?;
    let mut ctl = [0u8; 3];
    if !buf.consume(&mut ctl) {
        return Err(CcidError::MalformedResponse);
    }
    if !buf.truncate(length) {
        return Err(CcidError::MalformedResponse);
    }
    let payload = buf.remaining().to_vec();
    Ok(Response {
        msg_type,
        slot,
        seq,
        ctl,
        payload,
    })
}

fn build_command(cmd: u8, slot: u8, seq: u8, ctl: [u8; 3], payload: &[u8]) -> Vec<u8> {
    let mut buf = Buffer::alloc(HEADER_LEN + payload.len());
    buf.put_u8(cmd);
    buf.put_u32le(payload.len() as u32);
    buf.put_u8(slot);
    buf.put_u8(seq);
    buf.append(&ctl);
    buf.append(payload);
    buf.written().to_vec()
}

/// A CCID reader: its cached descriptor-derived capabilities plus the
/// mutable sequence counter and slot selection.
pub struct CcidReader<T: CcidTransport> {
    transport: T,
    max_message_size: usize,
    supported_voltages: u8,
    supported_protocols: u32,
    auto_voltage: bool,
    current_slot: Option<u8>,
    seq: u8,
}

impl<T: CcidTransport> CcidReader<T> {
    /// Construct a reader bound to `transport`, validating that the
    /// device's CCID descriptor declares APDU-exchange support and at
    /// least one protocol (T=0 or T=1) this engine understands.
    pub fn new(transport: T, descriptor: &CcidDescriptor) -> Result<Self, CcidError> {
        if descriptor.dwFeatures & feature::APDU_EXCHANGE_MASK == 0 {
            return Err(CcidError::ApduExchangeUnsupported);
        }
        if descriptor.dwProtocols & (protocol::T0 | protocol::T1) == 0 {
            return Err(CcidError::NoSupportedProtocol);
        }
        let auto_voltage =
            descriptor.dwFeatures & (feature::AUTO_ACTIVATE | feature::AUTO_VOLTAGE) != 0;
        Ok(CcidReader {
            transport,
            max_message_size: descriptor.dwMaxCCIDMessageLength as usize,
            supported_voltages: descriptor.bVoltageSupport,
            supported_protocols: descriptor.dwProtocols,
            auto_voltage,
            current_slot: None,
            seq: 0,
        })
    }

    /// The protocol bitmap (§4.D's `dwProtocols`) this reader declared support for.
    pub fn supported_protocols(&self) -> u32 {
        self.supported_protocols
    }

    /// The slot currently selected, if any.
    pub fn current_slot(&self) -> Option<u8> {
        self.current_slot
    }

    /// The next sequence number that will be stamped on an outgoing command.
    pub fn next_seq(&self) -> u8 {
        self.seq
    }

    /// Send one command and run the retry loop (§4.D's "Transfer loop"),
    /// returning the matched response's payload and control bytes.
    fn transact(
        &mut self,
        slot: u8,
        cmd: u8,
        ctl: [u8; 3],
        payload: &[u8],
        expect: u8,
    ) -> Result<(Vec<u8>, [u8; 3]), CcidError> {
        let seq = self.seq;
        let packet = build_command(cmd, slot, seq, ctl, payload);

        self.transport
            .send(&packet, SEND_TIMEOUT)
            .map_err(|e| CcidError::Transport(e.to_string()))?;
        self.seq = seq.wrapping_add(1);

        let mut retries = MAX_RETRIES;
        loop {
            if retries == 0 {
                return Err(CcidError::TooManyRetries);
            }
            retries -= 1;

            let mut raw = vec![0u8; self.max_message_size.max(HEADER_LEN)];
            let n = self
                .transport
                .recv(&mut raw, RECV_TIMEOUT)
                .map_err(|e| CcidError::Transport(e.to_string()))?;
            raw.truncate(n);
            let resp = parse_response(&raw)?;

            if resp.slot != slot || resp.seq != seq {
                continue;
            }
            match resp.ctl[0] & command_status::MASK {
                command_status::TIME_EXTENSION => {
                    log::debug!("slot {slot} requested a time extension, {retries} retries left");
                    continue;
                }
                command_status::SUCCESS => {
                    if resp.msg_type != expect {
                        return Err(CcidError::UnexpectedResponseType {
                            expected: expect,
                            actual: resp.msg_type,
                        });
                    }
                    return Ok((resp.payload, resp.ctl));
                }
                _ => return Err(CcidError::CommandFailed(resp.ctl[1])),
            }
        }
    }

    /// Send `GET_SLOT_STATUS` and report whether a card is present.
    pub fn card_present(&mut self, slot: u8) -> Result<bool, CcidError> {
        let (_, ctl) = self.transact(
            slot,
            command::GET_SLOT_STATUS,
            [0, 0, 0],
            &[],
            response::SLOT_STATUS,
        )?;
        Ok(ctl[0] & icc_status::MASK != icc_status::NO_ICC_PRESENT)
    }

    /// Power on the card in `slot`, trying voltages per §4.D, and return
    /// its ATR.
    pub fn power_on(&mut self, slot: u8) -> Result<Vec<u8>, CcidError> {
        let attempts: Vec<u8> = if self.auto_voltage {
            vec![voltage_index::AUTO]
        } else {
            let mut v = Vec::new();
            if self.supported_voltages & voltage::V5_0 != 0 {
                v.push(voltage_index::V5_0);
            }
            if self.supported_voltages & voltage::V3_0 != 0 {
                v.push(voltage_index::V3_0);
            }
            if self.supported_voltages & voltage::V1_8 != 0 {
                v.push(voltage_index::V1_8);
            }
            if v.is_empty() {
                return Err(CcidError::NoSupportedVoltage);
            }
            v
        };

        for voltage_idx in attempts {
            let ctl = [voltage_idx, 0, 0];
            match self.transact(slot, command::ICC_POWER_ON, ctl, &[], response::DATA) {
                Ok((atr, _)) => {
                    log::info!("slot {slot} powered on at voltage index {voltage_idx}, ATR {atr:02x?}");
                    self.current_slot = Some(slot);
                    return Ok(atr);
                }
                Err(e) => log::debug!("power-on at voltage index {voltage_idx} failed: {e}"),
            }
        }
        Err(CcidError::PowerOnFailed)
    }

    /// Wrap `apdu` in an `XFR_BLOCK` command and return the card's reply.
    pub fn transfer_apdu(&mut self, slot: u8, apdu: &[u8]) -> Result<Vec<u8>, CcidError> {
        let (payload, _) =
            self.transact(slot, command::XFR_BLOCK, [0, 0, 0], apdu, response::DATA)?;
        Ok(payload)
    }
}

#[cfg(test)]
#[path = "tests/engine.rs"]
mod tests;
