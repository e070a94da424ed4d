//! Walking a raw USB descriptor blob into device/configuration/interface/
//! endpoint events, per §4.B.

use crate::error::DescriptorError;
use crate::wire::{
    self, CcidDescriptor, ConfigurationDescriptor, DeviceDescriptor,
    EndpointDescriptor, InterfaceDescriptor,
};
use pivdecrypt_buffer::Buffer;

/// The CCID class-specific functional descriptor's `bDescriptorType`.
const CCID_FUNCTIONAL_DESCRIPTOR: u8 = 0x21;

/// Callbacks fired while walking a descriptor blob.
///
/// All methods have a no-op default; implement only the ones you need.
/// [`parse_descriptors`] guarantees `on_configuration` always precedes the
/// `on_interface` calls for interfaces in that configuration, which in
/// turn always precede the `on_endpoint` calls for endpoints on that
/// interface, and `on_ccid` (if called at all) follows the `on_interface`
/// call for the interface it belongs to.
pub trait DescriptorVisitor {
    /// The device descriptor, always the first callback if any fires.
    fn on_device(&mut self, _d: &DeviceDescriptor) {}
    /// A configuration descriptor.
    fn on_configuration(&mut self, _c: &ConfigurationDescriptor) {}
    /// An interface descriptor.
    fn on_interface(&mut self, _i: &InterfaceDescriptor) {}
    /// An endpoint descriptor.
    fn on_endpoint(&mut self, _e: &EndpointDescriptor) {}
    /// The CCID class-specific functional descriptor for the current interface.
    fn on_ccid(&mut self, _c: &CcidDescriptor) {}
    /// Any other descriptor type, handed the raw record including its
    /// length/type header.
    fn on_other(&mut self, _record: &[u8]) {}
}

/// Parse the CCID functional descriptor's 20 fields out of its record
/// (including the 2-byte length/type header).
fn parse_ccid_descriptor(record: &[u8]) -> Result<CcidDescriptor, DescriptorError> {
    if record.len() < 2 {
        return Err(DescriptorError::Malformed("ccid"));
    }
    let mut buf = Buffer::from_vec(record[2..].to_vec());
    let err = || DescriptorError::Malformed("ccid");
    Ok(CcidDescriptor {
        bcdCCID: buf.get_u16le().ok_or_else(err)?,
        bMaxSlotIndex: buf.get_u8().ok_or_else(err)?,
        bVoltageSupport: buf.get_u8().ok_or_else(err)?,
        dwProtocols: buf.get_u32le().ok_or_else(err)?,
        dwDefaultClock: buf.get_u32le().ok_or_else(err)?,
        dwMaximumClock: buf.get_u32le().ok_or_else(err)?,
        bNumClockRatesSupported: buf.get_u8().ok_or_else(err)?,
        dwDataRate: buf.get_u32le().ok_or_else(err)?,
        dwMaxDataRate: buf.get_u32le().ok_or_else(err)?,
        bNumDataRatesSupported: buf.get_u8().ok_or_else(err)?,
        dwMaxIFSD: buf.get_u32le().ok_or_else(err)?,
        dwSynchProtocols: buf.get_u32le().ok_or_else(err)?,
        dwMechanical: buf.get_u32le().ok_or_else(err)?,
        dwFeatures: buf.get_u32le().ok_or_else(err)?,
        dwMaxCCIDMessageLength: buf.get_u32le().ok_or_else(err)?,
        bClassGetResponse: buf.get_u8().ok_or_else(err)?,
        bClassEnvelope: buf.get_u8().ok_or_else(err)?,
        wLcdLayout: buf.get_u16le().ok_or_else(err)?,
        bPINSupport: buf.get_u8().ok_or_else(err)?,
        bMaxCCIDBusySlots: buf.get_u8().ok_or_else(err)?,
    })
}

/// Walk `buf` as a sequence of `length, type, ...` descriptor records,
/// firing `visitor`'s callbacks and enforcing the structural rules of
/// §4.B: the first record must be a device descriptor, configuration/
/// interface/endpoint counts may not exceed what the device/configuration
/// declared, and endpoints/interfaces may not precede their parent.
pub fn parse_descriptors<V: DescriptorVisitor>(
    buf: &[u8],
    visitor: &mut V,
) -> Result<(), DescriptorError> {
    let mut pos = 0usize;
    let mut seen_device = false;
    let mut configs_expected = 0u8;
    let mut configs_seen = 0u8;
    let mut have_config = false;
    let mut interfaces_expected = 0u8;
    let mut interfaces_seen = 0u8;
    let mut have_interface = false;
    let mut endpoints_expected = 0u8;
    let mut endpoints_seen = 0u8;
    let mut current_interface_is_ccid = false;

    while pos + 2 <= buf.len() {
        let dlen = buf[pos] as usize;
        let dtype = buf[pos + 1];
        if dlen < 2 || pos + dlen > buf.len() {
            log::warn!("descriptor record at offset {pos} claims length {dlen}, past buffer end");
            return Err(DescriptorError::TruncatedRecord { pos });
        }
        let record = &buf[pos..pos + dlen];

        match dtype {
            wire::descriptor_type::DEVICE => {
                if seen_device {
                    return Err(DescriptorError::DuplicateDevice);
                }
                if pos != 0 {
                    return Err(DescriptorError::DeviceNotFirst);
                }
                let d: DeviceDescriptor = *bytemuck::try_from_bytes(record)
                    .map_err(|_| DescriptorError::Malformed("device"))?;
                configs_expected = d.bNumConfigurations;
                seen_device = true;
                visitor.on_device(&d);
            }
            wire::descriptor_type::CONFIGURATION => {
                if !seen_device {
                    return Err(DescriptorError::DeviceNotFirst);
                }
                if configs_seen >= configs_expected {
                    return Err(DescriptorError::TooManyConfigurations);
                }
                let c: ConfigurationDescriptor = *bytemuck::try_from_bytes(record)
                    .map_err(|_| DescriptorError::Malformed("configuration"))?;
                configs_seen += 1;
                interfaces_expected = c.bNumInterfaces;
                interfaces_seen = 0;
                have_config = true;
                have_interface = false;
                current_interface_is_ccid = false;
                visitor.on_configuration(&c);
            }
            wire::descriptor_type::INTERFACE => {
                if !have_config {
                    return Err(DescriptorError::InterfaceBeforeConfiguration);
                }
                if interfaces_seen >= interfaces_expected {
                    return Err(DescriptorError::TooManyInterfaces);
                }
                let i: InterfaceDescriptor = *bytemuck::try_from_bytes(record)
                    .map_err(|_| DescriptorError::Malformed("interface"))?;
                interfaces_seen += 1;
                endpoints_expected = i.bNumEndpoints;
                endpoints_seen = 0;
                have_interface = true;
                current_interface_is_ccid = wire::find_interface_type(i.class_triple())
                    .is_some_and(|t| t.name == "ccid");
                visitor.on_interface(&i);
            }
            wire::descriptor_type::ENDPOINT => {
                if !have_interface {
                    return Err(DescriptorError::EndpointBeforeInterface);
                }
                if endpoints_seen >= endpoints_expected {
                    return Err(DescriptorError::TooManyEndpoints);
                }
                let e: EndpointDescriptor = *bytemuck::try_from_bytes(record)
                    .map_err(|_| DescriptorError::Malformed("endpoint"))?;
                endpoints_seen += 1;
                visitor.on_endpoint(&e);
            }
            CCID_FUNCTIONAL_DESCRIPTOR if current_interface_is_ccid => {
                let ccid = parse_ccid_descriptor(record)?;
                visitor.on_ccid(&ccid);
            }
            _ => visitor.on_other(record),
        }
        pos += dlen;
    }

    if !seen_device {
        return Err(DescriptorError::DeviceNotFirst);
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/descriptor.rs"]
mod tests;
