//! Packed, on-the-wire USB descriptor layouts.
//!
//! These mirror the USB 2.0 specification's standard descriptor byte
//! layouts exactly, so a slice straight off the bus can be reinterpreted
//! in place via [`bytemuck::try_from_bytes`] with no copying.

use bytemuck::{Pod, Zeroable};

/// `bDescriptorType` values this workspace cares about.
pub mod descriptor_type {
    /// Standard device descriptor.
    pub const DEVICE: u8 = 0x01;
    /// Standard configuration descriptor.
    pub const CONFIGURATION: u8 = 0x02;
    /// Standard interface descriptor.
    pub const INTERFACE: u8 = 0x04;
    /// Standard endpoint descriptor.
    pub const ENDPOINT: u8 = 0x05;
}

/// `bInterfaceClass` value for the USB chip/smart-card interface device class.
pub const CLASS_CCID: u8 = 0x0B;

/// A single class/subclass/protocol component match, either a wildcard or
/// an exact byte.
///
/// The USB class tables this workspace consults use `0xFF` as "matches
/// anything"; representing that as a tagged variant rather than leaving
/// the `0xFF` sentinel to be checked by hand keeps the wildcard intent
/// explicit at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match {
    /// Matches any byte value.
    Any,
    /// Matches only this exact byte value.
    Exact(u8),
}

impl Match {
    /// Does `value` satisfy this match?
    pub fn matches(self, value: u8) -> bool {
        match self {
            Match::Any => true,
            Match::Exact(v) => v == value,
        }
    }
}

/// A named class/subclass/protocol entry in the interface-type table.
pub struct InterfaceType {
    pub name: &'static str,
    pub class: Match,
    pub subclass: Match,
    pub protocol: Match,
}

impl InterfaceType {
    fn matches(&self, class_triple: (u8, u8, u8)) -> bool {
        let (class, subclass, protocol) = class_triple;
        self.class.matches(class) && self.subclass.matches(subclass) && self.protocol.matches(protocol)
    }
}

/// The interface types this workspace recognizes. Other device classes
/// (HID, mass storage, ...) are out of scope, so only CCID is listed.
const INTERFACE_TYPES: &[InterfaceType] = &[InterfaceType {
    name: "ccid",
    class: Match::Exact(CLASS_CCID),
    subclass: Match::Any,
    protocol: Match::Any,
}];

/// Look up an interface's type by its (class, subclass, protocol) triple,
/// per the USB class table convention of treating `0xFF` as a wildcard.
pub fn find_interface_type(class_triple: (u8, u8, u8)) -> Option<&'static InterfaceType> {
    INTERFACE_TYPES.iter().find(|t| t.matches(class_triple))
}

/// The standard USB device descriptor.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
#[allow(non_snake_case)]
pub struct DeviceDescriptor {
    pub bLength: u8,
    pub bDescriptorType: u8,
    pub bcdUSB: u16,
    pub bDeviceClass: u8,
    pub bDeviceSubClass: u8,
    pub bDeviceProtocol: u8,
    pub bMaxPacketSize0: u8,
    pub idVendor: u16,
    pub idProduct: u16,
    pub bcdDevice: u16,
    pub iManufacturer: u8,
    pub iProduct: u8,
    pub iSerialNumber: u8,
    pub bNumConfigurations: u8,
}

/// The standard USB configuration descriptor.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
#[allow(non_snake_case)]
pub struct ConfigurationDescriptor {
    pub bLength: u8,
    pub bDescriptorType: u8,
    pub wTotalLength: u16,
    pub bNumInterfaces: u8,
    pub bConfigurationValue: u8,
    pub iConfiguration: u8,
    pub bmAttributes: u8,
    pub bMaxPower: u8,
}

/// The standard USB interface descriptor.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
#[allow(non_snake_case)]
pub struct InterfaceDescriptor {
    pub bLength: u8,
    pub bDescriptorType: u8,
    pub bInterfaceNumber: u8,
    pub bAlternateSetting: u8,
    pub bNumEndpoints: u8,
    pub bInterfaceClass: u8,
    pub bInterfaceSubClass: u8,
    pub bInterfaceProtocol: u8,
    pub iInterface: u8,
}

impl InterfaceDescriptor {
    /// Class/subclass/protocol as exact-match components.
    pub fn class_triple(&self) -> (u8, u8, u8) {
        (
            self.bInterfaceClass,
            self.bInterfaceSubClass,
            self.bInterfaceProtocol,
        )
    }
}

/// `bmAttributes & ENDPOINT_TYPE_MASK` values.
pub mod endpoint_type {
    pub const MASK: u8 = 0x03;
    pub const CONTROL: u8 = 0x00;
    pub const ISOCHRONOUS: u8 = 0x01;
    pub const BULK: u8 = 0x02;
    pub const INTERRUPT: u8 = 0x03;
}

/// `bEndpointAddress & DIRECTION_MASK`.
pub mod endpoint_direction {
    pub const MASK: u8 = 0x80;
    pub const OUT: u8 = 0x00;
    pub const IN: u8 = 0x80;
}

/// The standard USB endpoint descriptor.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
#[allow(non_snake_case)]
pub struct EndpointDescriptor {
    pub bLength: u8,
    pub bDescriptorType: u8,
    pub bEndpointAddress: u8,
    pub bmAttributes: u8,
    pub wMaxPacketSize: u16,
    pub bInterval: u8,
}

impl EndpointDescriptor {
    /// The endpoint transfer type, masked out of `bmAttributes`.
    pub fn transfer_type(&self) -> u8 {
        self.bmAttributes & endpoint_type::MASK
    }

    /// The endpoint direction, masked out of `bEndpointAddress`.
    pub fn direction(&self) -> u8 {
        self.bEndpointAddress & endpoint_direction::MASK
    }

    /// The endpoint number, 0..=15, with direction bit stripped.
    pub fn number(&self) -> u8 {
        self.bEndpointAddress & 0x0F
    }
}

/// The CCID class-specific functional descriptor's 20 fields, per the
/// USB CCID class specification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(non_snake_case)]
pub struct CcidDescriptor {
    pub bcdCCID: u16,
    pub bMaxSlotIndex: u8,
    pub bVoltageSupport: u8,
    pub dwProtocols: u32,
    pub dwDefaultClock: u32,
    pub dwMaximumClock: u32,
    pub bNumClockRatesSupported: u8,
    pub dwDataRate: u32,
    pub dwMaxDataRate: u32,
    pub bNumDataRatesSupported: u8,
    pub dwMaxIFSD: u32,
    pub dwSynchProtocols: u32,
    pub dwMechanical: u32,
    pub dwFeatures: u32,
    pub dwMaxCCIDMessageLength: u32,
    pub bClassGetResponse: u8,
    pub bClassEnvelope: u8,
    pub wLcdLayout: u16,
    pub bPINSupport: u8,
    pub bMaxCCIDBusySlots: u8,
}

/// Voltage-support bitmap bits, per §4.D.
pub mod voltage {
    pub const V5_0: u8 = 0x01;
    pub const V3_0: u8 = 0x02;
    pub const V1_8: u8 = 0x04;
}

/// Protocol bitmap bits within `dwProtocols`.
pub mod protocol {
    pub const T0: u32 = 0x01;
    pub const T1: u32 = 0x02;
}

/// Feature bits within `dwFeatures` relevant to this workspace.
pub mod feature {
    /// The reader performs automatic parameter configuration on ATR.
    pub const AUTO_ACTIVATE: u32 = 0x0004;
    /// The reader picks the ICC's operating voltage automatically.
    pub const AUTO_VOLTAGE: u32 = 0x0008;
    /// Bits that together indicate short- or extended-APDU exchange level.
    pub const APDU_EXCHANGE_MASK: u32 = 0x0006_0000;
}
