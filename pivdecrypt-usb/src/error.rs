//! Error taxonomy for descriptor parsing and the USB transport.

use thiserror::Error;

/// Failures while walking a raw descriptor blob (§4.B).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptorError {
    /// A descriptor's declared length runs past the end of the blob.
    #[error("descriptor record at offset {pos} is truncated or overruns the buffer")]
    TruncatedRecord {
        /// Byte offset of the offending record.
        pos: usize,
    },
    /// The first descriptor in the blob was not a device descriptor.
    #[error("first descriptor is not a device descriptor")]
    DeviceNotFirst,
    /// A second device descriptor appeared in the same blob.
    #[error("duplicate device descriptor")]
    DuplicateDevice,
    /// More configuration descriptors appeared than `bNumConfigurations` declared.
    #[error("too many configuration descriptors")]
    TooManyConfigurations,
    /// An interface descriptor appeared before any configuration descriptor.
    #[error("interface descriptor precedes first configuration descriptor")]
    InterfaceBeforeConfiguration,
    /// More interface descriptors appeared than `bNumInterfaces` declared.
    #[error("too many interface descriptors")]
    TooManyInterfaces,
    /// An endpoint descriptor appeared before any interface descriptor.
    #[error("endpoint descriptor precedes first interface descriptor")]
    EndpointBeforeInterface,
    /// More endpoint descriptors appeared than `bNumEndpoints` declared.
    #[error("too many endpoint descriptors")]
    TooManyEndpoints,
    /// A fixed-layout record didn't reinterpret cleanly as its descriptor type.
    #[error("malformed {0} descriptor")]
    Malformed(&'static str),
    /// No interface in the descriptor tree carried a CCID functional descriptor.
    #[error("device has no CCID interface")]
    NoCcidInterface,
}

/// Failures in the sysfs/usbdevfs transport layer (§4.C).
#[derive(Debug, Error)]
pub enum UsbError {
    /// The sysfs devices root could not be enumerated.
    #[error("cannot read {path}: {source}")]
    SysfsUnreadable {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// No device matched the requested vendor/product selector.
    #[error("no USB device found matching {0}")]
    NoMatchingDevice(String),
    /// The resolved `/dev/bus/usb/<bus>/<addr>` path did not match the
    /// device's reported `dev` major:minor, or was not a character device.
    #[error("device file {path} does not match expected device node")]
    DeviceFileMismatch {
        /// Path that failed verification.
        path: String,
    },
    /// `bNumConfigurations` was more than one but `SET_CONFIGURATION` failed,
    /// or the interface number was nonzero but `CLAIM_INTERFACE` failed.
    #[error("failed to claim USB interface: {0}")]
    ClaimRefused(std::io::Error),
    /// A bulk transfer did not complete within its timeout, or the kernel
    /// reported a transfer error.
    #[error("bulk transfer on endpoint {endpoint:#x} failed: {source}")]
    BulkTransfer {
        /// The endpoint address involved.
        endpoint: u8,
        /// Underlying I/O error (including timeout).
        #[source]
        source: std::io::Error,
    },
    /// The descriptor blob read from sysfs failed to parse.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
    /// Opening the device file itself failed.
    #[error("cannot open device file {path}: {source}")]
    OpenDeviceFile {
        /// Path that failed to open.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
