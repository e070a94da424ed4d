//! USB descriptor parsing and bulk transport for locating and talking to
//! a CCID reader.
//!
//! [`wire`] defines the on-the-wire descriptor layouts; [`descriptor`]
//! walks a raw descriptor blob into those types; [`device`] assembles
//! the walk into an owned tree; [`transport`] (Linux only) finds a
//! device in sysfs, selects its CCID interface, and performs bulk I/O.

#![warn(missing_docs)]

pub mod descriptor;
pub mod device;
pub mod error;
pub mod wire;

#[cfg(target_os = "linux")]
pub mod transport;

#[cfg(test)]
pub(crate) mod tests_support;

pub use descriptor::{parse_descriptors, DescriptorVisitor};
pub use device::{build_device_tree, Configuration, DeviceTree, Interface};
pub use error::{DescriptorError, UsbError};
