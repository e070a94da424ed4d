//! Linux sysfs device discovery and `/dev/bus/usb` bulk transport (§4.C).
//!
//! This backend is the only one shipped; the device/tree abstractions in
//! [`crate::device`] are host-independent, so another platform's bulk
//! transport could be substituted behind the same [`UsbDevice`] surface.

use crate::device::{build_device_tree, DeviceTree};
use crate::error::{DescriptorError, UsbError};
use crate::wire::{endpoint_direction, endpoint_type};
use std::fs;
use std::io;
use std::os::unix::fs::{FileTypeExt, MetadataExt};
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};
use std::time::Duration;

const SYSFS_USB_DEVICES: &str = "/sys/bus/usb/devices";

/// Vendor/product selector read from the `-T vvvv[:pppp]` flag.
///
/// `0` at either position means "any", matching the `idVendor`/
/// `idProduct` sysfs convention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceSelector {
    pub vendor: u16,
    pub product: u16,
}

impl DeviceSelector {
    fn matches(&self, vendor: u16, product: u16) -> bool {
        (self.vendor == 0 || self.vendor == vendor)
            && (self.product == 0 || self.product == product)
    }
}

impl std::fmt::Display for DeviceSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor, self.product)
    }
}

fn sysfs_read_line(path: &Path) -> io::Result<String> {
    Ok(fs::read_to_string(path)?.trim().to_string())
}

fn sysfs_read_hex_u16(path: &Path) -> io::Result<u16> {
    let s = sysfs_read_line(path)?;
    u16::from_str_radix(&s, 16).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn sysfs_read_decimal_u32(path: &Path) -> io::Result<u32> {
    let s = sysfs_read_line(path)?;
    s.parse().map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Enumerate `/sys/bus/usb/devices`, returning the sysfs directory of the
/// first entry whose `idVendor`/`idProduct` match `selector`.
pub fn find_device(selector: DeviceSelector) -> Result<PathBuf, UsbError> {
    let root = Path::new(SYSFS_USB_DEVICES);
    let entries = fs::read_dir(root).map_err(|e| UsbError::SysfsUnreadable {
        path: root.display().to_string(),
        source: e,
    })?;
    for entry in entries.flatten() {
        let path = entry.path();
        let vendor = match sysfs_read_hex_u16(&path.join("idVendor")) {
            Ok(v) => v,
            Err(_) => continue,
        };
        let product = match sysfs_read_hex_u16(&path.join("idProduct")) {
            Ok(v) => v,
            Err(_) => continue,
        };
        if selector.matches(vendor, product) {
            log::debug!("matched device {vendor:04x}:{product:04x} at {}", path.display());
            return Ok(path);
        }
    }
    log::warn!("no device matching {selector} found under {}", root.display());
    Err(UsbError::NoMatchingDevice(selector.to_string()))
}

/// Resolve `sysfs_path` to its `/dev/bus/usb/<bus>/<addr>` device file,
/// verifying it is a character device whose major:minor matches the
/// sysfs `dev` entry.
fn attach(sysfs_path: &Path) -> Result<PathBuf, UsbError> {
    let busnum = sysfs_read_decimal_u32(&sysfs_path.join("busnum")).map_err(|e| {
        UsbError::SysfsUnreadable {
            path: sysfs_path.join("busnum").display().to_string(),
            source: e,
        }
    })?;
    let devnum = sysfs_read_decimal_u32(&sysfs_path.join("devnum")).map_err(|e| {
        UsbError::SysfsUnreadable {
            path: sysfs_path.join("devnum").display().to_string(),
            source: e,
        }
    })?;
    let dev = sysfs_read_line(&sysfs_path.join("dev")).map_err(|e| UsbError::SysfsUnreadable {
        path: sysfs_path.join("dev").display().to_string(),
        source: e,
    })?;
    let (major, minor) = dev
        .split_once(':')
        .ok_or_else(|| UsbError::DeviceFileMismatch { path: dev.clone() })?;
    let major: u32 = major
        .parse()
        .map_err(|_| UsbError::DeviceFileMismatch { path: dev.clone() })?;
    let minor: u32 = minor
        .parse()
        .map_err(|_| UsbError::DeviceFileMismatch { path: dev.clone() })?;
    let expected_rdev = libc::makedev(major, minor);

    let devfile = PathBuf::from(format!("/dev/bus/usb/{busnum:03}/{devnum:03}"));
    let meta = fs::metadata(&devfile).map_err(|_| UsbError::DeviceFileMismatch {
        path: devfile.display().to_string(),
    })?;
    if !meta.file_type().is_char_device() || meta.rdev() != expected_rdev as u64 {
        return Err(UsbError::DeviceFileMismatch {
            path: devfile.display().to_string(),
        });
    }
    Ok(devfile)
}

#[repr(C)]
struct UsbdevfsBulkTransfer {
    ep: u32,
    len: u32,
    timeout: u32,
    data: u64,
}

nix::ioctl_readwrite!(usbdevfs_bulk, b'U', 2, UsbdevfsBulkTransfer);
nix::ioctl_write_ptr!(usbdevfs_setconfiguration, b'U', 5, libc::c_int);
nix::ioctl_write_ptr!(usbdevfs_claiminterface, b'U', 15, libc::c_int);

fn to_io_error(e: nix::Error) -> io::Error {
    io::Error::from_raw_os_error(e as i32)
}

fn bulk_transfer(
    fd: RawFd,
    ep: u8,
    ptr: *mut u8,
    len: usize,
    timeout: Duration,
) -> io::Result<usize> {
    let mut xfer = UsbdevfsBulkTransfer {
        ep: ep as u32,
        len: len as u32,
        timeout: timeout.as_millis() as u32,
        data: ptr as u64,
    };
    let rc = unsafe { usbdevfs_bulk(fd, &mut xfer) }.map_err(to_io_error)?;
    Ok(rc as usize)
}

/// An opened CCID-capable USB device: the claimed interface's endpoints
/// plus an open handle to its `/dev/bus/usb` device file.
pub struct UsbDevice {
    file: fs::File,
    tree: DeviceTree,
    ep_out: u8,
    ep_in: u8,
    ep_intr: Option<u8>,
}

impl UsbDevice {
    /// Find, open, and select the CCID interface of the device matching
    /// `selector`.
    pub fn open(selector: DeviceSelector) -> Result<Self, UsbError> {
        let sysfs_path = find_device(selector)?;
        let devfile_path = attach(&sysfs_path)?;

        let descriptors_path = sysfs_path.join("descriptors");
        let blob = fs::read(&descriptors_path).map_err(|e| UsbError::SysfsUnreadable {
            path: descriptors_path.display().to_string(),
            source: e,
        })?;
        let tree = build_device_tree(&blob)?;

        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(&devfile_path)
            .map_err(|e| UsbError::OpenDeviceFile {
                path: devfile_path.display().to_string(),
                source: e,
            })?;

        let mut device = UsbDevice {
            file,
            tree,
            ep_out: 0,
            ep_in: 0,
            ep_intr: None,
        };
        device.select_ccid_interface()?;
        log::info!(
            "opened CCID interface: out=0x{:02x} in=0x{:02x} intr={:?}",
            device.ep_out, device.ep_in, device.ep_intr
        );
        Ok(device)
    }

    /// The CCID functional descriptor of the selected interface.
    pub fn ccid_descriptor(&self) -> Option<&crate::wire::CcidDescriptor> {
        self.tree
            .find_ccid_interface()
            .and_then(|(_, iface)| iface.ccid.as_ref())
    }

    fn select_ccid_interface(&mut self) -> Result<(), UsbError> {
        let num_configurations = self.tree.device.bNumConfigurations;
        let (config, iface) = self
            .tree
            .find_ccid_interface()
            .ok_or(UsbError::Descriptor(DescriptorError::NoCcidInterface))?;

        let mut ep_out = None;
        let mut ep_in = None;
        let mut ep_intr = None;
        for e in &iface.endpoints {
            match (e.transfer_type(), e.direction()) {
                (endpoint_type::BULK, endpoint_direction::IN) => {
                    ep_in.get_or_insert(e.bEndpointAddress);
                }
                (endpoint_type::BULK, endpoint_direction::OUT) => {
                    ep_out.get_or_insert(e.bEndpointAddress);
                }
                (endpoint_type::INTERRUPT, endpoint_direction::IN) => {
                    ep_intr.get_or_insert(e.bEndpointAddress);
                }
                _ => {}
            }
        }
        let ep_out = ep_out.ok_or(UsbError::Descriptor(DescriptorError::NoCcidInterface))?;
        let ep_in = ep_in.ok_or(UsbError::Descriptor(DescriptorError::NoCcidInterface))?;
        let interface_num = iface.descriptor.bInterfaceNumber;
        let config_value = config.descriptor.bConfigurationValue;

        // Claiming an interface on a single-configuration device with
        // interface 0 would conflict with a kernel driver (e.g. CCID/HID)
        // already bound to it, so both ioctls are conditional.
        if num_configurations > 1 {
            let val = config_value as libc::c_int;
            unsafe { usbdevfs_setconfiguration(self.file.as_raw_fd(), &val) }
                .map_err(|e| UsbError::ClaimRefused(to_io_error(e)))?;
            log::debug!("set configuration {config_value}");
        }
        if interface_num != 0 {
            let val = interface_num as libc::c_int;
            unsafe { usbdevfs_claiminterface(self.file.as_raw_fd(), &val) }
                .map_err(|e| UsbError::ClaimRefused(to_io_error(e)))?;
            log::debug!("claimed interface {interface_num}");
        }

        self.ep_out = ep_out;
        self.ep_in = ep_in;
        self.ep_intr = ep_intr;
        Ok(())
    }

    /// Blocking bulk write on the CCID OUT endpoint.
    pub fn bulk_out(&self, data: &[u8], timeout: Duration) -> Result<usize, UsbError> {
        bulk_transfer(
            self.file.as_raw_fd(),
            self.ep_out,
            data.as_ptr() as *mut u8,
            data.len(),
            timeout,
        )
        .map_err(|source| UsbError::BulkTransfer {
            endpoint: self.ep_out,
            source,
        })
    }

    /// Blocking bulk read on the CCID IN endpoint.
    pub fn bulk_in(&self, buf: &mut [u8], timeout: Duration) -> Result<usize, UsbError> {
        bulk_transfer(
            self.file.as_raw_fd(),
            self.ep_in,
            buf.as_mut_ptr(),
            buf.len(),
            timeout,
        )
        .map_err(|source| UsbError::BulkTransfer {
            endpoint: self.ep_in,
            source,
        })
    }

    /// The interrupt-IN endpoint, if the CCID interface advertised one.
    pub fn interrupt_endpoint(&self) -> Option<u8> {
        self.ep_intr
    }
}
