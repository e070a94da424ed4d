//! Adapts [`pivdecrypt_usb::transport::UsbDevice`]'s `&self` bulk I/O to
//! the `&mut self` shape [`pivdecrypt_ccid::CcidTransport`] expects.

use pivdecrypt_ccid::CcidTransport;
use pivdecrypt_usb::transport::UsbDevice;
use pivdecrypt_usb::UsbError;
use std::time::Duration;

/// A CCID transport backed by a claimed USB device file. Holds no
/// state of its own; `&mut self` only satisfies the trait shape, the
/// underlying bulk transfers need no mutation.
pub struct UsbCcidTransport(pub UsbDevice);

impl CcidTransport for UsbCcidTransport {
    type Error = UsbError;

    fn send(&mut self, data: &[u8], timeout: Duration) -> Result<usize, UsbError> {
        self.0.bulk_out(data, timeout)
    }

    fn recv(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, UsbError> {
        self.0.bulk_in(buf, timeout)
    }
}
