//! A linear octet buffer with independent read and write cursors.
//!
//! Every wire format in this workspace — USB descriptors, CCID packets,
//! PIV BER-TLV bodies — is built or consumed through a [`Buffer`]. The
//! cursor semantics are load-bearing: a failed read or write never moves
//! `rpos`/`wpos`, so callers can probe an operation and fall back without
//! unwinding any state.

#![warn(missing_docs)]

/// An owned, fixed-capacity octet region with `rpos <= wpos <= capacity`.
///
/// There is no hidden growth: [`Buffer::alloc`] fixes the capacity once,
/// and every append/write operation fails cleanly (returning `false` or
/// `None`) rather than reallocating.
#[derive(Clone)]
pub struct Buffer {
    data: Vec<u8>,
    rpos: usize,
    wpos: usize,
}

impl Buffer {
    /// Allocate a zero-filled buffer of the given capacity.
    pub fn alloc(capacity: usize) -> Self {
        Buffer {
            data: vec![0u8; capacity],
            rpos: 0,
            wpos: 0,
        }
    }

    /// Wrap an existing byte vector as an already-fully-written buffer.
    ///
    /// `rpos` starts at 0 and `wpos` at `bytes.len()`; the capacity is
    /// exactly `bytes.len()` (no tailroom).
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        let wpos = bytes.len();
        Buffer {
            data: bytes,
            rpos: 0,
            wpos,
        }
    }

    /// Bytes available to read: `wpos - rpos`.
    pub fn available(&self) -> usize {
        self.wpos - self.rpos
    }

    /// Free space left to append into: `capacity - wpos`.
    pub fn tailroom(&self) -> usize {
        self.data.len() - self.wpos
    }

    /// Total capacity fixed at allocation time.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Current read position.
    pub fn rpos(&self) -> usize {
        self.rpos
    }

    /// Current write position.
    pub fn wpos(&self) -> usize {
        self.wpos
    }

    /// The unread region, `data[rpos..wpos]`.
    pub fn remaining(&self) -> &[u8] {
        &self.data[self.rpos..self.wpos]
    }

    /// The written region from the start, `data[..wpos]`.
    pub fn written(&self) -> &[u8] {
        &self.data[..self.wpos]
    }

    /// Append `bytes` at `wpos`. Fails without effect if tailroom is short.
    pub fn append(&mut self, bytes: &[u8]) -> bool {
        if bytes.len() > self.tailroom() {
            return false;
        }
        let end = self.wpos + bytes.len();
        self.data[self.wpos..end].copy_from_slice(bytes);
        self.wpos = end;
        true
    }

    /// Copy the next `out.len()` unread bytes into `out` and advance `rpos`.
    /// Fails without effect if fewer bytes are available.
    pub fn consume(&mut self, out: &mut [u8]) -> bool {
        if out.len() > self.available() {
            return false;
        }
        let end = self.rpos + out.len();
        out.copy_from_slice(&self.data[self.rpos..end]);
        self.rpos = end;
        true
    }

    /// Advance `rpos` by `n` without copying anything out.
    /// Fails without effect if fewer bytes are available.
    pub fn skip(&mut self, n: usize) -> bool {
        if n > self.available() {
            return false;
        }
        self.rpos += n;
        true
    }

    /// Set `wpos = rpos + length`, shrinking the written region to a
    /// declared length. Fails if `length` exceeds what's currently available.
    pub fn truncate(&mut self, length: usize) -> bool {
        if length > self.available() {
            return false;
        }
        self.wpos = self.rpos + length;
        true
    }

    /// Append a single byte.
    pub fn put_u8(&mut self, v: u8) -> bool {
        self.append(&[v])
    }

    /// Append a little-endian `u16`.
    pub fn put_u16le(&mut self, v: u16) -> bool {
        self.append(&v.to_le_bytes())
    }

    /// Append a little-endian `u32`.
    pub fn put_u32le(&mut self, v: u32) -> bool {
        self.append(&v.to_le_bytes())
    }

    /// Consume a single byte, or `None` if the buffer is empty.
    pub fn get_u8(&mut self) -> Option<u8> {
        let mut b = [0u8; 1];
        self.consume(&mut b).then_some(b[0])
    }

    /// Consume a little-endian `u16`.
    pub fn get_u16le(&mut self) -> Option<u16> {
        let mut b = [0u8; 2];
        self.consume(&mut b).then(|| u16::from_le_bytes(b))
    }

    /// Consume a little-endian `u32`.
    pub fn get_u32le(&mut self) -> Option<u32> {
        let mut b = [0u8; 4];
        self.consume(&mut b).then(|| u32::from_le_bytes(b))
    }
}

#[cfg(test)]
#[path = "tests/buffer.rs"]
mod tests;
