//! The CCID reader protocol engine: packet framing, sequence numbering,
//! retries, slot status, voltage-aware power-on, and APDU transfer.

#![warn(missing_docs)]

pub mod engine;
pub mod error;
pub mod wire;

pub use engine::{CcidReader, CcidTransport};
pub use error::CcidError;
