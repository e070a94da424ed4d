//! CCID packet layout and class-specification constants (§4.D).

/// CCID command message types this reader issues.
pub mod command {
    pub const ICC_POWER_ON: u8 = 0x62;
    pub const ICC_POWER_OFF: u8 = 0x63;
    pub const GET_SLOT_STATUS: u8 = 0x65;
    pub const XFR_BLOCK: u8 = 0x6F;
}

/// CCID response message types.
pub mod response {
    pub const DATA: u8 = 0x80;
    pub const SLOT_STATUS: u8 = 0x81;
    pub const PARAMETERS: u8 = 0x82;
}

/// `bmICCStatus` bits within `ctl[0]` on a `GET_SLOT_STATUS` response.
pub mod icc_status {
    pub const MASK: u8 = 0x03;
    pub const NO_ICC_PRESENT: u8 = 0x02;
}

/// `bmCommandStatus` bits within `ctl[0]`, all response types.
pub mod command_status {
    pub const MASK: u8 = 0xC0;
    pub const SUCCESS: u8 = 0x00;
    pub const TIME_EXTENSION: u8 = 0x80;
}

/// Voltage index values for `ICC_POWER_ON`'s `bPowerSelect` field.
pub mod voltage_index {
    pub const AUTO: u8 = 0;
    pub const V5_0: u8 = 1;
    pub const V3_0: u8 = 2;
    pub const V1_8: u8 = 3;
}

/// The 10-byte CCID message header: `cmd | dwLength(LE) | slot | seq | ctl[3]`.
pub const HEADER_LEN: usize = 10;
