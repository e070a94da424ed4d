//! Command-line argument parsing (§6) into a resolved [`Config`] (§3's
//! "Application configuration").

use clap::Parser;
use std::fmt;

/// Vendor (and optional product) selector parsed from `-T vvvv[:pppp]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceType {
    pub vendor: u16,
    pub product: u16,
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor, self.product)
    }
}

/// A driver-specific `key=value` option destined for `set_option`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardOption {
    pub key: String,
    pub value: String,
}

/// Parse a `-T vvvv[:pppp]` value. Exposed so [`Config::vendor_product`]
/// can validate the raw flag value after clap parsing, rather than as a
/// clap `value_parser` — a `value_parser` failure exits via clap's own
/// usage-error path (exit code 2), bypassing [`crate::error::CliError`]'s
/// exit-code predicate entirely.
pub fn parse_device_type(s: &str) -> Result<DeviceType, String> {
    let mut parts = s.splitn(2, ':');
    let vendor_str = parts.next().unwrap_or("");
    let vendor = u16::from_str_radix(vendor_str, 16)
        .map_err(|_| format!("invalid vendor id `{vendor_str}`, expected hex"))?;
    let product = match parts.next() {
        None => 0,
        Some(p) => u16::from_str_radix(p, 16)
            .map_err(|_| format!("invalid product id `{p}`, expected hex"))?,
    };
    Ok(DeviceType { vendor, product })
}

/// Parse a `-C key=value` value; see [`parse_device_type`] for why this
/// is validated after parsing rather than wired in as a `value_parser`.
pub fn parse_card_option(s: &str) -> Result<CardOption, String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("card option `{s}` is not in `key=value` form"))?;
    if key.is_empty() {
        return Err("card option key must not be empty".to_string());
    }
    Ok(CardOption {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Decrypt PIV-wrapped ciphertext read from a file or from standard input.
#[derive(Parser, Debug)]
#[command(name = "pivdecrypt", version, about)]
pub struct Config {
    /// Ciphertext path, or `-`/absent for standard input.
    pub input: Option<String>,

    /// Device-path override; accepted, may be ignored by some variants.
    #[arg(short = 'D', long = "device")]
    pub device: Option<String>,

    /// Vendor (and optional product) ID in hex, e.g. `1050:0407`.
    ///
    /// Stored raw and validated by [`Config::vendor_product`] rather than
    /// a clap `value_parser`, so a malformed value surfaces as a
    /// `CliError::Configuration` (exit 1) instead of a clap usage error.
    #[arg(short = 'T', long = "type")]
    pub device_type: Option<String>,

    /// PIN to verify after connect.
    #[arg(short = 'p', long = "pin")]
    pub pin: Option<String>,

    /// Write plaintext here (`-` or omitted ⇒ stdout).
    #[arg(short = 'o', long = "output")]
    pub output: Option<String>,

    /// Driver-specific option, `key=value`; may be repeated. Stored raw
    /// and validated by [`Config::parsed_card_options`], for the same
    /// reason as `device_type`.
    #[arg(short = 'C', long = "card-option")]
    pub card_options: Vec<String>,

    /// Increase verbosity; repeatable (warn -> info -> debug -> trace).
    #[arg(short = 'd', long = "debug", action = clap::ArgAction::Count)]
    pub debug: u8,
}

impl Config {
    /// The effective `vendor:product` selector, `0:0` (match any) if
    /// `-T` was not given. Fails if `-T` was given but malformed.
    pub fn vendor_product(&self) -> Result<(u16, u16), String> {
        match &self.device_type {
            Some(s) => parse_device_type(s).map(|t| (t.vendor, t.product)),
            None => Ok((0, 0)),
        }
    }

    /// Every `-C` value, parsed and validated. Fails on the first
    /// malformed entry.
    pub fn parsed_card_options(&self) -> Result<Vec<CardOption>, String> {
        self.card_options.iter().map(|s| parse_card_option(s)).collect()
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
