//! Orchestrates the PIV decrypt pipeline: open the reader, power on
//! the card, connect, verify, decipher, and write the plaintext (§6).

mod config;
mod error;
mod transport;

use clap::Parser;
use config::Config;
use error::CliError;
use log::LevelFilter;
use pivdecrypt_card::{CardError, CardRegistry, VerifyOutcome};
use pivdecrypt_ccid::CcidReader;
use pivdecrypt_usb::transport::{DeviceSelector, UsbDevice};
use std::io::{self, Read, Write};
use transport::UsbCcidTransport;

fn level_for(debug: u8) -> LevelFilter {
    match debug {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn read_ciphertext(path: Option<&str>) -> Result<Vec<u8>, CliError> {
    match path {
        None | Some("-") => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .map_err(|source| CliError::Io {
                    path: "<stdin>".to_string(),
                    source,
                })?;
            Ok(buf)
        }
        Some(p) => std::fs::read(p).map_err(|source| CliError::Io {
            path: p.to_string(),
            source,
        }),
    }
}

fn write_plaintext(path: Option<&str>, data: &[u8]) -> Result<(), CliError> {
    match path {
        None | Some("-") => io::stdout().write_all(data).map_err(|source| CliError::Io {
            path: "<stdout>".to_string(),
            source,
        }),
        Some(p) => std::fs::write(p, data).map_err(|source| CliError::Io {
            path: p.to_string(),
            source,
        }),
    }
}

fn run(config: &Config) -> Result<(), CliError> {
    let ciphertext = read_ciphertext(config.input.as_deref())?;

    let (vendor, product) = config.vendor_product().map_err(CliError::Configuration)?;
    let device = UsbDevice::open(DeviceSelector { vendor, product })?;
    let descriptor = device
        .ccid_descriptor()
        .ok_or_else(|| CliError::Configuration("device has no CCID functional descriptor".into()))?
        .clone();

    let mut reader = CcidReader::new(UsbCcidTransport(device), &descriptor)?;
    let slot = 0;
    let atr = reader.power_on(slot)?;

    let mut registry: CardRegistry<CcidReader<UsbCcidTransport>> = CardRegistry::new();
    pivdecrypt_card::yubikey::register(&mut registry);
    let entry = registry
        .identify(&atr)
        .ok_or(CliError::Card(CardError::NoMatchingCard))?;
    log::info!("identified {} (ATR {atr:02x?})", entry.name());

    let mut card = entry.create_card(&mut reader, slot);
    entry.driver().connect(&mut card)?;

    for opt in config.parsed_card_options().map_err(CliError::Configuration)? {
        entry.driver().set_option(&mut card, &opt.key, &opt.value)?;
    }

    if card.pin_required {
        let pin = config
            .pin
            .as_deref()
            .ok_or_else(|| CliError::Configuration("card requires a PIN, pass -p".into()))?;
        match entry.driver().verify(&mut card, Some(pin.as_bytes()))? {
            VerifyOutcome::Verified => {}
            VerifyOutcome::WrongPin { tries_left } => {
                return Err(CliError::WrongPin { tries_left })
            }
        }
    }

    let plaintext = entry.driver().decipher(&mut card, &ciphertext)?;
    write_plaintext(config.output.as_deref(), &plaintext)
}

fn main() {
    let config = Config::parse();

    env_logger::Builder::new()
        .filter_level(level_for(config.debug))
        .init();

    if let Err(err) = run(&config) {
        log::error!("{err}");
        std::process::exit(err.exit_code());
    }
}
