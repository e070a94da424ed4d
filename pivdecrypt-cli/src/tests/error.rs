use super::*;

#[test]
fn fatal_io_error_maps_to_exit_code_two() {
    let err = CliError::Io {
        path: "ciphertext.bin".to_string(),
        source: io::Error::new(io::ErrorKind::NotFound, "nope"),
    };
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn every_other_error_maps_to_exit_code_one() {
    assert_eq!(CliError::Configuration("bad -T".to_string()).exit_code(), 1);
    assert_eq!(CliError::WrongPin { tries_left: 2 }.exit_code(), 1);
    assert_eq!(
        CliError::Card(pivdecrypt_card::CardError::NoMatchingCard).exit_code(),
        1
    );
}
