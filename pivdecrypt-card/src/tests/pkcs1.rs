use super::*;

#[test]
fn removes_padding_and_returns_message() {
    let mut data = vec![0x00, 0x02, 0xAB, 0xCD, 0xEF, 0x00];
    data.extend_from_slice(b"hello");
    assert_eq!(remove_type2_padding(&data).unwrap(), b"hello");
}

#[test]
fn rejects_wrong_block_type() {
    let data = vec![0x00, 0x01, 0xFF, 0x00, 1, 2, 3];
    assert!(matches!(
        remove_type2_padding(&data),
        Err(CardError::InvalidPkcs1Padding)
    ));
}

#[test]
fn rejects_missing_terminator() {
    let data = vec![0x00, 0x02, 0xAB, 0xCD, 0xEF];
    assert!(matches!(
        remove_type2_padding(&data),
        Err(CardError::InvalidPkcs1Padding)
    ));
}

#[test]
fn message_may_be_empty() {
    let data = vec![0x00, 0x02, 0xAB, 0x00];
    assert_eq!(remove_type2_padding(&data).unwrap(), b"");
}
