use super::*;

#[test]
fn append_and_consume_round_trip() {
    let mut b = Buffer::alloc(8);
    assert!(b.append(&[1, 2, 3]));
    assert_eq!(b.available(), 3);
    assert_eq!(b.tailroom(), 5);
    let mut out = [0u8; 3];
    assert!(b.consume(&mut out));
    assert_eq!(out, [1, 2, 3]);
    assert_eq!(b.available(), 0);
}

#[test]
fn append_fails_without_side_effects_when_tailroom_short() {
    let mut b = Buffer::alloc(2);
    assert!(!b.append(&[1, 2, 3]));
    assert_eq!(b.wpos(), 0);
    assert_eq!(b.tailroom(), 2);
}

#[test]
fn consume_fails_without_side_effects_when_short() {
    let mut b = Buffer::alloc(4);
    b.append(&[9]);
    let mut out = [0u8; 2];
    assert!(!b.consume(&mut out));
    assert_eq!(b.rpos(), 0);
}

#[test]
fn truncate_shrinks_written_region() {
    let mut b = Buffer::alloc(8);
    b.append(&[1, 2, 3, 4]);
    assert!(b.truncate(2));
    assert_eq!(b.remaining(), &[1, 2]);
    assert!(!b.truncate(10));
}

#[test]
fn skip_advances_rpos_without_copy() {
    let mut b = Buffer::alloc(8);
    b.append(&[1, 2, 3]);
    assert!(b.skip(2));
    assert_eq!(b.remaining(), &[3]);
    assert!(!b.skip(5));
}

#[test]
fn little_endian_integers() {
    let mut b = Buffer::alloc(16);
    assert!(b.put_u8(0x11));
    assert!(b.put_u16le(0x2233));
    assert!(b.put_u32le(0x44556677));
    assert_eq!(b.get_u8(), Some(0x11));
    assert_eq!(b.get_u16le(), Some(0x2233));
    assert_eq!(b.get_u32le(), Some(0x44556677));
    assert_eq!(b.get_u8(), None);
}

#[test]
fn from_vec_has_no_tailroom() {
    let b = Buffer::from_vec(vec![1, 2, 3]);
    assert_eq!(b.available(), 3);
    assert_eq!(b.tailroom(), 0);
}
