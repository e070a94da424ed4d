//! Synthetic descriptor blobs shared by this crate's unit tests.

pub(crate) fn device(num_configs: u8) -> Vec<u8> {
    vec![18, 1, 0x00, 0x02, 0, 0, 0, 64, 0x50, 0x10, 0x07, 0x04, 0, 0, 0, 0, 0, num_configs]
}

pub(crate) fn configuration(total_len: u16, num_interfaces: u8) -> Vec<u8> {
    let [lo, hi] = total_len.to_le_bytes();
    vec![9, 2, lo, hi, num_interfaces, 1, 0, 0x80, 50]
}

pub(crate) fn interface(class: u8, num_endpoints: u8) -> Vec<u8> {
    vec![9, 4, 0, 0, num_endpoints, class, 0, 0, 0]
}

pub(crate) fn ccid_functional() -> Vec<u8> {
    let mut v = vec![0x36, 0x21];
    v.extend_from_slice(&0x0110u16.to_le_bytes());
    v.push(0);
    v.push(0x07);
    v.extend_from_slice(&0x01u32.to_le_bytes());
    v.extend_from_slice(&0u32.to_le_bytes());
    v.extend_from_slice(&0u32.to_le_bytes());
    v.push(0);
    v.extend_from_slice(&0u32.to_le_bytes());
    v.extend_from_slice(&0u32.to_le_bytes());
    v.push(0);
    v.extend_from_slice(&254u32.to_le_bytes());
    v.extend_from_slice(&0u32.to_le_bytes());
    v.extend_from_slice(&0u32.to_le_bytes());
    v.extend_from_slice(&0x0006_0000u32.to_le_bytes());
    v.extend_from_slice(&271u32.to_le_bytes());
    v.push(0);
    v.push(0);
    v.extend_from_slice(&0u16.to_le_bytes());
    v.push(0);
    v.push(1);
    debug_assert_eq!(v.len(), 54);
    v
}

pub(crate) fn endpoint(address: u8, attributes: u8) -> Vec<u8> {
    vec![7, 5, address, attributes, 64, 0, 0]
}

pub(crate) fn full_blob_with_ccid() -> Vec<u8> {
    let mut blob = device(1);
    blob.extend(configuration(9 + 9 + 54 + 7 + 7, 1));
    blob.extend(interface(0x0B, 2));
    blob.extend(ccid_functional());
    blob.extend(endpoint(0x01, 0x02));
    blob.extend(endpoint(0x82, 0x02));
    blob
}
