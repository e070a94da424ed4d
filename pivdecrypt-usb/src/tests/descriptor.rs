use super::*;
use crate::tests_support::{ccid_functional, configuration, device, endpoint, full_blob_with_ccid, interface};
use crate::wire::{CcidDescriptor, ConfigurationDescriptor, EndpointDescriptor, InterfaceDescriptor};

struct TreeCounter {
    configurations: u32,
    interfaces: u32,
    endpoints: u32,
    ccid_seen: bool,
}

impl DescriptorVisitor for TreeCounter {
    fn on_configuration(&mut self, _c: &ConfigurationDescriptor) {
        self.configurations += 1;
    }
    fn on_interface(&mut self, _i: &InterfaceDescriptor) {
        self.interfaces += 1;
    }
    fn on_endpoint(&mut self, _e: &EndpointDescriptor) {
        self.endpoints += 1;
    }
    fn on_ccid(&mut self, _c: &CcidDescriptor) {
        self.ccid_seen = true;
    }
}

fn counter() -> TreeCounter {
    TreeCounter {
        configurations: 0,
        interfaces: 0,
        endpoints: 0,
        ccid_seen: false,
    }
}

#[test]
fn well_formed_blob_produces_exact_counts() {
    let blob = full_blob_with_ccid();
    let mut v = counter();
    parse_descriptors(&blob, &mut v).unwrap();
    assert_eq!(v.configurations, 1);
    assert_eq!(v.interfaces, 1);
    assert_eq!(v.endpoints, 2);
    assert!(v.ccid_seen);
}

#[test]
fn truncated_record_is_rejected() {
    let mut blob = full_blob_with_ccid();
    let last = blob.len() - 1;
    blob[last - 6] = 0xFF; // claim a huge length for the last endpoint record
    let mut v = counter();
    let err = parse_descriptors(&blob, &mut v).unwrap_err();
    assert!(matches!(err, DescriptorError::TruncatedRecord { .. }));
}

#[test]
fn duplicate_device_descriptor_is_rejected() {
    let mut blob = device(1);
    blob.extend(device(1));
    let mut v = counter();
    let err = parse_descriptors(&blob, &mut v).unwrap_err();
    assert_eq!(err, DescriptorError::DuplicateDevice);
}

#[test]
fn interface_before_configuration_is_rejected() {
    let mut blob = device(1);
    blob.extend(interface(0x0B, 0));
    let mut v = counter();
    let err = parse_descriptors(&blob, &mut v).unwrap_err();
    assert_eq!(err, DescriptorError::InterfaceBeforeConfiguration);
}

#[test]
fn too_many_configurations_is_rejected() {
    let mut blob = device(1);
    blob.extend(configuration(9, 0));
    blob.extend(configuration(9, 0));
    let mut v = counter();
    let err = parse_descriptors(&blob, &mut v).unwrap_err();
    assert_eq!(err, DescriptorError::TooManyConfigurations);
}

#[test]
fn first_descriptor_must_be_device() {
    let blob = configuration(9, 0);
    let mut v = counter();
    let err = parse_descriptors(&blob, &mut v).unwrap_err();
    assert_eq!(err, DescriptorError::DeviceNotFirst);
}

#[test]
fn endpoint_before_interface_is_rejected() {
    let mut blob = device(1);
    blob.extend(configuration(9, 1));
    blob.extend(endpoint(0x01, 0x02));
    let mut v = counter();
    let err = parse_descriptors(&blob, &mut v).unwrap_err();
    assert_eq!(err, DescriptorError::EndpointBeforeInterface);
}

#[test]
fn ccid_descriptor_fields_round_trip() {
    let raw = ccid_functional();
    struct Capture(Option<CcidDescriptor>);
    impl DescriptorVisitor for Capture {
        fn on_ccid(&mut self, c: &CcidDescriptor) {
            self.0 = Some(*c);
        }
    }
    let mut blob = device(1);
    blob.extend(configuration(9 + 9 + raw.len() as u16, 1));
    blob.extend(interface(0x0B, 0));
    blob.extend(raw);
    let mut cap = Capture(None);
    parse_descriptors(&blob, &mut cap).unwrap();
    let ccid = cap.0.expect("ccid descriptor captured");
    assert_eq!(ccid.dwMaxIFSD, 254);
    assert_eq!(ccid.bVoltageSupport, 0x07);
    assert_eq!(ccid.dwFeatures, 0x0006_0000);
}
