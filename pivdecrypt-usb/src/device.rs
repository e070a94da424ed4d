//! An owned device/configuration/interface/endpoint tree, built by
//! replaying a descriptor blob through [`parse_descriptors`].

use crate::descriptor::{parse_descriptors, DescriptorVisitor};
use crate::error::DescriptorError;
use crate::wire::{
    CcidDescriptor, ConfigurationDescriptor, DeviceDescriptor, EndpointDescriptor,
    InterfaceDescriptor,
};

/// One USB interface: its descriptor, its endpoints (up to 4), and its
/// CCID functional descriptor if it is a CCID interface.
#[derive(Debug, Clone, Default)]
pub struct Interface {
    pub descriptor: InterfaceDescriptor,
    pub endpoints: Vec<EndpointDescriptor>,
    pub ccid: Option<CcidDescriptor>,
}

/// One USB configuration: its descriptor and its interfaces (up to 8).
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    pub descriptor: ConfigurationDescriptor,
    pub interfaces: Vec<Interface>,
}

/// The full descriptor tree for one device: its descriptor and its
/// configurations (up to 8).
#[derive(Debug, Clone, Default)]
pub struct DeviceTree {
    pub device: DeviceDescriptor,
    pub configurations: Vec<Configuration>,
}

impl DeviceTree {
    /// The first interface across all configurations carrying a CCID
    /// functional descriptor, if any.
    pub fn find_ccid_interface(&self) -> Option<(&Configuration, &Interface)> {
        self.configurations.iter().find_map(|cfg| {
            cfg.interfaces
                .iter()
                .find(|iface| iface.ccid.is_some())
                .map(|iface| (cfg, iface))
        })
    }
}

#[derive(Default)]
struct TreeBuilder {
    tree: DeviceTree,
}

impl DescriptorVisitor for TreeBuilder {
    fn on_device(&mut self, d: &DeviceDescriptor) {
        self.tree.device = *d;
    }
    fn on_configuration(&mut self, c: &ConfigurationDescriptor) {
        self.tree.configurations.push(Configuration {
            descriptor: *c,
            interfaces: Vec::new(),
        });
    }
    fn on_interface(&mut self, i: &InterfaceDescriptor) {
        self.tree
            .configurations
            .last_mut()
            .expect("on_configuration precedes on_interface")
            .interfaces
            .push(Interface {
                descriptor: *i,
                endpoints: Vec::new(),
                ccid: None,
            });
    }
    fn on_endpoint(&mut self, e: &EndpointDescriptor) {
        self.tree
            .configurations
            .last_mut()
            .expect("on_configuration precedes on_endpoint")
            .interfaces
            .last_mut()
            .expect("on_interface precedes on_endpoint")
            .endpoints
            .push(*e);
    }
    fn on_ccid(&mut self, c: &CcidDescriptor) {
        self.tree
            .configurations
            .last_mut()
            .expect("on_configuration precedes on_ccid")
            .interfaces
            .last_mut()
            .expect("on_interface precedes on_ccid")
            .ccid = Some(*c);
    }
}

/// Parse `blob` into an owned [`DeviceTree`].
pub fn build_device_tree(blob: &[u8]) -> Result<DeviceTree, DescriptorError> {
    let mut builder = TreeBuilder::default();
    parse_descriptors(blob, &mut builder)?;
    Ok(builder.tree)
}

#[cfg(test)]
#[path = "tests/device.rs"]
mod tests;
