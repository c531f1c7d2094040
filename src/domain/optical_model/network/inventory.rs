use crate::api::network_dto::NetworkDto;
use crate::domain::optical_model::network::connect_point::ConnectPoint;
use crate::domain::optical_model::network::device::{Device, Port};
use crate::domain::optical_model::network::link::Link;
use crate::domain::optical_model::utils::id::DeviceId;

/// Change notifications emitted by the network inventory.
#[derive(Debug, Clone, PartialEq)]
pub enum TopologyEvent {
    DeviceAdded(Device),
    DeviceRemoved(Device),
    LinkAdded(Link),
    LinkUpdated(Link),
    LinkRemoved(Link),

    /// Physical details of a link (spans, amplifiers) changed.
    LinkConfigChanged(Link),
}

/// Read access to devices, ports and links of the optical network.
pub trait NetworkInventory: Send + Sync {
    fn devices(&self) -> Vec<Device>;

    fn device(&self, device_id: &DeviceId) -> Option<Device>;

    fn port(&self, cp: &ConnectPoint) -> Option<Port> {
        self.device(&cp.device_id).and_then(|d| d.port(cp.port).cloned())
    }

    fn links(&self) -> Vec<Link>;

    /// Links whose source is `cp`.
    fn egress_links(&self, cp: &ConnectPoint) -> Vec<Link>;

    /// Links whose destination is `cp`.
    fn ingress_links(&self, cp: &ConnectPoint) -> Vec<Link>;

    /// Snapshot of devices and links in the network document format.
    fn export(&self) -> NetworkDto {
        NetworkDto {
            devices: self.devices().iter().map(Device::to_dto).collect(),
            links: self.links().iter().map(Link::to_dto).collect(),
            link_details: Vec::new(),
            spectrum: None,
        }
    }
}
