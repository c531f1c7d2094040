use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::api::network_dto::NetworkDto;
use crate::domain::optical_model::network::connect_point::ConnectPoint;
use crate::domain::optical_model::network::device::Device;
use crate::domain::optical_model::network::inventory::{NetworkInventory, TopologyEvent};
use crate::domain::optical_model::network::link::{Link, LinkState};
use crate::domain::optical_model::utils::id::DeviceId;
use crate::error::{Error, Result};

/// In-memory network inventory.
///
/// Mutations return the [`TopologyEvent`]s they caused so the caller can
/// forward them to interested components.
#[derive(Debug, Default)]
pub struct NetworkTopology {
    inner: RwLock<TopologyInner>,
}

#[derive(Debug, Default)]
struct TopologyInner {
    devices: BTreeMap<DeviceId, Device>,
    links: BTreeMap<(ConnectPoint, ConnectPoint), Link>,
}

impl NetworkTopology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the topology from a network document. Every link must connect
    /// ports that exist on known devices.
    pub fn from_dto(dto: &NetworkDto) -> Result<Self> {
        let topology = NetworkTopology::new();

        for device_dto in &dto.devices {
            let device = Device::from_dto(device_dto.clone())?;
            if topology.device(&device.id).is_some() {
                return Err(Error::ModelConstructionError(format!("Duplicate device id '{}'", device.id)));
            }
            topology.add_device(device);
        }

        for link_dto in &dto.links {
            for link in Link::from_dto(link_dto.clone()) {
                for cp in [&link.src, &link.dst] {
                    if topology.port(cp).is_none() {
                        return Err(Error::ModelConstructionError(format!("Link {} references unknown port {}", link, cp)));
                    }
                }
                topology.add_link(link);
            }
        }

        log::info!("Network topology built with {} devices and {} links.", topology.devices().len(), topology.links().len());
        Ok(topology)
    }

    pub fn add_device(&self, device: Device) -> TopologyEvent {
        let mut guard = self.inner.write().expect("RwLock poisoned");
        guard.devices.insert(device.id.clone(), device.clone());
        TopologyEvent::DeviceAdded(device)
    }

    pub fn add_link(&self, link: Link) -> TopologyEvent {
        let mut guard = self.inner.write().expect("RwLock poisoned");
        guard.links.insert((link.src.clone(), link.dst.clone()), link.clone());
        TopologyEvent::LinkAdded(link)
    }

    pub fn link(&self, src: &ConnectPoint, dst: &ConnectPoint) -> Option<Link> {
        let guard = self.inner.read().expect("RwLock poisoned");
        guard.links.get(&(src.clone(), dst.clone())).cloned()
    }

    pub fn update_link_state(&self, src: &ConnectPoint, dst: &ConnectPoint, state: LinkState) -> Result<TopologyEvent> {
        let mut guard = self.inner.write().expect("RwLock poisoned");
        let link = guard
            .links
            .get_mut(&(src.clone(), dst.clone()))
            .ok_or_else(|| Error::InvalidArgument(format!("Link {} -> {} not found", src, dst)))?;
        link.state = state;
        Ok(TopologyEvent::LinkUpdated(link.clone()))
    }

    pub fn remove_link(&self, src: &ConnectPoint, dst: &ConnectPoint) -> Result<TopologyEvent> {
        let mut guard = self.inner.write().expect("RwLock poisoned");
        guard
            .links
            .remove(&(src.clone(), dst.clone()))
            .map(TopologyEvent::LinkRemoved)
            .ok_or_else(|| Error::InvalidArgument(format!("Link {} -> {} not found", src, dst)))
    }

    /// Removes a device together with every link attached to it.
    /// Link removals are reported before the device removal.
    pub fn remove_device(&self, device_id: &DeviceId) -> Result<Vec<TopologyEvent>> {
        let mut guard = self.inner.write().expect("RwLock poisoned");
        let device = guard
            .devices
            .remove(device_id)
            .ok_or_else(|| Error::InvalidArgument(format!("Device {} not found", device_id)))?;

        let attached: Vec<(ConnectPoint, ConnectPoint)> = guard
            .links
            .keys()
            .filter(|(src, dst)| &src.device_id == device_id || &dst.device_id == device_id)
            .cloned()
            .collect();

        let mut events: Vec<TopologyEvent> =
            attached.iter().filter_map(|key| guard.links.remove(key)).map(TopologyEvent::LinkRemoved).collect();
        events.push(TopologyEvent::DeviceRemoved(device));
        Ok(events)
    }
}

impl NetworkInventory for NetworkTopology {
    fn devices(&self) -> Vec<Device> {
        let guard = self.inner.read().expect("RwLock poisoned");
        guard.devices.values().cloned().collect()
    }

    fn device(&self, device_id: &DeviceId) -> Option<Device> {
        let guard = self.inner.read().expect("RwLock poisoned");
        guard.devices.get(device_id).cloned()
    }

    fn links(&self) -> Vec<Link> {
        let guard = self.inner.read().expect("RwLock poisoned");
        guard.links.values().cloned().collect()
    }

    fn egress_links(&self, cp: &ConnectPoint) -> Vec<Link> {
        let guard = self.inner.read().expect("RwLock poisoned");
        guard.links.values().filter(|l| &l.src == cp).cloned().collect()
    }

    fn ingress_links(&self, cp: &ConnectPoint) -> Vec<Link> {
        let guard = self.inner.read().expect("RwLock poisoned");
        guard.links.values().filter(|l| &l.dst == cp).cloned().collect()
    }
}
