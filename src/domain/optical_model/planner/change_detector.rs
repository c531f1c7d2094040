use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::optical_model::network::device::DeviceType;
use crate::domain::optical_model::network::inventory::{NetworkInventory, TopologyEvent};
use crate::domain::optical_model::network::link::Link;

/// Tracks whether the optical line topology changed since the WDM paths were computed.
pub struct TopologyChangeDetector {
    inventory: Arc<dyn NetworkInventory>,
    changed: AtomicBool,
}

impl TopologyChangeDetector {
    pub fn new(inventory: Arc<dyn NetworkInventory>) -> Self {
        Self { inventory, changed: AtomicBool::new(false) }
    }

    pub fn is_changed(&self) -> bool {
        self.changed.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.changed.store(false, Ordering::SeqCst);
    }

    pub fn on_topology_event(&self, event: &TopologyEvent) {
        if self.is_changed() {
            return;
        }

        let relevant = match event {
            TopologyEvent::LinkAdded(link)
            | TopologyEvent::LinkUpdated(link)
            | TopologyEvent::LinkRemoved(link)
            | TopologyEvent::LinkConfigChanged(link) => self.is_line_link(link),
            TopologyEvent::DeviceRemoved(device) => {
                matches!(device.device_type, DeviceType::Roadm | DeviceType::RoadmOtn | DeviceType::OpticalAmplifier)
            }
            TopologyEvent::DeviceAdded(_) => false,
        };

        if relevant {
            log::info!("Topology change detected: {:?}", event);
            self.changed.store(true, Ordering::SeqCst);
        }
    }

    /// Either end is an OMS or fiber port. Ends on devices that are already gone are ignored.
    fn is_line_link(&self, link: &Link) -> bool {
        [&link.src, &link.dst].into_iter().any(|cp| self.inventory.port(cp).is_some_and(|p| p.port_type.is_oms_or_fiber()))
    }
}
