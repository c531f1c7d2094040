use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::RwLock;

use crate::api::network_dto::SpectrumDto;
use crate::domain::optical_model::network::connect_point::ConnectPoint;
use crate::domain::optical_model::network::inventory::NetworkInventory;
use crate::domain::optical_model::resource::resource::{Resource, ResourceService};
use crate::domain::optical_model::signal::och_signal::{CENTER_FREQUENCY_THZ, ChannelSpacing, OchSignal};
use crate::domain::optical_model::utils::id::IntentKey;
use crate::error::{Error, Result};

#[derive(Debug, Default)]
struct StoreInner {
    /// Flex-grid slots that exist on each OMS port.
    lambdas: HashMap<ConnectPoint, BTreeSet<OchSignal>>,

    /// Current owner of every allocated resource.
    owners: HashMap<Resource, IntentKey>,

    /// Reverse index of `owners`.
    by_consumer: HashMap<IntentKey, Vec<Resource>>,
}

impl StoreInner {
    fn is_free_for(&self, resource: &Resource, consumer: Option<&IntentKey>) -> bool {
        let exists = match resource {
            Resource::Port(_) => true,
            Resource::Lambda(cp, signal) => self.lambdas.get(cp).is_some_and(|s| s.contains(signal)),
        };
        exists && self.owners.get(resource).is_none_or(|owner| Some(owner) == consumer)
    }
}

/// In-memory resource allocation.
///
/// A single write lock covers the availability check and the commit, so an
/// allocation is all-or-nothing even with concurrent callers.
#[derive(Debug, Default)]
pub struct ResourceStore {
    inner: RwLock<StoreInner>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `slots` as allocatable on `port`.
    pub fn register_lambdas(&self, port: ConnectPoint, slots: impl IntoIterator<Item = OchSignal>) {
        let mut guard = self.inner.write().expect("RwLock poisoned");
        guard.lambdas.entry(port).or_default().extend(slots);
    }

    /// Registers every 50GHz channel of `spectrum` (as flex-grid slots) on
    /// every port that carries lambda resources.
    pub fn register_spectrum(&self, inventory: &dyn NetworkInventory, spectrum: &SpectrumDto) {
        let first = ((spectrum.lowest_frequency_thz - CENTER_FREQUENCY_THZ) / 0.05).round() as i32;
        let last = ((spectrum.highest_frequency_thz - CENTER_FREQUENCY_THZ) / 0.05).round() as i32;
        let slots: Vec<OchSignal> =
            (first..=last).flat_map(|m| OchSignal::new_dwdm_slot(ChannelSpacing::Chl50Ghz, m).to_flex_grid()).collect();

        let mut ports = 0;
        for device in inventory.devices() {
            for port in &device.ports {
                if device.has_lambda_resource(port.number) {
                    self.register_lambdas(ConnectPoint { device_id: device.id.clone(), port: port.number }, slots.iter().copied());
                    ports += 1;
                }
            }
        }
        log::info!("Registered {} channels on {} OMS ports.", last - first + 1, ports);
    }
}

impl ResourceService for ResourceStore {
    fn is_available(&self, resource: &Resource) -> bool {
        let guard = self.inner.read().expect("RwLock poisoned");
        guard.is_free_for(resource, None)
    }

    fn available_lambdas(&self, port: &ConnectPoint) -> BTreeSet<OchSignal> {
        let guard = self.inner.read().expect("RwLock poisoned");
        let Some(slots) = guard.lambdas.get(port) else {
            return BTreeSet::new();
        };
        slots
            .iter()
            .filter(|s| !guard.owners.contains_key(&Resource::Lambda(port.clone(), **s)))
            .copied()
            .collect()
    }

    fn allocate(&self, consumer: &IntentKey, resources: &[Resource]) -> Result<()> {
        let mut requested: HashSet<&Resource> = HashSet::with_capacity(resources.len());
        if let Some(duplicate) = resources.iter().find(|r| !requested.insert(*r)) {
            log::error!("Resource allocation for {} requests {} more than once", consumer, duplicate);
            return Err(Error::Rejected(format!("Resource {} is requested more than once.", duplicate)));
        }

        let mut guard = self.inner.write().expect("RwLock poisoned");

        if let Some(taken) = resources.iter().find(|r| !guard.is_free_for(r, Some(consumer))) {
            log::error!("Resource allocation for {} failed at {} ({} resources requested)", consumer, taken, resources.len());
            return Err(Error::Rejected(format!("Resource {} is not available.", taken)));
        }

        for resource in resources {
            if guard.owners.insert(resource.clone(), consumer.clone()).is_none() {
                guard.by_consumer.entry(consumer.clone()).or_default().push(resource.clone());
            }
        }
        log::debug!("Allocated {} resources to {}", resources.len(), consumer);
        Ok(())
    }

    fn release(&self, consumer: &IntentKey) -> Vec<Resource> {
        let mut guard = self.inner.write().expect("RwLock poisoned");
        let released = guard.by_consumer.remove(consumer).unwrap_or_default();
        for resource in &released {
            guard.owners.remove(resource);
        }
        if !released.is_empty() {
            log::debug!("Released {} resources of {}", released.len(), consumer);
        }
        released
    }

    fn allocations(&self, consumer: &IntentKey) -> Vec<Resource> {
        let guard = self.inner.read().expect("RwLock poisoned");
        guard.by_consumer.get(consumer).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_slots(port: &ConnectPoint) -> ResourceStore {
        let store = ResourceStore::new();
        store.register_lambdas(port.clone(), OchSignal::new_dwdm_slot(ChannelSpacing::Chl50Ghz, 0).to_flex_grid());
        store
    }

    #[test]
    fn test_allocate_is_all_or_nothing() {
        let oms = ConnectPoint::new("ROADM-A", 1);
        let store = store_with_slots(&oms);
        let (first, second) = (IntentKey::new("1"), IntentKey::new("2"));
        let slot = OchSignal::new_flex_grid_slot(1);

        store.allocate(&first, &[Resource::Lambda(oms.clone(), slot)]).unwrap();

        let request = [Resource::Port(ConnectPoint::new("TP-1", 1)), Resource::Lambda(oms.clone(), slot)];
        assert!(matches!(store.allocate(&second, &request), Err(Error::Rejected(_))));
        assert!(store.is_available(&request[0]), "A failed allocation must not keep any resource.");
        assert!(store.allocations(&second).is_empty());
    }

    #[test]
    fn test_duplicate_resource_in_one_request_is_rejected() {
        let oms = ConnectPoint::new("ROADM-A", 1);
        let store = store_with_slots(&oms);
        let key = IntentKey::new("3");
        let slot = Resource::Lambda(oms.clone(), OchSignal::new_flex_grid_slot(1));

        let request = [Resource::Port(ConnectPoint::new("TP-1", 1)), slot.clone(), slot.clone()];
        assert!(matches!(store.allocate(&key, &request), Err(Error::Rejected(_))));
        assert!(store.is_available(&slot));
        assert!(store.allocations(&key).is_empty());
    }

    #[test]
    fn test_unregistered_lambda_is_not_allocatable() {
        let oms = ConnectPoint::new("ROADM-A", 1);
        let store = store_with_slots(&oms);
        let foreign = Resource::Lambda(oms, OchSignal::new_flex_grid_slot(101));
        assert!(!store.is_available(&foreign));
        assert!(store.allocate(&IntentKey::new("1"), &[foreign]).is_err());
    }

    #[test]
    fn test_release_returns_lambdas() {
        let oms = ConnectPoint::new("ROADM-A", 1);
        let store = store_with_slots(&oms);
        let key = IntentKey::new("7");
        let slots: Vec<Resource> = store.available_lambdas(&oms).into_iter().map(|s| Resource::Lambda(oms.clone(), s)).collect();

        store.allocate(&key, &slots).unwrap();
        store.allocate(&key, &slots).unwrap();
        assert!(store.available_lambdas(&oms).is_empty());

        assert_eq!(store.release(&key).len(), 4, "Re-allocation by the same consumer must not duplicate entries.");
        assert_eq!(store.available_lambdas(&oms).len(), 4);
        assert!(store.release(&key).is_empty());
    }
}
